//! Splitter selection strategies for BSP tree construction.
//!
//! The choice of splitting face affects tree balance and the number of face
//! splits during construction, and therefore the size of the emitted
//! bytecode.

use crate::face::Face;
use crate::plane::Classification;

/// Default penalty per split face in [`LeastCost`].
pub const DEFAULT_SPAN_WEIGHT: u32 = 6;

/// Strategy for selecting which face's plane splits a set of faces.
pub trait SplitterSelector {
    /// Returns the index of the splitting face, or `None` if no face is
    /// worth splitting on, in which case the faces form a leaf.
    fn select(&self, faces: &[Face]) -> Option<usize>;
}

/// Picks the face whose plane best balances the remaining faces while
/// splitting as few of them as possible.
///
/// The score of a candidate is `|front - back| + span_weight * spanning`,
/// counted over all other faces. A candidate that splits nothing and leaves
/// everything on one side does not discriminate and is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeastCost {
    pub span_weight: u32,
}

impl Default for LeastCost {
    fn default() -> Self {
        Self {
            span_weight: DEFAULT_SPAN_WEIGHT,
        }
    }
}

impl LeastCost {
    pub fn new(span_weight: u32) -> Self {
        Self { span_weight }
    }

    /// Scores `faces[candidate]` as a splitter. `None` means rejected.
    pub fn evaluate(&self, faces: &[Face], candidate: usize) -> Option<u64> {
        let plane = faces[candidate].plane();
        let (mut front, mut back, mut spanning) = (0u64, 0u64, 0u64);

        for (i, face) in faces.iter().enumerate() {
            if i == candidate {
                continue;
            }
            match face.classify(&plane) {
                Classification::Front => front += 1,
                Classification::Back => back += 1,
                Classification::Spanning => spanning += 1,
            }
        }

        if spanning == 0 && (front == 0 || back == 0) {
            return None;
        }
        Some(front.abs_diff(back) + u64::from(self.span_weight) * spanning)
    }
}

impl SplitterSelector for LeastCost {
    fn select(&self, faces: &[Face]) -> Option<usize> {
        let mut best: Option<(usize, u64)> = None;
        for candidate in 0..faces.len() {
            if let Some(score) = self.evaluate(faces, candidate) {
                // strict comparison: the first of equal candidates wins
                if best.is_none_or(|(_, best_score)| score < best_score) {
                    best = Some((candidate, score));
                }
            }
        }
        best.map(|(index, _)| index)
    }
}
