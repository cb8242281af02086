//! BSP tree node implementation.

use crate::errors::StructuralError;
use crate::face::Face;
use crate::plane::{Classification, Plane};

/// A node in the BSP tree.
///
/// A leaf holds faces that can be drawn in any order: none of them spans the
/// plane of another. An internal node always has both children, so a
/// one-sided split cannot be represented.
#[derive(Debug, Clone, PartialEq)]
pub enum BspNode {
    Leaf(Vec<Face>),
    Internal {
        /// The splitting plane for this node.
        plane: Plane,
        /// Subtree containing faces in FRONT of the splitting plane.
        front: Box<BspNode>,
        /// Subtree containing faces BEHIND the splitting plane.
        back: Box<BspNode>,
    },
}

impl BspNode {
    /// Creates an internal node from a plane and two subtrees.
    pub fn internal(plane: Plane, front: BspNode, back: BspNode) -> Self {
        BspNode::Internal {
            plane,
            front: Box::new(front),
            back: Box::new(back),
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, BspNode::Leaf(_))
    }

    /// Returns the splitting plane, `None` for a leaf.
    #[inline]
    pub fn plane(&self) -> Option<&Plane> {
        match self {
            BspNode::Leaf(_) => None,
            BspNode::Internal { plane, .. } => Some(plane),
        }
    }

    /// Returns the faces of a leaf, `None` for an internal node.
    #[inline]
    pub fn faces(&self) -> Option<&[Face]> {
        match self {
            BspNode::Leaf(faces) => Some(faces),
            BspNode::Internal { .. } => None,
        }
    }

    /// Returns the total number of faces in this subtree.
    pub fn face_count(&self) -> usize {
        match self {
            BspNode::Leaf(faces) => faces.len(),
            BspNode::Internal { front, back, .. } => front.face_count() + back.face_count(),
        }
    }

    /// Returns the depth of this subtree (1 for a leaf node).
    pub fn depth(&self) -> usize {
        match self {
            BspNode::Leaf(_) => 1,
            BspNode::Internal { front, back, .. } => 1 + front.depth().max(back.depth()),
        }
    }

    /// Checks that every splitter has a usable plane and that no leaf still
    /// holds a face spanning the plane of one of its neighbours.
    pub fn validate(&self) -> Result<(), StructuralError> {
        match self {
            BspNode::Leaf(faces) => check_leaf(faces),
            BspNode::Internal { plane, front, back } => {
                if plane.is_degenerate() {
                    return Err(StructuralError::DegenerateSplitter);
                }
                front.validate()?;
                back.validate()
            }
        }
    }
}

fn check_leaf(faces: &[Face]) -> Result<(), StructuralError> {
    for (i, splitter) in faces.iter().enumerate() {
        let plane = splitter.plane();
        let spans = faces
            .iter()
            .enumerate()
            .any(|(j, face)| i != j && face.classify(&plane) == Classification::Spanning);
        if spans {
            return Err(StructuralError::SpanningFaceInLeaf);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::{Surface, Vertex};
    use crate::fix::FixVec;

    fn make_triangle(a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> Face {
        Face::new(
            vec![
                Vertex::new(FixVec::from_f64(a[0], a[1], a[2])),
                Vertex::new(FixVec::from_f64(b[0], b[1], b[2])),
                Vertex::new(FixVec::from_f64(c[0], c[1], c[2])),
            ],
            Surface::Flat(0),
        )
    }

    fn ground() -> Plane {
        Plane::new(FixVec::ZERO, FixVec::from_f64(0.0, 1.0, 0.0))
    }

    #[test]
    fn leaf_counts() {
        let poly = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let leaf = BspNode::Leaf(vec![poly.clone(), poly]);

        assert!(leaf.is_leaf());
        assert!(leaf.plane().is_none());
        assert_eq!(leaf.face_count(), 2);
        assert_eq!(leaf.depth(), 1);
    }

    #[test]
    fn depth_and_count_recursive() {
        let poly = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let inner = BspNode::internal(
            ground(),
            BspNode::Leaf(vec![poly.clone()]),
            BspNode::Leaf(vec![poly.clone()]),
        );
        let root = BspNode::internal(ground(), inner, BspNode::Leaf(vec![poly]));

        assert!(!root.is_leaf());
        assert_eq!(root.depth(), 3);
        assert_eq!(root.face_count(), 3);
        assert!(root.faces().is_none());
    }

    #[test]
    fn validate_rejects_zero_normal_splitter() {
        let poly = make_triangle([0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let node = BspNode::internal(
            Plane::new(FixVec::ZERO, FixVec::ZERO),
            BspNode::Leaf(vec![poly.clone()]),
            BspNode::Leaf(vec![poly]),
        );
        assert_eq!(node.validate(), Err(StructuralError::DegenerateSplitter));
    }

    #[test]
    fn validate_accepts_splitter_through_origin() {
        let poly = make_triangle([0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [0.0, 2.0, 0.0]);
        let node = BspNode::internal(ground(), BspNode::Leaf(vec![poly]), BspNode::Leaf(vec![]));
        assert_eq!(node.validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_spanning_leaf() {
        let floor = make_triangle([-1.0, 0.0, -1.0], [0.0, 0.0, 1.0], [1.0, 0.0, -1.0]);
        let wall = make_triangle([0.0, -1.0, 0.0], [1.0, -1.0, 0.0], [0.0, 1.0, 0.0]);
        let leaf = BspNode::Leaf(vec![floor, wall]);
        assert_eq!(leaf.validate(), Err(StructuralError::SpanningFaceInLeaf));
    }
}
