//! Visitor pattern for BSP tree traversal.
//!
//! Visitors allow custom processing of leaves during a walk without coupling
//! traversal logic to specific use cases (vertex collection, statistics).

use crate::face::Face;

/// Visitor for processing faces during a BSP tree walk.
pub trait BspVisitor {
    /// Called once per leaf. The faces passed here never span each other's
    /// planes.
    fn visit(&mut self, faces: &[Face]);
}

/// A simple visitor that collects all visited faces.
#[derive(Debug, Default)]
pub struct CollectingVisitor {
    collected: Vec<Face>,
}

impl CollectingVisitor {
    /// Creates a new empty collecting visitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected faces.
    pub fn into_faces(self) -> Vec<Face> {
        self.collected
    }

    /// Returns a reference to the collected faces.
    pub fn faces(&self) -> &[Face] {
        &self.collected
    }
}

impl BspVisitor for CollectingVisitor {
    fn visit(&mut self, faces: &[Face]) {
        self.collected.extend(faces.iter().cloned());
    }
}
