//! Polygon models and their submodels.

use crate::face::Face;
use crate::fix::{Fix, FixVec};

/// A rigid part of a model.
///
/// Geometry is in the submodel's own frame; `offset` places that frame inside
/// the parent's. Submodels live in [`PolyModel::submodels`] and refer to each
/// other by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submodel {
    pub offset: FixVec,
    pub min: FixVec,
    pub max: FixVec,
    pub radius: Fix,
    /// Entry point of this submodel's instructions in [`PolyModel::data`].
    pub pointer: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub faces: Vec<Face>,
}

impl Submodel {
    pub fn new(offset: FixVec, faces: Vec<Face>) -> Self {
        Self {
            offset,
            faces,
            ..Self::default()
        }
    }
}

/// A complete model: its submodel hierarchy plus the compiled instruction
/// buffer shared by all submodels. Submodel 0 is the root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolyModel {
    pub submodels: Vec<Submodel>,
    pub data: Vec<u8>,
}

impl PolyModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A model made of a single root submodel.
    pub fn from_faces(faces: Vec<Face>) -> Self {
        Self {
            submodels: vec![Submodel::new(FixVec::ZERO, faces)],
            data: Vec::new(),
        }
    }

    /// Total number of faces across all submodels.
    pub fn face_count(&self) -> usize {
        self.submodels.iter().map(|s| s.faces.len()).sum()
    }
}
