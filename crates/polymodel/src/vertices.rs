//! Deduplicated vertex table for one submodel's point block.

use std::collections::HashMap;

use crate::bsp::BspVisitor;
use crate::errors::CapacityError;
use crate::face::Face;
use crate::fix::FixVec;

/// Maps exact fixed-point positions to 16-bit vertex indices.
///
/// Indices start at `base` and are handed out in first-seen order. The base
/// lets several submodels share one index space inside one instruction
/// buffer without collisions.
#[derive(Debug, Clone, Default)]
pub struct VertexTable {
    base: usize,
    positions: Vec<FixVec>,
    indices: HashMap<FixVec, usize>,
}

impl VertexTable {
    pub fn new(base: usize) -> Self {
        Self {
            base,
            ..Self::default()
        }
    }

    #[inline]
    pub fn base(&self) -> usize {
        self.base
    }

    /// Number of distinct positions.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions in index order, starting at [`VertexTable::base`].
    #[inline]
    pub fn positions(&self) -> &[FixVec] {
        &self.positions
    }

    /// Returns the index of `position`, adding it if unseen.
    pub fn insert(&mut self, position: FixVec) -> usize {
        if let Some(&index) = self.indices.get(&position) {
            return index;
        }
        let index = self.base + self.positions.len();
        self.positions.push(position);
        self.indices.insert(position, index);
        index
    }

    pub fn index_of(&self, position: FixVec) -> Option<usize> {
        self.indices.get(&position).copied()
    }

    /// Like [`VertexTable::index_of`], narrowed to the 16-bit wire format.
    pub fn wire_index(&self, position: FixVec) -> Result<Option<i16>, CapacityError> {
        self.index_of(position)
            .map(|index| i16::try_from(index).map_err(|_| CapacityError::TooManyVertices(index)))
            .transpose()
    }

    /// Index one past the last vertex, the base for the next block.
    #[inline]
    pub fn end(&self) -> usize {
        self.base + self.positions.len()
    }
}

impl BspVisitor for VertexTable {
    fn visit(&mut self, faces: &[Face]) {
        for face in faces {
            for vertex in &face.vertices {
                self.insert(vertex.position);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::{Surface, Vertex};

    fn v(x: f64, y: f64, z: f64) -> FixVec {
        FixVec::from_f64(x, y, z)
    }

    #[test]
    fn identical_positions_share_an_index() {
        let mut table = VertexTable::new(0);
        let a = table.insert(v(1.0, 2.0, 3.0));
        let b = table.insert(v(4.0, 5.0, 6.0));
        let c = table.insert(v(1.0, 2.0, 3.0));

        assert_eq!((a, b, c), (0, 1, 0));
        assert_eq!(table.len(), 2);
        assert_eq!(table.positions(), &[v(1.0, 2.0, 3.0), v(4.0, 5.0, 6.0)]);
    }

    #[test]
    fn indices_start_at_base() {
        let mut table = VertexTable::new(10);
        assert_eq!(table.insert(v(0.0, 0.0, 0.0)), 10);
        assert_eq!(table.insert(v(0.0, 0.0, 1.0)), 11);
        assert_eq!(table.end(), 12);
        assert_eq!(table.index_of(v(0.0, 0.0, 1.0)), Some(11));
        assert_eq!(table.index_of(v(9.0, 9.0, 9.0)), None);
    }

    #[test]
    fn wire_index_overflows() {
        let mut table = VertexTable::new(i16::MAX as usize);
        table.insert(v(0.0, 0.0, 0.0));
        table.insert(v(1.0, 0.0, 0.0));

        assert_eq!(table.wire_index(v(0.0, 0.0, 0.0)), Ok(Some(i16::MAX)));
        assert_eq!(
            table.wire_index(v(1.0, 0.0, 0.0)),
            Err(CapacityError::TooManyVertices(32768))
        );
    }

    #[test]
    fn visits_faces_in_order() {
        let face = Face::new(
            vec![
                Vertex::new(v(0.0, 0.0, 0.0)),
                Vertex::new(v(1.0, 0.0, 0.0)),
                Vertex::new(v(0.0, 1.0, 0.0)),
            ],
            Surface::Flat(0),
        );
        let mut table = VertexTable::new(0);
        table.visit(&[face.clone(), face]);

        assert_eq!(table.len(), 3);
        assert_eq!(table.index_of(v(0.0, 1.0, 0.0)), Some(2));
    }
}
