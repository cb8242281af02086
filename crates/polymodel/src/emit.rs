//! Compiling submodels into interpreter bytecode.
//!
//! A submodel's instructions are a point block followed by its BSP tree:
//!
//! ```text
//! DefinePointStart count base 0 <points>
//! SortNormal 0 <normal> <point> back front   ; internal node
//! End
//!   <front subtree>
//!   <back subtree>
//! FlatPoly / TexturedPoly ...                 ; leaf
//! End
//! ```
//!
//! Children are nested in front of the tree, one sort node per child. The
//! sort's front branch calls the child, whose own instructions follow that
//! call directly; the back branch carries on with the remaining children and
//! finally the parent's own faces.
//!
//! Jump fields are written as placeholders and patched once the code they
//! point to has been emitted.

use std::io::{Cursor, Seek, SeekFrom};

use byteorder::{LE, WriteBytesExt};
use log::{debug, trace};

use crate::bsp::{BspNode, BspTree, SplitterSelector};
use crate::errors::{CapacityError, Result, StructuralError};
use crate::face::{Face, Surface};
use crate::fix::FixVec;
use crate::model::PolyModel;
use crate::op::{self, Opcode};
use crate::options::CompileOptions;
use crate::plane::Plane;
use crate::vertices::VertexTable;

impl PolyModel {
    /// Compiles every submodel into [`PolyModel::data`] and records each
    /// submodel's entry point and bounds.
    ///
    /// The model is only modified if the whole compile succeeds.
    pub fn compile(&mut self, options: &CompileOptions) -> Result<()> {
        self.compile_with(options, &options.selector())
    }

    /// Like [`PolyModel::compile`], with a custom splitter selector.
    pub fn compile_with<S: SplitterSelector>(
        &mut self,
        options: &CompileOptions,
        selector: &S,
    ) -> Result<()> {
        self.validate_hierarchy()?;

        let mut emitter = Emitter::new(options.scratch_size, selector);
        let mut pointers = vec![0; self.submodels.len()];
        emitter.emit_submodel(self, 0, &mut pointers)?;
        let data = emitter.finish()?;

        debug!(
            "compiled {} submodels, {} faces into {} bytes",
            self.submodels.len(),
            self.face_count(),
            data.len()
        );

        self.data = data;
        for (submodel, pointer) in self.submodels.iter_mut().zip(pointers) {
            submodel.pointer = pointer;
        }
        self.update_bounds();
        Ok(())
    }
}

/// Writes instructions into a growable scratch buffer.
pub struct Emitter<'a, S> {
    out: Cursor<Vec<u8>>,
    capacity: usize,
    selector: &'a S,
    /// First vertex index of the next point block.
    next_vertex: usize,
}

impl<'a, S: SplitterSelector> Emitter<'a, S> {
    pub fn new(capacity: usize, selector: &'a S) -> Self {
        // nothing past i16::MAX is addressable
        let reserve = capacity.min(i16::MAX as usize + 1);
        Self {
            out: Cursor::new(Vec::with_capacity(reserve)),
            capacity,
            selector,
            next_vertex: 0,
        }
    }

    /// Current write position.
    #[inline]
    pub fn position(&self) -> usize {
        self.out.position() as usize
    }

    /// Checks the final size and hands out the buffer.
    pub fn finish(self) -> Result<Vec<u8>> {
        let data = self.out.into_inner();
        if data.len() > self.capacity {
            return Err(CapacityError::ScratchExhausted {
                len: data.len(),
                capacity: self.capacity,
            }
            .into());
        }
        if data.len() > i16::MAX as usize {
            return Err(CapacityError::PositionOutOfRange(data.len()).into());
        }
        Ok(data)
    }

    /// Emits submodel `id` at the current position, followed by everything
    /// nested inside it. Entry points land in `pointers`, one per submodel.
    fn emit_submodel(
        &mut self,
        model: &PolyModel,
        id: usize,
        pointers: &mut [usize],
    ) -> Result<()> {
        let start = self.position();
        if start > i16::MAX as usize {
            return Err(CapacityError::PositionOutOfRange(start).into());
        }
        pointers[id] = start;

        let tree = BspTree::build(model.submodels[id].faces.clone(), self.selector)?;
        if let Some(root) = tree.root() {
            root.validate()?;
        }

        let mut table = VertexTable::new(self.next_vertex);
        tree.walk(&mut table);
        self.next_vertex = table.end();
        self.write_points(&table)?;

        trace!(
            "submodel {} at {}: {} faces, {} points from {}, depth {}",
            id,
            start,
            tree.face_count(),
            table.len(),
            table.base(),
            tree.depth()
        );

        let order = model.nesting_order(id);
        self.emit_nested(model, id, &order, &tree, &table, pointers)
    }

    /// Wraps the next child in `order` in a sort node, recursing for the rest
    /// until only the parent's own faces remain.
    fn emit_nested(
        &mut self,
        model: &PolyModel,
        parent: usize,
        order: &[usize],
        tree: &BspTree,
        table: &VertexTable,
        pointers: &mut [usize],
    ) -> Result<()> {
        let Some((&child, rest)) = order.split_first() else {
            return match tree.root() {
                Some(root) => self.emit_node(root, table),
                None => self.write_end(),
            };
        };

        let plane = model.separating_plane(parent, child);
        let sort_at = self.write_sort(&plane)?;
        self.write_end()?;

        let front_at = self.position();
        let call_at = self.write_call(child, model.submodels[child].offset)?;
        self.write_end()?;
        let target = self.position();
        self.patch(call_at, op::SUB_CALL_JUMP_FIELD, target)?;
        self.emit_submodel(model, child, pointers)?;

        let back_at = self.position();
        self.emit_nested(model, parent, rest, tree, table, pointers)?;

        self.patch(sort_at, op::SORT_BACK_FIELD, back_at)?;
        self.patch(sort_at, op::SORT_FRONT_FIELD, front_at)
    }

    /// Emits a BSP subtree.
    pub fn emit_node(&mut self, node: &BspNode, table: &VertexTable) -> Result<()> {
        match node {
            BspNode::Internal { plane, front, back } => {
                if plane.is_degenerate() {
                    return Err(StructuralError::DegenerateSplitter.into());
                }
                let sort_at = self.write_sort(plane)?;
                self.write_end()?;

                let front_at = self.position();
                self.emit_node(front, table)?;
                let back_at = self.position();
                self.emit_node(back, table)?;

                self.patch(sort_at, op::SORT_BACK_FIELD, back_at)?;
                self.patch(sort_at, op::SORT_FRONT_FIELD, front_at)
            }
            BspNode::Leaf(faces) => {
                for (index, face) in faces.iter().enumerate() {
                    face.validate(index)?;
                    self.write_poly(face, table)?;
                }
                self.write_end()
            }
        }
    }

    /// Overwrites the jump field at `instruction + field` with the offset
    /// from `instruction` to `target`.
    fn patch(&mut self, instruction: usize, field: usize, target: usize) -> Result<()> {
        let relative = target as i64 - instruction as i64;
        let offset = i16::try_from(relative).map_err(|_| CapacityError::OffsetOutOfRange {
            at: instruction,
            offset: relative,
        })?;

        let resume = self.out.position();
        self.out.seek(SeekFrom::Start((instruction + field) as u64))?;
        self.out.write_i16::<LE>(offset)?;
        self.out.seek(SeekFrom::Start(resume))?;
        Ok(())
    }

    fn write_op(&mut self, opcode: Opcode) -> Result<usize> {
        let at = self.position();
        self.out.write_u16::<LE>(opcode as u16)?;
        Ok(at)
    }

    fn write_end(&mut self) -> Result<()> {
        self.write_op(Opcode::End)?;
        Ok(())
    }

    fn write_points(&mut self, table: &VertexTable) -> Result<()> {
        let count = i16::try_from(table.len())
            .map_err(|_| CapacityError::TooManyVertices(table.end()))?;
        let base = i16::try_from(table.base())
            .map_err(|_| CapacityError::TooManyVertices(table.base()))?;

        self.write_op(Opcode::DefinePointStart)?;
        self.out.write_i16::<LE>(count)?;
        self.out.write_i16::<LE>(base)?;
        self.out.write_i16::<LE>(0)?;
        for position in table.positions() {
            position.write(&mut self.out)?;
        }
        Ok(())
    }

    fn write_poly(&mut self, face: &Face, table: &VertexTable) -> Result<()> {
        let count = i16::try_from(face.len())
            .map_err(|_| CapacityError::TooManyFaceVertices(face.len()))?;
        let (opcode, surface) = match face.surface {
            Surface::Flat(color) => (Opcode::FlatPoly, color),
            Surface::Textured(texture) => (Opcode::TexturedPoly, texture),
        };

        self.write_op(opcode)?;
        self.out.write_i16::<LE>(count)?;
        face.point.write(&mut self.out)?;
        face.normal.write(&mut self.out)?;
        self.out.write_u16::<LE>(surface)?;

        for vertex in &face.vertices {
            let index = table
                .wire_index(vertex.position)?
                .ok_or(StructuralError::UnindexedVertex(vertex.position))?;
            self.out.write_i16::<LE>(index)?;
        }
        if face.len() % 2 == 0 {
            self.out.write_i16::<LE>(0)?;
        }

        if face.is_textured() {
            for vertex in &face.vertices {
                if let Some(uv) = vertex.uv {
                    uv.write(&mut self.out)?;
                }
            }
        }
        Ok(())
    }

    /// Writes a sort node with both jumps zeroed. Returns its position.
    fn write_sort(&mut self, plane: &Plane) -> Result<usize> {
        let at = self.write_op(Opcode::SortNormal)?;
        self.out.write_i16::<LE>(0)?;
        plane.normal.write(&mut self.out)?;
        plane.point.write(&mut self.out)?;
        self.out.write_i16::<LE>(0)?;
        self.out.write_i16::<LE>(0)?;
        Ok(at)
    }

    /// Writes a submodel call with its jump zeroed. Returns its position.
    fn write_call(&mut self, submodel: usize, offset: FixVec) -> Result<usize> {
        let index =
            i16::try_from(submodel).map_err(|_| CapacityError::TooManySubmodels(submodel))?;

        let at = self.write_op(Opcode::SubCall)?;
        self.out.write_i16::<LE>(index)?;
        offset.write(&mut self.out)?;
        self.out.write_i16::<LE>(0)?;
        self.out.write_i16::<LE>(0)?;
        Ok(at)
    }
}
