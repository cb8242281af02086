//! Instruction set of the model interpreter.
//!
//! Every instruction starts with a 16-bit little-endian opcode. Jump fields
//! are signed 16-bit offsets relative to the start of the instruction that
//! holds them.

use crate::errors::FormatError;

/// Opcodes understood by the legacy renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum Opcode {
    /// Ends the current branch
    End = 0,
    /// Transforms a run of points into the vertex table
    DefinePoints = 1,
    /// Solid-color polygon
    FlatPoly = 2,
    /// Texture-mapped polygon
    TexturedPoly = 3,
    /// Draws two subtrees in the order given by the viewer's side of a plane
    SortNormal = 4,
    /// Draws a submodel in its parent's frame, then resumes
    SubCall = 6,
    /// Like `DefinePoints`, with an explicit first index
    DefinePointStart = 7,
}

impl TryFrom<(u16, usize)> for Opcode {
    type Error = FormatError;

    /// Decodes `(opcode, position)`; the position only labels the error.
    fn try_from((opcode, at): (u16, usize)) -> Result<Self, FormatError> {
        Ok(match opcode {
            0 => Opcode::End,
            1 => Opcode::DefinePoints,
            2 => Opcode::FlatPoly,
            3 => Opcode::TexturedPoly,
            4 => Opcode::SortNormal,
            6 => Opcode::SubCall,
            7 => Opcode::DefinePointStart,
            _ => return Err(FormatError::UnknownOpcode { opcode, at }),
        })
    }
}

/// `op, count, first index, pad`, followed by the points.
pub const POINTS_HEADER_SIZE: usize = 8;

/// `op, count, point, normal, color/texture`, followed by the vertex indices.
pub const POLY_HEADER_SIZE: usize = 30;

pub const END_SIZE: usize = 2;

/// `op, reserved, normal, point, back, front`
pub const SORT_NORMAL_SIZE: usize = 32;
pub const SORT_BACK_FIELD: usize = 28;
pub const SORT_FRONT_FIELD: usize = 30;

/// `op, submodel, offset, jump, pad`
pub const SUB_CALL_SIZE: usize = 20;
pub const SUB_CALL_JUMP_FIELD: usize = 16;

/// Number of halfwords in a polygon's vertex index list. An even count gets a
/// padding halfword so the fields after it stay 32-bit aligned.
#[inline]
pub fn index_list_len(count: usize) -> usize {
    if count % 2 == 0 { count + 1 } else { count }
}

/// Total size of a polygon instruction with `count` vertices.
pub fn poly_size(count: usize, textured: bool) -> usize {
    let uvs = if textured { count * crate::FixVec::SIZE } else { 0 };
    POLY_HEADER_SIZE + index_list_len(count) * 2 + uvs
}
