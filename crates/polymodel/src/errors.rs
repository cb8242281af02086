//! Error types for compiling and decompiling model bytecode.
//!
//! All of them are fatal to the call that raised them: the model is either
//! fully compiled/decompiled or not at all.

use std::io;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Malformed BSP tree or submodel hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("face {face} has {count} vertices, at least 3 are required")]
    TooFewVertices { face: usize, count: usize },
    #[error("face {face} has a zero-length normal")]
    DegenerateFace { face: usize },
    #[error("textured face {face} has a vertex without texture coordinates")]
    MissingUv { face: usize },
    #[error("flat face {face} carries texture coordinates")]
    StrayUv { face: usize },
    #[error("splitting a face left a fragment with {count} vertices")]
    DegenerateSplit { count: usize },
    #[error("split node with only a {present} child")]
    OneSidedNode { present: &'static str },
    #[error("splitter plane has a zero normal")]
    DegenerateSplitter,
    #[error("vertex {0:?} is missing from the point block")]
    UnindexedVertex(crate::FixVec),
    #[error("leaf still holds a face spanning another face's plane")]
    SpanningFaceInLeaf,
    #[error("model has no submodels")]
    EmptyHierarchy,
    #[error("submodel {0} must be the only root, found a parent")]
    RootHasParent(usize),
    #[error("submodel {child} lists no parent or an unknown one")]
    Orphan { child: usize },
    #[error("submodel {child} is not listed among the children of its parent {parent}")]
    BrokenLink { parent: usize, child: usize },
    #[error("submodel {0} is reachable more than once")]
    Cycle(usize),
}

/// The model does not fit the 16-bit limits of the format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error("model too complex: offset {offset} from position {at} exceeds 16 bits")]
    OffsetOutOfRange { at: usize, offset: i64 },
    #[error("model too complex: buffer position {0} exceeds 16 bits")]
    PositionOutOfRange(usize),
    #[error("model too complex: {len} bytes exceed the {capacity} byte scratch buffer")]
    ScratchExhausted { len: usize, capacity: usize },
    #[error("model too complex: vertex index {0} exceeds 16 bits")]
    TooManyVertices(usize),
    #[error("face with {0} vertices cannot be encoded")]
    TooManyFaceVertices(usize),
    #[error("submodel index {0} exceeds 16 bits")]
    TooManySubmodels(usize),
}

/// The instruction buffer is not valid bytecode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unknown opcode {opcode} at {at}")]
    UnknownOpcode { opcode: u16, at: usize },
    #[error("instruction at {at} runs past the end of the buffer")]
    Truncated { at: usize },
    #[error("jump from {at} by {offset} leaves the buffer")]
    BadJump { at: usize, offset: i16 },
    #[error("invalid count {count} at {at}")]
    BadCount { at: usize, count: i16 },
    #[error("instruction at {at} is reached more than once")]
    SharedBranch { at: usize },
    #[error("polygon at {at} references undefined vertex {index}")]
    UndefinedVertex { at: usize, index: i16 },
    #[error("submodel {index} is called more than once")]
    DuplicateSubmodel { index: usize },
    #[error("submodel {index} is never called")]
    MissingSubmodel { index: usize },
    #[error("invalid submodel index {index} at {at}")]
    BadSubmodel { at: usize, index: i16 },
    #[error("instruction nesting deeper than {0}")]
    TooDeep(usize),
}
