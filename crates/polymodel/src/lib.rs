//! BSP compiler and decompiler for polygon model bytecode.
//!
//! Models of the game are drawn by a small interpreter: a stream of
//! instructions that defines points, draws flat or textured polygons, sorts
//! subtrees by the viewer's side of a plane and calls submodels. This crate
//! turns an unordered set of faces per submodel into that stream
//! ([`PolyModel::compile`]) and recovers the faces and hierarchy from an
//! existing stream ([`PolyModel::decompile`]).
//!
//! ```ignore
//! use polymodel::{CompileOptions, PolyModel};
//!
//! let mut model = PolyModel::from_faces(faces);
//! model.compile(&CompileOptions::default())?;
//! let recovered = PolyModel::decompile(&model.data)?;
//! ```

pub mod bsp;
mod emit;
pub mod errors;
mod face;
mod fix;
mod hierarchy;
mod interp;
mod model;
pub mod op;
mod options;
mod plane;
mod split;
mod vertices;

pub use bsp::{BspNode, BspTree, BspVisitor, LeastCost, SplitterSelector};
pub use emit::Emitter;
pub use errors::{CapacityError, Error, FormatError, Result, StructuralError};
pub use face::{Face, Surface, Vertex};
pub use fix::{Fix, FixVec};
pub use interp::{Interpreter, MAX_DEPTH};
pub use model::{PolyModel, Submodel};
pub use options::{CompileOptions, DEFAULT_SCRATCH_SIZE};
pub use plane::{Classification, Plane, PlaneSide, PLANE_EPSILON};
pub use split::split_face;
pub use vertices::VertexTable;
