//! Binary Space Partitioning of a submodel's faces.
//!
//! The tree decides the paint order the legacy renderer follows: at every
//! internal node it draws the subtree on the far side of the splitter before
//! the near one.
//!
//! # Architecture
//!
//! - [`BspTree`]: The container holding the root node
//! - [`BspNode`]: Either a leaf of mutually non-spanning faces or a split
//! - [`SplitterSelector`]: Strategy trait for choosing splitting faces
//! - [`BspVisitor`]: Visitor trait for walking the leaves

mod node;
mod selector;
mod tree;
mod visitor;

pub use node::BspNode;
pub use selector::{LeastCost, SplitterSelector, DEFAULT_SPAN_WEIGHT};
pub use tree::BspTree;
pub use visitor::{BspVisitor, CollectingVisitor};
