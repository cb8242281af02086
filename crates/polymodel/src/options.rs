//! Compiler configuration.

use crate::bsp::{LeastCost, DEFAULT_SPAN_WEIGHT};

/// Size of the scratch buffer a compile starts with. Offsets in the format
/// are signed 16-bit, so nothing larger can be addressed anyway.
pub const DEFAULT_SCRATCH_SIZE: usize = 0x8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Penalty per split face when scoring splitter candidates.
    pub span_weight: u32,
    /// Maximum size of the compiled instruction buffer.
    pub scratch_size: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            span_weight: DEFAULT_SPAN_WEIGHT,
            scratch_size: DEFAULT_SCRATCH_SIZE,
        }
    }
}

impl CompileOptions {
    /// The splitter selector these options describe.
    pub fn selector(&self) -> LeastCost {
        LeastCost::new(self.span_weight)
    }
}
