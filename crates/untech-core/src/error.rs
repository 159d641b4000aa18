use thiserror::Error;

use crate::geometry::{UPoint, USize};

/// Errors raised by the fallible grid primitives
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("position {position} is outside a {size} grid")]
    OutOfBounds { position: UPoint, size: USize },

    #[error("grid expects {expected} cells, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },

    #[error("grid size {width}x{height} is too large")]
    SizeOverflow { width: u32, height: u32 },
}
