use std::fmt;
use thiserror::Error;

/// Which tensor dimension tripped a capacity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Input,
    Output,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Input => write!(f, "input"),
            Axis::Output => write!(f, "output"),
        }
    }
}

/// Kernel-level failures. All of these indicate a model/kernel mismatch and
/// abort the current call; lossy conditions (value overflow during
/// quantization) saturate instead and never surface here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KernelError {
    #[error("{axis} length {len} exceeds fixed capacity {max}")]
    CapacityExceeded { axis: Axis, len: usize, max: usize },

    #[error("buffer holds {got} values, layer shape {rows}x{cols} needs {need}")]
    ShapeMismatch { rows: usize, cols: usize, got: usize, need: usize },

    #[error("sparse layer dims {rows}x{cols} must align to {block}x{block} blocks")]
    BlockMisaligned { rows: usize, cols: usize, block: usize },
}
