//! Dense and block-sparse layer weights.
//!
//! Layers are built from trained float weights and quantized once at
//! construction with the engine-wide scale, so the loader side and the
//! kernels can never disagree on the mapping.

use crate::error::KernelError;
use crate::quant::{quantize_weight, SCALE_1};

/// Side of the square blocks the sparse kernel works in.
pub const SPARSE_BLOCK: usize = 4;

/// Dense affine layer, row-major `rows x cols` (one row per output).
///
/// Keeps the float source weights next to the quantized copy: the MAC
/// strategy and the reference path read floats, the dot-product strategy
/// reads i8.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerWeights {
    pub rows: usize,
    pub cols: usize,
    pub float_weights: Vec<f32>,
    pub weights: Vec<i8>,
    pub bias: Vec<f32>,
    /// Bias corrected for the unsigned-activation path: absorbs the +128
    /// offset every unsigned activation carries into the accumulator.
    pub subias: Vec<f32>,
}

impl LayerWeights {
    pub fn from_float(
        rows: usize,
        cols: usize,
        float_weights: Vec<f32>,
        bias: Vec<f32>,
    ) -> Result<Self, KernelError> {
        if float_weights.len() != rows * cols {
            return Err(KernelError::ShapeMismatch {
                rows,
                cols,
                got: float_weights.len(),
                need: rows * cols,
            });
        }
        if bias.len() != rows {
            return Err(KernelError::ShapeMismatch { rows, cols: 1, got: bias.len(), need: rows });
        }
        let weights: Vec<i8> = float_weights.iter().map(|&w| quantize_weight(w)).collect();
        let subias = su_bias(&bias, |j| {
            weights[j * cols..(j + 1) * cols].iter().map(|&w| w as i32).sum()
        });
        Ok(Self { rows, cols, float_weights, weights, bias, subias })
    }
}

/// Block-sparse affine layer: `SPARSE_BLOCK`-row bands, each keeping only the
/// column blocks that carry nonzero weights. Kept blocks are stored
/// contiguously, row-major within the block.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseLayerWeights {
    pub rows: usize,
    pub cols: usize,
    /// Per band, the starting column of every kept block.
    pub col_idx: Vec<Vec<usize>>,
    pub float_weights: Vec<f32>,
    pub weights: Vec<i8>,
    pub bias: Vec<f32>,
    pub subias: Vec<f32>,
}

impl SparseLayerWeights {
    /// Prune the all-zero blocks out of a dense layer. Dimensions must align
    /// to the block size.
    pub fn from_dense(dense: &LayerWeights) -> Result<Self, KernelError> {
        let (rows, cols) = (dense.rows, dense.cols);
        if rows % SPARSE_BLOCK != 0 || cols % SPARSE_BLOCK != 0 {
            return Err(KernelError::BlockMisaligned { rows, cols, block: SPARSE_BLOCK });
        }
        let bands = rows / SPARSE_BLOCK;
        let mut col_idx = Vec::with_capacity(bands);
        let mut float_weights = Vec::new();
        let mut weights = Vec::new();
        for band in 0..bands {
            let r0 = band * SPARSE_BLOCK;
            let mut kept = Vec::new();
            for c0 in (0..cols).step_by(SPARSE_BLOCK) {
                let live = (0..SPARSE_BLOCK).any(|r| {
                    let row = &dense.float_weights[(r0 + r) * cols..];
                    row[c0..c0 + SPARSE_BLOCK].iter().any(|&w| w != 0.0)
                });
                if !live {
                    continue;
                }
                kept.push(c0);
                for r in 0..SPARSE_BLOCK {
                    let base = (r0 + r) * cols + c0;
                    for c in 0..SPARSE_BLOCK {
                        let w = dense.float_weights[base + c];
                        float_weights.push(w);
                        weights.push(quantize_weight(w));
                    }
                }
            }
            col_idx.push(kept);
        }
        let subias = {
            // Row sums over kept blocks only; pruned blocks are exact zeros.
            let mut sums = vec![0i32; rows];
            let mut off = 0usize;
            for (band, kept) in col_idx.iter().enumerate() {
                for _ in kept {
                    for r in 0..SPARSE_BLOCK {
                        let row = band * SPARSE_BLOCK + r;
                        for c in 0..SPARSE_BLOCK {
                            sums[row] += weights[off + r * SPARSE_BLOCK + c] as i32;
                        }
                    }
                    off += SPARSE_BLOCK * SPARSE_BLOCK;
                }
            }
            su_bias(&dense.bias, |j| sums[j])
        };
        Ok(Self {
            rows,
            cols,
            col_idx,
            float_weights,
            weights,
            bias: dense.bias.clone(),
            subias,
        })
    }

    /// Number of kept blocks across all bands.
    pub fn nb_blocks(&self) -> usize {
        self.col_idx.iter().map(|band| band.len()).sum()
    }
}

/// `subias[j] = bias[j] - 128 * SCALE_1 * sum_i w_q[j][i]`, the correction
/// the unsigned-activation accumulator needs.
fn su_bias(bias: &[f32], row_sum: impl Fn(usize) -> i32) -> Vec<f32> {
    bias.iter()
        .enumerate()
        .map(|(j, &b)| b - row_sum(j) as f32 * (128.0 * SCALE_1))
        .collect()
}
