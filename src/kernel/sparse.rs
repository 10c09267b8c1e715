//! Block-sparse sgemv variants. Same accumulation contract as the dense
//! kernels, walking only the kept column blocks of each band.

use crate::kernel::layer::{SparseLayerWeights, SPARSE_BLOCK};
use crate::quant::SCALE_1;

pub(crate) fn sparse_sgemv_dot(out: &mut [f32], layer: &SparseLayerWeights, x_q: &[i8]) {
    accumulate_i32(out, layer, &layer.bias, |w, c| w as i32 * x_q[c] as i32)
}

pub(crate) fn sparse_sgemv_dot_su(out: &mut [f32], layer: &SparseLayerWeights, x_q: &[u8]) {
    accumulate_i32(out, layer, &layer.subias, |w, c| w as i32 * x_q[c] as i32)
}

pub(crate) fn sparse_sgemv_mac(out: &mut [f32], layer: &SparseLayerWeights, x: &[f32]) {
    let mut off = 0usize;
    for (band, kept) in layer.col_idx.iter().enumerate() {
        let r0 = band * SPARSE_BLOCK;
        let mut acc = [0f32; SPARSE_BLOCK];
        for r in 0..SPARSE_BLOCK {
            acc[r] = layer.bias[r0 + r];
        }
        for &c0 in kept {
            for r in 0..SPARSE_BLOCK {
                for c in 0..SPARSE_BLOCK {
                    acc[r] += layer.float_weights[off + r * SPARSE_BLOCK + c] * x[c0 + c];
                }
            }
            off += SPARSE_BLOCK * SPARSE_BLOCK;
        }
        out[r0..r0 + SPARSE_BLOCK].copy_from_slice(&acc);
    }
}

fn accumulate_i32(
    out: &mut [f32],
    layer: &SparseLayerWeights,
    bias: &[f32],
    mul: impl Fn(i8, usize) -> i32,
) {
    let mut off = 0usize;
    for (band, kept) in layer.col_idx.iter().enumerate() {
        let r0 = band * SPARSE_BLOCK;
        let mut acc = [0i32; SPARSE_BLOCK];
        for &c0 in kept {
            for r in 0..SPARSE_BLOCK {
                for c in 0..SPARSE_BLOCK {
                    acc[r] += mul(layer.weights[off + r * SPARSE_BLOCK + c], c0 + c);
                }
            }
            off += SPARSE_BLOCK * SPARSE_BLOCK;
        }
        for r in 0..SPARSE_BLOCK {
            out[r0 + r] = bias[r0 + r] + acc[r] as f32 * SCALE_1;
        }
    }
}
