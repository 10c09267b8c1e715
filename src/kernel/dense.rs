//! Dense sgemv variants. Scalar reference kernels; SIMD paths will slot in
//! under the `simd-*` feature flags.

use crate::kernel::layer::LayerWeights;
use crate::quant::SCALE_1;

#[inline]
pub(crate) fn dot_i8_i8(w_row: &[i8], x: &[i8]) -> i32 {
    let mut acc: i32 = 0;
    for i in 0..w_row.len() {
        acc += (w_row[i] as i32) * (x[i] as i32);
    }
    acc
}

#[inline]
pub(crate) fn dot_i8_u8(w_row: &[i8], x: &[u8]) -> i32 {
    let mut acc: i32 = 0;
    for i in 0..w_row.len() {
        acc += (w_row[i] as i32) * (x[i] as i32);
    }
    acc
}

/// Quantized rows x signed i8 activations, plain bias.
pub(crate) fn sgemv_dot(out: &mut [f32], layer: &LayerWeights, x_q: &[i8]) {
    let cols = layer.cols;
    for j in 0..layer.rows {
        let row = &layer.weights[j * cols..(j + 1) * cols];
        out[j] = layer.bias[j] + dot_i8_i8(row, x_q) as f32 * SCALE_1;
    }
}

/// Quantized rows x unsigned u8 activations. The +128 offset baked into
/// every activation is cancelled by the precomputed subias.
pub(crate) fn sgemv_dot_su(out: &mut [f32], layer: &LayerWeights, x_q: &[u8]) {
    let cols = layer.cols;
    for j in 0..layer.rows {
        let row = &layer.weights[j * cols..(j + 1) * cols];
        out[j] = layer.subias[j] + dot_i8_u8(row, x_q) as f32 * SCALE_1;
    }
}

/// Float multiply-accumulate over the unquantized weights. `x` has already
/// been through the activation codec, so this path still sees quantization
/// error on the activation side only.
pub(crate) fn sgemv_mac(out: &mut [f32], layer: &LayerWeights, x: &[f32]) {
    let cols = layer.cols;
    for j in 0..layer.rows {
        let row = &layer.float_weights[j * cols..(j + 1) * cols];
        let mut acc = layer.bias[j];
        for i in 0..cols {
            acc += row[i] * x[i];
        }
        out[j] = acc;
    }
}
