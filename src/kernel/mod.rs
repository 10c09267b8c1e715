//! Matrix-vector kernels over the quantization contract.
//!
//! Strategy selection is a closed set of variants fixed once when the
//! [`Kernel`] is built, in place of compile-time switches. Toggling a
//! strategy changes the code path, not the mathematical result beyond
//! quantization error.

pub mod dense;
pub mod layer;
pub mod sparse;

pub use layer::{LayerWeights, SparseLayerWeights, SPARSE_BLOCK};

use crate::error::KernelError;
use crate::hint::assume_disjoint;
use crate::quant::{quantize_act, quantize_act_unsigned, Limits, ACT_UNIT};

/// Accumulation strategy: quantized i8 dot products per output row, or float
/// multiply-accumulate over the unquantized weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatVec {
    DotProd,
    Mac,
}

/// Activation range policy. `SignedUnsigned` stores activations as u8 with a
/// +128 offset and relies on the layer's precomputed subias; mixing the two
/// modes on the same tensor silently corrupts results, so the mode is fixed
/// per kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiasMode {
    Signed,
    SignedUnsigned,
}

/// One configured kernel: strategy pair, capacity bounds, and fixed-extent
/// activation scratch sized once from the bounds.
pub struct Kernel {
    limits: Limits,
    matvec: MatVec,
    bias: BiasMode,
    x_i8: Vec<i8>,
    x_u8: Vec<u8>,
    x_f32: Vec<f32>,
}

impl Kernel {
    pub fn new(matvec: MatVec, bias: BiasMode) -> Self {
        Self::with_limits(Limits::default(), matvec, bias)
    }

    pub fn with_limits(limits: Limits, matvec: MatVec, bias: BiasMode) -> Self {
        Self {
            limits,
            matvec,
            bias,
            x_i8: vec![0; limits.max_inputs],
            x_u8: vec![0; limits.max_inputs],
            x_f32: vec![0.0; limits.max_inputs],
        }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn matvec(&self) -> MatVec {
        self.matvec
    }

    pub fn bias_mode(&self) -> BiasMode {
        self.bias
    }

    /// `out = W x + b` through the configured strategy pair. Capacity bounds
    /// are checked before any accumulation touches the fixed-extent scratch.
    pub fn sgemv(
        &mut self,
        out: &mut [f32],
        layer: &LayerWeights,
        x: &[f32],
    ) -> Result<(), KernelError> {
        self.check_shapes(out.len(), x.len(), layer.rows, layer.cols)?;
        assume_disjoint(out, x);
        let n = x.len();
        match (self.matvec, self.bias) {
            (MatVec::DotProd, BiasMode::Signed) => {
                for i in 0..n {
                    self.x_i8[i] = quantize_act(x[i]);
                }
                dense::sgemv_dot(out, layer, &self.x_i8[..n]);
            }
            (MatVec::DotProd, BiasMode::SignedUnsigned) => {
                for i in 0..n {
                    self.x_u8[i] = quantize_act_unsigned(x[i]);
                }
                dense::sgemv_dot_su(out, layer, &self.x_u8[..n]);
            }
            (MatVec::Mac, _) => {
                self.codec_f32(x);
                dense::sgemv_mac(out, layer, &self.x_f32[..n]);
            }
        }
        Ok(())
    }

    /// Block-sparse counterpart of [`Kernel::sgemv`].
    pub fn sparse_sgemv(
        &mut self,
        out: &mut [f32],
        layer: &SparseLayerWeights,
        x: &[f32],
    ) -> Result<(), KernelError> {
        self.check_shapes(out.len(), x.len(), layer.rows, layer.cols)?;
        assume_disjoint(out, x);
        let n = x.len();
        match (self.matvec, self.bias) {
            (MatVec::DotProd, BiasMode::Signed) => {
                for i in 0..n {
                    self.x_i8[i] = quantize_act(x[i]);
                }
                sparse::sparse_sgemv_dot(out, layer, &self.x_i8[..n]);
            }
            (MatVec::DotProd, BiasMode::SignedUnsigned) => {
                for i in 0..n {
                    self.x_u8[i] = quantize_act_unsigned(x[i]);
                }
                sparse::sparse_sgemv_dot_su(out, layer, &self.x_u8[..n]);
            }
            (MatVec::Mac, _) => {
                self.codec_f32(x);
                sparse::sparse_sgemv_mac(out, layer, &self.x_f32[..n]);
            }
        }
        Ok(())
    }

    fn check_shapes(
        &self,
        out_len: usize,
        x_len: usize,
        rows: usize,
        cols: usize,
    ) -> Result<(), KernelError> {
        self.limits.check_input(x_len)?;
        self.limits.check_output(out_len)?;
        if x_len != cols {
            return Err(KernelError::ShapeMismatch { rows, cols, got: x_len, need: cols });
        }
        if out_len != rows {
            return Err(KernelError::ShapeMismatch { rows, cols, got: out_len, need: rows });
        }
        Ok(())
    }

    /// Run activations through the configured codec and back to float, so the
    /// MAC path sees the same activation rounding as the integer path.
    fn codec_f32(&mut self, x: &[f32]) {
        match self.bias {
            BiasMode::Signed => {
                for i in 0..x.len() {
                    self.x_f32[i] = quantize_act(x[i]) as f32 / ACT_UNIT;
                }
            }
            BiasMode::SignedUnsigned => {
                for i in 0..x.len() {
                    self.x_f32[i] = (quantize_act_unsigned(x[i]) as f32 - 128.0) / ACT_UNIT;
                }
            }
        }
    }
}

/// Unquantized float reference, used to bound the error of every variant.
pub fn sgemv_reference(out: &mut [f32], layer: &LayerWeights, x: &[f32]) {
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
