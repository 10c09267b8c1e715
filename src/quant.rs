//! Quantization scale policy and capacity bounds shared by every kernel.
//!
//! The engine stores weights and activations as 8-bit fixed point. `SCALE` is
//! the product of the two sub-ranges involved in a weight x activation
//! product (signed weight range 128, activation range 127), so an i32
//! accumulator over quantized pairs comes back to float with a single
//! `SCALE_1` multiply.

use crate::error::{Axis, KernelError};

/// Float -> fixed-point scale, 128 * 127.
pub const SCALE: f32 = 128.0 * 127.0;
/// Reciprocal of `SCALE`. Derived, never a separately rounded literal.
pub const SCALE_1: f32 = 1.0 / SCALE;

/// Sub-range used when quantizing a weight into i8.
pub const WEIGHT_UNIT: f32 = 128.0;
/// Sub-range used when quantizing an activation into i8/u8.
pub const ACT_UNIT: f32 = 127.0;

/// Hard cap on the input vector length a kernel call may process.
pub const MAX_INPUTS: usize = 2048;
/// Hard cap on the output vector length a kernel call may produce.
pub const MAX_OUTPUTS: usize = 8192;

/// Quantize to the signed byte range. Out-of-range values saturate; wrapping
/// would corrupt the tensor silently.
#[inline]
pub fn to_fixed(x: f32) -> i8 {
    (x * SCALE).round().clamp(i8::MIN as f32, i8::MAX as f32) as i8
}

/// Quantize to the unsigned byte range (the activation slot under the
/// signed x unsigned policy). Saturates like [`to_fixed`].
#[inline]
pub fn to_fixed_unsigned(x: f32) -> u8 {
    (x * SCALE).round().clamp(0.0, u8::MAX as f32) as u8
}

/// Inverse of [`to_fixed`] up to rounding: the round-trip error is bounded by
/// `0.5 * SCALE_1`.
#[inline]
pub fn to_float(q: i8) -> f32 {
    q as f32 * SCALE_1
}

#[inline]
pub fn to_float_unsigned(q: u8) -> f32 {
    q as f32 * SCALE_1
}

/// Weight-slot quantizer used at layer construction; the loader side must
/// apply the same mapping so loader and kernel agree on scale.
#[inline]
pub fn quantize_weight(w: f32) -> i8 {
    (w * WEIGHT_UNIT).round().clamp(i8::MIN as f32, i8::MAX as f32) as i8
}

/// Activation quantizer for the all-signed kernel path.
#[inline]
pub fn quantize_act(x: f32) -> i8 {
    (x * ACT_UNIT).round().clamp(i8::MIN as f32, i8::MAX as f32) as i8
}

/// Activation quantizer for the signed x unsigned path: `x * 127 + 128`,
/// saturated to u8. The +128 offset is what the per-output subias term
/// compensates for.
#[inline]
pub fn quantize_act_unsigned(x: f32) -> u8 {
    (x * ACT_UNIT + 128.0).round().clamp(0.0, u8::MAX as f32) as u8
}

/// Capacity bounds for kernel calls. The defaults mirror the engine-wide
/// constants; tests substitute smaller bounds to exercise the checks without
/// allocating full-size tensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_inputs: usize,
    pub max_outputs: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_inputs: MAX_INPUTS, max_outputs: MAX_OUTPUTS }
    }
}

impl Limits {
    /// Reject input vectors longer than the bound. Exceeding it is a
    /// malformed-topology bug, not a recoverable runtime condition.
    #[inline]
    pub fn check_input(&self, len: usize) -> Result<(), KernelError> {
        if len > self.max_inputs {
            return Err(KernelError::CapacityExceeded { axis: Axis::Input, len, max: self.max_inputs });
        }
        Ok(())
    }

    #[inline]
    pub fn check_output(&self, len: usize) -> Result<(), KernelError> {
        if len > self.max_outputs {
            return Err(KernelError::CapacityExceeded { axis: Axis::Output, len, max: self.max_outputs });
        }
        Ok(())
    }
}
