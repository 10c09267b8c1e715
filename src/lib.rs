// Quantization scale policy and fixed-extent sgemv kernels for 8-bit inference
pub mod error;
pub mod hint;
pub mod kernel;
pub mod quant;

// Re-exports kept minimal; kernels are reached through `kernel::Kernel`
pub use error::KernelError;
pub use quant::Limits;
