//! Aliasing hints for kernel buffers.
//!
//! Toolchains that cannot promise two kernel buffers never overlap must
//! degrade the promise to a no-op without changing results. Rust slices
//! already carry exclusivity through the borrow checker, so the hint reduces
//! to a debug-build check that two caller-supplied buffers really are
//! disjoint; release builds compile it away and numeric results never depend
//! on it.

/// Debug-assert that `a` and `b` occupy disjoint memory.
#[inline(always)]
pub fn assume_disjoint<T, U>(a: &[T], b: &[U]) {
    debug_assert!(disjoint(a, b), "kernel buffers overlap");
    let _ = (a, b);
}

fn disjoint<T, U>(a: &[T], b: &[U]) -> bool {
    let a_start = a.as_ptr() as usize;
    let a_end = a_start + std::mem::size_of_val(a);
    let b_start = b.as_ptr() as usize;
    let b_end = b_start + std::mem::size_of_val(b);
    a_end <= b_start || b_end <= a_start
}
