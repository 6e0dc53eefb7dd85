//! Vector-length-agnostic kernels.
//!
//! Every kernel is a [`strip_mine`] loop: ask the unit how many elements it
//! will take this trip, hand exactly that many to one strip operation, and
//! advance. Nothing here knows VLEN, so the same code is correct on any
//! register width. Each kernel has a twin in [`scalar`] with the same
//! operation order, used as the reference.

mod elementwise;
mod fused;
mod reduce;
pub mod scalar;

use core::ops::Range;

use tandem_io::{VType, VectorUnit};

pub use elementwise::{add_f32, add_i32, memcpy};
pub use fused::{matmul_f32, saxpy};
pub use reduce::dot_f32;

/// Tolerance for elementwise float kernels.
pub const ELEMENTWISE_TOLERANCE: f32 = 1e-3;
/// Tolerance for the dot product.
pub const DOT_TOLERANCE: f32 = 0.01;
/// Tolerance per element of a matrix product.
pub const MATMUL_TOLERANCE: f32 = 0.1;

/// Shape of `C[m x n] = A[m x k] * B[k x n]`, all row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatrixDims {
    pub m: usize,
    pub n: usize,
    pub k: usize,
}

impl MatrixDims {
    pub const fn new(m: usize, n: usize, k: usize) -> Self {
        Self { m, n, k }
    }

    /// Panics unless the three slices match the shape.
    fn check(&self, a: usize, b: usize, c: usize) {
        assert_eq!(a, self.m * self.k, "A must be m*k elements");
        assert_eq!(b, self.k * self.n, "B must be k*n elements");
        assert_eq!(c, self.m * self.n, "C must be m*n elements");
    }
}

/// Splits `0..len` into hardware-sized strips and calls `strip` on each.
///
/// # Logic
/// While elements remain, negotiate VL for `vtype` against the remaining
/// count, process exactly VL elements, then advance by VL. The hardware
/// guarantees `0 < VL <= remaining` for a non-zero request, so the loop
/// always terminates and never overruns. `len == 0` makes no trips.
pub fn strip_mine<V, F>(unit: &V, len: usize, vtype: VType, mut strip: F)
where
    V: VectorUnit + ?Sized,
    F: FnMut(Range<usize>),
{
    let mut offset = 0;
    while offset < len {
        let remaining = len - offset;
        let vl = unit.set_vl(remaining, vtype);
        debug_assert!(vl > 0 && vl <= remaining, "granted VL {} for {} elements", vl, remaining);
        strip(offset..offset + vl);
        offset += vl;
    }
}

/// `|a - b| <= tolerance`, without pulling in `libm`.
pub fn within(a: f32, b: f32, tolerance: f32) -> bool {
    let diff = a - b;
    diff <= tolerance && -diff <= tolerance
}

/// Elementwise [`within`] over two equally long slices.
pub fn all_within(a: &[f32], b: &[f32], tolerance: f32) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| within(*x, *y, tolerance))
}


#[cfg(test)]
mod tests {
    use super::*;
    use tandem_io::EmulatedVector;

    #[test]
    fn test_strips_cover_range_exactly_once() {
        for vlen in testing::VLENS {
            let unit = EmulatedVector::new(vlen).unwrap();
            unit.enable();
            for len in testing::lengths(vlen, VType::E32M1) {
                let mut next = 0;
                let mut trips = 0;
                strip_mine(&unit, len, VType::E32M1, |range| {
                    assert_eq!(range.start, next);
                    assert!(range.len() <= VType::E32M1.vlmax(vlen));
                    next = range.end;
                    trips += 1;
                });
                assert_eq!(next, len);
                assert_eq!(trips, len.div_ceil(VType::E32M1.vlmax(vlen)));
            }
        }
    }

    #[test]
    fn test_tolerance_is_symmetric() {
        assert!(within(1.0, 1.0005, 1e-3));
        assert!(within(1.0005, 1.0, 1e-3));
        assert!(!within(1.0, 1.01, 1e-3));
        assert!(!all_within(&[1.0], &[1.0, 2.0], 1.0));
    }
}
