use tandem_io::{VType, VectorUnit};

use super::strip_mine;
use crate::vector::ActiveVector;

/// `out[i] = a[i] + b[i]` (wrapping), e32/m1 strips.
pub fn add_i32<V: VectorUnit>(vector: &ActiveVector<V>, a: &[i32], b: &[i32], out: &mut [i32]) {
    assert!(a.len() == out.len() && b.len() == out.len(), "add_i32: length mismatch");
    let unit = vector.unit();
    strip_mine(unit, out.len(), VType::E32M1, |r| {
        unit.add_i32(&a[r.clone()], &b[r.clone()], &mut out[r]);
    });
}

/// `out[i] = a[i] + b[i]`, e32/m1 strips.
pub fn add_f32<V: VectorUnit>(vector: &ActiveVector<V>, a: &[f32], b: &[f32], out: &mut [f32]) {
    assert!(a.len() == out.len() && b.len() == out.len(), "add_f32: length mismatch");
    let unit = vector.unit();
    strip_mine(unit, out.len(), VType::E32M1, |r| {
        unit.add_f32(&a[r.clone()], &b[r.clone()], &mut out[r]);
    });
}

/// Copies `src` into `dst` in e8/m8 strips, the widest grouping available,
/// so the trip count is as small as the hardware allows.
///
/// The two slices cannot overlap: one is borrowed mutably.
pub fn memcpy<V: VectorUnit>(vector: &ActiveVector<V>, dst: &mut [u8], src: &[u8]) {
    assert_eq!(dst.len(), src.len(), "memcpy: length mismatch");
    let unit = vector.unit();
    strip_mine(unit, dst.len(), VType::E8M8, |r| {
        unit.copy_u8(&src[r.clone()], &mut dst[r]);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::testing::{active, lengths, VLENS};
    use crate::kernels::{all_within, scalar, ELEMENTWISE_TOLERANCE};
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    #[test]
    fn test_add_i32_matches_scalar_at_strip_boundaries() {
        let mut rng = StdRng::seed_from_u64(7);
        for vlen in VLENS {
            let vector = active(vlen);
            for n in lengths(vlen, VType::E32M1) {
                let a: Vec<i32> = (0..n).map(|_| rng.gen()).collect();
                let b: Vec<i32> = (0..n).map(|_| rng.gen()).collect();
                let mut expected = vec![0; n];
                let mut got = vec![0; n];
                scalar::add_i32(&a, &b, &mut expected);
                add_i32(&vector, &a, &b, &mut got);
                assert_eq!(got, expected, "VLEN={vlen} n={n}");
            }
        }
    }

    #[test]
    fn test_add_f32_matches_scalar_at_strip_boundaries() {
        let mut rng = StdRng::seed_from_u64(11);
        for vlen in VLENS {
            let vector = active(vlen);
            for n in lengths(vlen, VType::E32M1) {
                let a: Vec<f32> = (0..n).map(|_| rng.gen_range(-100.0..100.0)).collect();
                let b: Vec<f32> = (0..n).map(|_| rng.gen_range(-100.0..100.0)).collect();
                let mut expected = vec![0.0; n];
                let mut got = vec![0.0; n];
                scalar::add_f32(&a, &b, &mut expected);
                add_f32(&vector, &a, &b, &mut got);
                assert!(all_within(&got, &expected, ELEMENTWISE_TOLERANCE), "VLEN={vlen} n={n}");
            }
        }
    }

    #[test]
    fn test_memcpy_odd_and_multi_strip_sizes() {
        let mut rng = rand::thread_rng();
        for vlen in VLENS {
            let vector = active(vlen);
            let vl = VType::E8M8.vlmax(vlen);
            for n in [0, 1, 3, 269, vl - 1, vl, vl + 1, 3 * vl + 17] {
                let src: Vec<u8> = (0..n).map(|_| rng.gen()).collect();
                let mut dst = vec![0u8; n];
                memcpy(&vector, &mut dst, &src);
                assert_eq!(dst, src, "VLEN={vlen} n={n}");
            }
        }
    }

    #[test]
    #[should_panic(expected = "length mismatch")]
    fn test_mismatched_lengths_panic() {
        let vector = active(128);
        let mut out = [0i32; 3];
        add_i32(&vector, &[1, 2, 3], &[1, 2], &mut out);
    }
}
