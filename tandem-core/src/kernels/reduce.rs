use tandem_io::{VType, VectorUnit};

use super::strip_mine;
use crate::vector::ActiveVector;

/// `sum(a[i] * b[i])`.
///
/// Each strip multiplies elementwise and folds the products into the running
/// sum with an ordered reduction, so the result is summed in index order just
/// like [`super::scalar::dot_f32`] and is reproducible across register widths.
pub fn dot_f32<V: VectorUnit>(vector: &ActiveVector<V>, a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "dot_f32: length mismatch");
    let unit = vector.unit();
    let mut acc = 0.0f32;
    strip_mine(unit, a.len(), VType::E32M1, |r| {
        acc = unit.mul_reduce_f32(&a[r.clone()], &b[r], acc);
    });
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::testing::{active, lengths, VLENS};
    use crate::kernels::{scalar, within, DOT_TOLERANCE};
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    #[test]
    fn test_ramp_dot_ones_is_2080() {
        let a: Vec<f32> = (1..=64).map(|i| i as f32).collect();
        let b = vec![1.0f32; 64];
        for vlen in VLENS {
            let vector = active(vlen);
            assert!(within(dot_f32(&vector, &a, &b), 2080.0, DOT_TOLERANCE));
        }
        assert!(within(scalar::dot_f32(&a, &b), 2080.0, DOT_TOLERANCE));
    }

    #[test]
    fn test_matches_scalar_at_strip_boundaries() {
        let mut rng = StdRng::seed_from_u64(3);
        for vlen in VLENS {
            let vector = active(vlen);
            for n in lengths(vlen, VType::E32M1) {
                let a: Vec<f32> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
                let b: Vec<f32> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
                let got = dot_f32(&vector, &a, &b);
                let expected = scalar::dot_f32(&a, &b);
                assert!(within(got, expected, DOT_TOLERANCE), "VLEN={vlen} n={n}: {got} vs {expected}");
            }
        }
    }

    #[test]
    fn test_empty_input_is_zero() {
        assert_eq!(dot_f32(&active(256), &[], &[]), 0.0);
    }
}
