use tandem_io::{VType, VectorUnit};

use super::{strip_mine, MatrixDims};
use crate::vector::ActiveVector;

/// `y = alpha * x + y`, one fused multiply-accumulate per element.
pub fn saxpy<V: VectorUnit>(vector: &ActiveVector<V>, alpha: f32, x: &[f32], y: &mut [f32]) {
    assert_eq!(x.len(), y.len(), "saxpy: length mismatch");
    let unit = vector.unit();
    strip_mine(unit, y.len(), VType::E32M1, |r| {
        unit.macc_f32(alpha, &x[r.clone()], &mut y[r]);
    });
}

/// `C = A * B`.
///
/// # Logic
/// Zero C. For each row `i` and reduction index `p`, broadcast `A[i][p]` and
/// fuse-multiply-accumulate it against row `B[p][..]` into `C[i][..]`.
/// Vectorizing across the `n` columns rather than along `k` means no strip
/// depends on the result of another within a row.
pub fn matmul_f32<V: VectorUnit>(
    vector: &ActiveVector<V>,
    dims: MatrixDims,
    a: &[f32],
    b: &[f32],
    c: &mut [f32],
) {
    dims.check(a.len(), b.len(), c.len());
    c.fill(0.0);
    if dims.n == 0 {
        return;
    }
    let unit = vector.unit();
    for (i, c_row) in c.chunks_exact_mut(dims.n).enumerate() {
        for p in 0..dims.k {
            let a_ip = a[i * dims.k + p];
            let b_row = &b[p * dims.n..(p + 1) * dims.n];
            strip_mine(unit, dims.n, VType::E32M1, |r| {
                unit.macc_f32(a_ip, &b_row[r.clone()], &mut c_row[r]);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernels::testing::{active, lengths, VLENS};
    use crate::kernels::{all_within, scalar, ELEMENTWISE_TOLERANCE, MATMUL_TOLERANCE};
    use rand::{Rng, SeedableRng};
    use rand::rngs::StdRng;

    #[test]
    fn test_saxpy_matches_scalar_at_strip_boundaries() {
        let mut rng = StdRng::seed_from_u64(5);
        for vlen in VLENS {
            let vector = active(vlen);
            for n in lengths(vlen, VType::E32M1) {
                let x: Vec<f32> = (0..n).map(|_| rng.gen_range(-10.0..10.0)).collect();
                let y: Vec<f32> = (0..n).map(|_| rng.gen_range(-10.0..10.0)).collect();
                let mut expected = y.clone();
                let mut got = y;
                scalar::saxpy(2.5, &x, &mut expected);
                saxpy(&vector, 2.5, &x, &mut got);
                assert!(all_within(&got, &expected, ELEMENTWISE_TOLERANCE), "VLEN={vlen} n={n}");
            }
        }
    }

    #[test]
    fn test_matmul_8x8_matches_triple_loop() {
        let dims = MatrixDims::new(8, 8, 8);
        let a: Vec<f32> = (0..64).map(|i| (i % 7) as f32 * 0.5 + 1.0).collect();
        let b: Vec<f32> = (0..64).map(|i| (i % 5) as f32 * 0.25 - 0.5).collect();
        let mut expected = vec![0.0; 64];
        scalar::matmul_f32(dims, &a, &b, &mut expected);
        for vlen in VLENS {
            let mut c = vec![f32::NAN; 64];
            matmul_f32(&active(vlen), dims, &a, &b, &mut c);
            assert!(all_within(&c, &expected, MATMUL_TOLERANCE), "VLEN={vlen}");
        }
    }

    #[test]
    fn test_matmul_rectangular_wider_than_one_strip() {
        let mut rng = StdRng::seed_from_u64(9);
        let dims = MatrixDims::new(3, 37, 5);
        let a: Vec<f32> = (0..dims.m * dims.k).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let b: Vec<f32> = (0..dims.k * dims.n).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let mut expected = vec![0.0; dims.m * dims.n];
        scalar::matmul_f32(dims, &a, &b, &mut expected);
        let mut c = vec![0.0; dims.m * dims.n];
        matmul_f32(&active(128), dims, &a, &b, &mut c);
        assert!(all_within(&c, &expected, MATMUL_TOLERANCE));
    }

    #[test]
    #[should_panic(expected = "B must be k*n elements")]
    fn test_matmul_rejects_bad_shape() {
        let dims = MatrixDims::new(2, 2, 2);
        let mut c = [0.0; 4];
        matmul_f32(&active(128), dims, &[0.0; 4], &[0.0; 3], &mut c);
    }
}
