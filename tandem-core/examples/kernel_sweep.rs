use std::time::Instant;

use tandem_core::kernels::{self, scalar, MatrixDims};
use tandem_core::vector::{detect, VType};
use tandem_io::EmulatedVector;

fn main() {
    let n = 4096;
    let iterations = 2_000;

    let a: Vec<f32> = (0..n).map(|i| (i % 97) as f32 * 0.01).collect();
    let b = vec![0.5f32; n];

    // 1. Dot product: scalar twin once, then the vector kernel at every VLEN
    println!("Benchmarking f32 Dot Product, n = {} ({} iterations)...", n, iterations);
    let start = Instant::now();
    let mut sum = 0.0;
    for _ in 0..iterations {
        sum += scalar::dot_f32(&a, &b);
    }
    let scalar_time = start.elapsed();
    println!("Scalar:        {:?} (Dummy sum: {})", scalar_time, sum);

    for vlen in [128, 256, 512, 1024, 4096] {
        let vector = detect(EmulatedVector::new(vlen).expect("valid VLEN"))
            .expect("emulated unit has V")
            .enable();
        let start = Instant::now();
        let mut sum = 0.0;
        for _ in 0..iterations {
            sum += kernels::dot_f32(&vector, &a, &b);
        }
        let trips = n.div_ceil(VType::E32M1.vlmax(vlen));
        println!(
            "VLEN {:>5}:    {:?} ({} strips per call, Dummy sum: {})",
            vlen,
            start.elapsed(),
            trips,
            sum
        );
    }

    // 2. Matrix multiply, 32x32
    let dim = 32;
    let dims = MatrixDims::new(dim, dim, dim);
    let ma: Vec<f32> = (0..dim * dim).map(|i| (i % 13) as f32 * 0.1).collect();
    let mb: Vec<f32> = (0..dim * dim).map(|i| (i % 7) as f32 * 0.2).collect();
    let mut expected = vec![0.0; dim * dim];
    let mut c = vec![0.0; dim * dim];

    println!("\nBenchmarking {}x{} Matrix Multiply...", dim, dim);
    let start = Instant::now();
    for _ in 0..iterations / 10 {
        scalar::matmul_f32(dims, &ma, &mb, &mut expected);
    }
    let scalar_mm = start.elapsed();
    println!("Scalar:        {:?}", scalar_mm);

    let vector = detect(EmulatedVector::new(256).expect("valid VLEN"))
        .expect("emulated unit has V")
        .enable();
    let start = Instant::now();
    for _ in 0..iterations / 10 {
        kernels::matmul_f32(&vector, dims, &ma, &mb, &mut c);
    }
    let vector_mm = start.elapsed();
    let agree = kernels::all_within(&c, &expected, kernels::MATMUL_TOLERANCE);
    println!("VLEN   256:    {:?} (matches scalar: {})", vector_mm, agree);

    println!(
        "\nSummary Speedup (emulated VLEN 256 vs Scalar matmul): {:.2}x",
        scalar_mm.as_secs_f64() / vector_mm.as_secs_f64()
    );
}
