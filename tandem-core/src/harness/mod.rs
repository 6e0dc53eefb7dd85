//! Verification and benchmark harness.
//!
//! Each workload seeds deterministic inputs, times the scalar twin, times the
//! vector kernel on a fresh copy of the same inputs, and compares. A failing
//! comparison is reported and the suite moves on to the next workload.

mod report;

use log::{debug, info};
use tandem_io::{CycleCounter, VectorUnit};

use crate::kernels::{self, scalar, MatrixDims};
use crate::vector::ActiveVector;

pub use report::{verdict, write_banner, write_summary, BenchmarkResult, Tally};

pub const VECTOR_LEN: usize = 64;
pub const MEMCPY_LEN: usize = 269;
pub const MATRIX_DIM: usize = 8;

const MATRIX_LEN: usize = MATRIX_DIM * MATRIX_DIM;
const SAXPY_ALPHA: f32 = 2.0;

/// Names of the workloads, in the order [`Harness::run_all`] runs them.
pub const WORKLOADS: [&str; 6] =
    ["vec_add_i32", "memcpy", "vec_add_f32", "dot_product_f32", "saxpy", "matmul_f32"];

/// Every buffer the suite touches. Statically sized, so an image can place
/// one in `.bss` and never allocate.
pub struct Workspace {
    a_i32: [i32; VECTOR_LEN],
    b_i32: [i32; VECTOR_LEN],
    scalar_i32: [i32; VECTOR_LEN],
    vector_i32: [i32; VECTOR_LEN],
    a_f32: [f32; VECTOR_LEN],
    b_f32: [f32; VECTOR_LEN],
    scalar_f32: [f32; VECTOR_LEN],
    vector_f32: [f32; VECTOR_LEN],
    src: [u8; MEMCPY_LEN],
    scalar_dst: [u8; MEMCPY_LEN],
    vector_dst: [u8; MEMCPY_LEN],
    mat_a: [f32; MATRIX_LEN],
    mat_b: [f32; MATRIX_LEN],
    scalar_mat: [f32; MATRIX_LEN],
    vector_mat: [f32; MATRIX_LEN],
}

impl Workspace {
    pub const fn new() -> Self {
        Self {
            a_i32: [0; VECTOR_LEN],
            b_i32: [0; VECTOR_LEN],
            scalar_i32: [0; VECTOR_LEN],
            vector_i32: [0; VECTOR_LEN],
            a_f32: [0.0; VECTOR_LEN],
            b_f32: [0.0; VECTOR_LEN],
            scalar_f32: [0.0; VECTOR_LEN],
            vector_f32: [0.0; VECTOR_LEN],
            src: [0; MEMCPY_LEN],
            scalar_dst: [0; MEMCPY_LEN],
            vector_dst: [0; MEMCPY_LEN],
            mat_a: [0.0; MATRIX_LEN],
            mat_b: [0.0; MATRIX_LEN],
            scalar_mat: [0.0; MATRIX_LEN],
            vector_mat: [0.0; MATRIX_LEN],
        }
    }

    /// Fills every input with the same values on every run.
    pub fn seed(&mut self) {
        for i in 0..VECTOR_LEN {
            let x = i as i32;
            self.a_i32[i] = x * 3 - 17;
            self.b_i32[i] = 1000 - x * 7;
            // Ramp 1..=64 against ones, so the dot product is exactly 2080.
            self.a_f32[i] = (i + 1) as f32;
            self.b_f32[i] = 1.0;
        }
        for (i, byte) in self.src.iter_mut().enumerate() {
            *byte = (i * 31 + 7) as u8;
        }
        for i in 0..MATRIX_LEN {
            self.mat_a[i] = ((i % MATRIX_DIM) + 1) as f32 * 0.5;
            self.mat_b[i] = ((i / MATRIX_DIM) as f32) * 0.25 - 1.0;
        }
        self.scalar_i32 = [0; VECTOR_LEN];
        self.vector_i32 = [0; VECTOR_LEN];
        self.scalar_dst = [0; MEMCPY_LEN];
        self.vector_dst = [0; MEMCPY_LEN];
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs workloads against one enabled unit, timing with one cycle counter.
pub struct Harness<'a, V> {
    vector: &'a ActiveVector<V>,
    clock: &'a dyn CycleCounter,
}

impl<'a, V: VectorUnit> Harness<'a, V> {
    pub fn new(vector: &'a ActiveVector<V>, clock: &'a dyn CycleCounter) -> Self {
        Self { vector, clock }
    }

    /// Cycles spent in `f`.
    fn time<F: FnOnce()>(&self, f: F) -> u64 {
        let start = self.clock.cycles();
        f();
        self.clock.cycles().wrapping_sub(start)
    }

    fn finish(&self, name: &'static str, scalar_cycles: u64, vector_cycles: u64, passed: bool) -> BenchmarkResult {
        debug!("{}: scalar {} cycles, vector {} cycles", name, scalar_cycles, vector_cycles);
        BenchmarkResult { name, scalar_cycles, vector_cycles, passed }
    }

    pub fn vec_add_i32(&self, ws: &mut Workspace) -> BenchmarkResult {
        let (a, b) = (&ws.a_i32, &ws.b_i32);
        let scalar = self.time(|| scalar::add_i32(a, b, &mut ws.scalar_i32));
        let vector = self.time(|| kernels::add_i32(self.vector, a, b, &mut ws.vector_i32));
        self.finish("vec_add_i32", scalar, vector, ws.scalar_i32 == ws.vector_i32)
    }

    pub fn memcpy(&self, ws: &mut Workspace) -> BenchmarkResult {
        let src = &ws.src;
        let scalar = self.time(|| scalar::memcpy(&mut ws.scalar_dst, src));
        let vector = self.time(|| kernels::memcpy(self.vector, &mut ws.vector_dst, src));
        let passed = ws.scalar_dst == ws.src && ws.vector_dst == ws.src;
        self.finish("memcpy", scalar, vector, passed)
    }

    pub fn vec_add_f32(&self, ws: &mut Workspace) -> BenchmarkResult {
        let (a, b) = (&ws.a_f32, &ws.b_f32);
        let scalar = self.time(|| scalar::add_f32(a, b, &mut ws.scalar_f32));
        let vector = self.time(|| kernels::add_f32(self.vector, a, b, &mut ws.vector_f32));
        let passed = kernels::all_within(&ws.scalar_f32, &ws.vector_f32, kernels::ELEMENTWISE_TOLERANCE);
        self.finish("vec_add_f32", scalar, vector, passed)
    }

    pub fn dot_product_f32(&self, ws: &mut Workspace) -> BenchmarkResult {
        let (a, b) = (&ws.a_f32, &ws.b_f32);
        let mut scalar_sum = 0.0;
        let mut vector_sum = 0.0;
        let scalar = self.time(|| scalar_sum = scalar::dot_f32(a, b));
        let vector = self.time(|| vector_sum = kernels::dot_f32(self.vector, a, b));
        let passed = kernels::within(scalar_sum, vector_sum, kernels::DOT_TOLERANCE);
        self.finish("dot_product_f32", scalar, vector, passed)
    }

    pub fn saxpy(&self, ws: &mut Workspace) -> BenchmarkResult {
        ws.scalar_f32 = ws.b_f32;
        ws.vector_f32 = ws.b_f32;
        let x = &ws.a_f32;
        let scalar = self.time(|| scalar::saxpy(SAXPY_ALPHA, x, &mut ws.scalar_f32));
        let vector = self.time(|| kernels::saxpy(self.vector, SAXPY_ALPHA, x, &mut ws.vector_f32));
        let passed = kernels::all_within(&ws.scalar_f32, &ws.vector_f32, kernels::ELEMENTWISE_TOLERANCE);
        self.finish("saxpy", scalar, vector, passed)
    }

    pub fn matmul_f32(&self, ws: &mut Workspace) -> BenchmarkResult {
        let dims = MatrixDims::new(MATRIX_DIM, MATRIX_DIM, MATRIX_DIM);
        let (a, b) = (&ws.mat_a, &ws.mat_b);
        let scalar = self.time(|| scalar::matmul_f32(dims, a, b, &mut ws.scalar_mat));
        let vector = self.time(|| kernels::matmul_f32(self.vector, dims, a, b, &mut ws.vector_mat));
        let passed = kernels::all_within(&ws.scalar_mat, &ws.vector_mat, kernels::MATMUL_TOLERANCE);
        self.finish("matmul_f32", scalar, vector, passed)
    }

    /// Seeds `ws` and runs every workload in [`WORKLOADS`] order. A failure
    /// never stops the workloads after it.
    pub fn run_all(&self, ws: &mut Workspace) -> [BenchmarkResult; 6] {
        ws.seed();
        let results = [
            self.vec_add_i32(ws),
            self.memcpy(ws),
            self.vec_add_f32(ws),
            self.dot_product_f32(ws),
            self.saxpy(ws),
            self.matmul_f32(ws),
        ];
        let passed = results.iter().filter(|r| r.passed).count();
        info!("vector suite: {}/{} workloads passed", passed, results.len());
        results
    }
}
