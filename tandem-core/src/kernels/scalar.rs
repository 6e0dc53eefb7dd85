//! Reference implementations. Same operation order as the vector kernels,
//! one element at a time.

use super::MatrixDims;

pub fn add_i32(a: &[i32], b: &[i32], out: &mut [i32]) {
    for i in 0..out.len() {
        out[i] = a[i].wrapping_add(b[i]);
    }
}

pub fn add_f32(a: &[f32], b: &[f32], out: &mut [f32]) {
    for i in 0..out.len() {
        out[i] = a[i] + b[i];
    }
}

pub fn memcpy(dst: &mut [u8], src: &[u8]) {
    for i in 0..dst.len() {
        dst[i] = src[i];
    }
}

pub fn dot_f32(a: &[f32], b: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    for i in 0..a.len() {
        sum += a[i] * b[i];
    }
    sum
}

pub fn saxpy(alpha: f32, x: &[f32], y: &mut [f32]) {
    for i in 0..y.len() {
        y[i] += alpha * x[i];
    }
}

/// Triple loop in i, p, j order.
pub fn matmul_f32(dims: MatrixDims, a: &[f32], b: &[f32], c: &mut [f32]) {
    dims.check(a.len(), b.len(), c.len());
    c.fill(0.0);
    for i in 0..dims.m {
        for p in 0..dims.k {
            let a_ip = a[i * dims.k + p];
            for j in 0..dims.n {
                c[i * dims.n + j] += a_ip * b[p * dims.n + j];
            }
        }
    }
}
