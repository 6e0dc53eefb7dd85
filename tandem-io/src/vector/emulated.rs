//! A software vector unit with a VLEN chosen at construction.
//!
//! It models the pieces of machine state the kernels depend on: `misa.V`,
//! `mstatus.VS`, and VLEN. Misuse that would trap on silicon panics here with
//! an "illegal instruction" message so tests catch it.

use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;

use super::{VType, VectorUnit};
use crate::csr::{self, ExtensionState};
use crate::error::PlatformError;

const MIN_VLEN: usize = 64;
const MAX_VLEN: usize = 65536;

/// Base ISA bits reported alongside V: RV64 I, M, A, F, D, C.
const MISA_RV64IMAFDC: usize = (2 << (usize::BITS - 2))
    | (1 << (b'I' - b'A'))
    | (1 << (b'M' - b'A'))
    | (1 << (b'A' - b'A'))
    | (1 << (b'F' - b'A'))
    | (1 << (b'D' - b'A'))
    | (1 << (b'C' - b'A'));

pub struct EmulatedVector {
    vlen: usize,
    misa: usize,
    mstatus: AtomicUsize,
}

impl EmulatedVector {
    /// A unit with the V extension present and `vlen` bits per register.
    ///
    /// # Errors
    /// `UnsupportedVlen` unless `vlen` is a power of two in 64..=65536.
    pub fn new(vlen: usize) -> Result<Self, PlatformError> {
        if !vlen.is_power_of_two() || !(MIN_VLEN..=MAX_VLEN).contains(&vlen) {
            return Err(PlatformError::UnsupportedVlen(vlen));
        }
        debug!("Emulated vector unit: VLEN={} bits", vlen);
        Ok(Self {
            vlen,
            misa: MISA_RV64IMAFDC | csr::MISA_V,
            mstatus: AtomicUsize::new(csr::MSTATUS_MPP),
        })
    }

    /// A machine whose `misa` lacks the V bit.
    pub fn absent() -> Self {
        Self {
            vlen: 0,
            misa: MISA_RV64IMAFDC,
            mstatus: AtomicUsize::new(csr::MSTATUS_MPP),
        }
    }

    pub fn vlen(&self) -> usize {
        self.vlen
    }

    pub fn is_enabled(&self) -> bool {
        csr::mstatus_vs(self.mstatus.load(Ordering::Acquire)) != ExtensionState::Off
    }

    /// Validates one strip the way the hardware would before executing it.
    fn check_strip(&self, len: usize, vtype: VType) {
        if !self.is_enabled() {
            panic!("illegal instruction: vector op with mstatus.VS=Off");
        }
        let vlmax = vtype.vlmax(self.vlen);
        if len == 0 || len > vlmax {
            panic!(
                "illegal instruction: strip of {} elements under {} (VLMAX={})",
                len, vtype, vlmax
            );
        }
    }
}

impl VectorUnit for EmulatedVector {
    fn detect(&self) -> bool {
        self.misa & csr::MISA_V != 0
    }

    fn enable(&self) {
        let mstatus = self.mstatus.load(Ordering::Acquire);
        self.mstatus.store(
            csr::mstatus_with_vs(mstatus, ExtensionState::Initial),
            Ordering::Release,
        );
    }

    fn vlenb(&self) -> usize {
        if !self.detect() {
            panic!("illegal instruction: vlenb read without the V extension");
        }
        self.vlen / 8
    }

    fn set_vl(&self, avl: usize, vtype: VType) -> usize {
        if !self.is_enabled() {
            panic!("illegal instruction: vsetvl with mstatus.VS=Off");
        }
        avl.min(vtype.vlmax(self.vlen))
    }

    fn add_i32(&self, a: &[i32], b: &[i32], out: &mut [i32]) {
        self.check_strip(out.len(), VType::E32M1);
        for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
            *o = x.wrapping_add(*y);
        }
    }

    fn add_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) {
        self.check_strip(out.len(), VType::E32M1);
        for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
            *o = x + y;
        }
    }

    fn copy_u8(&self, src: &[u8], dst: &mut [u8]) {
        self.check_strip(dst.len(), VType::E8M8);
        dst.copy_from_slice(src);
    }

    fn mul_reduce_f32(&self, a: &[f32], b: &[f32], acc: f32) -> f32 {
        self.check_strip(a.len(), VType::E32M1);
        // vfmul.vv rounds each product, vfredosum then adds in element order.
        a.iter().zip(b).fold(acc, |sum, (x, y)| sum + x * y)
    }

    fn macc_f32(&self, alpha: f32, x: &[f32], y: &mut [f32]) {
        self.check_strip(y.len(), VType::E32M1);
        for (yi, xi) in y.iter_mut().zip(x) {
            *yi = alpha.mul_add(*xi, *yi);
        }
    }
}
