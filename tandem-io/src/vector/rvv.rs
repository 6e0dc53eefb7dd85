//! RVV 1.0 backend for bare-metal `riscv64` images.
//!
//! Each strip re-issues `vsetvli` with the VL that `set_vl` granted, so no
//! strip depends on vector state left behind by an earlier asm block. The
//! compiler is never told about V, so it cannot touch the vector registers
//! between blocks either way.

use core::arch::asm;

use super::{VType, VectorUnit};
use crate::csr::{self, ExtensionState};
use crate::{read_csr, write_csr};

/// The RVV unit of the hart executing the call.
pub struct Rvv;

impl VectorUnit for Rvv {
    fn detect(&self) -> bool {
        read_csr!("misa") & csr::MISA_V != 0
    }

    fn enable(&self) {
        let mstatus = read_csr!("mstatus");
        write_csr!("mstatus", csr::mstatus_with_vs(mstatus, ExtensionState::Initial));
    }

    fn vlenb(&self) -> usize {
        // 0xC22 is `vlenb`; the numeric form assembles without `+v`.
        read_csr!("0xC22")
    }

    fn set_vl(&self, avl: usize, vtype: VType) -> usize {
        let vl: usize;
        // SAFETY: only changes vl/vtype, which every strip re-establishes.
        unsafe {
            asm!(
                ".option push",
                ".option arch, +v",
                "vsetvl {vl}, {avl}, {vtype}",
                ".option pop",
                vl = out(reg) vl,
                avl = in(reg) avl,
                vtype = in(reg) vtype.bits(),
                options(nomem, nostack),
            );
        }
        vl
    }

    fn add_i32(&self, a: &[i32], b: &[i32], out: &mut [i32]) {
        let vl = out.len();
        assert!(a.len() >= vl && b.len() >= vl);
        // SAFETY: all three ranges hold at least `vl` e32 elements.
        unsafe {
            asm!(
                ".option push",
                ".option arch, +v",
                "vsetvli zero, {vl}, e32, m1, ta, ma",
                "vle32.v v0, ({a})",
                "vle32.v v1, ({b})",
                "vadd.vv v2, v0, v1",
                "vse32.v v2, ({c})",
                ".option pop",
                vl = in(reg) vl,
                a = in(reg) a.as_ptr(),
                b = in(reg) b.as_ptr(),
                c = in(reg) out.as_mut_ptr(),
                out("v0") _, out("v1") _, out("v2") _,
                options(nostack),
            );
        }
    }

    fn add_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) {
        let vl = out.len();
        assert!(a.len() >= vl && b.len() >= vl);
        // SAFETY: all three ranges hold at least `vl` e32 elements.
        unsafe {
            asm!(
                ".option push",
                ".option arch, +v",
                "vsetvli zero, {vl}, e32, m1, ta, ma",
                "vle32.v v0, ({a})",
                "vle32.v v1, ({b})",
                "vfadd.vv v2, v0, v1",
                "vse32.v v2, ({c})",
                ".option pop",
                vl = in(reg) vl,
                a = in(reg) a.as_ptr(),
                b = in(reg) b.as_ptr(),
                c = in(reg) out.as_mut_ptr(),
                out("v0") _, out("v1") _, out("v2") _,
                options(nostack),
            );
        }
    }

    fn copy_u8(&self, src: &[u8], dst: &mut [u8]) {
        let vl = dst.len();
        assert!(src.len() >= vl);
        // SAFETY: both ranges hold at least `vl` bytes; v0..v7 form the m8 group.
        unsafe {
            asm!(
                ".option push",
                ".option arch, +v",
                "vsetvli zero, {vl}, e8, m8, ta, ma",
                "vle8.v v0, ({s})",
                "vse8.v v0, ({d})",
                ".option pop",
                vl = in(reg) vl,
                s = in(reg) src.as_ptr(),
                d = in(reg) dst.as_mut_ptr(),
                out("v0") _, out("v1") _, out("v2") _, out("v3") _,
                out("v4") _, out("v5") _, out("v6") _, out("v7") _,
                options(nostack),
            );
        }
    }

    fn mul_reduce_f32(&self, a: &[f32], b: &[f32], acc: f32) -> f32 {
        let vl = a.len();
        assert!(b.len() >= vl);
        let sum: f32;
        // SAFETY: both ranges hold at least `vl` e32 elements.
        unsafe {
            asm!(
                ".option push",
                ".option arch, +v",
                "vsetvli zero, {vl}, e32, m1, ta, ma",
                "vle32.v v0, ({a})",
                "vle32.v v1, ({b})",
                "vfmul.vv v2, v0, v1",
                "vfmv.s.f v4, {acc}",
                "vfredosum.vs v4, v2, v4",
                "vfmv.f.s {sum}, v4",
                ".option pop",
                vl = in(reg) vl,
                a = in(reg) a.as_ptr(),
                b = in(reg) b.as_ptr(),
                acc = in(freg) acc,
                sum = out(freg) sum,
                out("v0") _, out("v1") _, out("v2") _, out("v4") _,
                options(nostack),
            );
        }
        sum
    }

    fn macc_f32(&self, alpha: f32, x: &[f32], y: &mut [f32]) {
        let vl = y.len();
        assert!(x.len() >= vl);
        // SAFETY: both ranges hold at least `vl` e32 elements.
        unsafe {
            asm!(
                ".option push",
                ".option arch, +v",
                "vsetvli zero, {vl}, e32, m1, ta, ma",
                "vle32.v v0, ({x})",
                "vle32.v v1, ({y})",
                "vfmacc.vf v1, {alpha}, v0",
                "vse32.v v1, ({y})",
                ".option pop",
                vl = in(reg) vl,
                x = in(reg) x.as_ptr(),
                y = in(reg) y.as_mut_ptr(),
                alpha = in(freg) alpha,
                out("v0") _, out("v1") _,
                options(nostack),
            );
        }
    }
}
