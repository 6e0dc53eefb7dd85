//! The vector unit interface.
//!
//! A `VectorUnit` exposes length negotiation plus one "strip" operation per
//! kernel body. A strip processes exactly the VL elements that the preceding
//! `set_vl` granted for the same element configuration, so the
//! vector-length-agnostic loop itself lives above this layer and never
//! hardcodes a width.

use core::fmt;

#[cfg(not(target_os = "none"))]
pub mod emulated;
#[cfg(all(target_arch = "riscv64", target_os = "none"))]
pub mod rvv;

/// Selected element width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sew {
    E8,
    E16,
    E32,
    E64,
}

impl Sew {
    pub const fn bits(self) -> usize {
        match self {
            Sew::E8 => 8,
            Sew::E16 => 16,
            Sew::E32 => 32,
            Sew::E64 => 64,
        }
    }

    const fn encoding(self) -> usize {
        match self {
            Sew::E8 => 0,
            Sew::E16 => 1,
            Sew::E32 => 2,
            Sew::E64 => 3,
        }
    }
}

/// Register grouping multiplier. Fractional groupings are not used here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lmul {
    M1,
    M2,
    M4,
    M8,
}

impl Lmul {
    pub const fn factor(self) -> usize {
        match self {
            Lmul::M1 => 1,
            Lmul::M2 => 2,
            Lmul::M4 => 4,
            Lmul::M8 => 8,
        }
    }

    const fn encoding(self) -> usize {
        match self {
            Lmul::M1 => 0,
            Lmul::M2 => 1,
            Lmul::M4 => 2,
            Lmul::M8 => 3,
        }
    }
}

const VTYPE_VTA: usize = 1 << 6;
const VTYPE_VMA: usize = 1 << 7;

/// An element-width / grouping pair, always tail- and mask-agnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VType {
    pub sew: Sew,
    pub lmul: Lmul,
}

impl VType {
    pub const E8M1: VType = VType::new(Sew::E8, Lmul::M1);
    pub const E8M8: VType = VType::new(Sew::E8, Lmul::M8);
    pub const E32M1: VType = VType::new(Sew::E32, Lmul::M1);
    pub const E32M4: VType = VType::new(Sew::E32, Lmul::M4);
    pub const E64M1: VType = VType::new(Sew::E64, Lmul::M1);

    pub const fn new(sew: Sew, lmul: Lmul) -> Self {
        Self { sew, lmul }
    }

    /// The value `vsetvl` expects in its `vtype` operand.
    pub const fn bits(self) -> usize {
        VTYPE_VMA | VTYPE_VTA | (self.sew.encoding() << 3) | self.lmul.encoding()
    }

    /// Largest VL the hardware can grant for this configuration.
    pub const fn vlmax(self, vlen_bits: usize) -> usize {
        vlen_bits * self.lmul.factor() / self.sew.bits()
    }
}

impl fmt::Display for VType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{},m{}", self.sew.bits(), self.lmul.factor())
    }
}

/// Hardware vector unit, or a software stand-in for one.
///
/// Strip operations take slices whose common length is the VL granted by the
/// most recent `set_vl` for the configuration named in the method docs.
/// Calling any of them before `enable`, with an empty strip, or with a strip
/// longer than VLMAX is the moral equivalent of an illegal-instruction trap.
pub trait VectorUnit {
    /// `misa.V` is set.
    fn detect(&self) -> bool;

    /// Puts `mstatus.VS` into the Initial state.
    fn enable(&self);

    /// Bytes per vector register.
    fn vlenb(&self) -> usize;

    /// Asks the hardware how many elements it will process out of `avl`.
    fn set_vl(&self, avl: usize, vtype: VType) -> usize;

    /// `out = a + b` over one e32/m1 strip.
    fn add_i32(&self, a: &[i32], b: &[i32], out: &mut [i32]);

    /// `out = a + b` over one e32/m1 strip.
    fn add_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]);

    /// Byte copy over one e8/m8 strip.
    fn copy_u8(&self, src: &[u8], dst: &mut [u8]);

    /// Multiplies one e32/m1 strip elementwise and folds the products into
    /// `acc` with an ordered reduction. Returns the new accumulator.
    fn mul_reduce_f32(&self, a: &[f32], b: &[f32], acc: f32) -> f32;

    /// `y = alpha * x + y` with a single fused multiply-accumulate per
    /// element, over one e32/m1 strip.
    fn macc_f32(&self, alpha: f32, x: &[f32], y: &mut [f32]);
}

impl<V: VectorUnit + ?Sized> VectorUnit for &V {
    fn detect(&self) -> bool {
        (**self).detect()
    }
    fn enable(&self) {
        (**self).enable()
    }
    fn vlenb(&self) -> usize {
        (**self).vlenb()
    }
    fn set_vl(&self, avl: usize, vtype: VType) -> usize {
        (**self).set_vl(avl, vtype)
    }
    fn add_i32(&self, a: &[i32], b: &[i32], out: &mut [i32]) {
        (**self).add_i32(a, b, out)
    }
    fn add_f32(&self, a: &[f32], b: &[f32], out: &mut [f32]) {
        (**self).add_f32(a, b, out)
    }
    fn copy_u8(&self, src: &[u8], dst: &mut [u8]) {
        (**self).copy_u8(src, dst)
    }
    fn mul_reduce_f32(&self, a: &[f32], b: &[f32], acc: f32) -> f32 {
        (**self).mul_reduce_f32(a, b, acc)
    }
    fn macc_f32(&self, alpha: f32, x: &[f32], y: &mut [f32]) {
        (**self).macc_f32(alpha, x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vtype_encoding_matches_vsetvli() {
        // vsetvli e32, m1, ta, ma
        assert_eq!(VType::E32M1.bits(), 0b1101_0000);
        // vsetvli e8, m8, ta, ma
        assert_eq!(VType::E8M8.bits(), 0b1100_0011);
        assert_eq!(VType::E64M1.bits(), 0b1101_1000);
    }

    #[test]
    fn test_vlmax_scales_with_grouping() {
        assert_eq!(VType::E8M1.vlmax(128), 16);
        assert_eq!(VType::E32M1.vlmax(256), 8);
        assert_eq!(VType::E32M4.vlmax(256), 32);
        assert_eq!(VType::E8M8.vlmax(512), 512);
        assert_eq!(VType::E32M4.to_string(), "e32,m4");
    }
}
