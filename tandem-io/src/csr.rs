//! Machine-mode control/status registers.

/// Vector extension bit in `misa` (letter 'V').
pub const MISA_V: usize = 1 << (b'V' - b'A');

/// `mstatus.VS` occupies bits [10:9].
pub const MSTATUS_VS_SHIFT: usize = 9;
pub const MSTATUS_VS_MASK: usize = 0b11 << MSTATUS_VS_SHIFT;

/// Machine previous privilege, set to M-mode out of reset on the targets we run.
pub const MSTATUS_MPP: usize = 0b11 << 11;

pub const CSR_VLENB: u16 = 0xC22;
pub const CSR_MCYCLE: u16 = 0xB00;

/// The 2-bit state field shared by `mstatus.FS` and `mstatus.VS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtensionState {
    Off = 0,
    Initial = 1,
    Clean = 2,
    Dirty = 3,
}

impl ExtensionState {
    pub const fn from_bits(bits: usize) -> Self {
        match bits & 0b11 {
            0 => ExtensionState::Off,
            1 => ExtensionState::Initial,
            2 => ExtensionState::Clean,
            _ => ExtensionState::Dirty,
        }
    }
}

/// Returns `mstatus` with the VS field cleared and replaced by `state`.
pub const fn mstatus_with_vs(mstatus: usize, state: ExtensionState) -> usize {
    (mstatus & !MSTATUS_VS_MASK) | ((state as usize) << MSTATUS_VS_SHIFT)
}

pub const fn mstatus_vs(mstatus: usize) -> ExtensionState {
    ExtensionState::from_bits(mstatus >> MSTATUS_VS_SHIFT)
}

/// Reads a CSR by name, e.g. `read_csr!("mhartid")`.
#[cfg(target_arch = "riscv64")]
#[macro_export]
macro_rules! read_csr {
    ($csr:literal) => {{
        let value: usize;
        // SAFETY: CSR reads have no memory side effects.
        unsafe {
            core::arch::asm!(concat!("csrr {0}, ", $csr), out(reg) value, options(nomem, nostack));
        }
        value
    }};
}

/// Writes a CSR by name, e.g. `write_csr!("mstatus", value)`.
#[cfg(target_arch = "riscv64")]
#[macro_export]
macro_rules! write_csr {
    ($csr:literal, $value:expr) => {{
        let value: usize = $value;
        // SAFETY: callers only write architecturally defined fields.
        unsafe {
            core::arch::asm!(concat!("csrw ", $csr, ", {0}"), in(reg) value, options(nostack));
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vs_field_rewrite_preserves_other_bits() {
        let mstatus = MSTATUS_MPP | (0b11 << MSTATUS_VS_SHIFT) | 0b1000;
        let updated = mstatus_with_vs(mstatus, ExtensionState::Initial);
        assert_eq!(mstatus_vs(updated), ExtensionState::Initial);
        assert_eq!(updated & !MSTATUS_VS_MASK, mstatus & !MSTATUS_VS_MASK);
        assert_eq!(mstatus_vs(MSTATUS_MPP), ExtensionState::Off);
    }

    #[test]
    fn test_misa_v_bit_position() {
        assert_eq!(MISA_V, 1 << 21);
    }
}
