//! QEMU `virt` machine: NS16550A UART console and the SiFive test finisher.

use core::arch::asm;
use core::ptr;

use super::{Console, CycleCounter, Platform};
use crate::read_csr;

const UART_BASE: usize = 0x1000_0000;
const UART_THR: usize = 0;
const UART_IER: usize = 1;
const UART_FCR: usize = 2;
const UART_LCR: usize = 3;
const UART_LSR: usize = 5;

const LCR_DLAB: u8 = 1 << 7;
const LCR_8N1: u8 = 0x03;
const LSR_THRE: u8 = 1 << 5;
const FCR_ENABLE_CLEAR: u8 = 0x07;

const TEST_FINISHER: usize = 0x10_0000;
const FINISHER_PASS: u32 = 0x5555;
const FINISHER_FAIL: u32 = 0x3333;

pub struct QemuVirt {
    uart: usize,
}

impl QemuVirt {
    pub const fn new() -> Self {
        Self { uart: UART_BASE }
    }

    fn reg(&self, offset: usize) -> *mut u8 {
        (self.uart + offset) as *mut u8
    }

    /// Polled 8N1 setup. The divisor is irrelevant under emulation.
    pub fn init(&self) {
        // SAFETY: the UART block is mapped at UART_BASE on `virt`.
        unsafe {
            ptr::write_volatile(self.reg(UART_IER), 0x00);
            ptr::write_volatile(self.reg(UART_LCR), LCR_DLAB);
            ptr::write_volatile(self.reg(UART_THR), 0x01);
            ptr::write_volatile(self.reg(UART_IER), 0x00);
            ptr::write_volatile(self.reg(UART_LCR), LCR_8N1);
            ptr::write_volatile(self.reg(UART_FCR), FCR_ENABLE_CLEAR);
        }
    }

    fn put_byte(&self, byte: u8) {
        // SAFETY: MMIO reads/writes of the mapped UART.
        unsafe {
            while ptr::read_volatile(self.reg(UART_LSR)) & LSR_THRE == 0 {
                core::hint::spin_loop();
            }
            ptr::write_volatile(self.reg(UART_THR), byte);
        }
    }
}

impl Default for QemuVirt {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for QemuVirt {
    fn write_str(&self, s: &str) {
        for byte in s.bytes() {
            if byte == b'\n' {
                self.put_byte(b'\r');
            }
            self.put_byte(byte);
        }
    }
}

impl CycleCounter for QemuVirt {
    fn cycles(&self) -> u64 {
        read_csr!("mcycle") as u64
    }
}

impl Platform for QemuVirt {
    fn name(&self) -> &'static str {
        "QEMU virt"
    }

    fn hart_id(&self) -> usize {
        read_csr!("mhartid")
    }

    fn machine_status(&self) -> usize {
        read_csr!("mstatus")
    }

    fn wait_for_interrupt(&self) {
        // SAFETY: wfi only stalls this hart.
        unsafe { asm!("wfi", options(nomem, nostack)) }
    }

    fn terminate(&self, status: i32) -> ! {
        let code = if status == 0 {
            FINISHER_PASS
        } else {
            ((status as u32) << 16) | FINISHER_FAIL
        };
        // SAFETY: the finisher register is mapped at TEST_FINISHER on `virt`.
        unsafe { ptr::write_volatile(TEST_FINISHER as *mut u32, code) };
        loop {
            self.wait_for_interrupt();
        }
    }
}
