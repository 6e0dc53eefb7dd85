//! Bare-metal image for the QEMU `virt` machine.
//!
//! Every hart starts at `_start` with its own stack. Hart 0 clears `.bss`
//! and becomes the primary; the others go straight to the park loop inside
//! the runtime. Shared state lives in statics initialized by the loader, so
//! nothing a secondary reads depends on the BSS clear.
#![no_std]
#![no_main]

use core::arch::global_asm;
use core::cell::UnsafeCell;
use core::fmt::Write;
use core::panic::PanicInfo;

use log::LevelFilter;
use tandem_core::console::ConsoleLogger;
use tandem_core::harness::Workspace;
use tandem_core::{Config, Runtime, SmpState};
use tandem_io::platform::qemu_virt::QemuVirt;
use tandem_io::vector::rvv::Rvv;
use tandem_io::{Platform, MAX_HARTS};

const CONFIG: Config = Config::from_build_env();

static PLATFORM: QemuVirt = QemuVirt::new();
static SMP: SmpState = SmpState::new(CONFIG.harts);
static LOGGER: ConsoleLogger = ConsoleLogger::new(&PLATFORM, &SMP, LevelFilter::Info);
static WORKSPACE: PrimaryOnly<Workspace> = PrimaryOnly::new(Workspace::new());

/// A static that only hart 0 ever touches.
struct PrimaryOnly<T> {
    inner: UnsafeCell<T>,
}

impl<T> PrimaryOnly<T> {
    const fn new(value: T) -> Self {
        Self { inner: UnsafeCell::new(value) }
    }

    /// # Safety
    /// Must be called at most once, from hart 0.
    unsafe fn take(&self) -> &mut T {
        unsafe { &mut *self.inner.get() }
    }
}

// SAFETY: access is confined to hart 0 by `take`'s contract.
unsafe impl<T> Sync for PrimaryOnly<T> {}

// Per-hart 16 KiB stacks below `__stack_top`; FS is switched on so the
// scalar float twins do not trap.
global_asm!(
    ".section .text.init",
    ".global _start",
    "_start:",
    ".option push",
    ".option norelax",
    "    la gp, __global_pointer$",
    ".option pop",
    "    csrr a0, mhartid",
    "    li t0, {max_harts}",
    "    bgeu a0, t0, 3f",
    "    la sp, __stack_top",
    "    li t1, {stack_size}",
    "    mul t1, t1, a0",
    "    sub sp, sp, t1",
    "    li t0, 1 << 13",
    "    csrs mstatus, t0",
    "    bnez a0, 2f",
    "    la t0, __bss_start",
    "    la t1, __bss_end",
    "1:",
    "    bgeu t0, t1, 2f",
    "    sd zero, 0(t0)",
    "    addi t0, t0, 8",
    "    j 1b",
    "2:",
    "    call tandem_main",
    "3:",
    "    wfi",
    "    j 3b",
    max_harts = const MAX_HARTS,
    stack_size = const STACK_SIZE,
);

const STACK_SIZE: usize = 0x4000;

#[no_mangle]
extern "C" fn tandem_main(hart_id: usize) -> ! {
    let runtime = Runtime::new(&PLATFORM, &SMP, CONFIG);

    if hart_id != 0 {
        if hart_id < CONFIG.harts as usize {
            runtime.secondary_main(hart_id);
        }
        runtime.idle()
    }

    PLATFORM.init();
    ConsoleLogger::install(&LOGGER);
    // SAFETY: this is hart 0, and it reaches this point once.
    let ws = unsafe { WORKSPACE.take() };
    let status = runtime.primary_main(Rvv, ws);
    PLATFORM.terminate(status)
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    // Bypass the print lock: the panicking hart may already hold it.
    let mut out = PanicWriter;
    let _ = writeln!(out, "[PANIC] {}", info);
    PLATFORM.terminate(1)
}

struct PanicWriter;

impl Write for PanicWriter {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        tandem_io::Console::write_str(&PLATFORM, s);
        Ok(())
    }
}
