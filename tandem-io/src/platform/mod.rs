//! Platform collaborators consumed by the core: a console, a cycle counter,
//! hart identity, idle, and a single terminate call.

#[cfg(not(target_os = "none"))]
pub mod affinity;
#[cfg(not(target_os = "none"))]
pub mod hosted;
#[cfg(all(target_arch = "riscv64", target_os = "none"))]
pub mod qemu_virt;
#[cfg(not(target_os = "none"))]
pub mod topology;

/// Most harts any image is built for.
pub const MAX_HARTS: usize = 8;

/// Synchronous character sink. Callers serialize access across harts.
pub trait Console {
    fn write_str(&self, s: &str);

    fn write_char(&self, c: char) {
        let mut buf = [0u8; 4];
        self.write_str(c.encode_utf8(&mut buf));
    }
}

/// Free-running cycle counter (`mcycle` on hardware).
pub trait CycleCounter {
    fn cycles(&self) -> u64;
}

pub trait Platform: Console + CycleCounter + Sync {
    fn name(&self) -> &'static str;

    /// `mhartid` of the calling hart.
    fn hart_id(&self) -> usize;

    /// Current `mstatus` of the calling hart.
    fn machine_status(&self) -> usize;

    /// Low-power wait. May return spuriously.
    fn wait_for_interrupt(&self);

    /// Ends the run with `status`. Called exactly once, by the primary hart.
    fn terminate(&self, status: i32) -> !;
}
