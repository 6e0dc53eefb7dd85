//! Instruction-level backend for shared-memory primitives.
//!
//! This module is the only place that knows how a read-modify-write, an
//! LR/SC reservation loop, or a fence is spelled on the target. Both backends
//! export the same set of free functions over `AtomicU32`/`AtomicU64` cells:
//!
//! - `amo_{add,swap,or,and}_{u32,u64}`: one acquire+release AMO, returns the
//!   previous value.
//! - `load_acquire_*` / `store_release_*`: plain access paired with a fence.
//! - `load_plain_*` / `store_plain_*`: access already ordered by a lock.
//! - `cas_*`: LR/SC compare-and-swap, `false` only on value mismatch.
//! - `reserve_acquire` / `try_reserve_acquire`: the 0 -> 1 lock handshake.
//! - `full_fence`, `write_fence`, `read_fence`, `spin_hint`.

#[cfg(target_arch = "riscv64")]
mod riscv;
#[cfg(target_arch = "riscv64")]
pub use riscv::*;

#[cfg(not(target_arch = "riscv64"))]
mod emulated;
#[cfg(not(target_arch = "riscv64"))]
pub use emulated::*;

/// Hint to the core that the caller is busy-polling.
#[inline(always)]
pub fn spin_hint() {
    core::hint::spin_loop();
}
