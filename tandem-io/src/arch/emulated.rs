//! Software rendition of the RISC-V primitives for development hosts.
//!
//! Every RVWMO fence maps to the closest `core::sync::atomic::fence`, and
//! every plain word access is a relaxed atomic so concurrent harts (threads)
//! never race in the Rust memory model.

use core::sync::atomic::{fence, AtomicU32, AtomicU64, Ordering};

macro_rules! emulate_width {
    ($cell:ty, $ty:ty, $add:ident, $swap:ident, $or:ident, $and:ident,
     $load_acq:ident, $store_rel:ident, $load_plain:ident, $store_plain:ident, $cas:ident) => {
        #[inline(always)]
        pub fn $add(cell: &$cell, val: $ty) -> $ty {
            cell.fetch_add(val, Ordering::AcqRel)
        }

        #[inline(always)]
        pub fn $swap(cell: &$cell, val: $ty) -> $ty {
            cell.swap(val, Ordering::AcqRel)
        }

        #[inline(always)]
        pub fn $or(cell: &$cell, val: $ty) -> $ty {
            cell.fetch_or(val, Ordering::AcqRel)
        }

        #[inline(always)]
        pub fn $and(cell: &$cell, val: $ty) -> $ty {
            cell.fetch_and(val, Ordering::AcqRel)
        }

        #[inline(always)]
        pub fn $load_acq(cell: &$cell) -> $ty {
            let val = cell.load(Ordering::Relaxed);
            fence(Ordering::Acquire);
            val
        }

        #[inline(always)]
        pub fn $store_rel(cell: &$cell, val: $ty) {
            fence(Ordering::Release);
            cell.store(val, Ordering::Relaxed);
        }

        #[inline(always)]
        pub fn $load_plain(cell: &$cell) -> $ty {
            cell.load(Ordering::Relaxed)
        }

        #[inline(always)]
        pub fn $store_plain(cell: &$cell, val: $ty) {
            cell.store(val, Ordering::Relaxed);
        }

        #[inline(always)]
        pub fn $cas(cell: &$cell, expected: $ty, desired: $ty) -> bool {
            // The strong form retries spurious failures, like the SC loop.
            cell.compare_exchange(expected, desired, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
        }
    };
}

emulate_width!(
    AtomicU32, u32, amo_add_u32, amo_swap_u32, amo_or_u32, amo_and_u32,
    load_acquire_u32, store_release_u32, load_plain_u32, store_plain_u32, cas_u32
);
emulate_width!(
    AtomicU64, u64, amo_add_u64, amo_swap_u64, amo_or_u64, amo_and_u64,
    load_acquire_u64, store_release_u64, load_plain_u64, store_plain_u64, cas_u64
);

#[inline(always)]
pub fn reserve_acquire(cell: &AtomicU32) {
    loop {
        if cell.load(Ordering::Relaxed) != 0 {
            core::hint::spin_loop();
            continue;
        }
        if cell
            .compare_exchange_weak(0, 1, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            break;
        }
    }
    fence(Ordering::SeqCst);
}

#[inline(always)]
pub fn try_reserve_acquire(cell: &AtomicU32) -> bool {
    if cell.load(Ordering::Relaxed) != 0 {
        return false;
    }
    if cell
        .compare_exchange(0, 1, Ordering::Relaxed, Ordering::Relaxed)
        .is_err()
    {
        return false;
    }
    fence(Ordering::SeqCst);
    true
}

#[inline(always)]
pub fn full_fence() {
    fence(Ordering::SeqCst);
}

#[inline(always)]
pub fn write_fence() {
    fence(Ordering::Release);
}

#[inline(always)]
pub fn read_fence() {
    fence(Ordering::Acquire);
}
