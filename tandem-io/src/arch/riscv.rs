use core::arch::asm;
use core::ptr;
use core::sync::atomic::{AtomicU32, AtomicU64};

// Every block below omits `nomem`, so the compiler treats it as a memory
// clobber and will not move surrounding loads or stores across it.

macro_rules! amo {
    ($name:ident, $ty:ty, $cell:ty, $insn:literal) => {
        #[inline(always)]
        pub fn $name(cell: &$cell, val: $ty) -> $ty {
            let prev: $ty;
            // SAFETY: `cell` is a live, naturally aligned word for the whole borrow.
            unsafe {
                asm!(
                    concat!($insn, " {prev}, {val}, ({ptr})"),
                    prev = out(reg) prev,
                    val = in(reg) val,
                    ptr = in(reg) cell.as_ptr(),
                    options(nostack),
                );
            }
            prev
        }
    };
}

amo!(amo_add_u32, u32, AtomicU32, "amoadd.w.aqrl");
amo!(amo_swap_u32, u32, AtomicU32, "amoswap.w.aqrl");
amo!(amo_or_u32, u32, AtomicU32, "amoor.w.aqrl");
amo!(amo_and_u32, u32, AtomicU32, "amoand.w.aqrl");
amo!(amo_add_u64, u64, AtomicU64, "amoadd.d.aqrl");
amo!(amo_swap_u64, u64, AtomicU64, "amoswap.d.aqrl");
amo!(amo_or_u64, u64, AtomicU64, "amoor.d.aqrl");
amo!(amo_and_u64, u64, AtomicU64, "amoand.d.aqrl");

#[inline(always)]
pub fn load_acquire_u32(cell: &AtomicU32) -> u32 {
    let val: u32;
    // SAFETY: aligned load from a live word, followed by `fence r, rw`.
    unsafe {
        asm!(
            "lw {val}, 0({ptr})",
            "fence r, rw",
            val = out(reg) val,
            ptr = in(reg) cell.as_ptr(),
            options(nostack),
        );
    }
    val
}

#[inline(always)]
pub fn load_acquire_u64(cell: &AtomicU64) -> u64 {
    let val: u64;
    // SAFETY: aligned load from a live word, followed by `fence r, rw`.
    unsafe {
        asm!(
            "ld {val}, 0({ptr})",
            "fence r, rw",
            val = out(reg) val,
            ptr = in(reg) cell.as_ptr(),
            options(nostack),
        );
    }
    val
}

#[inline(always)]
pub fn store_release_u32(cell: &AtomicU32, val: u32) {
    // SAFETY: `fence rw, w` then an aligned store to a live word.
    unsafe {
        asm!(
            "fence rw, w",
            "sw {val}, 0({ptr})",
            val = in(reg) val,
            ptr = in(reg) cell.as_ptr(),
            options(nostack),
        );
    }
}

#[inline(always)]
pub fn store_release_u64(cell: &AtomicU64, val: u64) {
    // SAFETY: `fence rw, w` then an aligned store to a live word.
    unsafe {
        asm!(
            "fence rw, w",
            "sd {val}, 0({ptr})",
            val = in(reg) val,
            ptr = in(reg) cell.as_ptr(),
            options(nostack),
        );
    }
}

#[inline(always)]
pub fn load_plain_u32(cell: &AtomicU32) -> u32 {
    // SAFETY: volatile keeps the poll from being hoisted out of spin loops.
    unsafe { ptr::read_volatile(cell.as_ptr()) }
}

#[inline(always)]
pub fn load_plain_u64(cell: &AtomicU64) -> u64 {
    // SAFETY: see `load_plain_u32`.
    unsafe { ptr::read_volatile(cell.as_ptr()) }
}

#[inline(always)]
pub fn store_plain_u32(cell: &AtomicU32, val: u32) {
    // SAFETY: naturally aligned word store; a single `sw` is single-copy atomic.
    unsafe { ptr::write_volatile(cell.as_ptr(), val) }
}

#[inline(always)]
pub fn store_plain_u64(cell: &AtomicU64, val: u64) {
    // SAFETY: naturally aligned doubleword store; a single `sd` is single-copy atomic.
    unsafe { ptr::write_volatile(cell.as_ptr(), val) }
}

#[inline(always)]
pub fn cas_u32(cell: &AtomicU32, expected: u32, desired: u32) -> bool {
    let ok: usize;
    // `lr.w` sign-extends into the 64-bit register, so the comparison value
    // must be sign-extended the same way.
    let expected = expected as i32 as i64;
    // SAFETY: LR/SC on a live, aligned word. A failed SC only retries.
    unsafe {
        asm!(
            "2:",
            "lr.w.aqrl {tmp}, ({ptr})",
            "bne {tmp}, {exp}, 3f",
            "sc.w.rl {ok}, {new}, ({ptr})",
            "bnez {ok}, 2b",
            "li {ok}, 1",
            "j 4f",
            "3:",
            "li {ok}, 0",
            "4:",
            tmp = out(reg) _,
            ok = out(reg) ok,
            ptr = in(reg) cell.as_ptr(),
            exp = in(reg) expected,
            new = in(reg) desired,
            options(nostack),
        );
    }
    ok != 0
}

#[inline(always)]
pub fn cas_u64(cell: &AtomicU64, expected: u64, desired: u64) -> bool {
    let ok: usize;
    // SAFETY: LR/SC on a live, aligned doubleword. A failed SC only retries.
    unsafe {
        asm!(
            "2:",
            "lr.d.aqrl {tmp}, ({ptr})",
            "bne {tmp}, {exp}, 3f",
            "sc.d.rl {ok}, {new}, ({ptr})",
            "bnez {ok}, 2b",
            "li {ok}, 1",
            "j 4f",
            "3:",
            "li {ok}, 0",
            "4:",
            tmp = out(reg) _,
            ok = out(reg) ok,
            ptr = in(reg) cell.as_ptr(),
            exp = in(reg) expected,
            new = in(reg) desired,
            options(nostack),
        );
    }
    ok != 0
}

/// Spins on a reservation until the word goes 0 -> 1 under this hart.
#[inline(always)]
pub fn reserve_acquire(cell: &AtomicU32) {
    // SAFETY: LR/SC loop on a live, aligned lock word; full fence on exit.
    unsafe {
        asm!(
            "2:",
            "lr.w {tmp}, ({ptr})",
            "bnez {tmp}, 2b",
            "li {tmp}, 1",
            "sc.w {tmp}, {tmp}, ({ptr})",
            "bnez {tmp}, 2b",
            "fence rw, rw",
            tmp = out(reg) _,
            ptr = in(reg) cell.as_ptr(),
            options(nostack),
        );
    }
}

/// One reservation attempt. Returns `true` if the word went 0 -> 1.
#[inline(always)]
pub fn try_reserve_acquire(cell: &AtomicU32) -> bool {
    let ok: usize;
    // SAFETY: single LR/SC attempt on a live, aligned lock word.
    unsafe {
        asm!(
            "lr.w {tmp}, ({ptr})",
            "bnez {tmp}, 3f",
            "li {tmp}, 1",
            "sc.w {ok}, {tmp}, ({ptr})",
            "bnez {ok}, 3f",
            "fence rw, rw",
            "li {ok}, 1",
            "j 4f",
            "3:",
            "li {ok}, 0",
            "4:",
            tmp = out(reg) _,
            ok = out(reg) ok,
            ptr = in(reg) cell.as_ptr(),
            options(nostack),
        );
    }
    ok != 0
}

#[inline(always)]
pub fn full_fence() {
    // SAFETY: ordering-only instruction.
    unsafe { asm!("fence rw, rw", options(nostack)) }
}

#[inline(always)]
pub fn write_fence() {
    // SAFETY: ordering-only instruction.
    unsafe { asm!("fence w, w", options(nostack)) }
}

#[inline(always)]
pub fn read_fence() {
    // SAFETY: ordering-only instruction.
    unsafe { asm!("fence r, r", options(nostack)) }
}
