//! Shared words mutated by more than one hart.
//!
//! Every read-modify-write is acquire+release, so a caller never needs an
//! extra fence around a single operation. `compare_and_swap` either fully
//! completes or reports failure with memory untouched; the caller reloads and
//! retries from scratch.

use core::fmt;
use core::sync::atomic::{AtomicU32, AtomicU64};

use crate::arch;

pub use arch::{full_fence, read_fence, spin_hint, write_fence};

macro_rules! shared_word {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $cell:ty,
     $add:ident, $swap:ident, $or:ident, $and:ident,
     $load_acq:ident, $store_rel:ident, $load_plain:ident, $store_plain:ident, $cas:ident) => {
        $(#[$doc])*
        #[repr(transparent)]
        pub struct $name {
            cell: $cell,
        }

        impl $name {
            pub const fn new(value: $ty) -> Self {
                Self { cell: <$cell>::new(value) }
            }

            /// Atomically adds `val`, returning the previous value.
            #[inline]
            pub fn fetch_add(&self, val: $ty) -> $ty {
                arch::$add(&self.cell, val)
            }

            /// Atomically replaces the word, returning the previous value.
            #[inline]
            pub fn swap(&self, val: $ty) -> $ty {
                arch::$swap(&self.cell, val)
            }

            #[inline]
            pub fn fetch_or(&self, val: $ty) -> $ty {
                arch::$or(&self.cell, val)
            }

            #[inline]
            pub fn fetch_and(&self, val: $ty) -> $ty {
                arch::$and(&self.cell, val)
            }

            /// Reads the word; later accesses cannot be reordered before it.
            #[inline]
            pub fn load(&self) -> $ty {
                arch::$load_acq(&self.cell)
            }

            /// Writes the word after every earlier access has been ordered.
            #[inline]
            pub fn store(&self, val: $ty) {
                arch::$store_rel(&self.cell, val)
            }

            /// Unfenced read, for words guarded by a lock or polled in a loop.
            #[inline]
            pub fn load_plain(&self) -> $ty {
                arch::$load_plain(&self.cell)
            }

            /// Unfenced write, for words guarded by a lock.
            #[inline]
            pub fn store_plain(&self, val: $ty) {
                arch::$store_plain(&self.cell, val)
            }

            /// Stores `desired` if the word still holds `expected`.
            ///
            /// Returns `false` when the observed value differs; memory is then
            /// unchanged.
            #[inline]
            pub fn compare_and_swap(&self, expected: $ty, desired: $ty) -> bool {
                arch::$cas(&self.cell, expected, desired)
            }

            /// Raw cell, for the lock layer's reservation handshake.
            #[inline]
            pub fn as_cell(&self) -> &$cell {
                &self.cell
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new(0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.load_plain()).finish()
            }
        }
    };
}

shared_word!(
    /// A 32-bit word shared between harts.
    SharedU32, u32, AtomicU32,
    amo_add_u32, amo_swap_u32, amo_or_u32, amo_and_u32,
    load_acquire_u32, store_release_u32, load_plain_u32, store_plain_u32, cas_u32
);

shared_word!(
    /// A 64-bit word shared between harts.
    SharedU64, u64, AtomicU64,
    amo_add_u64, amo_swap_u64, amo_or_u64, amo_and_u64,
    load_acquire_u64, store_release_u64, load_plain_u64, store_plain_u64, cas_u64
);
