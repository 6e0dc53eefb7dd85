//! Tandem I/O: the hardware abstraction layer.
//!
//! Everything that has to issue an architecture-specific instruction lives in
//! this crate: read-modify-write atomics and fences, CSR access, the vector
//! unit, and the platform collaborators (console, cycle counter, exit).
//!
//! On `riscv64` the primitives are inline assembly. Everywhere else they are
//! emulated with `core::sync::atomic` and plain Rust loops, so the layers
//! above can be exercised by ordinary threads on a development host.
#![cfg_attr(target_os = "none", no_std)]

pub mod arch;
pub mod atomic;
pub mod csr;
pub mod platform;
pub mod vector;

#[cfg(not(target_os = "none"))]
pub mod error;

// Re-exports for easier access by tandem-core
pub use atomic::{SharedU32, SharedU64};
pub use platform::{Console, CycleCounter, Platform, MAX_HARTS};
pub use vector::{Lmul, Sew, VType, VectorUnit};

#[cfg(not(target_os = "none"))]
pub use error::PlatformError;
#[cfg(not(target_os = "none"))]
pub use platform::hosted::HostedPlatform;
#[cfg(not(target_os = "none"))]
pub use vector::emulated::EmulatedVector;
