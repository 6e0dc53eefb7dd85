//! Tandem core: multi-hart bring-up, lock and barrier primitives, and a
//! vector-length-agnostic kernel library verified against scalar twins.
//!
//! The crate is `no_std` and allocation free. Everything that touches an
//! instruction sequence goes through `tandem-io`, so the same code runs on a
//! bare-metal RISC-V image and on host threads with an emulated vector unit.
#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod console;
pub mod harness;
pub mod kernels;
pub mod runtime;
pub mod selftest;
pub mod smp;
pub mod sync;
pub mod vector;

pub use config::Config;
pub use harness::{BenchmarkResult, Tally};
pub use runtime::Runtime;
pub use smp::{Checkpoint, Hart, HartRole, HartState, SmpState};
pub use sync::{Barrier, SpinGuard, SpinLock};
pub use vector::{ActiveVector, DetectedVector, VectorContext};
