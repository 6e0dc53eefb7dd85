//! Lock and barrier primitives built on the shared-word layer.
//!
//! Neither primitive is fair. Critical sections in this crate are a handful
//! of instructions long, so starvation under contention is tolerated.

mod barrier;
mod spinlock;

pub use barrier::{Barrier, BarrierWaitResult};
pub use spinlock::{SpinGuard, SpinLock};
