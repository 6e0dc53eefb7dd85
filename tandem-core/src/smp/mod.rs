//! Hart boot coordination.
//!
//! Every hart enters at the same reset vector. Hart 0 becomes the primary: it
//! clears and initializes [`SmpState`], then sets the release flag. The
//! others park on that flag, announce themselves once it flips, and from then
//! on every hart walks the same sequence of [`Checkpoint`]s.
//!
//! A hart that never arrives deadlocks everyone at the next checkpoint. There
//! is no watchdog; the machine simply stops producing output.

mod checkpoint;
mod protocol;

use core::fmt;

use crossbeam_utils::CachePadded;
use log::{debug, info};
use tandem_io::atomic::{full_fence, spin_hint, write_fence};
use tandem_io::{Console, SharedU32};

use crate::console::SerialConsole;
use crate::sync::{Barrier, SpinLock};

pub use checkpoint::{Checkpoint, Rendezvous};
pub use protocol::{run_primary, run_secondary};

const RELEASED: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HartRole {
    Primary,
    Secondary,
}

/// Lifecycle of a single hart.
///
/// Primary: `Reset -> ClearState -> InitShared -> Online`.
/// Secondary: `Reset -> Parked -> Online`.
/// Both then go `Participating -> Idle`, and `Idle` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HartState {
    Reset,
    ClearState,
    InitShared,
    Parked,
    Online,
    Participating,
    Idle,
}

impl HartState {
    pub const fn can_advance_to(self, next: HartState, role: HartRole) -> bool {
        use HartState::*;
        match (self, next) {
            (Reset, ClearState) | (ClearState, InitShared) | (InitShared, Online) => {
                matches!(role, HartRole::Primary)
            }
            (Reset, Parked) | (Parked, Online) => matches!(role, HartRole::Secondary),
            (Online, Participating) | (Participating, Idle) => true,
            _ => false,
        }
    }
}

/// One hardware thread and where it is in its lifecycle.
pub struct Hart {
    id: usize,
    role: HartRole,
    state: HartState,
}

impl Hart {
    /// Hart 0 is the primary; every other id is a secondary.
    pub fn new(id: usize) -> Self {
        let role = if id == 0 { HartRole::Primary } else { HartRole::Secondary };
        Self { id, role, state: HartState::Reset }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn role(&self) -> HartRole {
        self.role
    }

    pub fn state(&self) -> HartState {
        self.state
    }

    pub fn is_primary(&self) -> bool {
        self.role == HartRole::Primary
    }

    /// Moves to `next`. Out-of-order transitions are bugs in the caller.
    pub fn advance(&mut self, next: HartState) {
        debug_assert!(
            self.state.can_advance_to(next, self.role),
            "hart {}: illegal transition {:?} -> {:?}",
            self.id,
            self.state,
            next
        );
        debug!("hart {}: {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }
}

impl fmt::Debug for Hart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hart")
            .field("id", &self.id)
            .field("role", &self.role)
            .field("state", &self.state)
            .finish()
    }
}

/// Every word more than one hart writes, in one place.
///
/// Each word sits on its own cache line so polling one (the release flag, a
/// barrier generation) does not bounce the line holding another.
pub struct SmpState {
    harts: u32,
    release: CachePadded<SharedU32>,
    online: CachePadded<SharedU32>,
    print_lock: CachePadded<SpinLock>,
    test_lock: CachePadded<SpinLock>,
    barrier: CachePadded<Barrier>,
    lock_counter: CachePadded<SharedU32>,
    atomic_counter: CachePadded<SharedU32>,
}

impl SmpState {
    /// Zeroed state for `harts` participants. Usable in a `static`.
    pub const fn new(harts: u32) -> Self {
        Self {
            harts,
            release: CachePadded::new(SharedU32::new(0)),
            online: CachePadded::new(SharedU32::new(0)),
            print_lock: CachePadded::new(SpinLock::new()),
            test_lock: CachePadded::new(SpinLock::new()),
            barrier: CachePadded::new(Barrier::new(harts)),
            lock_counter: CachePadded::new(SharedU32::new(0)),
            atomic_counter: CachePadded::new(SharedU32::new(0)),
        }
    }

    pub fn harts(&self) -> u32 {
        self.harts
    }

    /// Primary only, before [`SmpState::release_secondaries`].
    ///
    /// Clears the counters, locks and barrier, then fences so the cleared
    /// state is globally visible. The release flag is left alone: it is zero
    /// from construction (or from BSS clearing) and must stay zero until
    /// setup is done.
    pub fn init(&self) {
        self.online.store(0);
        self.lock_counter.store(0);
        self.atomic_counter.store(0);
        self.print_lock.reset();
        self.test_lock.reset();
        self.barrier.reset();
        write_fence();
    }

    /// Lets parked secondaries run.
    ///
    /// Setup writes are fenced before the flag so no secondary can observe
    /// the flag ahead of them.
    pub fn release_secondaries(&self) {
        write_fence();
        self.release.store(RELEASED);
        write_fence();
        info!("released {} secondary hart(s)", self.harts.saturating_sub(1));
    }

    pub fn is_released(&self) -> bool {
        self.release.load() == RELEASED
    }

    /// Secondary only: polls the release flag until the primary sets it.
    pub fn park(&self) {
        while !self.is_released() {
            spin_hint();
        }
    }

    /// Counts the calling secondary as online. Returns the new total.
    pub fn announce_online(&self) -> u32 {
        self.online.fetch_add(1) + 1
    }

    /// Primary only: polls until every secondary has announced itself.
    pub fn await_secondaries(&self) {
        let expected = self.harts.saturating_sub(1);
        while self.online.load() < expected {
            spin_hint();
        }
        full_fence();
    }

    pub fn online_count(&self) -> u32 {
        self.online.load()
    }

    pub fn print_lock(&self) -> &SpinLock {
        &self.print_lock
    }

    pub fn test_lock(&self) -> &SpinLock {
        &self.test_lock
    }

    pub fn barrier(&self) -> &Barrier {
        &self.barrier
    }

    /// Counter only ever mutated under [`SmpState::test_lock`].
    pub fn lock_counter(&self) -> &SharedU32 {
        &self.lock_counter
    }

    /// Counter only ever mutated with an atomic add.
    pub fn atomic_counter(&self) -> &SharedU32 {
        &self.atomic_counter
    }

    /// `console` serialized by this state's print lock.
    pub fn console<'a>(&'a self, console: &'a (dyn Console + Sync)) -> SerialConsole<'a> {
        SerialConsole::new(console, &self.print_lock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_follow_hart_id() {
        assert!(Hart::new(0).is_primary());
        assert_eq!(Hart::new(3).role(), HartRole::Secondary);
    }

    #[test]
    fn test_lifecycle_transitions() {
        use HartState::*;
        let p = HartRole::Primary;
        let s = HartRole::Secondary;
        assert!(Reset.can_advance_to(ClearState, p));
        assert!(!Reset.can_advance_to(ClearState, s));
        assert!(Reset.can_advance_to(Parked, s));
        assert!(!Reset.can_advance_to(Parked, p));
        assert!(Parked.can_advance_to(Online, s));
        assert!(Participating.can_advance_to(Idle, p));
        assert!(!Idle.can_advance_to(Reset, p));
        assert!(!Online.can_advance_to(Idle, s));
    }

    #[test]
    fn test_primary_walks_its_lifecycle() {
        let mut hart = Hart::new(0);
        for next in [
            HartState::ClearState,
            HartState::InitShared,
            HartState::Online,
            HartState::Participating,
            HartState::Idle,
        ] {
            hart.advance(next);
        }
        assert_eq!(hart.state(), HartState::Idle);
    }

    #[test]
    #[should_panic(expected = "illegal transition")]
    fn test_secondary_cannot_skip_parking() {
        let mut hart = Hart::new(1);
        hart.advance(HartState::Online);
    }

    #[test]
    fn test_init_clears_and_release_is_one_shot() {
        let smp = SmpState::new(2);
        smp.announce_online();
        smp.atomic_counter().fetch_add(5);
        smp.init();
        assert_eq!(smp.online_count(), 0);
        assert_eq!(smp.atomic_counter().load(), 0);
        assert!(!smp.is_released());

        smp.release_secondaries();
        assert!(smp.is_released());
        smp.park();
        assert_eq!(smp.announce_online(), 1);
        smp.await_secondaries();
    }
}
