//! The multi-hart test sequence both roles run in lockstep.
//!
//! Between each matching pair of checkpoints every hart performs exactly one
//! agreed mutation of a shared counter, so after `final` the primary can
//! check the aggregate against the hart count.

use log::info;

use super::{Checkpoint, Hart, HartState, Rendezvous, SmpState};
use crate::console::SerialConsole;
use crate::harness::Tally;

/// Increments the lock counter with a plain read-modify-write under the test
/// lock. Only the lock makes this safe.
fn bump_under_lock(smp: &SmpState) {
    let _guard = smp.test_lock().lock();
    let counter = smp.lock_counter();
    counter.store_plain(counter.load_plain() + 1);
}

/// Primary side: boot the secondaries, then run and grade the shared tests.
///
/// Records "SMP boot", "Spinlock", "Atomic operations" and "Barrier
/// synchronization" into `tally`. Returns with `hart` in `Idle`.
pub fn run_primary(smp: &SmpState, hart: &mut Hart, console: &SerialConsole<'_>, tally: &mut Tally) {
    let harts = smp.harts();
    console.line(format_args!("[INFO] Running Phase 4 SMP tests with {} harts...", harts));
    console.line(format_args!(""));

    hart.advance(HartState::ClearState);
    smp.init();
    hart.advance(HartState::InitShared);
    console.line(format_args!("[SMP] Hart {} online", hart.id()));
    console.line(format_args!("[SMP] Releasing secondary harts..."));
    smp.release_secondaries();

    smp.await_secondaries();
    hart.advance(HartState::Online);
    console.line(format_args!("[SMP] All {} harts online", harts));
    tally.record(console, "SMP boot", smp.online_count() == harts.saturating_sub(1));
    console.line(format_args!(""));

    hart.advance(HartState::Participating);
    let mut rendezvous = Rendezvous::new(smp.barrier(), hart.id());
    rendezvous.arrive(Checkpoint::BootComplete);

    smp.lock_counter().store(0);
    rendezvous.arrive(Checkpoint::LockTestStart);
    bump_under_lock(smp);
    rendezvous.arrive(Checkpoint::LockTestEnd);
    let locked = smp.lock_counter().load();
    console.line(format_args!("[SMP] Spinlock counter: {}/{}", locked, harts));
    tally.record(console, "Spinlock", locked == harts);
    console.line(format_args!(""));

    smp.atomic_counter().store(0);
    rendezvous.arrive(Checkpoint::AtomicTestStart);
    smp.atomic_counter().fetch_add(1);
    rendezvous.arrive(Checkpoint::AtomicTestEnd);
    let atomic = smp.atomic_counter().load();
    console.line(format_args!("[SMP] Atomic counter: {}/{}", atomic, harts));
    tally.record(console, "Atomic operations", atomic == harts);
    console.line(format_args!(""));

    // Reaching here means every earlier checkpoint released every hart.
    rendezvous.arrive(Checkpoint::Final);
    tally.record(console, "Barrier synchronization", rendezvous.is_complete());
    console.line(format_args!(""));

    hart.advance(HartState::Idle);
    info!("primary: SMP phase done, {}/{} passed", tally.passed, tally.total);
}

/// Secondary side: park, announce, then mirror the primary's checkpoints.
/// Returns with `hart` in `Idle`; the caller parks it for good.
pub fn run_secondary(smp: &SmpState, hart: &mut Hart, console: &SerialConsole<'_>) {
    hart.advance(HartState::Parked);
    smp.park();
    hart.advance(HartState::Online);

    console.line(format_args!("[SMP] Hart {} online", hart.id()));
    smp.announce_online();

    hart.advance(HartState::Participating);
    let mut rendezvous = Rendezvous::new(smp.barrier(), hart.id());
    rendezvous.arrive(Checkpoint::BootComplete);

    rendezvous.arrive(Checkpoint::LockTestStart);
    bump_under_lock(smp);
    rendezvous.arrive(Checkpoint::LockTestEnd);

    rendezvous.arrive(Checkpoint::AtomicTestStart);
    smp.atomic_counter().fetch_add(1);
    rendezvous.arrive(Checkpoint::AtomicTestEnd);

    rendezvous.arrive(Checkpoint::Final);
    hart.advance(HartState::Idle);
}
