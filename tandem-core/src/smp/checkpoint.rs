use core::fmt;

use log::trace;

use crate::sync::{Barrier, BarrierWaitResult};

/// Named rendezvous points, in the order every hart visits them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Checkpoint {
    BootComplete,
    LockTestStart,
    LockTestEnd,
    AtomicTestStart,
    AtomicTestEnd,
    Final,
}

impl Checkpoint {
    pub const SEQUENCE: [Checkpoint; 6] = [
        Checkpoint::BootComplete,
        Checkpoint::LockTestStart,
        Checkpoint::LockTestEnd,
        Checkpoint::AtomicTestStart,
        Checkpoint::AtomicTestEnd,
        Checkpoint::Final,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Checkpoint::BootComplete => "boot-complete",
            Checkpoint::LockTestStart => "lock-test-start",
            Checkpoint::LockTestEnd => "lock-test-end",
            Checkpoint::AtomicTestStart => "atomic-test-start",
            Checkpoint::AtomicTestEnd => "atomic-test-end",
            Checkpoint::Final => "final",
        }
    }
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One hart's cursor through [`Checkpoint::SEQUENCE`].
///
/// Every checkpoint is exactly one wait on the shared barrier, so all harts
/// must agree on the order. Skipping or repeating one would pair this hart's
/// wait with a different checkpoint on another hart.
pub struct Rendezvous<'a> {
    barrier: &'a Barrier,
    hart_id: usize,
    next: usize,
}

impl<'a> Rendezvous<'a> {
    pub fn new(barrier: &'a Barrier, hart_id: usize) -> Self {
        Self { barrier, hart_id, next: 0 }
    }

    /// Waits at `checkpoint` until every hart has arrived.
    pub fn arrive(&mut self, checkpoint: Checkpoint) -> BarrierWaitResult {
        debug_assert_eq!(
            Checkpoint::SEQUENCE.get(self.next).copied(),
            Some(checkpoint),
            "hart {} reached checkpoints out of order",
            self.hart_id
        );
        trace!("hart {}: arrived at {}", self.hart_id, checkpoint);
        let result = self.barrier.wait();
        trace!("hart {}: passed {} (generation {})", self.hart_id, checkpoint, result.generation());
        self.next += 1;
        result
    }

    /// The checkpoint this hart must visit next, if any.
    pub fn upcoming(&self) -> Option<Checkpoint> {
        Checkpoint::SEQUENCE.get(self.next).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.next == Checkpoint::SEQUENCE.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let labels: Vec<&str> = Checkpoint::SEQUENCE.iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            [
                "boot-complete",
                "lock-test-start",
                "lock-test-end",
                "atomic-test-start",
                "atomic-test-end",
                "final"
            ]
        );
    }

    #[test]
    fn test_cursor_walks_the_sequence() {
        let barrier = Barrier::new(1);
        let mut rendezvous = Rendezvous::new(&barrier, 0);
        for (round, checkpoint) in Checkpoint::SEQUENCE.into_iter().enumerate() {
            assert_eq!(rendezvous.upcoming(), Some(checkpoint));
            assert_eq!(rendezvous.arrive(checkpoint).generation(), round as u32);
        }
        assert!(rendezvous.is_complete());
        assert_eq!(rendezvous.upcoming(), None);
    }

    #[test]
    #[should_panic(expected = "out of order")]
    fn test_skipping_a_checkpoint_is_caught() {
        let barrier = Barrier::new(1);
        let mut rendezvous = Rendezvous::new(&barrier, 0);
        rendezvous.arrive(Checkpoint::LockTestStart);
    }
}
