use tandem_io::atomic::{full_fence, spin_hint};
use tandem_io::SharedU32;

use super::SpinLock;

/// Outcome of one [`Barrier::wait`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BarrierWaitResult {
    leader: bool,
    generation: u32,
}

impl BarrierWaitResult {
    /// `true` for exactly one caller per generation: the last to arrive.
    pub fn is_leader(&self) -> bool {
        self.leader
    }

    /// The generation this wait completed (the pre-increment value).
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

/// Reusable sense-free barrier for a fixed number of harts.
///
/// `count` only moves under the barrier's own lock and is always back in
/// `0..total` when the lock is dropped. Waiters never look at `count`; they
/// spin on `generation`, which the last arriver bumps exactly once per round
/// after resetting `count`. A hart that races ahead into the next round
/// therefore cannot be confused with a straggler from this one.
pub struct Barrier {
    lock: SpinLock,
    count: SharedU32,
    generation: SharedU32,
    total: u32,
}

impl Barrier {
    pub const fn new(total: u32) -> Self {
        Self {
            lock: SpinLock::new(),
            count: SharedU32::new(0),
            generation: SharedU32::new(0),
            total,
        }
    }

    /// Blocks (by spinning) until `total` harts have called `wait` for the
    /// current generation.
    ///
    /// # Logic
    /// 1. Under the lock, snapshot `generation` and increment `count`.
    /// 2. The caller that brings `count` to `total` resets it to 0, fences,
    ///    bumps `generation`, then unlocks.
    /// 3. Everyone else unlocks at once and polls `generation` until it moves
    ///    past the snapshot.
    ///
    /// The fence in step 2 keeps the `count` reset ordered before the new
    /// generation, so no hart can see the new generation alongside a stale
    /// count.
    pub fn wait(&self) -> BarrierWaitResult {
        let guard = self.lock.lock();
        let generation = self.generation.load_plain();
        let arrived = self.count.load_plain() + 1;

        let leader = arrived >= self.total;
        if leader {
            self.count.store_plain(0);
            full_fence();
            self.generation.store_plain(generation.wrapping_add(1));
            drop(guard);
        } else {
            self.count.store_plain(arrived);
            drop(guard);
            while self.generation.load() == generation {
                spin_hint();
            }
        }

        // Publish everything written before the barrier to every participant.
        full_fence();
        BarrierWaitResult { leader, generation }
    }

    /// Completed rounds so far.
    pub fn generation(&self) -> u32 {
        self.generation.load()
    }

    pub const fn total(&self) -> u32 {
        self.total
    }

    /// Returns the barrier to round 0. Primary initialization only.
    pub fn reset(&self) {
        self.lock.reset();
        self.count.store(0);
        self.generation.store(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_utils::thread;
    use rand::Rng;
    use tandem_io::SharedU32;

    #[test]
    fn test_single_participant_never_blocks() {
        let barrier = Barrier::new(1);
        for round in 0..3 {
            let result = barrier.wait();
            assert!(result.is_leader());
            assert_eq!(result.generation(), round);
        }
        assert_eq!(barrier.generation(), 3);
    }

    #[test]
    fn test_one_leader_per_generation() {
        const HARTS: u32 = 6;
        const ROUNDS: u32 = 50;

        let barrier = Barrier::new(HARTS);
        let leaders = SharedU32::new(0);

        thread::scope(|s| {
            for _ in 0..HARTS {
                s.spawn(|_| {
                    for round in 0..ROUNDS {
                        let result = barrier.wait();
                        assert_eq!(result.generation(), round);
                        if result.is_leader() {
                            leaders.fetch_add(1);
                        }
                    }
                });
            }
        })
        .unwrap();

        assert_eq!(leaders.load(), ROUNDS);
        assert_eq!(barrier.generation(), ROUNDS);
    }

    #[test]
    fn test_no_hart_sees_next_phase_early() {
        const HARTS: u32 = 4;
        const ROUNDS: u32 = 40;

        let barrier = Barrier::new(HARTS);
        let arrivals = SharedU32::new(0);

        thread::scope(|s| {
            for _ in 0..HARTS {
                s.spawn(|_| {
                    let mut rng = rand::thread_rng();
                    for round in 0..ROUNDS {
                        for _ in 0..rng.gen_range(0..200) {
                            spin_hint();
                        }
                        arrivals.fetch_add(1);
                        barrier.wait();
                        // Every hart's phase-`round` increment is visible, and
                        // nobody has started phase `round + 1` yet.
                        assert_eq!(arrivals.load(), (round + 1) * HARTS);
                        barrier.wait();
                    }
                });
            }
        })
        .unwrap();

        assert_eq!(arrivals.load(), ROUNDS * HARTS);
    }

    #[test]
    fn test_reset_returns_to_round_zero() {
        let barrier = Barrier::new(1);
        barrier.wait();
        barrier.wait();
        barrier.reset();
        assert_eq!(barrier.generation(), 0);
        assert_eq!(barrier.total(), 1);
    }
}
