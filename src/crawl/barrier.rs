// src/crawl/barrier.rs
// =============================================================================
// A reusable counting barrier with dynamic registration.
//
// It separates the depth levels of a crawl:
// - every download and extraction task registers a party before it is
//   handed to a pool, and deregisters when it finishes (success or not)
// - the orchestrator holds one party for the whole crawl and calls
//   arrive_and_await_advance() to wait until every other party of the
//   current level is gone
//
// Once all registered parties have arrived, the phase number goes up and
// the barrier is ready for the next level.
//
// Rust concepts:
// - watch channel: every waiter sees the latest phase number; subscribing
//   while holding the state lock means no advance can be missed
// - RAII guard: Party deregisters itself in Drop, so a failed or
//   cancelled task can never leave the barrier stuck
// =============================================================================

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

#[derive(Debug)]
struct PhaseState {
    registered: usize,
    arrived: usize,
    phase: u64,
}

#[derive(Debug)]
pub struct LevelBarrier {
    state: Mutex<PhaseState>,
    phase_tx: watch::Sender<u64>,
}

impl LevelBarrier {
    /// Creates a barrier with `parties` already registered
    pub fn new(parties: usize) -> Self {
        let (phase_tx, _) = watch::channel(0);
        Self {
            state: Mutex::new(PhaseState {
                registered: parties,
                arrived: 0,
                phase: 0,
            }),
            phase_tx,
        }
    }

    pub fn register(&self) {
        self.state.lock().registered += 1;
    }

    /// Registers a party that deregisters when the returned guard drops
    pub fn party(self: &Arc<Self>) -> Party {
        self.register();
        Party {
            barrier: Arc::clone(self),
        }
    }

    pub fn arrive_and_deregister(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.registered > 0, "deregistering from an empty barrier");
        state.registered = state.registered.saturating_sub(1);
        self.advance_if_complete(&mut state);
    }

    /// Arrives with the caller's party and waits until every registered
    /// party has arrived or deregistered; the caller stays registered
    pub async fn arrive_and_await_advance(&self) {
        let (mut phase_rx, phase) = {
            let mut state = self.state.lock();
            state.arrived += 1;
            let phase = state.phase;
            if self.advance_if_complete(&mut state) {
                return;
            }
            (self.phase_tx.subscribe(), phase)
        };

        // The sender lives in self, so the channel cannot close under us
        let _ = phase_rx.wait_for(|current| *current != phase).await;
    }

    pub fn phase(&self) -> u64 {
        self.state.lock().phase
    }

    pub fn registered(&self) -> usize {
        self.state.lock().registered
    }

    fn advance_if_complete(&self, state: &mut PhaseState) -> bool {
        if state.arrived == 0 || state.arrived < state.registered {
            return false;
        }

        state.arrived = 0;
        state.phase += 1;
        self.phase_tx.send_replace(state.phase);
        true
    }
}

/// A registered party; deregisters on drop
#[derive(Debug)]
pub struct Party {
    barrier: Arc<LevelBarrier>,
}

impl Drop for Party {
    fn drop(&mut self) {
        self.barrier.arrive_and_deregister();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_single_party_advances_immediately() {
        let barrier = LevelBarrier::new(1);
        barrier.arrive_and_await_advance().await;
        barrier.arrive_and_await_advance().await;
        assert_eq!(barrier.phase(), 2);
        assert_eq!(barrier.registered(), 1);
    }

    #[tokio::test]
    async fn test_waits_for_registered_parties() {
        let barrier = Arc::new(LevelBarrier::new(1));
        let first = barrier.party();
        let second = barrier.party();
        assert_eq!(barrier.registered(), 3);

        let waiter = {
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move { barrier.arrive_and_await_advance().await })
        };

        drop(first);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        assert_eq!(barrier.phase(), 0);

        drop(second);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("barrier never advanced")
            .unwrap();
        assert_eq!(barrier.phase(), 1);
        assert_eq!(barrier.registered(), 1);
    }

    #[tokio::test]
    async fn test_deregister_without_waiter_does_not_advance() {
        let barrier = Arc::new(LevelBarrier::new(1));
        drop(barrier.party());
        assert_eq!(barrier.phase(), 0);
    }

    #[tokio::test]
    async fn test_party_released_by_panicking_task() {
        let barrier = Arc::new(LevelBarrier::new(1));
        let party = barrier.party();

        let task = tokio::spawn(async move {
            let _party = party;
            panic!("download blew up");
        });
        assert!(task.await.is_err());

        tokio::time::timeout(Duration::from_secs(1), barrier.arrive_and_await_advance())
            .await
            .expect("barrier stuck after panic");
    }

    #[tokio::test]
    async fn test_reusable_across_phases() {
        let barrier = Arc::new(LevelBarrier::new(1));
        for level in 0..3u64 {
            let party = barrier.party();
            let handle = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                drop(party);
            });
            barrier.arrive_and_await_advance().await;
            assert_eq!(barrier.phase(), level + 1);
            handle.await.unwrap();
        }
    }
}
