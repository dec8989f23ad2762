//! Registry of deferred automatic transitions. At most one timer is
//! outstanding per game: scheduling replaces (and aborts) any pending one,
//! and manual transitions cancel explicitly so a recycled timer can never
//! fire against a state it was not armed for.

use std::future::Future;
use std::time::Duration;

use dashmap::DashMap;
use tokio::task::JoinHandle;

use crate::state::game::GameId;

/// Owner of every pending deferred transition, keyed by game id.
#[derive(Debug, Default)]
pub struct TimerHub {
    tasks: DashMap<GameId, JoinHandle<()>>,
}

impl TimerHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after `delay`, replacing any timer already pending for the
    /// game. The task must reload state and re-validate its precondition
    /// when it runs; it must not act on state captured at scheduling time.
    pub fn schedule<F>(&self, game_id: GameId, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });
        if let Some(previous) = self.tasks.insert(game_id, handle) {
            previous.abort();
        }
    }

    /// Cancel the pending timer for a game, if any.
    pub fn cancel(&self, game_id: GameId) {
        if let Some((_, handle)) = self.tasks.remove(&game_id) {
            handle.abort();
        }
    }

    /// Drop the registry entry without aborting. Called by a timer task for
    /// itself once it starts firing.
    pub fn clear(&self, game_id: GameId) {
        self.tasks.remove(&game_id);
    }

    /// Whether a deferred transition is outstanding for the game.
    pub fn is_pending(&self, game_id: GameId) -> bool {
        self.tasks.contains_key(&game_id)
    }

    /// Cancel every outstanding timer across every game (global reset).
    pub fn cancel_all(&self) {
        self.tasks.retain(|_, handle| {
            handle.abort();
            false
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn scheduled_task_fires_after_the_delay() {
        let hub = TimerHub::new();
        let fired = Arc::new(AtomicU32::new(0));

        let counter = fired.clone();
        hub.schedule(1, Duration::from_secs(3), async move {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert!(hub.is_pending(1));

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_the_pending_timer() {
        let hub = TimerHub::new();
        let fired = Arc::new(AtomicU32::new(0));

        let first = fired.clone();
        hub.schedule(1, Duration::from_secs(2), async move {
            first.fetch_add(1, Ordering::SeqCst);
        });
        let second = fired.clone();
        hub.schedule(1, Duration::from_secs(5), async move {
            second.fetch_add(10, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_secs(10)).await;
        // Only the replacement ran.
        assert_eq!(fired.load(Ordering::SeqCst), 10);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_all_stops_every_timer() {
        let hub = TimerHub::new();
        let fired = Arc::new(AtomicU32::new(0));

        for game_id in 1..=3 {
            let counter = fired.clone();
            hub.schedule(game_id, Duration::from_secs(1), async move {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        hub.cancel_all();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!hub.is_pending(1));
    }
}
