//! Single-flight coordination of token refreshes.
//!
//! When several requests are rejected with 401 at about the same time, only
//! the first one (the leader) calls the refresh endpoint. Everyone else
//! queues behind it and is released with the same outcome once the leader
//! settles the refresh, successful or not.
//!
//! ```
//! use peel_client::refresh::{Acquired, RefreshCoordinator};
//! use peel_core::AccessToken;
//!
//! # async fn example() {
//! let coordinator = RefreshCoordinator::new();
//!
//! let Acquired::Leader(guard) = coordinator.acquire_or_wait() else { unreachable!() };
//! let Acquired::Waiter(waiter) = coordinator.acquire_or_wait() else { unreachable!() };
//!
//! guard.resolve(Some(AccessToken::new("fresh")));
//! assert_eq!(waiter.wait().await, Ok(Some(AccessToken::new("fresh"))));
//! # }
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::{debug, trace};

use peel_core::{AccessToken, AuthError};

/// What every participant of a refresh observes.
///
/// `Ok(None)` means the refresh succeeded but the new credential lives in
/// the cookie jar rather than in a readable token.
pub type RefreshOutcome = Result<Option<AccessToken>, AuthError>;

/// Owns the Idle/Refreshing state and the queue of waiters.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    state: Mutex<State>,
}

#[derive(Debug, Default)]
enum State {
    #[default]
    Idle,
    Refreshing {
        waiters: Vec<oneshot::Sender<RefreshOutcome>>,
    },
}

/// Result of [`RefreshCoordinator::acquire_or_wait`].
#[derive(Debug)]
pub enum Acquired<'a> {
    /// The caller must perform the refresh and settle it through the guard.
    Leader(RefreshGuard<'a>),
    /// A refresh is already running; wait for its outcome.
    Waiter(RefreshWaiter),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Become the refresh leader, or queue behind the refresh in flight.
    pub fn acquire_or_wait(&self) -> Acquired<'_> {
        let mut state = self.lock();
        match &mut *state {
            State::Idle => {
                *state = State::Refreshing {
                    waiters: Vec::new(),
                };
                debug!("starting token refresh");
                Acquired::Leader(RefreshGuard {
                    coordinator: self,
                    settled: false,
                })
            }
            State::Refreshing { waiters } => {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                trace!(queued = waiters.len(), "waiting on token refresh in flight");
                Acquired::Waiter(RefreshWaiter { rx })
            }
        }
    }

    /// Returns true while a refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.lock(), State::Refreshing { .. })
    }

    /// Number of callers queued behind the refresh in flight.
    pub fn waiting(&self) -> usize {
        match &*self.lock() {
            State::Idle => 0,
            State::Refreshing { waiters } => waiters.len(),
        }
    }

    // Return to Idle and release every waiter, in subscription order.
    fn settle(&self, outcome: RefreshOutcome) {
        let waiters = match std::mem::take(&mut *self.lock()) {
            State::Refreshing { waiters } => waiters,
            State::Idle => Vec::new(),
        };

        debug!(
            waiters = waiters.len(),
            success = outcome.is_ok(),
            "token refresh settled"
        );

        for waiter in waiters {
            // A waiter whose request was cancelled has dropped its receiver.
            let _ = waiter.send(outcome.clone());
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held by the refresh leader.
///
/// Dropping the guard without settling fails every waiter with
/// [`AuthError::RefreshAborted`], so a cancelled leader never strands them.
#[derive(Debug)]
pub struct RefreshGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshGuard<'_> {
    /// Finish the refresh successfully and hand `token` to every waiter.
    pub fn resolve(mut self, token: Option<AccessToken>) {
        self.settled = true;
        self.coordinator.settle(Ok(token));
    }

    /// Finish the refresh with a failure shared by every waiter.
    pub fn reject(mut self, error: AuthError) {
        self.settled = true;
        self.coordinator.settle(Err(error));
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.coordinator.settle(Err(AuthError::RefreshAborted));
        }
    }
}

/// Held by a caller queued behind the refresh leader.
#[derive(Debug)]
pub struct RefreshWaiter {
    rx: oneshot::Receiver<RefreshOutcome>,
}

impl RefreshWaiter {
    /// Wait for the leader to settle the refresh.
    pub async fn wait(self) -> RefreshOutcome {
        self.rx.await.unwrap_or(Err(AuthError::RefreshAborted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leader(coordinator: &RefreshCoordinator) -> RefreshGuard<'_> {
        match coordinator.acquire_or_wait() {
            Acquired::Leader(guard) => guard,
            Acquired::Waiter(_) => panic!("expected to lead the refresh"),
        }
    }

    fn waiter(coordinator: &RefreshCoordinator) -> RefreshWaiter {
        match coordinator.acquire_or_wait() {
            Acquired::Waiter(waiter) => waiter,
            Acquired::Leader(_) => panic!("expected to wait on the refresh"),
        }
    }

    #[test]
    fn first_caller_leads() {
        let coordinator = RefreshCoordinator::new();
        assert!(!coordinator.is_refreshing());

        let _guard = leader(&coordinator);
        assert!(coordinator.is_refreshing());

        let _w1 = waiter(&coordinator);
        let _w2 = waiter(&coordinator);
        assert_eq!(coordinator.waiting(), 2);
    }

    #[tokio::test]
    async fn resolve_releases_every_waiter_with_the_token() {
        let coordinator = RefreshCoordinator::new();
        let guard = leader(&coordinator);
        let waiters: Vec<_> = (0..5).map(|_| waiter(&coordinator)).collect();

        guard.resolve(Some(AccessToken::new("fresh")));

        assert!(!coordinator.is_refreshing());
        assert_eq!(coordinator.waiting(), 0);
        for w in waiters {
            assert_eq!(w.wait().await, Ok(Some(AccessToken::new("fresh"))));
        }
    }

    #[tokio::test]
    async fn reject_fails_every_waiter() {
        let coordinator = RefreshCoordinator::new();
        let guard = leader(&coordinator);
        let w1 = waiter(&coordinator);
        let w2 = waiter(&coordinator);

        guard.reject(AuthError::SessionExpired);

        assert_eq!(w1.wait().await, Err(AuthError::SessionExpired));
        assert_eq!(w2.wait().await, Err(AuthError::SessionExpired));
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn dropped_leader_aborts_waiters() {
        let coordinator = RefreshCoordinator::new();
        let guard = leader(&coordinator);
        let w = waiter(&coordinator);

        drop(guard);

        assert_eq!(w.wait().await, Err(AuthError::RefreshAborted));
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn returns_to_idle_after_settling() {
        let coordinator = RefreshCoordinator::new();

        leader(&coordinator).resolve(None);
        let guard = leader(&coordinator);
        let w = waiter(&coordinator);
        guard.resolve(None);

        assert_eq!(w.wait().await, Ok(None));
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_refresh() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let coordinator = Arc::new(RefreshCoordinator::new());
        let refreshes = Arc::new(AtomicUsize::new(0));
        let (start_tx, start_rx) = tokio::sync::watch::channel(false);

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let coordinator = Arc::clone(&coordinator);
            let refreshes = Arc::clone(&refreshes);
            let mut start_rx = start_rx.clone();
            tasks.push(tokio::spawn(async move {
                match coordinator.acquire_or_wait() {
                    Acquired::Leader(guard) => {
                        refreshes.fetch_add(1, Ordering::SeqCst);
                        // Hold the refresh open until every task has queued.
                        let _ = start_rx.wait_for(|go| *go).await;
                        guard.resolve(Some(AccessToken::new("shared")));
                        Ok(Some(AccessToken::new("shared")))
                    }
                    Acquired::Waiter(waiter) => waiter.wait().await,
                }
            }));
        }

        while coordinator.waiting() < 7 {
            tokio::task::yield_now().await;
        }
        start_tx.send(true).unwrap();

        for task in tasks {
            assert_eq!(task.await.unwrap(), Ok(Some(AccessToken::new("shared"))));
        }
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
    }
}
