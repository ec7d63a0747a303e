use crate::api::RefreshError;
use crate::domain_model::AccessToken;
use std::future::Future;
use std::mem;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

type Outcome = Result<AccessToken, RefreshError>;

enum RefreshState {
    Idle,
    Refreshing { waiters: Vec<oneshot::Sender<Outcome>> },
}

struct Inner {
    state: RefreshState,
    /// Token produced by the last successful refresh, cleared on failure.
    latest: Option<AccessToken>,
}

/// Single-flight gate around token refresh: `Idle → Refreshing → Idle`.
///
/// The first caller to hit a 401 becomes the leader and runs the refresh;
/// callers arriving while it runs are queued and receive the leader's
/// outcome. The lock is never held across an await.
pub struct RefreshCoordinator {
    inner: Mutex<Inner>,
}

enum Ticket<'a> {
    /// A newer token than the one the caller was rejected with exists.
    Current(AccessToken),
    Leader(LeaderGuard<'a>),
    Follower(oneshot::Receiver<Outcome>),
}

struct LeaderGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    finished: bool,
}

impl LeaderGuard<'_> {
    fn finish(mut self, outcome: &Outcome) {
        self.finished = true;
        self.coordinator.settle(outcome);
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.coordinator.settle(&Err(RefreshError::Abandoned));
        }
    }
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: RefreshState::Idle,
                latest: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(self.lock().state, RefreshState::Refreshing { .. })
    }

    pub fn queued(&self) -> usize {
        match &self.lock().state {
            RefreshState::Idle => 0,
            RefreshState::Refreshing { waiters } => waiters.len(),
        }
    }

    /// Forget the last refreshed token, e.g. after logout or a new login.
    pub fn reset(&self) {
        self.lock().latest = None;
    }

    fn ticket(&self, rejected: Option<&AccessToken>) -> Ticket<'_> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        match &mut inner.state {
            RefreshState::Refreshing { waiters } => {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                Ticket::Follower(rx)
            }
            RefreshState::Idle => {
                if let Some(latest) = &inner.latest {
                    if Some(latest) != rejected {
                        return Ticket::Current(latest.clone());
                    }
                }
                inner.state = RefreshState::Refreshing {
                    waiters: Vec::new(),
                };
                Ticket::Leader(LeaderGuard {
                    coordinator: self,
                    finished: false,
                })
            }
        }
    }

    fn settle(&self, outcome: &Outcome) {
        let waiters = {
            let mut inner = self.lock();
            inner.latest = outcome.as_ref().ok().cloned();
            match mem::replace(&mut inner.state, RefreshState::Idle) {
                RefreshState::Refreshing { waiters } => waiters,
                RefreshState::Idle => Vec::new(),
            }
        };
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
    }

    /// Returns a token newer than `rejected`, running `refresh` only if no
    /// other caller is already doing so.
    pub async fn refreshed_token<F, Fut>(
        &self,
        rejected: Option<&AccessToken>,
        refresh: F,
    ) -> Outcome
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Outcome>,
    {
        match self.ticket(rejected) {
            Ticket::Current(token) => Ok(token),
            Ticket::Follower(rx) => rx.await.unwrap_or(Err(RefreshError::Abandoned)),
            Ticket::Leader(guard) => {
                let outcome = refresh().await;
                guard.finish(&outcome);
                outcome
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn token(s: &str) -> AccessToken {
        AccessToken(s.to_string())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_callers_share_one_refresh() {
        let coordinator = Arc::new(RefreshCoordinator::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let stale = token("old");

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let coordinator = coordinator.clone();
                let calls = calls.clone();
                let stale = stale.clone();
                tokio::spawn(async move {
                    coordinator
                        .refreshed_token(Some(&stale), || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(100)).await;
                            Ok(token("new"))
                        })
                        .await
                })
            })
            .collect();

        for outcome in futures_util::future::join_all(handles).await {
            assert_eq!(outcome.unwrap(), Ok(token("new")));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn failure_reaches_every_waiter() {
        let coordinator = Arc::new(RefreshCoordinator::new());
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let leader = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                coordinator
                    .refreshed_token(None, || async move {
                        let _ = release_rx.await;
                        Err(RefreshError::Rejected {
                            status: 401,
                            detail: None,
                        })
                    })
                    .await
            })
        };
        while !coordinator.is_refreshing() {
            tokio::task::yield_now().await;
        }

        let followers: Vec<_> = (0..3)
            .map(|_| {
                let coordinator = coordinator.clone();
                tokio::spawn(async move {
                    coordinator
                        .refreshed_token(None, || async move { Ok(token("unused")) })
                        .await
                })
            })
            .collect();
        while coordinator.queued() < 3 {
            tokio::task::yield_now().await;
        }
        release_tx.send(()).unwrap();

        let expected = Err(RefreshError::Rejected {
            status: 401,
            detail: None,
        });
        assert_eq!(leader.await.unwrap(), expected);
        for follower in followers {
            assert_eq!(follower.await.unwrap(), expected);
        }
        assert!(!coordinator.is_refreshing());
    }

    #[tokio::test]
    async fn newer_token_short_circuits() {
        let coordinator = RefreshCoordinator::new();
        let first = coordinator
            .refreshed_token(Some(&token("t0")), || async move { Ok(token("t1")) })
            .await;
        assert_eq!(first, Ok(token("t1")));

        // rejected with t0 after t1 was issued: reuse t1
        let reused = coordinator
            .refreshed_token(Some(&token("t0")), || async move { Ok(token("t2")) })
            .await;
        assert_eq!(reused, Ok(token("t1")));

        // rejected with t1 itself: refresh again
        let again = coordinator
            .refreshed_token(Some(&token("t1")), || async move { Ok(token("t2")) })
            .await;
        assert_eq!(again, Ok(token("t2")));

        coordinator.reset();
        let after_reset = coordinator
            .refreshed_token(Some(&token("t0")), || async move { Ok(token("t3")) })
            .await;
        assert_eq!(after_reset, Ok(token("t3")));
    }

    #[tokio::test]
    async fn dropped_leader_releases_waiters() {
        let coordinator = Arc::new(RefreshCoordinator::new());

        let leader = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                coordinator
                    .refreshed_token(None, || std::future::pending::<Outcome>())
                    .await
            })
        };
        while !coordinator.is_refreshing() {
            tokio::task::yield_now().await;
        }
        let follower = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                coordinator
                    .refreshed_token(None, || async move { Ok(token("unused")) })
                    .await
            })
        };
        while coordinator.queued() < 1 {
            tokio::task::yield_now().await;
        }

        leader.abort();
        assert_eq!(follower.await.unwrap(), Err(RefreshError::Abandoned));
        assert!(!coordinator.is_refreshing());
    }
}
