//! Session pool implementation

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::{Mutex, RwLock};
use tarn_core::{DbError, Result, Session, SessionFactory};
use tokio::sync::Semaphore;

use super::config::PoolConfig;
use super::stats::PoolStats;

/// A bounded pool of reusable backend sessions.
///
/// The pool hands out sessions on demand: an idle session is reused if the
/// liveness probe passes, a new one is created while the total stays below
/// `max_size`, and past that callers wait for a release, up to the acquire
/// timeout. Sessions are exclusively owned while checked out; the only
/// shared mutable state is the issued counter and the idle queue.
pub struct Pool {
    /// Pool configuration
    config: PoolConfig,
    /// Session factory and liveness probe; swapped by `reconfigure`
    factory: RwLock<Arc<dyn SessionFactory>>,
    /// Idle sessions, oldest first
    idle: Mutex<VecDeque<Box<dyn Session>>>,
    /// One permit per queued idle session. A permit is added only after a
    /// push and consumed before every pop, so holding a permit means the
    /// queue has a session. This is the only point acquire ever blocks on.
    available: Semaphore,
    /// Total sessions issued (idle + checked out). Guarded by its own
    /// mutex, which is never held across an await.
    issued: Mutex<usize>,
    /// Callers currently blocked waiting for a release
    waiting: AtomicUsize,
}

impl Pool {
    /// Create a new pool. No sessions are opened until `warm_up` or the
    /// first `acquire`.
    pub fn new<F: SessionFactory>(config: PoolConfig, factory: F) -> Self {
        tracing::info!(
            min_size = config.min_size(),
            max_size = config.max_size(),
            "creating session pool"
        );
        Self {
            config,
            factory: RwLock::new(Arc::new(factory)),
            idle: Mutex::new(VecDeque::new()),
            available: Semaphore::new(0),
            issued: Mutex::new(0),
            waiting: AtomicUsize::new(0),
        }
    }

    /// Pre-warm the pool with up to `min_size` idle sessions.
    ///
    /// Individual creation failures are logged and skipped; warm-up never
    /// fails the pool. Returns the number of sessions actually created.
    pub async fn warm_up(&self) -> usize {
        let mut created = 0;
        for attempt in 1..=self.config.min_size() {
            if !self.try_reserve(false) {
                break;
            }
            match self.factory().create().await {
                Ok(session) => {
                    self.push_idle(session);
                    created += 1;
                }
                Err(e) => {
                    self.unreserve();
                    tracing::error!(
                        attempt,
                        min_size = self.config.min_size(),
                        error = %e,
                        "warm-up session creation failed"
                    );
                }
            }
        }
        tracing::info!(created, min_size = self.config.min_size(), "pool warm-up finished");
        created
    }

    /// Get a session from the pool.
    ///
    /// In order:
    /// 1. Reuse an idle session if the liveness probe passes (non-blocking,
    ///    does not touch the issued counter).
    /// 2. Below `max_size`, open a new session via the factory.
    /// 3. At `max_size`, wait for a release up to the acquire timeout, then
    ///    fail with `PoolExhausted`.
    ///
    /// A stale idle session found along the way is closed and replaced; if
    /// the replacement itself cannot be opened the error is fatal to this
    /// call only, not to the pool.
    pub async fn acquire(&self) -> Result<Box<dyn Session>> {
        let mut discarded = false;
        if let Some(mut session) = self.try_pop_idle() {
            if self.factory().is_valid(session.as_mut()).await {
                tracing::debug!("reusing idle session");
                return Ok(session);
            }
            tracing::debug!("idle session failed liveness probe, discarding");
            self.close_quietly(session).await;
            discarded = true;
        }

        // Reconcile the fast-path discard, then grow if below max_size.
        if self.try_reserve(discarded) {
            return self.create_reserved().await;
        }

        // At capacity: wait for a release, honoring the acquire timeout.
        self.waiting.fetch_add(1, Ordering::SeqCst);
        let waited =
            tokio::time::timeout(self.config.acquire_timeout(), self.available.acquire()).await;
        self.waiting.fetch_sub(1, Ordering::SeqCst);

        let permit = match waited {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => {
                return Err(DbError::Connection("pool semaphore closed".into()));
            }
            Err(_) => {
                tracing::warn!(
                    timeout = ?self.config.acquire_timeout(),
                    max_size = self.config.max_size(),
                    "acquire timed out waiting for a session"
                );
                return Err(DbError::PoolExhausted(format!(
                    "no session became available within {:?}",
                    self.config.acquire_timeout()
                )));
            }
        };

        permit.forget();
        let Some(mut session) = self.idle.lock().pop_front() else {
            // A concurrent shutdown drained the queue out from under us.
            return Err(DbError::Connection("pool is shutting down".into()));
        };

        if self.factory().is_valid(session.as_mut()).await {
            tracing::debug!("acquired session released by another caller");
            return Ok(session);
        }

        // The session that was released to us went stale; replace it under
        // the same max-size check used for growth.
        tracing::debug!("released session failed liveness probe, replacing");
        self.close_quietly(session).await;
        self.unreserve();
        if self.try_reserve(false) {
            self.create_reserved().await
        } else {
            Err(DbError::PoolExhausted(format!(
                "no session became available within {:?}",
                self.config.acquire_timeout()
            )))
        }
    }

    /// Return a session to the pool.
    ///
    /// Side-effect only: a live session goes back on the idle queue, a dead
    /// one is closed and uncounted. Never blocks, never errors.
    pub async fn release(&self, mut session: Box<dyn Session>) {
        if self.factory().is_valid(session.as_mut()).await {
            self.push_idle(session);
            tracing::debug!("session returned to idle queue");
        } else {
            tracing::debug!("released session failed liveness probe, discarding");
            self.close_quietly(session).await;
            self.unreserve();
        }
    }

    /// Acquire a session, run a unit of work against it, and release it on
    /// every exit path.
    ///
    /// The work receives the session by value and must hand it back next to
    /// its result, which makes forgetting the release a type error:
    ///
    /// ```ignore
    /// let rows = pool
    ///     .with_session(|mut session| async move {
    ///         let outcome = session.query("SELECT 1", &[]).await;
    ///         (session, outcome)
    ///     })
    ///     .await?;
    /// ```
    pub async fn with_session<T, F, Fut>(&self, work: F) -> Result<T>
    where
        F: FnOnce(Box<dyn Session>) -> Fut,
        Fut: Future<Output = (Box<dyn Session>, Result<T>)>,
    {
        let session = self.acquire().await?;
        let (session, outcome) = work(session).await;
        self.release(session).await;
        outcome
    }

    /// Close every idle session and reset the issued counter.
    ///
    /// Close failures are logged, not raised. Sessions still checked out
    /// are the caller's responsibility; closing them (rather than releasing
    /// into the drained pool) is the correct follow-up.
    pub async fn shutdown(&self) {
        let mut closed = 0usize;
        let mut failed = 0usize;
        while let Some(mut session) = self.try_pop_idle() {
            match session.close().await {
                Ok(()) => closed += 1,
                Err(e) => {
                    failed += 1;
                    tracing::warn!(error = %e, "closing idle session during shutdown failed");
                }
            }
        }
        *self.issued.lock() = 0;
        tracing::info!(closed, failed, "pool shut down");
    }

    /// Tear down idle sessions, swap the factory, and warm back up.
    ///
    /// This is the only way to change connection parameters after
    /// construction. Returns the number of sessions pre-warmed with the new
    /// factory.
    pub async fn reconfigure<F: SessionFactory>(&self, factory: F) -> usize {
        tracing::info!("reconfiguring pool");
        self.shutdown().await;
        *self.factory.write() = Arc::new(factory);
        self.warm_up().await
    }

    /// Get current pool statistics
    pub fn stats(&self) -> PoolStats {
        let idle = self.idle.lock().len();
        let total = *self.issued.lock();
        let waiting = self.waiting.load(Ordering::SeqCst);
        PoolStats::new(total, idle, total.saturating_sub(idle), waiting)
    }

    /// Get the pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    fn factory(&self) -> Arc<dyn SessionFactory> {
        self.factory.read().clone()
    }

    /// Drop one slot from the issued counter. Saturating: a session checked
    /// out across `shutdown` (which resets the counter) may still be
    /// discarded afterwards, and that must not underflow.
    fn unreserve(&self) {
        let mut issued = self.issued.lock();
        *issued = issued.saturating_sub(1);
    }

    /// Reserve a slot in the issued counter, applying a pending discard
    /// decrement first. Returns false when the pool is at max_size.
    fn try_reserve(&self, discard_to_apply: bool) -> bool {
        let mut issued = self.issued.lock();
        if discard_to_apply {
            *issued = issued.saturating_sub(1);
        }
        if *issued < self.config.max_size() {
            *issued += 1;
            true
        } else {
            false
        }
    }

    /// Open a new session against a slot already reserved in the counter,
    /// rolling the reservation back if the factory fails.
    async fn create_reserved(&self) -> Result<Box<dyn Session>> {
        match self.factory().create().await {
            Ok(session) => {
                tracing::debug!("created new session");
                Ok(session)
            }
            Err(e) => {
                self.unreserve();
                tracing::error!(error = %e, "session creation failed");
                Err(e)
            }
        }
    }

    /// Non-blocking idle pop. Consumes the matching semaphore permit.
    fn try_pop_idle(&self) -> Option<Box<dyn Session>> {
        let permit = self.available.try_acquire().ok()?;
        permit.forget();
        self.idle.lock().pop_front()
    }

    fn push_idle(&self, session: Box<dyn Session>) {
        self.idle.lock().push_back(session);
        self.available.add_permits(1);
    }

    /// Close a session that is leaving the pool, absorbing close failures.
    async fn close_quietly(&self, mut session: Box<dyn Session>) {
        if let Err(e) = session.close().await {
            tracing::debug!(error = %e, "closing discarded session failed");
        }
    }
}
