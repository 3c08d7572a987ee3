//! One-shot background queries.
//!
//! A query runs a blocking storage operation on tokio's blocking pool and
//! reports exactly one [`Outcome`] back to the task that awaits it. Success
//! and failure are explicit variants, so a successful lookup that found
//! nothing is `Outcome::Success(None)` and never mistaken for an error.
//! Dispatched queries cannot be cancelled; dropping an [`AsyncQuery`] detaches
//! it and the operation still runs to completion.

mod identity;

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};

use crate::types::{IdentityError, Result};

pub use identity::AsyncIdentityStorage;

/// Result of a background query.
#[derive(Debug)]
pub enum Outcome<T> {
    Success(T),
    Failure(IdentityError),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn into_result(self) -> Result<T> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failure(err) => Err(err),
        }
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(res: Result<T>) -> Self {
        match res {
            Ok(value) => Outcome::Success(value),
            Err(err) => Outcome::Failure(err),
        }
    }
}

/// Hooks observed by the task that dispatched a query.
///
/// `on_start` runs before dispatch, then exactly one of `on_success` or
/// `on_error`, then `on_complete`.
pub trait QueryCallbacks<T> {
    fn on_start(&mut self) {}

    fn on_success(&mut self, _result: T) {}

    fn on_error(&mut self, err: IdentityError) {
        log::error!("identity query failed: {}", err);
    }

    fn on_complete(&mut self) {}
}

/// No callbacks: results are dropped and failures only logged.
impl<T> QueryCallbacks<T> for () {}

/// Handle to a dispatched query.
pub struct AsyncQuery<T> {
    label: &'static str,
    handle: JoinHandle<Outcome<T>>,
}

impl<T> AsyncQuery<T> {
    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn wait(self) -> Outcome<T> {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(err) => Outcome::Failure(join_failure(self.label, err)),
        }
    }

    /// Waits for the outcome and hands it to `callbacks`, then calls `on_complete`.
    pub async fn deliver<C>(self, callbacks: &mut C)
    where
        C: QueryCallbacks<T> + ?Sized,
    {
        match self.wait().await {
            Outcome::Success(value) => callbacks.on_success(value),
            Outcome::Failure(err) => callbacks.on_error(err),
        }
        callbacks.on_complete();
    }
}

/// Runs queries on the blocking pool, at most `workers` at a time.
#[derive(Clone, Debug)]
pub struct QueryExecutor {
    permits: Arc<Semaphore>,
    workers: usize,
}

impl QueryExecutor {
    pub fn new(workers: usize) -> Self {
        let workers = workers.max(1);
        Self {
            permits: Arc::new(Semaphore::new(workers)),
            workers,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Dispatches `op`. Must be called from within a tokio runtime.
    pub fn spawn<T, F>(&self, label: &'static str, op: F) -> AsyncQuery<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let permits = self.permits.clone();
        let handle = tokio::spawn(async move {
            let permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    return Outcome::Failure(IdentityError::TaskAborted(format!(
                        "{label}: executor closed"
                    )))
                }
            };
            let span = tracing::debug_span!("identity_query", op = label);
            let joined = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                let _enter = span.enter();
                op()
            })
            .await;
            match joined {
                Ok(res) => Outcome::from(res),
                Err(err) => Outcome::Failure(join_failure(label, err)),
            }
        });
        AsyncQuery { label, handle }
    }

    /// Full callback lifecycle: `on_start`, dispatch, outcome, `on_complete`.
    pub async fn run<T, F, C>(&self, label: &'static str, op: F, callbacks: &mut C)
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T> + Send + 'static,
        C: QueryCallbacks<T> + ?Sized,
    {
        callbacks.on_start();
        self.spawn(label, op).deliver(callbacks).await;
    }

    /// Stops accepting work. Queries still waiting for a worker fail with
    /// [`IdentityError::TaskAborted`]; running ones finish normally.
    pub fn close(&self) {
        self.permits.close();
    }
}

impl Default for QueryExecutor {
    fn default() -> Self {
        Self::new(crate::configuration::DEFAULT_WORKERS)
    }
}

fn join_failure(label: &str, err: JoinError) -> IdentityError {
    if err.is_panic() {
        let payload = err.into_panic();
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        log::error!("query {} panicked: {}", label, msg);
        IdentityError::TaskPanicked(format!("{label}: {msg}"))
    } else {
        IdentityError::TaskAborted(format!("{label}: {err}"))
    }
}
