//! Retrying calls that lose their database connection.
//!
//! Only [`CatalogueError::ConnectionLost`] is retried. Validation, not-found,
//! conflict and schema errors come back on the first attempt. A create whose
//! first attempt committed before the link dropped may report a duplicate on
//! the retry; that error is returned unchanged.

use crate::catalogue::Catalogue;
use crate::cursor::{BoxCursor, CatalogueCursor};
use crate::error::{CatalogueError, CatalogueResult};
use crate::metrics;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tapecat_core::SchemaVersion;
use tapecat_core::config::CatalogueConfig;
use tokio::sync::Mutex;

/// How many times to try a call and how long to wait between tries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_tries: u32,
    /// Base delay; the wait after attempt N is N times this value.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_tries: u32, backoff: Duration) -> Self {
        Self {
            max_tries: max_tries.max(1),
            backoff,
        }
    }

    pub fn from_config(config: &CatalogueConfig) -> Self {
        Self::new(config.max_tries_to_connect, config.retry_backoff())
    }

    /// Run `op` until it succeeds, fails with anything but a lost connection,
    /// or has been tried `max_tries` times.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> CatalogueResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = CatalogueResult<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !self.retry_after(attempt, &err).await {
                        return Err(err);
                    }
                }
            }
        }
    }

    /// Decide whether `err` on `attempt` deserves another try, sleeping first if so.
    async fn retry_after(&self, attempt: u32, err: &CatalogueError) -> bool {
        if !err.is_connection_lost() {
            return false;
        }
        metrics::CONNECTION_LOST.inc();
        if attempt >= self.max_tries {
            metrics::RETRIES_EXHAUSTED.inc();
            tracing::error!(
                attempt,
                max_tries = self.max_tries,
                error = %err,
                "Catalogue connection lost on every attempt"
            );
            return false;
        }

        metrics::RETRIES.inc();
        let delay = self.backoff * attempt;
        tracing::warn!(
            attempt,
            max_tries = self.max_tries,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Catalogue connection lost, retrying"
        );
        tokio::time::sleep(delay).await;
        true
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&CatalogueConfig::default())
    }
}

/// A catalogue whose calls are retried on connection loss.
///
/// Any facade call goes through [`RetryingCatalogue::run`]:
///
/// ```ignore
/// let pools = catalogue
///     .run(|c| async move { c.tape_pools().get_tape_pools(criteria).await })
///     .await?;
/// ```
#[derive(Clone)]
pub struct RetryingCatalogue {
    inner: Arc<dyn Catalogue>,
    policy: RetryPolicy,
}

impl RetryingCatalogue {
    pub fn new(inner: Arc<dyn Catalogue>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped catalogue, for calls that must not be retried.
    pub fn inner(&self) -> &Arc<dyn Catalogue> {
        &self.inner
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Apply the retry policy to one catalogue call.
    pub async fn run<T, F, Fut>(&self, op: F) -> CatalogueResult<T>
    where
        F: Fn(Arc<dyn Catalogue>) -> Fut,
        Fut: Future<Output = CatalogueResult<T>>,
    {
        self.policy.run(|| op(Arc::clone(&self.inner))).await
    }

    /// Open a cursor with retries and keep retrying each step of it.
    pub async fn cursor<T, F, Fut>(&self, open: F) -> CatalogueResult<RetryingCursor<T>>
    where
        T: Send + 'static,
        F: Fn(Arc<dyn Catalogue>) -> Fut,
        Fut: Future<Output = CatalogueResult<BoxCursor<T>>>,
    {
        let inner = self.run(open).await?;
        Ok(RetryingCursor::new(inner, self.policy))
    }

    pub async fn ping(&self) -> CatalogueResult<()> {
        self.run(|c| async move { c.ping().await }).await
    }

    pub async fn get_schema_version(&self) -> CatalogueResult<SchemaVersion> {
        self.run(|c| async move { c.get_schema_version().await })
            .await
    }

    pub async fn verify_schema_version(&self) -> CatalogueResult<()> {
        self.run(|c| async move { c.verify_schema_version().await })
            .await
    }
}

/// A cursor whose every step is retried on connection loss.
pub struct RetryingCursor<T> {
    // Locked so that each attempt of `RetryPolicy::run` can reach the cursor.
    inner: Mutex<BoxCursor<T>>,
    policy: RetryPolicy,
}

impl<T: Send + 'static> RetryingCursor<T> {
    pub fn new(inner: BoxCursor<T>, policy: RetryPolicy) -> Self {
        Self {
            inner: Mutex::new(inner),
            policy,
        }
    }
}

#[async_trait]
impl<T: Send + 'static> CatalogueCursor for RetryingCursor<T> {
    type Item = T;

    async fn has_more(&mut self) -> CatalogueResult<bool> {
        let inner = &self.inner;
        self.policy
            .run(|| async move { inner.lock().await.has_more().await })
            .await
    }

    async fn next(&mut self) -> CatalogueResult<T> {
        let inner = &self.inner;
        self.policy
            .run(|| async move { inner.lock().await.next().await })
            .await
    }
}
