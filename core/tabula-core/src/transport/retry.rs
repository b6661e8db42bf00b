//! Exponential retry at the transport level.
//!
//! This is the only automatic retry in the system: the orchestrator never
//! retries a failed step. Only transient failures (no response, 408, 429,
//! 5xx) are retried; everything else surfaces on the first attempt.

use crate::transport::{Entity, TableQuery, TableTransport, TransportError, TransportResult};
use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Exponential backoff policy.
///
/// The delay before retry `n` (1-based) is
/// `min_interval + (2^n - 1) * interval * jitter`, jitter drawn from
/// `[0.8, 1.2]`, capped at `max_interval`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    #[serde(with = "millis")]
    pub interval: Duration,
    #[serde(with = "millis")]
    pub min_interval: Duration,
    #[serde(with = "millis")]
    pub max_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            interval: Duration::from_secs(30),
            min_interval: Duration::from_secs(3),
            max_interval: Duration::from_secs(90),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_intervals(mut self, interval: Duration, min: Duration, max: Duration) -> Self {
        self.interval = interval;
        self.min_interval = min;
        self.max_interval = max;
        self
    }

    /// `retries_done` retries have already happened.
    pub fn should_retry(&self, retries_done: u32, err: &TransportError) -> bool {
        retries_done < self.max_retries && err.is_transient()
    }

    pub fn delay_for(&self, retry: u32) -> Duration {
        let jitter: f64 = rand::thread_rng().gen_range(0.8..=1.2);
        let factor = 2f64.powi(retry.min(30) as i32) - 1.0;
        let increment = self.interval.as_secs_f64() * factor * jitter;
        let delay = self.min_interval.as_secs_f64() + increment;
        Duration::from_secs_f64(delay.min(self.max_interval.as_secs_f64()))
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Wraps a transport and retries transient failures per [`RetryPolicy`].
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: TableTransport> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    async fn run<R, F, Fut>(&self, op: &'static str, mut call: F) -> TransportResult<R>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = TransportResult<R>> + Send,
        R: Send,
    {
        let mut retries = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if self.policy.should_retry(retries, &err) => {
                    retries += 1;
                    let delay = self.policy.delay_for(retries);
                    warn!(
                        op,
                        retry = retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient transport failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl<T: TableTransport> TableTransport for RetryingTransport<T> {
    async fn query_entity(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> TransportResult<Entity> {
        self.run("query_entity", || {
            self.inner.query_entity(table, partition_key, row_key)
        })
        .await
    }

    async fn query_entities(&self, query: &TableQuery) -> TransportResult<Vec<Entity>> {
        self.run("query_entities", || self.inner.query_entities(query))
            .await
    }

    async fn insert_entity(&self, table: &str, entity: &Entity) -> TransportResult<()> {
        self.run("insert_entity", || self.inner.insert_entity(table, entity))
            .await
    }

    async fn update_entity(&self, table: &str, entity: &Entity) -> TransportResult<()> {
        self.run("update_entity", || self.inner.update_entity(table, entity))
            .await
    }

    async fn delete_entity(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> TransportResult<()> {
        self.run("delete_entity", || {
            self.inner.delete_entity(table, partition_key, row_key)
        })
        .await
    }

    async fn create_table_if_not_exists(&self, table: &str) -> TransportResult<bool> {
        self.run("create_table_if_not_exists", || {
            self.inner.create_table_if_not_exists(table)
        })
        .await
    }

    async fn delete_table(&self, table: &str) -> TransportResult<()> {
        self.run("delete_table", || self.inner.delete_table(table))
            .await
    }
}
