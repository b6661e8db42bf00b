//! Transport module: the seam to the remote table store.
//!
//! The orchestrator depends only on [`TableTransport`], never on a concrete
//! client. Every call is one remote request; the transport decides nothing
//! about batching. Retry lives in [`retry::RetryingTransport`], which wraps
//! any other transport.
//!
//! # Contract
//!
//! - `query_entity`: errors with status 404 when the entity is missing.
//! - `query_entities`: entities in store order, at most `top` of them.
//! - `insert_entity`: errors with status 409 when the key already exists.
//! - `update_entity` / `delete_entity`: error with status 404 when missing.
//! - `create_table_if_not_exists`: `true` if the table was created.
//! - `delete_table`: errors with status 404 when the table is missing.

pub mod memory;
pub mod retry;

pub use memory::InMemoryTableService;
pub use retry::{RetryPolicy, RetryingTransport};

use crate::filter::{FilterExpression, PARTITION_KEY, ROW_KEY};
use crate::query::Value;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// A record as stored remotely.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub partition_key: String,
    pub row_key: String,
    pub properties: BTreeMap<String, Value>,
}

impl Entity {
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            properties: BTreeMap::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Column lookup including the two key columns.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            PARTITION_KEY => Some(Value::String(self.partition_key.clone())),
            ROW_KEY => Some(Value::String(self.row_key.clone())),
            _ => self.properties.get(name).cloned(),
        }
    }
}

/// Remote failure as reported by the store or the network client.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{message}")]
pub struct TransportError {
    /// HTTP status, `None` when the request never got a response
    pub status: Option<u16>,
    /// Store error code, e.g. `ResourceNotFound`
    pub code: Option<String>,
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(message)
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_status(404, message).with_code("ResourceNotFound")
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::with_status(409, message).with_code("EntityAlreadyExists")
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    /// Network failures, timeouts, throttling and server errors.
    pub fn is_transient(&self) -> bool {
        match self.status {
            None => true,
            Some(status) => status == 408 || status == 429 || status >= 500,
        }
    }
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Scan request: one table, a filter, an optional result cap.
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    pub table: String,
    pub filter: FilterExpression,
    pub top: Option<usize>,
}

impl TableQuery {
    pub fn new(table: impl Into<String>, filter: FilterExpression) -> Self {
        Self {
            table: table.into(),
            filter,
            top: None,
        }
    }

    pub fn top(mut self, top: usize) -> Self {
        self.top = Some(top);
        self
    }
}

/// Remote table store interface.
#[async_trait]
pub trait TableTransport: Send + Sync {
    /// Point lookup by (partition, row).
    async fn query_entity(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> TransportResult<Entity>;

    /// Filtered scan.
    async fn query_entities(&self, query: &TableQuery) -> TransportResult<Vec<Entity>>;

    async fn insert_entity(&self, table: &str, entity: &Entity) -> TransportResult<()>;

    async fn update_entity(&self, table: &str, entity: &Entity) -> TransportResult<()>;

    async fn delete_entity(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> TransportResult<()>;

    async fn create_table_if_not_exists(&self, table: &str) -> TransportResult<bool>;

    async fn delete_table(&self, table: &str) -> TransportResult<()>;
}

#[async_trait]
impl<T: TableTransport + ?Sized> TableTransport for Arc<T> {
    async fn query_entity(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> TransportResult<Entity> {
        (**self).query_entity(table, partition_key, row_key).await
    }

    async fn query_entities(&self, query: &TableQuery) -> TransportResult<Vec<Entity>> {
        (**self).query_entities(query).await
    }

    async fn insert_entity(&self, table: &str, entity: &Entity) -> TransportResult<()> {
        (**self).insert_entity(table, entity).await
    }

    async fn update_entity(&self, table: &str, entity: &Entity) -> TransportResult<()> {
        (**self).update_entity(table, entity).await
    }

    async fn delete_entity(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> TransportResult<()> {
        (**self).delete_entity(table, partition_key, row_key).await
    }

    async fn create_table_if_not_exists(&self, table: &str) -> TransportResult<bool> {
        (**self).create_table_if_not_exists(table).await
    }

    async fn delete_table(&self, table: &str) -> TransportResult<()> {
        (**self).delete_table(table).await
    }
}
