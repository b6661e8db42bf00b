//! Shared fixtures: a recording transport over the in-memory service.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tabula_core::{
    DataType, Entity, InMemoryTableService, ModelDefinition, ModelRegistry, TableAdapter,
    TableQuery, TableTransport, TransportError,
};
use tabula_core::transport::TransportResult;

/// Records every call as `op:target` and fails the ones scripted with
/// [`RecordingTransport::fail`].
#[derive(Default)]
pub struct RecordingTransport {
    pub inner: InMemoryTableService,
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, TransportError>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the call recorded as `call` (e.g. `insert:b`).
    pub fn fail(&self, call: &str, err: TransportError) {
        self.failures.lock().insert(call.to_string(), err);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn calls_of(&self, op: &str) -> Vec<String> {
        let prefix = format!("{op}:");
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with(&prefix))
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    fn record(&self, call: String) -> TransportResult<()> {
        self.calls.lock().push(call.clone());
        match self.failures.lock().get(&call) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TableTransport for RecordingTransport {
    async fn query_entity(&self, table: &str, pk: &str, rk: &str) -> TransportResult<Entity> {
        self.record(format!("get:{rk}"))?;
        self.inner.query_entity(table, pk, rk).await
    }

    async fn query_entities(&self, query: &TableQuery) -> TransportResult<Vec<Entity>> {
        self.record(format!("scan:{}", query.filter))?;
        self.inner.query_entities(query).await
    }

    async fn insert_entity(&self, table: &str, entity: &Entity) -> TransportResult<()> {
        self.record(format!("insert:{}", entity.row_key))?;
        self.inner.insert_entity(table, entity).await
    }

    async fn update_entity(&self, table: &str, entity: &Entity) -> TransportResult<()> {
        self.record(format!("update:{}", entity.row_key))?;
        self.inner.update_entity(table, entity).await
    }

    async fn delete_entity(&self, table: &str, pk: &str, rk: &str) -> TransportResult<()> {
        self.record(format!("delete:{rk}"))?;
        self.inner.delete_entity(table, pk, rk).await
    }

    async fn create_table_if_not_exists(&self, table: &str) -> TransportResult<bool> {
        self.record(format!("create:{table}"))?;
        self.inner.create_table_if_not_exists(table).await
    }

    async fn delete_table(&self, table: &str) -> TransportResult<()> {
        self.record(format!("drop:{table}"))?;
        self.inner.delete_table(table).await
    }
}

pub fn registry() -> Arc<ModelRegistry> {
    let registry = ModelRegistry::new();
    registry.register(
        ModelDefinition::new("Zooby")
            .property("foo", DataType::String)
            .property("count", DataType::Int)
            .property("createdAt", DataType::Datetime),
    );
    Arc::new(registry)
}

/// Adapter over a recording transport, `Zooby` table already created.
pub async fn adapter() -> TableAdapter<Arc<RecordingTransport>> {
    tabula_core::logging::init_test();
    let transport = Arc::new(RecordingTransport::new());
    transport
        .inner
        .create_table_if_not_exists("Zooby")
        .await
        .expect("create table");
    TableAdapter::new(transport, registry())
}
