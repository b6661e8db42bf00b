//! In-memory table service using BTreeMap
//!
//! Behaves like the remote store at the [`TableTransport`] boundary:
//! per-item requests, (partition, row) ordering, 404/409 failures. Used by
//! the tests and as a local stand-in for the remote store.

use crate::transport::{Entity, TableQuery, TableTransport, TransportError, TransportResult};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

type Rows = BTreeMap<(String, String), Entity>;

/// In-memory table store
pub struct InMemoryTableService {
    tables: RwLock<HashMap<String, Rows>>,
}

impl InMemoryTableService {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
        }
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.tables.read().contains_key(table)
    }

    /// Direct read, bypassing the transport interface.
    pub fn get(&self, table: &str, partition_key: &str, row_key: &str) -> Option<Entity> {
        self.tables
            .read()
            .get(table)?
            .get(&(partition_key.to_string(), row_key.to_string()))
            .cloned()
    }

    /// Number of entities in a table, 0 if it does not exist.
    pub fn count(&self, table: &str) -> usize {
        self.tables.read().get(table).map(|t| t.len()).unwrap_or(0)
    }
}

impl Default for InMemoryTableService {
    fn default() -> Self {
        Self::new()
    }
}

fn table_missing(table: &str) -> TransportError {
    TransportError::not_found(format!("table '{table}' does not exist")).with_code("TableNotFound")
}

fn key_of(entity: &Entity) -> (String, String) {
    (entity.partition_key.clone(), entity.row_key.clone())
}

#[async_trait]
impl TableTransport for InMemoryTableService {
    async fn query_entity(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> TransportResult<Entity> {
        let tables = self.tables.read();
        let rows = tables.get(table).ok_or_else(|| table_missing(table))?;
        rows.get(&(partition_key.to_string(), row_key.to_string()))
            .cloned()
            .ok_or_else(|| TransportError::not_found(format!("entity '{row_key}' not found")))
    }

    async fn query_entities(&self, query: &TableQuery) -> TransportResult<Vec<Entity>> {
        let tables = self.tables.read();
        let rows = tables
            .get(&query.table)
            .ok_or_else(|| table_missing(&query.table))?;
        let matching = rows.values().filter(|e| query.filter.matches(e)).cloned();
        let entities: Vec<Entity> = match query.top {
            Some(top) => matching.take(top).collect(),
            None => matching.collect(),
        };
        debug!(table = %query.table, filter = %query.filter, found = entities.len(), "scan");
        Ok(entities)
    }

    async fn insert_entity(&self, table: &str, entity: &Entity) -> TransportResult<()> {
        let mut tables = self.tables.write();
        let rows = tables.get_mut(table).ok_or_else(|| table_missing(table))?;
        let key = key_of(entity);
        if rows.contains_key(&key) {
            return Err(TransportError::conflict(format!(
                "entity '{}' already exists",
                entity.row_key
            )));
        }
        rows.insert(key, entity.clone());
        Ok(())
    }

    async fn update_entity(&self, table: &str, entity: &Entity) -> TransportResult<()> {
        let mut tables = self.tables.write();
        let rows = tables.get_mut(table).ok_or_else(|| table_missing(table))?;
        match rows.get_mut(&key_of(entity)) {
            Some(existing) => {
                *existing = entity.clone();
                Ok(())
            }
            None => Err(TransportError::not_found(format!(
                "entity '{}' not found",
                entity.row_key
            ))),
        }
    }

    async fn delete_entity(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> TransportResult<()> {
        let mut tables = self.tables.write();
        let rows = tables.get_mut(table).ok_or_else(|| table_missing(table))?;
        rows.remove(&(partition_key.to_string(), row_key.to_string()))
            .map(|_| ())
            .ok_or_else(|| TransportError::not_found(format!("entity '{row_key}' not found")))
    }

    async fn create_table_if_not_exists(&self, table: &str) -> TransportResult<bool> {
        let mut tables = self.tables.write();
        if tables.contains_key(table) {
            return Ok(false);
        }
        tables.insert(table.to_string(), Rows::new());
        Ok(true)
    }

    async fn delete_table(&self, table: &str) -> TransportResult<()> {
        self.tables
            .write()
            .remove(table)
            .map(|_| ())
            .ok_or_else(|| table_missing(table))
    }
}
