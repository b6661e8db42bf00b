//! Table provisioning.

use crate::adapter::{OneOrMany, TableAdapter};
use crate::error::TabulaResult;
use crate::transport::TableTransport;
use tracing::{info, instrument};

impl<T: TableTransport> TableAdapter<T> {
    /// Create each table unless it already exists, in order.
    #[instrument(skip_all)]
    pub async fn create_table(&self, names: impl Into<OneOrMany<String>>) -> TabulaResult<bool> {
        for name in names.into().into_vec() {
            let created = self.transport.create_table_if_not_exists(&name).await?;
            info!(table = %name, created, "create table");
        }
        Ok(true)
    }

    /// Drop each table, in order. A table that does not exist counts as
    /// dropped.
    #[instrument(skip_all)]
    pub async fn drop_table(&self, names: impl Into<OneOrMany<String>>) -> TabulaResult<bool> {
        for name in names.into().into_vec() {
            match self.transport.delete_table(&name).await {
                Ok(()) => info!(table = %name, "drop table"),
                Err(err) if err.is_not_found() => info!(table = %name, "drop table: already gone"),
                Err(err) => return Err(err.into()),
            }
        }
        Ok(true)
    }
}
