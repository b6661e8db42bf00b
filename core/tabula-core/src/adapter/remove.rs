//! Deletes by id, by id list, or by query.

use crate::adapter::TableAdapter;
use crate::error::TabulaResult;
use crate::query::{Query, Value};
use crate::transport::TableTransport;
use tracing::{debug, instrument};

impl<T: TableTransport> TableAdapter<T> {
    /// Delete every entity `query` addresses.
    ///
    /// Ids come from `by_id`, else from a raw `id` list, else from loading
    /// the query. Deletes run one at a time; the first failure is returned.
    #[instrument(skip(self, query), fields(model = %query.model))]
    pub async fn remove(&self, query: &Query) -> TabulaResult<bool> {
        let table = query.model.as_str();
        let ids = self.ids_to_remove(query).await?;
        debug!(count = ids.len(), "delete");
        for id in &ids {
            debug!(id = %id, "delete entity");
            self.transport.delete_entity(table, table, id).await?;
        }
        Ok(true)
    }

    async fn ids_to_remove(&self, query: &Query) -> TabulaResult<Vec<String>> {
        if let Some(id) = &query.by_id {
            return Ok(vec![id.clone()]);
        }
        if let Some(Value::List(items)) = query.raw_conditions.get("id") {
            return Ok(items.iter().map(id_text).collect());
        }
        let loaded = self.load(query).await?;
        Ok(loaded.into_vec().into_iter().filter_map(|i| i.id).collect())
    }
}

fn id_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_literal(),
    }
}
