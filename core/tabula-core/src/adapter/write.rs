//! Inserts and single-entity updates.

use crate::adapter::{InsertOptions, OneOrMany, TableAdapter};
use crate::error::{TabulaError, TabulaResult};
use crate::model::ModelInstance;
use crate::query::Query;
use crate::transport::TableTransport;
use tracing::{debug, instrument};
use uuid::Uuid;

impl<T: TableTransport> TableAdapter<T> {
    /// Insert one or many instances into the first instance's table.
    ///
    /// Instances without an id get a fresh UUID, written back before the
    /// insert is issued. Inserts run one at a time in input order; the first
    /// failure is returned and later instances are never submitted.
    #[instrument(skip_all)]
    pub async fn insert(
        &self,
        data: impl Into<OneOrMany<ModelInstance>>,
        opts: &InsertOptions,
    ) -> TabulaResult<Vec<ModelInstance>> {
        let mut items = data.into().into_vec();
        let Some(table) = items.first().map(|i| i.kind.clone()) else {
            return Ok(items);
        };

        for item in items.iter_mut() {
            let id = item
                .id
                .get_or_insert_with(|| Uuid::new_v4().to_string())
                .clone();
            let entity = item.to_entity(&table, &id);
            debug!(table = %table, id = %id, "insert");
            self.transport.insert_entity(&table, &entity).await?;
            item.saved = true;
            if opts.scenario.is_some() {
                item.scenario = opts.scenario.clone();
            }
        }
        Ok(items)
    }

    /// Replace the entity addressed by `query.by_id` with `data`.
    ///
    /// Updates by condition are not supported and make no remote call.
    #[instrument(skip(self, data, query), fields(model = %query.model))]
    pub async fn update(&self, mut data: ModelInstance, query: &Query) -> TabulaResult<ModelInstance> {
        let Some(id) = &query.by_id else {
            return Err(TabulaError::unsupported(
                "bulk update",
                "load the matching instances and update each one by id",
            ));
        };
        let table = query.model.as_str();
        let entity = data.to_entity(table, id);
        debug!(id = %id, "update");
        self.transport.update_entity(table, &entity).await?;
        data.id = Some(id.clone());
        data.saved = true;
        Ok(data)
    }
}
