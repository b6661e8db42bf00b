//! Reads: point lookup by id, or a filtered partition scan.

use crate::adapter::{LoadResult, TableAdapter};
use crate::error::TabulaResult;
use crate::filter::{FilterExpression, translate};
use crate::model::ModelInstance;
use crate::query::Query;
use crate::transport::{Entity, TableQuery, TableTransport};
use tracing::{debug, instrument, warn};

impl<T: TableTransport> TableAdapter<T> {
    /// Load instances matching `query`.
    ///
    /// A missing entity on a lookup by id is an empty result, not an error.
    #[instrument(skip(self, query), fields(model = %query.model))]
    pub async fn load(&self, query: &Query) -> TabulaResult<LoadResult> {
        let table = query.model.as_str();
        let wants_one = query.wants_one();

        if let Some(id) = &query.by_id {
            debug!(id = %id, "point lookup");
            return match self.transport.query_entity(table, table, id).await {
                Ok(entity) => {
                    let instance = self.materialize(query, entity)?;
                    Ok(LoadResult::from_instances(wants_one, vec![instance]))
                }
                Err(err) if err.is_not_found() => Ok(LoadResult::empty(wants_one)),
                Err(err) => Err(err.into()),
            };
        }

        let scan = self.scan_request(query)?;
        debug!(filter = %scan.filter, top = ?scan.top, "scan");
        let entities = self.transport.query_entities(&scan).await?;
        let instances = entities
            .into_iter()
            .map(|entity| self.materialize(query, entity))
            .collect::<TabulaResult<Vec<_>>>()?;
        Ok(LoadResult::from_instances(wants_one, instances))
    }

    /// Base partition filter, the translated conditions ANDed in, and the
    /// result cap. A single-result query is not capped.
    pub(crate) fn scan_request(&self, query: &Query) -> TabulaResult<TableQuery> {
        let table = query.model.as_str();
        let mut filter = FilterExpression::partition(table);
        let translated = translate(&query.conditions)?;
        if !translated.skipped().is_empty() {
            warn!(
                fields = ?translated.skipped(),
                "comparisons without a usable value were dropped from the filter"
            );
        }
        filter.and_expression(translated);

        let mut scan = TableQuery::new(table, filter);
        if let Some(limit) = query.opts.limit.filter(|&l| l != 1) {
            scan = scan.top(limit);
        }
        Ok(scan)
    }

    fn materialize(&self, query: &Query, entity: Entity) -> TabulaResult<ModelInstance> {
        self.registry
            .materialize(&query.model, entity, query.opts.scenario.as_deref())
    }
}
