//! CRUD orchestration over a [`TableTransport`].
//!
//! Every multi-step operation is a loop that awaits each remote call before
//! issuing the next one. The first failure aborts the loop and is returned;
//! steps already completed stay completed.

mod load;
mod remove;
mod tables;
mod write;

use crate::config::{Credentials, TabulaConfig};
use crate::error::TabulaResult;
use crate::model::{ModelInstance, ModelRegistry};
use crate::transport::{RetryingTransport, TableTransport};
use std::sync::Arc;
use tracing::{info, instrument};

/// One item or a list, for operations that accept either.
#[derive(Debug, Clone, PartialEq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

impl<T> From<T> for OneOrMany<T> {
    fn from(item: T) -> Self {
        OneOrMany::One(item)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(items: Vec<T>) -> Self {
        OneOrMany::Many(items)
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(name: &str) -> Self {
        OneOrMany::One(name.to_string())
    }
}

impl From<Vec<&str>> for OneOrMany<String> {
    fn from(names: Vec<&str>) -> Self {
        OneOrMany::Many(names.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for OneOrMany<String> {
    fn from(names: [&str; N]) -> Self {
        OneOrMany::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Result of [`TableAdapter::load`]: a single optional instance when the
/// query asked for one, otherwise a list.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadResult {
    One(Option<ModelInstance>),
    Many(Vec<ModelInstance>),
}

impl LoadResult {
    pub(crate) fn empty(wants_one: bool) -> Self {
        if wants_one {
            LoadResult::One(None)
        } else {
            LoadResult::Many(Vec::new())
        }
    }

    pub(crate) fn from_instances(wants_one: bool, instances: Vec<ModelInstance>) -> Self {
        if wants_one {
            LoadResult::One(instances.into_iter().next())
        } else {
            LoadResult::Many(instances)
        }
    }

    pub fn into_vec(self) -> Vec<ModelInstance> {
        match self {
            LoadResult::One(item) => item.into_iter().collect(),
            LoadResult::Many(items) => items,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            LoadResult::One(item) => usize::from(item.is_some()),
            LoadResult::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Options for [`TableAdapter::insert`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertOptions {
    /// Scenario stamped on the returned instances
    pub scenario: Option<String>,
}

/// The CRUD orchestrator.
///
/// Holds no per-call state; one adapter can serve independent operations
/// concurrently through a shared transport.
pub struct TableAdapter<T> {
    transport: T,
    registry: Arc<ModelRegistry>,
}

impl<T: TableTransport> TableAdapter<T> {
    pub fn new(transport: T, registry: Arc<ModelRegistry>) -> Self {
        Self {
            transport,
            registry,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }
}

impl<T: TableTransport> TableAdapter<RetryingTransport<T>> {
    /// Resolve credentials, build the concrete transport through `factory`,
    /// and wrap it with the configured retry policy.
    ///
    /// `factory` receives the credentials and the optional endpoint override.
    #[instrument(skip_all)]
    pub fn connect<F>(
        config: &TabulaConfig,
        registry: Arc<ModelRegistry>,
        factory: F,
    ) -> TabulaResult<Self>
    where
        F: FnOnce(&Credentials, Option<&str>) -> TabulaResult<T>,
    {
        let credentials = config.resolve_credentials()?;
        info!(
            "Connecting to table storage account {} (max {} retries)",
            credentials.account, config.retry.max_retries
        );
        let inner = factory(&credentials, config.endpoint.as_deref())?;
        Ok(Self::new(
            RetryingTransport::new(inner, config.retry.clone()),
            registry,
        ))
    }
}
