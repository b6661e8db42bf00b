//! # Tabula: ORM adapter for partitioned table stores
//!
//! Tabula lowers an ORM's condition trees into a remote table store's filter
//! syntax and drives reads, writes, deletes and table provisioning against
//! that store one request at a time.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use tabula_core::{
//!     Condition, DataType, InMemoryTableService, InsertOptions, ModelDefinition,
//!     ModelInstance, ModelRegistry, Query, TableAdapter,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> tabula_core::TabulaResult<()> {
//! let registry = Arc::new(ModelRegistry::new());
//! registry.register(ModelDefinition::new("Person").property("name", DataType::String));
//!
//! let adapter = TableAdapter::new(InMemoryTableService::new(), registry);
//! adapter.create_table("Person").await?;
//!
//! let ann = ModelInstance::new("Person").set("name", "ann");
//! let saved = adapter.insert(ann, &InsertOptions::default()).await?;
//! assert!(saved[0].saved);
//!
//! let found = adapter
//!     .load(&Query::new("Person").filter(Condition::like("name", "an%")))
//!     .await?;
//! assert_eq!(found.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module layout
//!
//! - [`query`]: condition trees, values, the query builder
//! - [`filter`]: filter expressions and the condition translator
//! - [`transport`]: the remote store seam, retry, in-memory service
//! - [`model`]: model definitions, registry, instances
//! - [`adapter`]: the CRUD orchestrator ([`TableAdapter`])
//! - [`config`]: connection settings

extern crate self as tabula_core;

pub mod adapter;
pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod query;
pub mod transport;

// Logging utilities
pub mod logging;

// Re-export commonly used types
pub use adapter::{InsertOptions, LoadResult, OneOrMany, TableAdapter};
pub use config::{Credentials, TabulaConfig};
pub use error::{TabulaError, TabulaResult};
pub use filter::{Clause, Connector, FilterExpression, translate, translate_into};
pub use model::{DataType, Model, ModelDefinition, ModelInstance, ModelRegistry, PropertyDef};
pub use query::{Comparison, ComparisonKind, Condition, LogicalKind, Operator, Query, Value};
pub use transport::{
    Entity, InMemoryTableService, RetryPolicy, RetryingTransport, TableQuery, TableTransport,
    TransportError,
};

// Re-export derive macros
pub use tabula_derive::Model;
