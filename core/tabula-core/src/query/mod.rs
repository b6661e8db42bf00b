//! Query builder, fluent style
//!
//! A [`Query`] is what the ORM hands the adapter for reads, updates and
//! deletes: the model kind, an optional direct key, a condition tree, raw
//! pass-through conditions and call options.

pub mod condition;
pub mod value;

pub use condition::{Comparison, ComparisonKind, Condition, LogicalKind, Operator};
pub use value::{Value, format_timestamp, parse_timestamp};

use crate::model::Model;
use std::collections::BTreeMap;

/// Per-call options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    /// Maximum result count; `Some(1)` asks for a single instance.
    pub limit: Option<usize>,
    /// Validation scenario forwarded to created instances
    pub scenario: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Model kind, which is also the table name.
    pub model: String,
    pub by_id: Option<String>,
    pub conditions: Condition,
    pub raw_conditions: BTreeMap<String, Value>,
    pub opts: QueryOptions,
}

impl Query {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            by_id: None,
            conditions: Condition::empty(),
            raw_conditions: BTreeMap::new(),
            opts: QueryOptions::default(),
        }
    }

    pub fn for_model<M: Model>() -> Self {
        Self::new(M::MODEL_NAME)
    }

    /// Direct primary-key lookup
    pub fn by_id(mut self, id: impl Into<String>) -> Self {
        self.by_id = Some(id.into());
        self
    }

    pub fn filter(mut self, conditions: Condition) -> Self {
        self.conditions = conditions;
        self
    }

    /// Raw condition as the ORM received it, e.g. `id: [a, b, c]`.
    pub fn raw(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.raw_conditions.insert(field.into(), value.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.opts.limit = Some(limit);
        self
    }

    pub fn scenario(mut self, scenario: impl Into<String>) -> Self {
        self.opts.scenario = Some(scenario.into());
        self
    }

    /// True when the caller asked for exactly one result.
    pub fn wants_one(&self) -> bool {
        self.opts.limit == Some(1)
    }
}
