//! Filter expressions in the store's restricted boolean-clause syntax.
//!
//! A [`FilterExpression`] is an ordered list of clause fragments, each joined
//! to the previous one by a [`Connector`]. It renders to the textual filter
//! the remote store accepts and can evaluate itself against an [`Entity`]
//! (the in-memory table service uses this). As in the store's grammar, `and`
//! binds tighter than `or`.

pub mod translator;

pub use translator::{translate, translate_into};

use crate::query::{Operator, Value};
use crate::transport::Entity;
use std::cmp::Ordering;
use std::fmt;

/// Implicit partition column.
pub const PARTITION_KEY: &str = "PartitionKey";
/// Implicit row column.
pub const ROW_KEY: &str = "RowKey";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    pub fn keyword(&self) -> &'static str {
        match self {
            Connector::And => "and",
            Connector::Or => "or",
        }
    }
}

/// A single clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    Compare {
        field: String,
        op: Operator,
        value: Value,
    },
    Contains {
        field: String,
        value: String,
    },
    StartsWith {
        field: String,
        value: String,
    },
    EndsWith {
        field: String,
        value: String,
    },
    /// Parenthesised OR-group. Empty groups match nothing.
    Group(Vec<Clause>),
    /// Parenthesised sub-expression
    Nested(FilterExpression),
}

impl Clause {
    fn render(&self, out: &mut String) {
        match self {
            Clause::Compare { field, op, value } => {
                out.push_str(&format!("{field} {op} {}", value.to_literal()));
            }
            Clause::Contains { field, value } => {
                out.push_str(&format!("contains({field}, {})", quote(value)));
            }
            Clause::StartsWith { field, value } => {
                out.push_str(&format!("startswith({field}, {})", quote(value)));
            }
            Clause::EndsWith { field, value } => {
                out.push_str(&format!("endswith({field}, {})", quote(value)));
            }
            Clause::Group(clauses) if clauses.is_empty() => out.push_str("(false)"),
            Clause::Group(clauses) => {
                out.push('(');
                for (i, clause) in clauses.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" or ");
                    }
                    clause.render(out);
                }
                out.push(')');
            }
            Clause::Nested(inner) => {
                out.push('(');
                inner.render(out);
                out.push(')');
            }
        }
    }

    fn matches(&self, entity: &Entity) -> bool {
        match self {
            Clause::Compare { field, op, value } => {
                let Some(actual) = entity.field(field) else {
                    return false;
                };
                match actual.compare(value) {
                    Some(ord) => op_holds(*op, ord),
                    None => *op == Operator::Ne,
                }
            }
            Clause::Contains { field, value } => {
                string_field(entity, field).is_some_and(|s| s.contains(value.as_str()))
            }
            Clause::StartsWith { field, value } => {
                string_field(entity, field).is_some_and(|s| s.starts_with(value.as_str()))
            }
            Clause::EndsWith { field, value } => {
                string_field(entity, field).is_some_and(|s| s.ends_with(value.as_str()))
            }
            Clause::Group(clauses) => clauses.iter().any(|c| c.matches(entity)),
            Clause::Nested(inner) => inner.matches(entity),
        }
    }

    fn leaf_count(&self) -> usize {
        match self {
            Clause::Nested(inner) => inner.clause_count(),
            _ => 1,
        }
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn string_field(entity: &Entity, field: &str) -> Option<String> {
    match entity.field(field)? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

fn op_holds(op: Operator, ord: Ordering) -> bool {
    match op {
        Operator::Eq => ord == Ordering::Equal,
        Operator::Ne => ord != Ordering::Equal,
        Operator::Gt => ord == Ordering::Greater,
        Operator::Lt => ord == Ordering::Less,
        Operator::Ge => ord != Ordering::Less,
        Operator::Le => ord != Ordering::Greater,
    }
}

/// Accumulated filter. Built fresh per read call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterExpression {
    fragments: Vec<(Connector, Clause)>,
    skipped: Vec<String>,
}

impl FilterExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base filter restricting a scan to one partition.
    pub fn partition(table: &str) -> Self {
        let mut expr = Self::new();
        expr.and(Clause::Compare {
            field: PARTITION_KEY.to_string(),
            op: Operator::Eq,
            value: Value::from(table),
        });
        expr
    }

    pub fn push(&mut self, connector: Connector, clause: Clause) {
        self.fragments.push((connector, clause));
    }

    pub fn and(&mut self, clause: Clause) {
        self.push(Connector::And, clause);
    }

    pub fn or(&mut self, clause: Clause) {
        self.push(Connector::Or, clause);
    }

    /// AND another expression into this one, parenthesised when it contains
    /// an `or` that would otherwise bind across the boundary.
    pub fn and_expression(&mut self, other: FilterExpression) {
        let FilterExpression { fragments, skipped } = other;
        self.skipped.extend(skipped);
        if fragments.is_empty() {
            return;
        }
        let has_or = fragments.iter().skip(1).any(|(c, _)| *c == Connector::Or);
        if has_or && !self.fragments.is_empty() {
            self.and(Clause::Nested(FilterExpression {
                fragments,
                skipped: Vec::new(),
            }));
        } else {
            let mut iter = fragments.into_iter();
            if let Some((_, first)) = iter.next() {
                self.and(first);
            }
            self.fragments.extend(iter);
        }
    }

    /// Record a comparison that contributed no clause.
    pub(crate) fn skip(&mut self, field: impl Into<String>) {
        self.skipped.push(field.into());
    }

    pub fn fragments(&self) -> &[(Connector, Clause)] {
        &self.fragments
    }

    /// Fields whose comparisons were skipped (undefined value, non-list
    /// set membership).
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Number of comparison clauses, counting an OR-group as one and looking
    /// through nested sub-expressions.
    pub fn clause_count(&self) -> usize {
        self.fragments.iter().map(|(_, c)| c.leaf_count()).sum()
    }

    pub fn to_filter_string(&self) -> String {
        let mut out = String::new();
        self.render(&mut out);
        out
    }

    fn render(&self, out: &mut String) {
        for (i, (connector, clause)) in self.fragments.iter().enumerate() {
            if i > 0 {
                out.push(' ');
                out.push_str(connector.keyword());
                out.push(' ');
            }
            clause.render(out);
        }
    }

    /// Evaluate against an entity. The empty expression matches everything.
    pub fn matches(&self, entity: &Entity) -> bool {
        let mut iter = self.fragments.iter();
        let Some((_, first)) = iter.next() else {
            return true;
        };
        let mut any = false;
        let mut term = first.matches(entity);
        for (connector, clause) in iter {
            match connector {
                Connector::And => term = term && clause.matches(entity),
                Connector::Or => {
                    any = any || term;
                    term = clause.matches(entity);
                }
            }
        }
        any || term
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_filter_string())
    }
}
