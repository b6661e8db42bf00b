//! Condition trees: the ORM's abstract filter over a model's fields.

use crate::error::{TabulaError, TabulaResult};
use crate::query::Value;
use std::fmt;
use std::str::FromStr;

/// Logical connective of a [`Condition::Logical`] node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalKind {
    And,
    Or,
    Not,
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl Operator {
    /// Keyword in the store's filter syntax.
    pub fn keyword(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Ge => "ge",
            Operator::Le => "le",
        }
    }
}

impl FromStr for Operator {
    type Err = TabulaError;

    /// Parses the ORM's SQL comparator strings.
    fn from_str(s: &str) -> TabulaResult<Self> {
        match s {
            "=" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            ">" => Ok(Operator::Gt),
            "<" => Ok(Operator::Lt),
            ">=" => Ok(Operator::Ge),
            "<=" => Ok(Operator::Le),
            _ => Err(TabulaError::InvalidArguments(format!(
                "unknown comparison operator '{s}'"
            ))),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Sub-kind of a comparison leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonKind {
    Plain,
    /// `%` wildcard pattern match
    Like,
    /// Set membership; the value must be a [`Value::List`]
    In,
}

/// A comparison leaf. `value == None` means the ORM left it undefined.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub field: String,
    pub op: Operator,
    pub value: Option<Value>,
    pub kind: ComparisonKind,
}

impl Comparison {
    pub fn new(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: Some(value.into()),
            kind: ComparisonKind::Plain,
        }
    }

    pub fn undefined(field: impl Into<String>, op: Operator) -> Self {
        Self {
            field: field.into(),
            op,
            value: None,
            kind: ComparisonKind::Plain,
        }
    }
}

/// Condition tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Logical {
        kind: LogicalKind,
        children: Vec<Condition>,
    },
    Comparison(Comparison),
}

impl Default for Condition {
    fn default() -> Self {
        Condition::empty()
    }
}

impl Condition {
    /// The empty tree: matches everything.
    pub fn empty() -> Self {
        Condition::Logical {
            kind: LogicalKind::And,
            children: Vec::new(),
        }
    }

    pub fn and(children: Vec<Condition>) -> Self {
        Condition::Logical {
            kind: LogicalKind::And,
            children,
        }
    }

    pub fn or(children: Vec<Condition>) -> Self {
        Condition::Logical {
            kind: LogicalKind::Or,
            children,
        }
    }

    pub fn not(children: Vec<Condition>) -> Self {
        Condition::Logical {
            kind: LogicalKind::Not,
            children,
        }
    }

    pub fn compare(field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        Condition::Comparison(Comparison::new(field, op, value))
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Ne, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Gt, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Lt, value)
    }

    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Ge, value)
    }

    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, Operator::Le, value)
    }

    pub fn like(field: impl Into<String>, pattern: impl Into<Value>) -> Self {
        Condition::Comparison(Comparison {
            kind: ComparisonKind::Like,
            ..Comparison::new(field, Operator::Eq, pattern)
        })
    }

    pub fn is_in(field: impl Into<String>, values: impl Into<Value>) -> Self {
        Condition::Comparison(Comparison {
            kind: ComparisonKind::In,
            ..Comparison::new(field, Operator::Eq, values)
        })
    }

    /// A comparison whose value the ORM left undefined.
    pub fn undefined(field: impl Into<String>, op: Operator) -> Self {
        Condition::Comparison(Comparison::undefined(field, op))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Condition::Logical { children, .. } if children.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_parses_sql_comparators() {
        assert_eq!("=".parse::<Operator>().unwrap(), Operator::Eq);
        assert_eq!("!=".parse::<Operator>().unwrap(), Operator::Ne);
        assert_eq!(">=".parse::<Operator>().unwrap(), Operator::Ge);
        assert_eq!("<=".parse::<Operator>().unwrap(), Operator::Le);
        assert!("LIKE".parse::<Operator>().is_err());
    }

    #[test]
    fn keywords() {
        assert_eq!(Operator::Gt.keyword(), "gt");
        assert_eq!(Operator::Lt.to_string(), "lt");
    }

    #[test]
    fn empty_tree() {
        assert!(Condition::default().is_empty());
        assert!(Condition::or(vec![]).is_empty());
        assert!(!Condition::and(vec![Condition::eq("a", 1)]).is_empty());
        assert!(!Condition::eq("a", 1).is_empty());
    }

    #[test]
    fn like_and_in_carry_kind() {
        match Condition::like("name", "%ann%") {
            Condition::Comparison(c) => assert_eq!(c.kind, ComparisonKind::Like),
            _ => panic!("Expected Comparison"),
        }
        match Condition::is_in("x", vec![1, 2]) {
            Condition::Comparison(c) => {
                assert_eq!(c.kind, ComparisonKind::In);
                assert_eq!(c.value, Some(Value::List(vec![Value::Int(1), Value::Int(2)])));
            }
            _ => panic!("Expected Comparison"),
        }
    }
}
