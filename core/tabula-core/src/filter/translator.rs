//! Condition tree → filter expression.
//!
//! Logical AND/OR nodes recurse into their children in order, joining each
//! child's clause with the node's connector. Children with the same connector
//! as their parent are flattened into the accumulator; a child node with a
//! different connector and more than one child is kept as a parenthesised
//! sub-expression so that `and`-over-`or` precedence cannot change its meaning.
//! A single-child node contributes its child under the parent's connector.
//! NOT nodes are rejected anywhere in the tree.

use crate::error::{TabulaError, TabulaResult};
use crate::filter::{Clause, Connector, FilterExpression, ROW_KEY};
use crate::query::{Comparison, ComparisonKind, Condition, LogicalKind, Operator, Value};

const WILDCARD: char = '%';

/// Translate a condition tree into a fresh expression.
pub fn translate(conditions: &Condition) -> TabulaResult<FilterExpression> {
    let mut expr = FilterExpression::new();
    translate_into(&mut expr, conditions)?;
    Ok(expr)
}

/// Translate a condition tree and AND it onto `expr`. A translated `or` is
/// parenthesised when `expr` already holds clauses.
///
/// On error `expr` is left untouched.
pub fn translate_into(expr: &mut FilterExpression, conditions: &Condition) -> TabulaResult<()> {
    let root = match conditions {
        Condition::Logical {
            kind: LogicalKind::Or,
            ..
        } => Connector::Or,
        _ => Connector::And,
    };
    let mut scratch = FilterExpression::new();
    emit(&mut scratch, conditions, root)?;
    expr.and_expression(scratch);
    Ok(())
}

fn emit(expr: &mut FilterExpression, node: &Condition, connector: Connector) -> TabulaResult<()> {
    match node {
        Condition::Logical {
            kind: LogicalKind::Not,
            ..
        } => Err(TabulaError::unsupported(
            "NOT filter",
            "express the negation with ne/lt/gt comparisons",
        )),
        Condition::Logical { kind, children } => {
            let own = match kind {
                LogicalKind::Or => Connector::Or,
                _ => Connector::And,
            };
            if own != connector && children.len() > 1 {
                let mut inner = FilterExpression::new();
                for child in children {
                    emit(&mut inner, child, own)?;
                }
                push_nested(expr, connector, inner);
            } else {
                for child in children {
                    emit(expr, child, connector)?;
                }
            }
            Ok(())
        }
        Condition::Comparison(comparison) => {
            emit_comparison(expr, comparison, connector);
            Ok(())
        }
    }
}

fn push_nested(expr: &mut FilterExpression, connector: Connector, inner: FilterExpression) {
    let FilterExpression { fragments, skipped } = inner;
    for field in skipped {
        expr.skip(field);
    }
    match fragments.len() {
        0 => {}
        1 => {
            if let Some((_, clause)) = fragments.into_iter().next() {
                expr.push(connector, clause);
            }
        }
        _ => expr.push(
            connector,
            Clause::Nested(FilterExpression {
                fragments,
                skipped: Vec::new(),
            }),
        ),
    }
}

/// The logical primary key lives in the row column.
fn store_field(field: &str) -> String {
    if field == "id" {
        ROW_KEY.to_string()
    } else {
        field.to_string()
    }
}

fn emit_comparison(expr: &mut FilterExpression, comparison: &Comparison, connector: Connector) {
    let field = store_field(&comparison.field);
    let Some(value) = comparison.value.clone() else {
        expr.skip(field);
        return;
    };
    let value = value.into_wire();

    match comparison.kind {
        ComparisonKind::Like => expr.push(connector, like_clause(field, value)),
        ComparisonKind::In => {
            let Value::List(items) = value else {
                expr.skip(field);
                return;
            };
            let group = items
                .into_iter()
                .map(|item| Clause::Compare {
                    field: field.clone(),
                    op: Operator::Eq,
                    value: item,
                })
                .collect();
            expr.push(connector, Clause::Group(group));
        }
        ComparisonKind::Plain => expr.push(
            connector,
            Clause::Compare {
                field,
                op: comparison.op,
                value,
            },
        ),
    }
}

/// `%x%` → contains, `x%` → starts with, `%x` → ends with, else equality.
fn like_clause(field: String, value: Value) -> Clause {
    let Value::String(pattern) = value else {
        return Clause::Compare {
            field,
            op: Operator::Eq,
            value,
        };
    };

    // A lone `%` counts as both markers.
    let leading = pattern.starts_with(WILDCARD);
    let trailing = pattern.ends_with(WILDCARD);
    let start = usize::from(leading);
    let end = if trailing { pattern.len() - 1 } else { pattern.len() };
    let core = pattern.get(start..end.max(start)).unwrap_or_default().to_string();

    match (leading, trailing) {
        (true, true) => Clause::Contains { field, value: core },
        (true, false) => Clause::EndsWith { field, value: core },
        (false, true) => Clause::StartsWith { field, value: core },
        (false, false) => Clause::Compare {
            field,
            op: Operator::Eq,
            value: Value::String(core),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Entity;
    use chrono::{TimeZone, Utc};

    fn render(cond: Condition) -> String {
        translate(&cond).unwrap().to_filter_string()
    }

    #[test]
    fn empty_tree_is_noop() {
        let mut expr = FilterExpression::partition("Zooby");
        translate_into(&mut expr, &Condition::empty()).unwrap();
        assert_eq!(expr.to_filter_string(), "PartitionKey eq 'Zooby'");
    }

    #[test]
    fn operator_table() {
        let cases = [
            (Operator::Eq, "eq"),
            (Operator::Ne, "ne"),
            (Operator::Gt, "gt"),
            (Operator::Lt, "lt"),
            (Operator::Ge, "ge"),
            (Operator::Le, "le"),
        ];
        for (op, keyword) in cases {
            assert_eq!(
                render(Condition::compare("n", op, 5)),
                format!("n {keyword} 5")
            );
        }
    }

    #[test]
    fn id_maps_to_row_key() {
        assert_eq!(render(Condition::eq("id", "abc")), "RowKey eq 'abc'");
    }

    #[test]
    fn timestamps_bind_as_iso_strings() {
        let ts = Utc.with_ymd_and_hms(2013, 8, 9, 10, 11, 12).unwrap();
        assert_eq!(
            render(Condition::gt("createdAt", ts)),
            "createdAt gt '2013-08-09T10:11:12.000Z'"
        );
    }

    #[test]
    fn like_patterns() {
        assert_eq!(render(Condition::like("s", "%foo%")), "contains(s, 'foo')");
        assert_eq!(render(Condition::like("s", "foo%")), "startswith(s, 'foo')");
        assert_eq!(render(Condition::like("s", "%foo")), "endswith(s, 'foo')");
        assert_eq!(render(Condition::like("s", "foo")), "s eq 'foo'");
    }

    #[test]
    fn lone_wildcard_is_contains_empty() {
        assert_eq!(render(Condition::like("s", "%")), "contains(s, '')");
        assert_eq!(render(Condition::like("s", "%%")), "contains(s, '')");
    }

    #[test]
    fn like_with_non_string_is_equality() {
        assert_eq!(render(Condition::like("n", 7)), "n eq 7");
    }

    #[test]
    fn in_expands_to_or_group() {
        assert_eq!(
            render(Condition::is_in("x", vec![1, 2, 3])),
            "(x eq 1 or x eq 2 or x eq 3)"
        );
    }

    #[test]
    fn in_with_empty_list_matches_nothing() {
        let expr = translate(&Condition::is_in("x", Vec::<i64>::new())).unwrap();
        assert_eq!(expr.to_filter_string(), "(false)");
        assert_eq!(expr.clause_count(), 1);
    }

    #[test]
    fn in_with_scalar_is_skipped() {
        let expr = translate(&Condition::and(vec![
            Condition::is_in("x", 4),
            Condition::eq("y", 1),
        ]))
        .unwrap();
        assert_eq!(expr.to_filter_string(), "y eq 1");
        assert_eq!(expr.skipped(), ["x".to_string()]);
    }

    #[test]
    fn undefined_value_is_skipped() {
        let expr = translate(&Condition::and(vec![
            Condition::undefined("foo", Operator::Eq),
            Condition::eq("bar", "baz"),
        ]))
        .unwrap();
        assert_eq!(expr.to_filter_string(), "bar eq 'baz'");
        assert_eq!(expr.clause_count(), 1);
        assert_eq!(expr.skipped(), ["foo".to_string()]);
    }

    #[test]
    fn or_children_join_with_or() {
        assert_eq!(
            render(Condition::or(vec![
                Condition::eq("a", 1),
                Condition::eq("b", 2),
            ])),
            "a eq 1 or b eq 2"
        );
    }

    #[test]
    fn same_connector_flattens() {
        assert_eq!(
            render(Condition::and(vec![
                Condition::eq("a", 1),
                Condition::and(vec![Condition::eq("b", 2), Condition::eq("c", 3)]),
            ])),
            "a eq 1 and b eq 2 and c eq 3"
        );
    }

    #[test]
    fn mixed_connectors_keep_precedence() {
        assert_eq!(
            render(Condition::and(vec![
                Condition::eq("a", 1),
                Condition::or(vec![Condition::eq("b", 2), Condition::eq("c", 3)]),
            ])),
            "a eq 1 and (b eq 2 or c eq 3)"
        );
    }

    #[test]
    fn single_child_or_joins_with_parent_and() {
        let expr = translate(&Condition::and(vec![
            Condition::eq("a", 1),
            Condition::or(vec![Condition::eq("b", 2)]),
        ]))
        .unwrap();
        assert_eq!(expr.to_filter_string(), "a eq 1 and b eq 2");
        assert!(!expr.matches(&Entity::new("P", "r").with("a", 9).with("b", 2)));
        assert!(expr.matches(&Entity::new("P", "r").with("a", 1).with("b", 2)));
    }

    #[test]
    fn single_child_and_joins_with_parent_or() {
        let expr = translate(&Condition::or(vec![
            Condition::eq("a", 1),
            Condition::and(vec![Condition::eq("b", 2)]),
        ]))
        .unwrap();
        assert_eq!(expr.to_filter_string(), "a eq 1 or b eq 2");
        assert!(expr.matches(&Entity::new("P", "r").with("a", 9).with("b", 2)));
    }

    #[test]
    fn single_child_chain_flattens_into_parent() {
        assert_eq!(
            render(Condition::and(vec![
                Condition::eq("a", 1),
                Condition::or(vec![Condition::and(vec![
                    Condition::eq("b", 2),
                    Condition::eq("c", 3),
                ])]),
            ])),
            "a eq 1 and b eq 2 and c eq 3"
        );
    }

    #[test]
    fn or_root_stays_inside_partition() {
        let mut expr = FilterExpression::partition("P");
        let cond = Condition::or(vec![Condition::eq("a", 1), Condition::eq("b", 2)]);
        translate_into(&mut expr, &cond).unwrap();
        assert_eq!(
            expr.to_filter_string(),
            "PartitionKey eq 'P' and (a eq 1 or b eq 2)"
        );
        assert!(!expr.matches(&Entity::new("Other", "x").with("a", 1)));
        assert!(expr.matches(&Entity::new("P", "x").with("b", 2)));
    }

    #[test]
    fn appended_translation_keeps_skipped_fields() {
        let mut expr = FilterExpression::partition("P");
        let cond = Condition::or(vec![
            Condition::undefined("gone", Operator::Eq),
            Condition::eq("a", 1),
        ]);
        translate_into(&mut expr, &cond).unwrap();
        assert_eq!(expr.to_filter_string(), "PartitionKey eq 'P' and a eq 1");
        assert_eq!(expr.skipped(), ["gone".to_string()]);
    }

    #[test]
    fn not_is_rejected_at_any_depth() {
        let nested = Condition::and(vec![
            Condition::eq("a", 1),
            Condition::or(vec![Condition::not(vec![Condition::eq("b", 2)])]),
        ]);
        let err = translate(&nested).unwrap_err();
        assert!(matches!(err, TabulaError::UnsupportedOperation { .. }));

        assert!(translate(&Condition::not(vec![])).is_err());
    }

    #[test]
    fn failed_translation_leaves_expression_untouched() {
        let mut expr = FilterExpression::partition("Zooby");
        let cond = Condition::and(vec![
            Condition::eq("a", 1),
            Condition::not(vec![Condition::eq("b", 2)]),
        ]);
        assert!(translate_into(&mut expr, &cond).is_err());
        assert_eq!(expr.to_filter_string(), "PartitionKey eq 'Zooby'");
    }
}
