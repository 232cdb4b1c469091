//! Translates a [`FilterExpr`] tree into the backend search DSL
//! (`{term}`/`{range}`/`{bool}`, OpenSearch-shaped).

use serde_json::{json, Value};

use crate::model::{Comparison, FilterExpr, Op, StructuredQuery};

/// Translates a [`Comparison`] leaf into a DSL clause, or `None` if it
/// carries the `NO_FILTER` sentinel value.
fn translate_comparison(cmp: &Comparison) -> Option<Value> {
    if cmp.is_no_filter() {
        return None;
    }
    Some(match cmp.op {
        Op::Eq => json!({ "term": { cmp.attribute.clone(): cmp.value } }),
        range_op => {
            let mut bounds = serde_json::Map::new();
            bounds.insert(range_op.dsl_token().to_string(), json!(cmp.value));
            // Absolute timestamps (not relative tokens like `now`, `now/d`,
            // `now-1h`) are left as-is; absolute timestamps are pinned to a fixed time zone.
            if !cmp.value.starts_with("now") {
                bounds.insert("time_zone".to_string(), json!("+03:00"));
            }
            json!({ "range": { cmp.attribute.clone(): bounds } })
        }
    })
}

/// Translates a [`FilterExpr`] tree into a DSL clause, or `None` if every
/// leaf underneath it was dropped (`NO_FILTER` or an empty operator).
fn translate_expr(expr: &FilterExpr) -> Option<Value> {
    match expr {
        FilterExpr::Comparison(cmp) => translate_comparison(cmp),
        FilterExpr::And(children) => combine(children, "must"),
        FilterExpr::Or(children) => combine(children, "should"),
        FilterExpr::Not(children) => combine(children, "must_not"),
    }
}

fn combine(children: &[FilterExpr], clause: &str) -> Option<Value> {
    let translated: Vec<Value> = children.iter().filter_map(translate_expr).collect();
    if translated.is_empty() {
        return None;
    }
    Some(json!({ "bool": { clause: translated } }))
}

/// Flattens a translated filter clause into the array that goes under
/// `filter`. A top-level `And` translates to `{bool: {must: [...]}}`; that
/// array is hoisted directly into `filter` rather than nested one level
/// deeper. Anything else (a bare comparison, an `Or`/`Not` bool clause) is
/// wrapped as the array's single element.
fn filter_clauses(filter: Value) -> Vec<Value> {
    if let Value::Object(ref m) = filter {
        if let Some(Value::Object(b)) = m.get("bool") {
            if let Some(Value::Array(must)) = b.get("must") {
                return must.clone();
            }
        }
    }
    vec![filter]
}

/// Translates a [`StructuredQuery`] into the top-level DSL request body.
///
/// Rules: a text phrase becomes a `match` clause on the
/// message field, always placed under `must`; an empty result (no text,
/// no surviving filter leaves) becomes `{match_all: {}}`; otherwise the
/// result is always wrapped in a single top-level `{bool: {...}}`. A
/// top-level `And` filter is hoisted directly into `filter` instead of
/// nesting a `{bool: {must: [...]}}` one level deeper.
#[must_use]
pub fn translate(query: &StructuredQuery, message_field: &str) -> Value {
    let filter_clause = translate_expr(&query.filter);
    let text_clause = query
        .text
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(|t| json!({ "match": { message_field: t } }));

    match (text_clause, filter_clause) {
        (None, None) => json!({ "match_all": {} }),
        (Some(text), None) => json!({ "bool": { "must": [text] } }),
        (None, Some(filter)) => json!({ "bool": { "filter": filter_clauses(filter) } }),
        (Some(text), Some(filter)) => json!({
            "bool": {
                "must": [text],
                "filter": filter_clauses(filter),
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Comparison as Cmp;

    #[test]
    fn empty_query_is_match_all() {
        let q = StructuredQuery::match_all();
        assert_eq!(translate(&q, "msg"), json!({ "match_all": {} }));
    }

    #[test]
    fn eq_comparison_is_term() {
        let q = StructuredQuery {
            text: None,
            filter: FilterExpr::Comparison(Cmp::eq("level", "error")),
        };
        let out = translate(&q, "msg");
        assert_eq!(
            out,
            json!({ "bool": { "filter": [{ "term": { "level": "error" } }] } })
        );
    }

    #[test]
    fn range_comparison_uses_dsl_token() {
        let q = StructuredQuery {
            text: None,
            filter: FilterExpr::Comparison(Cmp::range("time", Op::Gte, "now-1h")),
        };
        let out = translate(&q, "msg");
        assert_eq!(
            out,
            json!({ "bool": { "filter": [{ "range": { "time": { "gte": "now-1h" } } }] } })
        );
    }

    #[test]
    fn absolute_time_gets_pinned_time_zone() {
        let q = StructuredQuery {
            text: None,
            filter: FilterExpr::Comparison(Cmp::range("time", Op::Gte, "2025-04-11T00:00:00Z")),
        };
        let out = translate(&q, "msg");
        assert_eq!(
            out,
            json!({ "bool": { "filter": [{ "range": { "time": {
                "gte": "2025-04-11T00:00:00Z",
                "time_zone": "+03:00"
            } } }] } })
        );
    }

    #[test]
    fn no_filter_sentinel_is_dropped() {
        let q = StructuredQuery {
            text: None,
            filter: FilterExpr::And(vec![
                FilterExpr::Comparison(Cmp::eq("level", crate::model::NO_FILTER)),
                FilterExpr::Comparison(Cmp::eq("service", "billing")),
            ]),
        };
        let out = translate(&q, "msg");
        assert_eq!(
            out,
            json!({ "bool": { "filter": [{ "term": { "service": "billing" } }] } })
        );
    }

    #[test]
    fn top_level_and_is_hoisted_flat_into_filter_with_no_must_block() {
        let q = StructuredQuery {
            text: None,
            filter: FilterExpr::And(vec![
                FilterExpr::Comparison(Cmp::eq("level", "error")),
                FilterExpr::Comparison(Cmp::eq("ns", "prod")),
                FilterExpr::Comparison(Cmp::range("time", Op::Gte, "now-1h")),
            ]),
        };
        let out = translate(&q, "msg");
        assert_eq!(
            out,
            json!({
                "bool": {
                    "filter": [
                        { "term": { "level": "error" } },
                        { "term": { "ns": "prod" } },
                        { "range": { "time": { "gte": "now-1h" } } },
                    ]
                }
            })
        );
        assert!(out["bool"]["must"].is_null(), "top-level And must not leave a must block");
    }

    #[test]
    fn operator_with_all_children_dropped_is_dropped() {
        let q = StructuredQuery {
            text: Some("timeout".to_string()),
            filter: FilterExpr::Or(vec![FilterExpr::Comparison(Cmp::eq(
                "level",
                crate::model::NO_FILTER,
            ))]),
        };
        let out = translate(&q, "msg");
        assert_eq!(out, json!({ "bool": { "must": [{ "match": { "msg": "timeout" } }] } }));
    }

    #[test]
    fn text_and_filter_combine_text_under_must_filter_under_filter() {
        let q = StructuredQuery {
            text: Some("connection refused".to_string()),
            filter: FilterExpr::Comparison(Cmp::eq("service", "billing")),
        };
        let out = translate(&q, "msg");
        assert_eq!(
            out,
            json!({
                "bool": {
                    "must": [{ "match": { "msg": "connection refused" } }],
                    "filter": [{ "term": { "service": "billing" } }],
                }
            })
        );
    }

    #[test]
    fn not_wraps_in_must_not() {
        let q = StructuredQuery {
            text: None,
            filter: FilterExpr::Not(vec![FilterExpr::Comparison(Cmp::eq("level", "debug"))]),
        };
        let out = translate(&q, "msg");
        assert_eq!(
            out,
            json!({ "bool": { "filter": [{ "bool": { "must_not": [{ "term": { "level": "debug" } }] } }] } })
        );
    }
}
