//! Few-shot examples for [`super::QueryConstructor`], carried over from
//! `examples/original_source/opensearch_query_constructor.py`'s literal
//! `(question, query)` pairs, re-expressed against our `StructuredQuery`
//! schema instead of raw OpenSearch DSL.

use crate::model::{Comparison as Cmp, FilterExpr as Expr, Op, StructuredQuery};

/// One `(question, expected structured query)` pair used in the prompt.
pub struct Example {
    /// The natural-language question.
    pub question: &'static str,
    /// The structured query the model should produce for it.
    pub query: StructuredQuery,
}

fn sq(text: Option<&str>, filter: Expr) -> StructuredQuery {
    StructuredQuery {
        text: text.map(str::to_string),
        filter,
    }
}

/// The 13 literal examples from `opensearch_query_constructor.py`, in the
/// source's original order.
#[must_use]
pub fn all() -> Vec<Example> {
    vec![
        Example {
            question: "What were API service errors on April 11 2025?",
            query: sq(
                Some("API service error"),
                Expr::And(vec![
                    Expr::Comparison(Cmp::eq("level", "error")),
                    Expr::Comparison(Cmp::range("time", Op::Gte, "2025-04-11T00:00:00Z")),
                    Expr::Comparison(Cmp::range("time", Op::Lte, "2025-04-11T23:59:59Z")),
                ]),
            ),
        },
        Example {
            question: "What are warnings in prod this week?",
            query: sq(
                None,
                Expr::And(vec![
                    Expr::Comparison(Cmp::eq("level", "warn")),
                    Expr::Comparison(Cmp::eq("ns", "prod")),
                    Expr::Comparison(Cmp::range("time", Op::Gte, "now/w")),
                ]),
            ),
        },
        Example {
            question: "What are errors in prod last month?",
            query: sq(
                None,
                Expr::And(vec![
                    Expr::Comparison(Cmp::eq("level", "error")),
                    Expr::Comparison(Cmp::eq("ns", "prod")),
                    Expr::Comparison(Cmp::range("time", Op::Gte, "now-1M")),
                ]),
            ),
        },
        Example {
            question: "What are errors in prod last hour?",
            query: sq(
                None,
                Expr::And(vec![
                    Expr::Comparison(Cmp::eq("level", "error")),
                    Expr::Comparison(Cmp::eq("ns", "prod")),
                    Expr::Comparison(Cmp::range("time", Op::Gte, "now-1h")),
                ]),
            ),
        },
        Example {
            question: "What are errors in test from 2025-03-20 10:00:00 to 2025-03-21 10:00:00?",
            query: sq(
                None,
                Expr::And(vec![
                    Expr::Comparison(Cmp::eq("level", "error")),
                    Expr::Comparison(Cmp::eq("ns", "test")),
                    Expr::Comparison(Cmp::range("time", Op::Gte, "2025-03-20T10:00:00Z")),
                    Expr::Comparison(Cmp::range("time", Op::Lte, "2025-03-21T10:00:00Z")),
                ]),
            ),
        },
        Example {
            question: "What happened with order PSV-745559?",
            query: sq(None, Expr::Comparison(Cmp::eq("msg", "PSV-745559"))),
        },
        Example {
            question: "What are Mindbox upload errors in test from 2025-03-20 10:00:00 to 2025-03-21 10:00:00?",
            query: sq(
                Some("mindbox upload error"),
                Expr::And(vec![
                    Expr::Comparison(Cmp::eq("level", "error")),
                    Expr::Comparison(Cmp::eq("ns", "test")),
                    Expr::Comparison(Cmp::range("time", Op::Gte, "2025-03-20T10:00:00Z")),
                    Expr::Comparison(Cmp::range("time", Op::Lte, "2025-03-21T10:00:00Z")),
                ]),
            ),
        },
        Example {
            question: "What are crm errors in prod today?",
            query: sq(
                Some("crm error"),
                Expr::And(vec![
                    Expr::Comparison(Cmp::eq("level", "error")),
                    Expr::Comparison(Cmp::eq("ns", "prod")),
                    Expr::Comparison(Cmp::range("time", Op::Gte, "now/d")),
                ]),
            ),
        },
        Example {
            question: "What are Mindbox upload server errors in topic id-authorize-customer-topic?",
            query: sq(
                Some("mindbox upload server error"),
                Expr::And(vec![
                    Expr::Comparison(Cmp::eq("level", "error")),
                    Expr::Comparison(Cmp::eq("ns", "test")),
                    Expr::Comparison(Cmp::eq("msg", "id-authorize-customer-topic")),
                ]),
            ),
        },
        Example {
            question: "What are logs from 16:00:00 to now?",
            query: sq(
                None,
                Expr::And(vec![
                    Expr::Comparison(Cmp::range("time", Op::Gte, "now/d+16h")),
                    Expr::Comparison(Cmp::range("time", Op::Lte, "now")),
                ]),
            ),
        },
        Example {
            question: "What are logs on prod from 16:35:11 to 16:36:56?",
            query: sq(
                None,
                Expr::And(vec![
                    Expr::Comparison(Cmp::eq("ns", "prod")),
                    Expr::Comparison(Cmp::range("time", Op::Gte, "now/d+16h35m11s")),
                    Expr::Comparison(Cmp::range("time", Op::Lte, "now/d+16h36m56s")),
                ]),
            ),
        },
        Example {
            question: "What are steps of item NM0098877?",
            query: sq(None, Expr::Comparison(Cmp::eq("msg", "NM0098877"))),
        },
        Example {
            question: "What happened with item NM0086817 on test?",
            query: sq(
                None,
                Expr::And(vec![
                    Expr::Comparison(Cmp::eq("ns", "test")),
                    Expr::Comparison(Cmp::eq("msg", "NM0086817")),
                ]),
            ),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_examples_present() {
        assert_eq!(all().len(), 13);
    }

    #[test]
    fn examples_serialize_to_json() {
        for example in all() {
            let rendered = serde_json::to_string(&example.query);
            assert!(rendered.is_ok(), "failed to render {}", example.question);
        }
    }
}
