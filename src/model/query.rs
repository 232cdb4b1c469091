//! Structured-query types consumed by [`crate::filter::translator`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Sentinel meaning "ignore this leaf" for a [`Comparison`] value.
pub const NO_FILTER: &str = "__NO_FILTER__";

/// Comparison operator for a [`Comparison`] leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    /// Equality.
    Eq,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
}

impl Op {
    /// Returns `true` for the range family (`lt|lte|gt|gte`).
    #[must_use]
    pub const fn is_range(self) -> bool {
        !matches!(self, Self::Eq)
    }

    /// The backend DSL operator token used inside a `range` clause.
    #[must_use]
    pub const fn dsl_token(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
        }
    }
}

/// A single `(attribute, op, value)` leaf.
///
/// A value equal to [`NO_FILTER`] means "ignore this leaf".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Field name being compared.
    pub attribute: String,
    /// Comparison operator.
    pub op: Op,
    /// Comparison value.
    pub value: String,
}

impl Comparison {
    /// Builds an equality comparison.
    #[must_use]
    pub fn eq(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            op: Op::Eq,
            value: value.into(),
        }
    }

    /// Builds a range comparison.
    #[must_use]
    pub fn range(attribute: impl Into<String>, op: Op, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            op,
            value: value.into(),
        }
    }

    /// `true` when this leaf's value is the [`NO_FILTER`] sentinel.
    #[must_use]
    pub fn is_no_filter(&self) -> bool {
        self.value == NO_FILTER
    }
}

/// A tree of `And | Or | Not | Comparison`, re-expressed as a tagged enum
/// instead of an open-dispatch visitor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "children", rename_all = "lowercase")]
pub enum FilterExpr {
    /// Conjunction of sub-expressions.
    And(Vec<FilterExpr>),
    /// Disjunction of sub-expressions.
    Or(Vec<FilterExpr>),
    /// Negation of sub-expressions.
    Not(Vec<FilterExpr>),
    /// A single comparison leaf.
    Comparison(Comparison),
}

impl FilterExpr {
    /// An empty filter tree, translated to a match-all filter.
    #[must_use]
    pub const fn empty() -> Self {
        Self::And(Vec::new())
    }

    /// `true` for an `And`/`Or`/`Not` with zero children.
    #[must_use]
    pub fn is_empty_operator(&self) -> bool {
        matches!(self, Self::And(xs) | Self::Or(xs) | Self::Not(xs) if xs.is_empty())
    }
}

/// Output of `QueryConstructor` for the log index: `(text, filter)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
    /// Optional free-text phrase matched against the log message body.
    pub text: Option<String>,
    /// Filter expression tree.
    pub filter: FilterExpr,
}

impl StructuredQuery {
    /// A structured query with no filter and no text — translates to
    /// `match_all`.
    #[must_use]
    pub const fn match_all() -> Self {
        Self {
            text: None,
            filter: FilterExpr::empty(),
        }
    }

    /// The fallback query constructed when the LLM returns malformed
    /// output: keep the raw question as free text, filter everything.
    #[must_use]
    pub fn fallback(question: impl Into<String>) -> Self {
        Self {
            text: Some(question.into()),
            filter: FilterExpr::empty(),
        }
    }
}

/// `GradeVerdict` = `{yes, no}`. Any other value is treated as `no`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradeVerdict {
    /// Relevant / addresses / grounded.
    Yes,
    /// Not relevant / does not address / not grounded.
    No,
}

impl GradeVerdict {
    /// Parses a raw LLM binary-score string; anything other than an
    /// exact `"yes"` (case-insensitive) is `No`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("yes") {
            Self::Yes
        } else {
            Self::No
        }
    }

    /// `true` for [`GradeVerdict::Yes`].
    #[must_use]
    pub const fn is_yes(self) -> bool {
        matches!(self, Self::Yes)
    }
}

/// Configuration of one collection in the document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Collection name.
    pub name: String,
    /// Fields matched as equality terms.
    pub exact_match_fields: BTreeSet<String>,
    /// Fields matched as case-insensitive substring.
    pub regex_match_fields: BTreeSet<String>,
    /// Fields projected into `Document.metadata` (dot paths allowed).
    pub metadata_fields: Vec<String>,
    /// Dotted path projected into `Document.content`.
    pub content_field: String,
    /// Valid `intent` labels this collection recognizes, used as the
    /// regex-fallback table when LLM intent classification produces
    /// malformed output. The original source's two seeded collections
    /// (`items`, `crm-agreements`) use `isbn|author|topic|general` and
    /// `number|party|topic|general` respectively.
    pub intents: Vec<String>,
}

impl CollectionConfig {
    /// The `items` collection config carried over from
    /// `mongodb_query_constructor.py`'s `collection_configs["items"]`.
    #[must_use]
    pub fn items() -> Self {
        Self {
            name: "items".to_string(),
            exact_match_fields: ["isbn"].into_iter().map(String::from).collect(),
            regex_match_fields: ["title", "author"].into_iter().map(String::from).collect(),
            metadata_fields: vec![
                "isbn".to_string(),
                "title".to_string(),
                "author".to_string(),
            ],
            content_field: "description".to_string(),
            intents: vec![
                "isbn".to_string(),
                "author".to_string(),
                "topic".to_string(),
                "general".to_string(),
            ],
        }
    }

    /// The `crm-agreements` collection config carried over from
    /// `mongodb_query_constructor.py`'s `collection_configs["crm-agreements"]`.
    #[must_use]
    pub fn crm_agreements() -> Self {
        Self {
            name: "crm-agreements".to_string(),
            exact_match_fields: ["number"].into_iter().map(String::from).collect(),
            regex_match_fields: ["party.name"].into_iter().map(String::from).collect(),
            metadata_fields: vec![
                "number".to_string(),
                "party.name".to_string(),
                "status".to_string(),
            ],
            content_field: "summary".to_string(),
            intents: vec![
                "number".to_string(),
                "party".to_string(),
                "topic".to_string(),
                "general".to_string(),
            ],
        }
    }

    /// Splits `fields` (as returned by intent classification) into the
    /// exact-match and regex-match subsets configured for this collection.
    #[must_use]
    pub fn split_fields<'a>(&self, fields: &'a HashSet<String>) -> (Vec<&'a str>, Vec<&'a str>) {
        let mut exact = Vec::new();
        let mut regex = Vec::new();
        for f in fields {
            if self.exact_match_fields.contains(f.as_str()) {
                exact.push(f.as_str());
            } else if self.regex_match_fields.contains(f.as_str()) {
                regex.push(f.as_str());
            }
        }
        exact.sort_unstable();
        regex.sort_unstable();
        (exact, regex)
    }
}
