//! Unified `Document` result shape produced by every retriever.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

/// A stable, non-cryptographic content hash used to distinguish documents
/// that otherwise share a non-unique primary-id key (e.g. the same
/// `collection` or `time` value).
fn content_hash(content: &str) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    content.hash(&mut hasher);
    hasher.finish()
}

/// Tagged value stored in `Document::metadata`.
///
/// Mirrors the teacher's `core::context::ContextValue` tagged-enum `serde`
/// style, extended with the shapes retrievers actually project: strings,
/// numbers, booleans and nested maps (for collection-store dot paths).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum MetaValue {
    /// A string value.
    String(String),
    /// A floating-point value.
    Float(f64),
    /// An integer value.
    Integer(i64),
    /// A boolean value.
    Bool(bool),
    /// A nested map, produced when a dotted metadata path resolves to an
    /// object rather than a scalar.
    Map(BTreeMap<String, MetaValue>),
}

impl MetaValue {
    /// Renders the value as a display string, used when projecting into
    /// `Document.content` or when missing path segments must yield `""`.
    #[must_use]
    pub fn as_display(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Float(f) => f.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Map(_) => String::new(),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// The store a `Document` was projected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Projected from the full-text log index.
    Logs,
    /// Projected from the document store.
    Docstore,
    /// Projected from the code store.
    Code,
}

impl Source {
    /// Returns the stable metadata key value, e.g. for the `source` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Logs => "logs",
            Self::Docstore => "docstore",
            Self::Code => "code",
        }
    }
}

/// Unified result shape produced by every retriever.
///
/// Immutable once constructed: no method here mutates `content` or
/// `metadata` in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Human-readable body (log message, code snippet, or document field).
    pub content: String,
    /// Stable keys include `source`, plus retriever-specific keys (`time`,
    /// `level`, `namespace`, `service`, `score`, `collection`, `filename`, …).
    pub metadata: BTreeMap<String, MetaValue>,
}

impl Document {
    /// Builds a document, stamping `metadata["source"]` from `source`.
    #[must_use]
    pub fn new(content: impl Into<String>, source: Source) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("source".to_string(), MetaValue::from(source.as_str()));
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Adds a metadata entry, builder-style.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Returns the `source` metadata key as a plain string, if present.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        match self.metadata.get("source") {
            Some(MetaValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns a metadata value rendered as a display string, or `""` if
    /// the key is absent. Used by dot-path projection for missing segments.
    #[must_use]
    pub fn meta_str(&self, key: &str) -> String {
        self.metadata
            .get(key)
            .map(MetaValue::as_display)
            .unwrap_or_default()
    }

    /// The `(source, primary-id)` identity used to deduplicate documents
    /// after grading. The primary id is `filename` for code documents
    /// (stable and unique on its own), and `collection`+content hash for
    /// docstore documents or `time`+content hash for log documents, since
    /// neither key alone distinguishes two different documents sharing it.
    #[must_use]
    pub fn identity(&self) -> (String, String) {
        let source = self.source().unwrap_or("unknown").to_string();
        let primary = if let Some(filename) = self.metadata.get("filename") {
            filename.as_display()
        } else if let Some(key) = self.metadata.get("collection").or_else(|| self.metadata.get("time")) {
            format!("{}:{}", key.as_display(), content_hash(&self.content))
        } else {
            self.content.clone()
        };
        (source, primary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stamps_source() {
        let doc = Document::new("hello", Source::Logs);
        assert_eq!(doc.source(), Some("logs"));
        assert_eq!(doc.content, "hello");
    }

    #[test]
    fn meta_str_missing_is_empty() {
        let doc = Document::new("x", Source::Code);
        assert_eq!(doc.meta_str("filename"), "");
    }

    #[test]
    fn identity_prefers_filename() {
        let doc = Document::new("x", Source::Code).with_meta("filename", "a.js");
        assert_eq!(doc.identity(), ("code".to_string(), "a.js".to_string()));
    }

    #[test]
    fn identity_falls_back_to_content() {
        let doc = Document::new("unique body", Source::Logs);
        assert_eq!(
            doc.identity(),
            ("logs".to_string(), "unique body".to_string())
        );
    }

    #[test]
    fn identity_distinguishes_same_collection_by_content() {
        let a = Document::new("record A", Source::Docstore).with_meta("collection", "items");
        let b = Document::new("record B", Source::Docstore).with_meta("collection", "items");
        assert_ne!(a.identity(), b.identity());
    }

    #[test]
    fn identity_is_stable_for_identical_collection_documents() {
        let a = Document::new("record A", Source::Docstore).with_meta("collection", "items");
        let b = Document::new("record A", Source::Docstore).with_meta("collection", "items");
        assert_eq!(a.identity(), b.identity());
    }
}
