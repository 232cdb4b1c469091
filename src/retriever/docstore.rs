//! Document-store retriever, fanning a question out across MongoDB
//! collections concurrently.
//!
//! Grounded on `mongodb_retriever.py` (per-collection fan-out, `asyncio.gather`
//! via [`futures_util::future::join_all`] rather than a spawned task pool,
//! since the borrowed [`LlmClient`] reference isn't `'static`) and
//! `mongodb_query_constructor.py` (per-collection intent classification with
//! a regex/general fallback on malformed JSON, and the exact/regex filter
//! construction rules).

use std::collections::HashSet;

use futures_util::future::join_all;
use futures_util::TryStreamExt;
use mongodb::bson::{self, Bson, Document as BsonDocument};
use mongodb::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RetrieverError};
use crate::llm::client::{CompletionRequest, LlmClient};
use crate::llm::config::Role;
use crate::llm::prompts::DOCSTORE_INTENT_SYSTEM_PROMPT;
use crate::model::{CollectionConfig, Document, MetaValue, Source};

/// Connection and per-collection configuration for the document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStoreRetrieverConfig {
    /// Replica-set member hosts (`host:port`).
    pub hosts: Vec<String>,
    /// Authentication username.
    pub username: String,
    /// Authentication password.
    pub password: String,
    /// Database name.
    pub database: String,
    /// Replica set name.
    pub replica_set: String,
    /// Authentication source database.
    pub auth_source: String,
    /// Maximum documents returned per collection per query.
    pub query_limit: i64,
    /// Whether to use TLS.
    pub use_ssl: bool,
    /// Whether to verify TLS certificates (ignored when `use_ssl` is `false`).
    pub verify_certs: bool,
    /// Path to a CA certificate file used to verify the server's TLS
    /// certificate, if it isn't signed by a system-trusted CA.
    pub ca_cert_path: Option<String>,
    /// Collections searched on every query.
    pub collections: Vec<CollectionConfig>,
}

impl Default for DocumentStoreRetrieverConfig {
    fn default() -> Self {
        Self {
            hosts: vec!["localhost:27017".to_string()],
            username: String::new(),
            password: String::new(),
            database: "rarp".to_string(),
            replica_set: String::new(),
            auth_source: "admin".to_string(),
            query_limit: 20,
            use_ssl: false,
            verify_certs: true,
            ca_cert_path: None,
            collections: vec![CollectionConfig::items(), CollectionConfig::crm_agreements()],
        }
    }
}

impl DocumentStoreRetrieverConfig {
    /// The `mongodb://` connection string built from this configuration.
    #[must_use]
    pub fn connection_string(&self) -> String {
        let hosts = self.hosts.join(",");
        let mut params = Vec::new();
        if !self.replica_set.is_empty() {
            params.push(format!("replicaSet={}", self.replica_set));
        }
        if !self.auth_source.is_empty() {
            params.push(format!("authSource={}", self.auth_source));
        }
        if self.use_ssl {
            params.push("tls=true".to_string());
            if !self.verify_certs {
                params.push("tlsAllowInvalidCertificates=true".to_string());
            }
            if let Some(ca_cert_path) = &self.ca_cert_path {
                params.push(format!("tlsCAFile={ca_cert_path}"));
            }
        }
        let query = if params.is_empty() { String::new() } else { format!("?{}", params.join("&")) };
        if self.username.is_empty() {
            format!("mongodb://{hosts}/{}{query}", self.database)
        } else {
            format!(
                "mongodb://{}:{}@{hosts}/{}{query}",
                self.username, self.password, self.database
            )
        }
    }
}

#[derive(Debug, Deserialize)]
struct IntentAnalysis {
    #[serde(default)]
    search_term: String,
    #[serde(default)]
    fields: Vec<String>,
}

/// Retriever fanning a question out across the document store's collections.
pub struct DocumentStoreRetriever<'a> {
    config: DocumentStoreRetrieverConfig,
    client: Client,
    llm: &'a dyn LlmClient,
}

impl<'a> DocumentStoreRetriever<'a> {
    /// Connects to the document store using `config` and pairs it with `llm`
    /// for per-collection intent classification.
    pub async fn connect(config: DocumentStoreRetrieverConfig, llm: &'a dyn LlmClient) -> Result<Self> {
        let client = Client::with_uri_str(config.connection_string())
            .await
            .map_err(|e| RetrieverError::BackendUnavailable {
                backend: "document store".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { config, client, llm })
    }

    /// Classifies `query` against `collection`'s configured fields via an LLM
    /// call, falling back to a general search over every configured field on
    /// malformed JSON output (mirrors `_analyze_query`'s `except` clause).
    async fn classify(&self, query: &str, collection: &CollectionConfig) -> (String, Vec<String>) {
        let all_fields: Vec<&str> = collection
            .exact_match_fields
            .iter()
            .chain(collection.regex_match_fields.iter())
            .map(String::as_str)
            .collect();
        let fields_listing = all_fields.join("\n- ");
        let request = CompletionRequest {
            role: Role::MongodbRetriever,
            system_prompt: DOCSTORE_INTENT_SYSTEM_PROMPT,
            user_prompt: format!("Collection fields:\n- {fields_listing}\n\nQuestion: {query}"),
        };

        let general = || (query.to_string(), all_fields.iter().map(|s| (*s).to_string()).collect());

        match self.llm.complete(request).await {
            Ok(raw) => match extract_json_object(&raw).and_then(|s| serde_json::from_str::<IntentAnalysis>(s).ok()) {
                Some(analysis) if !analysis.fields.is_empty() => (analysis.search_term, analysis.fields),
                _ => general(),
            },
            Err(_) => general(),
        }
    }

    fn exact_clause(field: &str, search_term: &str) -> BsonDocument {
        let mut d = BsonDocument::new();
        d.insert(field, search_term);
        d
    }

    fn regex_clause(field: &str, search_term: &str) -> BsonDocument {
        let mut inner = BsonDocument::new();
        inner.insert("$regex", search_term);
        inner.insert("$options", "i");
        let mut d = BsonDocument::new();
        d.insert(field, inner);
        d
    }

    fn build_filter(collection: &CollectionConfig, fields: &[String], search_term: &str) -> BsonDocument {
        let field_set: HashSet<String> = fields.iter().cloned().collect();
        let (exact, regex) = collection.split_fields(&field_set);

        if exact.len() + regex.len() == 1 {
            if let Some(field) = exact.first() {
                return Self::exact_clause(field, search_term);
            }
            if let Some(field) = regex.first() {
                return Self::regex_clause(field, search_term);
            }
        }

        let exact_matches: Vec<BsonDocument> = exact.iter().map(|f| Self::exact_clause(f, search_term)).collect();
        let regex_matches: Vec<BsonDocument> = regex.iter().map(|f| Self::regex_clause(f, search_term)).collect();

        let mut result = BsonDocument::new();
        if !exact_matches.is_empty() && !regex_matches.is_empty() {
            let mut or_clauses = Vec::with_capacity(1 + regex_matches.len());
            let mut and_doc = BsonDocument::new();
            and_doc.insert("$and", exact_matches);
            or_clauses.push(Bson::Document(and_doc));
            or_clauses.extend(regex_matches.into_iter().map(Bson::Document));
            result.insert("$or", or_clauses);
        } else if !exact_matches.is_empty() {
            result.insert("$or", exact_matches);
        } else if !regex_matches.is_empty() {
            result.insert("$or", regex_matches);
        }
        result
    }

    fn project(collection: &CollectionConfig, doc: &BsonDocument) -> Document {
        let content = get_dotted(doc, &collection.content_field).as_display();
        let mut result = Document::new(content, Source::Docstore).with_meta("collection", collection.name.clone());
        for field in &collection.metadata_fields {
            result = result.with_meta(field.clone(), get_dotted(doc, field));
        }
        result
    }

    async fn search_collection(&self, collection: &CollectionConfig, query: &str) -> Result<Vec<Document>> {
        let (search_term, fields) = self.classify(query, collection).await;
        let filter = Self::build_filter(collection, &fields, &search_term);

        tracing::debug!(collection = %collection.name, ?filter, "querying document store collection");

        let mongo_collection = self
            .client
            .database(&self.config.database)
            .collection::<BsonDocument>(&collection.name);
        let mut cursor = mongo_collection
            .find(filter)
            .limit(self.config.query_limit)
            .await
            .map_err(|e| RetrieverError::BackendUnavailable {
                backend: "document store".to_string(),
                reason: e.to_string(),
            })?;

        let mut docs = Vec::new();
        while let Some(doc) = cursor.try_next().await.map_err(|e| RetrieverError::MalformedResponse {
            backend: "document store".to_string(),
            reason: e.to_string(),
        })? {
            docs.push(Self::project(collection, &doc));
        }
        Ok(docs)
    }
}

#[async_trait::async_trait]
impl super::Retriever for DocumentStoreRetriever<'_> {
    async fn search(&self, query: &str) -> Result<Vec<Document>> {
        let results = join_all(
            self.config
                .collections
                .iter()
                .map(|collection| self.search_collection(collection, query)),
        )
        .await;

        let mut all_docs = Vec::new();
        for result in results {
            all_docs.extend(result?);
        }
        Ok(all_docs)
    }
}

/// Resolves a dotted path (`"party.name"`) against a BSON document, returning
/// an empty string value for any missing segment.
fn get_dotted(doc: &BsonDocument, path: &str) -> MetaValue {
    let mut current = Bson::Document(doc.clone());
    for part in path.split('.') {
        current = match current {
            Bson::Document(d) => d.get(part).cloned().unwrap_or(Bson::Null),
            _ => Bson::Null,
        };
    }
    bson_to_meta(&current)
}

fn bson_to_meta(value: &Bson) -> MetaValue {
    match value {
        Bson::String(s) => MetaValue::String(s.clone()),
        Bson::Int32(i) => MetaValue::Integer(i64::from(*i)),
        Bson::Int64(i) => MetaValue::Integer(*i),
        Bson::Double(f) => MetaValue::Float(*f),
        Bson::Boolean(b) => MetaValue::Bool(*b),
        Bson::Document(d) => MetaValue::Map(
            d.iter()
                .map(|(k, v)| (k.clone(), bson_to_meta(v)))
                .collect(),
        ),
        _ => MetaValue::String(String::new()),
    }
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_string_includes_credentials_and_replica_set() {
        let config = DocumentStoreRetrieverConfig {
            username: "svc".to_string(),
            password: "secret".to_string(),
            replica_set: "rs0".to_string(),
            ..DocumentStoreRetrieverConfig::default()
        };
        let uri = config.connection_string();
        assert!(uri.starts_with("mongodb://svc:secret@"));
        assert!(uri.contains("replicaSet=rs0"));
    }

    #[test]
    fn connection_string_omits_credentials_when_absent() {
        let config = DocumentStoreRetrieverConfig::default();
        assert!(config.connection_string().starts_with("mongodb://localhost:27017/"));
    }

    #[test]
    fn connection_string_allows_invalid_certs_when_verify_disabled() {
        let config = DocumentStoreRetrieverConfig {
            use_ssl: true,
            verify_certs: false,
            ..DocumentStoreRetrieverConfig::default()
        };
        let uri = config.connection_string();
        assert!(uri.contains("tls=true"));
        assert!(uri.contains("tlsAllowInvalidCertificates=true"));
    }

    #[test]
    fn connection_string_includes_ca_cert_path() {
        let config = DocumentStoreRetrieverConfig {
            use_ssl: true,
            ca_cert_path: Some("/etc/ssl/ca.pem".to_string()),
            ..DocumentStoreRetrieverConfig::default()
        };
        let uri = config.connection_string();
        assert!(uri.contains("tlsCAFile=/etc/ssl/ca.pem"));
    }

    #[test]
    fn connection_string_skips_tls_options_without_ssl() {
        let config = DocumentStoreRetrieverConfig {
            verify_certs: false,
            ..DocumentStoreRetrieverConfig::default()
        };
        let uri = config.connection_string();
        assert!(!uri.contains("tls"));
    }

    #[test]
    fn build_filter_single_exact_field_is_direct_equality() {
        let items = CollectionConfig::items();
        let filter = DocumentStoreRetriever::build_filter(&items, &["isbn".to_string()], "978-1");
        assert_eq!(filter.get_str("isbn"), Ok("978-1"));
    }

    #[test]
    fn build_filter_single_regex_field_uses_case_insensitive_regex() {
        let items = CollectionConfig::items();
        let filter = DocumentStoreRetriever::build_filter(&items, &["author".to_string()], "Repkin");
        let inner = filter.get_document("author").expect("author clause");
        assert_eq!(inner.get_str("$regex"), Ok("Repkin"));
    }

    #[test]
    fn build_filter_mixed_fields_combines_and_or() {
        let items = CollectionConfig::items();
        let filter = DocumentStoreRetriever::build_filter(
            &items,
            &["isbn".to_string(), "author".to_string()],
            "term",
        );
        assert!(filter.contains_key("$or"));
    }

    #[test]
    fn get_dotted_resolves_nested_path() {
        let doc = bson::doc! { "party": { "name": "Acme" } };
        assert_eq!(get_dotted(&doc, "party.name").as_display(), "Acme");
    }

    #[test]
    fn get_dotted_missing_path_is_empty() {
        let doc = bson::doc! { "party": { "name": "Acme" } };
        assert_eq!(get_dotted(&doc, "party.missing").as_display(), "");
    }
}
