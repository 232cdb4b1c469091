//! Full-text log index retriever.
//!
//! Translates a natural-language question into a [`crate::model::StructuredQuery`]
//! via [`crate::query_constructor::QueryConstructor`], lowers it to the
//! index's DSL via [`crate::filter::translate`], and projects hits into
//! [`Document`]s. Field projection (`msg`, `level`, `ns`, `svc`, `time`,
//! `_score`) is grounded on `open_search_retriever.py`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Result, RetrieverError};
use crate::filter;
use crate::llm::client::LlmClient;
use crate::model::{Document, MetaValue, Source};
use crate::query_constructor::QueryConstructor;

use super::Retriever;

/// Configuration for the full-text log index backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRetrieverConfig {
    /// Index host.
    pub host: String,
    /// Index port.
    pub port: u16,
    /// Basic-auth username, empty for none.
    pub username: String,
    /// Basic-auth password.
    pub password: String,
    /// Index (or index pattern) name.
    pub index: String,
    /// Whether to use HTTPS.
    pub use_ssl: bool,
    /// Whether to verify TLS certificates.
    pub verify_certs: bool,
    /// Fixed per-query result size.
    pub query_size: u32,
}

impl Default for LogRetrieverConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9200,
            username: String::new(),
            password: String::new(),
            index: "logs-*".to_string(),
            use_ssl: false,
            verify_certs: true,
            query_size: 20,
        }
    }
}

impl LogRetrieverConfig {
    /// The index's base URL, combining scheme, host, and port.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: HitsWrapper,
}

#[derive(Debug, Deserialize)]
struct HitsWrapper {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: HitSource,
    #[serde(rename = "_score")]
    score: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct HitSource {
    msg: Option<String>,
    level: Option<String>,
    ns: Option<String>,
    svc: Option<String>,
    time: Option<String>,
}

/// Retriever over the full-text log index.
pub struct LogRetriever<'a> {
    config: LogRetrieverConfig,
    client: reqwest::Client,
    query_constructor: QueryConstructor<'a>,
}

impl<'a> LogRetriever<'a> {
    /// Builds a retriever against `config`, constructing queries via `llm`.
    #[must_use]
    pub fn new(config: LogRetrieverConfig, llm: &'a dyn LlmClient) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            query_constructor: QueryConstructor::new(llm),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}/_search", self.config.base_url(), self.config.index)
    }

    fn project(hit: Hit) -> Document {
        let mut doc = Document::new(hit.source.msg.unwrap_or_default(), Source::Logs);
        if let Some(level) = hit.source.level {
            doc = doc.with_meta("level", level);
        }
        if let Some(ns) = hit.source.ns {
            doc = doc.with_meta("ns", ns);
        }
        if let Some(svc) = hit.source.svc {
            doc = doc.with_meta("svc", svc);
        }
        if let Some(time) = hit.source.time {
            doc = doc.with_meta("time", time);
        }
        if let Some(score) = hit.score {
            doc = doc.with_meta("score", score);
        }
        doc
    }
}

#[async_trait]
impl Retriever for LogRetriever<'_> {
    async fn search(&self, question: &str) -> Result<Vec<Document>> {
        let structured = self.query_constructor.construct(question).await;
        let translated = filter::translate(&structured, "msg");
        let body = json!({
            "query": translated,
            "size": self.config.query_size,
        });

        tracing::debug!(index = %self.config.index, ?body, "querying log index");

        let mut request = self.client.post(self.endpoint()).json(&body);
        if !self.config.username.is_empty() {
            request = request.basic_auth(&self.config.username, Some(&self.config.password));
        }

        let response = request.send().await.map_err(|e| RetrieverError::BackendUnavailable {
            backend: "log index".to_string(),
            reason: e.to_string(),
        })?;

        if !response.status().is_success() {
            return Err(RetrieverError::BackendUnavailable {
                backend: "log index".to_string(),
                reason: format!("http status {}", response.status()),
            }
            .into());
        }

        let parsed: SearchResponse = response.json().await.map_err(|e| RetrieverError::MalformedResponse {
            backend: "log index".to_string(),
            reason: e.to_string(),
        })?;

        Ok(parsed.hits.hits.into_iter().map(Self::project).collect())
    }
}
