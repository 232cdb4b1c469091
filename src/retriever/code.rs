//! Local code-store retriever.
//!
//! Grounded on `code_base_retriever.py`: when the question looks like a
//! stack trace (`"stack:"` or `" at "` substrings), filenames are extracted
//! from it and the index is filtered to exactly those files instead of run
//! through semantic search (generalized from the source's JS-only
//! `r'/([^/]+\.js)'` to a configurable extension set). Otherwise the
//! question is run as a normal hybrid query against the local index.

use std::collections::BTreeSet;
use std::path::PathBuf;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::embedding::{create_embedder, Embedder};
use crate::error::{ChunkingError, Result};
use crate::model::{Document, Source};

use super::code_index::{CodeIndex, CodeIndexConfig, IndexedChunk};
use super::Retriever;

/// Configuration for the local code store, mirroring the code store's
/// `{path, file_pattern, file_extensions, language, embedding_model, k}`
/// fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeRetrieverConfig {
    /// Root directory to index.
    pub path: PathBuf,
    /// Glob pattern matched against each file's relative path.
    pub file_pattern: String,
    /// Extensions to include (without the leading dot).
    pub file_extensions: Vec<String>,
    /// Informational language hint.
    pub language: Option<String>,
    /// Informational embedding-model name (the crate ships a single
    /// embedder implementation, selected by build feature, not by name).
    pub embedding_model: String,
    /// Default number of results returned for a semantic query.
    pub k: usize,
}

impl Default for CodeRetrieverConfig {
    fn default() -> Self {
        let index_defaults = CodeIndexConfig::default();
        Self {
            path: index_defaults.path,
            file_pattern: index_defaults.file_pattern,
            file_extensions: index_defaults.file_extensions,
            language: index_defaults.language,
            embedding_model: "all-MiniLM-L6-v2".to_string(),
            k: index_defaults.k,
        }
    }
}

impl CodeRetrieverConfig {
    fn to_index_config(&self) -> CodeIndexConfig {
        CodeIndexConfig {
            path: self.path.clone(),
            file_pattern: self.file_pattern.clone(),
            file_extensions: self.file_extensions.clone(),
            language: self.language.clone(),
            k: self.k,
        }
    }
}

/// Retriever over a local code file tree.
pub struct CodeRetriever {
    index: CodeIndex,
    embedder: Box<dyn Embedder>,
    k: usize,
    stack_trace_pattern: Regex,
}

impl CodeRetriever {
    /// Builds the index from `config` (walking and embedding every matched
    /// file) and compiles the stack-trace filename pattern from
    /// `config.file_extensions`.
    pub fn build(config: &CodeRetrieverConfig) -> Result<Self> {
        let embedder = create_embedder()?;
        let index = CodeIndex::build(&config.to_index_config(), embedder.as_ref())?;
        let stack_trace_pattern = compile_filename_pattern(&config.file_extensions)?;
        Ok(Self { index, embedder, k: config.k, stack_trace_pattern })
    }

    fn looks_like_stack_trace(question: &str) -> bool {
        question.contains("stack:") || question.contains(" at ")
    }

    fn extract_filenames(&self, question: &str) -> BTreeSet<String> {
        self.stack_trace_pattern
            .captures_iter(question)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn project(chunk: &IndexedChunk) -> Document {
        Document::new(chunk.content.clone(), Source::Code)
            .with_meta("filename", chunk.filename.clone())
            .with_meta("path", chunk.path.clone())
    }
}

#[async_trait]
impl Retriever for CodeRetriever {
    async fn search(&self, question: &str) -> Result<Vec<Document>> {
        if Self::looks_like_stack_trace(question) {
            let filenames: Vec<String> = self.extract_filenames(question).into_iter().collect();
            if !filenames.is_empty() {
                tracing::debug!(?filenames, "code store: filename-filtered stack-trace lookup");
                return Ok(self.index.by_filenames(&filenames).into_iter().map(Self::project).collect());
            }
        }

        let results = self.index.search(question, self.embedder.as_ref(), self.k)?;
        Ok(results.into_iter().map(Self::project).collect())
    }
}

/// Compiles a regex matching `/<filename>.<ext>` for each extension in
/// `extensions`, generalizing the source's JS-only filename pattern.
fn compile_filename_pattern(extensions: &[String]) -> Result<Regex> {
    let alternation = if extensions.is_empty() {
        "[A-Za-z0-9_.-]+".to_string()
    } else {
        extensions
            .iter()
            .map(|e| regex::escape(e))
            .collect::<Vec<_>>()
            .join("|")
    };
    let pattern = format!(r"/([^/\s]+\.(?:{alternation}))");
    Regex::new(&pattern).map_err(|e| {
        ChunkingError::InvalidConfig {
            reason: format!("invalid stack-trace filename pattern: {e}"),
        }
        .into()
    })
}
