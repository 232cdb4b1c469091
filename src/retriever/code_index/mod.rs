//! In-memory vector index over a local code file tree.
//!
//! Built by walking a configured directory, chunking each matched file with
//! [`crate::chunking::code::CodeChunker`], and embedding every chunk via
//! [`crate::embedding::create_embedder`]. Backs [`super::code::CodeRetriever`].

mod glob;

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::chunking::code::CodeChunker;
use crate::chunking::traits::Chunker;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::search::{hybrid_search, SearchConfig};

pub use glob::glob_to_regex;

/// Configuration for building a [`CodeIndex`], mirroring the code store
/// fields `{path, file_pattern, file_extensions, language, embedding_model, k}`.
#[derive(Debug, Clone)]
pub struct CodeIndexConfig {
    /// Root directory to walk.
    pub path: PathBuf,
    /// Glob pattern matched against each file's relative path.
    pub file_pattern: String,
    /// Extensions to include (without the leading dot). Empty means "all".
    pub file_extensions: Vec<String>,
    /// Informational language hint, not currently used to gate chunking.
    pub language: Option<String>,
    /// Default number of results returned by [`CodeIndex::search`].
    pub k: usize,
}

impl Default for CodeIndexConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            file_pattern: "**/*".to_string(),
            file_extensions: vec![
                "rs".to_string(),
                "py".to_string(),
                "js".to_string(),
                "ts".to_string(),
                "go".to_string(),
                "java".to_string(),
            ],
            language: None,
            k: 5,
        }
    }
}

/// One chunk of one indexed source file.
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    /// Id assigned within this index (position in `CodeIndex::chunks`).
    pub chunk_id: i64,
    /// Full file path, as walked.
    pub path: String,
    /// Basename of `path`.
    pub filename: String,
    /// Chunk text content.
    pub content: String,
    /// Embedding of `content`.
    pub embedding: Vec<f32>,
}

/// An in-memory index over a code file tree: chunked content plus
/// embeddings, searchable by [`hybrid_search`].
pub struct CodeIndex {
    chunks: Vec<IndexedChunk>,
}

impl CodeIndex {
    /// Walks `config.path`, chunking and embedding every file that matches
    /// `config.file_pattern` and `config.file_extensions`.
    ///
    /// Files that fail to decode as UTF-8 or fail to chunk are skipped
    /// rather than aborting the whole build.
    pub fn build(config: &CodeIndexConfig, embedder: &dyn Embedder) -> Result<Self> {
        let pattern = glob_to_regex(&config.file_pattern)?;
        let chunker = CodeChunker::new();
        let mut chunks = Vec::new();
        let mut next_id: i64 = 0;

        for entry in WalkDir::new(&config.path)
            .into_iter()
            .filter_map(std::result::Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !extension_matches(path, &config.file_extensions) {
                continue;
            }
            let relative = path.strip_prefix(&config.path).unwrap_or(path);
            if !pattern.is_match(&relative.to_string_lossy()) {
                continue;
            }
            let Ok(content) = crate::io::read_file(path) else {
                continue;
            };
            let Ok(file_chunks) = chunker.chunk(0, &content, None) else {
                continue;
            };
            let filename = path
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_default();
            let path_str = path.to_string_lossy().into_owned();
            for chunk in file_chunks {
                let embedding = embedder.embed(&chunk.content)?;
                chunks.push(IndexedChunk {
                    chunk_id: next_id,
                    path: path_str.clone(),
                    filename: filename.clone(),
                    content: chunk.content,
                    embedding,
                });
                next_id += 1;
            }
        }

        Ok(Self { chunks })
    }

    /// `true` if no files matched during [`CodeIndex::build`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of indexed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Hybrid (semantic + lexical) search over the index.
    pub fn search(&self, query: &str, embedder: &dyn Embedder, k: usize) -> Result<Vec<&IndexedChunk>> {
        let items: Vec<(i64, String, Vec<f32>)> = self
            .chunks
            .iter()
            .map(|c| (c.chunk_id, c.content.clone(), c.embedding.clone()))
            .collect();
        let config = SearchConfig::new().with_top_k(k);
        let results = hybrid_search(&items, embedder, query, &config)?;
        Ok(results
            .into_iter()
            .filter_map(|r| self.chunks.iter().find(|c| c.chunk_id == r.item_id))
            .collect())
    }

    /// Returns every chunk belonging to any file whose basename is in
    /// `filenames`, used by [`super::code::CodeRetriever`]'s stack-trace
    /// resolution path (filename filter, not similarity search).
    #[must_use]
    pub fn by_filenames(&self, filenames: &[String]) -> Vec<&IndexedChunk> {
        self.chunks
            .iter()
            .filter(|c| filenames.iter().any(|f| f == &c.filename))
            .collect()
    }
}

fn extension_matches(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed == ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{FallbackEmbedder, DEFAULT_DIMENSIONS};
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        let mut f = std::fs::File::create(&path).expect("create file");
        f.write_all(content.as_bytes()).expect("write file");
    }

    #[test]
    fn build_indexes_matching_files_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(dir.path(), "service.rs", "fn handle() { panic!(\"boom\") }");
        write_file(dir.path(), "README.md", "not code");

        let config = CodeIndexConfig {
            path: dir.path().to_path_buf(),
            file_extensions: vec!["rs".to_string()],
            ..CodeIndexConfig::default()
        };
        let embedder = FallbackEmbedder::new(DEFAULT_DIMENSIONS);
        let index = CodeIndex::build(&config, &embedder).expect("build index");
        assert!(!index.is_empty());
        assert!(index
            .by_filenames(&["service.rs".to_string()])
            .iter()
            .all(|c| c.filename == "service.rs"));
        assert!(index.by_filenames(&["README.md".to_string()]).is_empty());
    }

    #[test]
    fn search_finds_relevant_chunk() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(dir.path(), "a.rs", "fn alpha() { /* unrelated */ }");
        write_file(dir.path(), "b.rs", "fn handle_timeout() { retry_with_backoff(); }");

        let config = CodeIndexConfig {
            path: dir.path().to_path_buf(),
            file_extensions: vec!["rs".to_string()],
            ..CodeIndexConfig::default()
        };
        let embedder = FallbackEmbedder::new(DEFAULT_DIMENSIONS);
        let index = CodeIndex::build(&config, &embedder).expect("build index");
        let results = index.search("timeout backoff", &embedder, 5).expect("search");
        assert!(results.iter().any(|c| c.filename == "b.rs"));
    }
}
