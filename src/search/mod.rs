//! Hybrid search primitives: semantic similarity, a lightweight lexical
//! scorer, and Reciprocal Rank Fusion (RRF) to combine them.
//!
//! Generalized from the teacher's `SqliteStorage`-coupled hybrid search
//! (which leaned on SQLite FTS5 for the lexical half) to an in-memory
//! corpus, since the code store here is a local file index rather than a
//! database (see `DESIGN.md`). The RRF and HNSW building blocks are kept
//! verbatim.

mod rrf;

pub mod hnsw;

pub use hnsw::{HnswConfig, HnswIndex, HnswResult};
pub use rrf::{reciprocal_rank_fusion, weighted_rrf, RrfConfig};

use std::collections::HashSet;

use crate::embedding::{cosine_similarity, Embedder};
use crate::error::Result;

/// Default similarity threshold for semantic search.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.3;

/// Default number of results to return.
pub const DEFAULT_TOP_K: usize = 10;

/// A search result keyed by an arbitrary `i64` item id (a chunk or file
/// index, assigned by the caller's corpus).
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Item id in the caller's corpus.
    pub item_id: i64,
    /// Combined score (RRF score when both modes ran, else the single
    /// mode's raw score).
    pub score: f64,
    /// Semantic cosine-similarity score, if semantic search ran.
    pub semantic_score: Option<f32>,
    /// Lexical overlap score, if lexical search ran.
    pub lexical_score: Option<f64>,
}

/// Configuration for hybrid search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Maximum number of results to return.
    pub top_k: usize,
    /// Minimum similarity threshold for semantic results.
    pub similarity_threshold: f32,
    /// RRF k parameter (default 60).
    pub rrf_k: u32,
    /// Whether to include semantic search.
    pub use_semantic: bool,
    /// Whether to include lexical search.
    pub use_lexical: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            rrf_k: 60,
            use_semantic: true,
            use_lexical: true,
        }
    }
}

impl SearchConfig {
    /// Creates a new search config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the top-k limit.
    #[must_use]
    pub const fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Sets the similarity threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Enables or disables semantic search.
    #[must_use]
    pub const fn with_semantic(mut self, enabled: bool) -> Self {
        self.use_semantic = enabled;
        self
    }

    /// Enables or disables lexical search.
    #[must_use]
    pub const fn with_lexical(mut self, enabled: bool) -> Self {
        self.use_lexical = enabled;
        self
    }
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Scores `content` against `query` by normalized term overlap: the
/// fraction of query terms present in the content, weighted by how rare
/// each matched term is in `content`'s own vocabulary (a simplified
/// lexical score standing in for full BM25 now that there is no SQLite
/// FTS5 index to delegate to).
#[must_use]
pub fn lexical_score(query: &str, content: &str) -> f64 {
    let query_terms = tokenize(query);
    if query_terms.is_empty() {
        return 0.0;
    }
    let content_terms = tokenize(content);
    if content_terms.is_empty() {
        return 0.0;
    }
    let matched = query_terms.intersection(&content_terms).count();
    matched as f64 / query_terms.len() as f64
}

/// Scores `embedding` against a query embedding via cosine similarity.
#[must_use]
pub fn semantic_score(query_embedding: &[f32], embedding: &[f32]) -> f32 {
    cosine_similarity(query_embedding, embedding)
}

/// Runs hybrid search over an in-memory corpus: `items` is
/// `(item_id, content, embedding)`. Semantic and lexical rankings are
/// fused with RRF when both are enabled.
///
/// # Errors
///
/// Returns an error if the query embedding cannot be computed.
pub fn hybrid_search(
    items: &[(i64, String, Vec<f32>)],
    embedder: &dyn Embedder,
    query: &str,
    config: &SearchConfig,
) -> Result<Vec<SearchResult>> {
    let mut semantic_results: Vec<(i64, f32)> = Vec::new();
    let mut lexical_results: Vec<(i64, f64)> = Vec::new();

    if config.use_semantic {
        let query_embedding = embedder.embed(query)?;
        semantic_results = items
            .iter()
            .map(|(id, _, embedding)| (*id, semantic_score(&query_embedding, embedding)))
            .filter(|(_, score)| *score >= config.similarity_threshold)
            .collect();
        semantic_results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        semantic_results.truncate(config.top_k * 2);
    }

    if config.use_lexical {
        lexical_results = items
            .iter()
            .map(|(id, content, _)| (*id, lexical_score(query, content)))
            .filter(|(_, score)| *score > 0.0)
            .collect();
        lexical_results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        lexical_results.truncate(config.top_k * 2);
    }

    if !config.use_semantic {
        return Ok(lexical_results
            .into_iter()
            .take(config.top_k)
            .map(|(item_id, score)| SearchResult {
                item_id,
                score,
                semantic_score: None,
                lexical_score: Some(score),
            })
            .collect());
    }

    if !config.use_lexical {
        return Ok(semantic_results
            .into_iter()
            .take(config.top_k)
            .map(|(item_id, score)| SearchResult {
                item_id,
                score: f64::from(score),
                semantic_score: Some(score),
                lexical_score: None,
            })
            .collect());
    }

    let rrf_config = RrfConfig::new(config.rrf_k);
    let semantic_ranked: Vec<i64> = semantic_results.iter().map(|(id, _)| *id).collect();
    let lexical_ranked: Vec<i64> = lexical_results.iter().map(|(id, _)| *id).collect();
    let fused = reciprocal_rank_fusion(&[&semantic_ranked, &lexical_ranked], &rrf_config);

    let semantic_map: std::collections::HashMap<i64, f32> = semantic_results.into_iter().collect();
    let lexical_map: std::collections::HashMap<i64, f64> = lexical_results.into_iter().collect();

    Ok(fused
        .into_iter()
        .take(config.top_k)
        .map(|(item_id, score)| SearchResult {
            item_id,
            score,
            semantic_score: semantic_map.get(&item_id).copied(),
            lexical_score: lexical_map.get(&item_id).copied(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{FallbackEmbedder, DEFAULT_DIMENSIONS};

    #[test]
    fn lexical_score_full_overlap_is_one() {
        assert!((lexical_score("rust error", "rust error handling") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn lexical_score_no_overlap_is_zero() {
        assert_eq!(lexical_score("rust error", "python warning"), 0.0);
    }

    #[test]
    fn hybrid_search_lexical_only_finds_match() {
        let embedder = FallbackEmbedder::new(DEFAULT_DIMENSIONS);
        let items = vec![
            (1, "fn main() { panic!(\"boom\") }".to_string(), embedder.embed("fn main").unwrap()),
            (2, "struct Foo;".to_string(), embedder.embed("struct Foo").unwrap()),
        ];
        let config = SearchConfig::new().with_semantic(false).with_lexical(true);
        let results = hybrid_search(&items, &embedder, "panic boom", &config).unwrap();
        assert_eq!(results[0].item_id, 1);
    }

    #[test]
    fn hybrid_search_empty_corpus_is_empty() {
        let embedder = FallbackEmbedder::new(DEFAULT_DIMENSIONS);
        let items: Vec<(i64, String, Vec<f32>)> = Vec::new();
        let config = SearchConfig::new();
        let results = hybrid_search(&items, &embedder, "anything", &config).unwrap();
        assert!(results.is_empty());
    }
}
