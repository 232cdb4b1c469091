//! # rarp
//!
//! A retrieval-augmented reasoning pipeline: a conversational assistant that
//! investigates logs, tickets, and code to answer incident questions.
//!
//! A question is run through an explicit state machine — retrieve evidence
//! from a full-text log index, a document store, and a local code index;
//! grade each document for relevance; rewrite the question and retry when
//! nothing relevant surfaces; generate an answer; grade the answer for
//! groundedness and relevance to the question; regenerate, rewrite, or give
//! up within bounded retry budgets. See [`engine`] for the state machine and
//! [`model::state::PipelineState`] for what's threaded through it.
//!
//! ## Modules
//!
//! - [`model`]: `Document`, `StructuredQuery`, `FilterExpr`, `PipelineState`.
//! - [`filter`]: `FilterExpr` → backend search-DSL translation.
//! - [`query_constructor`]: natural language → `StructuredQuery`.
//! - [`retriever`]: log index, document store, and code store retrievers.
//! - [`grading`]: relevance, answer, and grounding graders.
//! - [`rewriter`]: question rewriting when retrieval comes up empty.
//! - [`answerer`]: final answer generation.
//! - [`log_summarizer`]: condenses a batch of log documents into a digest.
//! - [`llm`]: the per-role LLM client.
//! - [`transport`]: chat transport (Telegram, null, and test fakes).
//! - [`engine`]: the pipeline state machine.
//! - [`config`]: configuration loading.
//! - [`cli`]: the `rarp` binary's command surface.
//!
//! Retained from the code-indexing lineage this crate grew from:
//! [`chunking`], [`embedding`], [`search`], [`io`], and [`core`] back the
//! local code store's in-memory index.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![warn(unsafe_code)]

pub mod answerer;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod core;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod filter;
pub mod grading;
pub mod io;
pub mod llm;
pub mod log_summarizer;
pub mod model;
pub mod query_constructor;
pub mod retriever;
pub mod rewriter;
pub mod search;
pub mod transport;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use model::{Document, FilterExpr, PipelineState, Source, StructuredQuery};

// Re-export chunking types (used internally by the code-store index)
pub use chunking::{available_strategies, create_chunker, Chunker, FixedChunker, SemanticChunker};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};

// Re-export embedding types
#[cfg(feature = "fastembed-embeddings")]
pub use embedding::FastEmbedEmbedder;
pub use embedding::{cosine_similarity, create_embedder, Embedder, FallbackEmbedder, DEFAULT_DIMENSIONS};

// Re-export search types
pub use search::{
    hybrid_search, reciprocal_rank_fusion, weighted_rrf, RrfConfig, SearchConfig, SearchResult,
    DEFAULT_SIMILARITY_THRESHOLD, DEFAULT_TOP_K,
};

// Re-export the pipeline engine and its configuration
pub use config::RarpConfig;
pub use engine::{PipelineEngine, PipelineEngineState};
