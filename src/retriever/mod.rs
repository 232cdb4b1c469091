//! Retriever layer: the full-text log index, the document store, and the
//! local code store, unified behind a single `search` contract returning
//! [`crate::model::Document`].

pub mod code;
pub mod code_index;
pub mod docstore;
pub mod log;

pub use code::{CodeRetriever, CodeRetrieverConfig};
pub use docstore::{DocumentStoreRetriever, DocumentStoreRetrieverConfig};
pub use log::{LogRetriever, LogRetrieverConfig};

use async_trait::async_trait;

use crate::error::Result;
use crate::model::Document;

/// Common contract implemented by every retriever.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Runs `query` against the backend and returns unified documents.
    async fn search(&self, query: &str) -> Result<Vec<Document>>;
}
