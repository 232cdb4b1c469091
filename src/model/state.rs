//! Per-conversation pipeline state threaded through the engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::document::Document;

/// Default attempt budget for both rewrite and regenerate counters.
pub const DEFAULT_BUDGET: u8 = 3;

/// Cooperative cancellation flag checked at every suspension point.
///
/// A `tokio_util::sync::CancellationToken`-equivalent kept dependency-free,
/// following the teacher's preference for minimal dependencies.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a fresh, not-yet-cancelled flag.
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Requests cancellation; observed by any clone of this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// `true` once [`CancelFlag::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Per-conversation state threaded through every `PipelineEngine` transition.
#[derive(Debug, Clone)]
pub struct PipelineState {
    /// Identifier of the originating chat/conversation.
    pub chat_id: String,
    /// The current working question (mutated by rewrites).
    pub question: String,
    /// Remaining question-rewrite attempts.
    pub rewrite_budget: u8,
    /// Remaining answer-regeneration attempts.
    pub regenerate_budget: u8,
    /// Documents retained after relevance grading (logs + docstore).
    pub documents: Vec<Document>,
    /// Documents retained after relevance grading (code).
    pub code_docs: Vec<Document>,
    /// Text extracted from `documents` that looks like a stack trace,
    /// populated after grading and fed to both the code retriever and the
    /// answerer.
    pub stack_traces: Vec<String>,
    /// The latest generated answer, if any.
    pub generation: Option<String>,
    /// Cooperative cancellation flag, checked at suspension points.
    pub cancel: CancelFlag,
}

impl PipelineState {
    /// Starts a fresh pipeline run for `question` on `chat_id`, with the
    /// default rewrite/regenerate budgets.
    #[must_use]
    pub fn new(chat_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            question: question.into(),
            rewrite_budget: DEFAULT_BUDGET,
            regenerate_budget: DEFAULT_BUDGET,
            documents: Vec::new(),
            code_docs: Vec::new(),
            stack_traces: Vec::new(),
            generation: None,
            cancel: CancelFlag::new(),
        }
    }

    /// All retained documents (logs, docstore, and code), in retrieval order.
    #[must_use]
    pub fn all_documents(&self) -> Vec<&Document> {
        self.documents.iter().chain(self.code_docs.iter()).collect()
    }

    /// `true` when no documents survived relevance grading.
    #[must_use]
    pub fn has_no_evidence(&self) -> bool {
        self.documents.is_empty() && self.code_docs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::document::Source;

    #[test]
    fn new_seeds_default_budgets() {
        let state = PipelineState::new("chat-1", "why did it fail?");
        assert_eq!(state.rewrite_budget, DEFAULT_BUDGET);
        assert_eq!(state.regenerate_budget, DEFAULT_BUDGET);
        assert!(state.has_no_evidence());
    }

    #[test]
    fn has_no_evidence_false_once_documents_present() {
        let mut state = PipelineState::new("chat-1", "q");
        state.documents.push(Document::new("log line", Source::Logs));
        assert!(!state.has_no_evidence());
        assert_eq!(state.all_documents().len(), 1);
    }

    #[test]
    fn cancel_flag_observed_across_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }
}
