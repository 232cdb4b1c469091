//! Per-document relevance grading.
//!
//! Grounded on `opensearch_retrieval_grader.py`'s binary `yes`/`no` contract,
//! fanned out one LLM call per document via [`tokio::task::JoinSet`] —
//! mirroring the teacher's `rayon` par-iter fan-out in
//! `chunking/parallel.rs`, generalized to the async/IO-bound case. Documents
//! are owned (cloned) before spawning so each task is `'static`.

use tokio::task::JoinSet;

use crate::error::Result;
use crate::llm::client::{CompletionRequest, LlmClient};
use crate::llm::config::Role;
use crate::llm::prompts::RETRIEVAL_GRADER_SYSTEM_PROMPT;
use crate::model::{Document, GradeVerdict};

/// Grades retrieved documents for relevance to a question, one LLM call
/// per document, in parallel.
pub struct RelevanceGrader<L> {
    llm: std::sync::Arc<L>,
}

impl<L> RelevanceGrader<L>
where
    L: LlmClient + 'static,
{
    /// Builds a grader against a shared, `'static` LLM client.
    #[must_use]
    pub fn new(llm: std::sync::Arc<L>) -> Self {
        Self { llm }
    }

    async fn grade_one(llm: std::sync::Arc<L>, question: String, content: String) -> GradeVerdict {
        let request = CompletionRequest {
            role: Role::RetrievalGrader,
            system_prompt: RETRIEVAL_GRADER_SYSTEM_PROMPT,
            user_prompt: format!("Retrieved document:\n\n{content}\n\nUser question: {question}"),
        };
        match llm.complete(request).await {
            Ok(raw) => GradeVerdict::parse(&raw),
            Err(_) => GradeVerdict::No,
        }
    }

    /// Grades every document in `documents` concurrently, returning only
    /// those graded relevant, preserving their original order. A per-call
    /// failure (timeout, backend error) is treated as `No` rather than
    /// aborting the whole batch.
    pub async fn filter_relevant(&self, question: &str, documents: Vec<Document>) -> Result<Vec<Document>> {
        let mut set = JoinSet::new();
        for (index, doc) in documents.iter().enumerate() {
            let llm = std::sync::Arc::clone(&self.llm);
            let question = question.to_string();
            let content = doc.content.clone();
            set.spawn(async move { (index, Self::grade_one(llm, question, content).await) });
        }

        let mut verdicts = vec![GradeVerdict::No; documents.len()];
        while let Some(joined) = set.join_next().await {
            if let Ok((index, verdict)) = joined {
                verdicts[index] = verdict;
            }
        }

        Ok(documents
            .into_iter()
            .zip(verdicts)
            .filter(|(_, verdict)| verdict.is_yes())
            .map(|(doc, _)| doc)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::fake::ScriptedLlm;
    use crate::model::Source;

    #[tokio::test]
    async fn keeps_only_relevant_documents_in_order() {
        let llm = std::sync::Arc::new(ScriptedLlm::new(vec!["no", "yes", "yes"]));
        let grader = RelevanceGrader::new(llm);
        let docs = vec![
            Document::new("a", Source::Logs),
            Document::new("b", Source::Logs),
            Document::new("c", Source::Logs),
        ];
        let kept = grader.filter_relevant("why?", docs).await.expect("grade");
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].content, "b");
        assert_eq!(kept[1].content, "c");
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let llm = std::sync::Arc::new(ScriptedLlm::new(vec![]));
        let grader = RelevanceGrader::new(llm);
        let kept = grader.filter_relevant("why?", Vec::new()).await.expect("grade");
        assert!(kept.is_empty());
    }
}
