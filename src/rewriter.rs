//! Question-rewriting stage.
//!
//! Grounded on `question_rewriter.py`'s structured `{"improved_question":
//! str}` contract (`RewriteQuestion` there). The rewritten question is
//! returned as a plain `String`; budget bookkeeping (decrementing
//! `rewrite_budget`) is the engine's responsibility, not the rewriter's —
//! this keeps the rewriter a pure `question -> question` transform.

use serde::Deserialize;

use crate::error::{Error, LlmError, Result};
use crate::llm::client::{CompletionRequest, LlmClient};
use crate::llm::config::Role;
use crate::llm::prompts::QUESTION_REWRITER_SYSTEM_PROMPT;

#[derive(Debug, Deserialize)]
struct RewriteQuestion {
    improved_question: String,
}

/// Rewrites a working question to improve retrieval recall.
pub struct QuestionRewriter<'a> {
    llm: &'a dyn LlmClient,
}

impl<'a> QuestionRewriter<'a> {
    /// Builds a rewriter against `llm`.
    #[must_use]
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    /// Rewrites `question`, returning the improved question text. Any LLM
    /// failure or malformed response is surfaced as an error rather than
    /// silently falling back, since a failed rewrite still consumes a
    /// budget slot the caller should know about.
    pub async fn rewrite(&self, question: &str) -> Result<String> {
        let request = CompletionRequest {
            role: Role::QuestionRewriter,
            system_prompt: QUESTION_REWRITER_SYSTEM_PROMPT,
            user_prompt: format!("Here is the initial question:\n\n{question}\n\nFormulate an improved question."),
        };
        let raw = self.llm.complete(request).await?;
        let json = extract_json_object(&raw).unwrap_or(&raw);
        serde_json::from_str::<RewriteQuestion>(json)
            .map(|parsed| parsed.improved_question)
            .map_err(|source| {
                Error::Llm(LlmError::MalformedOutput {
                    role: Role::QuestionRewriter.key().to_string(),
                    reason: source.to_string(),
                })
            })
    }
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end >= start).then(|| &raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::fake::ScriptedLlm;

    #[tokio::test]
    async fn parses_improved_question_from_json() {
        let llm = ScriptedLlm::new(vec![r#"{"improved_question": "why did the payment service crash at 10:02?"}"#]);
        let rewriter = QuestionRewriter::new(&llm);
        let improved = rewriter.rewrite("why crash?").await.expect("rewrite");
        assert_eq!(improved, "why did the payment service crash at 10:02?");
    }

    #[tokio::test]
    async fn tolerates_surrounding_prose_around_json() {
        let llm = ScriptedLlm::new(vec!["Sure, here you go: {\"improved_question\": \"clarified\"} thanks!"]);
        let rewriter = QuestionRewriter::new(&llm);
        let improved = rewriter.rewrite("q").await.expect("rewrite");
        assert_eq!(improved, "clarified");
    }

    #[tokio::test]
    async fn malformed_json_is_an_error() {
        let llm = ScriptedLlm::new(vec!["not json at all"]);
        let rewriter = QuestionRewriter::new(&llm);
        assert!(rewriter.rewrite("q").await.is_err());
    }
}
