//! Final answer-generation stage.
//!
//! Grounded on `answerer.py`'s prompt template (`{question, context,
//! stack_trace, code_context}` fed to a plain string completion) and its
//! dual `ainvoke`/`astream` methods, generalized here to [`LlmClient::complete`]
//! and [`LlmClient::complete_stream`] respectively. The Python source's
//! debug-file tooling (`_debug_prompt`, `parse_debug_file`, module `main`)
//! is out of scope: it is a development aid, not part of the answerer's
//! functional contract.

use futures_util::{Stream, StreamExt};

use crate::error::Result;
use crate::llm::client::{CompletionRequest, LlmClient};
use crate::llm::config::Role;
use crate::llm::prompts::ANSWERER_SYSTEM_PROMPT;
use crate::model::Document;

/// Generates a final answer from graded documents and any detected stack
/// trace / code context.
pub struct Answerer<'a> {
    llm: &'a dyn LlmClient,
}

impl<'a> Answerer<'a> {
    /// Builds an answerer against `llm`.
    #[must_use]
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    fn user_prompt(question: &str, documents: &[Document], stack_traces: &[String], code_docs: &[Document]) -> String {
        let context = documents.iter().map(|d| d.content.as_str()).collect::<Vec<_>>().join("\n---\n");
        let stack_trace = stack_traces.join("\n");
        let code_context = code_docs.iter().map(|d| d.content.as_str()).collect::<Vec<_>>().join("\n---\n");
        format!(
            "Question:\n{question}\n\nContext:\n{context}\n\nStack trace:\n{stack_trace}\n\nCode context:\n{code_context}"
        )
    }

    /// Generates the full answer text in one call.
    pub async fn generate(
        &self,
        question: &str,
        documents: &[Document],
        stack_traces: &[String],
        code_docs: &[Document],
    ) -> Result<String> {
        let request = CompletionRequest {
            role: Role::Answerer,
            system_prompt: ANSWERER_SYSTEM_PROMPT,
            user_prompt: Self::user_prompt(question, documents, stack_traces, code_docs),
        };
        Ok(self.llm.complete(request).await?)
    }

    /// Streams the answer text incrementally, for transports that can edit
    /// a message in place as tokens arrive.
    pub async fn stream(
        &self,
        question: &str,
        documents: &[Document],
        stack_traces: &[String],
        code_docs: &[Document],
    ) -> Result<impl Stream<Item = Result<String>> + '_> {
        let request = CompletionRequest {
            role: Role::Answerer,
            system_prompt: ANSWERER_SYSTEM_PROMPT,
            user_prompt: Self::user_prompt(question, documents, stack_traces, code_docs),
        };
        let inner = self.llm.complete_stream(request).await?;
        Ok(inner.map(|chunk| chunk.map_err(Into::into)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::fake::ScriptedLlm;
    use crate::model::Source;

    #[tokio::test]
    async fn generate_returns_llm_text() {
        let llm = ScriptedLlm::new(vec!["The payment service crashed due to a null pointer."]);
        let answerer = Answerer::new(&llm);
        let docs = vec![Document::new("NPE at PaymentService.java:42", Source::Code)];
        let answer = answerer.generate("why did it crash?", &docs, &[], &[]).await.expect("generate");
        assert!(answer.contains("crashed"));
    }

    #[tokio::test]
    async fn stream_yields_the_scripted_single_chunk() {
        let llm = ScriptedLlm::new(vec!["streamed answer"]);
        let answerer = Answerer::new(&llm);
        let mut chunks = Vec::new();
        let mut stream = Box::pin(answerer.stream("q", &[], &[], &[]).await.expect("stream"));
        while let Some(chunk) = stream.next().await {
            chunks.push(chunk.expect("chunk"));
        }
        assert_eq!(chunks, vec!["streamed answer".to_string()]);
    }
}
