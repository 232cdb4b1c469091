//! Answer-is-grounded-in-evidence grading.
//!
//! Grounded on `hallucination_grader.py`'s binary `yes`/`no` contract,
//! decided by a single binary judge (Open Question decision: strictness
//! calibration is left as a deployment knob — temperature or prompt swap —
//! rather than a multi-vote panel).

use crate::error::Result;
use crate::llm::client::{CompletionRequest, LlmClient};
use crate::llm::config::Role;
use crate::llm::prompts::HALLUCINATION_GRADER_SYSTEM_PROMPT;
use crate::model::{Document, GradeVerdict};

/// Grades whether a generated answer is supported by the retrieved evidence.
pub struct GroundingGrader<'a> {
    llm: &'a dyn LlmClient,
}

impl<'a> GroundingGrader<'a> {
    /// Builds a grader against `llm`.
    #[must_use]
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    /// Grades `generation` against the joined content of `documents`. Any
    /// LLM or parse failure is treated as `No`.
    pub async fn grade(&self, generation: &str, documents: &[Document]) -> Result<GradeVerdict> {
        let joined = documents
            .iter()
            .map(|d| d.content.as_str())
            .collect::<Vec<_>>()
            .join("\n---\n");
        let request = CompletionRequest {
            role: Role::HallucinationGrader,
            system_prompt: HALLUCINATION_GRADER_SYSTEM_PROMPT,
            user_prompt: format!("LLM generation to grade:\n{generation}\n\nReference documents:\n{joined}"),
        };
        Ok(match self.llm.complete(request).await {
            Ok(raw) => GradeVerdict::parse(&raw),
            Err(_) => GradeVerdict::No,
        })
    }
}
