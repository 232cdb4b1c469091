//! Answer-addresses-question grading.
//!
//! Grounded on `answer_grader.py`'s binary `yes`/`no` contract.

use crate::error::Result;
use crate::llm::client::{CompletionRequest, LlmClient};
use crate::llm::config::Role;
use crate::llm::prompts::ANSWER_GRADER_SYSTEM_PROMPT;
use crate::model::GradeVerdict;

/// Grades whether a generated answer addresses the original question.
pub struct AnswerGrader<'a> {
    llm: &'a dyn LlmClient,
}

impl<'a> AnswerGrader<'a> {
    /// Builds a grader against `llm`.
    #[must_use]
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    /// Grades `generation` against `question`. Any LLM or parse failure is
    /// treated as `No`, matching [`GradeVerdict::parse`]'s conservative
    /// default.
    pub async fn grade(&self, question: &str, generation: &str) -> Result<GradeVerdict> {
        let request = CompletionRequest {
            role: Role::AnswerGrader,
            system_prompt: ANSWER_GRADER_SYSTEM_PROMPT,
            user_prompt: format!("User question:\n\n{question}\n\nLLM generation: {generation}"),
        };
        Ok(match self.llm.complete(request).await {
            Ok(raw) => GradeVerdict::parse(&raw),
            Err(_) => GradeVerdict::No,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::fake::ScriptedLlm;

    #[tokio::test]
    async fn parses_yes() {
        let llm = ScriptedLlm::new(vec!["yes"]);
        let grader = AnswerGrader::new(&llm);
        let verdict = grader.grade("why?", "because X").await.expect("grade");
        assert_eq!(verdict, GradeVerdict::Yes);
    }

    #[tokio::test]
    async fn non_yes_text_is_no() {
        let llm = ScriptedLlm::new(vec!["I'm not sure"]);
        let grader = AnswerGrader::new(&llm);
        let verdict = grader.grade("why?", "because X").await.expect("grade");
        assert_eq!(verdict, GradeVerdict::No);
    }
}
