//! Converts a natural-language question into a [`StructuredQuery`] for the
//! log index.

pub mod examples;

use std::fmt::Write as _;

use crate::error::Error;
use crate::llm::client::{CompletionRequest, LlmClient};
use crate::llm::config::Role;
use crate::llm::prompts::QUERY_CONSTRUCTOR_SYSTEM_PROMPT;
use crate::model::StructuredQuery;

/// Constructs [`StructuredQuery`]s from natural-language questions via an
/// LLM call, temperature pinned to 0.
pub struct QueryConstructor<'a> {
    llm: &'a dyn LlmClient,
}

impl<'a> QueryConstructor<'a> {
    /// Builds a constructor against the given LLM client.
    #[must_use]
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    fn build_user_prompt(question: &str) -> String {
        let mut prompt = String::new();
        for example in examples::all() {
            let rendered = serde_json::to_string_pretty(&example.query).unwrap_or_default();
            let _ = writeln!(
                prompt,
                "User: {}\nStructured query:\n{}\n",
                example.question, rendered
            );
        }
        let _ = write!(prompt, "User: {question}\nStructured query:\n");
        prompt
    }

    /// Constructs a [`StructuredQuery`] for `question`.
    ///
    /// On any LLM or parse failure, falls back to
    /// [`StructuredQuery::fallback`] (free text, no filter) rather than
    /// propagating an error.
    pub async fn construct(&self, question: &str) -> StructuredQuery {
        let request = CompletionRequest {
            role: Role::OpensearchRetriever,
            system_prompt: QUERY_CONSTRUCTOR_SYSTEM_PROMPT,
            user_prompt: Self::build_user_prompt(question),
        };
        match self.llm.complete(request).await {
            Ok(raw) => Self::parse(&raw).unwrap_or_else(|| StructuredQuery::fallback(question)),
            Err(_) => StructuredQuery::fallback(question),
        }
    }

    fn parse(raw: &str) -> Option<StructuredQuery> {
        let trimmed = extract_json_object(raw)?;
        serde_json::from_str(trimmed).ok()
    }
}

/// Extracts the first top-level `{...}` span from `raw`, tolerating stray
/// prose or markdown code fences around the JSON body.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::fake::ScriptedLlm;
    use crate::model::{Comparison as Cmp, FilterExpr as Expr};

    #[tokio::test]
    async fn parses_well_formed_structured_query() {
        let query = StructuredQuery {
            text: Some("timeout".to_string()),
            filter: Expr::Comparison(Cmp::eq("level", "error")),
        };
        let raw = serde_json::to_string(&query).unwrap();
        let llm = ScriptedLlm::new(vec![&raw]);
        let constructor = QueryConstructor::new(&llm);
        let result = constructor.construct("errors with timeout").await;
        assert_eq!(result, query);
    }

    #[tokio::test]
    async fn falls_back_on_malformed_output() {
        let llm = ScriptedLlm::new(vec!["not json at all"]);
        let constructor = QueryConstructor::new(&llm);
        let result = constructor.construct("what broke?").await;
        assert_eq!(result, StructuredQuery::fallback("what broke?"));
    }

    #[test]
    fn extracts_json_from_surrounding_prose() {
        let raw = "Sure, here you go:\n```json\n{\"text\":null,\"filter\":{\"kind\":\"and\",\"children\":[]}}\n```";
        assert!(extract_json_object(raw).is_some());
    }
}
