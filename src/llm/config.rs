//! Per-role LLM endpoint configuration.

use serde::{Deserialize, Serialize};

/// The nine LLM roles, each independently configurable
/// (own base URL, model, temperature, context window, timeout).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Generates the final answer shown to the user.
    Answerer,
    /// Condenses a batch of raw log documents into a short digest.
    LogSummarizer,
    /// Classifies document-store search intent (`mongodb_query_constructor`).
    Retriever,
    /// Grades document relevance (`RelevanceGrader`).
    RetrievalGrader,
    /// Rewrites the working question (`QuestionRewriter`).
    QuestionRewriter,
    /// Grades whether the generation is grounded in retrieved evidence.
    HallucinationGrader,
    /// Grades whether the generation addresses the question.
    AnswerGrader,
    /// Constructs the document-store structured query.
    MongodbRetriever,
    /// Constructs the log-index structured query.
    OpensearchRetriever,
}

impl Role {
    /// All roles.
    pub const ALL: [Self; 9] = [
        Self::Answerer,
        Self::LogSummarizer,
        Self::Retriever,
        Self::RetrievalGrader,
        Self::QuestionRewriter,
        Self::HallucinationGrader,
        Self::AnswerGrader,
        Self::MongodbRetriever,
        Self::OpensearchRetriever,
    ];

    /// The config-file/env-var key stem for this role, e.g. `answerer` in
    /// `answerer_base_url` / `RARP_ANSWERER_BASE_URL`.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Answerer => "answerer",
            Self::LogSummarizer => "log_summarizer",
            Self::Retriever => "retriever",
            Self::RetrievalGrader => "retrieval_grader",
            Self::QuestionRewriter => "question_rewriter",
            Self::HallucinationGrader => "hallucination_grader",
            Self::AnswerGrader => "answer_grader",
            Self::MongodbRetriever => "mongodb_retriever",
            Self::OpensearchRetriever => "opensearch_retriever",
        }
    }
}

/// Endpoint configuration for a single role.
///
/// Field names and defaults follow `config.py`'s per-role `Settings`
/// (`answerer_ollama_base_url`, `..._model`, `..._temperature`, `..._num_ctx`,
/// `..._timeout`), generalized to an OpenAI-compatible endpoint since Ollama
/// serves one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRoleConfig {
    /// Base URL of the OpenAI-compatible (e.g. Ollama) endpoint.
    pub base_url: String,
    /// Model name served at `base_url`.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Context window size, in tokens (Ollama's `num_ctx`).
    pub num_ctx: u32,
    /// Upper bound on generated tokens, if the backend honors it.
    pub max_tokens: Option<u32>,
    /// Per-request timeout, in seconds.
    pub timeout_secs: u64,
}

impl LlmRoleConfig {
    /// A role config pointing at a local Ollama instance, with the
    /// `num_ctx`/temperature defaults `config.py` pins for `role`.
    #[must_use]
    pub fn default_for(role: Role) -> Self {
        let (num_ctx, temperature, max_tokens) = match role {
            Role::Answerer => (65536, 0.0, None),
            Role::LogSummarizer => (8192, 0.0, Some(1024)),
            Role::Retriever | Role::OpensearchRetriever => (8192, 0.0, None),
            Role::RetrievalGrader => (8192, 0.0, None),
            Role::QuestionRewriter => (8192, 1.0, None),
            Role::HallucinationGrader | Role::AnswerGrader => (8192, 0.0, None),
            Role::MongodbRetriever => (8192, 0.0, None),
        };
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            model: "llama3.1".to_string(),
            temperature,
            num_ctx,
            max_tokens,
            timeout_secs: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answerer_gets_largest_context_window() {
        let answerer = LlmRoleConfig::default_for(Role::Answerer);
        let rewriter = LlmRoleConfig::default_for(Role::QuestionRewriter);
        assert!(answerer.num_ctx > rewriter.num_ctx);
    }

    #[test]
    fn question_rewriter_defaults_to_temperature_one() {
        assert_eq!(LlmRoleConfig::default_for(Role::QuestionRewriter).temperature, 1.0);
    }

    #[test]
    fn all_roles_have_distinct_keys() {
        let keys: std::collections::HashSet<_> = Role::ALL.iter().map(|r| r.key()).collect();
        assert_eq!(keys.len(), Role::ALL.len());
    }
}
