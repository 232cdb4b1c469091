//! Log-summarization stage.
//!
//! Grounded on `log_summarizer.py`'s `LogSummary` structured-output schema
//! and its order-preserving stack-trace dedup (`list(dict.fromkeys(...))`),
//! applied here as a `Vec` dedup keeping first occurrence. Supplemental:
//! the distilled spec does not mention log summarization, but the original
//! source carries it as a standalone stage, so it is carried forward here.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::{Error, LlmError, Result};
use crate::llm::client::{CompletionRequest, LlmClient};
use crate::llm::config::Role;
use crate::llm::prompts::LOG_SUMMARIZER_SYSTEM_PROMPT;

/// Structured summary of a batch of log lines.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogSummary {
    /// A short prose summary of what the logs show.
    pub summary: String,
    /// Notable discrete events called out by the model.
    #[serde(default)]
    pub key_events: Vec<String>,
    /// Count of error-level lines observed.
    #[serde(default)]
    pub error_count: u32,
    /// Count of warning-level lines observed.
    #[serde(default)]
    pub warning_count: u32,
    /// Distinct stack traces found in the logs, in first-seen order.
    #[serde(default)]
    pub stack_traces: Vec<String>,
}

/// Summarizes batches of raw log lines into a [`LogSummary`].
pub struct LogSummarizer<'a> {
    llm: &'a dyn LlmClient,
}

impl<'a> LogSummarizer<'a> {
    /// Builds a summarizer against `llm`.
    #[must_use]
    pub fn new(llm: &'a dyn LlmClient) -> Self {
        Self { llm }
    }

    /// Summarizes `logs` (joined with newlines, mirroring the Python
    /// source's `"\n".join(logs)`), deduplicating `stack_traces` while
    /// preserving first-seen order.
    pub async fn summarize(&self, logs: &[String]) -> Result<LogSummary> {
        let request = CompletionRequest {
            role: Role::LogSummarizer,
            system_prompt: LOG_SUMMARIZER_SYSTEM_PROMPT,
            user_prompt: logs.join("\n"),
        };
        let raw = self.llm.complete(request).await?;
        let json = extract_json_object(&raw).unwrap_or(&raw);
        let mut parsed = serde_json::from_str::<LogSummary>(json).map_err(|source| {
            Error::Llm(LlmError::MalformedOutput {
                role: Role::LogSummarizer.key().to_string(),
                reason: source.to_string(),
            })
        })?;
        dedup_preserve_order(&mut parsed.stack_traces);
        Ok(parsed)
    }
}

fn dedup_preserve_order(items: &mut Vec<String>) {
    let mut seen = HashSet::new();
    items.retain(|item| seen.insert(item.clone()));
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end >= start).then(|| &raw[start..=end])
}
