//! Output formatting for CLI commands.
//!
//! Supports text and JSON output formats.

use serde::Serialize;
use std::fmt::Write;

use crate::config::RarpConfig;
use crate::engine::PipelineEngineState;

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output.
    Json,
    /// Newline-delimited JSON (NDJSON) for streaming.
    /// Each record is a single JSON object on its own line.
    Ndjson,
}

impl OutputFormat {
    /// Parses format from string.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "ndjson" | "jsonl" | "stream" => Self::Ndjson,
            _ => Self::Text,
        }
    }

    /// Returns true if this format is a streaming format.
    #[must_use]
    pub const fn is_streaming(&self) -> bool {
        matches!(self, Self::Ndjson)
    }
}

/// Formats the result of a `rarp ask` run.
#[must_use]
pub fn format_ask_result(terminal: PipelineEngineState, generation: Option<&str>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_ask_result_text(terminal, generation),
        OutputFormat::Json | OutputFormat::Ndjson => {
            #[derive(Serialize)]
            struct AskResult<'a> {
                terminal_state: &'static str,
                generation: Option<&'a str>,
            }
            format_json(&AskResult { terminal_state: terminal_label(terminal), generation })
        }
    }
}

fn format_ask_result_text(terminal: PipelineEngineState, generation: Option<&str>) -> String {
    match terminal {
        PipelineEngineState::Done => generation.unwrap_or_default().to_string(),
        PipelineEngineState::GiveUp => {
            "Unable to produce a satisfactory answer within the configured retry budget.\n".to_string()
        }
        other => format!("Pipeline stopped in unexpected state: {}\n", terminal_label(other)),
    }
}

const fn terminal_label(state: PipelineEngineState) -> &'static str {
    match state {
        PipelineEngineState::Retrieve => "RETRIEVE",
        PipelineEngineState::GradeDocs => "GRADE_DOCS",
        PipelineEngineState::Rewrite => "REWRITE",
        PipelineEngineState::Generate => "GENERATE",
        PipelineEngineState::GradeAnswer => "GRADE_ANSWER",
        PipelineEngineState::Done => "DONE",
        PipelineEngineState::GiveUp => "GIVE_UP",
    }
}

/// Formats the resolved configuration for `rarp config check`.
#[must_use]
pub fn format_config_check(config: &RarpConfig, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_config_check_text(config),
        OutputFormat::Json | OutputFormat::Ndjson => format_json(config),
    }
}

fn format_config_check_text(config: &RarpConfig) -> String {
    let mut output = String::new();
    output.push_str("RARP configuration\n");
    output.push_str("===================\n\n");
    let _ = writeln!(
        output,
        "  Chat transport token: {}",
        if config.chat_transport_token.as_deref().is_some_and(|t| !t.is_empty()) { "set" } else { "not set" }
    );
    let _ = writeln!(output, "  Log index:            {}", config.log_index.base_url());
    let _ = writeln!(output, "  Document store:       {}", config.document_store.hosts.join(","));
    let _ = writeln!(output, "  Document collections: {}", config.document_store.collections.len());
    let _ = writeln!(output, "  Code store path:      {}", config.code_store.path.display());
    let _ = writeln!(output, "  Debug:                {}", config.debug);
    let _ = writeln!(output, "  Log level:            {}", config.log_level);
    output
}

/// Formats a `FilterTranslator` debug run (`rarp translate-filter`).
#[must_use]
pub fn format_filter_translation(translated: &serde_json::Value, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => serde_json::to_string_pretty(translated).unwrap_or_else(|_| "{}".to_string()),
        OutputFormat::Json | OutputFormat::Ndjson => format_json(translated),
    }
}

/// Formats a value as JSON.
fn format_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Formats an error for output.
///
/// When format is JSON, returns a structured error object.
/// When format is Text, returns the error message string.
#[must_use]
pub fn format_error(error: &crate::Error, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => error.to_string(),
        OutputFormat::Json | OutputFormat::Ndjson => {
            let (error_type, suggestion) = error_details(error);
            let json = serde_json::json!({
                "success": false,
                "error": {
                    "type": error_type,
                    "message": error.to_string(),
                    "suggestion": suggestion
                }
            });
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

/// Extracts error type and recovery suggestion from an error.
fn error_details(error: &crate::Error) -> (&'static str, Option<&'static str>) {
    use crate::error::{ConfigError, LlmError, PipelineError, RetrieverError, TransportError};

    match error {
        crate::Error::Retriever(e) => match e {
            RetrieverError::BackendUnavailable { .. } => ("BackendUnavailable", Some("Check the backend is reachable and configured correctly")),
            RetrieverError::MalformedResponse { .. } => ("MalformedResponse", None),
            RetrieverError::Timeout { .. } => ("RetrieverTimeout", Some("Increase the backend's configured timeout")),
            RetrieverError::UnknownCollection { .. } => ("UnknownCollection", Some("Check document_store.collections in the config file")),
        },
        crate::Error::Llm(e) => match e {
            LlmError::UnknownRole { .. } => ("UnknownLlmRole", None),
            LlmError::RequestBuild { .. } => ("LlmRequestBuild", None),
            LlmError::Backend { .. } => ("LlmBackend", Some("Check the LLM endpoint is reachable")),
            LlmError::Timeout { .. } => ("LlmTimeout", Some("Increase the role's configured timeout")),
            LlmError::EmptyResponse { .. } => ("LlmEmptyResponse", None),
            LlmError::MalformedOutput { .. } => ("LlmMalformedOutput", None),
        },
        crate::Error::Transport(e) => match e {
            TransportError::SendFailed { .. } => ("TransportSendFailed", None),
            TransportError::MessageNotFound { .. } => ("TransportMessageNotFound", None),
        },
        crate::Error::Config(e) => match e {
            ConfigError::ReadFailed { .. } => ("ConfigReadFailed", Some("Check the config file path exists and is readable")),
            ConfigError::ParseFailed { .. } => ("ConfigParseFailed", Some("Check the config file is valid TOML")),
            ConfigError::MissingField { .. } => ("ConfigMissingField", None),
            ConfigError::InvalidValue { .. } => ("ConfigInvalidValue", None),
        },
        crate::Error::Pipeline(e) => match e {
            PipelineError::TransitionLimitExceeded { .. } => ("TransitionLimitExceeded", Some("Check rewrite/regenerate budgets for a misconfiguration")),
            PipelineError::UndefinedTransition { .. } => ("UndefinedTransition", None),
        },
        crate::Error::Chunking(_) => ("ChunkingError", None),
        crate::Error::Io(_) => ("IoError", Some("Verify the file path exists")),
        crate::Error::Search(_) => ("SearchError", None),
    }
}
