//! Error types for RARP operations.
//!
//! `thiserror`-derived hierarchy grouped by fault domain: retriever/backend
//! faults, LLM-role faults, chat transport faults, configuration faults,
//! and pipeline-engine faults.

use thiserror::Error;

/// Result type alias for RARP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for RARP operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Retriever-backend errors (log index, document store, code store).
    #[error("retriever error: {0}")]
    Retriever(#[from] RetrieverError),

    /// LLM-role errors (any of the nine configured roles).
    #[error("llm error: {0}")]
    Llm(#[from] LlmError),

    /// Chat transport errors. Never fatal to the pipeline — callers log
    /// and continue rather than propagate.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Configuration errors.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline-engine errors (state-machine invariant violations).
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Internal chunking-strategy errors surfaced while building the code
    /// store's local index (see `retriever::code_index`).
    #[error("chunking error: {0}")]
    Chunking(#[from] ChunkingError),

    /// Internal file I/O errors surfaced while walking/reading the code
    /// store's local file tree.
    #[error("io error: {0}")]
    Io(#[from] IoError),

    /// Internal vector-index errors surfaced while building the code
    /// store's HNSW index (see `retriever::code_index`).
    #[error("search index error: {0}")]
    Search(#[from] SearchError),
}

/// Retriever-specific errors (transient backend faults).
#[derive(Error, Debug)]
pub enum RetrieverError {
    /// The backend HTTP/network call failed or timed out.
    #[error("{backend} request failed: {reason}")]
    BackendUnavailable {
        /// Which backend (`log index`, `document store`, `code store`).
        backend: String,
        /// Underlying failure reason.
        reason: String,
    },

    /// The backend returned a response that could not be parsed into the
    /// expected shape.
    #[error("{backend} returned malformed response: {reason}")]
    MalformedResponse {
        /// Which backend produced the response.
        backend: String,
        /// Parse failure reason.
        reason: String,
    },

    /// A per-request timeout elapsed.
    #[error("{backend} request timed out after {timeout_secs}s")]
    Timeout {
        /// Which backend timed out.
        backend: String,
        /// Configured timeout, in seconds.
        timeout_secs: u64,
    },

    /// An unknown collection was requested from the document store.
    #[error("unknown document store collection: {name}")]
    UnknownCollection {
        /// Requested collection name.
        name: String,
    },
}

/// LLM-role errors. Malformed model output falls back locally; other
/// variants here are the transport-level failures beneath that fallback.
#[derive(Error, Debug)]
pub enum LlmError {
    /// A request was made for a role with no configured client.
    #[error("no client configured for role: {role}")]
    UnknownRole {
        /// Role key (see [`crate::llm::config::Role::key`]).
        role: String,
    },

    /// The chat-completion request could not be constructed.
    #[error("failed to build completion request: {source}")]
    RequestBuild {
        /// Underlying builder error.
        source: String,
    },

    /// The backend call itself failed (connection refused, 5xx, etc).
    #[error("llm backend call failed: {source}")]
    Backend {
        /// Underlying failure reason.
        source: String,
    },

    /// The request exceeded the configured per-role timeout.
    #[error("llm call for role {role} timed out")]
    Timeout {
        /// Role that timed out.
        role: String,
    },

    /// The backend returned no choices / empty content.
    #[error("llm backend returned an empty response for role {role}")]
    EmptyResponse {
        /// Role that received the empty response.
        role: String,
    },

    /// The response could not be parsed into the role's expected structured
    /// output (e.g. a `StructuredQuery` or intent classification).
    #[error("failed to parse {role} output: {reason}")]
    MalformedOutput {
        /// Role whose output failed to parse.
        role: String,
        /// Parse failure reason.
        reason: String,
    },
}

/// Chat transport errors (logged, never fatal).
#[derive(Error, Debug)]
pub enum TransportError {
    /// The send/edit HTTP call failed.
    #[error("transport send failed: {reason}")]
    SendFailed {
        /// Underlying failure reason.
        reason: String,
    },

    /// The chat/message identifier referenced by an edit was not found.
    #[error("message not found for edit: {message_id}")]
    MessageNotFound {
        /// Message identifier that was not found.
        message_id: String,
    },
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {reason}")]
    ReadFailed {
        /// Path to the config file.
        path: String,
        /// Underlying failure reason.
        reason: String,
    },

    /// The config file could not be parsed as TOML.
    #[error("failed to parse config file {path}: {reason}")]
    ParseFailed {
        /// Path to the config file.
        path: String,
        /// Underlying parse failure reason.
        reason: String,
    },

    /// A required field was missing and had no usable default.
    #[error("missing required configuration field: {field}")]
    MissingField {
        /// Dotted field path that was missing.
        field: String,
    },

    /// A field's value failed validation.
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// Dotted field path with the invalid value.
        field: String,
        /// Why the value is invalid.
        reason: String,
    },
}

/// Pipeline-engine errors — state-machine invariant violations, which
/// should be unreachable given a correct transition table but are modeled
/// explicitly rather than panicking.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The transition loop exceeded its hard iteration ceiling.
    #[error("pipeline exceeded {max} transitions without reaching a terminal state")]
    TransitionLimitExceeded {
        /// Configured ceiling.
        max: u32,
    },

    /// A transition function was asked to handle a state/budget combination
    /// it has no rule for.
    #[error("no transition defined from state {state} with rewrite_budget={rewrite_budget}, regenerate_budget={regenerate_budget}")]
    UndefinedTransition {
        /// The state the engine was in.
        state: String,
        /// Remaining rewrite budget at the time.
        rewrite_budget: u8,
        /// Remaining regenerate budget at the time.
        regenerate_budget: u8,
    },
}

/// Chunking-strategy errors, internal to `retriever::code_index`'s use of
/// the kept `chunking::*` machinery.
#[derive(Error, Debug)]
pub enum ChunkingError {
    /// A chunking strategy was given invalid configuration.
    #[error("invalid chunking configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration is invalid.
        reason: String,
    },

    /// A single chunk exceeded the configured maximum size.
    #[error("chunk size {size} exceeds maximum {max}")]
    ChunkTooLarge {
        /// Size of the offending chunk.
        size: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Overlap was configured greater than or equal to the chunk size.
    #[error("overlap {overlap} must be smaller than chunk size {size}")]
    OverlapTooLarge {
        /// Configured overlap.
        overlap: usize,
        /// Configured chunk size.
        size: usize,
    },

    /// An unrecognized chunking strategy name was requested.
    #[error("unknown chunking strategy: {name}")]
    UnknownStrategy {
        /// The requested (unrecognized) strategy name.
        name: String,
    },
}

/// File I/O errors, internal to `io::reader`'s use by `retriever::code_index`.
#[derive(Error, Debug)]
pub enum IoError {
    /// The requested file does not exist.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was missing.
        path: String,
    },

    /// Reading the file failed.
    #[error("failed to read {path}: {reason}")]
    ReadFailed {
        /// Path that failed to read.
        path: String,
        /// Underlying failure reason.
        reason: String,
    },

    /// Writing the file failed.
    #[error("failed to write {path}: {reason}")]
    WriteFailed {
        /// Path that failed to write.
        path: String,
        /// Underlying failure reason.
        reason: String,
    },

    /// Memory-mapping the file failed.
    #[error("failed to memory-map {path}: {reason}")]
    MmapFailed {
        /// Path that failed to map.
        path: String,
        /// Underlying failure reason.
        reason: String,
    },

    /// Creating a directory failed.
    #[error("failed to create directory {path}: {reason}")]
    DirectoryFailed {
        /// Path that failed to create.
        path: String,
        /// Underlying failure reason.
        reason: String,
    },
}

/// Vector-index errors, internal to `search::hnsw`'s use by
/// `retriever::code_index`.
#[derive(Error, Debug)]
pub enum SearchError {
    /// The underlying HNSW index operation failed.
    #[error("{message}")]
    IndexError {
        /// Underlying failure message.
        message: String,
    },

    /// A vector's dimensionality didn't match the index's configured
    /// dimensions.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Configured dimensionality.
        expected: usize,
        /// Dimensionality of the offending vector.
        got: usize,
    },

    /// The operation requires a cargo feature that isn't enabled.
    #[error("feature not enabled: {feature}")]
    FeatureNotEnabled {
        /// The required feature flag.
        feature: String,
    },
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Config(ConfigError::ReadFailed {
            path: String::new(),
            reason: err.to_string(),
        })
    }
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedOutput {
            role: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for RetrieverError {
    fn from(err: reqwest::Error) -> Self {
        Self::BackendUnavailable {
            backend: "http".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::ParseFailed {
            path: String::new(),
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retriever_error_display() {
        let err = RetrieverError::BackendUnavailable {
            backend: "log index".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("log index"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn llm_error_display() {
        let err = LlmError::EmptyResponse { role: "answerer".to_string() };
        assert!(err.to_string().contains("answerer"));
    }

    #[test]
    fn transport_error_display() {
        let err = TransportError::MessageNotFound { message_id: "42".to_string() };
        assert_eq!(err.to_string(), "message not found for edit: 42");
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::MissingField { field: "opensearch.host".to_string() };
        assert!(err.to_string().contains("opensearch.host"));
    }

    #[test]
    fn pipeline_error_display() {
        let err = PipelineError::TransitionLimitExceeded { max: 64 };
        assert!(err.to_string().contains("64"));
    }

    #[test]
    fn error_from_retriever_wraps() {
        let retriever_err = RetrieverError::UnknownCollection { name: "foo".to_string() };
        let err: Error = retriever_err.into();
        assert!(matches!(err, Error::Retriever(_)));
    }

    #[test]
    fn error_from_llm_wraps() {
        let llm_err = LlmError::UnknownRole { role: "x".to_string() };
        let err: Error = llm_err.into();
        assert!(matches!(err, Error::Llm(_)));
    }

    #[test]
    fn error_from_transport_wraps() {
        let transport_err = TransportError::SendFailed { reason: "x".to_string() };
        let err: Error = transport_err.into();
        assert!(matches!(err, Error::Transport(_)));
    }

    #[test]
    fn error_from_config_wraps() {
        let config_err = ConfigError::MissingField { field: "x".to_string() };
        let err: Error = config_err.into();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn error_from_pipeline_wraps() {
        let pipeline_err = PipelineError::TransitionLimitExceeded { max: 1 };
        let err: Error = pipeline_err.into();
        assert!(matches!(err, Error::Pipeline(_)));
    }

    #[test]
    fn chunking_error_display() {
        let err = ChunkingError::UnknownStrategy { name: "frobnicate".to_string() };
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn error_from_chunking_wraps() {
        let chunking_err = ChunkingError::InvalidConfig { reason: "x".to_string() };
        let err: Error = chunking_err.into();
        assert!(matches!(err, Error::Chunking(_)));
    }

    #[test]
    fn io_error_display() {
        let err = IoError::FileNotFound { path: "missing.rs".to_string() };
        assert!(err.to_string().contains("missing.rs"));
    }

    #[test]
    fn error_from_io_error_wraps() {
        let io_err = IoError::WriteFailed {
            path: "x".to_string(),
            reason: "disk full".to_string(),
        };
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn search_error_display() {
        let err = SearchError::DimensionMismatch { expected: 384, got: 128 };
        assert!(err.to_string().contains("384"));
        assert!(err.to_string().contains("128"));
    }

    #[test]
    fn error_from_search_error_wraps() {
        let search_err = SearchError::FeatureNotEnabled { feature: "usearch-hnsw".to_string() };
        let err: Error = search_err.into();
        assert!(matches!(err, Error::Search(_)));
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Config(_)));
    }
}
