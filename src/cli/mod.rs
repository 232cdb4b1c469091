//! CLI layer for `rarp`.
//!
//! Provides the command-line interface using clap: `serve` runs the chat
//! transport's poll loop against the pipeline engine, `ask` runs it once
//! against a single question, `config check` validates and dumps the
//! resolved configuration, and `translate-filter` is a debugging entry
//! point for the log index's query-DSL translator.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
