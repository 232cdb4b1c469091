//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rarp: a retrieval-augmented investigation assistant for logs, tickets,
/// and code.
#[derive(Parser, Debug)]
#[command(name = "rarp")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration TOML file.
    #[arg(short, long, env = "RARP_CONFIG", default_value = "rarp.toml")]
    pub config: PathBuf,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json, ndjson).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the chat-transport server loop, dispatching each incoming
    /// message through the pipeline engine.
    Serve,

    /// Run the pipeline once against a single question and print the
    /// resulting answer (or give-up diagnostic) to stdout.
    Ask {
        /// The question to investigate.
        question: String,

        /// Conversation id attached to the run (defaults to a fixed value
        /// for one-shot CLI use).
        #[arg(long, default_value = "cli")]
        chat_id: String,
    },

    /// Configuration inspection commands.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run a JSON-encoded structured query through the log index's DSL
    /// translator and print the result. Intended for debugging the query
    /// constructor's output without a live backend.
    TranslateFilter {
        /// A JSON-encoded `StructuredQuery`.
        json: String,
    },
}

/// `rarp config` subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Load and validate the configuration file, printing the resolved
    /// values (secrets redacted to presence/absence only).
    Check,
}
