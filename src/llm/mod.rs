//! Per-role LLM client: one OpenAI-compatible (Ollama-style) endpoint
//! configuration per pipeline role, grounded on the teacher's
//! `agent::prompt::PromptSet` (named prompt constants) generalized from a
//! single-agent-family tool to a multi-role pipeline, one client per role.

pub mod client;
pub mod config;
pub mod prompts;

pub use client::{LlmClient, OpenAiCompatClient};
pub use config::{LlmRoleConfig, Role};
