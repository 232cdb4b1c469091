//! The pipeline state machine that sequences retrieval, grading, rewriting,
//! and generation, with bounded retries.
//!
//! Grounded on the Design Notes' re-architecture mapping: `main.py`'s
//! `langgraph.StateGraph` becomes an explicit enum of states and a
//! transition function, run as a bounded `while` fixpoint capped at
//! [`MAX_TRANSITIONS`] — a defensive backstop proving termination even
//! under a misconfigured budget.

use std::collections::HashSet;

use futures_util::future::join_all;
use tracing::warn;

use crate::answerer::Answerer;
use crate::error::{Error, PipelineError, Result};
use crate::grading::{AnswerGrader, GroundingGrader, RelevanceGrader};
use crate::llm::client::LlmClient;
use crate::model::{Document, PipelineState};
use crate::retriever::Retriever;
use crate::rewriter::QuestionRewriter;
use crate::transport::ChatTransport;

/// Hard ceiling on state transitions per pipeline run, proving termination
/// even if a configuration bug defeats the budget decrements.
pub const MAX_TRANSITIONS: u32 = 64;

/// The pipeline's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEngineState {
    /// Fan out to every retriever.
    Retrieve,
    /// Filter retrieved documents for relevance.
    GradeDocs,
    /// Rewrite the working question and retry retrieval.
    Rewrite,
    /// Generate an answer from the current evidence.
    Generate,
    /// Grade the generated answer for groundedness and relevance.
    GradeAnswer,
    /// Terminal: a satisfactory answer was produced.
    Done,
    /// Terminal: budgets exhausted without a satisfactory answer.
    GiveUp,
}

impl PipelineEngineState {
    fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::GiveUp)
    }
}

/// Wires together every pipeline stage and runs the state machine for one
/// conversation turn.
pub struct PipelineEngine<'a, L>
where
    L: LlmClient + 'static,
{
    evidence_retrievers: Vec<&'a dyn Retriever>,
    code_retriever: &'a dyn Retriever,
    relevance_grader: RelevanceGrader<L>,
    rewriter: QuestionRewriter<'a>,
    answerer: Answerer<'a>,
    answer_grader: AnswerGrader<'a>,
    grounding_grader: GroundingGrader<'a>,
    transport: &'a dyn ChatTransport,
    max_transitions: u32,
}

impl<'a, L> PipelineEngine<'a, L>
where
    L: LlmClient + 'static,
{
    /// Builds an engine from its constituent stages. `evidence_retrievers`
    /// are fanned out concurrently on every `RETRIEVE` (log index, document
    /// store); `code_retriever` is queried after grading, against stack-trace
    /// text extracted from the surviving documents, and its results kept
    /// apart as supplemental code context.
    #[must_use]
    pub fn new(
        evidence_retrievers: Vec<&'a dyn Retriever>,
        code_retriever: &'a dyn Retriever,
        relevance_grader: RelevanceGrader<L>,
        rewriter: QuestionRewriter<'a>,
        answerer: Answerer<'a>,
        answer_grader: AnswerGrader<'a>,
        grounding_grader: GroundingGrader<'a>,
        transport: &'a dyn ChatTransport,
    ) -> Self {
        Self {
            evidence_retrievers,
            code_retriever,
            relevance_grader,
            rewriter,
            answerer,
            answer_grader,
            grounding_grader,
            transport,
            max_transitions: MAX_TRANSITIONS,
        }
    }

    /// Overrides the default transition ceiling (tests use a small one to
    /// exercise [`PipelineError::TransitionLimitExceeded`] quickly).
    #[must_use]
    pub fn with_max_transitions(mut self, max_transitions: u32) -> Self {
        self.max_transitions = max_transitions;
        self
    }

    async fn notify(&self, chat_id: &str, text: &str) {
        if let Err(source) = self.transport.send(chat_id, text).await {
            warn!(%source, "chat transport send failed, continuing");
        }
    }

    /// Runs the state machine to a terminal state, mutating `state` in
    /// place. Returns the terminal state reached, or an error if a stage
    /// failed outright or the transition ceiling was hit.
    pub async fn run(&self, state: &mut PipelineState) -> Result<PipelineEngineState> {
        let mut current = PipelineEngineState::Retrieve;
        let mut transitions: u32 = 0;

        loop {
            if state.cancel.is_cancelled() {
                return Ok(PipelineEngineState::GiveUp);
            }
            if current.is_terminal() {
                return Ok(current);
            }

            transitions += 1;
            if transitions > self.max_transitions {
                return Err(Error::Pipeline(PipelineError::TransitionLimitExceeded { max: self.max_transitions }));
            }

            current = match current {
                PipelineEngineState::Retrieve => {
                    self.notify(&state.chat_id, "🔍 Retrieving documents...").await;
                    let mut docs = Vec::new();
                    for result in join_all(self.evidence_retrievers.iter().map(|r| r.search(&state.question))).await {
                        docs.extend(result?);
                    }
                    state.documents = docs;
                    self.notify(&state.chat_id, &format!("📚 Retrieved {} documents", state.documents.len())).await;
                    PipelineEngineState::GradeDocs
                }

                PipelineEngineState::GradeDocs => {
                    let docs = std::mem::take(&mut state.documents);
                    let mut graded = self.relevance_grader.filter_relevant(&state.question, docs).await?;
                    dedupe_by_identity(&mut graded);
                    state.documents = graded;

                    state.stack_traces = extract_stack_traces(&state.documents);
                    state.code_docs = if state.stack_traces.is_empty() {
                        Vec::new()
                    } else {
                        self.code_retriever.search(&state.stack_traces.join("\n")).await?
                    };

                    if state.documents.is_empty() && state.rewrite_budget > 1 {
                        PipelineEngineState::Rewrite
                    } else {
                        PipelineEngineState::Generate
                    }
                }

                PipelineEngineState::Rewrite => {
                    state.rewrite_budget -= 1;
                    state.question = self.rewriter.rewrite(&state.question).await?;
                    self.notify(&state.chat_id, &format!("✏️ Rewriting question ({} attempt(s) left)", state.rewrite_budget)).await;
                    PipelineEngineState::Retrieve
                }

                PipelineEngineState::Generate => {
                    self.notify(&state.chat_id, "🤖 Generating answer...").await;
                    let generation = self
                        .answerer
                        .generate(&state.question, &state.documents, &state.stack_traces, &state.code_docs)
                        .await?;
                    state.generation = Some(generation);
                    PipelineEngineState::GradeAnswer
                }

                PipelineEngineState::GradeAnswer => {
                    let generation = state.generation.clone().unwrap_or_default();
                    let combined = combined_documents(state);
                    let (addresses_result, grounded_result) = tokio::join!(
                        self.answer_grader.grade(&state.question, &generation),
                        self.grounding_grader.grade(&generation, &combined),
                    );
                    let addresses = addresses_result?;
                    let grounded = grounded_result?;

                    if addresses.is_yes() && grounded.is_yes() {
                        PipelineEngineState::Done
                    } else if !grounded.is_yes() && state.regenerate_budget > 1 {
                        state.regenerate_budget -= 1;
                        PipelineEngineState::Generate
                    } else if !addresses.is_yes() && state.rewrite_budget > 1 {
                        state.rewrite_budget -= 1;
                        PipelineEngineState::Rewrite
                    } else {
                        PipelineEngineState::GiveUp
                    }
                }

                PipelineEngineState::Done | PipelineEngineState::GiveUp => unreachable!("terminal states return above"),
            };
        }
    }
}

fn combined_documents(state: &PipelineState) -> Vec<Document> {
    state.documents.iter().chain(state.code_docs.iter()).cloned().collect()
}

/// Drops documents whose `(source, primary-id)` identity was already seen,
/// keeping the first occurrence, enforcing the no-duplicates-after-grading
/// invariant.
fn dedupe_by_identity(documents: &mut Vec<Document>) {
    let mut seen = HashSet::new();
    documents.retain(|doc| seen.insert(doc.identity()));
}

/// A document's content looks like it carries a stack trace when it matches
/// the same heuristic `CodeRetriever` uses to decide whether to filter by
/// filename instead of running semantic search.
fn looks_like_stack_trace(content: &str) -> bool {
    content.contains("stack:") || content.contains(" at ")
}

/// Extracts the content of every graded document that looks like it carries
/// a stack trace, to be handed to the code retriever and the answerer.
fn extract_stack_traces(documents: &[Document]) -> Vec<String> {
    documents
        .iter()
        .filter(|doc| looks_like_stack_trace(&doc.content))
        .map(|doc| doc.content.clone())
        .collect()
}
