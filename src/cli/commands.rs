//! CLI command implementations.
//!
//! Each command wires together configuration, the LLM client, the three
//! retrievers, the grading/rewrite/generation stages, a chat transport, and
//! the pipeline engine, then runs the requested action.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::error;

use crate::answerer::Answerer;
use crate::config::RarpConfig;
use crate::engine::{PipelineEngine, PipelineEngineState};
use crate::error::{Error, Result};
use crate::filter;
use crate::grading::{AnswerGrader, GroundingGrader, RelevanceGrader};
use crate::llm::client::OpenAiCompatClient;
use crate::model::{PipelineState, StructuredQuery};
use crate::retriever::{CodeRetriever, DocumentStoreRetriever, LogRetriever, Retriever};
use crate::rewriter::QuestionRewriter;
use crate::transport::null::NullTransport;
use crate::transport::telegram::TelegramTransport;
use crate::transport::ChatTransport;

use super::output::{format_ask_result, format_config_check, format_error, format_filter_translation, OutputFormat};
use super::parser::{Cli, Commands, ConfigAction};

/// Dispatches to the subcommand selected by `cli`, prints the result (or
/// error) in the requested format, and returns the process exit code.
pub async fn execute(cli: &Cli) -> ExitCode {
    let format = OutputFormat::parse(&cli.format);
    match run(cli, format).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "command failed");
            eprintln!("{}", format_error(&err, format));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, format: OutputFormat) -> Result<()> {
    match &cli.command {
        Commands::TranslateFilter { json } => cmd_translate_filter(json, format),
        Commands::Config { action } => cmd_config(cli, action, format),
        Commands::Ask { question, chat_id } => cmd_ask(cli, question, chat_id, format).await,
        Commands::Serve => cmd_serve(cli).await,
    }
}

fn load_config(cli: &Cli) -> Result<RarpConfig> {
    let config = RarpConfig::load(&cli.config)?;
    config.validate()?;
    Ok(config)
}

fn cmd_translate_filter(json: &str, format: OutputFormat) -> Result<()> {
    let query: StructuredQuery = serde_json::from_str(json).map_err(|source| {
        Error::Config(crate::error::ConfigError::InvalidValue {
            field: "translate-filter json".to_string(),
            reason: source.to_string(),
        })
    })?;
    let translated = filter::translate(&query, "msg");
    println!("{}", format_filter_translation(&translated, format));
    Ok(())
}

fn cmd_config(cli: &Cli, action: &ConfigAction, format: OutputFormat) -> Result<()> {
    match action {
        ConfigAction::Check => {
            let config = load_config(cli)?;
            println!("{}", format_config_check(&config, format));
            Ok(())
        }
    }
}

async fn build_stages(config: &RarpConfig, llm: &Arc<OpenAiCompatClient>) -> Result<(LogRetriever<'_>, DocumentStoreRetriever<'_>, CodeRetriever)> {
    let log_retriever = LogRetriever::new(config.log_index.clone(), llm.as_ref());
    let document_retriever = DocumentStoreRetriever::connect(config.document_store.clone(), llm.as_ref()).await?;
    let code_retriever = CodeRetriever::build(&config.code_store)?;
    Ok((log_retriever, document_retriever, code_retriever))
}

#[allow(clippy::too_many_arguments)]
async fn run_pipeline(
    llm: &Arc<OpenAiCompatClient>,
    log_retriever: &LogRetriever<'_>,
    document_retriever: &DocumentStoreRetriever<'_>,
    code_retriever: &CodeRetriever,
    transport: &dyn ChatTransport,
    chat_id: &str,
    question: &str,
) -> Result<PipelineState> {
    let evidence_retrievers: Vec<&dyn Retriever> = vec![log_retriever, document_retriever];

    let relevance_grader = RelevanceGrader::new(Arc::clone(llm));
    let rewriter = QuestionRewriter::new(llm.as_ref());
    let answerer = Answerer::new(llm.as_ref());
    let answer_grader = AnswerGrader::new(llm.as_ref());
    let grounding_grader = GroundingGrader::new(llm.as_ref());

    let engine = PipelineEngine::new(
        evidence_retrievers,
        code_retriever,
        relevance_grader,
        rewriter,
        answerer,
        answer_grader,
        grounding_grader,
        transport,
    );

    let mut state = PipelineState::new(chat_id, question);
    engine.run(&mut state).await?;
    Ok(state)
}

async fn cmd_ask(cli: &Cli, question: &str, chat_id: &str, format: OutputFormat) -> Result<()> {
    let config = load_config(cli)?;
    let llm = Arc::new(OpenAiCompatClient::new(config.resolve_all_roles()));
    let (log_retriever, document_retriever, code_retriever) = build_stages(&config, &llm).await?;
    let transport = NullTransport;

    let state = run_pipeline(&llm, &log_retriever, &document_retriever, &code_retriever, &transport, chat_id, question).await?;

    let terminal = if state.generation.is_some() { PipelineEngineState::Done } else { PipelineEngineState::GiveUp };
    println!("{}", format_ask_result(terminal, state.generation.as_deref(), format));
    Ok(())
}

const POLL_TIMEOUT_SECS: u64 = 30;

async fn cmd_serve(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;
    let token = config.require_chat_transport_token()?.to_string();
    let llm = Arc::new(OpenAiCompatClient::new(config.resolve_all_roles()));
    let (log_retriever, document_retriever, code_retriever) = build_stages(&config, &llm).await?;
    let transport = TelegramTransport::new(token);

    tracing::info!("rarp serve: starting long-poll loop");
    let mut offset = 0i64;
    loop {
        let updates = match transport.poll_updates(offset, POLL_TIMEOUT_SECS).await {
            Ok(updates) => updates,
            Err(err) => {
                tracing::warn!(%err, "getUpdates poll failed, retrying");
                continue;
            }
        };

        for update in updates {
            offset = update.update_id + 1;
            let result = run_pipeline(
                &llm,
                &log_retriever,
                &document_retriever,
                &code_retriever,
                &transport,
                &update.chat_id,
                &update.text,
            )
            .await;
            if let Err(err) = result {
                tracing::error!(%err, chat_id = %update.chat_id, "pipeline run failed");
                let _ = transport.send(&update.chat_id, "Sorry, I encountered an error processing that.").await;
            }
        }
    }
}
