//! Async LLM client trait and an OpenAI-compatible (Ollama) implementation.

use std::pin::Pin;

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};

use super::config::{LlmRoleConfig, Role};
use crate::error::{Error, LlmError};

/// A single chat completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    /// Role whose endpoint/model/temperature config should serve this call.
    pub role: Role,
    /// System prompt (the role's fixed instructions).
    pub system_prompt: &'a str,
    /// User message (question, documents, or other per-call context).
    pub user_prompt: String,
}

/// A boxed stream of incremental response chunks, as produced by
/// [`LlmClient::complete_stream`].
pub type CompletionStream = Pin<Box<dyn Stream<Item = Result<String, Error>> + Send>>;

/// A chat-completion backend, abstracted so graders/rewriter/answerer can be
/// tested against a fake without a live endpoint.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Runs one chat completion and returns the model's raw text response.
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, Error>;

    /// Runs one chat completion, streaming incremental text chunks as they
    /// arrive. The default implementation falls back to [`LlmClient::complete`]
    /// and yields its result as a single chunk; [`OpenAiCompatClient`]
    /// overrides this with true token streaming.
    async fn complete_stream(&self, request: CompletionRequest<'_>) -> Result<CompletionStream, Error> {
        let result = self.complete(request).await;
        Ok(Box::pin(futures_util::stream::once(async move { result })))
    }
}

/// [`LlmClient`] backed by an OpenAI-compatible HTTP endpoint (e.g. Ollama's
/// `/v1` shim), one configured client per [`Role`].
pub struct OpenAiCompatClient {
    clients: std::collections::HashMap<Role, (Client<OpenAIConfig>, LlmRoleConfig)>,
}

impl OpenAiCompatClient {
    /// Builds a client from a per-role configuration map. Roles absent from
    /// `configs` fall back to [`LlmRoleConfig::default_for`].
    #[must_use]
    pub fn new(configs: std::collections::HashMap<Role, LlmRoleConfig>) -> Self {
        let clients = Role::ALL
            .into_iter()
            .map(|role| {
                let cfg = configs.get(&role).cloned().unwrap_or_else(|| LlmRoleConfig::default_for(role));
                let api_config = OpenAIConfig::new().with_api_base(cfg.base_url.clone());
                (role, (Client::with_config(api_config), cfg))
            })
            .collect();
        Self { clients }
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, Error> {
        let (client, cfg) = self.clients.get(&request.role).ok_or_else(|| {
            Error::Llm(LlmError::UnknownRole {
                role: request.role.key().to_string(),
            })
        })?;

        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system_prompt)
            .build()
            .map_err(|source| Error::Llm(LlmError::RequestBuild { source: source.to_string() }))?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(request.user_prompt)
            .build()
            .map_err(|source| Error::Llm(LlmError::RequestBuild { source: source.to_string() }))?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(cfg.model.clone())
            .temperature(cfg.temperature)
            .messages(vec![system.into(), user.into()]);
        if let Some(max_tokens) = cfg.max_tokens {
            builder.max_tokens(max_tokens);
        }
        let req = builder
            .build()
            .map_err(|source| Error::Llm(LlmError::RequestBuild { source: source.to_string() }))?;

        let response = tokio::time::timeout(
            std::time::Duration::from_secs(cfg.timeout_secs),
            client.chat().create(req),
        )
        .await
        .map_err(|_| Error::Llm(LlmError::Timeout { role: request.role.key().to_string() }))?
        .map_err(|source| Error::Llm(LlmError::Backend { source: source.to_string() }))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| Error::Llm(LlmError::EmptyResponse { role: request.role.key().to_string() }))
    }

    async fn complete_stream(&self, request: CompletionRequest<'_>) -> Result<CompletionStream, Error> {
        let (client, cfg) = self.clients.get(&request.role).ok_or_else(|| {
            Error::Llm(LlmError::UnknownRole {
                role: request.role.key().to_string(),
            })
        })?;

        let system = ChatCompletionRequestSystemMessageArgs::default()
            .content(request.system_prompt)
            .build()
            .map_err(|source| Error::Llm(LlmError::RequestBuild { source: source.to_string() }))?;
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(request.user_prompt)
            .build()
            .map_err(|source| Error::Llm(LlmError::RequestBuild { source: source.to_string() }))?;

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(cfg.model.clone())
            .temperature(cfg.temperature)
            .messages(vec![system.into(), user.into()]);
        if let Some(max_tokens) = cfg.max_tokens {
            builder.max_tokens(max_tokens);
        }
        let req = builder
            .build()
            .map_err(|source| Error::Llm(LlmError::RequestBuild { source: source.to_string() }))?;

        let raw_stream = client
            .chat()
            .create_stream(req)
            .await
            .map_err(|source| Error::Llm(LlmError::Backend { source: source.to_string() }))?;

        let mapped = raw_stream.map(move |chunk| match chunk {
            Ok(response) => Ok(response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)
                .unwrap_or_default()),
            Err(source) => Err(Error::Llm(LlmError::Backend { source: source.to_string() })),
        });

        Ok(Box::pin(mapped))
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! A scripted [`LlmClient`] for unit tests.
    use super::{CompletionRequest, Error, LlmClient};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Returns queued responses in order, one per call; panics (in tests
    /// only) if exhausted.
    pub struct ScriptedLlm {
        responses: Mutex<Vec<Result<String, String>>>,
    }

    impl ScriptedLlm {
        pub fn new(responses: Vec<&str>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().rev().map(|s| Ok(s.to_string())).collect()),
            }
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedLlm {
        async fn complete(&self, _request: CompletionRequest<'_>) -> Result<String, Error> {
            let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
            match responses.pop() {
                Some(Ok(text)) => Ok(text),
                Some(Err(_)) | None => Err(Error::Llm(crate::error::LlmError::EmptyResponse {
                    role: "test".to_string(),
                })),
            }
        }
    }
}
