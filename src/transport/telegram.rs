//! Telegram Bot HTTP API transport.
//!
//! Grounded on `main.py`/`workflow.py`'s `aiogram.Bot.send_message` /
//! `edit_message_text` calls, reimplemented directly against Telegram's
//! plain HTTP Bot API (no `aiogram`-equivalent crate is needed: two JSON
//! POST endpoints cover the whole contract this pipeline uses).

use async_trait::async_trait;
use serde::Deserialize;

use super::{ChatTransport, MessageId};
use crate::error::{Error, Result, TransportError};

const API_BASE: &str = "https://api.telegram.org";

/// Sends/edits messages via the Telegram Bot HTTP API.
pub struct TelegramTransport {
    client: reqwest::Client,
    token: String,
}

impl TelegramTransport {
    /// Builds a transport for the bot identified by `token`.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{API_BASE}/bot{}/{method}", self.token)
    }

    /// Long-polls `getUpdates` once, waiting up to `timeout_secs` seconds for
    /// new messages, and acknowledges everything returned so the next call
    /// doesn't redeliver it. Mirrors `aiogram.Dispatcher.start_polling`'s
    /// long-poll loop, reimplemented against the plain HTTP API.
    pub async fn poll_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<IncomingMessage>> {
        let response = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&[("offset", offset.to_string()), ("timeout", timeout_secs.to_string())])
            .send()
            .await
            .map_err(|source| Error::Transport(TransportError::SendFailed { reason: source.to_string() }))?;

        let parsed: TelegramResponse<Vec<Update>> = response
            .json()
            .await
            .map_err(|source| Error::Transport(TransportError::SendFailed { reason: source.to_string() }))?;

        if !parsed.ok {
            return Err(Error::Transport(TransportError::SendFailed {
                reason: parsed.description.unwrap_or_else(|| "unknown telegram error".to_string()),
            }));
        }

        Ok(parsed
            .result
            .unwrap_or_default()
            .into_iter()
            .filter_map(|update| {
                let message = update.message?;
                Some(IncomingMessage { update_id: update.update_id, chat_id: message.chat.id.to_string(), text: message.text? })
            })
            .collect())
    }
}

/// A single incoming chat message surfaced by [`TelegramTransport::poll_updates`].
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// The update id to acknowledge on the next poll's `offset`.
    pub update_id: i64,
    /// Originating chat id.
    pub chat_id: String,
    /// Message text.
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<IncomingUpdateMessage>,
}

#[derive(Debug, Deserialize)]
struct IncomingUpdateMessage {
    text: Option<String>,
    chat: Chat,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct SendMessageResult {
    message_id: i64,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send(&self, chat_id: &str, text: &str) -> Result<MessageId> {
        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&serde_json::json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await
            .map_err(|source| Error::Transport(TransportError::SendFailed { reason: source.to_string() }))?;

        let parsed: TelegramResponse<SendMessageResult> = response
            .json()
            .await
            .map_err(|source| Error::Transport(TransportError::SendFailed { reason: source.to_string() }))?;

        if !parsed.ok {
            return Err(Error::Transport(TransportError::SendFailed {
                reason: parsed.description.unwrap_or_else(|| "unknown telegram error".to_string()),
            }));
        }

        let result = parsed
            .result
            .ok_or_else(|| Error::Transport(TransportError::SendFailed { reason: "missing result".to_string() }))?;
        Ok(MessageId(result.message_id.to_string()))
    }

    async fn edit(&self, chat_id: &str, message_id: &MessageId, text: &str) -> Result<()> {
        let response = self
            .client
            .post(self.method_url("editMessageText"))
            .json(&serde_json::json!({
                "chat_id": chat_id,
                "message_id": message_id.0.parse::<i64>().unwrap_or_default(),
                "text": text,
            }))
            .send()
            .await
            .map_err(|source| Error::Transport(TransportError::SendFailed { reason: source.to_string() }))?;

        let parsed: TelegramResponse<serde_json::Value> = response
            .json()
            .await
            .map_err(|source| Error::Transport(TransportError::SendFailed { reason: source.to_string() }))?;

        if !parsed.ok {
            return Err(Error::Transport(TransportError::MessageNotFound {
                message_id: message_id.0.clone(),
            }));
        }
        Ok(())
    }
}
