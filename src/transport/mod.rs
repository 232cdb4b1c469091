//! Chat transport: sending progress updates and editing them in place as
//! the pipeline advances, mirroring `workflow.py`'s `bot.send_message` /
//! `bot.edit_message_text` calls.

pub mod null;
pub mod telegram;

#[cfg(test)]
pub(crate) mod recording;

use async_trait::async_trait;

use crate::error::Result;

/// Opaque handle to a sent message, returned by [`ChatTransport::send`] so
/// a later [`ChatTransport::edit`] can target it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(pub String);

/// A chat backend capable of sending progress messages and editing them in
/// place (used for streamed answer updates and status text). Failures here
/// are never fatal to the pipeline; callers log and continue.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends `text` to `chat_id`, returning a handle to the sent message.
    async fn send(&self, chat_id: &str, text: &str) -> Result<MessageId>;

    /// Replaces the text of a previously sent message.
    async fn edit(&self, chat_id: &str, message_id: &MessageId, text: &str) -> Result<()>;
}
