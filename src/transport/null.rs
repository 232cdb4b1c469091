//! No-op transport for headless/CLI invocations that have no chat to
//! report progress to (e.g. `rarp ask`).

use async_trait::async_trait;

use super::{ChatTransport, MessageId};
use crate::error::Result;

/// Discards every send/edit, returning a synthetic message id so callers
/// needn't special-case the absence of a real chat.
#[derive(Debug, Clone, Default)]
pub struct NullTransport;

#[async_trait]
impl ChatTransport for NullTransport {
    async fn send(&self, _chat_id: &str, _text: &str) -> Result<MessageId> {
        Ok(MessageId(String::new()))
    }

    async fn edit(&self, _chat_id: &str, _message_id: &MessageId, _text: &str) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_and_edit_always_succeed() {
        let transport = NullTransport;
        let id = transport.send("chat", "hello").await.expect("send");
        transport.edit("chat", &id, "updated").await.expect("edit");
    }
}
