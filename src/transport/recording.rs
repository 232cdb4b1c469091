//! Test-only transport that records every send/edit for assertions.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatTransport, MessageId};
use crate::error::Result;

/// One recorded transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedCall {
    /// A `send(chat_id, text)` call.
    Send { chat_id: String, text: String },
    /// An `edit(chat_id, message_id, text)` call.
    Edit { chat_id: String, message_id: MessageId, text: String },
}

/// Records calls in order, handing out sequential message ids.
#[derive(Default)]
pub struct RecordingTransport {
    calls: Mutex<Vec<RecordedCall>>,
    next_id: Mutex<u64>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send(&self, chat_id: &str, text: &str) -> Result<MessageId> {
        let mut next_id = self.next_id.lock().unwrap_or_else(|e| e.into_inner());
        let id = MessageId(next_id.to_string());
        *next_id += 1;
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedCall::Send { chat_id: chat_id.to_string(), text: text.to_string() });
        Ok(id)
    }

    async fn edit(&self, chat_id: &str, message_id: &MessageId, text: &str) -> Result<()> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(RecordedCall::Edit {
            chat_id: chat_id.to_string(),
            message_id: message_id.clone(),
            text: text.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_send_then_edit_in_order() {
        let transport = RecordingTransport::new();
        let id = transport.send("chat-1", "hello").await.expect("send");
        transport.edit("chat-1", &id, "hello world").await.expect("edit");
        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], RecordedCall::Send { chat_id: "chat-1".to_string(), text: "hello".to_string() });
    }
}
