//! Capabilities the bot needs from the chat platform.

use async_trait::async_trait;

use crate::bot::message::{IncomingMessage, OutgoingMessage, RemoteFile};

/// Outbound side of the chat platform. Implementations log their own
/// failures and hand back a short description.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a message to a chat. If `message.file` is set, the path must stay
    /// readable until this returns.
    async fn send(&self, chat_id: i64, message: OutgoingMessage) -> Result<(), String>;

    /// Resolve the current display name of the message's sender.
    async fn sender_display_name(&self, msg: &IncomingMessage) -> Result<String, String>;

    /// Fetch the bytes of a file attached to some message.
    async fn download(&self, file: &RemoteFile) -> Result<Vec<u8>, String>;
}
