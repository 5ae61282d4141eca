//! Transport-neutral message types.

use std::path::PathBuf;

use crate::bot::entry::ViewType;

/// A file that still lives on the chat server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    /// Transport-specific handle used to download the bytes.
    pub file_id: String,
    pub filename: String,
    pub view_type: ViewType,
}

/// The message an incoming message replies to.
#[derive(Debug, Clone, Default)]
pub struct Quote {
    pub message_id: i64,
    /// Per-message sender name (e.g. an anonymous admin's signature).
    pub override_sender_name: Option<String>,
    pub author_display_name: String,
    pub text: Option<String>,
    pub file: Option<RemoteFile>,
}

/// A message received in a conversation.
#[derive(Debug, Clone, Default)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub chat_id: i64,
    pub text: String,
    /// Resolvable through [`ChatTransport::sender_display_name`](super::transport::ChatTransport::sender_display_name).
    pub sender_id: Option<i64>,
    pub override_sender_name: Option<String>,
    pub quote: Option<Quote>,
}

/// A file on local disk, ready to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingFile {
    pub path: PathBuf,
    pub view_type: ViewType,
}

/// A message to send to a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub quoted_message_id: Option<i64>,
    pub file: Option<OutgoingFile>,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted_message_id: None,
            file: None,
        }
    }

    pub fn reply(text: impl Into<String>, quoted_message_id: i64) -> Self {
        Self {
            text: text.into(),
            quoted_message_id: Some(quoted_message_id),
            file: None,
        }
    }
}
