//! Sends answers, writing stored attachments to a scratch directory first.

use std::path::Path;

use tracing::{debug, warn};

use crate::bot::entry::Attachment;
use crate::bot::error::{BotError, Result};
use crate::bot::message::{OutgoingFile, OutgoingMessage};
use crate::bot::transport::ChatTransport;

/// Send `text` to a chat, with `attachment` uploaded from a temporary file.
///
/// The temporary directory is removed once the send returns, whether it
/// succeeded or not.
pub async fn send_answer(
    transport: &dyn ChatTransport,
    chat_id: i64,
    text: String,
    quoted_message_id: Option<i64>,
    attachment: Option<&Attachment>,
) -> Result<()> {
    let mut message = OutgoingMessage {
        text,
        quoted_message_id,
        file: None,
    };

    let Some(attachment) = attachment.filter(|a| !a.bytes.is_empty()) else {
        return transport.send(chat_id, message).await.map_err(BotError::Transport);
    };

    let dir = tempfile::Builder::new().prefix("faqbot-").tempdir()?;
    let path = dir.path().join(leaf_name(&attachment.filename));
    let sent = async {
        tokio::fs::write(&path, &attachment.bytes).await?;
        debug!("Wrote {} bytes to {:?}", attachment.bytes.len(), path);
        message.file = Some(OutgoingFile {
            path: path.clone(),
            view_type: attachment.view_type,
        });
        transport.send(chat_id, message).await.map_err(BotError::Transport)
    }
    .await;

    if let Err(e) = dir.close() {
        warn!("Failed to remove temporary attachment dir: {e}");
    }
    sent
}

/// Reduce a stored filename to something safe to create inside a directory.
fn leaf_name(filename: &str) -> &str {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("attachment")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_name() {
        assert_eq!(leaf_name("cat.jpg"), "cat.jpg");
        assert_eq!(leaf_name("../../etc/passwd"), "passwd");
        assert_eq!(leaf_name("dir/report.pdf"), "report.pdf");
        assert_eq!(leaf_name(""), "attachment");
        assert_eq!(leaf_name(".."), "attachment");
    }
}
