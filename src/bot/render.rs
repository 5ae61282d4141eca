//! Turns a stored entry into the text that gets sent.

use crate::bot::entry::FaqEntry;
use crate::bot::error::{BotError, Result};
use crate::bot::message::IncomingMessage;
use crate::bot::store::FaqStore;
use crate::bot::template;
use crate::bot::transport::ChatTransport;

/// Bullet list of every question saved in a chat.
pub async fn faq_list(store: &FaqStore, chat_id: i64) -> Result<String> {
    let entries = store.list(chat_id).await?;
    Ok(format_faq_list(&entries))
}

pub fn format_faq_list(entries: &[FaqEntry]) -> String {
    entries.iter().map(|e| format!("* {}\n", e.question)).collect()
}

/// Name of whoever the answer is addressed to: the author of the quoted
/// message when the trigger is a reply, otherwise the trigger's sender.
pub async fn addressee_name(transport: &dyn ChatTransport, msg: &IncomingMessage) -> Result<String> {
    if let Some(quote) = &msg.quote {
        return Ok(quote
            .override_sender_name
            .clone()
            .unwrap_or_else(|| quote.author_display_name.clone()));
    }
    if let Some(name) = &msg.override_sender_name {
        return Ok(name.clone());
    }
    transport
        .sender_display_name(msg)
        .await
        .map_err(BotError::Transport)
}

/// Render the answer text of `entry` for the message that matched it.
pub async fn render_answer(
    store: &FaqStore,
    transport: &dyn ChatTransport,
    entry: &FaqEntry,
    msg: &IncomingMessage,
) -> Result<String> {
    let Some(text) = entry.answer_text.as_deref().filter(|t| !t.is_empty()) else {
        return Ok(String::new());
    };

    let name = addressee_name(transport, msg).await?;
    let faq = faq_list(store, msg.chat_id).await?;
    Ok(template::substitute(text, &[("name", &name), ("faq", &faq)])?)
}
