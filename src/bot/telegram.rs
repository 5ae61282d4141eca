//! Telegram client using teloxide.

use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, MessageId, MessageKind, ReplyParameters};
use tracing::{debug, info, warn};

use crate::bot::entry::ViewType;
use crate::bot::message::{IncomingMessage, OutgoingMessage, Quote, RemoteFile};
use crate::bot::transport::ChatTransport;

/// Telegram rejects captions longer than this.
const MAX_CAPTION_CHARS: usize = 1024;

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

/// Reply target for an outgoing message. The send still goes through if the
/// target was deleted in the meantime.
fn reply_parameters(message_id: i64) -> ReplyParameters {
    ReplyParameters::new(MessageId(message_id as i32)).allow_sending_without_reply()
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        reply: Option<ReplyParameters>,
    ) -> Result<(), String> {
        let mut request = self.bot.send_message(chat_id, text);
        if let Some(reply) = reply {
            request = request.reply_parameters(reply);
        }
        request.await.map(|_| ()).map_err(|e| {
            let msg = format!("Failed to send: {e}");
            warn!("{}", msg);
            msg
        })
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn send(&self, chat_id: i64, message: OutgoingMessage) -> Result<(), String> {
        let chat_id = ChatId(chat_id);
        let reply = message.quoted_message_id.map(reply_parameters);
        let text = message.text;

        let Some(file) = message.file else {
            if text.is_empty() {
                debug!("Skipping empty message to chat {}", chat_id);
                return Ok(());
            }
            return self.send_text(chat_id, &text, reply).await;
        };

        info!("📎 Sending {} {:?} to chat {}", file.view_type, file.path, chat_id);

        let fits_caption = text.chars().count() <= MAX_CAPTION_CHARS;
        let caption = (fits_caption && !text.is_empty()).then_some(text.as_str());
        let input = InputFile::file(file.path.clone());

        macro_rules! send_media {
            ($request:expr) => {{
                let mut request = $request;
                if let Some(caption) = caption {
                    request = request.caption(caption);
                }
                if let Some(reply) = reply.clone() {
                    request = request.reply_parameters(reply);
                }
                request.await
            }};
        }

        let sent = match file.view_type {
            ViewType::Image => send_media!(self.bot.send_photo(chat_id, input)),
            ViewType::Gif => send_media!(self.bot.send_animation(chat_id, input)),
            ViewType::Audio => send_media!(self.bot.send_audio(chat_id, input)),
            ViewType::Voice => send_media!(self.bot.send_voice(chat_id, input)),
            ViewType::Video => send_media!(self.bot.send_video(chat_id, input)),
            ViewType::File => send_media!(self.bot.send_document(chat_id, input)),
            ViewType::Sticker => {
                let mut request = self.bot.send_sticker(chat_id, input);
                if let Some(reply) = reply.clone() {
                    request = request.reply_parameters(reply);
                }
                request.await
            }
        };

        sent.map_err(|e| {
            let msg = format!("Failed to send {}: {e}", file.view_type);
            warn!("{}", msg);
            msg
        })?;

        // Whatever couldn't ride along as a caption follows as plain text.
        let captioned = caption.is_some();
        if !captioned && !text.is_empty() {
            self.send_text(chat_id, &text, reply).await?;
        }
        Ok(())
    }

    async fn sender_display_name(&self, msg: &IncomingMessage) -> Result<String, String> {
        let user_id = msg
            .sender_id
            .ok_or_else(|| format!("Message {} has no sender to look up", msg.message_id))?;

        let member = self
            .bot
            .get_chat_member(ChatId(msg.chat_id), UserId(user_id as u64))
            .await
            .map_err(|e| {
                let msg = format!("Failed to get chat member: {e}");
                warn!("{}", msg);
                msg
            })?;

        Ok(member.user.full_name())
    }

    async fn download(&self, file: &RemoteFile) -> Result<Vec<u8>, String> {
        let meta = self
            .bot
            .get_file(FileId(file.file_id.clone()))
            .await
            .map_err(|e| format!("Failed to get file info: {e}"))?;

        let mut data = Vec::new();
        self.bot
            .download_file(&meta.path, &mut data)
            .await
            .map_err(|e| format!("Failed to download file: {e}"))?;

        info!("📥 Downloaded {} ({} bytes)", file.filename, data.len());
        Ok(data)
    }
}

/// Convert a Telegram message into the bot's own message type.
pub fn to_incoming(msg: &Message) -> IncomingMessage {
    // In forum supergroups every topic message replies to the topic's
    // creation notice; that is not a quote.
    let quote = msg
        .reply_to_message()
        .filter(|reply| !matches!(reply.kind, MessageKind::ForumTopicCreated(_)))
        .map(|reply| Quote {
            message_id: reply.id.0 as i64,
            override_sender_name: override_sender_name(reply),
            author_display_name: author_display_name(reply),
            text: message_text(reply).map(str::to_string),
            file: remote_file(reply),
        });

    IncomingMessage {
        message_id: msg.id.0 as i64,
        chat_id: msg.chat.id.0,
        text: message_text(msg).unwrap_or("").to_string(),
        sender_id: match (&msg.sender_chat, &msg.from) {
            (None, Some(user)) => Some(user.id.0 as i64),
            _ => None,
        },
        override_sender_name: override_sender_name(msg),
        quote,
    }
}

fn message_text(msg: &Message) -> Option<&str> {
    msg.text().or_else(|| msg.caption())
}

/// Name shown for posts made on behalf of a chat (anonymous admins, channels).
fn override_sender_name(msg: &Message) -> Option<String> {
    if let Some(signature) = msg.author_signature() {
        return Some(signature.to_string());
    }
    msg.sender_chat
        .as_ref()
        .and_then(|chat| chat.title())
        .map(str::to_string)
}

fn author_display_name(msg: &Message) -> String {
    match (&msg.sender_chat, &msg.from) {
        (Some(chat), _) => chat.title().unwrap_or("unknown").to_string(),
        (None, Some(user)) => user.full_name(),
        (None, None) => "unknown".to_string(),
    }
}

fn remote_file(msg: &Message) -> Option<RemoteFile> {
    let file = |id: &FileId, name: Option<&String>, view_type: ViewType| RemoteFile {
        file_id: id.0.clone(),
        filename: name
            .cloned()
            .unwrap_or_else(|| view_type.default_filename().to_string()),
        view_type,
    };

    if let Some(sizes) = msg.photo() {
        // Sizes are ordered smallest first.
        return sizes.last().map(|p| file(&p.file.id, None, ViewType::Image));
    }
    if let Some(a) = msg.animation() {
        return Some(file(&a.file.id, a.file_name.as_ref(), ViewType::Gif));
    }
    if let Some(d) = msg.document() {
        return Some(file(&d.file.id, d.file_name.as_ref(), ViewType::File));
    }
    if let Some(a) = msg.audio() {
        return Some(file(&a.file.id, a.file_name.as_ref(), ViewType::Audio));
    }
    if let Some(v) = msg.voice() {
        return Some(file(&v.file.id, None, ViewType::Voice));
    }
    if let Some(v) = msg.video() {
        return Some(file(&v.file.id, v.file_name.as_ref(), ViewType::Video));
    }
    if let Some(s) = msg.sticker() {
        return Some(file(&s.file.id, None, ViewType::Sticker));
    }
    None
}
