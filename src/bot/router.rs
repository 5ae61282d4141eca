//! Command routing: an ordered table of patterns, first match wins.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info};

use crate::bot::entry::{Attachment, FaqEntry};
use crate::bot::error::{BotError, Result, StoreError};
use crate::bot::message::{IncomingMessage, OutgoingMessage};
use crate::bot::relay;
use crate::bot::render;
use crate::bot::store::FaqStore;
use crate::bot::transport::ChatTransport;

pub const HELP_TEXT: &str = "\
Available commands

/faq - sends available topics.

/save TAG - save the quoted message as answer to the given tag/question. \
The answer can contain special keywords like:
{faq} - gets replaced by the FAQ/topics list.
{name} - gets replaced by the name of the sender of the tag/question or the quoted message.

/remove TAG - remove the saved tag/question and its reply";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Help,
    Faq,
    Remove,
    Save,
    Lookup,
}

/// Priority-ordered routes. Group chats may address a command to one bot
/// (`/faq@SomeBot`); the suffix is captured as `to` and checked in
/// [`Command::parse`].
static ROUTES: LazyLock<Vec<(Regex, Route)>> = LazyLock::new(|| {
    [
        (r"^/help(?:@(?P<to>\w+))?$", Route::Help),
        (r"^/faq(?:@(?P<to>\w+))?$", Route::Faq),
        (r"^/remove(?:@(?P<to>\w+))? (?P<arg>.+)$", Route::Remove),
        (r"^/save(?:@(?P<to>\w+))? (?P<arg>.+)$", Route::Save),
        (r"^[^/]", Route::Lookup),
    ]
    .into_iter()
    .map(|(pattern, route)| (Regex::new(pattern).unwrap(), route))
    .collect()
});

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Faq,
    Remove(String),
    Save(String),
    /// Plain text, looked up as a question.
    Lookup(String),
}

impl Command {
    /// Match `text` against the route table. `None` means no handler fires.
    ///
    /// A command addressed to another bot is ignored. Without a known
    /// `bot_username`, any `@name` suffix is treated as someone else's.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Option<Self> {
        let (caps, route) = ROUTES
            .iter()
            .find_map(|(re, route)| re.captures(text).map(|caps| (caps, *route)))?;

        if let Some(to) = caps.name("to") {
            let ours = bot_username.is_some_and(|name| name.eq_ignore_ascii_case(to.as_str()));
            if !ours {
                return None;
            }
        }

        let argument = || {
            caps.name("arg")
                .map(|m| m.as_str().trim_start().to_string())
                .filter(|q| !q.is_empty())
        };

        match route {
            Route::Help => Some(Command::Help),
            Route::Faq => Some(Command::Faq),
            Route::Remove => argument().map(Command::Remove),
            Route::Save => argument().map(Command::Save),
            Route::Lookup => Some(Command::Lookup(text.to_string())),
        }
    }
}

/// Handles incoming messages against a FAQ store.
#[derive(Clone)]
pub struct FaqBot {
    store: Arc<FaqStore>,
    transport: Arc<dyn ChatTransport>,
    username: Option<String>,
}

impl FaqBot {
    pub fn new(store: Arc<FaqStore>, transport: Arc<dyn ChatTransport>) -> Self {
        Self { store, transport, username: None }
    }

    /// The bot's own username, so `/cmd@username` is recognised as ours.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Process one incoming message.
    pub async fn handle_message(&self, msg: &IncomingMessage) -> Result<()> {
        let Some(command) = Command::parse(&msg.text, self.username.as_deref()) else {
            debug!("No route for message {} in chat {}", msg.message_id, msg.chat_id);
            return Ok(());
        };

        match command {
            Command::Help => self.help(msg).await,
            Command::Faq => self.faq(msg).await,
            Command::Remove(question) => self.remove(msg, &question).await,
            Command::Save(question) => self.save(msg, &question).await,
            Command::Lookup(question) => self.answer(msg, &question).await,
        }
    }

    async fn send(&self, chat_id: i64, message: OutgoingMessage) -> Result<()> {
        self.transport.send(chat_id, message).await.map_err(BotError::Transport)
    }

    async fn help(&self, msg: &IncomingMessage) -> Result<()> {
        self.send(msg.chat_id, OutgoingMessage::text(HELP_TEXT)).await
    }

    async fn faq(&self, msg: &IncomingMessage) -> Result<()> {
        let list = render::faq_list(&self.store, msg.chat_id).await?;
        self.send(msg.chat_id, OutgoingMessage::text(format!("FAQ\n\n{list}"))).await
    }

    async fn remove(&self, msg: &IncomingMessage, question: &str) -> Result<()> {
        if self.store.delete(msg.chat_id, question).await? {
            info!("Removed {:?} from chat {}", question, msg.chat_id);
            self.send(msg.chat_id, OutgoingMessage::reply("✅ Note removed", msg.message_id))
                .await
        } else {
            debug!("Nothing to remove for {:?} in chat {}", question, msg.chat_id);
            Ok(())
        }
    }

    async fn save(&self, msg: &IncomingMessage, question: &str) -> Result<()> {
        if question.starts_with('/') {
            return self
                .send(
                    msg.chat_id,
                    OutgoingMessage::reply("Invalid text, can not start with /", msg.message_id),
                )
                .await;
        }

        let Some(quote) = &msg.quote else {
            return self
                .send(
                    msg.chat_id,
                    OutgoingMessage::reply(
                        "Reply to the message you want to save with /save TAG",
                        msg.message_id,
                    ),
                )
                .await;
        };

        let attachment = match &quote.file {
            Some(file) => {
                let bytes = self.transport.download(file).await.map_err(BotError::Transport)?;
                Some(Attachment {
                    filename: file.filename.clone(),
                    bytes,
                    view_type: file.view_type,
                })
            }
            None => None,
        };

        let mut entry = FaqEntry::new(msg.chat_id, question);
        entry.answer_text = quote.text.clone();
        entry.attachment = attachment;

        match self.store.create(&entry).await {
            Ok(()) => {
                info!("Saved {:?} in chat {}", question, msg.chat_id);
                self.send(msg.chat_id, OutgoingMessage::reply("✅ Saved", msg.message_id))
                    .await
            }
            Err(StoreError::DuplicateKey { .. }) => {
                self.send(
                    msg.chat_id,
                    OutgoingMessage::reply(
                        format!("❌ {question} is already saved, /remove it first"),
                        msg.message_id,
                    ),
                )
                .await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn answer(&self, msg: &IncomingMessage, question: &str) -> Result<()> {
        let Some(entry) = self.store.find(msg.chat_id, question).await? else {
            return Ok(());
        };

        info!("Answering {:?} in chat {}", question, msg.chat_id);
        let text = render::render_answer(&self.store, self.transport.as_ref(), &entry, msg).await?;
        let quoted = msg.quote.as_ref().map_or(msg.message_id, |q| q.message_id);
        relay::send_answer(
            self.transport.as_ref(),
            msg.chat_id,
            text,
            Some(quoted),
            entry.attachment.as_ref(),
        )
        .await
    }
}
