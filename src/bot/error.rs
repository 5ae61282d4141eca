//! Error types for the FAQ bot.

use thiserror::Error;

/// Errors raised by [`FaqStore`](super::store::FaqStore).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("question {question:?} already exists in chat {chat_id}")]
    DuplicateKey { chat_id: i64, question: String },

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database connection lock poisoned")]
    Poisoned,

    #[error("database task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("database connection still in use")]
    InUse,
}

/// Errors raised while substituting placeholders into a stored answer.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("unknown placeholder {{{0}}}")]
    UnknownKey(String),

    #[error("unmatched '{{' at byte {0}")]
    UnmatchedOpen(usize),

    #[error("single '}}' encountered at byte {0}")]
    UnmatchedClose(usize),
}

/// Errors surfaced by a message handler.
#[derive(Error, Debug)]
pub enum BotError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to render answer: {0}")]
    Format(#[from] FormatError),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BotError>;
