//! FAQ bot - saves quoted messages under a tag and answers when the tag is sent.

pub mod entry;
pub mod error;
pub mod message;
pub mod relay;
pub mod render;
pub mod router;
pub mod store;
pub mod telegram;
pub mod template;
pub mod transport;


pub use router::FaqBot;
pub use store::FaqStore;
pub use telegram::TelegramClient;
