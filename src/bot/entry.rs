//! The FAQ entry model.

use std::fmt;
use std::str::FromStr;

/// How the transport should render an attached file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewType {
    Image,
    Gif,
    Sticker,
    Audio,
    Voice,
    Video,
    File,
}

impl ViewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewType::Image => "image",
            ViewType::Gif => "gif",
            ViewType::Sticker => "sticker",
            ViewType::Audio => "audio",
            ViewType::Voice => "voice",
            ViewType::Video => "video",
            ViewType::File => "file",
        }
    }

    /// Filename used when the transport doesn't supply one.
    pub fn default_filename(&self) -> &'static str {
        match self {
            ViewType::Image => "image.jpg",
            ViewType::Gif => "animation.mp4",
            ViewType::Sticker => "sticker.webp",
            ViewType::Audio => "audio.mp3",
            ViewType::Voice => "voice.ogg",
            ViewType::Video => "video.mp4",
            ViewType::File => "file",
        }
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(ViewType::Image),
            "gif" => Ok(ViewType::Gif),
            "sticker" => Ok(ViewType::Sticker),
            "audio" => Ok(ViewType::Audio),
            "voice" => Ok(ViewType::Voice),
            "video" => Ok(ViewType::Video),
            "file" => Ok(ViewType::File),
            other => Err(format!("unknown view type: {other}")),
        }
    }
}

/// A stored file. Name, bytes and view type always travel together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub view_type: ViewType,
}

/// A saved tag and its answer, scoped to one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaqEntry {
    pub chat_id: i64,
    pub question: String,
    /// May contain `{name}` and `{faq}` placeholders.
    pub answer_text: Option<String>,
    pub attachment: Option<Attachment>,
}

impl FaqEntry {
    pub fn new(chat_id: i64, question: impl Into<String>) -> Self {
        Self {
            chat_id,
            question: question.into(),
            answer_text: None,
            attachment: None,
        }
    }
}

#[cfg(test)]
impl FaqEntry {
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.answer_text = Some(text.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}
