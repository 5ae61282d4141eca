use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use teloxide::types::ChatId;
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    ReadFile { path: PathBuf, source: std::io::Error },

    #[error("failed to parse config file '{}': {source}", path.display())]
    ParseJson { path: PathBuf, source: serde_json::Error },

    #[error("failed to create data directory '{}': {source}", path.display())]
    DataDir { path: PathBuf, source: std::io::Error },

    #[error("config validation error: {0}")]
    Validation(String),
}

#[derive(Deserialize)]
struct ConfigFile {
    telegram_bot_token: String,
    /// Chats the bot answers in. Empty means every chat it is added to.
    #[serde(default)]
    allowed_chats: Vec<i64>,
    /// Directory for state files (database, logs). Defaults to the user config dir.
    data_dir: Option<String>,
    #[serde(default = "default_database_file")]
    database_file: String,
}

fn default_database_file() -> String {
    "sqlite.db".to_string()
}

pub struct Config {
    pub telegram_bot_token: String,
    pub allowed_chats: HashSet<ChatId>,
    /// Directory for state files. Exists once [`Config::load`] returns.
    pub data_dir: PathBuf,
    pub database_path: PathBuf,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadFile { path: config_path.clone(), source: e })?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| ConfigError::ParseJson { path: config_path.clone(), source: e })?;

        if file.telegram_bot_token.is_empty() {
            return Err(ConfigError::Validation("telegram_bot_token is required".into()));
        }
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = file.telegram_bot_token.split(':').collect();
        if token_parts.len() != 2 || token_parts[0].parse::<u64>().is_err() || token_parts[1].is_empty() {
            return Err(ConfigError::Validation(
                "telegram_bot_token appears invalid (expected format: 123456789:ABCdefGHI...)".into()
            ));
        }

        let database_file = Path::new(&file.database_file);
        if database_file.file_name().map(|n| n != database_file.as_os_str()).unwrap_or(true) {
            return Err(ConfigError::Validation(
                "database_file must be a plain file name inside data_dir".into()
            ));
        }

        let data_dir = file
            .data_dir
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| ConfigError::DataDir { path: data_dir.clone(), source: e })?;

        Ok(Self {
            telegram_bot_token: file.telegram_bot_token,
            allowed_chats: file.allowed_chats.into_iter().map(ChatId).collect(),
            database_path: data_dir.join(database_file),
            data_dir,
        })
    }

    pub fn is_allowed_chat(&self, chat_id: ChatId) -> bool {
        self.allowed_chats.is_empty() || self.allowed_chats.contains(&chat_id)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("faqbot"))
        .unwrap_or_else(|| PathBuf::from("."))
}
