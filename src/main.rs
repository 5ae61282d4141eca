mod bot;
mod config;

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{debug, error, info};
use tracing_subscriber::prelude::*;

use bot::{FaqBot, FaqStore, TelegramClient};
use config::Config;

struct BotState {
    config: Config,
    faq: FaqBot,
}

#[tokio::main]
async fn main() {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "faqbot.json".to_string());
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Setup logging
    let log_dir = config.data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).ok();
    let file_appender = tracing_appender::rolling::never(&log_dir, "faqbot.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(
                    tracing_subscriber::EnvFilter::from_default_env()
                        .add_directive(tracing::Level::INFO.into()),
                ),
        )
        .init();

    info!("🚀 Starting faqbot...");
    info!("Loaded config from {config_path}");
    info!("Data directory: {:?}", config.data_dir);

    let store = match FaqStore::open(&config.database_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("Failed to open database {:?}: {e}", config.database_path);
            std::process::exit(1);
        }
    };

    let bot = Bot::new(&config.telegram_bot_token);
    let username = match bot.get_me().await {
        Ok(me) => {
            info!("Bot user ID: {}, username: @{}", me.id, me.username());
            me.username().to_string()
        }
        Err(e) => {
            error!("Failed to reach Telegram: {e}");
            std::process::exit(1);
        }
    };

    let telegram = Arc::new(TelegramClient::new(bot.clone()));
    let state = Arc::new(BotState {
        config,
        faq: FaqBot::new(store.clone(), telegram).with_username(username),
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state.clone()])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Shutting down");
    drop(state);
    match Arc::try_unwrap(store) {
        Ok(store) => {
            if let Err(e) = store.close() {
                error!("Failed to close database: {e}");
            }
        }
        Err(_) => error!("Database still in use at shutdown"),
    }
}

async fn handle_message(msg: Message, state: Arc<BotState>) -> ResponseResult<()> {
    if !state.config.is_allowed_chat(msg.chat.id) {
        return Ok(());
    }

    let incoming = bot::telegram::to_incoming(&msg);
    let preview: String = incoming.text.chars().take(100).collect();
    debug!(
        "Message {} in chat {}: {:?} (reply: {})",
        incoming.message_id,
        incoming.chat_id,
        preview,
        incoming.quote.is_some()
    );

    if let Err(e) = state.faq.handle_message(&incoming).await {
        error!(
            "Failed to handle message {} in chat {}: {e}",
            incoming.message_id, incoming.chat_id
        );
    }

    Ok(())
}
