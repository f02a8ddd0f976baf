//! Telegram notification and command handling.
//!
//! Provides the [`TelegramNotifier`] for posting block announcements and
//! handling bot commands. Spawns background workers for both outbound
//! messages and inbound command processing.
//!
//! Requires the `telegram` feature to be enabled.

use std::sync::Arc;
use std::time::Duration;

use teloxide::prelude::*;
use teloxide::types::{BotCommand, LinkPreviewOptions, ParseMode};
use teloxide::RequestError;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::port::inbound::runtime::RuntimeState;
use crate::port::outbound::notifier::{Event, Notifier};

use super::auth::command_response_for_message;
use super::command::bot_commands;
use super::control::TelegramControl;
use super::format::{format_event_message, split_message, MessageFormat, MAX_MESSAGE_LEN};

/// Attempts per message part before it is dropped.
const MAX_SEND_ATTEMPTS: u32 = 3;

/// Configuration for the Telegram notifier.
///
/// Controls which events trigger notifications and how messages are paced.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot API token obtained from BotFather.
    pub bot_token: String,
    /// Target chat ID for announcements and the only chat allowed to command the bot.
    pub chat_id: i64,
    pub notify_blocks: bool,
    pub notify_reorgs: bool,
    pub notify_daily_summary: bool,
    /// Pause between consecutive messages.
    pub message_interval: Duration,
    /// Alternative Bot API server.
    pub api_url: Option<Url>,
    pub format: MessageFormat,
}

impl TelegramConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`. Returns `None` if
    /// either is missing or invalid. Everything else starts at its default.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty())?;
        let chat_id = std::env::var("TELEGRAM_CHAT_ID")
            .ok()
            .and_then(|s| s.trim().parse().ok())?;

        Some(Self {
            bot_token,
            chat_id,
            notify_blocks: true,
            notify_reorgs: true,
            notify_daily_summary: true,
            message_interval: Duration::from_secs(3),
            api_url: None,
            format: MessageFormat::default(),
        })
    }

    /// Whether an event should be posted at all.
    #[must_use]
    pub fn wants(&self, event: &Event) -> bool {
        match event {
            Event::BlockConnected(_) | Event::BlockFallback { .. } => self.notify_blocks,
            Event::ChainReorganized { .. } => self.notify_reorgs,
            Event::DailySummary(_) => self.notify_daily_summary,
        }
    }

    /// Bot client pointed at the configured API server.
    #[must_use]
    pub fn bot(&self) -> Bot {
        let bot = Bot::new(&self.bot_token);
        match &self.api_url {
            Some(url) => bot.set_api_url(url.clone()),
            None => bot,
        }
    }
}

/// Telegram notifier that posts messages to a chat.
///
/// Implements the [`Notifier`] trait and spawns background workers for
/// message delivery and command handling.
pub struct TelegramNotifier {
    /// Channel sender for queuing outbound notifications.
    sender: mpsc::UnboundedSender<Event>,
}

impl TelegramNotifier {
    /// Create a new Telegram notifier and spawn the background worker.
    ///
    /// This constructor creates a notification-only notifier without
    /// command handling capabilities.
    #[must_use]
    pub fn new(config: TelegramConfig) -> Self {
        Self::new_inner(config, None)
    }

    /// Create a notifier that also answers bot commands from the configured chat.
    #[must_use]
    pub fn new_with_control(config: TelegramConfig, state: Arc<dyn RuntimeState>) -> Self {
        Self::new_inner(config, Some(state))
    }

    fn new_inner(config: TelegramConfig, state: Option<Arc<dyn RuntimeState>>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        tokio::spawn(telegram_worker(config.clone(), receiver));

        if let Some(state) = state {
            tokio::spawn(telegram_command_worker(config, TelegramControl::new(state)));
        }

        Self { sender }
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, event: Event) {
        if self.sender.send(event).is_err() {
            warn!("Telegram notifier channel closed");
        }
    }
}

/// Background worker that posts messages in order, spaced by the message interval.
async fn telegram_worker(config: TelegramConfig, mut receiver: mpsc::UnboundedReceiver<Event>) {
    let bot = config.bot();
    let chat_id = ChatId(config.chat_id);

    info!(chat_id = config.chat_id, "Telegram notifier started");

    while let Some(event) = receiver.recv().await {
        if !config.wants(&event) {
            continue;
        }

        let message = format_event_message(&event, &config.format);
        for part in split_message(&message, MAX_MESSAGE_LEN) {
            send_with_retry(&bot, chat_id, &part, config.message_interval).await;
            tokio::time::sleep(config.message_interval).await;
        }
    }

    warn!("Telegram notifier worker shutting down");
}

/// Send one HTML message, retrying transient failures a bounded number of times.
async fn send_with_retry(bot: &Bot, chat_id: ChatId, text: &str, backoff: Duration) {
    for attempt in 1..=MAX_SEND_ATTEMPTS {
        let result = bot
            .send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .link_preview_options(LinkPreviewOptions {
                is_disabled: true,
                url: None,
                prefer_small_media: false,
                prefer_large_media: false,
                show_above_text: false,
            })
            .await;

        let wait = match result {
            Ok(_) => {
                debug!(chat_id = chat_id.0, chars = text.chars().count(), "Telegram message sent");
                return;
            }
            Err(RequestError::RetryAfter(seconds)) => seconds.duration(),
            Err(RequestError::Api(e)) => {
                error!(error = %e, "Telegram rejected message");
                return;
            }
            Err(e) => {
                warn!(error = %e, attempt, "Failed to send Telegram message");
                backoff * attempt
            }
        };

        if attempt < MAX_SEND_ATTEMPTS {
            tokio::time::sleep(wait).await;
        }
    }

    error!(
        attempts = MAX_SEND_ATTEMPTS,
        "Giving up on Telegram message"
    );
}

/// Background worker that handles inbound Telegram commands.
async fn telegram_command_worker(config: TelegramConfig, control: TelegramControl) {
    let bot = config.bot();
    let allowed_chat = ChatId(config.chat_id);

    // Register commands with Telegram so they appear in the "/" menu
    if let Err(e) = register_bot_commands(&bot).await {
        warn!(error = %e, "Failed to register bot commands with Telegram");
    }

    info!(
        chat_id = config.chat_id,
        "Telegram command listener started"
    );

    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let control = control.clone();
        async move {
            let Some(text) = msg.text() else {
                return respond(());
            };

            if let Some(response) =
                command_response_for_message(text, msg.chat.id, allowed_chat, &control)
            {
                if let Err(e) = bot.send_message(msg.chat.id, response).await {
                    error!(error = %e, "Failed to send Telegram command response");
                }
            }

            respond(())
        }
    })
    .await;
}

/// Register bot commands with Telegram for the "/" menu.
async fn register_bot_commands(bot: &Bot) -> Result<(), RequestError> {
    let commands: Vec<BotCommand> = bot_commands()
        .into_iter()
        .map(|(cmd, desc)| BotCommand::new(cmd, desc))
        .collect();

    bot.set_my_commands(commands).await?;
    info!("Registered bot commands with Telegram");
    Ok(())
}

/// Confirm the bot token by asking Telegram who the bot is.
///
/// Returns the bot's username.
pub async fn check_bot(config: &TelegramConfig) -> Result<String, RequestError> {
    let me = config.bot().get_me().await?;
    Ok(me.user.username.clone().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::domain::DailySummary;

    /// Mutex to serialize tests that modify environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        std::env::remove_var("TELEGRAM_BOT_TOKEN");
        std::env::remove_var("TELEGRAM_CHAT_ID");
    }

    #[test]
    fn test_from_env_missing_token() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        assert!(TelegramConfig::from_env().is_none());
    }

    #[test]
    fn test_from_env_missing_chat_id() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("TELEGRAM_BOT_TOKEN", "test-token");

        assert!(TelegramConfig::from_env().is_none());

        clear_env();
    }

    #[test]
    fn test_from_env_invalid_chat_id() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("TELEGRAM_BOT_TOKEN", "test-token");
        std::env::set_var("TELEGRAM_CHAT_ID", "not-a-number");

        assert!(TelegramConfig::from_env().is_none());

        clear_env();
    }

    #[test]
    fn test_from_env_blank_token() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("TELEGRAM_BOT_TOKEN", "  ");
        std::env::set_var("TELEGRAM_CHAT_ID", "12345");

        assert!(TelegramConfig::from_env().is_none());

        clear_env();
    }

    #[test]
    fn test_from_env_valid() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("TELEGRAM_BOT_TOKEN", "test-token");
        std::env::set_var("TELEGRAM_CHAT_ID", "-1001234567890");

        let config = TelegramConfig::from_env().unwrap();
        assert_eq!(config.bot_token, "test-token");
        assert_eq!(config.chat_id, -1_001_234_567_890);
        assert!(config.notify_blocks);
        assert!(config.notify_reorgs);
        assert!(config.notify_daily_summary);
        assert_eq!(config.message_interval, Duration::from_secs(3));

        clear_env();
    }

    #[test]
    fn wants_follows_notify_flags() {
        let config = TelegramConfig {
            bot_token: "t".into(),
            chat_id: 1,
            notify_blocks: false,
            notify_reorgs: true,
            notify_daily_summary: false,
            message_interval: Duration::ZERO,
            api_url: None,
            format: MessageFormat::default(),
        };

        assert!(!config.wants(&Event::BlockFallback {
            height: 1,
            hash: "a".into()
        }));
        assert!(config.wants(&Event::ChainReorganized {
            height: 1,
            hash: "a".into()
        }));
        assert!(!config.wants(&Event::DailySummary(DailySummary::default())));
    }
}
