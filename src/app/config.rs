//! Application configuration loading and validation.
//!
//! Configuration is loaded from a TOML file. The Telegram bot token and chat
//! id are never read from the file; they come from `TELEGRAM_BOT_TOKEN` and
//! `TELEGRAM_CHAT_ID`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

use crate::adapter::outbound::notifier::telegram::format::MessageFormat;
use crate::domain::{KnownMiner, MinerDirectory};
use crate::error::{ConfigError, Result};

/// Most transactions the indexer returns per page.
const MAX_PAGE_SIZE: u32 = 200;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub indexer: IndexerConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub price: PriceConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub telegram: TelegramAppConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    /// Extra miner signatures, checked before the built-in ones.
    #[serde(default)]
    pub miners: Vec<KnownMiner>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Chronik indexer endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// Instances in failover order.
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default = "default_indexer_timeout_secs")]
    pub timeout_secs: u64,
    /// Transactions requested per block page.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

const fn default_indexer_timeout_secs() -> u64 {
    10
}

const fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            urls: vec!["https://chronik.e.cash".to_string()],
            timeout_secs: default_indexer_timeout_secs(),
            page_size: default_page_size(),
        }
    }
}

impl IndexerConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Block polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Blocks behind the tip beyond which the tracker skips ahead.
    #[serde(default = "default_max_catch_up")]
    pub max_catch_up: u64,
    /// First block to announce when no state file exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_height: Option<u64>,
    /// Where the last handled block is remembered across restarts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_file: Option<PathBuf>,
}

const fn default_poll_interval_ms() -> u64 {
    5_000
}

const fn default_max_catch_up() -> u64 {
    10
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_catch_up: default_max_catch_up(),
            start_height: None,
            state_file: None,
        }
    }
}

impl TrackerConfig {
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// USD price feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_price_api_url")]
    pub api_url: String,
    #[serde(default = "default_price_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_price_api_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

const fn default_price_timeout_secs() -> u64 {
    5
}

impl Default for PriceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: default_price_api_url(),
            timeout_secs: default_price_timeout_secs(),
        }
    }
}

impl PriceConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// What goes into a block announcement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_explorer_url")]
    pub explorer_url: String,
    #[serde(default = "default_max_sends")]
    pub max_xec_sends: usize,
    #[serde(default = "default_max_sends")]
    pub max_token_sends: usize,
    /// XEC sends of at least this many sats get the whale marker.
    #[serde(default = "default_whale_sats")]
    pub whale_sats: u64,
}

fn default_explorer_url() -> String {
    "https://explorer.e.cash".to_string()
}

const fn default_max_sends() -> usize {
    10
}

/// 10M XEC.
const fn default_whale_sats() -> u64 {
    1_000_000_000
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            explorer_url: default_explorer_url(),
            max_xec_sends: default_max_sends(),
            max_token_sends: default_max_sends(),
            whale_sats: default_whale_sats(),
        }
    }
}

impl From<&ReportConfig> for MessageFormat {
    fn from(config: &ReportConfig) -> Self {
        Self {
            explorer_url: config.explorer_url.clone(),
            max_xec_sends: config.max_xec_sends,
            max_token_sends: config.max_token_sends,
        }
    }
}

const fn default_true() -> bool {
    true
}

/// Telegram notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramAppConfig {
    /// Enable telegram notifications.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub notify_blocks: bool,
    #[serde(default = "default_true")]
    pub notify_reorgs: bool,
    #[serde(default = "default_true")]
    pub notify_daily_summary: bool,
    /// Pause between consecutive messages, to stay under Telegram rate limits.
    #[serde(default = "default_message_interval_ms")]
    pub message_interval_ms: u64,
    /// Alternative Bot API server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

const fn default_message_interval_ms() -> u64 {
    3_000
}

impl Default for TelegramAppConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            notify_blocks: true,
            notify_reorgs: true,
            notify_daily_summary: true,
            message_interval_ms: default_message_interval_ms(),
            api_url: None,
        }
    }
}

impl TelegramAppConfig {
    #[must_use]
    pub const fn message_interval(&self) -> Duration {
        Duration::from_millis(self.message_interval_ms)
    }
}

/// Daily summary schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// UTC hour the summary goes out.
    #[serde(default)]
    pub hour_utc: u32,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hour_utc: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// `pretty` or `json`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse(&content)
    }

    /// Parse and validate TOML text.
    #[allow(clippy::result_large_err)]
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.indexer.urls.is_empty() {
            return Err(ConfigError::MissingField {
                field: "indexer.urls",
            }
            .into());
        }
        for url in &self.indexer.urls {
            check_http_url("indexer.urls", url)?;
        }
        if self.indexer.timeout_secs == 0 {
            return Err(invalid("indexer.timeout_secs", "must be greater than 0"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&self.indexer.page_size) {
            return Err(invalid(
                "indexer.page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }

        if self.tracker.poll_interval_ms == 0 {
            return Err(invalid("tracker.poll_interval_ms", "must be greater than 0"));
        }
        if self.tracker.max_catch_up == 0 {
            return Err(invalid("tracker.max_catch_up", "must be greater than 0"));
        }

        if self.price.enabled {
            check_http_url("price.api_url", &self.price.api_url)?;
            if self.price.timeout_secs == 0 {
                return Err(invalid("price.timeout_secs", "must be greater than 0"));
            }
        }

        check_http_url("report.explorer_url", &self.report.explorer_url)?;

        if let Some(api_url) = &self.telegram.api_url {
            check_http_url("telegram.api_url", api_url)?;
        }

        if self.summary.hour_utc > 23 {
            return Err(invalid("summary.hour_utc", "must be between 0 and 23"));
        }

        for miner in &self.miners {
            if miner.name.trim().is_empty() {
                return Err(invalid("miners", "every miner needs a name"));
            }
            if miner.coinbase_tag.is_none() && miner.payout_script.is_none() {
                return Err(invalid(
                    "miners",
                    format!("{} needs a coinbase_tag or a payout_script", miner.name),
                ));
            }
            if let Some(script) = &miner.payout_script {
                if hex::decode(script).is_err() {
                    return Err(invalid(
                        "miners",
                        format!("payout_script of {} is not hex", miner.name),
                    ));
                }
            }
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(invalid("logging.format", "must be \"pretty\" or \"json\""));
        }

        Ok(())
    }

    #[must_use]
    pub fn message_format(&self) -> MessageFormat {
        MessageFormat::from(&self.report)
    }

    /// Built-in miners with the configured ones layered on top.
    #[must_use]
    pub fn miner_directory(&self) -> MinerDirectory {
        MinerDirectory::new(self.miners.clone())
    }

    pub fn init_logging(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(&self.logging.level));

        match self.logging.format.as_str() {
            "json" => {
                fmt().json().with_env_filter(filter).init();
            }
            _ => {
                fmt().with_env_filter(filter).init();
            }
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
    .into()
}

#[allow(clippy::result_large_err)]
fn check_http_url(field: &'static str, value: &str) -> Result<()> {
    let url = Url::parse(value).map_err(|e| invalid(field, format!("{value}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(field, format!("{value}: expected an http(s) URL")));
    }
    Ok(())
}
