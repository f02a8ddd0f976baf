//! Adapter construction from configuration.

use std::sync::Arc;

use tracing::{info, warn};

use crate::adapter::outbound::chronik::ChronikClient;
use crate::adapter::outbound::coingecko::CoinGeckoClient;
use crate::adapter::outbound::state_file::StateFileStore;
use crate::app::config::Config;
use crate::app::herald::BlockReporter;
use crate::error::Result;
use crate::port::{BlockSource, CursorStore, LogNotifier, NotifierRegistry, PriceSource, RuntimeState};

#[cfg(feature = "telegram")]
use crate::adapter::outbound::notifier::telegram::notifier::{TelegramConfig, TelegramNotifier};

/// Indexer client over the configured URLs.
#[allow(clippy::result_large_err)]
pub(crate) fn build_block_source(config: &Config) -> Result<Arc<ChronikClient>> {
    let client = ChronikClient::new(config.indexer.urls.clone(), config.indexer.timeout())?;
    Ok(Arc::new(client))
}

/// Price feed, if enabled.
pub(crate) fn build_price_source(config: &Config) -> Option<Arc<dyn PriceSource>> {
    if !config.price.enabled {
        return None;
    }
    match CoinGeckoClient::new(&config.price.api_url, config.price.timeout()) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!(error = %e, "Price feed disabled");
            None
        }
    }
}

pub(crate) fn build_reporter(config: &Config, source: Arc<dyn BlockSource>) -> BlockReporter {
    BlockReporter::new(
        source,
        build_price_source(config),
        config.miner_directory(),
        config.indexer.page_size,
        config.report.whale_sats,
    )
}

pub(crate) fn build_cursor_store(config: &Config) -> Option<Box<dyn CursorStore>> {
    config
        .tracker
        .state_file
        .as_ref()
        .map(|path| Box::new(StateFileStore::new(path.clone())) as Box<dyn CursorStore>)
}

/// Telegram settings from the environment with the config file's switches applied.
#[cfg(feature = "telegram")]
pub(crate) fn telegram_config(config: &Config) -> Option<TelegramConfig> {
    let tg_config = TelegramConfig::from_env()?;
    let api_url = config
        .telegram
        .api_url
        .as_deref()
        .and_then(|raw| match url::Url::parse(raw) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(url = raw, error = %e, "Ignoring invalid Telegram API URL");
                None
            }
        });

    Some(TelegramConfig {
        notify_blocks: config.telegram.notify_blocks,
        notify_reorgs: config.telegram.notify_reorgs,
        notify_daily_summary: config.telegram.notify_daily_summary,
        message_interval: config.telegram.message_interval(),
        api_url,
        format: config.message_format(),
        ..tg_config
    })
}

/// Build notifier registry from configuration.
pub(crate) fn build_notifier_registry(
    config: &Config,
    state: Arc<dyn RuntimeState>,
) -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();

    // Always add log notifier
    registry.register(Box::new(LogNotifier));

    #[cfg(feature = "telegram")]
    if config.telegram.enabled {
        if let Some(tg_config) = telegram_config(config) {
            registry.register(Box::new(TelegramNotifier::new_with_control(tg_config, state)));
            info!("Telegram notifier enabled");
        } else {
            warn!("Telegram enabled but TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set");
        }
    }

    #[cfg(not(feature = "telegram"))]
    {
        let _ = state;
        if config.telegram.enabled {
            warn!("Telegram enabled in config but this build has no telegram support");
        } else {
            info!("Telegram notifications disabled");
        }
    }

    registry
}
