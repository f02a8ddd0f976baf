//! Handler for the `config` command group.

use std::fs;
use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::app::Config;
use crate::error::{ConfigError, Result};

/// Default config template with documentation.
const CONFIG_TEMPLATE: &str = include_str!("../../../../config.toml.example");

/// Execute `config init`.
pub fn execute_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::InvalidValue {
            field: "config",
            reason: "file already exists (use --force to overwrite)".to_string(),
        }
        .into());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, CONFIG_TEMPLATE)?;
    output::section("Config Initialized");
    output::success("Created configuration file");
    output::field("Path", path.display());
    output::section("Next Steps");
    output::note(&format!("1. Edit {} with your settings", path.display()));
    output::note("2. Set TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID");
    output::note(&format!("3. Run: herald check telegram -c {}", path.display()));
    output::note(&format!("4. Run: herald run -c {}", path.display()));
    Ok(())
}

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config = Config::load(path)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "config.show",
            "config": serde_json::to_value(&config)?,
            "telegram_credentials": telegram_credentials().is_some(),
        }));
        return Ok(());
    }

    output::section("Indexer");
    for url in &config.indexer.urls {
        output::field("URL", url);
    }
    output::field("Timeout", format!("{}s", config.indexer.timeout_secs));
    output::field("Page size", config.indexer.page_size);

    output::section("Tracker");
    output::field("Poll", format!("{}ms", config.tracker.poll_interval_ms));
    output::field("Max catch-up", config.tracker.max_catch_up);
    output::field(
        "Start height",
        config
            .tracker
            .start_height
            .map_or_else(|| "tip".to_string(), |h| h.to_string()),
    );
    output::field(
        "State file",
        config
            .tracker
            .state_file
            .as_ref()
            .map_or_else(|| "(none)".to_string(), |p| p.display().to_string()),
    );

    output::section("Report");
    output::field("Explorer", &config.report.explorer_url);
    output::field("XEC sends", config.report.max_xec_sends);
    output::field("Token sends", config.report.max_token_sends);
    output::field("Whale", format!("{} sats", config.report.whale_sats));
    output::field(
        "Prices",
        if config.price.enabled {
            config.price.api_url.as_str()
        } else {
            "disabled"
        },
    );

    output::section("Notifications");
    output::field(
        "Telegram",
        if config.telegram.enabled {
            "enabled"
        } else {
            "disabled"
        },
    );
    match telegram_credentials() {
        Some((token, chat_id)) => {
            output::field("Bot token", mask_token(&token));
            output::field("Chat ID", chat_id);
        }
        None if config.telegram.enabled => {
            output::warning("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set");
        }
        None => {}
    }
    output::field(
        "Daily summary",
        if config.summary.enabled {
            format!("{:02}:00 UTC", config.summary.hour_utc)
        } else {
            "disabled".to_string()
        },
    );

    if !config.miners.is_empty() {
        output::section("Miners");
        for miner in &config.miners {
            let signature = miner
                .coinbase_tag
                .as_deref()
                .map(|tag| format!("tag {tag}"))
                .or_else(|| {
                    miner
                        .payout_script
                        .as_deref()
                        .map(|script| format!("script {script}"))
                })
                .unwrap_or_default();
            output::field(&miner.name, signature);
        }
    }

    output::section("Logging");
    output::field("Level", &config.logging.level);
    output::field("Format", &config.logging.format);

    Ok(())
}

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    let config = Config::load(path)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "config.validate",
            "path": path.display().to_string(),
            "valid": true,
            "telegram_enabled": config.telegram.enabled,
        }));
        return Ok(());
    }

    output::success(&format!("{} is valid", path.display()));
    if config.telegram.enabled && telegram_credentials().is_none() {
        output::warning("Telegram is enabled but TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID is not set");
    }
    Ok(())
}

fn telegram_credentials() -> Option<(String, String)> {
    let token = std::env::var("TELEGRAM_BOT_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty())?;
    let chat_id = std::env::var("TELEGRAM_CHAT_ID")
        .ok()
        .filter(|c| !c.trim().is_empty())?;
    Some((token, chat_id))
}

/// Hide all but the edges of a secret.
pub(crate) fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
