//! Connectivity check command handlers.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::chronik::ChronikClient;
use crate::app::Config;
use crate::error::{Error, Result};
use crate::port::BlockSource;

/// Ask every configured indexer URL for its tip.
///
/// Succeeds if at least one URL answers.
pub async fn execute_indexer(config_path: &Path) -> Result<()> {
    let config = Config::load(config_path)?;

    if !output::is_json() {
        output::section("Indexer Check");
    }

    let mut results = Vec::new();
    let mut last_error = None;
    for url in &config.indexer.urls {
        output::action("Checking", url);
        let client = ChronikClient::new(vec![url.clone()], config.indexer.timeout())?;
        match client.blockchain_info().await {
            Ok(info) => {
                output::success(&format!("{url} at height {}", info.tip_height));
                results.push(json!({
                    "url": url,
                    "ok": true,
                    "tip_height": info.tip_height,
                    "tip_hash": info.tip_hash,
                }));
            }
            Err(e) => {
                output::warning(&format!("{url}: {e}"));
                results.push(json!({ "url": url, "ok": false, "error": e.to_string() }));
                last_error = Some(e);
            }
        }
    }

    let reachable = results
        .iter()
        .filter(|r| r["ok"].as_bool().unwrap_or(false))
        .count();

    if output::is_json() {
        output::json_output(json!({
            "command": "check.indexer",
            "reachable": reachable,
            "results": results,
        }));
    }

    match last_error {
        Some(e) if reachable == 0 => Err(e),
        _ => Ok(()),
    }
}

/// Verify the Telegram bot token, optionally posting a test message.
#[cfg(feature = "telegram")]
pub async fn execute_telegram(config_path: &Path, send: bool) -> Result<()> {
    use teloxide::prelude::*;

    use crate::adapter::inbound::cli::config::mask_token;
    use crate::adapter::outbound::notifier::telegram::notifier::check_bot;
    use crate::app::telegram_config;

    let config = Config::load(config_path)?;
    let Some(tg_config) = telegram_config(&config) else {
        return Err(Error::Notify(
            "TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID not set".to_string(),
        ));
    };

    if !output::is_json() {
        output::section("Telegram Check");
        output::field("Bot token", mask_token(&tg_config.bot_token));
        output::field("Chat ID", tg_config.chat_id);
    }

    output::action("Checking", "bot token");
    let username = check_bot(&tg_config)
        .await
        .map_err(|e| Error::Notify(e.to_string()))?;
    output::success(&format!("Authenticated as @{username}"));

    if send {
        output::action("Sending", "test message");
        tg_config
            .bot()
            .send_message(
                ChatId(tg_config.chat_id),
                format!("herald {} test message", env!("CARGO_PKG_VERSION")),
            )
            .await
            .map_err(|e| Error::Notify(e.to_string()))?;
        output::success("Test message sent");
    }

    if output::is_json() {
        output::json_output(json!({
            "command": "check.telegram",
            "masked_token": mask_token(&tg_config.bot_token),
            "chat_id": tg_config.chat_id,
            "username": username,
            "sent": send,
        }));
    }

    Ok(())
}

#[cfg(not(feature = "telegram"))]
pub async fn execute_telegram(_config_path: &Path, _send: bool) -> Result<()> {
    Err(Error::Notify(
        "this build has no telegram support".to_string(),
    ))
}
