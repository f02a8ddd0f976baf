//! Handler for the `block` command.

use std::sync::Arc;

use serde_json::json;

use crate::adapter::inbound::cli::command::BlockArgs;
use crate::adapter::inbound::cli::output;
use crate::adapter::outbound::notifier::telegram::format::{
    block_message, split_message, MAX_MESSAGE_LEN,
};
use crate::app::{build_block_source, build_reporter, Config};
use crate::domain::BlockRef;
use crate::error::Result;
use crate::port::BlockSource;

/// Print the Telegram messages a block would produce.
pub async fn execute(args: &BlockArgs) -> Result<()> {
    let mut config = Config::load(&args.config)?;
    if args.no_prices {
        config.price.enabled = false;
    }

    let block: BlockRef = match args.block.trim().parse() {
        Ok(block) => block,
        Err(never) => match never {},
    };

    let source: Arc<dyn BlockSource> = build_block_source(&config)?;
    let reporter = build_reporter(&config, source);
    let report = reporter.report(&block).await?;

    let message = block_message(&report, &config.message_format());
    let parts = split_message(&message, MAX_MESSAGE_LEN);

    if output::is_json() {
        output::json_output(json!({
            "command": "block",
            "height": report.summary.height,
            "hash": report.summary.hash,
            "miner": report.summary.miner,
            "tokens": report.summary.token_ids(),
            "parts": parts,
        }));
        return Ok(());
    }

    let count = parts.len();
    for (index, part) in parts.iter().enumerate() {
        if count > 1 {
            output::note(&format!("message {}/{count}", index + 1));
        }
        output::raw(part);
    }

    Ok(())
}
