use chrono::Utc;

use crate::domain::amount::format_xec;

use super::runtime::{format_uptime, short_hash};
use super::TelegramControl;

impl TelegramControl {
    pub(super) fn status_text(&self) -> String {
        let snapshot = self.state.snapshot();

        let last_block = snapshot.last_block.as_ref().map_or_else(
            || "none yet".to_string(),
            |(height, hash)| format!("{height} ({})", short_hash(hash)),
        );
        let last_block_at = snapshot.last_block_at.map_or_else(
            || "never".to_string(),
            |at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );

        format!(
            "📊 Status\n\n\
            ⏱️ Uptime: {}\n\
            📦 Last block: {}\n\
            🕒 Handled at: {}\n\n\
            📣 Blocks announced: {}\n\
            ⚠️ Fallbacks: {}\n\
            🔀 Reorgs: {}",
            format_uptime(snapshot.started_at, Utc::now()),
            last_block,
            last_block_at,
            snapshot.blocks_announced,
            snapshot.fallbacks,
            snapshot.reorgs
        )
    }

    pub(super) fn today_text(&self) -> String {
        let day = self.state.today();
        if day.blocks == 0 {
            return "📈 No blocks since the last daily summary".to_string();
        }

        let heights = match (day.first_height, day.last_height) {
            (Some(first), Some(last)) => format!(" ({first} to {last})"),
            _ => String::new(),
        };
        let top_miner = day
            .top_miners()
            .first()
            .map_or_else(|| "none".to_string(), |(name, blocks)| format!("{name} ({blocks})"));

        format!(
            "📈 Since the last summary\n\n\
            📦 Blocks: {}{}\n\
            🔁 Txs: {}\n\
            🧪 New eTokens: {}\n\
            🎟 eToken sends: {}\n\
            🔥 eToken burns: {}\n\
            📱 App txs: {}\n\
            💸 XEC sends: {} ({} XEC)\n\
            🐋 Whale sends: {}\n\
            ⛏️ Top miner: {}",
            day.blocks,
            heights,
            day.txs,
            day.token_geneses,
            day.token_sends,
            day.token_burns,
            day.app_txs,
            day.xec_sends,
            format_xec(day.sats_sent),
            day.whale_sends,
            top_miner
        )
    }

    pub(super) fn version_text(&self) -> String {
        let version = env!("CARGO_PKG_VERSION");

        // Set by the release pipeline when available.
        let commit = option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown");
        let build_date = option_env!("BUILD_DATE").unwrap_or("unknown");

        format!(
            "🔖 Version v{}\n\n\
            🔗 Commit: {}\n\
            📅 Built: {}",
            version, commit, build_date
        )
    }
}
