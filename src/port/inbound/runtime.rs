//! Runtime status port for operator-facing adapters.
//!
//! Keeps control surfaces (e.g., Telegram bot commands) decoupled from the
//! concrete application state.

use chrono::{DateTime, Utc};

use crate::domain::DailySummary;

/// Point-in-time view of the running bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSnapshot {
    pub started_at: DateTime<Utc>,
    /// Height and hash of the last block handled.
    pub last_block: Option<(u64, String)>,
    pub last_block_at: Option<DateTime<Utc>>,
    pub blocks_announced: u64,
    pub fallbacks: u64,
    pub reorgs: u64,
}

/// Read access to runtime state.
pub trait RuntimeState: Send + Sync {
    fn snapshot(&self) -> RuntimeSnapshot;

    /// Statistics gathered since the last daily summary.
    fn today(&self) -> DailySummary;
}
