//! Shared application state.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};

use crate::domain::{BlockSummary, DailyStats, DailySummary};
use crate::port::{RuntimeSnapshot, RuntimeState};

/// Counters and daily statistics shared between the tracker loop, the
/// summary task and the bot command listener.
pub struct AppState {
    status: RwLock<RuntimeSnapshot>,
    stats: Mutex<DailyStats>,
}

impl AppState {
    #[must_use]
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            status: RwLock::new(RuntimeSnapshot {
                started_at,
                last_block: None,
                last_block_at: None,
                blocks_announced: 0,
                fallbacks: 0,
                reorgs: 0,
            }),
            stats: Mutex::new(DailyStats::new()),
        }
    }

    /// Record a fully parsed block.
    pub fn record_block(&self, summary: &BlockSummary, at: DateTime<Utc>) {
        self.stats.lock().record(summary);
        let mut status = self.status.write();
        status.last_block = Some((summary.height, summary.hash.clone()));
        status.last_block_at = Some(at);
        status.blocks_announced += 1;
    }

    /// Record a block that could only be announced by height and hash.
    pub fn record_fallback(&self, height: u64, hash: &str, at: DateTime<Utc>) {
        let mut status = self.status.write();
        status.last_block = Some((height, hash.to_string()));
        status.last_block_at = Some(at);
        status.fallbacks += 1;
    }

    /// Record a rolled-back block and take it out of the daily stats.
    pub fn record_reorg(&self, hash: &str) {
        self.stats.lock().forget(hash);
        self.status.write().reorgs += 1;
    }

    /// Close the current summary period and start a new one.
    pub fn take_daily_summary(&self) -> DailySummary {
        self.stats.lock().take()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl RuntimeState for AppState {
    fn snapshot(&self) -> RuntimeSnapshot {
        self.status.read().clone()
    }

    fn today(&self) -> DailySummary {
        self.stats.lock().snapshot()
    }
}
