//! Running daily statistics for the end-of-day summary.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::block::BlockSummary;

/// Totals for one summary period, as announced in the daily summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    /// Day of the earliest block counted.
    pub date: Option<NaiveDate>,
    /// Day of the latest block counted. Differs from `date` when the period
    /// does not close at midnight UTC.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub blocks: u64,
    pub first_height: Option<u64>,
    pub last_height: Option<u64>,
    pub txs: u64,
    pub token_geneses: u64,
    pub token_sends: u64,
    pub token_burns: u64,
    pub app_txs: u64,
    pub xec_sends: u64,
    pub whale_sends: u64,
    pub sats_sent: u64,
    pub fees_sats: u64,
    pub staking_rewards: u64,
    /// Blocks found per miner.
    pub miners: BTreeMap<String, u64>,
}

impl DailySummary {
    /// Miners ordered by blocks found, most first; ties by name.
    #[must_use]
    pub fn top_miners(&self) -> Vec<(&str, u64)> {
        let mut miners: Vec<(&str, u64)> = self
            .miners
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        miners.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        miners
    }

    fn of_block(block: &BlockSummary) -> Self {
        let date = block.time().map(|t| t.date_naive());
        Self {
            date,
            end_date: date,
            blocks: 1,
            first_height: Some(block.height),
            last_height: Some(block.height),
            txs: block.num_txs,
            token_geneses: block.geneses.len() as u64,
            token_sends: block.token_sends.len() as u64,
            token_burns: block.token_burns.len() as u64,
            app_txs: block.app_txs.len() as u64,
            xec_sends: block.xec_sends.len() as u64,
            whale_sends: block.whale_sends() as u64,
            sats_sent: block.xec_sends.iter().map(|s| s.total_sats).sum(),
            fees_sats: block.total_fees,
            staking_rewards: u64::from(block.staking_reward.is_some()),
            miners: BTreeMap::from([(block.miner.clone(), 1)]),
        }
    }

    fn add(&mut self, block: &Self) {
        self.blocks += block.blocks;
        self.txs += block.txs;
        self.token_geneses += block.token_geneses;
        self.token_sends += block.token_sends;
        self.token_burns += block.token_burns;
        self.app_txs += block.app_txs;
        self.xec_sends += block.xec_sends;
        self.whale_sends += block.whale_sends;
        self.sats_sent += block.sats_sent;
        self.fees_sats += block.fees_sats;
        self.staking_rewards += block.staking_rewards;
        for (miner, count) in &block.miners {
            *self.miners.entry(miner.clone()).or_default() += count;
        }
    }

    fn subtract(&mut self, block: &Self) {
        self.blocks = self.blocks.saturating_sub(block.blocks);
        self.txs = self.txs.saturating_sub(block.txs);
        self.token_geneses = self.token_geneses.saturating_sub(block.token_geneses);
        self.token_sends = self.token_sends.saturating_sub(block.token_sends);
        self.token_burns = self.token_burns.saturating_sub(block.token_burns);
        self.app_txs = self.app_txs.saturating_sub(block.app_txs);
        self.xec_sends = self.xec_sends.saturating_sub(block.xec_sends);
        self.whale_sends = self.whale_sends.saturating_sub(block.whale_sends);
        self.sats_sent = self.sats_sent.saturating_sub(block.sats_sent);
        self.fees_sats = self.fees_sats.saturating_sub(block.fees_sats);
        self.staking_rewards = self.staking_rewards.saturating_sub(block.staking_rewards);
        for (miner, count) in &block.miners {
            if let Some(total) = self.miners.get_mut(miner) {
                *total = total.saturating_sub(*count);
                if *total == 0 {
                    self.miners.remove(miner);
                }
            }
        }
    }
}

/// Accumulates block summaries until the next summary is due.
///
/// Each counted block is remembered by hash for the rest of the period, so a
/// block orphaned by a reorg can be taken back out.
#[derive(Debug, Default)]
pub struct DailyStats {
    current: DailySummary,
    counted: HashMap<String, DailySummary>,
}

impl DailyStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a block. Recording the same hash twice counts it once.
    pub fn record(&mut self, block: &BlockSummary) {
        self.forget(&block.hash);
        let tally = DailySummary::of_block(block);
        self.current.add(&tally);
        self.counted.insert(block.hash.clone(), tally);
        self.refresh_bounds();
    }

    /// Take a rolled-back block out of the totals.
    ///
    /// Returns `false` if the block was not counted in this period.
    pub fn forget(&mut self, hash: &str) -> bool {
        let Some(tally) = self.counted.remove(hash) else {
            return false;
        };
        self.current.subtract(&tally);
        self.refresh_bounds();
        true
    }

    fn refresh_bounds(&mut self) {
        let blocks = self.counted.values();
        self.current.first_height = blocks.clone().filter_map(|b| b.first_height).min();
        self.current.last_height = blocks.clone().filter_map(|b| b.last_height).max();
        self.current.date = blocks.clone().filter_map(|b| b.date).min();
        self.current.end_date = blocks.filter_map(|b| b.end_date).max();
    }

    /// Snapshot of the totals so far.
    #[must_use]
    pub fn snapshot(&self) -> DailySummary {
        self.current.clone()
    }

    /// Finish the current period and start a new one.
    pub fn take(&mut self) -> DailySummary {
        self.counted.clear();
        std::mem::take(&mut self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::block::{TokenGenesis, XecSend};

    fn block(height: u64, miner: &str, sent: u64) -> BlockSummary {
        BlockSummary {
            hash: format!("{height:064x}"),
            height,
            timestamp: 1_700_000_000,
            num_txs: 3,
            miner: miner.into(),
            total_fees: 500,
            geneses: vec![TokenGenesis {
                txid: "g".into(),
                token_id: "t".into(),
            }],
            xec_sends: vec![XecSend {
                txid: "x".into(),
                sender_script: "a".into(),
                recipients: vec![("b".into(), sent)],
                total_sats: sent,
                fee_sats: 500,
                size: 219,
                is_whale: sent > 1_000,
            }],
            ..BlockSummary::default()
        }
    }

    #[test]
    fn accumulates_blocks() {
        let mut stats = DailyStats::new();
        stats.record(&block(101, "ViaBTC", 5_000));
        stats.record(&block(100, "Mining-Dutch", 500));
        stats.record(&block(102, "ViaBTC", 700));

        let day = stats.snapshot();
        assert_eq!(day.blocks, 3);
        assert_eq!(day.first_height, Some(100));
        assert_eq!(day.last_height, Some(102));
        assert_eq!(day.txs, 9);
        assert_eq!(day.token_geneses, 3);
        assert_eq!(day.sats_sent, 6_200);
        assert_eq!(day.whale_sends, 1);
        assert_eq!(day.fees_sats, 1_500);
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2023, 11, 14));
        assert_eq!(day.top_miners(), vec![("ViaBTC", 2), ("Mining-Dutch", 1)]);
    }

    #[test]
    fn forgetting_a_block_removes_its_share() {
        let mut stats = DailyStats::new();
        stats.record(&block(100, "Mining-Dutch", 500));
        stats.record(&block(101, "ViaBTC", 5_000));
        stats.record(&block(102, "ViaBTC", 700));

        assert!(stats.forget(&format!("{:064x}", 102)));
        assert!(!stats.forget(&format!("{:064x}", 102)));

        let day = stats.snapshot();
        assert_eq!(day.blocks, 2);
        assert_eq!(day.first_height, Some(100));
        assert_eq!(day.last_height, Some(101));
        assert_eq!(day.txs, 6);
        assert_eq!(day.sats_sent, 5_500);
        assert_eq!(day.fees_sats, 1_000);
        assert_eq!(day.top_miners(), vec![("Mining-Dutch", 1), ("ViaBTC", 1)]);

        assert!(stats.forget(&format!("{:064x}", 100)));
        assert!(stats.forget(&format!("{:064x}", 101)));
        let day = stats.snapshot();
        assert_eq!(day.blocks, 0);
        assert_eq!(day.first_height, None);
        assert_eq!(day.date, None);
        assert!(day.miners.is_empty());
    }

    #[test]
    fn recording_a_block_twice_counts_it_once() {
        let mut stats = DailyStats::new();
        stats.record(&block(100, "ViaBTC", 500));
        stats.record(&block(100, "ViaBTC", 500));

        let day = stats.snapshot();
        assert_eq!(day.blocks, 1);
        assert_eq!(day.miners["ViaBTC"], 1);
    }

    #[test]
    fn period_spanning_midnight_keeps_both_dates() {
        let mut stats = DailyStats::new();
        let mut evening = block(100, "ViaBTC", 500);
        evening.timestamp = 1_710_010_800; // 2024-03-09 19:00 UTC
        let mut morning = block(150, "ViaBTC", 500);
        morning.timestamp = 1_710_061_200; // 2024-03-10 09:00 UTC
        stats.record(&morning);
        stats.record(&evening);

        let day = stats.snapshot();
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 3, 9));
        assert_eq!(day.end_date, NaiveDate::from_ymd_opt(2024, 3, 10));
    }

    #[test]
    fn take_resets_the_period() {
        let mut stats = DailyStats::new();
        stats.record(&block(1, "ViaBTC", 10));
        let day = stats.take();
        assert_eq!(day.blocks, 1);
        assert_eq!(stats.snapshot(), DailySummary::default());
        assert!(!stats.forget(&format!("{:064x}", 1)));
    }
}
