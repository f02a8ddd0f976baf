//! Turning tracked blocks into notifications.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use tracing::{debug, info, warn};

use crate::app::state::AppState;
use crate::app::tracker::TrackingMessage;
use crate::domain::{parse_block, BlockInfo, BlockRef, BlockReport, MinerDirectory, TokenInfo};
use crate::error::Result;
use crate::port::{BlockSource, Event, NotifierRegistry, PriceSource};

/// Builds a [`BlockReport`] from indexer data.
pub struct BlockReporter {
    source: Arc<dyn BlockSource>,
    prices: Option<Arc<dyn PriceSource>>,
    miners: MinerDirectory,
    page_size: u32,
    whale_sats: u64,
}

impl BlockReporter {
    #[must_use]
    pub fn new(
        source: Arc<dyn BlockSource>,
        prices: Option<Arc<dyn PriceSource>>,
        miners: MinerDirectory,
        page_size: u32,
        whale_sats: u64,
    ) -> Self {
        Self {
            source,
            prices,
            miners,
            page_size,
            whale_sats,
        }
    }

    /// Look a block up by height or hash and report on it.
    pub async fn report(&self, block: &BlockRef) -> Result<BlockReport> {
        let info = self.source.block(block).await?;
        self.report_block(&info).await
    }

    /// Fetch every transaction of `info`, parse them and attach token
    /// metadata and prices.
    ///
    /// Tokens the indexer does not know and an unavailable price feed only
    /// make the report thinner; failing to load the transactions is an error.
    pub async fn report_block(&self, info: &BlockInfo) -> Result<BlockReport> {
        let block = BlockRef::Hash(info.hash.clone());
        let txs = self.source.all_block_txs(&block, self.page_size).await?;
        debug!(height = info.height, txs = txs.len(), "Fetched block transactions");

        let summary = parse_block(info, &txs, &self.miners, self.whale_sats);
        let tokens = self.token_infos(&summary.token_ids()).await;

        let prices = match &self.prices {
            Some(source) => match source.prices().await {
                Ok(prices) => Some(prices),
                Err(e) => {
                    warn!(error = %e, "Price feed unavailable");
                    None
                }
            },
            None => None,
        };

        Ok(BlockReport {
            summary,
            tokens,
            prices,
        })
    }

    async fn token_infos(&self, token_ids: &[String]) -> HashMap<String, TokenInfo> {
        let lookups = token_ids.iter().map(|token_id| async move {
            (token_id, self.source.token(token_id).await)
        });

        let mut tokens = HashMap::new();
        for (token_id, result) in join_all(lookups).await {
            match result {
                Ok(info) => {
                    tokens.insert(token_id.clone(), info);
                }
                Err(e) => warn!(token_id = %token_id, error = %e, "Token lookup failed"),
            }
        }
        tokens
    }
}

/// Reports tracked blocks to the notifiers and keeps the shared state current.
pub struct Herald {
    reporter: BlockReporter,
    notifiers: Arc<NotifierRegistry>,
    state: Arc<AppState>,
}

impl Herald {
    #[must_use]
    pub fn new(reporter: BlockReporter, notifiers: Arc<NotifierRegistry>, state: Arc<AppState>) -> Self {
        Self {
            reporter,
            notifiers,
            state,
        }
    }

    pub async fn handle(&self, message: TrackingMessage) {
        match message {
            TrackingMessage::Include(info) => self.handle_block(&info).await,
            TrackingMessage::Rollback { height, hash } => {
                warn!(height, hash = %hash, "Block rolled back");
                self.state.record_reorg(&hash);
                self.notifiers
                    .notify_all(Event::ChainReorganized { height, hash });
            }
        }
    }

    /// Announce a block in full, or by height and hash alone if it cannot
    /// be parsed.
    pub async fn handle_block(&self, info: &BlockInfo) {
        match self.reporter.report_block(info).await {
            Ok(report) => {
                info!(
                    height = info.height,
                    hash = %info.hash,
                    txs = report.summary.num_txs,
                    miner = %report.summary.miner,
                    "Block included"
                );
                self.state.record_block(&report.summary, Utc::now());
                self.notifiers
                    .notify_all(Event::BlockConnected(Arc::new(report)));
            }
            Err(e) => {
                warn!(height = info.height, hash = %info.hash, error = %e, "Block parse failed, sending fallback");
                self.state.record_fallback(info.height, &info.hash, Utc::now());
                self.notifiers.notify_all(Event::BlockFallback {
                    height: info.height,
                    hash: info.hash.clone(),
                });
            }
        }
    }

    /// Close the current statistics period and send its summary.
    pub fn send_daily_summary(&self) {
        let summary = self.state.take_daily_summary();
        info!(blocks = summary.blocks, txs = summary.txs, "Sending daily summary");
        self.notifiers.notify_all(Event::DailySummary(summary));
    }
}
