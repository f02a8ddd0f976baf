//! In-memory [`BlockSource`] and [`PriceSource`] doubles.
//!
//! - [`MockChain`]: a linear chain of blocks that tests can extend, fork
//!   and break.
//! - [`FixedPrices`] / [`FailingPrices`]: price feeds with a known answer.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal_macros::dec;

use herald::domain::{BlockInfo, BlockRef, BlockchainInfo, Prices, TokenInfo, Tx, TxHistoryPage};
use herald::error::{Error, IndexerError, Result};
use herald::port::{BlockSource, PriceSource};

use super::fixtures;

/// Hash of the block at `height` on the chain identified by `fork`.
pub fn block_hash(fork: u8, height: u64) -> String {
    format!("{fork:02x}{height:062x}")
}

pub fn block_info(height: u64, hash: &str, prev_hash: &str) -> BlockInfo {
    BlockInfo {
        hash: hash.to_string(),
        prev_hash: prev_hash.to_string(),
        height,
        n_bits: 0x1d00_ffff,
        timestamp: 1_700_000_000 + height as i64 * 600,
        block_size: 250,
        num_txs: 1,
        num_inputs: 1,
        num_outputs: 1,
        sum_input_sats: 0,
        sum_coinbase_output_sats: 312_500_000,
        sum_normal_output_sats: 0,
        sum_burned_sats: 0,
    }
}

#[derive(Default)]
struct ChainState {
    blocks: BTreeMap<u64, BlockInfo>,
    txs: HashMap<String, Vec<Tx>>,
    tokens: HashMap<String, TokenInfo>,
    broken_blocks: HashSet<String>,
    missing_headers: HashSet<u64>,
    offline: bool,
}

/// A linear chain held in memory.
#[derive(Default)]
pub struct MockChain {
    state: Mutex<ChainState>,
    block_calls: AtomicU32,
    page_calls: AtomicU32,
}

impl MockChain {
    /// Chain with blocks `0..=tip` on fork 0.
    pub fn with_tip(tip: u64) -> Self {
        let chain = Self::default();
        chain.extend_to(tip, 0);
        chain
    }

    /// Mine blocks on `fork` until the tip reaches `height`.
    pub fn extend_to(&self, height: u64, fork: u8) {
        let mut state = self.state.lock().unwrap();
        let start = state.blocks.keys().next_back().map_or(0, |h| h + 1);
        for h in start..=height {
            let prev = state
                .blocks
                .get(&h.wrapping_sub(1))
                .map(|b| b.hash.clone())
                .unwrap_or_else(|| "00".repeat(32));
            let info = block_info(h, &block_hash(fork, h), &prev);
            state.blocks.insert(h, info);
        }
    }

    /// Replace every block from `height` up with blocks on `fork`, ending at `new_tip`.
    pub fn reorg(&self, height: u64, new_tip: u64, fork: u8) {
        {
            let mut state = self.state.lock().unwrap();
            state.blocks.retain(|h, _| *h < height);
        }
        self.extend_to(new_tip, fork);
    }

    pub fn set_txs(&self, height: u64, txs: Vec<Tx>) {
        let mut state = self.state.lock().unwrap();
        let hash = state.blocks[&height].hash.clone();
        if let Some(info) = state.blocks.get_mut(&height) {
            info.num_txs = txs.len() as u64;
        }
        state.txs.insert(hash, txs);
    }

    pub fn add_token(&self, info: TokenInfo) {
        let mut state = self.state.lock().unwrap();
        state.tokens.insert(info.token_id.clone(), info);
    }

    /// Make the transaction listing of a block fail.
    pub fn break_block(&self, height: u64) {
        let mut state = self.state.lock().unwrap();
        let hash = state.blocks[&height].hash.clone();
        state.broken_blocks.insert(hash);
    }

    /// Make the header lookup at `height` fail until restored.
    pub fn fail_header(&self, height: u64, failing: bool) {
        let mut state = self.state.lock().unwrap();
        if failing {
            state.missing_headers.insert(height);
        } else {
            state.missing_headers.remove(&height);
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    pub fn hash_at(&self, height: u64) -> String {
        self.state.lock().unwrap().blocks[&height].hash.clone()
    }

    pub fn block_info_at(&self, height: u64) -> BlockInfo {
        self.state.lock().unwrap().blocks[&height].clone()
    }

    pub fn block_calls(&self) -> u32 {
        self.block_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> u32 {
        self.page_calls.load(Ordering::SeqCst)
    }

    fn find(&self, block: &BlockRef) -> Result<BlockInfo> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(offline());
        }
        let found = match block {
            BlockRef::Height(height) => state.blocks.get(height).cloned(),
            BlockRef::Hash(hash) => state.blocks.values().find(|b| &b.hash == hash).cloned(),
        };
        found.ok_or_else(|| IndexerError::NotFound(format!("/block/{block}")).into())
    }
}

fn offline() -> Error {
    IndexerError::Status {
        status: 503,
        path: "/blockchain-info".into(),
    }
    .into()
}

#[async_trait]
impl BlockSource for MockChain {
    async fn blockchain_info(&self) -> Result<BlockchainInfo> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(offline());
        }
        let tip = state
            .blocks
            .values()
            .next_back()
            .ok_or_else(|| Error::from(IndexerError::NotFound("/blockchain-info".into())))?;
        Ok(BlockchainInfo {
            tip_hash: tip.hash.clone(),
            tip_height: tip.height,
        })
    }

    async fn block(&self, block: &BlockRef) -> Result<BlockInfo> {
        self.block_calls.fetch_add(1, Ordering::SeqCst);
        let info = self.find(block)?;
        if self.state.lock().unwrap().missing_headers.contains(&info.height) {
            return Err(IndexerError::Status {
                status: 502,
                path: format!("/block/{block}"),
            }
            .into());
        }
        Ok(info)
    }

    async fn block_txs(&self, block: &BlockRef, page: u32, page_size: u32) -> Result<TxHistoryPage> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        let info = self.find(block)?;
        let state = self.state.lock().unwrap();
        if state.broken_blocks.contains(&info.hash) {
            return Err(IndexerError::Status {
                status: 500,
                path: format!("/block-txs/{block}"),
            }
            .into());
        }

        let txs = state
            .txs
            .get(&info.hash)
            .cloned()
            .unwrap_or_else(|| vec![fixtures::coinbase(info.height, "ViaBTC")]);
        let page_size = page_size.max(1) as usize;
        let num_pages = txs.len().div_ceil(page_size).max(1) as u32;
        let page_txs = txs
            .chunks(page_size)
            .nth(page as usize)
            .map(<[Tx]>::to_vec)
            .unwrap_or_default();

        Ok(TxHistoryPage {
            txs: page_txs,
            num_pages,
            num_txs: txs.len() as u64,
        })
    }

    async fn token(&self, token_id: &str) -> Result<TokenInfo> {
        let state = self.state.lock().unwrap();
        state
            .tokens
            .get(token_id)
            .cloned()
            .ok_or_else(|| IndexerError::NotFound(format!("/token/{token_id}")).into())
    }
}

pub fn test_prices() -> Prices {
    Prices {
        xec_usd: dec!(0.00003),
        btc_usd: dec!(65000),
        eth_usd: dec!(3200.5),
    }
}

pub struct FixedPrices(pub Prices);

#[async_trait]
impl PriceSource for FixedPrices {
    async fn prices(&self) -> Result<Prices> {
        Ok(self.0)
    }
}

pub struct FailingPrices;

#[async_trait]
impl PriceSource for FailingPrices {
    async fn prices(&self) -> Result<Prices> {
        Err(Error::Price("rate limited".into()))
    }
}
