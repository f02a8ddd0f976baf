//! Block indexer port.

use async_trait::async_trait;

use crate::domain::{BlockInfo, BlockRef, BlockchainInfo, TokenInfo, Tx, TxHistoryPage};
use crate::error::Result;

/// Read access to an indexed chain.
#[async_trait]
pub trait BlockSource: Send + Sync {
    /// Current chain tip.
    async fn blockchain_info(&self) -> Result<BlockchainInfo>;

    /// Header summary of a block.
    async fn block(&self, block: &BlockRef) -> Result<BlockInfo>;

    /// One page of a block's transactions, `page` counting from zero.
    async fn block_txs(&self, block: &BlockRef, page: u32, page_size: u32)
        -> Result<TxHistoryPage>;

    /// Genesis metadata of a token.
    async fn token(&self, token_id: &str) -> Result<TokenInfo>;

    /// All transactions of a block, paging until the last page.
    async fn all_block_txs(&self, block: &BlockRef, page_size: u32) -> Result<Vec<Tx>> {
        let first = self.block_txs(block, 0, page_size).await?;
        let mut txs = first.txs;
        for page in 1..first.num_pages {
            txs.extend(self.block_txs(block, page, page_size).await?.txs);
        }
        Ok(txs)
    }
}
