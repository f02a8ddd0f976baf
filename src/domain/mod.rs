//! Chain-facing domain logic: what the indexer returns and what we make of it.

pub mod action;
pub mod address;
pub mod amount;
pub mod block;
pub mod chain;
pub mod error;
pub mod miner;
pub mod price;
pub mod script;
pub mod stats;

// Indexer data model
pub use chain::{
    BlockInfo, BlockRef, BlockchainInfo, GenesisInfo, TokenEntry, TokenInfo, TokenTxType, Tx,
    TxHistoryPage, TxInput, TxOutput,
};

// Block parsing
pub use action::AppAction;
pub use block::{
    parse_block, AppTx, BlockReport, BlockSummary, TokenBurn, TokenGenesis, TokenSend, XecSend,
};
pub use miner::{KnownMiner, MinerDirectory, StakingReward};

pub use price::Prices;
pub use stats::{DailyStats, DailySummary};
