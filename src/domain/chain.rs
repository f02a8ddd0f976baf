//! Block and transaction data as served by the chronik indexer.
//!
//! Field names follow the indexer's camelCase JSON. Satoshi and atom amounts
//! may arrive either as JSON numbers or as decimal strings, so they go through
//! [`de_amount`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Chain tip as reported by the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockchainInfo {
    pub tip_hash: String,
    pub tip_height: u64,
}

/// Reference to a block, either by height or by hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockRef {
    Height(u64),
    Hash(String),
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Height(height) => write!(f, "{height}"),
            Self::Hash(hash) => f.write_str(hash),
        }
    }
}

impl std::str::FromStr for BlockRef {
    type Err = std::convert::Infallible;

    /// Parses as a height when the input is all digits, otherwise as a hash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<u64>() {
            Ok(height) => Self::Height(height),
            Err(_) => Self::Hash(s.to_string()),
        })
    }
}

/// Wrapper returned by the `/block/{ref}` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockResponse {
    pub block_info: BlockInfo,
}

/// Block header summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockInfo {
    pub hash: String,
    pub prev_hash: String,
    pub height: u64,
    #[serde(default)]
    pub n_bits: u32,
    pub timestamp: i64,
    #[serde(default)]
    pub block_size: u64,
    pub num_txs: u64,
    #[serde(default)]
    pub num_inputs: u64,
    #[serde(default)]
    pub num_outputs: u64,
    #[serde(default, deserialize_with = "de_amount")]
    pub sum_input_sats: u64,
    #[serde(default, deserialize_with = "de_amount")]
    pub sum_coinbase_output_sats: u64,
    #[serde(default, deserialize_with = "de_amount")]
    pub sum_normal_output_sats: u64,
    #[serde(default, deserialize_with = "de_amount")]
    pub sum_burned_sats: u64,
}

/// One page of a block's transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxHistoryPage {
    pub txs: Vec<Tx>,
    pub num_pages: u32,
    pub num_txs: u64,
}

/// Location of a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockMetadata {
    pub height: u64,
    pub hash: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutPoint {
    pub txid: String,
    pub out_idx: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tx {
    pub txid: String,
    #[serde(default)]
    pub version: i32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    #[serde(default)]
    pub lock_time: u32,
    #[serde(default)]
    pub token_entries: Vec<TokenEntry>,
    #[serde(default)]
    pub block: Option<BlockMetadata>,
    #[serde(default)]
    pub is_coinbase: bool,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub time_first_seen: i64,
}

impl Tx {
    /// Sum of all input values.
    #[must_use]
    pub fn input_sats(&self) -> u64 {
        self.inputs.iter().map(|input| input.sats).sum()
    }

    /// Sum of all output values.
    #[must_use]
    pub fn output_sats(&self) -> u64 {
        self.outputs.iter().map(|output| output.sats).sum()
    }

    /// Miner fee paid by this tx; zero for coinbase txs.
    #[must_use]
    pub fn fee_sats(&self) -> u64 {
        if self.is_coinbase {
            return 0;
        }
        self.input_sats().saturating_sub(self.output_sats())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxInput {
    pub prev_out: OutPoint,
    #[serde(default)]
    pub input_script: String,
    /// Script of the spent output; absent for coinbase inputs.
    #[serde(default)]
    pub output_script: Option<String>,
    #[serde(default, deserialize_with = "de_amount")]
    pub sats: u64,
    #[serde(default)]
    pub sequence_no: u32,
    #[serde(default)]
    pub token: Option<Token>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxOutput {
    #[serde(deserialize_with = "de_amount")]
    pub sats: u64,
    pub output_script: String,
    #[serde(default)]
    pub token: Option<Token>,
    #[serde(default)]
    pub spent_by: Option<OutPoint>,
}

/// Token amount attached to an input or output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub token_id: String,
    pub token_type: TokenType,
    #[serde(default, deserialize_with = "de_amount")]
    pub atoms: u64,
    #[serde(default)]
    pub is_mint_baton: bool,
    #[serde(default)]
    pub entry_idx: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenType {
    /// `SLP` or `ALP`.
    pub protocol: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub number: u32,
}

/// What a tx did to one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenTxType {
    None,
    Genesis,
    Mint,
    Send,
    Burn,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenEntry {
    pub token_id: String,
    pub token_type: TokenType,
    pub tx_type: TokenTxType,
    #[serde(default)]
    pub group_token_id: Option<String>,
    #[serde(default)]
    pub is_invalid: bool,
    #[serde(default)]
    pub burn_summary: String,
    #[serde(default, deserialize_with = "de_amount")]
    pub actual_burn_atoms: u64,
    #[serde(default, deserialize_with = "de_amount")]
    pub intentional_burn_atoms: u64,
    #[serde(default)]
    pub burns_mint_batons: bool,
}

/// Token metadata from the `/token/{id}` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub token_id: String,
    pub token_type: TokenType,
    #[serde(default)]
    pub time_first_seen: i64,
    pub genesis_info: GenesisInfo,
    #[serde(default)]
    pub block: Option<BlockMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenesisInfo {
    #[serde(default)]
    pub token_ticker: String,
    #[serde(default)]
    pub token_name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub decimals: u8,
}

/// Deserialize an amount that may be encoded as a number or a decimal string.
pub fn de_amount<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
