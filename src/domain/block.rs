//! Turning a block's transactions into a summary worth announcing.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::action::{parse_app_action, AppAction};
use super::chain::{BlockInfo, TokenInfo, TokenTxType, Tx};
use super::miner::{staking_reward, MinerDirectory, StakingReward};
use super::price::Prices;
use super::script::{is_op_return_hex, ScriptKind};

/// A token created in this block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenGenesis {
    pub txid: String,
    pub token_id: String,
}

/// A token transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenSend {
    pub txid: String,
    pub token_id: String,
    pub sender_script: String,
    /// Distinct receiving scripts other than the sender's.
    pub receiver_count: usize,
    /// Atoms sent to receivers other than the sender.
    pub atoms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenBurn {
    pub txid: String,
    pub token_id: String,
    pub burner_script: String,
    pub atoms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppTx {
    pub txid: String,
    pub action: AppAction,
}

/// A plain XEC transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XecSend {
    pub txid: String,
    pub sender_script: String,
    /// Recipients other than the sender, in output order.
    pub recipients: Vec<(String, u64)>,
    /// Sats sent to recipients; the full output value for self-sends.
    pub total_sats: u64,
    pub fee_sats: u64,
    pub size: u32,
    pub is_whale: bool,
}

impl XecSend {
    /// Fee rate in sats per byte, rounded down.
    #[must_use]
    pub fn fee_rate(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.fee_sats / u64::from(self.size)
    }

    #[must_use]
    pub fn is_self_send(&self) -> bool {
        self.recipients.is_empty()
    }
}

/// Everything we announce about one block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockSummary {
    pub hash: String,
    pub height: u64,
    pub timestamp: i64,
    pub num_txs: u64,
    pub size: u64,
    pub miner: String,
    pub staking_reward: Option<StakingReward>,
    pub total_fees: u64,
    pub geneses: Vec<TokenGenesis>,
    pub token_sends: Vec<TokenSend>,
    pub token_burns: Vec<TokenBurn>,
    pub app_txs: Vec<AppTx>,
    pub xec_sends: Vec<XecSend>,
}

impl BlockSummary {
    /// Unique token ids whose metadata the summary refers to.
    #[must_use]
    pub fn token_ids(&self) -> Vec<String> {
        let ids: BTreeSet<&str> = self
            .geneses
            .iter()
            .map(|g| g.token_id.as_str())
            .chain(self.token_sends.iter().map(|s| s.token_id.as_str()))
            .chain(self.token_burns.iter().map(|b| b.token_id.as_str()))
            .collect();
        ids.into_iter().map(str::to_string).collect()
    }

    #[must_use]
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }

    #[must_use]
    pub fn whale_sends(&self) -> usize {
        self.xec_sends.iter().filter(|s| s.is_whale).count()
    }
}

/// A summary together with the external data needed to render it.
#[derive(Debug, Clone, Default)]
pub struct BlockReport {
    pub summary: BlockSummary,
    pub tokens: HashMap<String, TokenInfo>,
    pub prices: Option<Prices>,
}

/// Summarize a block from its header and full tx list.
#[must_use]
pub fn parse_block(
    info: &BlockInfo,
    txs: &[Tx],
    miners: &MinerDirectory,
    whale_sats: u64,
) -> BlockSummary {
    let mut summary = BlockSummary {
        hash: info.hash.clone(),
        height: info.height,
        timestamp: info.timestamp,
        num_txs: info.num_txs,
        size: info.block_size,
        miner: "unknown".to_string(),
        ..BlockSummary::default()
    };

    for tx in txs {
        if tx.is_coinbase {
            summary.miner = miners.identify(tx);
            summary.staking_reward = staking_reward(tx);
            continue;
        }
        summary.total_fees += tx.fee_sats();
        classify_tx(tx, whale_sats, &mut summary);
    }

    summary
}

fn classify_tx(tx: &Tx, whale_sats: u64, summary: &mut BlockSummary) {
    let sender_script = tx
        .inputs
        .first()
        .and_then(|input| input.output_script.clone())
        .unwrap_or_default();

    if !tx.token_entries.is_empty() {
        for entry in tx.token_entries.iter().filter(|e| !e.is_invalid) {
            match entry.tx_type {
                TokenTxType::Genesis => summary.geneses.push(TokenGenesis {
                    txid: tx.txid.clone(),
                    token_id: entry.token_id.clone(),
                }),
                TokenTxType::Send => {
                    summary
                        .token_sends
                        .push(token_send(tx, &entry.token_id, &sender_script));
                }
                _ => {}
            }
            if entry.actual_burn_atoms > 0 {
                summary.token_burns.push(TokenBurn {
                    txid: tx.txid.clone(),
                    token_id: entry.token_id.clone(),
                    burner_script: sender_script.clone(),
                    atoms: entry.actual_burn_atoms,
                });
            }
        }
        return;
    }

    if let Some(payload) = tx.outputs.iter().find_map(|output| {
        match ScriptKind::classify(&output.output_script) {
            Ok(ScriptKind::OpReturn(payload)) => Some(payload),
            _ => None,
        }
    }) {
        summary.app_txs.push(AppTx {
            txid: tx.txid.clone(),
            action: parse_app_action(&payload),
        });
        return;
    }

    summary.xec_sends.push(xec_send(tx, sender_script, whale_sats));
}

fn token_send(tx: &Tx, token_id: &str, sender_script: &str) -> TokenSend {
    let mut receivers = BTreeSet::new();
    let mut atoms = 0u64;
    for output in &tx.outputs {
        let Some(token) = output.token.as_ref() else {
            continue;
        };
        if token.token_id != token_id || output.output_script == sender_script {
            continue;
        }
        receivers.insert(output.output_script.as_str());
        atoms = atoms.saturating_add(token.atoms);
    }
    TokenSend {
        txid: tx.txid.clone(),
        token_id: token_id.to_string(),
        sender_script: sender_script.to_string(),
        receiver_count: receivers.len(),
        atoms,
    }
}

fn xec_send(tx: &Tx, sender_script: String, whale_sats: u64) -> XecSend {
    let recipients: Vec<(String, u64)> = tx
        .outputs
        .iter()
        .filter(|o| o.output_script != sender_script && !is_op_return_hex(&o.output_script))
        .map(|o| (o.output_script.clone(), o.sats))
        .collect();

    let total_sats = if recipients.is_empty() {
        tx.output_sats()
    } else {
        recipients.iter().map(|(_, sats)| sats).sum()
    };

    XecSend {
        txid: tx.txid.clone(),
        sender_script,
        recipients,
        total_sats,
        fee_sats: tx.fee_sats(),
        size: tx.size,
        is_whale: total_sats >= whale_sats,
    }
}
