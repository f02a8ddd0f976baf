//! Miner identification from coinbase transactions.

use serde::{Deserialize, Serialize};

use super::address::script_preview;
use super::chain::Tx;
use super::script::decode_hex;

/// Marker ViaBTC puts before the sub-account that found the block.
const VIABTC_SUBACCOUNT_MARKER: &str = "Mined by ";

/// Built-in coinbase tags, matched in order.
const KNOWN_TAGS: &[(&str, &str)] = &[
    ("ViaBTC", "ViaBTC"),
    ("Mining-Dutch", "Mining-Dutch"),
    ("ckpool", "CK Pool"),
    ("CK Pool", "CK Pool"),
    ("zpool.ca", "zpool"),
    ("molepool.com", "Molepool"),
    ("Hathor", "Hathor-MM"),
    ("p2p-spb.xyz", "p2p-spb"),
    ("cminors", "CMinors"),
    ("solopool.org", "solopool.org"),
    ("MiningCore", "MiningCore"),
];

/// A configured or built-in miner signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownMiner {
    pub name: String,
    /// Text found in the coinbase input script.
    #[serde(default)]
    pub coinbase_tag: Option<String>,
    /// Hex output script of the first coinbase output.
    #[serde(default)]
    pub payout_script: Option<String>,
}

/// Looks up who mined a block.
#[derive(Debug, Clone)]
pub struct MinerDirectory {
    miners: Vec<KnownMiner>,
}

impl Default for MinerDirectory {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl MinerDirectory {
    /// Build a directory where `extra` entries take precedence over the built-ins.
    #[must_use]
    pub fn new(extra: Vec<KnownMiner>) -> Self {
        let mut miners = extra;
        miners.extend(KNOWN_TAGS.iter().map(|(tag, name)| KnownMiner {
            name: (*name).to_string(),
            coinbase_tag: Some((*tag).to_string()),
            payout_script: None,
        }));
        Self { miners }
    }

    /// Name the miner of a coinbase transaction.
    ///
    /// Payout scripts win over coinbase tags. Unknown miners are labelled with
    /// the tail of their payout address.
    #[must_use]
    pub fn identify(&self, coinbase: &Tx) -> String {
        let payout_script = coinbase
            .outputs
            .first()
            .map(|output| output.output_script.as_str())
            .unwrap_or_default();

        if let Some(miner) = self
            .miners
            .iter()
            .find(|m| m.payout_script.as_deref() == Some(payout_script))
        {
            return miner.name.clone();
        }

        let coinbase_text = coinbase
            .inputs
            .first()
            .map(|input| printable_ascii(&input.input_script))
            .unwrap_or_default();

        for miner in &self.miners {
            let Some(tag) = miner.coinbase_tag.as_deref() else {
                continue;
            };
            if !coinbase_text.contains(tag) {
                continue;
            }
            if tag == "ViaBTC" {
                if let Some(account) = viabtc_subaccount(&coinbase_text) {
                    return format!("{}, Mined by {account}", miner.name);
                }
            }
            return miner.name.clone();
        }

        let preview = script_preview(payout_script, 3);
        let tail = preview.rsplit("...").next().unwrap_or(&preview);
        format!("unknown, ...{tail}")
    }
}

/// Keep only printable ASCII from a hex-encoded script.
fn printable_ascii(script_hex: &str) -> String {
    decode_hex(script_hex)
        .unwrap_or_default()
        .into_iter()
        .filter(|b| (0x20..=0x7e).contains(b))
        .map(char::from)
        .collect()
}

fn viabtc_subaccount(coinbase_text: &str) -> Option<&str> {
    let start = coinbase_text.find(VIABTC_SUBACCOUNT_MARKER)? + VIABTC_SUBACCOUNT_MARKER.len();
    let rest = &coinbase_text[start..];
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

/// Coinbase output paying the avalanche staking reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingReward {
    pub output_script: String,
    pub sats: u64,
}

/// Find the staking reward output: not the miner's, carrying 9-11% of the coinbase.
#[must_use]
pub fn staking_reward(coinbase: &Tx) -> Option<StakingReward> {
    let total = coinbase.output_sats();
    if total == 0 {
        return None;
    }
    coinbase
        .outputs
        .iter()
        .skip(1)
        .find(|output| {
            let scaled = u128::from(output.sats) * 100;
            let total = u128::from(total);
            scaled >= 9 * total && scaled <= 11 * total
        })
        .map(|output| StakingReward {
            output_script: output.output_script.clone(),
            sats: output.sats,
        })
}
