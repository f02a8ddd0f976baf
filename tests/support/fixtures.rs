//! Indexer-shaped transaction fixtures.
//!
//! Built from JSON the way chronik returns it, so the serde mapping is
//! exercised too.

use serde_json::json;

use herald::domain::{TokenInfo, Tx};

pub const MINER: &str = "76a914f5bf48b397dae70be82b3cca4793f8eb2b6cdac988ac";
pub const ALICE: &str = "76a91476a04053bda0a88bda5177b86a15c3b29f55987388ac";
pub const BOB: &str = "a914d37c4c809fe9840e7bfa77b86bd47163f6fb6c6087";
pub const STAKER: &str = "76a914000000000000000000000000000000000000000088ac";
pub const TOKEN_ID: &str = "aed861a31b96934b88c0252ede135cb9700d7649f69191235087a3030e553cb1";

fn slp_type() -> serde_json::Value {
    json!({ "protocol": "SLP", "type": "SLP_TOKEN_TYPE_FUNGIBLE", "number": 1 })
}

/// Coinbase paying the miner, a development fund and a 10% staking reward.
pub fn coinbase(height: u64, tag: &str) -> Tx {
    let script = format!("03{:06x}{}", height & 0xff_ffff, hex::encode(tag));
    serde_json::from_value(json!({
        "txid": format!("cb{height:062x}"),
        "version": 1,
        "inputs": [{
            "prevOut": { "txid": "0".repeat(64), "outIdx": 4_294_967_295_u32 },
            "inputScript": script,
            "sats": "0",
            "sequenceNo": 4_294_967_295_u32
        }],
        "outputs": [
            { "sats": "150000000", "outputScript": MINER },
            { "sats": "131250000", "outputScript": BOB },
            { "sats": "31250000", "outputScript": STAKER }
        ],
        "lockTime": 0,
        "isCoinbase": true,
        "size": 180
    }))
    .unwrap()
}

/// Plain XEC payment from `from` to `to` with 1000 sats change and a 500 sat fee.
pub fn xec_send(txid: &str, from: &str, to: &str, sats: u64) -> Tx {
    serde_json::from_value(json!({
        "txid": txid,
        "version": 2,
        "inputs": [{
            "prevOut": { "txid": "11".repeat(32), "outIdx": 0 },
            "inputScript": "",
            "outputScript": from,
            "sats": (sats + 1_500).to_string(),
            "sequenceNo": 4_294_967_295_u32
        }],
        "outputs": [
            { "sats": sats.to_string(), "outputScript": to },
            { "sats": "1000", "outputScript": from }
        ],
        "size": 219
    }))
    .unwrap()
}

/// SLP genesis minting `TOKEN_ID` to `ALICE`.
pub fn genesis() -> Tx {
    serde_json::from_value(json!({
        "txid": TOKEN_ID,
        "version": 2,
        "inputs": [{
            "prevOut": { "txid": "22".repeat(32), "outIdx": 1 },
            "outputScript": ALICE,
            "sats": "10000"
        }],
        "outputs": [
            { "sats": "0", "outputScript": "6a04534c500001010747454e45534953" },
            {
                "sats": "546",
                "outputScript": ALICE,
                "token": { "tokenId": TOKEN_ID, "tokenType": slp_type(), "atoms": "1000000" }
            }
        ],
        "tokenEntries": [{
            "tokenId": TOKEN_ID,
            "tokenType": slp_type(),
            "txType": "GENESIS"
        }],
        "size": 300
    }))
    .unwrap()
}

/// Non-token OP_RETURN carrying a Cashtab message.
pub fn cashtab_msg(txid: &str, text: &str) -> Tx {
    let script = format!(
        "6a0400746162{:02x}{}",
        text.len(),
        hex::encode(text)
    );
    serde_json::from_value(json!({
        "txid": txid,
        "inputs": [{
            "prevOut": { "txid": "33".repeat(32), "outIdx": 0 },
            "outputScript": ALICE,
            "sats": "5000"
        }],
        "outputs": [
            { "sats": "0", "outputScript": script },
            { "sats": "4500", "outputScript": ALICE }
        ],
        "size": 250
    }))
    .unwrap()
}

pub fn token_info() -> TokenInfo {
    serde_json::from_value(json!({
        "tokenId": TOKEN_ID,
        "tokenType": slp_type(),
        "timeFirstSeen": 1_700_000_000,
        "genesisInfo": {
            "tokenTicker": "HRLD",
            "tokenName": "Herald <Test> Token",
            "url": "https://cashtab.com/",
            "hash": "",
            "decimals": 2
        }
    }))
    .unwrap()
}
