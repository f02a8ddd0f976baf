//! OP_RETURN app protocols.
//!
//! Apps built on eCash tag their OP_RETURN outputs with a 4-byte LOKAD
//! prefix as the first push. We recognise the common ones so the block
//! summary can say what a tx was for.

use serde::Serialize;

use super::script::parse_pushes;

const CASHTAB_MSG: [u8; 4] = *b"\x00tab";
const CASHTAB_ENCRYPTED: [u8; 4] = *b"etab";
const ALIAS: [u8; 4] = *b".xec";
const AIRDROP: [u8; 4] = *b"drop";
const SWAP: [u8; 4] = *b"SWP\x00";
const PAYBUTTON: [u8; 4] = *b"PAY\x00";
const PAYWALL: [u8; 4] = *b"payw";
const AUTH: [u8; 4] = *b"auth";
const MEMO_PREFIX: u8 = 0x6d;

/// What an OP_RETURN says about the app that built the tx.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AppAction {
    CashtabMsg { msg: String },
    EncryptedCashtabMsg,
    Alias { alias: String },
    Airdrop { token_id: String, msg: Option<String> },
    Swap,
    PayButton { data: Option<String> },
    Paywall { article_txid: String },
    Authentication,
    Memo { action: &'static str, text: Option<String> },
    Unknown { prefix: String, text: Option<String> },
}

impl AppAction {
    /// Human-readable app name.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::CashtabMsg { .. } => "Cashtab Msg",
            Self::EncryptedCashtabMsg => "Encrypted Cashtab Msg",
            Self::Alias { .. } => "Alias",
            Self::Airdrop { .. } => "Airdrop",
            Self::Swap => "SWaP",
            Self::PayButton { .. } => "PayButton",
            Self::Paywall { .. } => "Paywall",
            Self::Authentication => "Auth",
            Self::Memo { .. } => "memo",
            Self::Unknown { .. } => "Unknown App",
        }
    }
}

/// Classify an OP_RETURN payload (the bytes after the OP_RETURN opcode).
///
/// Payloads that are not pure pushes are reported as unknown with an empty
/// prefix.
#[must_use]
pub fn parse_app_action(payload: &[u8]) -> AppAction {
    let Ok(pushes) = parse_pushes(payload) else {
        return AppAction::Unknown {
            prefix: String::new(),
            text: printable(payload),
        };
    };
    let Some(prefix) = pushes.first() else {
        return AppAction::Unknown {
            prefix: String::new(),
            text: None,
        };
    };
    let rest = &pushes[1..];

    if prefix.len() == 2 && prefix[0] == MEMO_PREFIX {
        return AppAction::Memo {
            action: memo_action(prefix[1]),
            text: rest.last().and_then(|item| printable(item)),
        };
    }

    let Ok(lokad) = <[u8; 4]>::try_from(prefix.as_slice()) else {
        return unknown(prefix, rest);
    };

    match lokad {
        CASHTAB_MSG => AppAction::CashtabMsg {
            msg: rest
                .first()
                .map(|item| String::from_utf8_lossy(item).into_owned())
                .unwrap_or_default(),
        },
        CASHTAB_ENCRYPTED => AppAction::EncryptedCashtabMsg,
        ALIAS => {
            // Alias registrations carry a version push before the alias.
            let alias = rest
                .iter()
                .find(|item| item.len() > 1)
                .map(|item| String::from_utf8_lossy(item).into_owned())
                .unwrap_or_default();
            AppAction::Alias { alias }
        }
        AIRDROP => AppAction::Airdrop {
            token_id: rest.first().map(hex::encode).unwrap_or_default(),
            msg: rest.get(1).and_then(|item| printable(item)),
        },
        SWAP => AppAction::Swap,
        PAYBUTTON => AppAction::PayButton {
            data: rest.get(1).and_then(|item| printable(item)),
        },
        PAYWALL => AppAction::Paywall {
            article_txid: rest.first().map(hex::encode).unwrap_or_default(),
        },
        AUTH => AppAction::Authentication,
        _ => unknown(prefix, rest),
    }
}

fn unknown(prefix: &[u8], rest: &[Vec<u8>]) -> AppAction {
    let text = std::iter::once(prefix)
        .chain(rest.iter().map(Vec::as_slice))
        .filter_map(printable)
        .collect::<Vec<_>>();
    AppAction::Unknown {
        prefix: hex::encode(prefix),
        text: (!text.is_empty()).then(|| text.join(" ")),
    }
}

fn memo_action(code: u8) -> &'static str {
    match code {
        0x01 => "Set name",
        0x02 => "Post memo",
        0x03 => "Reply to memo",
        0x04 => "Like / tip memo",
        0x05 => "Set profile text",
        0x06 => "Follow user",
        0x07 => "Unfollow user",
        0x0a => "Set profile picture",
        0x0c => "Post topic message",
        0x0d => "Topic follow",
        0x0e => "Topic unfollow",
        0x10 => "Create poll",
        0x13 => "Add poll option",
        0x14 => "Poll vote",
        0x16 => "Mute user",
        0x17 => "Unmute user",
        0x24 => "Send money",
        _ => "Unknown action",
    }
}

/// Decode bytes as text when they are valid UTF-8 without control characters.
fn printable(bytes: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(bytes).ok()?;
    if text.is_empty() || text.chars().any(char::is_control) {
        return None;
    }
    Some(text.to_string())
}
