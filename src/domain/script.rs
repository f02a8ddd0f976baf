//! Output script classification.
//!
//! The indexer hands us scripts as hex. We only need enough of the script
//! language to tell standard payment templates apart and to split OP_RETURN
//! payloads into their push items.

use crate::domain::error::ScriptError;

const OP_0: u8 = 0x00;
const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;
const OP_PUSHDATA4: u8 = 0x4e;
const OP_1NEGATE: u8 = 0x4f;
const OP_1: u8 = 0x51;
const OP_16: u8 = 0x60;
const OP_RETURN: u8 = 0x6a;
const OP_DUP: u8 = 0x76;
const OP_EQUAL: u8 = 0x87;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_HASH160: u8 = 0xa9;
const OP_CHECKSIG: u8 = 0xac;

/// Standard script templates we know how to label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptKind {
    P2pkh([u8; 20]),
    P2sh([u8; 20]),
    P2pk(Vec<u8>),
    /// Everything after the OP_RETURN opcode.
    OpReturn(Vec<u8>),
    Other,
}

impl ScriptKind {
    /// Classify a hex-encoded output script.
    pub fn classify(script_hex: &str) -> Result<Self, ScriptError> {
        let bytes = decode_hex(script_hex)?;
        Ok(Self::from_bytes(&bytes))
    }

    #[must_use]
    pub fn from_bytes(script: &[u8]) -> Self {
        match script {
            [OP_DUP, OP_HASH160, 20, hash @ .., OP_EQUALVERIFY, OP_CHECKSIG] if hash.len() == 20 => {
                Self::P2pkh(to_hash160(hash))
            }
            [OP_HASH160, 20, hash @ .., OP_EQUAL] if hash.len() == 20 => {
                Self::P2sh(to_hash160(hash))
            }
            [len, pubkey @ .., OP_CHECKSIG]
                if (*len == 33 || *len == 65) && pubkey.len() == usize::from(*len) =>
            {
                Self::P2pk(pubkey.to_vec())
            }
            [OP_RETURN, payload @ ..] => Self::OpReturn(payload.to_vec()),
            _ => Self::Other,
        }
    }

    #[must_use]
    pub fn is_op_return(&self) -> bool {
        matches!(self, Self::OpReturn(_))
    }
}

/// Whether a hex script starts with OP_RETURN, without decoding the rest.
#[must_use]
pub fn is_op_return_hex(script_hex: &str) -> bool {
    script_hex
        .get(..2)
        .is_some_and(|opcode| opcode.eq_ignore_ascii_case("6a"))
}

/// Decode hex, mapping failures into [`ScriptError`].
pub fn decode_hex(script_hex: &str) -> Result<Vec<u8>, ScriptError> {
    hex::decode(script_hex).map_err(|e| ScriptError::InvalidHex(e.to_string()))
}

fn to_hash160(bytes: &[u8]) -> [u8; 20] {
    let mut hash = [0u8; 20];
    hash.copy_from_slice(bytes);
    hash
}

/// Split an OP_RETURN payload into its push items.
///
/// Small-integer opcodes are returned as a single byte holding their value
/// (`OP_1NEGATE` becomes `0x81`), `OP_0` as an empty item.
pub fn parse_pushes(payload: &[u8]) -> Result<Vec<Vec<u8>>, ScriptError> {
    let mut pushes = Vec::new();
    let mut pos = 0;

    while pos < payload.len() {
        let offset = pos;
        let opcode = payload[pos];
        pos += 1;

        let len = match opcode {
            OP_0 => {
                pushes.push(Vec::new());
                continue;
            }
            0x01..=0x4b => usize::from(opcode),
            OP_PUSHDATA1 => read_len(payload, &mut pos, 1, offset)?,
            OP_PUSHDATA2 => read_len(payload, &mut pos, 2, offset)?,
            OP_PUSHDATA4 => read_len(payload, &mut pos, 4, offset)?,
            OP_1NEGATE => {
                pushes.push(vec![0x81]);
                continue;
            }
            OP_1..=OP_16 => {
                pushes.push(vec![opcode - OP_1 + 1]);
                continue;
            }
            _ => return Err(ScriptError::NonPushOpcode { opcode, offset }),
        };

        let available = payload.len() - pos;
        if len > available {
            return Err(ScriptError::TruncatedPush {
                offset,
                needed: len,
                available,
            });
        }
        pushes.push(payload[pos..pos + len].to_vec());
        pos += len;
    }

    Ok(pushes)
}

/// Read a little-endian length prefix of `width` bytes.
fn read_len(
    payload: &[u8],
    pos: &mut usize,
    width: usize,
    offset: usize,
) -> Result<usize, ScriptError> {
    let available = payload.len() - *pos;
    if available < width {
        return Err(ScriptError::TruncatedPush {
            offset,
            needed: width,
            available,
        });
    }
    let len = payload[*pos..*pos + width]
        .iter()
        .rev()
        .fold(0usize, |acc, byte| (acc << 8) | usize::from(*byte));
    *pos += width;
    Ok(len)
}
