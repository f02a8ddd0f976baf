//! CashAddr encoding for P2PKH and P2SH output scripts.

use super::script::ScriptKind;

/// Address prefix used on eCash mainnet.
pub const ECASH_PREFIX: &str = "ecash";

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Address type encoded in the version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    P2pkh,
    P2sh,
}

impl AddressKind {
    const fn type_bits(self) -> u8 {
        match self {
            Self::P2pkh => 0,
            Self::P2sh => 1,
        }
    }
}

/// Encode a 160-bit hash as a CashAddr string with the given prefix.
#[must_use]
pub fn encode_cashaddr(prefix: &str, kind: AddressKind, hash160: &[u8; 20]) -> String {
    // Size code 0 means a 160-bit hash.
    let version = kind.type_bits() << 3;
    let mut raw = Vec::with_capacity(21);
    raw.push(version);
    raw.extend_from_slice(hash160);
    let payload = to_base32(&raw);

    let mut checksum_input: Vec<u8> = prefix.bytes().map(|b| b & 0x1f).collect();
    checksum_input.push(0);
    checksum_input.extend_from_slice(&payload);
    checksum_input.extend_from_slice(&[0u8; 8]);
    let checksum = polymod(&checksum_input);

    let mut address = String::with_capacity(prefix.len() + 1 + payload.len() + 8);
    address.push_str(prefix);
    address.push(':');
    for value in &payload {
        address.push(char::from(CHARSET[usize::from(*value)]));
    }
    for i in 0..8 {
        let value = ((checksum >> (5 * (7 - i))) & 0x1f) as usize;
        address.push(char::from(CHARSET[value]));
    }
    address
}

/// The eCash address paid by an output script, if it is a standard template.
#[must_use]
pub fn script_to_address(script_hex: &str) -> Option<String> {
    match ScriptKind::classify(script_hex).ok()? {
        ScriptKind::P2pkh(hash) => Some(encode_cashaddr(ECASH_PREFIX, AddressKind::P2pkh, &hash)),
        ScriptKind::P2sh(hash) => Some(encode_cashaddr(ECASH_PREFIX, AddressKind::P2sh, &hash)),
        _ => None,
    }
}

/// Short form of an address: prefix dropped, first and last `n` chars kept.
#[must_use]
pub fn address_preview(address: &str, n: usize) -> String {
    let unprefixed = address.rsplit(':').next().unwrap_or(address);
    preview(unprefixed, n)
}

/// Short label for any output script, preferring the address form.
#[must_use]
pub fn script_preview(script_hex: &str, n: usize) -> String {
    match script_to_address(script_hex) {
        Some(address) => address_preview(&address, n),
        None => preview(script_hex, n),
    }
}

fn preview(s: &str, n: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= n * 2 {
        return s.to_string();
    }
    let head: String = chars[..n].iter().collect();
    let tail: String = chars[chars.len() - n..].iter().collect();
    format!("{head}...{tail}")
}

/// Regroup 8-bit bytes into 5-bit values, padding the final group.
fn to_base32(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity((data.len() * 8).div_ceil(5));
    let mut acc: u32 = 0;
    let mut bits = 0;
    for byte in data {
        acc = (acc << 8) | u32::from(*byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(((acc >> bits) & 0x1f) as u8);
        }
    }
    if bits > 0 {
        out.push(((acc << (5 - bits)) & 0x1f) as u8);
    }
    out
}

fn polymod(values: &[u8]) -> u64 {
    const GENERATORS: [u64; 5] = [
        0x98_f2bc_8e61,
        0x79_b76d_99e2,
        0xf3_3e5f_b3c4,
        0xae_2eab_e2a8,
        0x1e_4f43_e470,
    ];

    let mut c: u64 = 1;
    for value in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ u64::from(*value);
        for (i, generator) in GENERATORS.iter().enumerate() {
            if c0 & (1 << i) != 0 {
                c ^= generator;
            }
        }
    }
    c ^ 1
}
