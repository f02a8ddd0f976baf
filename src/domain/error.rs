//! Errors raised while decoding script data returned by the indexer.

use thiserror::Error;

/// Errors that occur when an output script cannot be decoded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// The script was not valid hex.
    #[error("invalid script hex: {0}")]
    InvalidHex(String),

    /// A push opcode announced more bytes than the script holds.
    #[error("push at offset {offset} needs {needed} bytes, {available} available")]
    TruncatedPush {
        /// Offset of the push opcode.
        offset: usize,
        /// Bytes announced by the opcode.
        needed: usize,
        /// Bytes left in the script.
        available: usize,
    },

    /// An OP_RETURN payload contained a non-push opcode.
    #[error("non-push opcode 0x{opcode:02x} at offset {offset}")]
    NonPushOpcode {
        /// The offending opcode.
        opcode: u8,
        /// Offset of the opcode.
        offset: usize,
    },
}
