//! Strict hex conversion for keys and envelopes.
//!
//! Output is always lowercase, two digits per byte. Input must have even
//! length and contain only hex digits; uppercase digits are accepted.

use crate::error::HexError;

/// Encode bytes as lowercase hex.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    ::hex::encode(bytes)
}

/// Decode a hex string, rejecting odd lengths and non-hex characters.
pub fn hex_to_bytes(s: &str) -> Result<Vec<u8>, HexError> {
    if s.len() % 2 != 0 {
        return Err(HexError::OddLength(s.len()));
    }
    ::hex::decode(s).map_err(|e| from_hex_error(e, s.len()))
}

/// Decode a hex string into a fixed-size array.
pub fn hex_to_array<const N: usize>(s: &str) -> Result<[u8; N], HexError> {
    if s.len() % 2 != 0 {
        return Err(HexError::OddLength(s.len()));
    }
    if s.len() != N * 2 {
        return Err(HexError::InvalidLength {
            expected: N,
            got: s.len() / 2,
        });
    }
    let mut out = [0u8; N];
    ::hex::decode_to_slice(s, &mut out).map_err(|e| from_hex_error(e, s.len()))?;
    Ok(out)
}

fn from_hex_error(err: ::hex::FromHexError, len: usize) -> HexError {
    match err {
        ::hex::FromHexError::InvalidHexCharacter { c, index } => {
            HexError::InvalidCharacter { c, index }
        }
        ::hex::FromHexError::OddLength => HexError::OddLength(len),
        ::hex::FromHexError::InvalidStringLength => HexError::InvalidLength {
            expected: 0,
            got: len / 2,
        },
    }
}
