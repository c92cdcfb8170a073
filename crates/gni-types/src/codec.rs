//! Identifier codec: conversions between raw bytes, hexadecimal and base-58.
//!
//! Every function here is pure. Hex strings are produced lowercase with a
//! `0x` prefix and accepted with or without one. Base-58 uses the Bitcoin
//! alphabet, which is also the alphabet of IPFS content addresses.

use crate::error::TypeError;

/// Separator used between entity key components.
pub const KEY_SEPARATOR: char = '-';

/// Encode bytes as a `0x`-prefixed lowercase hex string.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode a hex string (optionally `0x`-prefixed) into bytes.
///
/// Odd-length input is rejected rather than silently realigned; callers that
/// legitimately hold an odd number of digits pad with [`pad_left_zeros`]
/// first.
pub fn hex_to_bytes(s: &str) -> Result<Vec<u8>, TypeError> {
    let digits = strip_hex_prefix(s);
    if digits.len() % 2 != 0 {
        return Err(TypeError::malformed(format!(
            "odd-length hex string ({} digits): {s}",
            digits.len()
        )));
    }
    hex::decode(digits).map_err(|e| TypeError::malformed(format!("invalid hex {s}: {e}")))
}

/// Encode bytes as base-58 (Bitcoin alphabet).
pub fn bytes_to_base58(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

/// Decode a base-58 string into bytes.
pub fn base58_to_bytes(s: &str) -> Result<Vec<u8>, TypeError> {
    bs58::decode(s)
        .into_vec()
        .map_err(|e| TypeError::malformed(format!("invalid base58 {s}: {e}")))
}

/// Join key components with [`KEY_SEPARATOR`].
///
/// Order matters: `join_key(&["a", "b"]) != join_key(&["b", "a"])`. Use
/// [`crate::EntityKey::join`] when the components come from untrusted input;
/// it also rejects components that contain the separator.
pub fn join_key<S: AsRef<str>>(parts: &[S]) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(KEY_SEPARATOR);
        }
        out.push_str(part.as_ref());
    }
    out
}

/// Left-pad a hex digit string with zeros to exactly `width` digits.
///
/// A `0x` prefix on the input is accepted and dropped; the result is bare
/// digits. `width` must be even so that the result always converts to whole
/// bytes.
pub fn pad_left_zeros(hex: &str, width: usize) -> Result<String, TypeError> {
    if width % 2 != 0 {
        return Err(TypeError::malformed(format!("pad width must be even, got {width}")));
    }
    let digits = strip_hex_prefix(hex);
    if digits.len() > width {
        return Err(TypeError::malformed(format!(
            "hex string of {} digits does not fit in {width}",
            digits.len()
        )));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(TypeError::malformed(format!("invalid hex digits: {hex}")));
    }
    let mut out = String::with_capacity(width);
    out.extend(std::iter::repeat('0').take(width - digits.len()));
    out.push_str(digits);
    Ok(out)
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}
