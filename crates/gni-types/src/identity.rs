use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::codec::{base58_to_bytes, bytes_to_base58};
use crate::error::TypeError;

/// 256-bit identifier of an on-chain resource (a subgraph).
///
/// The numeric value is what the contracts emit as `uint256 subgraphID`.
/// Entities are keyed by its content-address rendering: the minimal
/// big-endian byte string of the value, base-58 encoded. The rendering is
/// bijective, so every id has exactly one key and every canonical key maps
/// back to one id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(U256);

impl ResourceId {
    pub const fn from_u256(value: U256) -> Self {
        Self(value)
    }

    pub const fn as_u256(&self) -> U256 {
        self.0
    }

    /// Base-58 content-address rendering.
    pub fn to_content_address(&self) -> String {
        bytes_to_base58(&self.to_minimal_be_bytes())
    }

    /// Big-endian bytes without leading zero bytes. Zero keeps one byte.
    ///
    /// Same bytes as the value's minimal hex digits left-padded to an even
    /// count.
    pub fn to_minimal_be_bytes(&self) -> Vec<u8> {
        let bytes = self.0.to_be_bytes::<32>();
        let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len() - 1);
        bytes[first..].to_vec()
    }

    /// Parse a canonical content-address rendering.
    ///
    /// Renderings with redundant leading zero bytes are rejected so that the
    /// mapping stays one-to-one.
    pub fn from_content_address(s: &str) -> Result<Self, TypeError> {
        let bytes = base58_to_bytes(s)?;
        if bytes.is_empty() {
            return Err(TypeError::malformed("empty content address"));
        }
        let value = U256::try_from_be_slice(&bytes).ok_or(TypeError::InvalidLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        let id = Self(value);
        if id.to_content_address() != s {
            return Err(TypeError::malformed(format!(
                "non-canonical content address: {s}"
            )));
        }
        Ok(id)
    }

    /// Decimal rendering, as the contracts print `uint256`.
    pub fn to_decimal(&self) -> String {
        self.0.to_string()
    }
}

impl From<U256> for ResourceId {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl FromStr for ResourceId {
    type Err = TypeError;

    /// Accepts a decimal or `0x`-prefixed hex integer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        U256::from_str(s)
            .map(Self)
            .map_err(|e| TypeError::malformed(format!("invalid resource id {s}: {e}")))
    }
}

impl fmt::Debug for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceId({})", self.to_content_address())
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_content_address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_renders_as_single_zero_byte() {
        let id = ResourceId::from_u256(U256::ZERO);
        assert_eq!(id.to_content_address(), "1");
        assert_eq!(ResourceId::from_content_address("1").unwrap(), id);
    }

    #[test]
    fn odd_digit_count_is_padded() {
        // 0xabc has three hex digits and must render as bytes 0a bc.
        let id = ResourceId::from_u256(U256::from(0xabcu64));
        assert_eq!(id.to_content_address(), "pP");
    }

    #[test]
    fn minimal_bytes_match_padded_hex_digits() {
        use crate::codec::{hex_to_bytes, pad_left_zeros};

        for value in [0u64, 1, 0xab, 0xabc, 0x1_0000, u64::MAX] {
            let id = ResourceId::from_u256(U256::from(value));
            let digits = format!("{value:x}");
            let padded = pad_left_zeros(&digits, digits.len() + digits.len() % 2).unwrap();
            assert_eq!(id.to_minimal_be_bytes(), hex_to_bytes(&padded).unwrap());
        }
        assert_eq!(ResourceId::from_u256(U256::MAX).to_minimal_be_bytes(), vec![0xff; 32]);
    }

    #[test]
    fn redundant_leading_zero_is_rejected() {
        // "11" decodes to [0x00, 0x00].
        assert!(ResourceId::from_content_address("11").is_err());
    }

    #[test]
    fn oversized_content_address_is_rejected() {
        let too_long = bytes_to_base58(&[0xffu8; 33]);
        assert!(matches!(
            ResourceId::from_content_address(&too_long),
            Err(TypeError::InvalidLength { expected: 32, actual: 33 })
        ));
    }

    #[test]
    fn parse_decimal_and_hex() {
        let a: ResourceId = "2748".parse().unwrap();
        let b: ResourceId = "0xabc".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_decimal(), "2748");
        assert!("not-a-number".parse::<ResourceId>().is_err());
    }

    #[test]
    fn display_is_content_address() {
        let id = ResourceId::from_u256(U256::from(0xabcu64));
        assert_eq!(id.to_string(), "pP");
    }

    proptest! {
        #[test]
        fn content_address_is_bijective(limbs in any::<[u64; 4]>()) {
            let id = ResourceId::from_u256(U256::from_limbs(limbs));
            let rendered = id.to_content_address();
            prop_assert_eq!(ResourceId::from_content_address(&rendered).unwrap(), id);
        }
    }
}
