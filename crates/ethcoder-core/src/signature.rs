//! Function selector and event topic computation.
//!
//! Both are derived from the keccak256 hash of a canonical signature string:
//!   keccak256("Transfer(address,address,uint256)")
//!   → 0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef
//!
//! The full digest is the event topic identifier (topics[0] of a log); its
//! first 4 bytes are the function selector that prefixes calldata.

use alloy_primitives::B256;
use serde::{Serialize, Serializer};
use std::fmt;
use tiny_keccak::{Hasher, Keccak};

use crate::error::{AbiError, DecodeError};
use crate::types::{split_top_level, AbiType};

/// keccak256 of arbitrary bytes.
pub fn keccak256(bytes: impl AsRef<[u8]>) -> B256 {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(bytes.as_ref());
    hasher.finalize(&mut output);
    B256::from(output)
}

/// Build the canonical signature `name(type1,type2,...)`.
pub fn canonical_signature(name: &str, types: &[AbiType]) -> String {
    let parts: Vec<_> = types.iter().map(|t| t.to_string()).collect();
    format!("{name}({})", parts.join(","))
}

/// Split a human-written signature like `transfer(address, uint)` into its
/// name and parsed parameter types.
pub fn parse_signature(signature: &str) -> Result<(String, Vec<AbiType>), AbiError> {
    let invalid = || AbiError::InvalidSignature {
        signature: signature.to_string(),
    };
    let signature = signature.trim();
    let open = signature.find('(').ok_or_else(invalid)?;
    let name = signature[..open].trim();
    let params = signature[open + 1..].strip_suffix(')').ok_or_else(invalid)?;
    if name.is_empty() {
        return Err(invalid());
    }
    if params.trim().is_empty() {
        return Ok((name.to_string(), Vec::new()));
    }
    let types = split_top_level(params)
        .ok_or_else(invalid)?
        .into_iter()
        .map(str::parse)
        .collect::<Result<Vec<AbiType>, _>>()?;
    Ok((name.to_string(), types))
}

/// 4-byte function selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selector(pub [u8; 4]);

impl Selector {
    /// Selector of a canonical signature string.
    pub fn of(signature: &str) -> Self {
        let digest = keccak256(signature.as_bytes());
        let mut out = [0u8; 4];
        out.copy_from_slice(&digest.as_slice()[..4]);
        Self(out)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// Hex without prefix, e.g. `a9059cbb`.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// `0x`-prefixed, the form used at the start of calldata.
impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 32-byte event topic identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TopicId(pub B256);

impl TopicId {
    /// Topic identifier of a canonical signature string.
    pub fn of(signature: &str) -> Self {
        Self(keccak256(signature.as_bytes()))
    }

    /// Parse a topic as found in a log: 64 hex chars, `0x` prefix optional,
    /// any letter case.
    pub fn from_hex(topic: &str) -> Result<Self, DecodeError> {
        let hex_str = topic
            .strip_prefix("0x")
            .or_else(|| topic.strip_prefix("0X"))
            .unwrap_or(topic);
        if hex_str.len() != 64 {
            return Err(DecodeError::InvalidHex {
                reason: format!("topic must be 32 bytes, got {} hex chars", hex_str.len()),
            });
        }
        let bytes = hex::decode(hex_str).map_err(|e| DecodeError::InvalidHex {
            reason: format!("invalid topic hex: {e}"),
        })?;
        Ok(Self(B256::from_slice(&bytes)))
    }

    /// Hex without prefix; the key form used when matching logs.
    pub fn topic_hex(&self) -> String {
        hex::encode(self.0.as_slice())
    }

    pub fn as_b256(&self) -> &B256 {
        &self.0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.topic_hex())
    }
}

impl Serialize for TopicId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn erc20_transfer_topic() {
        let topic = TopicId::of("Transfer(address,address,uint256)");
        assert_eq!(
            topic.topic_hex(),
            "ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef"
        );
    }

    #[test]
    fn uniswap_v3_swap_topic() {
        let topic = TopicId::of("Swap(address,address,int256,int256,uint160,uint128,int24)");
        assert_eq!(
            topic.to_string(),
            "0xc42079f94a6350d7e6235f29174924f928cc2ac818eb64fed8004e115fbcca67"
        );
    }

    #[test]
    fn well_known_selectors() {
        assert_eq!(Selector::of("transfer(address,uint256)").to_string(), "0xa9059cbb");
        assert_eq!(Selector::of("balanceOf(address)").to_hex(), "70a08231");
        assert_eq!(Selector::of("approve(address,uint256)").to_hex(), "095ea7b3");
        assert_eq!(Selector::of("allowance(address,address)").to_hex(), "dd62ed3e");
    }

    #[test]
    fn hashing_is_deterministic() {
        let sig = canonical_signature("transfer", &[AbiType::Address, AbiType::Uint(256)]);
        assert_eq!(Selector::of(&sig), Selector::of(&sig));
        assert_eq!(TopicId::of(&sig), TopicId::of(&sig));
    }

    #[test]
    fn parse_signature_normalises_aliases() {
        let (name, types) = parse_signature("transfer(address, uint)").unwrap();
        assert_eq!(name, "transfer");
        assert_eq!(canonical_signature(&name, &types), "transfer(address,uint256)");

        let (_, types) = parse_signature("swap((address,uint256)[],bytes)").unwrap();
        assert_eq!(types.len(), 2);

        let (name, types) = parse_signature("totalSupply()").unwrap();
        assert_eq!(name, "totalSupply");
        assert!(types.is_empty());
    }

    #[test]
    fn parse_signature_rejects_garbage() {
        assert!(parse_signature("transfer").is_err());
        assert!(parse_signature("(address)").is_err());
        assert!(matches!(
            parse_signature("f(fixed128x18)"),
            Err(AbiError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn topic_from_hex_accepts_prefix_and_case() {
        let lower = TopicId::from_hex(
            "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef",
        )
        .unwrap();
        let upper = TopicId::from_hex(
            "DDF252AD1BE2C89B69C2B068FC378DAA952BA7F163C4A11628F55A4DF523B3EF",
        )
        .unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower, TopicId::of("Transfer(address,address,uint256)"));
    }

    #[test]
    fn topic_from_hex_rejects_malformed() {
        assert!(TopicId::from_hex("0x1234").is_err());
        assert!(TopicId::from_hex(&format!("0x{}", "zz".repeat(32))).is_err());
    }
}
