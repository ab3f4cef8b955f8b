//! ABI type tags and decoded values.
//!
//! `AbiType` is the parsed form of a Solidity type string such as
//! `uint256`, `address[]` or `(bool,bytes32)[2]`. `AbiValue` is a typed value
//! that can be encoded against an `AbiType` or produced by decoding one.

use alloy_primitives::{Address, B256, I256, U256};
use serde::{ser::SerializeSeq, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::AbiError;

/// Size of one ABI word in bytes.
pub const WORD_SIZE: usize = 32;

/// A Solidity ABI type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    /// 20-byte account address
    Address,
    Bool,
    /// Unsigned integer; width in bits (8..=256, multiple of 8)
    Uint(usize),
    /// Signed integer; width in bits (8..=256, multiple of 8)
    Int(usize),
    /// `bytes1` .. `bytes32`; length in bytes
    FixedBytes(usize),
    /// Variable-length byte array
    Bytes,
    String,
    /// `T[k]`
    FixedArray(Box<AbiType>, usize),
    /// `T[]`
    Array(Box<AbiType>),
    /// `(T1,T2,...)`
    Tuple(Vec<AbiType>),
}

impl AbiType {
    /// Whether the type is encoded out-of-line (offset in the head, content in the tail).
    pub fn is_dynamic(&self) -> bool {
        match self {
            AbiType::Bytes | AbiType::String | AbiType::Array(_) => true,
            AbiType::FixedArray(inner, _) => inner.is_dynamic(),
            AbiType::Tuple(members) => members.iter().any(AbiType::is_dynamic),
            _ => false,
        }
    }

    /// Elementary value types are stored verbatim in event topics; everything
    /// else is stored as the keccak256 of its encoding.
    pub fn is_value_type(&self) -> bool {
        matches!(
            self,
            AbiType::Address
                | AbiType::Bool
                | AbiType::Uint(_)
                | AbiType::Int(_)
                | AbiType::FixedBytes(_)
        )
    }

    /// Number of bytes this type occupies in the head of an enclosing tuple.
    /// Saturates for hand-built types too large to address; parsed types are
    /// rejected before they get that big.
    pub fn head_size(&self) -> usize {
        self.checked_head_size().unwrap_or(usize::MAX)
    }

    fn checked_head_size(&self) -> Option<usize> {
        if self.is_dynamic() {
            return Some(WORD_SIZE);
        }
        match self {
            AbiType::FixedArray(inner, len) => inner.checked_head_size()?.checked_mul(*len),
            AbiType::Tuple(members) => members
                .iter()
                .try_fold(0usize, |acc, m| acc.checked_add(m.checked_head_size()?)),
            _ => Some(WORD_SIZE),
        }
    }

    /// Parse a type string, resolving JSON-ABI `tuple` types against the
    /// canonical strings of their components.
    ///
    /// `tuple[2]` with components `["address", "uint256"]` resolves to
    /// `(address,uint256)[2]`.
    pub fn resolve(ty: &str, components: &[String]) -> Result<Self, AbiError> {
        let ty = ty.trim();
        match ty.strip_prefix("tuple") {
            Some(suffix) => format!("({}){}", components.join(","), suffix).parse(),
            None => ty.parse(),
        }
    }
}

/// Split a comma-separated list at top level, ignoring commas nested in parentheses.
pub(crate) fn split_top_level(s: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&s[start..]);
    Some(parts)
}

fn parse_width(digits: &str, ty: &str) -> Result<usize, AbiError> {
    let unsupported = || AbiError::UnsupportedType { ty: ty.to_string() };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(unsupported());
    }
    digits.parse().map_err(|_| unsupported())
}

impl FromStr for AbiType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let unsupported = || AbiError::UnsupportedType { ty: s.to_string() };

        if let Some(body) = s.strip_suffix(']') {
            let open = body.rfind('[').ok_or_else(unsupported)?;
            let inner: AbiType = body[..open].parse()?;
            let dim = &body[open + 1..];
            return if dim.is_empty() {
                Ok(AbiType::Array(Box::new(inner)))
            } else {
                let len = parse_width(dim, s)?;
                let ty = AbiType::FixedArray(Box::new(inner), len);
                ty.checked_head_size().ok_or_else(unsupported)?;
                Ok(ty)
            };
        }

        if let Some(body) = s.strip_prefix('(').and_then(|b| b.strip_suffix(')')) {
            if body.trim().is_empty() {
                return Ok(AbiType::Tuple(Vec::new()));
            }
            let members = split_top_level(body)
                .ok_or_else(unsupported)?
                .into_iter()
                .map(str::parse)
                .collect::<Result<Vec<AbiType>, _>>()?;
            let ty = AbiType::Tuple(members);
            ty.checked_head_size().ok_or_else(unsupported)?;
            return Ok(ty);
        }

        match s {
            "address" => return Ok(AbiType::Address),
            "bool" => return Ok(AbiType::Bool),
            "string" => return Ok(AbiType::String),
            "bytes" => return Ok(AbiType::Bytes),
            "uint" => return Ok(AbiType::Uint(256)),
            "int" => return Ok(AbiType::Int(256)),
            _ => {}
        }

        if let Some(digits) = s.strip_prefix("uint") {
            let bits = parse_width(digits, s)?;
            if bits == 0 || bits > 256 || bits % 8 != 0 {
                return Err(unsupported());
            }
            return Ok(AbiType::Uint(bits));
        }
        if let Some(digits) = s.strip_prefix("int") {
            let bits = parse_width(digits, s)?;
            if bits == 0 || bits > 256 || bits % 8 != 0 {
                return Err(unsupported());
            }
            return Ok(AbiType::Int(bits));
        }
        if let Some(digits) = s.strip_prefix("bytes") {
            let len = parse_width(digits, s)?;
            if len == 0 || len > 32 {
                return Err(unsupported());
            }
            return Ok(AbiType::FixedBytes(len));
        }

        // fixed/ufixed, function, bare `tuple`, and anything else
        Err(unsupported())
    }
}

/// Canonical form, as used in signatures: `uint256`, `(address,bool)[]`.
impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Address => write!(f, "address"),
            AbiType::Bool => write!(f, "bool"),
            AbiType::Uint(bits) => write!(f, "uint{bits}"),
            AbiType::Int(bits) => write!(f, "int{bits}"),
            AbiType::FixedBytes(n) => write!(f, "bytes{n}"),
            AbiType::Bytes => write!(f, "bytes"),
            AbiType::String => write!(f, "string"),
            AbiType::FixedArray(inner, len) => write!(f, "{inner}[{len}]"),
            AbiType::Array(inner) => write!(f, "{inner}[]"),
            AbiType::Tuple(members) => {
                let parts: Vec<_> = members.iter().map(|m| m.to_string()).collect();
                write!(f, "({})", parts.join(","))
            }
        }
    }
}

impl Serialize for AbiType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AbiType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A typed ABI value.
///
/// Integers keep their full 256-bit width; use `Display` (or serialization)
/// to get the decimal string form without precision loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Address(Address),
    Bool(bool),
    /// Unsigned integer and its declared width in bits
    Uint(U256, usize),
    /// Signed integer and its declared width in bits
    Int(I256, usize),
    /// Left-aligned bytes and the declared length (`bytesN`)
    FixedBytes(B256, usize),
    Bytes(Vec<u8>),
    String(String),
    FixedArray(Vec<AbiValue>),
    Array(Vec<AbiValue>),
    Tuple(Vec<AbiValue>),
}

impl AbiValue {
    pub fn uint256(value: U256) -> Self {
        AbiValue::Uint(value, 256)
    }

    pub fn int256(value: I256) -> Self {
        AbiValue::Int(value, 256)
    }

    /// Short name of the value's kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            AbiValue::Address(_) => "address",
            AbiValue::Bool(_) => "bool",
            AbiValue::Uint(..) => "uint",
            AbiValue::Int(..) => "int",
            AbiValue::FixedBytes(..) => "fixed bytes",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::String(_) => "string",
            AbiValue::FixedArray(_) => "fixed array",
            AbiValue::Array(_) => "array",
            AbiValue::Tuple(_) => "tuple",
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            AbiValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(v, _) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<I256> {
        match self {
            AbiValue::Int(v, _) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Byte content of `bytes` and `bytesN` values (the latter trimmed to N).
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::Bytes(b) => Some(b),
            AbiValue::FixedBytes(b, n) => Some(&b.as_slice()[..*n]),
            _ => None,
        }
    }

    pub fn as_slice(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::FixedArray(v) | AbiValue::Array(v) | AbiValue::Tuple(v) => Some(v),
            _ => None,
        }
    }
}

/// Lowercase `0x`-prefixed hex for a 20-byte address.
pub fn address_to_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Address(a) => write!(f, "{}", address_to_hex(a)),
            AbiValue::Bool(b) => write!(f, "{b}"),
            AbiValue::Uint(v, _) => write!(f, "{v}"),
            AbiValue::Int(v, _) => write!(f, "{v}"),
            AbiValue::FixedBytes(b, n) => write!(f, "0x{}", hex::encode(&b.as_slice()[..*n])),
            AbiValue::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            AbiValue::String(s) => write!(f, "{s}"),
            AbiValue::FixedArray(items) | AbiValue::Array(items) => {
                let parts: Vec<_> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            AbiValue::Tuple(items) => {
                let parts: Vec<_> = items.iter().map(|x| x.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
        }
    }
}

/// Scalars serialize as strings (integers in decimal) so JSON consumers never
/// see a lossy number; booleans stay booleans and sequences stay arrays.
impl Serialize for AbiValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AbiValue::Bool(b) => serializer.serialize_bool(*b),
            AbiValue::FixedArray(items) | AbiValue::Array(items) | AbiValue::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            other => serializer.collect_str(other),
        }
    }
}
