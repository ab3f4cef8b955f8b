//! Coerce loosely-typed input (JSON values, command-line strings) into typed
//! `AbiValue`s for a declared `AbiType`.
//!
//! Big integers are accepted as decimal or `0x` hex strings so callers never
//! have to squeeze a 256-bit value through a JSON number.

use alloy_primitives::{Address, B256, I256, U256};
use ethcoder_core::{AbiType, AbiValue, EncodeError};
use serde_json::Value;

use crate::codec::{decode_hex, int_fits, uint_fits};

fn invalid(ty: &AbiType, value: impl ToString, reason: impl ToString) -> EncodeError {
    EncodeError::InvalidValue {
        ty: ty.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(ty: &AbiType, value: &Value) -> EncodeError {
    EncodeError::TypeMismatch {
        expected: ty.to_string(),
        got: json_kind(value).to_string(),
    }
}

fn parse_u256(ty: &AbiType, s: &str) -> Result<U256, EncodeError> {
    let s = s.trim();
    let (digits, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex_digits) => (hex_digits, 16),
        None => (s, 10),
    };
    if digits.is_empty() {
        return Err(invalid(ty, s, "no digits"));
    }
    U256::from_str_radix(digits, radix).map_err(|e| invalid(ty, s, e))
}

fn parse_i256(ty: &AbiType, s: &str) -> Result<I256, EncodeError> {
    let s = s.trim();
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    let hex_digits = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"));
    if hex_digits.unwrap_or(unsigned).is_empty() {
        return Err(invalid(ty, s, "no digits"));
    }
    let parsed = if hex_digits.is_some() {
        I256::from_hex_str(s)
    } else {
        I256::from_dec_str(s)
    };
    parsed.map_err(|e| invalid(ty, s, e))
}

fn hex_bytes(ty: &AbiType, s: &str) -> Result<Vec<u8>, EncodeError> {
    decode_hex(s).map_err(|e| invalid(ty, s, e))
}

fn json_items<'a>(ty: &AbiType, value: &'a Value) -> Result<&'a [Value], EncodeError> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| mismatch(ty, value))
}

/// Convert a JSON value to an `AbiValue` of type `ty`.
///
/// - `address`, `bytes`, `bytesN`: hex strings
/// - `uintN` / `intN`: JSON numbers or decimal / `0x` hex strings
/// - `bool`: JSON booleans or `"true"` / `"false"`
/// - arrays and tuples: JSON arrays
pub fn from_json(ty: &AbiType, value: &Value) -> Result<AbiValue, EncodeError> {
    match ty {
        AbiType::Address => {
            let s = value.as_str().ok_or_else(|| mismatch(ty, value))?;
            let addr: Address = s.trim().parse().map_err(|e| invalid(ty, s, e))?;
            Ok(AbiValue::Address(addr))
        }
        AbiType::Bool => match value {
            Value::Bool(b) => Ok(AbiValue::Bool(*b)),
            Value::String(s) => match s.trim() {
                "true" => Ok(AbiValue::Bool(true)),
                "false" => Ok(AbiValue::Bool(false)),
                other => Err(invalid(ty, other, "expected true or false")),
            },
            _ => Err(mismatch(ty, value)),
        },
        AbiType::Uint(bits) => {
            let v = match value {
                Value::String(s) => parse_u256(ty, s)?,
                Value::Number(n) => match n.as_u64() {
                    Some(n) => U256::from(n),
                    None => return Err(invalid(ty, n, "not a non-negative integer")),
                },
                _ => return Err(mismatch(ty, value)),
            };
            if !uint_fits(v, *bits) {
                return Err(EncodeError::OutOfRange { ty: ty.to_string() });
            }
            Ok(AbiValue::Uint(v, *bits))
        }
        AbiType::Int(bits) => {
            let v = match value {
                Value::String(s) => parse_i256(ty, s)?,
                Value::Number(n) if n.is_i64() || n.is_u64() => parse_i256(ty, &n.to_string())?,
                Value::Number(n) => return Err(invalid(ty, n, "not an integer")),
                _ => return Err(mismatch(ty, value)),
            };
            if !int_fits(v, *bits) {
                return Err(EncodeError::OutOfRange { ty: ty.to_string() });
            }
            Ok(AbiValue::Int(v, *bits))
        }
        AbiType::FixedBytes(n) => {
            let s = value.as_str().ok_or_else(|| mismatch(ty, value))?;
            let bytes = hex_bytes(ty, s)?;
            if bytes.len() != *n {
                return Err(invalid(ty, s, format!("expected {n} bytes, got {}", bytes.len())));
            }
            let mut word = [0u8; 32];
            word[..*n].copy_from_slice(&bytes);
            Ok(AbiValue::FixedBytes(B256::from(word), *n))
        }
        AbiType::Bytes => {
            let s = value.as_str().ok_or_else(|| mismatch(ty, value))?;
            Ok(AbiValue::Bytes(hex_bytes(ty, s)?))
        }
        AbiType::String => {
            let s = value.as_str().ok_or_else(|| mismatch(ty, value))?;
            Ok(AbiValue::String(s.to_string()))
        }
        AbiType::FixedArray(inner, len) => {
            let items = json_items(ty, value)?;
            if items.len() != *len {
                return Err(EncodeError::LengthMismatch {
                    expected: *len,
                    got: items.len(),
                });
            }
            let values = items
                .iter()
                .map(|v| from_json(inner, v))
                .collect::<Result<_, _>>()?;
            Ok(AbiValue::FixedArray(values))
        }
        AbiType::Array(inner) => {
            let values = json_items(ty, value)?
                .iter()
                .map(|v| from_json(inner, v))
                .collect::<Result<_, _>>()?;
            Ok(AbiValue::Array(values))
        }
        AbiType::Tuple(members) => {
            let items = json_items(ty, value)?;
            if items.len() != members.len() {
                return Err(EncodeError::LengthMismatch {
                    expected: members.len(),
                    got: items.len(),
                });
            }
            let values = members
                .iter()
                .zip(items)
                .map(|(t, v)| from_json(t, v))
                .collect::<Result<_, _>>()?;
            Ok(AbiValue::Tuple(values))
        }
    }
}

/// Convert a command-line string to an `AbiValue` of type `ty`.
///
/// Arrays and tuples are given as JSON (`[1,2,3]`, `["0xab..",5]`);
/// scalars are taken verbatim.
pub fn parse(ty: &AbiType, input: &str) -> Result<AbiValue, EncodeError> {
    match ty {
        AbiType::FixedArray(..) | AbiType::Array(_) | AbiType::Tuple(_) => {
            let value: Value = serde_json::from_str(input).map_err(|e| invalid(ty, input, e))?;
            from_json(ty, &value)
        }
        _ => from_json(ty, &Value::String(input.to_string())),
    }
}
