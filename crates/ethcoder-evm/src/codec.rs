//! Ethereum ABI head/tail codec.
//!
//! A sequence of values is laid out as a head of fixed-size slots followed by
//! a tail. Static values live directly in the head; dynamic values (`bytes`,
//! `string`, `T[]`, and composites containing them) leave a 32-byte offset in
//! the head, measured from the start of the enclosing sequence, and put their
//! content in the tail.
//!
//! Decoding is strict: every offset and length is bounds-checked, padding
//! must be zero, and integer words must fit their declared width.

use alloy_primitives::{Address, B256, I256, U256};
use ethcoder_core::{AbiType, AbiValue, DecodeError, EncodeError, WORD_SIZE};
use std::slice;

/// Maximum nesting of arrays/tuples the decoder will follow.
pub const MAX_DEPTH: usize = 32;

/// Decode a hex string, with or without a `0x` prefix.
pub fn decode_hex(input: &str) -> Result<Vec<u8>, DecodeError> {
    let s = input.trim();
    let s = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    hex::decode(s).map_err(|e| DecodeError::InvalidHex {
        reason: e.to_string(),
    })
}

pub(crate) fn uint_fits(value: U256, bits: usize) -> bool {
    value.bit_len() <= bits
}

/// Two's-complement range check for `intN`.
pub(crate) fn int_fits(value: I256, bits: usize) -> bool {
    let raw = value.into_raw();
    let magnitude = if value.is_negative() { !raw } else { raw };
    magnitude.bit_len() < bits
}

// ─── Encoding ─────────────────────────────────────────────────────────────────

/// ABI-encode `values` as a tuple of `types`.
pub fn encode(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>, EncodeError> {
    if types.len() != values.len() {
        return Err(EncodeError::LengthMismatch {
            expected: types.len(),
            got: values.len(),
        });
    }
    let mut out = Vec::new();
    encode_sequence(types.iter().zip(values), &mut out)?;
    Ok(out)
}

/// ABI-encode one value as a single-element tuple.
pub fn encode_single(ty: &AbiType, value: &AbiValue) -> Result<Vec<u8>, EncodeError> {
    encode(slice::from_ref(ty), slice::from_ref(value))
}

fn size_word(n: usize) -> [u8; 32] {
    U256::from(n as u64).to_be_bytes::<32>()
}

fn mismatch(ty: &AbiType, value: &AbiValue) -> EncodeError {
    EncodeError::TypeMismatch {
        expected: ty.to_string(),
        got: value.kind().to_string(),
    }
}

fn encode_sequence<'a, I>(items: I, out: &mut Vec<u8>) -> Result<(), EncodeError>
where
    I: Iterator<Item = (&'a AbiType, &'a AbiValue)> + Clone,
{
    let head_len: usize = items.clone().map(|(ty, _)| ty.head_size()).sum();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for (ty, value) in items {
        if ty.is_dynamic() {
            head.extend_from_slice(&size_word(head_len + tail.len()));
            encode_value(ty, value, &mut tail)?;
        } else {
            encode_value(ty, value, &mut head)?;
        }
    }

    out.extend_from_slice(&head);
    out.extend_from_slice(&tail);
    Ok(())
}

fn encode_padded_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(&size_word(bytes.len()));
    out.extend_from_slice(bytes);
    let rem = bytes.len() % WORD_SIZE;
    if rem != 0 {
        out.resize(out.len() + WORD_SIZE - rem, 0);
    }
}

fn encode_value(ty: &AbiType, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), EncodeError> {
    match (ty, value) {
        (AbiType::Address, AbiValue::Address(addr)) => {
            out.extend_from_slice(&[0u8; 12]);
            out.extend_from_slice(addr.as_slice());
        }
        (AbiType::Bool, AbiValue::Bool(b)) => {
            out.extend_from_slice(&size_word(usize::from(*b)));
        }
        (AbiType::Uint(bits), AbiValue::Uint(v, _)) => {
            if !uint_fits(*v, *bits) {
                return Err(EncodeError::OutOfRange { ty: ty.to_string() });
            }
            out.extend_from_slice(&v.to_be_bytes::<32>());
        }
        (AbiType::Int(bits), AbiValue::Int(v, _)) => {
            if !int_fits(*v, *bits) {
                return Err(EncodeError::OutOfRange { ty: ty.to_string() });
            }
            out.extend_from_slice(&v.into_raw().to_be_bytes::<32>());
        }
        (AbiType::FixedBytes(n), AbiValue::FixedBytes(b, _)) => {
            if b.as_slice()[*n..].iter().any(|&x| x != 0) {
                return Err(EncodeError::OutOfRange { ty: ty.to_string() });
            }
            out.extend_from_slice(b.as_slice());
        }
        (AbiType::FixedBytes(n), AbiValue::Bytes(b)) => {
            if b.len() != *n {
                return Err(EncodeError::LengthMismatch {
                    expected: *n,
                    got: b.len(),
                });
            }
            let mut word = [0u8; 32];
            word[..*n].copy_from_slice(b);
            out.extend_from_slice(&word);
        }
        (AbiType::Bytes, AbiValue::Bytes(b)) => encode_padded_bytes(b, out),
        (AbiType::String, AbiValue::String(s)) => encode_padded_bytes(s.as_bytes(), out),
        (
            AbiType::FixedArray(inner, len),
            AbiValue::FixedArray(items) | AbiValue::Array(items),
        ) => {
            if items.len() != *len {
                return Err(EncodeError::LengthMismatch {
                    expected: *len,
                    got: items.len(),
                });
            }
            encode_sequence(items.iter().map(|v| (inner.as_ref(), v)), out)?;
        }
        (AbiType::Array(inner), AbiValue::Array(items) | AbiValue::FixedArray(items)) => {
            out.extend_from_slice(&size_word(items.len()));
            encode_sequence(items.iter().map(|v| (inner.as_ref(), v)), out)?;
        }
        (AbiType::Tuple(members), AbiValue::Tuple(items)) => {
            if items.len() != members.len() {
                return Err(EncodeError::LengthMismatch {
                    expected: members.len(),
                    got: items.len(),
                });
            }
            encode_sequence(members.iter().zip(items), out)?;
        }
        _ => return Err(mismatch(ty, value)),
    }
    Ok(())
}

// ─── Decoding ─────────────────────────────────────────────────────────────────

/// Decode `data` as a tuple of `types`. Trailing bytes are ignored.
pub fn decode(types: &[AbiType], data: &[u8]) -> Result<Vec<AbiValue>, DecodeError> {
    decode_tuple(types, data, 0)
}

/// Decode `data` as a single-element tuple of `ty`.
pub fn decode_single(ty: &AbiType, data: &[u8]) -> Result<AbiValue, DecodeError> {
    let mut values = decode(slice::from_ref(ty), data)?;
    values.pop().ok_or(DecodeError::UnexpectedEof {
        offset: 0,
        needed: WORD_SIZE,
        len: data.len(),
    })
}

/// Decode one 32-byte word, as stored in an event topic.
///
/// Value types decode normally. Any other type yields the raw word as
/// `bytes32`, since indexed dynamic and composite parameters are stored as
/// the keccak256 hash of their encoding.
pub fn decode_word(ty: &AbiType, word: &[u8]) -> Result<AbiValue, DecodeError> {
    if word.len() != WORD_SIZE {
        return Err(DecodeError::InvalidWordLength { len: word.len() });
    }
    if ty.is_value_type() {
        decode_value_word(ty, word)
    } else {
        Ok(AbiValue::FixedBytes(B256::from_slice(word), WORD_SIZE))
    }
}

fn read_word(buf: &[u8], pos: usize) -> Result<&[u8], DecodeError> {
    pos.checked_add(WORD_SIZE)
        .and_then(|end| buf.get(pos..end))
        .ok_or(DecodeError::UnexpectedEof {
            offset: pos,
            needed: WORD_SIZE,
            len: buf.len(),
        })
}

/// Read an offset or length word. Anything that cannot be a sane in-memory
/// index is rejected.
fn read_usize(buf: &[u8], pos: usize) -> Result<usize, DecodeError> {
    let word = read_word(buf, pos)?;
    if word[..24].iter().any(|&b| b != 0) {
        return Err(DecodeError::InvalidOffset { at: pos });
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[24..]);
    usize::try_from(u64::from_be_bytes(low)).map_err(|_| DecodeError::InvalidOffset { at: pos })
}

fn decode_value_word(ty: &AbiType, word: &[u8]) -> Result<AbiValue, DecodeError> {
    let out_of_range = || DecodeError::OutOfRange { ty: ty.to_string() };
    let bad_padding = || DecodeError::InvalidPadding { ty: ty.to_string() };
    match ty {
        AbiType::Address => {
            if word[..12].iter().any(|&b| b != 0) {
                return Err(bad_padding());
            }
            Ok(AbiValue::Address(Address::from_slice(&word[12..])))
        }
        AbiType::Bool => {
            if word[..31].iter().any(|&b| b != 0) || word[31] > 1 {
                return Err(out_of_range());
            }
            Ok(AbiValue::Bool(word[31] == 1))
        }
        AbiType::Uint(bits) => {
            let v = U256::from_be_slice(word);
            if !uint_fits(v, *bits) {
                return Err(out_of_range());
            }
            Ok(AbiValue::Uint(v, *bits))
        }
        AbiType::Int(bits) => {
            let v = I256::from_raw(U256::from_be_slice(word));
            if !int_fits(v, *bits) {
                return Err(out_of_range());
            }
            Ok(AbiValue::Int(v, *bits))
        }
        AbiType::FixedBytes(n) => {
            if word[*n..].iter().any(|&b| b != 0) {
                return Err(bad_padding());
            }
            Ok(AbiValue::FixedBytes(B256::from_slice(word), *n))
        }
        _ => Err(DecodeError::OutOfRange { ty: ty.to_string() }),
    }
}

fn check_depth(depth: usize) -> Result<(), DecodeError> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::NestingTooDeep { max: MAX_DEPTH });
    }
    Ok(())
}

fn decode_tuple(types: &[AbiType], buf: &[u8], depth: usize) -> Result<Vec<AbiValue>, DecodeError> {
    check_depth(depth)?;
    let mut pos = 0;
    let mut out = Vec::with_capacity(types.len());
    for ty in types {
        out.push(decode_at(ty, buf, pos, depth + 1)?);
        pos += ty.head_size();
    }
    Ok(out)
}

fn decode_repeated(
    inner: &AbiType,
    count: usize,
    buf: &[u8],
    depth: usize,
) -> Result<Vec<AbiValue>, DecodeError> {
    check_depth(depth)?;
    let stride = inner.head_size();
    (0..count)
        .map(|i| decode_at(inner, buf, i * stride, depth + 1))
        .collect()
}

/// Decode the value whose head slot sits at `pos` within `buf` (the
/// enclosing sequence).
fn decode_at(ty: &AbiType, buf: &[u8], pos: usize, depth: usize) -> Result<AbiValue, DecodeError> {
    if ty.is_dynamic() {
        let offset = read_usize(buf, pos)?;
        let content = buf
            .get(offset..)
            .ok_or(DecodeError::InvalidOffset { at: pos })?;
        decode_content(ty, content, depth)
    } else {
        let content = buf.get(pos..).ok_or(DecodeError::UnexpectedEof {
            offset: pos,
            needed: ty.head_size(),
            len: buf.len(),
        })?;
        decode_content(ty, content, depth)
    }
}

/// Decode a value whose encoding starts at the beginning of `buf`.
fn decode_content(ty: &AbiType, buf: &[u8], depth: usize) -> Result<AbiValue, DecodeError> {
    match ty {
        AbiType::Bytes | AbiType::String => {
            let len = read_usize(buf, 0)?;
            let bytes = WORD_SIZE
                .checked_add(len)
                .and_then(|end| buf.get(WORD_SIZE..end))
                .ok_or(DecodeError::UnexpectedEof {
                    offset: WORD_SIZE,
                    needed: len,
                    len: buf.len(),
                })?;
            if matches!(ty, AbiType::String) {
                let s = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)?;
                Ok(AbiValue::String(s.to_string()))
            } else {
                Ok(AbiValue::Bytes(bytes.to_vec()))
            }
        }
        AbiType::FixedArray(inner, len) => {
            Ok(AbiValue::FixedArray(decode_repeated(inner, *len, buf, depth)?))
        }
        AbiType::Array(inner) => {
            let len = read_usize(buf, 0)?;
            let body = &buf[WORD_SIZE..];
            // Every element occupies at least one head slot; reject lengths
            // the remaining data cannot hold before allocating.
            let min_size = inner.head_size().max(1);
            if len.checked_mul(min_size).map_or(true, |n| n > body.len()) {
                return Err(DecodeError::UnexpectedEof {
                    offset: WORD_SIZE,
                    needed: len.saturating_mul(min_size),
                    len: buf.len(),
                });
            }
            Ok(AbiValue::Array(decode_repeated(inner, len, body, depth)?))
        }
        AbiType::Tuple(members) => Ok(AbiValue::Tuple(decode_tuple(members, buf, depth)?)),
        _ => decode_value_word(ty, read_word(buf, 0)?),
    }
}
