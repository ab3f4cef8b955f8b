//! Error types for the ethcoder encode/decode pipeline.

use thiserror::Error;

/// Errors raised while decoding ABI-encoded bytes, hex strings, or log topics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Invalid hex input: {reason}")]
    InvalidHex { reason: String },

    #[error("Data too short: need {needed} bytes at offset {offset}, have {len}")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        len: usize,
    },

    #[error("Invalid offset or length word at byte {at}")]
    InvalidOffset { at: usize },

    #[error("Non-zero padding in {ty} word")]
    InvalidPadding { ty: String },

    #[error("Value does not fit in {ty}")]
    OutOfRange { ty: String },

    #[error("Invalid UTF-8 in string")]
    InvalidUtf8,

    #[error("Nesting deeper than {max} levels")]
    NestingTooDeep { max: usize },

    #[error("Expected a 32-byte word, got {len} bytes")]
    InvalidWordLength { len: usize },

    #[error("Missing topic {index} for indexed parameter '{param}'")]
    MissingTopic { param: String, index: usize },

    #[error("Call to '{method}' returned no decodable output")]
    MissingOutput { method: String },

    #[error("Calldata too short: {len} bytes (need at least 4 for selector)")]
    CalldataTooShort { len: usize },

    #[error("No function with selector {selector}")]
    UnknownSelector { selector: String },
}

/// Errors raised while encoding a value against a declared ABI type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Value does not fit in {ty}")]
    OutOfRange { ty: String },

    #[error("Length mismatch: expected {expected} values, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("Invalid {ty} value '{value}': {reason}")]
    InvalidValue {
        ty: String,
        value: String,
        reason: String,
    },
}

/// Errors from loading a contract ABI or parsing type strings.
#[derive(Debug, Error)]
pub enum AbiError {
    #[error("Unsupported ABI type '{ty}'")]
    UnsupportedType { ty: String },

    #[error("Invalid signature '{signature}'")]
    InvalidSignature { signature: String },

    #[error("Invalid ABI: {reason}")]
    Invalid { reason: String },

    #[error("ABI JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from the external blockchain client boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// Connection refused, HTTP failure, and other transport problems.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error (e.g. execution reverted).
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Returns `true` if retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout { .. })
    }
}

/// Errors that can occur during batch log decoding.
#[derive(Debug, Error)]
pub enum BatchDecodeError {
    #[error("Decode error at index {index}: {source}")]
    ItemFailed {
        index: usize,
        #[source]
        source: DecodeError,
    },
}

/// Top-level error for method encoding and contract view calls.
#[derive(Debug, Error)]
pub enum CoderError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Unsupported ABI type '{ty}'")]
    UnsupportedType { ty: String },

    #[error("Unknown method '{method}'")]
    UnknownMethod { method: String },

    #[error("Incorrect number of parameters for method '{method}': expected {expected}, got {got}")]
    Arity {
        method: String,
        expected: usize,
        got: usize,
    },

    #[error("Invalid argument '{param}': {source}")]
    InvalidArgument {
        param: String,
        #[source]
        source: EncodeError,
    },

    #[error("Invalid ABI: {0}")]
    InvalidAbi(String),

    #[error("Communication error: {0}")]
    Communication(#[from] ClientError),
}

impl From<AbiError> for CoderError {
    fn from(err: AbiError) -> Self {
        match err {
            AbiError::UnsupportedType { ty } => CoderError::UnsupportedType { ty },
            other => CoderError::InvalidAbi(other.to_string()),
        }
    }
}

impl CoderError {
    /// Returns `true` if the failure happened at the client boundary rather
    /// than in the codec.
    pub fn is_communication(&self) -> bool {
        matches!(self, Self::Communication(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_type_maps_to_coder_variant() {
        let err: CoderError = AbiError::UnsupportedType { ty: "fixed128x18".into() }.into();
        assert!(matches!(err, CoderError::UnsupportedType { ref ty } if ty == "fixed128x18"));
    }

    #[test]
    fn arity_message_names_method() {
        let err = CoderError::Arity {
            method: "transferFrom".into(),
            expected: 3,
            got: 2,
        };
        assert!(err.to_string().contains("transferFrom"));
    }

    #[test]
    fn timeout_is_retryable_communication() {
        let err: CoderError = ClientError::Timeout { ms: 50 }.into();
        assert!(err.is_communication());
        if let CoderError::Communication(inner) = err {
            assert!(inner.is_retryable());
        }
    }
}
