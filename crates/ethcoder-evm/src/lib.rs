//! # ethcoder-evm
//!
//! Ethereum ABI codec, event log decoder, and method call encoder.
//!
//! ## Implementation notes
//! - `codec` implements head/tail encoding with strict decoding
//! - Topics[0] → event topic identifier (keccak256 of the signature)
//! - Topics[1..] → indexed parameters (each one 32-byte word)
//! - `data` → non-indexed parameters (ABI-encoded tuple)
//! - Calldata → 4-byte selector followed by the encoded inputs

pub mod batch;
pub mod call_decoder;
pub mod codec;
pub mod coder;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod normalizer;

pub use batch::{chunked_decode, par_decode_batch, par_decode_logs, parallel_decode};
pub use call_decoder::CallDecoder;
pub use coder::ContractCoder;
pub use config::CoderConfig;
pub use decoder::EvmLogDecoder;
pub use encoder::MethodEncoder;
