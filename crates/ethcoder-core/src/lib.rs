//! # ethcoder-core
//!
//! Core types, traits, and primitives shared across the ethcoder crates:
//! the ABI type model, contract descriptors, signature hashing, the
//! `LogDecoder` and `BlockchainClient` traits, and the error taxonomy.

pub mod abi;
pub mod call;
pub mod client;
pub mod decoder;
pub mod error;
pub mod event;
pub mod signature;
pub mod types;

pub use abi::{ContractAbi, EventDescriptor, FunctionDescriptor, Parameter};
pub use call::DecodedCall;
pub use client::{BlockchainClient, CallRequest};
pub use decoder::{BatchDecodeResult, ErrorMode, LogDecoder, ProgressCallback};
pub use error::{AbiError, BatchDecodeError, ClientError, CoderError, DecodeError, EncodeError};
pub use event::{DecodedEvent, LogEntry};
pub use signature::{canonical_signature, keccak256, parse_signature, Selector, TopicId};
pub use types::{address_to_hex, AbiType, AbiValue, WORD_SIZE};

pub use alloy_primitives::{Address, B256, I256, U256};
