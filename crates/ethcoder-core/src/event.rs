//! Raw and decoded event log types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::signature::TopicId;
use crate::types::AbiValue;

/// An undecoded log as returned by `eth_getLogs` or a transaction receipt.
/// This is the input to every log decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// topics[0] is the event topic identifier; the rest are indexed params.
    #[serde(default)]
    pub topics: Vec<String>,
    /// ABI-encoded non-indexed parameters (hex).
    #[serde(default)]
    pub data: Option<String>,
    /// Emitting contract address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_index: Option<String>,
}

impl LogEntry {
    pub fn new(topics: Vec<String>, data: impl Into<String>) -> Self {
        Self {
            topics,
            data: Some(data.into()),
            ..Default::default()
        }
    }

    /// Parsed topics[0], if present.
    pub fn topic_id(&self) -> Option<Result<TopicId, DecodeError>> {
        self.topics.first().map(|t| TopicId::from_hex(t))
    }
}

/// A decoded event: the matched event name plus its fields in declaration
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedEvent {
    pub event_name: String,
    /// Field values keyed by declared parameter name
    pub fields: IndexMap<String, AbiValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_index: Option<String>,
}

impl DecodedEvent {
    /// Empty event carrying over the log's metadata.
    pub fn for_log(event_name: impl Into<String>, log: &LogEntry) -> Self {
        Self {
            event_name: event_name.into(),
            fields: IndexMap::new(),
            address: log.address.clone(),
            block_number: log.block_number.clone(),
            transaction_hash: log.transaction_hash.clone(),
            log_index: log.log_index.clone(),
        }
    }

    /// Get a field value by name.
    pub fn field(&self, name: &str) -> Option<&AbiValue> {
        self.fields.get(name)
    }

    /// Flat `name -> string` view, `eventName` first. Integers render in
    /// decimal, addresses and bytes as lowercase `0x` hex.
    ///
    /// A field whose name is already taken (a parameter called `eventName`)
    /// is prefixed with `_` until unique.
    pub fn to_string_map(&self) -> IndexMap<String, String> {
        let mut out = IndexMap::with_capacity(self.fields.len() + 1);
        out.insert("eventName".to_string(), self.event_name.clone());
        for (name, value) in &self.fields {
            let mut key = name.clone();
            while out.contains_key(&key) {
                key.insert(0, '_');
            }
            out.insert(key, value.to_string());
        }
        out
    }
}
