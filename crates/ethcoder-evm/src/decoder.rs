//! `EvmLogDecoder`: the `LogDecoder` implementation backed by a `ContractAbi`.

use ethcoder_core::{
    AbiType, AbiValue, ContractAbi, DecodeError, DecodedEvent, EventDescriptor, LogDecoder,
    LogEntry, TopicId,
};
use std::sync::Arc;

use crate::codec::{decode, decode_hex, decode_word};

/// Decodes logs emitted by a single contract ABI.
/// Thread-safe and cheap to clone (shares the ABI).
#[derive(Debug, Clone)]
pub struct EvmLogDecoder {
    abi: Arc<ContractAbi>,
}

impl EvmLogDecoder {
    pub fn new(abi: Arc<ContractAbi>) -> Self {
        Self { abi }
    }

    pub fn abi(&self) -> &ContractAbi {
        &self.abi
    }

    /// Decode `log` against a known event, bypassing topic lookup.
    ///
    /// For anonymous events, indexed parameters start at topics[0].
    pub fn decode_as(
        &self,
        event: &EventDescriptor,
        log: &LogEntry,
    ) -> Result<DecodedEvent, DecodeError> {
        let first_indexed_topic = if event.is_anonymous() { 0 } else { 1 };
        let mut slots: Vec<Option<AbiValue>> = vec![None; event.inputs().len()];

        for (k, (pos, param)) in event.indexed_inputs().enumerate() {
            let index = first_indexed_topic + k;
            let topic = log.topics.get(index).ok_or_else(|| DecodeError::MissingTopic {
                param: param.key(pos),
                index,
            })?;
            slots[pos] = Some(decode_word(&param.ty, &decode_hex(topic)?)?);
        }

        let (positions, types): (Vec<usize>, Vec<AbiType>) = event
            .data_inputs()
            .map(|(pos, param)| (pos, param.ty.clone()))
            .unzip();
        if !types.is_empty() {
            let data = decode_hex(log.data.as_deref().unwrap_or_default())?;
            for (pos, value) in positions.into_iter().zip(decode(&types, &data)?) {
                slots[pos] = Some(value);
            }
        }

        let mut decoded = DecodedEvent::for_log(event.name(), log);
        for (pos, (param, value)) in event.inputs().iter().zip(slots).enumerate() {
            if let Some(value) = value {
                decoded.fields.insert(param.key(pos), value);
            }
        }
        Ok(decoded)
    }
}

impl LogDecoder for EvmLogDecoder {
    fn decode_log(&self, log: &LogEntry) -> Result<Option<DecodedEvent>, DecodeError> {
        let Some(first) = log.topics.first() else {
            return Ok(None);
        };
        if log.data.is_none() {
            return Ok(None);
        }
        let topic = match TopicId::from_hex(first) {
            Ok(topic) => topic,
            Err(err) => {
                tracing::debug!(topic = %first, error = %err, "unparseable topic0");
                return Ok(None);
            }
        };
        let Some(event) = self.abi.event_by_topic(&topic) else {
            tracing::debug!(topic = %topic, "no event matches topic");
            return Ok(None);
        };
        self.decode_as(event, log).map(Some)
    }
}
