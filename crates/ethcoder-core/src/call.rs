//! Types for decoded function calls.
//!
//! These are the output types when decoding transaction calldata
//! (as opposed to event logs, which produce `DecodedEvent`).

use serde::Serialize;

use crate::signature::Selector;
use crate::types::AbiValue;

/// Result of decoding a function call's calldata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedCall {
    /// Function name (e.g. "transfer")
    pub function_name: String,
    /// Canonical signature of the matched function
    pub signature: String,
    /// First 4 bytes of calldata
    pub selector: Selector,
    /// Decoded input parameters in declaration order
    pub inputs: Vec<(String, AbiValue)>,
}

impl DecodedCall {
    /// Look up a decoded input by name
    pub fn input(&self, name: &str) -> Option<&AbiValue> {
        self.inputs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}
