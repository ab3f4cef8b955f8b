//! Contract coder configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a `ContractCoder` bound to one deployed contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoderConfig {
    /// Deployed contract address, `0x`-prefixed hex
    pub contract_address: String,
    /// Upper bound on a single view call, in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout_ms() -> u64 { 30_000 }

impl CoderConfig {
    pub fn new(contract_address: impl Into<String>) -> Self {
        Self {
            contract_address: contract_address.into(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }

    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.request_timeout_ms = ms;
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_defaults_to_thirty_seconds() {
        let cfg = CoderConfig::from_json(r#"{"contract_address": "0x01"}"#).unwrap();
        assert_eq!(cfg.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn explicit_timeout() {
        let cfg = CoderConfig::from_json(
            r#"{"contract_address": "0x01", "request_timeout_ms": 250}"#,
        )
        .unwrap();
        assert_eq!(cfg.request_timeout_ms, 250);
        assert_eq!(CoderConfig::new("0x01").with_timeout_ms(250), cfg);
    }
}
