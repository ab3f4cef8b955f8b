//! The `BlockchainClient` trait: the boundary to whatever node transport
//! executes read-only contract calls.

use async_trait::async_trait;

use crate::error::ClientError;

/// A read-only contract call: target contract and full calldata
/// (selector included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub to: String,
    pub calldata: Vec<u8>,
}

/// Executes `eth_call`-style requests against a node.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
///
/// # Object Safety
/// The trait is object-safe and can be stored as `Arc<dyn BlockchainClient>`.
#[async_trait]
pub trait BlockchainClient: Send + Sync {
    /// Execute a call against `to` and return the raw ABI-encoded return data.
    async fn call(&self, to: &str, calldata: &[u8]) -> Result<Vec<u8>, ClientError>;

    /// Execute several calls.
    ///
    /// Default implementation sends them sequentially; override for true batching.
    async fn call_batch(&self, reqs: &[CallRequest]) -> Result<Vec<Vec<u8>>, ClientError> {
        let mut out = Vec::with_capacity(reqs.len());
        for req in reqs {
            out.push(self.call(&req.to, &req.calldata).await?);
        }
        Ok(out)
    }

    /// The client's identifier (URL or name), used in logs.
    fn url(&self) -> &str {
        "unknown"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Echo {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BlockchainClient for Echo {
        async fn call(&self, to: &str, calldata: &[u8]) -> Result<Vec<u8>, ClientError> {
            if to.is_empty() {
                return Err(ClientError::Transport("no target".into()));
            }
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(to.to_string());
            }
            Ok(calldata.to_vec())
        }
    }

    #[tokio::test]
    async fn batch_defaults_to_sequential_calls() {
        let client = Echo { seen: Mutex::new(Vec::new()) };
        let reqs = vec![
            CallRequest { to: "0xa".into(), calldata: vec![1] },
            CallRequest { to: "0xb".into(), calldata: vec![2, 3] },
        ];
        let out = client.call_batch(&reqs).await.unwrap();
        assert_eq!(out, vec![vec![1], vec![2, 3]]);
        assert_eq!(*client.seen.lock().unwrap(), vec!["0xa", "0xb"]);
        assert_eq!(client.url(), "unknown");
    }

    #[tokio::test]
    async fn batch_stops_at_first_failure() {
        let client = Echo { seen: Mutex::new(Vec::new()) };
        let reqs = vec![
            CallRequest { to: String::new(), calldata: vec![] },
            CallRequest { to: "0xb".into(), calldata: vec![] },
        ];
        assert!(matches!(
            client.call_batch(&reqs).await,
            Err(ClientError::Transport(_))
        ));
        assert!(client.seen.lock().unwrap().is_empty());
    }
}
