//! `ContractCoder` binds one deployed contract to its ABI, the client used to
//! reach it, and its configuration.
//!
//! The codec operations are synchronous and never touch the network; only
//! `call_view` and the ERC-20 helpers built on it go through the client.

use alloy_primitives::{Address, U256};
use ethcoder_core::{
    address_to_hex, AbiType, AbiValue, BlockchainClient, ClientError, CoderError, ContractAbi,
    DecodeError, DecodedEvent, LogDecoder, LogEntry,
};
use std::sync::Arc;

use crate::call_decoder::decode_outputs;
use crate::codec;
use crate::config::CoderConfig;
use crate::decoder::EvmLogDecoder;
use crate::encoder::{encode_call, MethodEncoder};

/// Facade over the encoder, decoders, and client for a single contract.
pub struct ContractCoder {
    address: Address,
    config: CoderConfig,
    client: Arc<dyn BlockchainClient>,
    encoder: MethodEncoder,
    log_decoder: EvmLogDecoder,
}

impl std::fmt::Debug for ContractCoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractCoder")
            .field("address", &self.address)
            .field("client", &self.client.url())
            .field("config", &self.config)
            .finish()
    }
}

impl ContractCoder {
    /// Bind an ABI and client to the contract named in `config`.
    pub fn new(
        abi: Arc<ContractAbi>,
        client: Arc<dyn BlockchainClient>,
        config: CoderConfig,
    ) -> Result<Self, CoderError> {
        let address: Address = config.contract_address.trim().parse().map_err(|e| {
            CoderError::InvalidAbi(format!(
                "invalid contract address '{}': {e}",
                config.contract_address
            ))
        })?;
        Ok(Self {
            address,
            config,
            client,
            encoder: MethodEncoder::new(abi.clone()),
            log_decoder: EvmLogDecoder::new(abi),
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &ContractAbi {
        self.encoder.abi()
    }

    pub fn config(&self) -> &CoderConfig {
        &self.config
    }

    /// `0x`-prefixed calldata for `method(args...)`.
    pub fn encode_method(&self, method: &str, args: &[AbiValue]) -> Result<String, CoderError> {
        self.encoder.encode_method(method, args)
    }

    /// Decode one log; `Ok(None)` when it does not belong to this ABI.
    pub fn decode_log(&self, log: &LogEntry) -> Result<Option<DecodedEvent>, DecodeError> {
        self.log_decoder.decode_log(log)
    }

    /// Decode every log that belongs to this ABI, in input order.
    pub fn decode_logs(&self, logs: &[LogEntry]) -> Vec<DecodedEvent> {
        self.log_decoder.decode_logs(logs)
    }

    /// Execute a read-only call and decode its declared outputs.
    ///
    /// Client failures and timeouts surface as `CoderError::Communication`.
    pub async fn call_view(
        &self,
        method: &str,
        args: &[AbiValue],
    ) -> Result<Vec<(String, AbiValue)>, CoderError> {
        let func = self.encoder.resolve(method, args.len())?;
        let calldata = encode_call(func, args)?;
        let data = self.send(method, &calldata).await?;
        decode_outputs(func, &data)
    }

    /// ERC-20 `balanceOf(holder)`.
    pub async fn balance_of(&self, holder: Address) -> Result<U256, CoderError> {
        self.call_uint("balanceOf", &[AbiValue::Address(holder)]).await
    }

    /// ERC-20 `allowance(owner, spender)`.
    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, CoderError> {
        self.call_uint(
            "allowance",
            &[AbiValue::Address(owner), AbiValue::Address(spender)],
        )
        .await
    }

    /// Call a method returning a single `uint256`. ABIs that omit the
    /// outputs are decoded as `uint256` anyway.
    async fn call_uint(&self, method: &str, args: &[AbiValue]) -> Result<U256, CoderError> {
        let func = self.encoder.resolve(method, args.len())?;
        let calldata = encode_call(func, args)?;
        let data = self.send(method, &calldata).await?;

        let value = match func.outputs().first() {
            Some(_) => decode_outputs(func, &data)?.into_iter().next().map(|(_, v)| v),
            None if data.is_empty() => None,
            None => Some(codec::decode_single(&AbiType::Uint(256), &data)?),
        };
        value.as_ref().and_then(AbiValue::as_uint).ok_or_else(|| {
            DecodeError::MissingOutput {
                method: method.to_string(),
            }
            .into()
        })
    }

    async fn send(&self, method: &str, calldata: &[u8]) -> Result<Vec<u8>, CoderError> {
        let to = address_to_hex(&self.address);
        let timeout = self.config.request_timeout();
        let result = match tokio::time::timeout(timeout, self.client.call(&to, calldata)).await {
            Ok(inner) => inner,
            Err(_) => Err(ClientError::Timeout {
                ms: self.config.request_timeout_ms,
            }),
        };
        result.map_err(|err| {
            tracing::error!(
                url = %self.client.url(),
                contract = %to,
                method,
                error = %err,
                "view call failed"
            );
            CoderError::Communication(err)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    const TOKEN: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";

    const ERC20: &str = r#"{
        "functions": [
            {"name": "balanceOf", "inputs": [{"name": "owner", "type": "address"}],
             "outputs": [{"name": "", "type": "uint256"}]},
            {"name": "allowance", "inputs": [{"name": "owner", "type": "address"},
                                             {"name": "spender", "type": "address"}]},
            {"name": "name", "inputs": [], "outputs": [{"name": "", "type": "string"}]}
        ],
        "events": []
    }"#;

    enum Reply {
        Data(Vec<u8>),
        Fail(ClientError),
        Hang,
    }

    /// Answers every call with a fixed reply and records requests.
    struct MockClient {
        reply: Reply,
        requests: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl MockClient {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl BlockchainClient for MockClient {
        async fn call(&self, to: &str, calldata: &[u8]) -> Result<Vec<u8>, ClientError> {
            self.requests.lock().unwrap().push((to.to_string(), calldata.to_vec()));
            match &self.reply {
                Reply::Data(d) => Ok(d.clone()),
                Reply::Fail(e) => Err(e.clone()),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Vec::new())
                }
            }
        }

        fn url(&self) -> &str {
            "mock://node"
        }
    }

    fn uint_word(n: u64) -> Vec<u8> {
        U256::from(n).to_be_bytes::<32>().to_vec()
    }

    fn coder(client: Arc<MockClient>, timeout_ms: u64) -> ContractCoder {
        let abi = Arc::new(ContractAbi::from_json(ERC20).unwrap());
        ContractCoder::new(abi, client, CoderConfig::new(TOKEN).with_timeout_ms(timeout_ms)).unwrap()
    }

    fn holder() -> Address {
        "0xd8da6bf26964af9d7eed9e03e53415d37aa96045".parse().unwrap()
    }

    #[tokio::test]
    async fn balance_of_decodes_output() {
        let client = MockClient::new(Reply::Data(uint_word(1_500)));
        let coder = coder(client.clone(), 1_000);
        assert_eq!(coder.balance_of(holder()).await.unwrap(), U256::from(1_500u64));

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].0, TOKEN);
        assert_eq!(hex::encode(&requests[0].1[..4]), "70a08231");
        assert_eq!(requests[0].1.len(), 36);
    }

    #[tokio::test]
    async fn allowance_without_declared_outputs() {
        let client = MockClient::new(Reply::Data(uint_word(7)));
        let coder = coder(client.clone(), 1_000);
        let spender: Address = "0x0000000000000000000000000000000000000002".parse().unwrap();
        assert_eq!(coder.allowance(holder(), spender).await.unwrap(), U256::from(7u64));
        assert_eq!(hex::encode(&client.requests.lock().unwrap()[0].1[..4]), "dd62ed3e");
    }

    #[tokio::test]
    async fn client_error_is_communication() {
        let client = MockClient::new(Reply::Fail(ClientError::Rpc {
            code: 3,
            message: "execution reverted".into(),
        }));
        let err = coder(client, 1_000).balance_of(holder()).await.unwrap_err();
        assert!(err.is_communication());
        assert!(err.to_string().contains("execution reverted"));
    }

    #[tokio::test]
    async fn slow_client_times_out() {
        let client = MockClient::new(Reply::Hang);
        let err = coder(client, 20).balance_of(holder()).await.unwrap_err();
        assert!(matches!(
            err,
            CoderError::Communication(ClientError::Timeout { ms: 20 })
        ));
    }

    #[tokio::test]
    async fn empty_return_data_is_not_zero() {
        let client = MockClient::new(Reply::Data(Vec::new()));
        let err = coder(client, 1_000).balance_of(holder()).await.unwrap_err();
        assert!(matches!(err, CoderError::Decode(DecodeError::MissingOutput { .. })));
    }

    #[tokio::test]
    async fn call_view_decodes_named_outputs() {
        let mut data = uint_word(0x20);
        data.extend(uint_word(4));
        let mut body = b"USDC".to_vec();
        body.resize(32, 0);
        data.extend(body);
        let client = MockClient::new(Reply::Data(data));
        let out = coder(client, 1_000).call_view("name", &[]).await.unwrap();
        assert_eq!(out, vec![("0".to_string(), AbiValue::String("USDC".into()))]);
    }

    #[tokio::test]
    async fn arity_is_checked_before_any_call() {
        let client = MockClient::new(Reply::Data(uint_word(1)));
        let err = coder(client.clone(), 1_000).call_view("balanceOf", &[]).await.unwrap_err();
        assert!(matches!(err, CoderError::Arity { expected: 1, got: 0, .. }));
        assert!(client.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn rejects_bad_contract_address() {
        let abi = Arc::new(ContractAbi::from_json(ERC20).unwrap());
        let client = MockClient::new(Reply::Data(Vec::new()));
        assert!(ContractCoder::new(abi, client, CoderConfig::new("not-an-address")).is_err());
    }
}
