//! Calldata and return-data decoder, the inverse of `MethodEncoder`.
//!
//! # How it works
//! - First 4 bytes of calldata = keccak256(function_signature)[:4] (the selector)
//! - Remaining bytes = ABI-encoded inputs tuple
//! - Return data of a view call = ABI-encoded outputs tuple, no selector

use ethcoder_core::{
    AbiValue, CoderError, ContractAbi, DecodeError, DecodedCall, FunctionDescriptor, Parameter,
    Selector,
};
use std::sync::Arc;

use crate::codec;

/// Decodes function calldata and return data for one contract ABI.
#[derive(Debug, Clone)]
pub struct CallDecoder {
    abi: Arc<ContractAbi>,
}

fn named(params: &[Parameter], values: Vec<AbiValue>) -> Vec<(String, AbiValue)> {
    params
        .iter()
        .enumerate()
        .zip(values)
        .map(|((pos, p), v)| (p.key(pos), v))
        .collect()
}

impl CallDecoder {
    pub fn new(abi: Arc<ContractAbi>) -> Self {
        Self { abi }
    }

    /// Decode full calldata (selector included) into the matched function's
    /// named inputs.
    pub fn decode_call(&self, calldata: &[u8]) -> Result<DecodedCall, DecodeError> {
        if calldata.len() < 4 {
            return Err(DecodeError::CalldataTooShort {
                len: calldata.len(),
            });
        }
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&calldata[..4]);
        let selector = Selector(raw);

        let func = self
            .abi
            .function_by_selector(&selector)
            .ok_or_else(|| DecodeError::UnknownSelector {
                selector: selector.to_string(),
            })?;

        let values = codec::decode(&func.input_types(), &calldata[4..])?;
        Ok(DecodedCall {
            function_name: func.name().to_string(),
            signature: func.signature().to_string(),
            selector,
            inputs: named(func.inputs(), values),
        })
    }

    /// Decode hex calldata (`0x` prefix optional).
    pub fn decode_call_hex(&self, calldata: &str) -> Result<DecodedCall, DecodeError> {
        self.decode_call(&codec::decode_hex(calldata)?)
    }

    /// Decode the return data of `method` against its declared outputs.
    ///
    /// `method` is a bare name or a full signature.
    pub fn decode_output(
        &self,
        method: &str,
        data: &[u8],
    ) -> Result<Vec<(String, AbiValue)>, CoderError> {
        let func = self.lookup(method)?;
        decode_outputs(func, data)
    }

    fn lookup(&self, method: &str) -> Result<&FunctionDescriptor, CoderError> {
        let found = if method.contains('(') {
            self.abi.function_by_signature(method)?
        } else {
            self.abi.function(method)
        };
        found.ok_or_else(|| CoderError::UnknownMethod {
            method: method.to_string(),
        })
    }
}

/// Decode return data against `func`'s declared outputs.
pub fn decode_outputs(
    func: &FunctionDescriptor,
    data: &[u8],
) -> Result<Vec<(String, AbiValue)>, CoderError> {
    if !func.outputs().is_empty() && data.is_empty() {
        return Err(DecodeError::MissingOutput {
            method: func.name().to_string(),
        }
        .into());
    }
    let values = codec::decode(&func.output_types(), data)?;
    Ok(named(func.outputs(), values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::MethodEncoder;
    use alloy_primitives::U256;

    const ABI: &str = r#"[
        {"type": "function", "name": "transfer", "stateMutability": "nonpayable",
         "inputs": [{"name": "to", "type": "address"}, {"name": "value", "type": "uint256"}],
         "outputs": [{"name": "", "type": "bool"}]},
        {"type": "function", "name": "getReserves", "stateMutability": "view",
         "inputs": [],
         "outputs": [{"name": "reserve0", "type": "uint112"},
                     {"name": "reserve1", "type": "uint112"},
                     {"name": "blockTimestampLast", "type": "uint32"}]}
    ]"#;

    fn decoder() -> CallDecoder {
        CallDecoder::new(Arc::new(ContractAbi::from_json(ABI).unwrap()))
    }

    #[test]
    fn decodes_transfer_calldata() {
        let calldata = "0xa9059cbb\
            000000000000000000000000ab5801a7d398351b8be11c439e05c5b3259aec9b\
            00000000000000000000000000000000000000000000000000000000000f4240";
        let call = decoder().decode_call_hex(calldata).unwrap();
        assert_eq!(call.function_name, "transfer");
        assert_eq!(call.selector.to_string(), "0xa9059cbb");
        assert_eq!(
            call.input("to").and_then(AbiValue::as_address),
            Some("0xab5801a7d398351b8be11c439e05c5b3259aec9b".parse().unwrap())
        );
        assert_eq!(call.input("value").and_then(AbiValue::as_uint), Some(U256::from(1_000_000u64)));
    }

    #[test]
    fn inverse_of_encoder() {
        let abi = Arc::new(ContractAbi::from_json(ABI).unwrap());
        let encoder = MethodEncoder::new(abi.clone());
        let args = vec![
            AbiValue::Address("0x0000000000000000000000000000000000000001".parse().unwrap()),
            AbiValue::uint256(U256::MAX),
        ];
        let bytes = encoder.encode_method_bytes("transfer", &args).unwrap();
        let call = CallDecoder::new(abi).decode_call(&bytes).unwrap();
        let values: Vec<_> = call.inputs.into_iter().map(|(_, v)| v).collect();
        assert_eq!(values, args);
    }

    #[test]
    fn short_or_unknown_calldata() {
        assert_eq!(
            decoder().decode_call(&[0xa9, 0x05]),
            Err(DecodeError::CalldataTooShort { len: 2 })
        );
        assert!(matches!(
            decoder().decode_call(&[0xde, 0xad, 0xbe, 0xef]),
            Err(DecodeError::UnknownSelector { ref selector }) if selector == "0xdeadbeef"
        ));
    }

    #[test]
    fn decodes_view_outputs() {
        let mut data = vec![0u8; 96];
        data[31] = 5;
        data[63] = 9;
        data[95] = 1;
        let out = decoder().decode_output("getReserves", &data).unwrap();
        let names: Vec<_> = out.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["reserve0", "reserve1", "blockTimestampLast"]);
        assert_eq!(out[1].1, AbiValue::Uint(U256::from(9u64), 112));

        let out = decoder().decode_output("transfer(address,uint256)", &{
            let mut w = vec![0u8; 32];
            w[31] = 1;
            w
        });
        let out = out.unwrap();
        assert_eq!(out[0].0, "0");
        assert_eq!(out[0].1.as_bool(), Some(true));
    }

    #[test]
    fn empty_return_data_is_missing_output() {
        assert!(matches!(
            decoder().decode_output("getReserves", &[]),
            Err(CoderError::Decode(DecodeError::MissingOutput { .. }))
        ));
        assert!(matches!(
            decoder().decode_output("nope", &[]),
            Err(CoderError::UnknownMethod { .. })
        ));
    }
}
