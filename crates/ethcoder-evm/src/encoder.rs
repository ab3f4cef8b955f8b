//! Method call encoder: turns a method name and arguments into calldata.
//!
//! # Usage
//! ```ignore
//! let encoder = MethodEncoder::new(abi);
//! let calldata = encoder.encode_method("transfer", &[
//!     AbiValue::Address(to),
//!     AbiValue::uint256(U256::from(1_000_000u64)),
//! ])?;
//! assert!(calldata.starts_with("0xa9059cbb"));
//! ```

use ethcoder_core::{AbiType, AbiValue, CoderError, ContractAbi, EncodeError, FunctionDescriptor};
use serde_json::Value;
use std::sync::Arc;

use crate::{codec, normalizer};

/// ABI encoder for contract method calls.
#[derive(Debug, Clone)]
pub struct MethodEncoder {
    abi: Arc<ContractAbi>,
}

impl MethodEncoder {
    pub fn new(abi: Arc<ContractAbi>) -> Self {
        Self { abi }
    }

    pub fn abi(&self) -> &ContractAbi {
        &self.abi
    }

    /// Find the function to call with `argc` arguments.
    ///
    /// `method` is either a bare name or a full signature such as
    /// `transfer(address,uint256)`. With overloads, the first declaration
    /// whose arity matches wins.
    pub fn resolve(&self, method: &str, argc: usize) -> Result<&FunctionDescriptor, CoderError> {
        let unknown = || CoderError::UnknownMethod {
            method: method.to_string(),
        };

        let func = if method.contains('(') {
            self.abi.function_by_signature(method)?.ok_or_else(unknown)?
        } else {
            let mut candidates = self.abi.functions_named(method).peekable();
            let first = *candidates.peek().ok_or_else(unknown)?;
            candidates
                .find(|f| f.inputs().len() == argc)
                .unwrap_or(first)
        };

        if func.inputs().len() != argc {
            return Err(CoderError::Arity {
                method: method.to_string(),
                expected: func.inputs().len(),
                got: argc,
            });
        }
        Ok(func)
    }

    /// Encode a call as `selector ++ abi_encode(args)`.
    pub fn encode_method_bytes(&self, method: &str, args: &[AbiValue]) -> Result<Vec<u8>, CoderError> {
        let func = self.resolve(method, args.len())?;
        encode_call(func, args)
    }

    /// Encode a call and return `0x`-prefixed hex calldata.
    pub fn encode_method(&self, method: &str, args: &[AbiValue]) -> Result<String, CoderError> {
        let bytes = self.encode_method_bytes(method, args)?;
        Ok(format!("0x{}", hex::encode(bytes)))
    }

    /// Like `encode_method`, but coerces JSON arguments to the declared
    /// input types first.
    pub fn encode_method_json(&self, method: &str, args: &[Value]) -> Result<String, CoderError> {
        let func = self.resolve(method, args.len())?;
        let values = coerce_args(func, args, normalizer::from_json)?;
        Ok(format!("0x{}", hex::encode(encode_call(func, &values)?)))
    }

    /// Like `encode_method_json`, for command-line style arguments: scalars
    /// verbatim, arrays and tuples as JSON text.
    pub fn encode_method_strings<S: AsRef<str>>(
        &self,
        method: &str,
        args: &[S],
    ) -> Result<String, CoderError> {
        let func = self.resolve(method, args.len())?;
        let values = coerce_args(func, args, |ty, arg: &S| normalizer::parse(ty, arg.as_ref()))?;
        Ok(format!("0x{}", hex::encode(encode_call(func, &values)?)))
    }
}

fn coerce_args<A>(
    func: &FunctionDescriptor,
    args: &[A],
    coerce: impl Fn(&AbiType, &A) -> Result<AbiValue, EncodeError>,
) -> Result<Vec<AbiValue>, CoderError> {
    func.inputs()
        .iter()
        .enumerate()
        .zip(args)
        .map(|((pos, param), arg)| {
            coerce(&param.ty, arg).map_err(|source| CoderError::InvalidArgument {
                param: param.key(pos),
                source,
            })
        })
        .collect()
}

/// Encode `args` against `func`'s inputs and prepend its selector.
pub fn encode_call(func: &FunctionDescriptor, args: &[AbiValue]) -> Result<Vec<u8>, CoderError> {
    if func.inputs().len() != args.len() {
        return Err(CoderError::Arity {
            method: func.name().to_string(),
            expected: func.inputs().len(),
            got: args.len(),
        });
    }

    let body = codec::encode(&func.input_types(), args).map_err(|source| {
        // Re-encode one by one to name the offending parameter.
        func.inputs()
            .iter()
            .zip(args)
            .enumerate()
            .find_map(|(pos, (param, arg))| {
                codec::encode_single(&param.ty, arg)
                    .err()
                    .map(|source| CoderError::InvalidArgument {
                        param: param.key(pos),
                        source,
                    })
            })
            .unwrap_or_else(|| CoderError::InvalidArgument {
                param: func.name().to_string(),
                source,
            })
    })?;
    let mut out = Vec::with_capacity(4 + body.len());
    out.extend_from_slice(func.selector().as_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}
