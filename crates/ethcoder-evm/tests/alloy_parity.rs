//! Differential tests: our codec must produce byte-identical encodings to
//! `alloy-dyn-abi`, and each side must decode the other's output.

use alloy_dyn_abi::{DynSolType, DynSolValue};
use ethcoder_core::{AbiType, AbiValue, Address, B256, I256, U256};
use ethcoder_evm::codec;

fn to_alloy(value: &AbiValue) -> DynSolValue {
    match value {
        AbiValue::Address(a) => DynSolValue::Address(*a),
        AbiValue::Bool(b) => DynSolValue::Bool(*b),
        AbiValue::Uint(v, bits) => DynSolValue::Uint(*v, *bits),
        AbiValue::Int(v, bits) => DynSolValue::Int(*v, *bits),
        AbiValue::FixedBytes(b, n) => DynSolValue::FixedBytes(*b, *n),
        AbiValue::Bytes(b) => DynSolValue::Bytes(b.clone()),
        AbiValue::String(s) => DynSolValue::String(s.clone()),
        AbiValue::FixedArray(items) => DynSolValue::FixedArray(items.iter().map(to_alloy).collect()),
        AbiValue::Array(items) => DynSolValue::Array(items.iter().map(to_alloy).collect()),
        AbiValue::Tuple(items) => DynSolValue::Tuple(items.iter().map(to_alloy).collect()),
    }
}

fn uint(n: u64) -> AbiValue {
    AbiValue::uint256(U256::from(n))
}

fn bytes_n(prefix: &[u8], n: usize) -> AbiValue {
    let mut w = [0u8; 32];
    w[..prefix.len()].copy_from_slice(prefix);
    AbiValue::FixedBytes(B256::from(w), n)
}

/// (type list, values) pairs covering static, dynamic, and nested layouts.
fn cases() -> Vec<(&'static str, Vec<AbiValue>)> {
    let alice: Address = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045".parse().unwrap();
    vec![
        ("(address,uint256)", vec![AbiValue::Address(alice), AbiValue::uint256(U256::MAX)]),
        (
            "(int8,int256,bool)",
            vec![
                AbiValue::Int(I256::from_dec_str("-128").unwrap(), 8),
                AbiValue::int256(I256::MIN),
                AbiValue::Bool(false),
            ],
        ),
        ("(bytes4,bytes)", vec![bytes_n(&[0xde, 0xad, 0xbe, 0xef], 4), AbiValue::Bytes(vec![7; 33])]),
        (
            "(string,uint256[],string)",
            vec![
                AbiValue::String("first".into()),
                AbiValue::Array(vec![uint(1), uint(2), uint(3)]),
                AbiValue::String(String::new()),
            ],
        ),
        (
            "((uint256,string)[],address[2])",
            vec![
                AbiValue::Array(vec![
                    AbiValue::Tuple(vec![uint(1), AbiValue::String("a".into())]),
                    AbiValue::Tuple(vec![uint(2), AbiValue::String("bb".into())]),
                ]),
                AbiValue::FixedArray(vec![AbiValue::Address(Address::ZERO), AbiValue::Address(alice)]),
            ],
        ),
        (
            "(bytes[][2],(bool,bytes32))",
            vec![
                AbiValue::FixedArray(vec![
                    AbiValue::Array(vec![AbiValue::Bytes(vec![1]), AbiValue::Bytes(vec![])]),
                    AbiValue::Array(vec![]),
                ]),
                AbiValue::Tuple(vec![AbiValue::Bool(true), bytes_n(&[0xaa; 32], 32)]),
            ],
        ),
    ]
}

fn member_types(tuple: &str) -> Vec<AbiType> {
    match tuple.parse::<AbiType>().unwrap() {
        AbiType::Tuple(members) => members,
        other => panic!("{other} is not a tuple"),
    }
}

#[test]
fn encodings_match_alloy() {
    for (ty, values) in cases() {
        let ours = codec::encode(&member_types(ty), &values).unwrap();
        let theirs = DynSolValue::Tuple(values.iter().map(to_alloy).collect()).abi_encode_params();
        assert_eq!(hex::encode(&ours), hex::encode(&theirs), "encoding mismatch for {ty}");
    }
}

#[test]
fn alloy_encodings_decode_back() {
    for (ty, values) in cases() {
        let theirs = DynSolValue::Tuple(values.iter().map(to_alloy).collect()).abi_encode_params();
        let decoded = codec::decode(&member_types(ty), &theirs).unwrap();
        assert_eq!(decoded, values, "decode mismatch for {ty}");
    }
}

#[test]
fn our_encodings_decode_in_alloy() {
    for (ty, values) in cases() {
        let ours = codec::encode(&member_types(ty), &values).unwrap();
        let alloy_ty = DynSolType::parse(ty).unwrap();
        let decoded = alloy_ty.abi_decode_params(&ours).unwrap();
        assert_eq!(
            decoded,
            DynSolValue::Tuple(values.iter().map(to_alloy).collect()),
            "alloy could not read our encoding of {ty}"
        );
    }
}
