//! Legacy amino binary codec (columbus-3 and columbus-4).
//!
//! Amino structs are field-compatible with protobuf, so message bodies are
//! decoded with the same `prost` structs as the modern format. What differs
//! is the framing:
//!
//! - a transaction is a uvarint length followed by an interface value;
//! - an interface value is a 4-byte type prefix followed by the struct.
//!
//! The prefix of a registered name is derived from `SHA-256(name)`: skip
//! leading zero bytes, skip 3 disambiguation bytes, skip zero bytes again,
//! then take 4 bytes.

use std::collections::HashMap;
use std::sync::OnceLock;

use prost::Message;
use sha2::{Digest, Sha256};
use terraindex_core::Encoding;

use super::{Coin, Envelope, RawMessage};
use crate::error::WireError;

/// Names the standard transaction is registered under.
pub const STD_TX_NAMES: &[&str] = &["core/StdTx", "cosmos-sdk/StdTx"];

/// Every concrete type the decoder may meet inside a legacy transaction:
/// messages, proposal contents, authorizations and evidence.
pub const REGISTERED_NAMES: &[&str] = &[
    "core/StdTx",
    "cosmos-sdk/StdTx",
    // bank
    "bank/MsgSend",
    "bank/MsgMultiSend",
    // crisis
    "crisis/MsgVerifyInvariant",
    // distribution
    "distribution/MsgWithdrawValidatorCommission",
    "distribution/MsgModifyWithdrawAddress",
    "distribution/MsgWithdrawDelegationReward",
    "distribution/MsgFundCommunityPool",
    "distribution/CommunityPoolSpendProposal",
    // evidence
    "cosmos-sdk/MsgSubmitEvidence",
    "evidence/MsgSubmitEvidence",
    "cosmos-sdk/Equivocation",
    "evidence/Equivocation",
    // gov
    "gov/MsgDeposit",
    "gov/MsgVote",
    "gov/MsgSubmitProposal",
    "gov/TextProposal",
    "params/ParameterChangeProposal",
    "upgrade/SoftwareUpgradeProposal",
    "upgrade/CancelSoftwareUpgradeProposal",
    "treasury/TaxRateUpdateProposal",
    "treasury/RewardWeightUpdateProposal",
    // market
    "market/MsgSwap",
    "market/MsgSwapSend",
    // msgauth
    "msgauth/MsgGrantAuthorization",
    "msgauth/MsgRevokeAuthorization",
    "msgauth/MsgExecAuthorized",
    "msgauth/SendAuthorization",
    "msgauth/GenericAuthorization",
    // oracle
    "oracle/MsgExchangeRateVote",
    "oracle/MsgExchangeRatePrevote",
    "oracle/MsgDelegateFeedConsent",
    "oracle/MsgAggregateExchangeRatePrevote",
    "oracle/MsgAggregateExchangeRateVote",
    // slashing
    "slashing/MsgUnjail",
    // staking
    "staking/MsgCreateValidator",
    "staking/MsgEditValidator",
    "staking/MsgDelegate",
    "staking/MsgUndelegate",
    "staking/MsgBeginRedelegate",
    // wasm
    "wasm/MsgStoreCode",
    "wasm/MsgInstantiateContract",
    "wasm/MsgExecuteContract",
    "wasm/MsgMigrateContract",
    "wasm/MsgUpdateContractOwner",
];

/// 4-byte amino type prefix of a registered name.
pub fn type_prefix(name: &str) -> [u8; 4] {
    let hash = Sha256::digest(name.as_bytes());
    let mut rest = hash
        .iter()
        .copied()
        .skip_while(|b| *b == 0)
        .skip(3)
        .skip_while(|b| *b == 0);
    let mut prefix = [0u8; 4];
    for slot in prefix.iter_mut() {
        *slot = rest.next().unwrap_or(0);
    }
    prefix
}

fn prefix_table() -> &'static HashMap<[u8; 4], &'static str> {
    static TABLE: OnceLock<HashMap<[u8; 4], &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| {
        REGISTERED_NAMES
            .iter()
            .map(|name| (type_prefix(name), *name))
            .collect()
    })
}

/// Registered name for a prefix, if any.
pub fn name_for_prefix(prefix: [u8; 4]) -> Option<&'static str> {
    prefix_table().get(&prefix).copied()
}

/// Split an interface value into its type and struct bytes. Unregistered
/// prefixes keep their hex form as the type tag.
pub fn unpack_interface(bytes: &[u8]) -> Result<RawMessage, WireError> {
    if bytes.len() < 4 {
        return Err(WireError::MissingPrefix);
    }
    let mut prefix = [0u8; 4];
    prefix.copy_from_slice(&bytes[..4]);
    let type_tag = match name_for_prefix(prefix) {
        Some(name) => name.to_string(),
        None => format!("amino:{}", hex::encode(prefix)),
    };
    Ok(RawMessage {
        type_tag,
        payload: bytes[4..].to_vec(),
    })
}

/// Strip the uvarint length prefix.
pub fn strip_length_prefix(bytes: &[u8]) -> Result<&[u8], WireError> {
    let mut cursor = bytes;
    let declared = prost::encoding::decode_varint(&mut cursor)
        .map_err(|e| WireError::decode(Encoding::Amino, e))?;
    if declared > cursor.len() as u64 {
        return Err(WireError::Length {
            declared,
            available: cursor.len(),
        });
    }
    Ok(&cursor[..declared as usize])
}

#[derive(Clone, PartialEq, Message)]
pub struct StdFee {
    #[prost(message, repeated, tag = "1")]
    pub amount: Vec<Coin>,
    #[prost(uint64, tag = "2")]
    pub gas: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct StdTx {
    /// Interface values (prefix + struct).
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub msgs: Vec<Vec<u8>>,
    #[prost(message, optional, tag = "2")]
    pub fee: Option<StdFee>,
    #[prost(string, tag = "4")]
    pub memo: String,
}

/// Decode a length-prefixed `StdTx`.
pub fn decode_tx(bytes: &[u8]) -> Result<Envelope, WireError> {
    let framed = strip_length_prefix(bytes)?;
    let value = unpack_interface(framed)?;
    if !STD_TX_NAMES.contains(&value.type_tag.as_str()) {
        return Err(WireError::UnexpectedType(value.type_tag));
    }
    let tx = StdTx::decode(value.payload.as_slice())
        .map_err(|e| WireError::decode(Encoding::Amino, e))?;

    let messages = tx
        .msgs
        .iter()
        .map(|m| unpack_interface(m))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Envelope {
        messages,
        memo: tx.memo,
        fee: tx.fee.map(|f| f.amount).unwrap_or_default(),
        encoding: Encoding::Amino,
    })
}

/// Prefix + struct bytes for a registered name.
#[cfg(test)]
pub(crate) fn pack_interface(name: &str, body: &[u8]) -> Vec<u8> {
    let mut out = type_prefix(name).to_vec();
    out.extend_from_slice(body);
    out
}

#[cfg(test)]
pub(crate) fn encode_tx(msgs: Vec<Vec<u8>>, memo: &str, fee: Vec<Coin>) -> Vec<u8> {
    let tx = StdTx {
        msgs,
        fee: Some(StdFee {
            amount: fee,
            gas: 200_000,
        }),
        memo: memo.to_string(),
    };
    let body = pack_interface("core/StdTx", &tx.encode_to_vec());
    let mut out = Vec::with_capacity(body.len() + 2);
    prost::encoding::encode_varint(body.len() as u64, &mut out);
    out.extend_from_slice(&body);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_prefixes() {
        assert_eq!(type_prefix("tendermint/PubKeyEd25519"), [0x16, 0x24, 0xde, 0x64]);
        assert_eq!(type_prefix("tendermint/PubKeySecp256k1"), [0xeb, 0x5a, 0xe9, 0x87]);
    }

    #[test]
    fn registered_prefixes_are_distinct() {
        assert_eq!(prefix_table().len(), REGISTERED_NAMES.len());
    }

    #[test]
    fn unknown_prefix_keeps_hex_tag() {
        let value = unpack_interface(&[0xde, 0xad, 0xbe, 0xef, 0x01]).unwrap();
        assert_eq!(value.type_tag, "amino:deadbeef");
        assert_eq!(value.payload, vec![0x01]);
    }

    #[test]
    fn short_interface_is_rejected() {
        assert!(matches!(unpack_interface(&[1, 2]), Err(WireError::MissingPrefix)));
    }

    #[test]
    fn decodes_std_tx() {
        let msg = pack_interface("bank/MsgSend", &[0x0a, 0x01, 0x07]);
        let bytes = encode_tx(vec![msg], "memo", vec![Coin::new("ukrw", "2896")]);
        let env = decode_tx(&bytes).unwrap();
        assert_eq!(env.encoding, Encoding::Amino);
        assert_eq!(env.memo, "memo");
        assert_eq!(env.messages[0].type_tag, "bank/MsgSend");
        assert_eq!(env.messages[0].payload, vec![0x0a, 0x01, 0x07]);
        assert_eq!(env.fee[0].denom, "ukrw");
    }

    #[test]
    fn truncated_length_prefix() {
        assert!(matches!(
            strip_length_prefix(&[0x10, 0x01]),
            Err(WireError::Length { declared: 16, available: 1 })
        ));
    }

    #[test]
    fn wrong_envelope_type() {
        let body = pack_interface("bank/MsgSend", &[]);
        let mut bytes = vec![body.len() as u8];
        bytes.extend_from_slice(&body);
        assert!(matches!(decode_tx(&bytes), Err(WireError::UnexpectedType(t)) if t == "bank/MsgSend"));
    }
}
