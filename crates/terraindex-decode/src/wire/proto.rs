//! Protobuf transaction envelope (columbus-5 and later).

use prost::Message;
use terraindex_core::Encoding;

use super::{Coin, Envelope, RawMessage};
use crate::error::WireError;

/// Self-describing value: a type URL plus the encoded message.
#[derive(Clone, PartialEq, Message)]
pub struct Any {
    #[prost(string, tag = "1")]
    pub type_url: String,
    #[prost(bytes = "vec", tag = "2")]
    pub value: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TxRaw {
    #[prost(bytes = "vec", tag = "1")]
    pub body_bytes: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub auth_info_bytes: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub signatures: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct TxBody {
    #[prost(message, repeated, tag = "1")]
    pub messages: Vec<Any>,
    #[prost(string, tag = "2")]
    pub memo: String,
    #[prost(uint64, tag = "3")]
    pub timeout_height: u64,
}

#[derive(Clone, PartialEq, Message)]
pub struct Fee {
    #[prost(message, repeated, tag = "1")]
    pub amount: Vec<Coin>,
    #[prost(uint64, tag = "2")]
    pub gas_limit: u64,
    #[prost(string, tag = "3")]
    pub payer: String,
    #[prost(string, tag = "4")]
    pub granter: String,
}

#[derive(Clone, PartialEq, Message)]
pub struct AuthInfo {
    #[prost(message, optional, tag = "2")]
    pub fee: Option<Fee>,
}

/// Decode `TxRaw` bytes. Every message must carry a type URL; an empty one
/// means the bytes were not protobuf to begin with.
pub fn decode_tx(bytes: &[u8]) -> Result<Envelope, WireError> {
    let raw = TxRaw::decode(bytes).map_err(|e| WireError::decode(Encoding::Proto, e))?;
    let body =
        TxBody::decode(raw.body_bytes.as_slice()).map_err(|e| WireError::decode(Encoding::Proto, e))?;
    let auth = AuthInfo::decode(raw.auth_info_bytes.as_slice())
        .map_err(|e| WireError::decode(Encoding::Proto, e))?;

    let mut messages = Vec::with_capacity(body.messages.len());
    for (index, any) in body.messages.into_iter().enumerate() {
        if any.type_url.is_empty() {
            return Err(WireError::EmptyTypeUrl { index });
        }
        messages.push(RawMessage {
            type_tag: any.type_url,
            payload: any.value,
        });
    }

    Ok(Envelope {
        messages,
        memo: body.memo,
        fee: auth.fee.map(|f| f.amount).unwrap_or_default(),
        encoding: Encoding::Proto,
    })
}

/// Unpack an `Any` carried in a length-delimited field.
pub fn unpack_any(bytes: &[u8]) -> Result<RawMessage, WireError> {
    let any = Any::decode(bytes).map_err(|e| WireError::decode(Encoding::Proto, e))?;
    Ok(RawMessage {
        type_tag: any.type_url,
        payload: any.value,
    })
}

#[cfg(test)]
pub(crate) fn encode_tx(messages: Vec<Any>, memo: &str, fee: Vec<Coin>) -> Vec<u8> {
    let body = TxBody {
        messages,
        memo: memo.to_string(),
        timeout_height: 0,
    };
    let auth = AuthInfo {
        fee: Some(Fee {
            amount: fee,
            gas_limit: 200_000,
            ..Default::default()
        }),
    };
    TxRaw {
        body_bytes: body.encode_to_vec(),
        auth_info_bytes: auth.encode_to_vec(),
        signatures: vec![vec![1, 2, 3]],
    }
    .encode_to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_messages_memo_and_fee() {
        let msg = Any {
            type_url: "/cosmos.bank.v1beta1.MsgSend".into(),
            value: vec![0x0a, 0x01, b'a'],
        };
        let bytes = encode_tx(vec![msg], "hello", vec![Coin::new("uluna", "150")]);
        let env = decode_tx(&bytes).unwrap();
        assert_eq!(env.encoding, Encoding::Proto);
        assert_eq!(env.memo, "hello");
        assert_eq!(env.messages.len(), 1);
        assert_eq!(env.messages[0].type_tag, "/cosmos.bank.v1beta1.MsgSend");
        assert_eq!(env.messages[0].payload, vec![0x0a, 0x01, b'a']);
        assert_eq!(env.fee[0].amount, "150");
    }

    #[test]
    fn rejects_message_without_type_url() {
        let bytes = encode_tx(vec![Any::default()], "", vec![]);
        assert!(matches!(decode_tx(&bytes), Err(WireError::EmptyTypeUrl { index: 0 })));
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_tx(&[0xff, 0xff, 0xff]).is_err());
    }
}
