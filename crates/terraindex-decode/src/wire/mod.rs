//! Binary transaction codecs.
//!
//! Both encodings reduce a transaction to the same [`Envelope`]: the list of
//! contained messages (type tag + struct bytes), the memo and the fee. Which
//! codec runs first is decided by the chain version; see
//! [`TxDecoder`](crate::TxDecoder).

pub mod amino;
pub mod msgs;
pub mod proto;

use prost::Message;
use terraindex_core::Encoding;

use crate::error::WireError;

/// On-chain coin. The amount is an integer string.
#[derive(Clone, PartialEq, Message)]
pub struct Coin {
    #[prost(string, tag = "1")]
    pub denom: String,
    #[prost(string, tag = "2")]
    pub amount: String,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

/// One contained message, still encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    /// Amino registered name or protobuf type URL.
    pub type_tag: String,
    pub payload: Vec<u8>,
}

/// Encoding-independent view of a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub messages: Vec<RawMessage>,
    pub memo: String,
    pub fee: Vec<Coin>,
    pub encoding: Encoding,
}

/// Decode transaction bytes with the given codec.
pub fn decode_envelope(bytes: &[u8], encoding: Encoding) -> Result<Envelope, WireError> {
    match encoding {
        Encoding::Amino => amino::decode_tx(bytes),
        Encoding::Proto => proto::decode_tx(bytes),
    }
}

/// Resolve a nested interface value (proposal content, authorization,
/// evidence, wrapped message) carried in a length-delimited field.
pub fn unpack(bytes: &[u8], encoding: Encoding) -> Result<RawMessage, WireError> {
    match encoding {
        Encoding::Amino => amino::unpack_interface(bytes),
        Encoding::Proto => proto::unpack_any(bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codecs_do_not_accept_each_other() {
        let amino_tx = amino::encode_tx(
            vec![amino::pack_interface("bank/MsgSend", &[])],
            "",
            vec![],
        );
        assert!(decode_envelope(&amino_tx, Encoding::Amino).is_ok());
        assert!(decode_envelope(&amino_tx, Encoding::Proto).is_err());

        let proto_tx = proto::encode_tx(
            vec![proto::Any {
                type_url: "/cosmos.bank.v1beta1.MsgSend".into(),
                value: vec![],
            }],
            "",
            vec![],
        );
        assert!(decode_envelope(&proto_tx, Encoding::Proto).is_ok());
        assert!(decode_envelope(&proto_tx, Encoding::Amino).is_err());
    }

    #[test]
    fn unpack_by_encoding() {
        let any = proto::Any {
            type_url: "/cosmos.gov.v1beta1.TextProposal".into(),
            value: vec![0x0a, 0x00],
        };
        let raw = unpack(&any.encode_to_vec(), Encoding::Proto).unwrap();
        assert_eq!(raw.type_tag, "/cosmos.gov.v1beta1.TextProposal");

        let packed = amino::pack_interface("gov/TextProposal", &[0x0a, 0x00]);
        let raw = unpack(&packed, Encoding::Amino).unwrap();
        assert_eq!(raw.type_tag, "gov/TextProposal");
        assert_eq!(raw.payload, vec![0x0a, 0x00]);
    }
}
