//! Error types for the decode pipeline.

use terraindex_core::{AddressError, DecimalError, Encoding};
use thiserror::Error;

/// Errors raised while splitting transaction bytes into messages.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("{encoding} decode failed: {source}")]
    Decode {
        encoding: Encoding,
        #[source]
        source: prost::DecodeError,
    },

    #[error("length prefix says {declared} bytes, {available} available")]
    Length { declared: u64, available: usize },

    #[error("interface value shorter than its 4-byte type prefix")]
    MissingPrefix,

    #[error("unexpected envelope type '{0}'")]
    UnexpectedType(String),

    #[error("message {index} has an empty type URL")]
    EmptyTypeUrl { index: usize },
}

impl WireError {
    pub(crate) fn decode(encoding: Encoding, source: prost::DecodeError) -> Self {
        Self::Decode { encoding, source }
    }
}

/// Errors produced by a single message mapper.
///
/// [`MapError::Unknown`] means no mapper exists for the message; everything
/// else means a mapper exists but the payload could not be converted.
#[derive(Debug, Error)]
pub enum MapError {
    #[error("no mapper for message type '{type_tag}'")]
    Unknown { type_tag: String },

    #[error("malformed {message} payload: {source}")]
    Malformed {
        message: &'static str,
        #[source]
        source: prost::DecodeError,
    },

    #[error("field '{field}' is missing")]
    Missing { field: &'static str },

    #[error("address field '{field}': {source}")]
    Address {
        field: &'static str,
        #[source]
        source: AddressError,
    },

    #[error("amount field '{field}': {source}")]
    Amount {
        field: &'static str,
        #[source]
        source: DecimalError,
    },

    #[error("inner message decode failed: {0}")]
    Wire(#[from] WireError),

    #[error("wrapper messages nested deeper than {max} levels")]
    NestingTooDeep { max: usize },

    #[error("inner message {index}: {source}")]
    Nested {
        index: usize,
        #[source]
        source: Box<MapError>,
    },
}

impl MapError {
    /// `true` when the message type simply has no mapper.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown { .. })
    }
}

/// Errors that abort the decoding of a whole transaction.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("{field} '{value}' is not an unsigned integer")]
    Gas { field: &'static str, value: String },

    #[error("fee amount: {0}")]
    Fee(#[from] DecimalError),

    /// Neither codec accepted the transaction bytes.
    #[error("transaction not decodable: {0}")]
    Envelope(String),

    #[error("execution log: {0}")]
    Log(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_is_distinguished_from_broken() {
        assert!(MapError::Unknown { type_tag: "x".into() }.is_unknown());
        assert!(!MapError::Missing { field: "amount" }.is_unknown());
        assert!(!MapError::NestingTooDeep { max: 4 }.is_unknown());
    }

    #[test]
    fn nested_error_names_index() {
        let err = MapError::Nested {
            index: 2,
            source: Box::new(MapError::Missing { field: "amount" }),
        };
        assert_eq!(err.to_string(), "inner message 2: field 'amount' is missing");
    }
}
