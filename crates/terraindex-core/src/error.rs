//! Error types for the core codecs.

use thiserror::Error;

/// Errors raised while parsing chain amount strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalError {
    #[error("empty amount")]
    Empty,

    #[error("amount '{0}' has more than one decimal separator")]
    TooManySeparators(String),

    #[error("amount '{0}' is not a decimal number")]
    NotNumeric(String),

    /// The token is neither `<amount>` nor `<amount><currency>`.
    #[error("token '{0}' is not an amount with optional currency")]
    Unrecognized(String),
}

/// Errors raised while normalizing addresses.
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("bech32 encoding failed: {0}")]
    Bech32(#[from] bech32::Error),

    #[error("address bytes are not valid UTF-8 text")]
    NotText,
}
