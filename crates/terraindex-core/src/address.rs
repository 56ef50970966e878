//! Bech32 address normalization.
//!
//! The legacy wire format carries addresses as raw account bytes while the
//! protobuf format already carries bech32 text. Either way the event model
//! only ever sees the text form with the prefix matching the address role.

use bech32::{ToBase32, Variant};

use crate::chain::Encoding;
use crate::error::AddressError;

/// Human-readable prefix of account addresses.
pub const ACCOUNT_PREFIX: &str = "terra";
/// Human-readable prefix of validator operator addresses.
pub const VALIDATOR_OPERATOR_PREFIX: &str = "terravaloper";
/// Human-readable prefix of validator consensus addresses.
pub const VALIDATOR_CONSENSUS_PREFIX: &str = "terravalcons";

/// Which kind of entity an address identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressRole {
    Account,
    ValidatorOperator,
    ValidatorConsensus,
}

impl AddressRole {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Account => ACCOUNT_PREFIX,
            Self::ValidatorOperator => VALIDATOR_OPERATOR_PREFIX,
            Self::ValidatorConsensus => VALIDATOR_CONSENSUS_PREFIX,
        }
    }
}

/// Encode raw address bytes. Empty input encodes to an empty string.
pub fn encode(bytes: &[u8], role: AddressRole) -> Result<String, AddressError> {
    if bytes.is_empty() {
        return Ok(String::new());
    }
    Ok(bech32::encode(role.prefix(), bytes.to_base32(), Variant::Bech32)?)
}

/// Turn an address field as found on the wire into bech32 text.
pub fn normalize(raw: &[u8], role: AddressRole, encoding: Encoding) -> Result<String, AddressError> {
    match encoding {
        Encoding::Amino => encode(raw, role),
        Encoding::Proto => std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|_| AddressError::NotText),
    }
}
