//! terraindex-core: shared foundation for the Terra indexing worker.
//!
//! # Architecture
//!
//! ```text
//! ChainClient (terraindex-client) ──► TxResponse
//!                                        │
//!                 TxDecoder (terraindex-decode) ──► Transaction { events: [SubsetEvent] }
//!                                        │
//!                  RangeFetcher (terraindex-worker) ──► ResponseSink
//! ```
//!
//! This crate holds the pieces every stage agrees on: the canonical event
//! model, the decimal codec, bech32 address normalization and the chain
//! version tag that selects wire formats.

pub mod address;
pub mod chain;
pub mod decimal;
pub mod error;
pub mod types;

pub use address::{
    AddressRole, ACCOUNT_PREFIX, VALIDATOR_CONSENSUS_PREFIX, VALIDATOR_OPERATOR_PREFIX,
};
pub use chain::{ChainVersion, Encoding};
pub use decimal::DecimalAmount;
pub use error::{AddressError, DecimalError};
pub use types::{
    Account, AccountBalance, AccountDelegations, AccountDetails, Block, Delegation, DeliverTx,
    EventTransfer, Height, HeightAccount, HeightRange, LatestDataRequest, LatestMark, Reward,
    SubsetEvent, SubsetEventError, ToGet, Transaction, TransactionEvent, TxResponse,
};
