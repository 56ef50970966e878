//! # terraindex-decode
//!
//! Turns raw transaction search results into the canonical event model.
//!
//! ```text
//! base64 ──► wire::{amino, proto} ──► Envelope { messages: [RawMessage] }
//!                                          │
//!                          mapper::MessageRef::resolve (MsgKind table)
//!                                          │
//!                 mapper::Registry::map + log::find_log + transfers
//!                                          │
//!                                   Transaction.events
//! ```
//!
//! Columbus-3/4 transactions use the length-prefixed amino encoding,
//! columbus-5 the protobuf `TxRaw`. The [`TxDecoder`] tries the chain
//! version's codec first and falls back to the other one.

pub mod decoder;
pub mod error;
pub mod log;
pub mod mapper;
pub mod transfers;
pub mod wire;

pub use decoder::{DecoderConfig, TxDecoder};
pub use error::{DecodeError, MapError, WireError};
pub use log::{event_from_log, find_log, parse_log, LogEntry};
pub use mapper::{MessageRef, MsgKind, Registry, MAX_NESTING_DEPTH};
