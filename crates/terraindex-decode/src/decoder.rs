//! Transaction decoder: raw search result → canonical [`Transaction`].
//!
//! ```text
//! TxResponse
//!   ├─ tx_result.log ──► parse_log ──► [LogEntry]            (non-JSON ⇒ tx-level error)
//!   └─ tx (base64) ──► primary codec ─┬─► Envelope
//!                      secondary ─────┘   (both fail ⇒ error event, envelope counted broken)
//!
//! Envelope.messages[i] ──► Registry::map(find_log(i)) ──► TransactionEvent { id: i }
//! LogEntry without a mapped message ──► event_from_log
//! tx-level error ──► trailing { kind: "error" }
//! ```

use std::collections::HashSet;
use std::time::Instant;

use base64::Engine;
use terraindex_core::{
    Block, ChainVersion, DecimalAmount, SubsetEvent, SubsetEventError, Transaction,
    TransactionEvent, TxResponse,
};
use terraindex_observability::WorkerMetrics;

use crate::error::{DecodeError, WireError};
use crate::log::{event_from_log, find_log, parse_log, LogEntry, LogError};
use crate::mapper::{MapContext, MessageRef, Registry};
use crate::wire::{decode_envelope, Envelope};

/// Decoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Selects which codec is tried first.
    pub chain_version: ChainVersion,
    /// Try the other codec when the primary one rejects the bytes.
    pub codec_fallback: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            chain_version: ChainVersion::default(),
            codec_fallback: true,
        }
    }
}

/// Turns [`TxResponse`]s into [`Transaction`]s. Stateless apart from the
/// metrics handle; share it behind an `Arc`.
pub struct TxDecoder {
    registry: Registry,
    config: DecoderConfig,
    metrics: WorkerMetrics,
}

impl TxDecoder {
    pub fn new(config: DecoderConfig, metrics: WorkerMetrics) -> Self {
        Self::with_registry(Registry::standard(), config, metrics)
    }

    pub fn with_registry(registry: Registry, config: DecoderConfig, metrics: WorkerMetrics) -> Self {
        Self {
            registry,
            config,
            metrics,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode a transaction and stamp it with its block's hash, time and
    /// chain id.
    pub fn decode_in_block(&self, raw: &TxResponse, block: &Block) -> Result<Transaction, DecodeError> {
        let mut tx = self.decode(raw)?;
        tx.block_hash = block.hash.clone();
        tx.time = Some(block.time);
        tx.chain_id = block.chain_id.clone();
        Ok(tx)
    }

    /// Decode one transaction.
    ///
    /// Only unparseable gas values and fee amounts fail the whole
    /// transaction. Undecodable bytes, unknown and broken messages are
    /// recorded and the rest of the transaction is still produced.
    pub fn decode(&self, raw: &TxResponse) -> Result<Transaction, DecodeError> {
        let started = Instant::now();
        let version = self.config.chain_version;

        let (logs, mut tx_error) = match parse_log(&raw.tx_result.log) {
            Ok(logs) => (logs, LogError::empty()),
            Err(e) => {
                tracing::debug!(hash = %raw.hash, error = %e, "execution log is not JSON");
                (
                    Vec::new(),
                    LogError {
                        message: raw.tx_result.log.clone(),
                        ..LogError::empty()
                    },
                )
            }
        };

        let height = raw.height.parse().unwrap_or_else(|e| {
            tracing::warn!(hash = %raw.hash, height = %raw.height, error = %e, "unparseable height");
            0
        });

        let mut tx = Transaction {
            hash: raw.hash.clone(),
            height,
            gas_wanted: parse_gas("gas_wanted", &raw.tx_result.gas_wanted)?,
            gas_used: parse_gas("gas_used", &raw.tx_result.gas_used)?,
            raw: raw.tx.clone(),
            raw_log: raw.tx_result.log.clone(),
            ..Transaction::default()
        };

        match self.envelope(&raw.hash, &raw.tx) {
            Ok(envelope) => {
                tx.memo = envelope.memo.clone();
                tx.fee = fee_amounts(&envelope)?;
                tx.events = self.events(&envelope, &logs, height);
            }
            Err(message) => {
                tracing::error!(hash = %raw.hash, height, error = %message, "transaction bytes not decodable");
                self.metrics.record_broken("envelope", "tx");
                tx.events.push(error_event("tx", message));
                tx.events.extend(logs.iter().map(event_from_log));
            }
        }

        if !tx_error.is_empty() {
            let codespace = std::mem::take(&mut tx_error.codespace);
            tx.events.push(error_event(&codespace, tx_error.message));
        }

        self.metrics.record_decoded(version.as_str());
        self.metrics
            .record_conversion(started.elapsed().as_secs_f64() * 1000.0, "transaction");
        Ok(tx)
    }

    /// Fee of a base64 transaction, without a node or execution log.
    pub fn decode_fee(&self, raw_tx: &str) -> Result<Vec<DecimalAmount>, DecodeError> {
        let envelope = self.envelope("", raw_tx).map_err(DecodeError::Envelope)?;
        fee_amounts(&envelope)
    }

    /// Events of a base64 transaction given its raw execution log. An empty
    /// log yields events from the messages alone.
    pub fn decode_events(&self, raw_tx: &str, raw_log: &str) -> Result<Vec<TransactionEvent>, DecodeError> {
        let envelope = self.envelope("", raw_tx).map_err(DecodeError::Envelope)?;
        let logs = parse_log(raw_log)?;
        Ok(self.events(&envelope, &logs, 0))
    }

    /// Base64 then the primary codec, then (optionally) the secondary one.
    /// The error text names every failed attempt.
    fn envelope(&self, hash: &str, raw_tx: &str) -> Result<Envelope, String> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(raw_tx.trim())
            .map_err(|e| format!("transaction is not base64: {e}"))?;

        let version = self.config.chain_version;
        let primary = version.primary_encoding();
        let primary_err = match decode_envelope(&bytes, primary) {
            Ok(envelope) => return Ok(envelope),
            Err(e) => e,
        };
        if !self.config.codec_fallback {
            return Err(primary_err.to_string());
        }

        let secondary = version.secondary_encoding();
        tracing::debug!(hash, %primary, %secondary, error = %primary_err, "primary codec failed");
        decode_envelope(&bytes, secondary).map_err(|secondary_err: WireError| {
            format!("{primary_err}; {secondary_err}")
        })
    }

    /// One event per mapped message, then one per log entry that no mapped
    /// message accounts for.
    fn events(&self, envelope: &Envelope, logs: &[LogEntry], height: u64) -> Vec<TransactionEvent> {
        let mut events = Vec::new();
        let mut present = HashSet::new();
        for (index, raw) in envelope.messages.iter().enumerate() {
            let msg = MessageRef::resolve(raw.clone());
            let log = find_log(logs, index);
            let ctx = MapContext::new(envelope.encoding, log, &self.registry);

            match self.registry.map(&msg, &ctx) {
                Ok(se) => {
                    let kind = se.primary_type().to_string();
                    events.push(TransactionEvent {
                        id: index.to_string(),
                        kind,
                        sub: vec![se],
                    });
                    present.insert(index as u64);
                }
                Err(err) => {
                    let (msg_type, route) = msg.labels();
                    if err.is_unknown() {
                        self.metrics.record_unknown(msg_type, route);
                    } else {
                        self.metrics.record_broken(msg_type, route);
                    }
                    tracing::error!(
                        height,
                        msg_type,
                        route,
                        encoding = %envelope.encoding,
                        error = %err,
                        "message not mapped"
                    );
                }
            }
        }

        for entry in logs {
            if !present.contains(&entry.msg_index) {
                events.push(event_from_log(entry));
            }
        }
        events
    }
}

fn fee_amounts(envelope: &Envelope) -> Result<Vec<DecimalAmount>, DecodeError> {
    envelope
        .fee
        .iter()
        .map(|c| DecimalAmount::parse(&c.amount, c.denom.clone()))
        .collect::<Result<_, _>>()
        .map_err(DecodeError::from)
}

fn parse_gas(field: &'static str, value: &str) -> Result<u64, DecodeError> {
    value.trim().parse().map_err(|_| DecodeError::Gas {
        field,
        value: value.to_string(),
    })
}

fn error_event(module: &str, message: String) -> TransactionEvent {
    TransactionEvent {
        id: String::new(),
        kind: "error".to_string(),
        sub: vec![SubsetEvent {
            error: Some(SubsetEventError { message }),
            ..SubsetEvent::new("error", module)
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::MAX_NESTING_DEPTH;
    use crate::wire::msgs::{MsgExecAuthorized, MsgSend};
    use crate::wire::proto::Any;
    use crate::wire::{amino, proto, Coin};
    use chrono::TimeZone;
    use prost::Message;
    use terraindex_core::DeliverTx;

    fn b64(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    fn response(tx: String, log: &str) -> TxResponse {
        TxResponse {
            hash: "A1B2".into(),
            height: "1500".into(),
            tx_result: DeliverTx {
                log: log.into(),
                gas_wanted: "200000".into(),
                gas_used: "81234".into(),
            },
            tx,
        }
    }

    fn decoder(chain_version: ChainVersion, codec_fallback: bool) -> TxDecoder {
        TxDecoder::new(
            DecoderConfig {
                chain_version,
                codec_fallback,
            },
            WorkerMetrics::from_global(),
        )
    }

    fn amino_send() -> Vec<u8> {
        let send = MsgSend {
            from_address: vec![1; 20],
            to_address: vec![2; 20],
            amount: vec![Coin::new("uluna", "1000")],
        };
        amino::encode_tx(
            vec![amino::pack_interface("bank/MsgSend", &send.encode_to_vec())],
            "hello",
            vec![Coin::new("uluna", "3000")],
        )
    }

    fn proto_send_any() -> Any {
        Any {
            type_url: "/cosmos.bank.v1beta1.MsgSend".into(),
            value: MsgSend {
                from_address: b"terra1from".to_vec(),
                to_address: b"terra1to".to_vec(),
                amount: vec![Coin::new("uusd", "5")],
            }
            .encode_to_vec(),
        }
    }

    const SEND_LOG: &str = r#"[{"msg_index":0,"success":true,"log":"","events":[
        {"type":"message","attributes":[{"key":"action","value":"send"},{"key":"module","value":"bank"}]},
        {"type":"transfer","attributes":[{"key":"recipient","value":"terra1to"},{"key":"amount","value":"5uusd"}]}]}]"#;

    #[test]
    fn amino_transaction() {
        let raw = response(b64(&amino_send()), "");
        let tx = decoder(ChainVersion::Columbus4, true).decode(&raw).unwrap();
        assert_eq!(tx.height, 1500);
        assert_eq!(tx.gas_wanted, 200000);
        assert_eq!(tx.gas_used, 81234);
        assert_eq!(tx.memo, "hello");
        assert_eq!(tx.fee[0].text, "3000");
        assert_eq!(tx.events.len(), 1);
        assert_eq!(tx.events[0].id, "0");
        assert_eq!(tx.events[0].kind, "send");
        assert_eq!(tx.events[0].sub[0].module, "bank");
        assert!(tx.events[0].sub[0].sender[0].account.id.starts_with("terra1"));
    }

    #[test]
    fn proto_transaction_with_transfers() {
        let bytes = proto::encode_tx(vec![proto_send_any()], "", vec![]);
        let raw = response(b64(&bytes), SEND_LOG);
        let tx = decoder(ChainVersion::Columbus5, true).decode(&raw).unwrap();
        assert_eq!(tx.events.len(), 1);
        let se = &tx.events[0].sub[0];
        assert_eq!(se.sender[0].account.id, "terra1from");
        assert_eq!(se.transfers["send"][0].account.id, "terra1to");
        assert_eq!(tx.raw_log, SEND_LOG);
    }

    #[test]
    fn secondary_codec_fallback() {
        let raw = response(b64(&amino_send()), "");
        let tx = decoder(ChainVersion::Columbus5, true).decode(&raw).unwrap();
        assert_eq!(tx.events[0].kind, "send");

        let tx = decoder(ChainVersion::Columbus5, false).decode(&raw).unwrap();
        assert_eq!(tx.events.len(), 1);
        assert_eq!(tx.events[0].kind, "error");
        assert_eq!(tx.events[0].sub[0].module, "tx");
    }

    #[test]
    fn undecodable_bytes_still_emit_transaction() {
        let raw = response("not base64 !!".into(), "");
        let tx = decoder(ChainVersion::Columbus4, true).decode(&raw).unwrap();
        assert_eq!(tx.hash, "A1B2");
        assert_eq!(tx.events.len(), 1);
        let err = tx.events[0].sub[0].error.as_ref().unwrap();
        assert!(err.message.contains("base64"));
    }

    #[test]
    fn deep_nesting_is_dropped() {
        let mut inner = proto_send_any();
        for _ in 0..MAX_NESTING_DEPTH + 2 {
            inner = Any {
                type_url: "/cosmos.authz.v1beta1.MsgExec".into(),
                value: MsgExecAuthorized {
                    grantee: b"terra1g".to_vec(),
                    msgs: vec![inner.encode_to_vec()],
                }
                .encode_to_vec(),
            };
        }
        let bytes = proto::encode_tx(vec![inner, proto_send_any()], "", vec![]);
        let raw = response(b64(&bytes), "");
        let tx = decoder(ChainVersion::Columbus5, true).decode(&raw).unwrap();
        assert_eq!(tx.events.len(), 1);
        assert_eq!(tx.events[0].id, "1");
    }

    #[test]
    fn unmapped_message_falls_back_to_log() {
        let unknown = Any {
            type_url: "/cosmos.feegrant.v1beta1.MsgGrantAllowance".into(),
            value: vec![],
        };
        let bytes = proto::encode_tx(vec![unknown], "", vec![]);
        let log = r#"[{"msg_index":0,"success":false,"log":"{\"codespace\":\"feegrant\",\"code\":3,\"message\":\"fee allowance exists\"}","events":[
            {"type":"message","attributes":[{"key":"action","value":"grant_allowance"},{"key":"module","value":"feegrant"},{"key":"sender","value":"terra1g"}]}]}]"#;
        let tx = decoder(ChainVersion::Columbus5, true)
            .decode(&response(b64(&bytes), log))
            .unwrap();
        assert_eq!(tx.events.len(), 1);
        let ev = &tx.events[0];
        assert_eq!(ev.id, "0");
        assert_eq!(ev.kind, "grant_allowance");
        assert_eq!(ev.sub[0].module, "feegrant");
        assert_eq!(ev.sub[0].sender[0].account.id, "terra1g");
        assert_eq!(
            ev.sub[0].error.as_ref().unwrap().message,
            "fee allowance exists"
        );
    }

    #[test]
    fn unknown_message_beside_known_one() {
        let unknown = Any {
            type_url: "/cosmos.feegrant.v1beta1.MsgGrantAllowance".into(),
            value: vec![1, 2, 3],
        };
        let bytes = proto::encode_tx(vec![proto_send_any(), unknown], "", vec![]);
        let tx = decoder(ChainVersion::Columbus5, true)
            .decode(&response(b64(&bytes), SEND_LOG))
            .unwrap();
        let events: Vec<_> = tx.events.iter().map(|e| (e.id.as_str(), e.kind.as_str())).collect();
        assert_eq!(events, vec![("0", "send")]);
        assert!(tx.events.iter().all(|e| e.kind != "error"));
    }

    #[test]
    fn fee_from_raw_transaction() {
        let fee = decoder(ChainVersion::Columbus4, true)
            .decode_fee(&b64(&amino_send()))
            .unwrap();
        assert_eq!(fee.len(), 1);
        assert_eq!(fee[0].text, "3000");
        assert_eq!(fee[0].currency, "uluna");

        let err = decoder(ChainVersion::Columbus4, false)
            .decode_fee("not base64 !!")
            .unwrap_err();
        assert!(matches!(err, DecodeError::Envelope(_)));
    }

    #[test]
    fn events_from_raw_transaction_and_log() {
        let bytes = b64(&proto::encode_tx(vec![proto_send_any()], "", vec![]));
        let decoder = decoder(ChainVersion::Columbus5, true);

        let events = decoder.decode_events(&bytes, SEND_LOG).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, "send");
        assert_eq!(events[0].sub[0].transfers["send"][0].account.id, "terra1to");

        let events = decoder.decode_events(&bytes, "").unwrap();
        assert_eq!(events[0].sub[0].sender[0].account.id, "terra1from");
        assert!(events[0].sub[0].transfers.is_empty());

        let err = decoder.decode_events(&bytes, "out of gas").unwrap_err();
        assert!(matches!(err, DecodeError::Log(_)));
    }

    #[test]
    fn non_json_log_is_transaction_error() {
        let bytes = proto::encode_tx(vec![proto_send_any()], "", vec![]);
        let raw = response(b64(&bytes), "out of gas in location: ReadFlat");
        let tx = decoder(ChainVersion::Columbus5, true).decode(&raw).unwrap();
        let last = tx.events.last().unwrap();
        assert_eq!(last.kind, "error");
        assert_eq!(last.id, "");
        assert_eq!(last.sub[0].r#type, vec!["error"]);
        assert_eq!(
            last.sub[0].error.as_ref().unwrap().message,
            "out of gas in location: ReadFlat"
        );
    }

    #[test]
    fn bad_gas_fails_transaction() {
        let mut raw = response(b64(&amino_send()), "");
        raw.tx_result.gas_used = "lots".into();
        let err = decoder(ChainVersion::Columbus4, true).decode(&raw).unwrap_err();
        assert!(matches!(err, DecodeError::Gas { field: "gas_used", .. }));
    }

    #[test]
    fn block_fields_are_stamped() {
        let block = Block {
            hash: "BLOCKHASH".into(),
            height: 1500,
            time: chrono::Utc.with_ymd_and_hms(2021, 3, 1, 12, 0, 0).unwrap(),
            chain_id: "columbus-4".into(),
            number_of_transactions: 1,
        };
        let raw = response(b64(&amino_send()), "");
        let tx = decoder(ChainVersion::Columbus4, true)
            .decode_in_block(&raw, &block)
            .unwrap();
        assert_eq!(tx.block_hash, "BLOCKHASH");
        assert_eq!(tx.chain_id, "columbus-4");
        assert_eq!(tx.time, Some(block.time));
    }
}
