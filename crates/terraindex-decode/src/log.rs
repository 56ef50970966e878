//! Execution log model.
//!
//! `tx_result.log` is a JSON array with one entry per executed message:
//!
//! ```json
//! [{"msg_index":0,"success":true,"log":"","events":[
//!     {"type":"message","attributes":[{"key":"action","value":"send"}, ...]}
//! ]}]
//! ```
//!
//! The nested `log` field is itself a JSON string (`{codespace, code,
//! message}`) on failed messages and plain text or empty otherwise.
//! Attribute lists repeat keys: a `transfer` event lists `recipient`,
//! `sender` and `amount` once per movement, so list-valued keys keep every
//! occurrence in order.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use terraindex_core::{Account, EventTransfer, SubsetEvent, SubsetEventError, TransactionEvent};

/// Error reported by a failed message or transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LogError {
    #[serde(default)]
    pub codespace: String,
    #[serde(default)]
    pub code: u32,
    #[serde(default)]
    pub message: String,
}

impl LogError {
    pub const fn empty() -> Self {
        Self {
            codespace: String::new(),
            code: 0,
            message: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.message.is_empty() && self.code == 0
    }
}

/// Attributes of one log event, grouped the way the mappers read them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventAttributes {
    pub module: String,
    pub action: String,
    pub completion_time: String,
    pub sender: Vec<String>,
    pub recipient: Vec<String>,
    pub feeder: Vec<String>,
    pub voter: Vec<String>,
    pub amount: Vec<String>,
    /// `validator`, `source_validator`, `destination_validator`.
    pub validator: IndexMap<String, Vec<String>>,
    pub others: IndexMap<String, Vec<String>>,
}

impl EventAttributes {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn push(&mut self, key: String, value: String) {
        match key.as_str() {
            "module" => self.module = value,
            "action" => self.action = value,
            "completion_time" => self.completion_time = value,
            "sender" => self.sender.push(value),
            "recipient" => self.recipient.push(value),
            "feeder" => self.feeder.push(value),
            "voter" => self.voter.push(value),
            "amount" => self.amount.push(value),
            "validator" | "source_validator" | "destination_validator" => {
                self.validator.entry(key).or_default().push(value)
            }
            _ => self.others.entry(key).or_default().push(value),
        }
    }

    /// Build from a JSON attribute list (`[{"key":..,"value":..}]`) or a
    /// flat object. Non-string values keep their JSON text.
    pub fn from_json(value: serde_json::Value) -> Result<Self, String> {
        let mut attrs = Self::default();
        match value {
            serde_json::Value::Null => {}
            serde_json::Value::Array(items) => {
                for item in items {
                    let key = item
                        .get("key")
                        .and_then(|k| k.as_str())
                        .ok_or_else(|| "missing 'key' in attribute".to_string())?
                        .to_string();
                    attrs.push(key, json_text(item.get("value")));
                }
            }
            serde_json::Value::Object(obj) => {
                for (key, value) in obj {
                    attrs.push(key, json_text(Some(&value)));
                }
            }
            other => return Err(format!("attributes must be a list or object, got {other}")),
        }
        Ok(attrs)
    }
}

fn json_text(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl<'de> Deserialize<'de> for EventAttributes {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(d)?;
        Self::from_json(value).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LogEvent {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub attributes: EventAttributes,
}

/// Execution result of one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LogEntry {
    #[serde(default, deserialize_with = "msg_index")]
    pub msg_index: u64,
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "nested_log")]
    pub log: LogError,
    #[serde(default)]
    pub events: Vec<LogEvent>,
}

impl LogEntry {
    pub const fn empty() -> Self {
        Self {
            msg_index: 0,
            success: false,
            log: LogError::empty(),
            events: Vec::new(),
        }
    }

    /// Events of the given type, in log order.
    pub fn events_of<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a LogEvent> + 'a {
        self.events.iter().filter(move |e| e.kind == kind)
    }
}

static EMPTY_LOG: LogEntry = LogEntry::empty();

/// Message indexes arrive as JSON numbers, sometimes floats.
fn msg_index<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::Null => Ok(0),
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
            .ok_or_else(|| serde::de::Error::custom(format!("invalid msg_index {n}"))),
        serde_json::Value::String(s) => s.parse().map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!("invalid msg_index {other}"))),
    }
}

/// The nested log is JSON text on failures; anything else becomes the
/// message verbatim.
fn nested_log<'de, D: Deserializer<'de>>(d: D) -> Result<LogError, D::Error> {
    let text = Option::<String>::deserialize(d)?.unwrap_or_default();
    if text.is_empty() {
        return Ok(LogError::default());
    }
    Ok(serde_json::from_str::<LogError>(&text).unwrap_or(LogError {
        message: text,
        ..LogError::default()
    }))
}

/// Parse the raw execution log. An empty log has no entries.
pub fn parse_log(raw: &str) -> Result<Vec<LogEntry>, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
}

/// Log entry of the message at `index`: the positional entry when its
/// `msg_index` matches, otherwise the first entry that does. Indexes past
/// the end get the empty entry.
pub fn find_log(logs: &[LogEntry], index: usize) -> &LogEntry {
    let Some(positional) = logs.get(index) else {
        return &EMPTY_LOG;
    };
    if positional.msg_index == index as u64 {
        return positional;
    }
    logs.iter()
        .find(|l| l.msg_index == index as u64)
        .unwrap_or(&EMPTY_LOG)
}

/// Synthesize an event from a log entry alone, for messages the mappers
/// did not produce anything for. A failed entry carries its error on the
/// first sub-event.
pub fn event_from_log(entry: &LogEntry) -> TransactionEvent {
    let mut sub: Vec<SubsetEvent> = entry
        .events
        .iter()
        .filter(|ev| !ev.attributes.is_empty())
        .map(|ev| {
            let attrs = &ev.attributes;
            let kind = if attrs.action.is_empty() { &ev.kind } else { &attrs.action };
            let mut se = SubsetEvent::new(kind.clone(), attrs.module.clone());
            se.sender = attrs.sender.iter().map(|id| account_only(id)).collect();
            se.recipient = attrs.recipient.iter().map(|id| account_only(id)).collect();
            se
        })
        .collect();

    if !entry.success {
        let error = SubsetEventError {
            message: entry.log.message.clone(),
        };
        match sub.first_mut() {
            Some(first) => {
                if first.error.is_none() {
                    first.error = Some(error);
                }
            }
            None => sub.push(SubsetEvent {
                error: Some(error),
                ..Default::default()
            }),
        }
    }

    TransactionEvent {
        id: entry.msg_index.to_string(),
        kind: sub
            .first()
            .map(|s| s.primary_type().to_string())
            .unwrap_or_default(),
        sub,
    }
}

fn account_only(id: &str) -> EventTransfer {
    EventTransfer {
        account: Account::new(id),
        amounts: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEND_LOG: &str = r#"[{"msg_index":0,"success":true,"log":"","events":[
        {"type":"message","attributes":[
            {"key":"action","value":"send"},
            {"key":"sender","value":"terra1from"},
            {"key":"module","value":"bank"}]},
        {"type":"transfer","attributes":[
            {"key":"recipient","value":"terra1to"},
            {"key":"sender","value":"terra1from"},
            {"key":"amount","value":"2896ukrw,16uluna"},
            {"key":"recipient","value":"terra1other"},
            {"key":"amount","value":"5uluna"}]}]}]"#;

    #[test]
    fn attributes_group_by_key() {
        let logs = parse_log(SEND_LOG).unwrap();
        let message = &logs[0].events[0].attributes;
        assert_eq!(message.action, "send");
        assert_eq!(message.module, "bank");
        assert_eq!(message.sender, vec!["terra1from"]);

        let transfer = &logs[0].events[1].attributes;
        assert_eq!(transfer.recipient, vec!["terra1to", "terra1other"]);
        assert_eq!(transfer.amount, vec!["2896ukrw,16uluna", "5uluna"]);
    }

    #[test]
    fn validators_and_others_are_keyed() {
        let attrs = EventAttributes::from_json(serde_json::json!([
            {"key": "source_validator", "value": "terravaloper1a"},
            {"key": "destination_validator", "value": "terravaloper1b"},
            {"key": "completion_time", "value": "2021-01-01T00:00:00Z"},
            {"key": "denom", "value": "ukrw"},
            {"key": "weight", "value": 3}
        ]))
        .unwrap();
        assert_eq!(attrs.validator["source_validator"], vec!["terravaloper1a"]);
        assert_eq!(attrs.validator["destination_validator"], vec!["terravaloper1b"]);
        assert_eq!(attrs.completion_time, "2021-01-01T00:00:00Z");
        assert_eq!(attrs.others["denom"], vec!["ukrw"]);
        assert_eq!(attrs.others["weight"], vec!["3"]);
    }

    #[test]
    fn object_attributes_are_accepted() {
        let attrs =
            EventAttributes::from_json(serde_json::json!({"sender": "terra1x", "module": "bank"}))
                .unwrap();
        assert_eq!(attrs.sender, vec!["terra1x"]);
        assert_eq!(attrs.module, "bank");
        assert!(EventAttributes::from_json(serde_json::json!(5)).is_err());
    }

    #[test]
    fn nested_log_json_and_text() {
        let logs = parse_log(
            r#"[{"msg_index":0,"success":false,"log":"{\"codespace\":\"sdk\",\"code\":5,\"message\":\"insufficient funds\"}"},
                {"msg_index":1.0,"success":false,"log":"out of gas"}]"#,
        )
        .unwrap();
        assert_eq!(logs[0].log.codespace, "sdk");
        assert_eq!(logs[0].log.code, 5);
        assert_eq!(logs[0].log.message, "insufficient funds");
        assert_eq!(logs[1].msg_index, 1);
        assert_eq!(logs[1].log.message, "out of gas");
    }

    #[test]
    fn empty_and_invalid_logs() {
        assert!(parse_log("").unwrap().is_empty());
        assert!(parse_log("insufficient fee").is_err());
    }

    #[test]
    fn find_log_positional_then_scan() {
        let logs = vec![
            LogEntry { msg_index: 1, ..LogEntry::default() },
            LogEntry { msg_index: 0, success: true, ..LogEntry::default() },
        ];
        assert_eq!(find_log(&logs, 0).msg_index, 0);
        assert!(find_log(&logs, 0).success);
        assert_eq!(find_log(&logs, 1).msg_index, 1);
        assert_eq!(*find_log(&logs, 5), LogEntry::empty());
    }

    #[test]
    fn log_only_event_carries_accounts() {
        let logs = parse_log(SEND_LOG).unwrap();
        let ev = event_from_log(&logs[0]);
        assert_eq!(ev.id, "0");
        assert_eq!(ev.kind, "send");
        assert_eq!(ev.sub.len(), 2);
        assert_eq!(ev.sub[0].module, "bank");
        assert_eq!(ev.sub[0].sender[0].account.id, "terra1from");
        assert_eq!(ev.sub[1].primary_type(), "transfer");
        assert_eq!(ev.sub[1].recipient.len(), 2);
        assert!(ev.sub[0].error.is_none());
    }

    #[test]
    fn failed_log_only_event_gets_error() {
        let entry = LogEntry {
            msg_index: 3,
            success: false,
            log: LogError {
                message: "failed to execute message".into(),
                ..LogError::default()
            },
            events: vec![],
        };
        let ev = event_from_log(&entry);
        assert_eq!(ev.id, "3");
        assert_eq!(ev.sub.len(), 1);
        assert_eq!(ev.sub[0].error.as_ref().unwrap().message, "failed to execute message");
    }
}
