//! Worker configuration.
//!
//! Loaded from a JSON file, from `TERRA_`-prefixed environment variables, or
//! both (environment values override the file). Every field has a default,
//! so an empty file or environment yields a usable local setup.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use terraindex_client::ClientConfig;
use terraindex_core::ChainVersion;
use terraindex_decode::DecoderConfig;
use terraindex_observability::LogConfig;

use crate::error::WorkerError;
use crate::range::RangeConfig;

const ENV_PREFIX: &str = "TERRA_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Tendermint JSON-RPC endpoint.
    pub rpc_url: String,
    /// LCD / REST endpoint for account queries.
    pub lcd_url: String,
    pub api_key: Option<String>,
    pub chain_id: String,
    /// Overrides the version inferred from `chain_id`.
    pub chain_version: Option<ChainVersion>,
    pub requests_per_second: u32,
    /// Seconds.
    pub timeout_block_call: u64,
    /// Seconds.
    pub timeout_transaction_call: u64,
    /// Seconds.
    pub timeout_lcd_call: u64,
    /// Most heights a single "latest" request catches up on.
    pub maximum_heights_to_get: u64,
    /// Heights handled per sequential slice of a range request.
    pub big_page: u64,
    pub fetch_workers: usize,
    pub codec_fallback: bool,
    pub log: LogConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:26657".into(),
            lcd_url: "http://localhost:1317".into(),
            api_key: None,
            chain_id: "columbus-4".into(),
            chain_version: None,
            requests_per_second: 33,
            timeout_block_call: 30,
            timeout_transaction_call: 30,
            timeout_lcd_call: 30,
            maximum_heights_to_get: 10_000,
            big_page: 1000,
            fetch_workers: 5,
            codec_fallback: true,
            log: LogConfig::default(),
        }
    }
}

/// Log settings are nested in files but flat in the environment.
#[derive(Debug, Default, Deserialize)]
struct LogEnv {
    log_level: Option<String>,
    log_json: Option<bool>,
}

/// Environment view of [`WorkerConfig`]: every field optional so unset
/// variables keep the current value.
#[derive(Debug, Default, Deserialize)]
struct WorkerEnv {
    rpc_url: Option<String>,
    lcd_url: Option<String>,
    api_key: Option<String>,
    chain_id: Option<String>,
    chain_version: Option<ChainVersion>,
    requests_per_second: Option<u32>,
    timeout_block_call: Option<u64>,
    timeout_transaction_call: Option<u64>,
    timeout_lcd_call: Option<u64>,
    maximum_heights_to_get: Option<u64>,
    big_page: Option<u64>,
    fetch_workers: Option<usize>,
    codec_fallback: Option<bool>,
}

impl WorkerConfig {
    /// Read a JSON config file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WorkerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| WorkerError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&text).map_err(|e| WorkerError::Config(format!("{}: {e}", path.display())))
    }

    /// Defaults overridden by `TERRA_*` variables.
    pub fn from_env() -> Result<Self, WorkerError> {
        Self::default().merge_env_from(std::env::vars())
    }

    /// Override fields with `TERRA_*` variables taken from `vars`.
    pub fn merge_env_from<I>(mut self, vars: I) -> Result<Self, WorkerError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: Vec<(String, String)> = vars
            .into_iter()
            .filter(|(key, _)| key.starts_with(ENV_PREFIX))
            .collect();
        let env: WorkerEnv = envy::prefixed(ENV_PREFIX).from_iter(vars.clone())?;
        let log: LogEnv = envy::prefixed(ENV_PREFIX).from_iter(vars)?;

        macro_rules! take {
            ($($field:ident),*) => {
                $(if let Some(value) = env.$field { self.$field = value; })*
            };
        }
        take!(
            rpc_url,
            lcd_url,
            chain_id,
            requests_per_second,
            timeout_block_call,
            timeout_transaction_call,
            timeout_lcd_call,
            maximum_heights_to_get,
            big_page,
            fetch_workers,
            codec_fallback
        );
        if env.api_key.is_some() {
            self.api_key = env.api_key;
        }
        if env.chain_version.is_some() {
            self.chain_version = env.chain_version;
        }
        if let Some(level) = log.log_level {
            self.log.level = level;
        }
        if let Some(json) = log.log_json {
            self.log.json = json;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), WorkerError> {
        for (name, url) in [("rpc_url", &self.rpc_url), ("lcd_url", &self.lcd_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(WorkerError::Config(format!("{name} must be an http(s) URL, got {url:?}")));
            }
        }
        let limits = [
            ("requests_per_second", self.requests_per_second as u64),
            ("timeout_block_call", self.timeout_block_call),
            ("timeout_transaction_call", self.timeout_transaction_call),
            ("timeout_lcd_call", self.timeout_lcd_call),
            ("maximum_heights_to_get", self.maximum_heights_to_get),
            ("big_page", self.big_page),
            ("fetch_workers", self.fetch_workers as u64),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(WorkerError::Config(format!("{name} must be positive")));
            }
        }
        Ok(())
    }

    /// Explicit override, else inferred from the chain id, else the default.
    pub fn chain_version(&self) -> ChainVersion {
        self.chain_version
            .or_else(|| ChainVersion::from_chain_id(&self.chain_id))
            .unwrap_or_default()
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            chain_version: self.chain_version(),
            requests_per_second: self.requests_per_second,
            block_timeout: Duration::from_secs(self.timeout_block_call),
            tx_timeout: Duration::from_secs(self.timeout_transaction_call),
            lcd_timeout: Duration::from_secs(self.timeout_lcd_call),
            ..ClientConfig::default()
        }
    }

    pub fn decoder_config(&self) -> DecoderConfig {
        DecoderConfig {
            chain_version: self.chain_version(),
            codec_fallback: self.codec_fallback,
        }
    }

    pub fn range_config(&self) -> RangeConfig {
        RangeConfig {
            big_page: self.big_page,
            maximum_heights_to_get: self.maximum_heights_to_get,
            fetch_workers: self.fetch_workers,
        }
    }
}
