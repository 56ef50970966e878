//! terraindex CLI: run worker tasks against a Terra node and print the
//! responses as JSON lines.
//!
//! # Commands
//! ```
//! terraindex range       --start <h> --end <h>
//! terraindex latest      --last-height <h>
//! terraindex mark
//! terraindex block       --height <h>
//! terraindex reward      --height <h> --account <terra1...>
//! terraindex balance     --height <h> --account <terra1...>
//! terraindex delegations --height <h> --account <terra1...>
//! terraindex decode      --tx <base64> [--log <json>]
//! terraindex info
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use serde_json::json;

use terraindex_client::{AccountApi, ChainApi, ChainClient};
use terraindex_decode::TxDecoder;
use terraindex_observability::{init_tracing, WorkerMetrics};
use terraindex_worker::task::{
    GET_ACCOUNT_BALANCE, GET_ACCOUNT_DELEGATIONS, GET_LATEST, GET_LATEST_MARK, GET_REWARD,
    GET_TRANSACTIONS,
};
use terraindex_worker::{
    IndexerClient, MemoryStore, ResponseSink, TaskRequest, TaskResponse, WorkerConfig, WorkerError,
};

#[derive(Parser)]
#[command(
    name = "terraindex",
    about = "Terra indexing worker: fetch, decode and stream blocks and transactions",
    long_about = "
Runs a single worker task against a Terra node and prints every response
as one JSON line.

ENVIRONMENT VARIABLES (override the config file):
  TERRA_RPC_URL         Tendermint RPC endpoint
  TERRA_LCD_URL         LCD endpoint for account queries
  TERRA_API_KEY         Authorization header value
  TERRA_CHAIN_ID        e.g. columbus-4, columbus-5
  TERRA_LOG_LEVEL       trace | debug | info | warn | error
",
    version
)]
struct Cli {
    /// JSON config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Blocks and transactions of an inclusive height range
    Range {
        #[arg(long)]
        start: u64,
        #[arg(long)]
        end: u64,
    },

    /// Blocks and transactions since a height, up to the chain head
    Latest {
        /// Last processed height (0 = nothing processed yet)
        #[arg(long, default_value_t = 0)]
        last_height: u64,
    },

    /// Hash, height and time of the latest block
    Mark,

    /// Fetch, decode and store one height
    Block {
        #[arg(long)]
        height: u64,
    },

    /// Delegator rewards of an account
    Reward {
        #[arg(long, default_value_t = 0)]
        height: u64,
        #[arg(long)]
        account: String,
    },

    /// Bank balances of an account
    Balance {
        #[arg(long, default_value_t = 0)]
        height: u64,
        #[arg(long)]
        account: String,
    },

    /// Staking delegations of an account
    Delegations {
        #[arg(long, default_value_t = 0)]
        height: u64,
        #[arg(long)]
        account: String,
    },

    /// Decode a raw transaction and its execution log offline
    Decode {
        /// Base64 transaction bytes
        #[arg(long)]
        tx: String,
        /// Raw execution log (JSON array)
        #[arg(long, default_value = "")]
        log: String,
    },

    /// Show the effective configuration
    Info,
}

/// Prints each response as a JSON line.
struct StdoutSink {
    out: Mutex<std::io::Stdout>,
}

#[async_trait]
impl ResponseSink for StdoutSink {
    async fn send(&self, response: TaskResponse) -> Result<(), WorkerError> {
        let line = serde_json::to_string(&response).map_err(|e| WorkerError::Sink(e.to_string()))?;
        let mut out = self.out.lock().unwrap_or_else(|p| p.into_inner());
        writeln!(out, "{line}").map_err(|e| WorkerError::Sink(e.to_string()))
    }
}

fn load_config(path: Option<&PathBuf>, verbose: bool) -> Result<WorkerConfig> {
    let base = match path {
        Some(path) => WorkerConfig::from_file(path)?,
        None => WorkerConfig::default(),
    };
    let mut config = base.merge_env_from(std::env::vars())?;
    if verbose {
        config.log.level = "debug".into();
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn build(config: &WorkerConfig) -> Result<IndexerClient> {
    let metrics = WorkerMetrics::from_global();
    let client = ChainClient::connect(
        &config.rpc_url,
        &config.lcd_url,
        config.api_key.clone(),
        config.client_config(),
        metrics.clone(),
    )
    .context("building node client")?;
    let client = Arc::new(client);
    let decoder = Arc::new(TxDecoder::new(config.decoder_config(), metrics.clone()));

    Ok(IndexerClient::new(
        client.clone() as Arc<dyn ChainApi>,
        client as Arc<dyn AccountApi>,
        decoder,
        config.range_config(),
        metrics,
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref(), cli.verbose)?;
    init_tracing(&config.log).context("initialising tracing")?;

    let request = match cli.command {
        Commands::Range { start, end } => TaskRequest::new(
            GET_TRANSACTIONS,
            json!({"start_height": start, "end_height": end, "chain_id": config.chain_id, "network": "terra"}),
        ),
        Commands::Latest { last_height } => {
            TaskRequest::new(GET_LATEST, json!({ "last_height": last_height }))
        }
        Commands::Mark => TaskRequest::new(GET_LATEST_MARK, json!({})),
        Commands::Reward { height, account } => {
            TaskRequest::new(GET_REWARD, json!({"height": height, "account": account}))
        }
        Commands::Balance { height, account } => {
            TaskRequest::new(GET_ACCOUNT_BALANCE, json!({"height": height, "account": account}))
        }
        Commands::Delegations { height, account } => {
            TaskRequest::new(GET_ACCOUNT_DELEGATIONS, json!({"height": height, "account": account}))
        }
        Commands::Block { height } => return cmd_block(&config, height).await,
        Commands::Decode { tx, log } => return cmd_decode(&config, &tx, &log),
        Commands::Info => return cmd_info(&config),
    };

    let indexer = build(&config)?;
    let sink = StdoutSink {
        out: Mutex::new(std::io::stdout()),
    };
    tracing::info!(task_id = %request.id, task_type = %request.type_, "running task");
    indexer.handle(request, &sink).await?;
    Ok(())
}

// ─── Command implementations ─────────────────────────────────────────────────

async fn cmd_block(config: &WorkerConfig, height: u64) -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let indexer = build(config)?.with_store(store.clone());
    let (block, txs) = indexer
        .block_and_tx(height)
        .await
        .with_context(|| format!("fetching height {height}"))?;

    println!("{}", serde_json::to_string(&block)?);
    for tx in &txs {
        println!("{}", serde_json::to_string(tx)?);
    }
    tracing::info!(height, txs = txs.len(), confirmed = store.is_confirmed(height), "height stored");
    Ok(())
}

fn cmd_decode(config: &WorkerConfig, tx: &str, log: &str) -> Result<()> {
    let decoder = TxDecoder::new(config.decoder_config(), WorkerMetrics::from_global());
    let fee = decoder.decode_fee(tx).context("decoding fee")?;
    let events = decoder.decode_events(tx, log).context("decoding events")?;
    println!("{}", serde_json::to_string(&json!({ "fee": fee, "events": events }))?);
    Ok(())
}

fn cmd_info(config: &WorkerConfig) -> Result<()> {
    println!("terraindex v{}", env!("CARGO_PKG_VERSION"));
    println!("  RPC endpoint:         {}", config.rpc_url);
    println!("  LCD endpoint:         {}", config.lcd_url);
    println!("  Chain id:             {}", config.chain_id);
    println!("  Chain version:        {}", config.chain_version().as_str());
    println!(
        "  Codecs:               {} (fallback {})",
        config.chain_version().primary_encoding(),
        if config.codec_fallback { "on" } else { "off" }
    );
    println!("  Requests per second:  {}", config.requests_per_second);
    println!("  Big page:             {} heights", config.big_page);
    println!("  Latest window:        {} heights", config.maximum_heights_to_get);
    println!("  Fetch workers:        {}", config.fetch_workers);
    Ok(())
}
