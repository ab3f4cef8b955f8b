//! ethcoder CLI: selectors, topics, calldata encoding, and log decoding.
//!
//! # Commands
//! ```text
//! ethcoder selector    "transfer(address,uint256)"
//! ethcoder topic       "Transfer(address,address,uint256)"
//! ethcoder encode-call --abi <path.json> --method <name> --args <json> | --arg <v>...
//! ethcoder decode-call --abi <path.json> --calldata <hex>
//! ethcoder decode-log  --abi <path.json> --topics <...> --data <hex>
//! ethcoder decode-logs --abi <path.json> --file <logs.json> [--parallel]
//! ethcoder info        --abi <path.json>
//! ```

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use ethcoder_core::{
    canonical_signature, parse_signature, ContractAbi, LogDecoder, LogEntry, Selector, TopicId,
};
use ethcoder_evm::{par_decode_logs, CallDecoder, EvmLogDecoder, MethodEncoder};
use ethcoder_observability::{init_tracing, LogConfig};
use std::path::Path;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "ethcoder",
    about = "Ethereum ABI encoder/decoder",
    long_about = "
ethcoder: compute selectors and topic ids, encode method calls, and decode
calldata and event logs against a contract ABI.

ABI files may be a standard Ethereum ABI JSON array, a build artifact with
an \"abi\" key, or the compact {\"functions\": [...], \"events\": [...]} form.

ENVIRONMENT VARIABLES:
  ETHCODER_LOG    Log filter directives, e.g. \"debug\" or \"warn,ethcoder_evm=debug\"
",
    version
)]
struct Cli {
    /// Default log level
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the 4-byte selector of a function signature
    Selector {
        /// e.g. "transfer(address,uint256)"; `uint`/`int` aliases are normalised
        signature: String,
    },

    /// Print the 32-byte topic identifier of an event signature
    Topic {
        /// e.g. "Transfer(address,address,uint256)"
        signature: String,
    },

    /// Encode a method call to ABI calldata
    #[command(name = "encode-call")]
    EncodeCall {
        /// Path to the ABI JSON file
        #[arg(long)]
        abi: String,
        /// Method name, or full signature to pick an overload
        #[arg(long)]
        method: String,
        /// JSON array of arguments, e.g. '["0xabc...", "1000000"]'
        #[arg(long, default_value = "[]")]
        args: String,
        /// One argument per flag, in order; arrays and tuples as JSON
        #[arg(long = "arg", conflicts_with = "args")]
        arg: Vec<String>,
    },

    /// Decode method calldata using an ABI JSON file
    #[command(name = "decode-call")]
    DecodeCall {
        /// Path to the ABI JSON file
        #[arg(long)]
        abi: String,
        /// Raw calldata (hex, 0x prefix optional)
        #[arg(long)]
        calldata: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode one event log from raw topics + data
    #[command(name = "decode-log")]
    DecodeLog {
        /// Path to the ABI JSON file
        #[arg(long)]
        abi: String,
        /// topics[0] = event topic id, topics[1..] = indexed params
        #[arg(long, num_args = 1..)]
        topics: Vec<String>,
        /// Non-indexed params (hex, 0x-prefixed)
        #[arg(long, default_value = "0x")]
        data: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode a file of JSON-RPC log objects
    #[command(name = "decode-logs")]
    DecodeLogs {
        /// Path to the ABI JSON file
        #[arg(long)]
        abi: String,
        /// JSON file: an array of logs, `{"logs": [...]}`, or an `eth_getLogs` response
        #[arg(long)]
        file: String,
        /// Decode on all cores
        #[arg(long)]
        parallel: bool,
    },

    /// List the functions and events of an ABI with their selectors and topic ids
    Info {
        /// Path to the ABI JSON file
        #[arg(long)]
        abi: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = LogConfig {
        level: cli.log_level.clone(),
        json: cli.json_logs,
        ..LogConfig::default()
    };
    init_tracing(&log_config).map_err(|e| anyhow!("failed to initialise logging: {e}"))?;

    match cli.command {
        Commands::Selector { signature } => cmd_selector(&signature),
        Commands::Topic { signature } => cmd_topic(&signature),
        Commands::EncodeCall { abi, method, args, arg } => {
            cmd_encode_call(&abi, &method, &args, &arg)
        }
        Commands::DecodeCall { abi, calldata, json } => cmd_decode_call(&abi, &calldata, json),
        Commands::DecodeLog { abi, topics, data, json } => cmd_decode_log(&abi, topics, data, json),
        Commands::DecodeLogs { abi, file, parallel } => cmd_decode_logs(&abi, &file, parallel),
        Commands::Info { abi } => cmd_info(&abi),
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn load_abi(path: &str) -> Result<Arc<ContractAbi>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading ABI file {path}"))?;
    let abi = ContractAbi::from_json(&text).with_context(|| format!("parsing ABI file {path}"))?;
    tracing::debug!(
        path,
        functions = abi.functions().len(),
        events = abi.events().len(),
        "loaded ABI"
    );
    Ok(Arc::new(abi))
}

fn canonical(signature: &str) -> Result<String> {
    let (name, types) = parse_signature(signature)?;
    Ok(canonical_signature(&name, &types))
}

/// Accepts a bare array, `{"logs": [...]}`, or a JSON-RPC `{"result": [...]}`.
fn read_logs(path: &Path) -> Result<Vec<LogEntry>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading log file {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text).context("log file is not JSON")?;
    let array = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => map
            .remove("logs")
            .or_else(|| map.remove("result"))
            .ok_or_else(|| anyhow!("expected a `logs` or `result` array"))?,
        _ => bail!("expected an array of log objects"),
    };
    serde_json::from_value(array).context("malformed log object")
}

// ─── Commands ─────────────────────────────────────────────────────────────────

fn cmd_selector(signature: &str) -> Result<()> {
    let canonical = canonical(signature)?;
    println!("{}  {}", Selector::of(&canonical), canonical);
    Ok(())
}

fn cmd_topic(signature: &str) -> Result<()> {
    let canonical = canonical(signature)?;
    println!("{}  {}", TopicId::of(&canonical), canonical);
    Ok(())
}

fn cmd_encode_call(abi_path: &str, method: &str, args_json: &str, arg: &[String]) -> Result<()> {
    let encoder = MethodEncoder::new(load_abi(abi_path)?);
    let calldata = if arg.is_empty() {
        let args: Vec<serde_json::Value> =
            serde_json::from_str(args_json).context("--args must be a JSON array")?;
        encoder.encode_method_json(method, &args)
    } else {
        encoder.encode_method_strings(method, arg)
    }
    .with_context(|| format!("encoding call to '{method}'"))?;
    println!("{calldata}");
    Ok(())
}

fn cmd_decode_call(abi_path: &str, calldata: &str, as_json: bool) -> Result<()> {
    let abi = load_abi(abi_path)?;
    let decoded = CallDecoder::new(abi)
        .decode_call_hex(calldata)
        .context("decoding calldata")?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
    } else {
        println!("Function:  {}", decoded.signature);
        println!("Selector:  {}", decoded.selector);
        println!("Inputs:");
        for (name, val) in &decoded.inputs {
            println!("  {name}: {val}");
        }
    }
    Ok(())
}

fn cmd_decode_log(abi_path: &str, topics: Vec<String>, data: String, as_json: bool) -> Result<()> {
    let decoder = EvmLogDecoder::new(load_abi(abi_path)?);
    let log = LogEntry::new(topics, data);
    let Some(decoded) = decoder.decode_log(&log).context("decoding log")? else {
        bail!("no event in the ABI matches this log");
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
    } else {
        println!("Event:   {}", decoded.event_name);
        println!("Fields:");
        for (name, val) in &decoded.fields {
            println!("  {name}: {val}");
        }
    }
    Ok(())
}

fn cmd_decode_logs(abi_path: &str, file: &str, parallel: bool) -> Result<()> {
    let decoder = EvmLogDecoder::new(load_abi(abi_path)?);
    let logs = read_logs(Path::new(file))?;

    let events = if parallel {
        par_decode_logs(&decoder, &logs)
    } else {
        decoder.decode_logs(&logs)
    };
    tracing::info!(total = logs.len(), decoded = events.len(), "decoded logs");

    println!("{}", serde_json::to_string_pretty(&events)?);
    Ok(())
}

fn cmd_info(abi_path: &str) -> Result<()> {
    let abi = load_abi(abi_path)?;

    println!("Functions ({}):", abi.functions().len());
    for f in abi.functions() {
        let outputs: Vec<_> = f.outputs().iter().map(|p| p.ty.to_string()).collect();
        if outputs.is_empty() {
            println!("  {}  {}", f.selector(), f.signature());
        } else {
            println!("  {}  {} -> ({})", f.selector(), f.signature(), outputs.join(","));
        }
    }

    println!("Events ({}):", abi.events().len());
    for e in abi.events() {
        let marker = if e.is_anonymous() { "  [anonymous]" } else { "" };
        println!("  {}  {}{}", e.topic_id(), e.signature(), marker);
    }
    Ok(())
}
