//! neorpc CLI — query and watch NEO nodes and explorer APIs from the terminal.
//!
//! Usage:
//! ```bash
//! # Current height from a local node
//! neorpc height
//!
//! # Watch the height of an explorer every 5 seconds (Ctrl-C to stop)
//! neorpc height --provider neon --url http://api.example.org/v2/ --poll 5000
//!
//! # Send a raw JSON-RPC call
//! neorpc call --url http://localhost:10332 --method getblock --params '[100, 1]'
//!
//! # GET a REST path relative to a base URL
//! neorpc get --url http://www.antchain.org/api/v1/ --path block/get_current_height
//! ```

use std::env;
use std::process;

use serde_json::Value;

use neorpc_core::service::{RestCapable, RestService, RpcCapable, RpcService, ServiceConfig};
use neorpc_core::{IntervalConfig, ServiceError, ServiceFuture};
use neorpc_providers::{http_context, CurrentHeight, ProviderKind};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "height" => cmd_height(&args[2..]).await,
        "call" => cmd_call(&args[2..]).await,
        "get" => cmd_get(&args[2..]).await,
        "providers" => {
            cmd_providers();
            Ok(())
        }
        "version" | "--version" | "-V" => {
            println!("neorpc {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("neorpc {}", env!("CARGO_PKG_VERSION"));
    println!("Query and watch NEO nodes and explorer APIs\n");
    println!("USAGE:");
    println!("    neorpc <COMMAND> [FLAGS]\n");
    println!("COMMANDS:");
    println!("    height     Current block height of a provider");
    println!("    call       Send a raw JSON-RPC call");
    println!("    get        GET a REST path relative to a base URL");
    println!("    providers  List built-in provider profiles");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("FLAGS:");
    println!("    --url <URL>          Service base URL");
    println!("    --config <FILE>      JSON service config ({{\"baseUrl\": ..., \"poll\": ...}})");
    println!("    --poll <MS>          Repeat every MS milliseconds until Ctrl-C");
    println!("    --provider <NAME>    Provider profile for `height`  [default: node]");
    println!("    --method <METHOD>    JSON-RPC method for `call`");
    println!("    --params <JSON>      JSON array of params for `call`  [default: []]");
    println!("    --path <PATH>        Path for `get`");
    println!("    --query <K=V>        Query parameter for `get`, repeatable");
}

async fn cmd_height(args: &[String]) -> Result<(), String> {
    let kind: ProviderKind = parse_flag(args, "--provider")
        .unwrap_or_else(|| "node".into())
        .parse()?;
    let mut config = service_config(args)?;
    if config.base_url.is_none() {
        config.base_url = kind.default_base_url().map(String::from);
    }
    let watching = config.poll.is_some();

    let ctx = http_context().map_err(|e| e.to_string())?;
    let source = kind
        .height_source(&ctx, config)
        .ok_or_else(|| format!("provider {kind} does not report a block height"))?;

    let fut = source.current_height().map_err(|e| e.to_string())?;
    drive(fut, watching).await
}

async fn cmd_call(args: &[String]) -> Result<(), String> {
    let method = parse_flag(args, "--method").ok_or("--method is required")?;
    let params = match parse_flag(args, "--params") {
        Some(raw) => parse_params(&raw)?,
        None => Vec::new(),
    };
    let config = service_config(args)?;
    let watching = config.poll.is_some();

    let ctx = http_context().map_err(|e| e.to_string())?;
    let rpc = RpcService::new(&ctx, config);
    let fut = rpc.call(&method, params).map_err(|e| e.to_string())?;
    drive(fut, watching).await
}

async fn cmd_get(args: &[String]) -> Result<(), String> {
    let path = parse_flag(args, "--path").ok_or("--path is required")?;
    let query = parse_queries(args)?;
    let config = service_config(args)?;
    let watching = config.poll.is_some();

    let ctx = http_context().map_err(|e| e.to_string())?;
    let rest = RestService::new(&ctx, config);
    let pairs: Vec<(&str, &str)> = query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    let fut = rest.get(&path, &pairs).map_err(|e| e.to_string())?;
    drive(fut, watching).await
}

fn cmd_providers() {
    println!("Built-in provider profiles:\n");
    for kind in ProviderKind::ALL {
        let url = kind.default_base_url().unwrap_or("(--url required)");
        println!("  {:<13} {:<5} {url}", kind.name(), kind.service_kind());
    }
}

/// Await a one-shot call, or print every polled result until Ctrl-C.
async fn drive(mut fut: ServiceFuture, watching: bool) -> Result<(), String> {
    if !watching {
        let value = fut.await.map_err(|e| e.to_string())?;
        print_json(&value);
        return Ok(());
    }

    let mut updates = fut.notifications();
    let mut settled = false;
    let finished = loop {
        tokio::select! {
            Some(value) = updates.recv() => print_json(&value),
            outcome = &mut fut, if !settled => {
                settled = true;
                if let WatchStep::Finish(result) = after_settle(outcome) {
                    break Some(result);
                }
            }
            _ = tokio::signal::ctrl_c() => break None,
        }
    };

    fut.stop_polling();
    match finished {
        Some(result) => result,
        None => {
            tracing::info!("stopped watching");
            Ok(())
        }
    }
}

enum WatchStep {
    KeepWatching,
    Finish(Result<(), String>),
}

/// Transport failures only cost one round; a rejection from the service
/// halts polling, so watching ends there.
fn after_settle(outcome: Result<Value, ServiceError>) -> WatchStep {
    match outcome {
        Ok(value) => {
            print_json(&value);
            WatchStep::Finish(Ok(()))
        }
        Err(ServiceError::Transport(e)) => {
            tracing::warn!(error = %e, "request failed, still watching");
            WatchStep::KeepWatching
        }
        Err(e) => WatchStep::Finish(Err(e.to_string())),
    }
}

fn print_json(value: &Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Config file first, then `--url` and `--poll` on top.
fn service_config(args: &[String]) -> Result<ServiceConfig, String> {
    let mut config = match parse_flag(args, "--config") {
        Some(path) => {
            let raw = std::fs::read_to_string(&path).map_err(|e| format!("{path}: {e}"))?;
            serde_json::from_str(&raw).map_err(|e| format!("{path}: {e}"))?
        }
        None => ServiceConfig::default(),
    };
    if let Some(url) = parse_flag(args, "--url") {
        config.base_url = Some(url);
    }
    if let Some(ms) = parse_flag(args, "--poll") {
        let ms: u64 = ms.parse().map_err(|_| format!("invalid --poll value: {ms}"))?;
        config.poll = Some(IntervalConfig::from_millis(ms));
    }
    Ok(config)
}

fn parse_params(raw: &str) -> Result<Vec<Value>, String> {
    match serde_json::from_str(raw).map_err(|e| format!("invalid --params: {e}"))? {
        Value::Array(items) => Ok(items),
        _ => Err("--params must be a JSON array".into()),
    }
}

fn parse_queries(args: &[String]) -> Result<Vec<(String, String)>, String> {
    args.iter()
        .enumerate()
        .filter(|(_, a)| a.as_str() == "--query")
        .map(|(i, _)| -> Result<(String, String), String> {
            let pair = args.get(i + 1).ok_or("--query needs a K=V value")?;
            let (k, v) = pair
                .split_once('=')
                .ok_or_else(|| format!("invalid --query value: {pair}"))?;
            Ok((k.to_string(), v.to_string()))
        })
        .collect()
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}
