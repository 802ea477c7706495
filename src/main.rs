//! loki-push binary
//!
//! Pushes a single log entry to Loki through a configured hook.

use clap::Parser;
use lokihook::client::Logger;
use lokihook::config::HookConfig;
use lokihook::types::{LogEntry, LogFields, LogLevel};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "loki-push")]
#[command(about = "Push a structured log entry to Grafana Loki")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/lokihook.toml")]
    config: PathBuf,

    /// Loki base URL, overrides the config file
    #[arg(long)]
    host: Option<String>,

    /// Level of the entry
    #[arg(short, long, default_value = "info")]
    level: LogLevel,

    /// Static label as key=value, repeatable
    #[arg(long = "label", value_parser = parse_key_value)]
    labels: Vec<(String, String)>,

    /// Entry field as key=value, repeatable
    #[arg(long = "field", value_parser = parse_key_value)]
    fields: Vec<(String, String)>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Message to push
    message: String,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {:?}", s))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(if args.verbose {
            "lokihook=debug,loki_push=debug,info"
        } else {
            "lokihook=info,loki_push=info,warn"
        })
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let mut config = if args.config.exists() {
        HookConfig::from_file(&args.config)?
    } else {
        info!("Config file not found, using defaults");
        HookConfig::default()
    };

    // Override config with CLI arguments
    if let Some(host) = args.host {
        config.host = host;
    }
    config.static_labels.extend(args.labels);

    let hook = config.build_hook()?;
    info!("Pushing to {}", hook.endpoint());

    let mut logger = Logger::new(LogLevel::Trace);
    logger.add_hook(Arc::new(hook));

    let fields: LogFields = args.fields.into_iter().collect();
    let entry = LogEntry::new(args.level, args.message).with_fields(fields);

    if let Err(e) = logger.log_entry(&entry).await {
        error!("Push failed: {}", e);
        std::process::exit(1);
    }

    info!("Entry pushed");
    Ok(())
}
