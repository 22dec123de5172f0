mod config;
mod loader;
mod models;
mod server;
mod storage;
mod transform;
mod utils;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;
use crate::loader::load_table;
use crate::storage::UploadStore;
use crate::transform::transform;

#[derive(Parser)]
#[command(name = "candle-feed", about = "OHLC CSV → candlestick chart feed", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Run the upload + chart data HTTP server
    Serve {
        /// Port to listen on (overrides server.port)
        #[arg(short, long, env = "CANDLE_PORT")]
        port: Option<u16>,
    },

    /// Convert one CSV file and print the chart records as JSON
    Convert {
        /// Path to the CSV file
        path: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List uploaded CSV files
    Files,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "candle_feed=info,warn",
        1 => "candle_feed=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::new(filter))
        .init();

    let mut config = AppConfig::load()?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            server::serve(config).await?;
        }

        Command::Convert { path, pretty } => {
            let timer = utils::Timer::start(format!("convert {:?}", path));
            let table = load_table(&path)?;
            if table.is_empty() {
                warn!("{:?} has a header but no data rows", path);
            }
            let records = transform(&table).with_context(|| format!("{:?}", path))?;

            let json = if pretty {
                serde_json::to_string_pretty(&records)?
            } else {
                serde_json::to_string(&records)?
            };
            println!("{}", json);

            info!(
                "{} rows → {} records in {:.2?}",
                utils::fmt_count(table.len()),
                utils::fmt_count(records.len()),
                timer.elapsed()
            );
        }

        Command::Files => {
            let store = UploadStore::open(&config.storage.upload_dir)?;
            let files = store.list()?;
            if files.is_empty() {
                println!("No files in {:?} — upload one first.", store.root());
            } else {
                println!("{} files:", files.len());
                for f in &files {
                    println!("  {}", f);
                }
            }
        }
    }

    Ok(())
}
