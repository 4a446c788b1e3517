//! ubbmail CLI - UniCredit Bulbank notification parser
//!
//! Usage:
//!   ubbmail init                  Initialize database
//!   ubbmail parse --file F.b64    Parse one attachment to JSON
//!   ubbmail ingest --dir DIR      Parse and store a directory of attachments
//!   ubbmail transactions          List stored transactions

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Decode { file } => commands::cmd_decode(&file),
        Commands::Encode { file } => commands::cmd_encode(&file),
        Commands::Parse { file, id } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_parse(&config, &file, id.as_deref())
        }
        Commands::Ingest { dir } => {
            let config = commands::load_config(cli.config.as_deref())?;
            let db = commands::open_db(&cli.db)?;
            commands::cmd_ingest(&db, &config, &dir).await
        }
        Commands::Transactions { limit } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_transactions_list(&db, limit)
        }
    }
}
