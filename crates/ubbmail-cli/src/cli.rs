//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ubbmail - Parse UniCredit Bulbank transaction notifications
#[derive(Parser)]
#[command(name = "ubbmail")]
#[command(about = "Turns bank notification attachments into transaction records", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "ubbmail.db", global = true)]
    pub db: PathBuf,

    /// Config file (defaults to ~/.local/share/ubbmail/config.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Print the HTML document inside an encoded attachment
    Decode {
        /// Attachment file (base64url text)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Encode an HTML file the way the bank sends it
    Encode {
        /// HTML file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Parse one attachment and print the record as JSON
    Parse {
        /// Attachment file (base64url text)
        #[arg(short, long)]
        file: PathBuf,

        /// Message id (defaults to the file name without extension)
        #[arg(long)]
        id: Option<String>,
    },

    /// Parse and store every attachment in a directory
    Ingest {
        /// Directory of <id>.b64 attachment files
        #[arg(short, long)]
        dir: PathBuf,
    },

    /// List stored transactions
    Transactions {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },
}
