//! ubbmail Core Library
//!
//! Parses UniCredit Bulbank transaction notifications into typed records:
//! - Attachment decoding (base64url over UTF-16LE HTML)
//! - Fixed-template field location and head parsing
//! - Transaction type classification over bilingual type tokens
//! - Per-type payment detail extraction with a never-failing fallback
//! - SQLite storage and a concurrent batch ingestor over a document source

pub mod assemble;
pub mod classify;
pub mod config;
pub mod db;
pub mod decode;
pub mod details;
pub mod document;
pub mod error;
pub mod head;
pub mod ingest;
pub mod models;
pub mod parser;
pub mod source;

/// Test utilities including a notification document builder
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use classify::{Classification, Classifier};
pub use config::{Config, ExtractionDefaults, IngestConfig, ParserConfig};
pub use db::{Database, InsertSummary};
pub use decode::{decode_attachment, encode_attachment};
pub use details::{ExtractionError, Strategy};
pub use error::{Error, Result};
pub use ingest::{IngestStats, Ingestor};
pub use models::{
    CardOperationDetails, DefaultDetails, EntryType, HeadFields, PaymentDetails,
    TransactionRecord, TransactionType, TransferDetails,
};
pub use parser::NotificationParser;
pub use source::{Backoff, DirectorySource, DocumentSource, IdPage};
