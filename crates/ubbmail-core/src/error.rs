//! Error types for ubbmail

use thiserror::Error;

use crate::models::TransactionType;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Decode error (input length {length}): {reason}")]
    Decode { length: usize, reason: String },

    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    #[error("Unrecognised entry type: {0:?}")]
    UnrecognisedEntryType(String),

    #[error("Unsupported transaction type: {0}")]
    UnsupportedTransactionType(TransactionType),

    #[error("Duplicate transaction: {reference} ({transaction_type})")]
    Duplicate {
        reference: String,
        transaction_type: TransactionType,
    },

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Document source error: {0}")]
    Source(String),
}

impl Error {
    pub(crate) fn decode(length: usize, reason: impl Into<String>) -> Self {
        Self::Decode {
            length,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(what: impl Into<String>) -> Self {
        Self::MalformedDocument(what.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
