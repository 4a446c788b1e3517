//! Transaction record operations

use std::str::FromStr;

use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode};
use rust_decimal::Decimal;
use tracing::debug;

use super::{format_date, format_datetime, parse_date, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{EntryType, TransactionRecord, TransactionType};

const INSERT_SQL: &str = r#"
    INSERT INTO transactions (id, date, reference, value_date, sum, entry_type, transaction_type, payment_details)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#;

const INSERT_OR_IGNORE_SQL: &str = r#"
    INSERT OR IGNORE INTO transactions (id, date, reference, value_date, sum, entry_type, transaction_type, payment_details)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#;

const MARK_PROCESSED_SQL: &str =
    "INSERT OR IGNORE INTO processed_documents (id, outcome) VALUES (?, ?)";

const SELECT_COLUMNS: &str =
    "id, date, reference, value_date, sum, entry_type, transaction_type, payment_details";

/// Outcome of a bulk insert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    pub inserted: usize,
    /// Already stored under the same id or (reference, transaction type)
    pub duplicates: usize,
    /// Refused because the entry type is INVALID
    pub invalid: usize,
}

impl Database {
    /// Check whether a source message id has already been stored
    pub fn transaction_exists(&self, id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM transactions WHERE id = ?)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Check whether a source message id was handled by an earlier bulk
    /// insert, whether it was stored or skipped as a duplicate or INVALID
    pub fn document_processed(&self, id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let processed: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM transactions WHERE id = ?1)
                 OR EXISTS(SELECT 1 FROM processed_documents WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;
        Ok(processed)
    }

    /// Insert one record
    ///
    /// Fails with [`Error::Duplicate`] when the record is already stored and
    /// with [`Error::InvalidRecord`] when its entry type is INVALID.
    pub fn insert_transaction(&self, record: &TransactionRecord) -> Result<()> {
        check_persistable(record)?;
        let conn = self.conn()?;

        match insert_row(&conn, INSERT_SQL, record) {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(Error::Duplicate {
                    reference: record.reference.clone(),
                    transaction_type: record.transaction_type,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Insert many records in one SQL transaction
    ///
    /// Duplicates and INVALID records are counted and skipped. Every record's
    /// id is marked processed with its outcome, so
    /// [`Database::document_processed`] also reports the skipped ones.
    pub fn insert_transactions(&self, records: &[TransactionRecord]) -> Result<InsertSummary> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut summary = InsertSummary::default();

        for record in records {
            if check_persistable(record).is_err() {
                debug!(id = %record.id, reference = %record.reference, "Skipping INVALID record");
                summary.invalid += 1;
                tx.execute(MARK_PROCESSED_SQL, params![record.id, "invalid"])?;
                continue;
            }

            let outcome = if insert_row(&tx, INSERT_OR_IGNORE_SQL, record)? == 0 {
                debug!(
                    id = %record.id,
                    reference = %record.reference,
                    transaction_type = %record.transaction_type,
                    "Skipping duplicate record"
                );
                summary.duplicates += 1;
                "duplicate"
            } else {
                summary.inserted += 1;
                "inserted"
            };
            tx.execute(MARK_PROCESSED_SQL, params![record.id, outcome])?;
        }

        tx.commit()?;
        Ok(summary)
    }

    /// List records, newest first
    pub fn list_transactions(&self, limit: i64, offset: i64) -> Result<Vec<TransactionRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions ORDER BY date DESC, reference LIMIT ? OFFSET ?",
            SELECT_COLUMNS
        ))?;

        let records = stmt
            .query_map(params![limit, offset], row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Get one record by source message id
    pub fn get_transaction(&self, id: &str) -> Result<Option<TransactionRecord>> {
        use rusqlite::OptionalExtension;

        let conn = self.conn()?;
        let record = conn
            .query_row(
                &format!("SELECT {} FROM transactions WHERE id = ?", SELECT_COLUMNS),
                params![id],
                row_to_record,
            )
            .optional()?;

        Ok(record)
    }

    /// Count stored records
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn check_persistable(record: &TransactionRecord) -> Result<()> {
    if record.entry_type == EntryType::Invalid {
        return Err(Error::InvalidRecord(format!(
            "{} ({}) has an INVALID entry type",
            record.reference, record.id
        )));
    }
    Ok(())
}

fn insert_row(conn: &Connection, sql: &str, record: &TransactionRecord) -> rusqlite::Result<usize> {
    let payment_details = serde_json::to_string(&record.payment_details)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    conn.execute(
        sql,
        params![
            record.id,
            format_datetime(&record.date),
            record.reference,
            format_date(&record.value_date),
            record.sum.to_string(),
            record.entry_type.as_str(),
            record.transaction_type.as_str(),
            payment_details,
        ],
    )
}

fn conversion_error<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<TransactionRecord> {
    let date_str: String = row.get(1)?;
    let value_date_str: String = row.get(3)?;
    let sum_str: String = row.get(4)?;
    let entry_type_str: String = row.get(5)?;
    let transaction_type_str: String = row.get(6)?;
    let payment_details_str: String = row.get(7)?;

    Ok(TransactionRecord {
        id: row.get(0)?,
        date: parse_datetime(&date_str).map_err(|e| conversion_error(1, e))?,
        reference: row.get(2)?,
        value_date: parse_date(&value_date_str).map_err(|e| conversion_error(3, e))?,
        sum: Decimal::from_str(&sum_str).map_err(|e| conversion_error(4, e))?,
        entry_type: EntryType::from_str(&entry_type_str).map_err(|e| conversion_error(5, e))?,
        transaction_type: TransactionType::from_str(&transaction_type_str)
            .map_err(|e| conversion_error(6, e))?,
        payment_details: serde_json::from_str(&payment_details_str)
            .map_err(|e| conversion_error(7, e))?,
    })
}
