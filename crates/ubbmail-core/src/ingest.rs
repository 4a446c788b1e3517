//! Batch ingest: page through a document source, parse, store
//!
//! Each page is fetched and parsed concurrently. A document that fails to
//! fetch or parse is logged and counted; it never stops the batch.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::IngestConfig;
use crate::db::Database;
use crate::error::Result;
use crate::models::{EntryType, TransactionRecord};
use crate::parser::NotificationParser;
use crate::source::{Backoff, DocumentSource};

/// Counters for one ingest run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Ids listed by the source
    pub seen: usize,
    /// Ids skipped because an earlier run already handled them: stored, or
    /// skipped as a duplicate or INVALID record. Ids that failed to fetch or
    /// parse are not remembered and are tried again on the next run.
    pub already_stored: usize,
    pub inserted: usize,
    /// Parsed records whose business key was already stored
    pub duplicates: usize,
    /// Parsed records with an INVALID entry type
    pub rejected_invalid: usize,
    /// Documents that could not be fetched or parsed
    pub failed: usize,
}

/// Drives a document source into the database
pub struct Ingestor {
    source: Arc<dyn DocumentSource>,
    db: Database,
    parser: Arc<NotificationParser>,
    config: IngestConfig,
}

impl Ingestor {
    pub fn new(
        source: Arc<dyn DocumentSource>,
        db: Database,
        parser: Arc<NotificationParser>,
        config: IngestConfig,
    ) -> Self {
        Self {
            source,
            db,
            parser,
            config,
        }
    }

    fn backoff(&self) -> Backoff {
        Backoff::new(self.config.retry_base, self.config.max_retry_depth)
    }

    /// Ingest every id the source lists
    pub async fn run(&self) -> Result<IngestStats> {
        let mut stats = IngestStats::default();
        let mut page_token: Option<String> = None;
        let backoff = self.backoff();

        loop {
            let page = backoff
                .retry("list_ids", || {
                    self.source.list_ids(page_token.clone(), self.config.page_size)
                })
                .await?;

            debug!(count = page.ids.len(), "Processing page");
            self.ingest_page(page.ids, &mut stats).await?;

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        info!(
            seen = stats.seen,
            already_stored = stats.already_stored,
            inserted = stats.inserted,
            duplicates = stats.duplicates,
            rejected_invalid = stats.rejected_invalid,
            failed = stats.failed,
            "Ingest complete"
        );

        Ok(stats)
    }

    async fn ingest_page(&self, ids: Vec<String>, stats: &mut IngestStats) -> Result<()> {
        let backoff = self.backoff();
        let mut tasks = JoinSet::new();

        for id in ids {
            stats.seen += 1;
            if self.db.document_processed(&id)? {
                stats.already_stored += 1;
                continue;
            }

            let source = Arc::clone(&self.source);
            let parser = Arc::clone(&self.parser);
            tasks.spawn(async move {
                let result = match backoff.retry(&id, || source.fetch_attachment(&id)).await {
                    Ok(encoded) => parser.parse_attachment(&id, &encoded),
                    Err(e) => Err(e),
                };
                (id, result)
            });
        }

        let mut records: Vec<TransactionRecord> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(record))) => {
                    if record.entry_type == EntryType::Invalid {
                        warn!(
                            id = %record.id,
                            reference = %record.reference,
                            "Rejecting record with INVALID entry type"
                        );
                    }
                    records.push(record);
                }
                Ok((id, Err(e))) => {
                    error!(id = %id, error = %e, "Failed to ingest document");
                    stats.failed += 1;
                }
                Err(e) => {
                    error!(error = %e, "Ingest task panicked");
                    stats.failed += 1;
                }
            }
        }

        // Completion order is arbitrary; keep inserts deterministic
        records.sort_by(|a, b| a.id.cmp(&b.id));

        // INVALID records go through too so the bulk insert marks them processed
        let summary = self.db.insert_transactions(&records)?;
        stats.inserted += summary.inserted;
        stats.duplicates += summary.duplicates;
        stats.rejected_invalid += summary.invalid;

        Ok(())
    }
}
