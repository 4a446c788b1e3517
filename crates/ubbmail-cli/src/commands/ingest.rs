//! Batch ingest command

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use ubbmail_core::{Config, Database, DirectorySource, IngestStats, Ingestor, NotificationParser};

pub async fn cmd_ingest(db: &Database, config: &Config, dir: &Path) -> Result<()> {
    println!("📥 Ingesting attachments from {}...", dir.display());

    let stats = run_ingest(db, config, dir).await?;

    println!();
    println!("📊 Ingest Results");
    println!("   Seen:             {}", stats.seen);
    println!("   Already handled:  {}", stats.already_stored);
    println!("   Inserted:         {}", stats.inserted);
    println!("   Duplicates:       {}", stats.duplicates);
    println!("   Rejected invalid: {}", stats.rejected_invalid);
    println!("   Failed:           {}", stats.failed);

    if stats.failed > 0 {
        println!();
        println!("   Run with --verbose to see why documents failed.");
    }

    Ok(())
}

pub async fn run_ingest(db: &Database, config: &Config, dir: &Path) -> Result<IngestStats> {
    let ingestor = Ingestor::new(
        Arc::new(DirectorySource::new(dir)),
        db.clone(),
        Arc::new(NotificationParser::new(config.parser.clone())),
        config.ingest.clone(),
    );

    ingestor
        .run()
        .await
        .with_context(|| format!("Ingest of {} failed", dir.display()))
}
