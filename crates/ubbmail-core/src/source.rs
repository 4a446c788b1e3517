//! Where notification attachments come from
//!
//! - `DocumentSource` is the interface any mailbox adapter implements
//! - `DirectorySource` serves `*.b64` attachment dumps from a local directory
//! - `Backoff` retries flaky source calls with capped exponential delay

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Extension of attachment files served by [`DirectorySource`]
pub const ATTACHMENT_EXTENSION: &str = "b64";

/// One page of message ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdPage {
    pub ids: Vec<String>,
    /// Token for the next page; `None` once the stream is exhausted
    pub next_page_token: Option<String>,
}

/// Supplier of encoded notification attachments
///
/// Implementations should be Send + Sync so the ingestor can fetch from
/// many tasks at once.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// List up to `page_size` message ids, continuing from `page_token`
    async fn list_ids(&self, page_token: Option<String>, page_size: usize) -> Result<IdPage>;

    /// Fetch the encoded attachment body of one message
    async fn fetch_attachment(&self, id: &str) -> Result<String>;
}

/// Attachments stored as `<id>.b64` files in one directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn all_ids(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await.map_err(|e| {
            Error::Source(format!("Failed to read {}: {}", self.dir.display(), e))
        })?;

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ATTACHMENT_EXTENSION) {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                continue;
            }
            match path.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => ids.push(stem.to_string()),
                None => warn!(path = %path.display(), "Skipping attachment with non UTF-8 name"),
            }
        }

        ids.sort();
        Ok(ids)
    }
}

#[async_trait]
impl DocumentSource for DirectorySource {
    async fn list_ids(&self, page_token: Option<String>, page_size: usize) -> Result<IdPage> {
        if page_size == 0 {
            return Err(Error::Source("page size must be positive".to_string()));
        }

        let ids = self.all_ids().await?;
        let start = match &page_token {
            Some(last) => ids.partition_point(|id| id <= last),
            None => 0,
        };

        let page: Vec<String> = ids.iter().skip(start).take(page_size).cloned().collect();
        let next_page_token = if start + page.len() < ids.len() {
            page.last().cloned()
        } else {
            None
        };

        debug!(
            dir = %self.dir.display(),
            count = page.len(),
            more = next_page_token.is_some(),
            "Listed attachments"
        );

        Ok(IdPage {
            ids: page,
            next_page_token,
        })
    }

    async fn fetch_attachment(&self, id: &str) -> Result<String> {
        if id.is_empty() || id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(Error::Source(format!("Invalid attachment id: {:?}", id)));
        }

        let path = self.dir.join(format!("{}.{}", id, ATTACHMENT_EXTENSION));
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| Error::Source(format!("Failed to read {}: {}", path.display(), e)))
    }
}

/// Capped exponential retry
///
/// Retry `n` (counting from zero) waits `base * 2^n`. After `max_depth`
/// retries the last error is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub base: Duration,
    pub max_depth: u32,
}

impl Backoff {
    pub fn new(base: Duration, max_depth: u32) -> Self {
        Self { base, max_depth }
    }

    /// Delay before retry number `depth`
    pub fn delay(&self, depth: u32) -> Duration {
        self.base.saturating_mul(2u32.saturating_pow(depth))
    }

    /// Run `op` until it succeeds or retries run out
    pub async fn retry<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut depth = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if depth < self.max_depth => {
                    let delay = self.delay(depth);
                    warn!(
                        label = %label,
                        attempt = depth + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying"
                    );
                    tokio::time::sleep(delay).await;
                    depth += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
