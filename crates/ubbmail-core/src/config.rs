//! Parser and ingest configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/ubbmail/config.toml)
//! 2. Built-in defaults for anything the file leaves out
//!
//! ```toml
//! [parser]
//! long_line_threshold = 100
//!
//! [defaults]
//! institution_name = "UNICREDIT BULBANK"
//! institution_iban = "N/A"
//!
//! [ingest]
//! page_size = 50
//! max_retry_depth = 5
//! retry_base_secs = 1
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::classify::DEFAULT_LONG_LINE_THRESHOLD;
use crate::error::{Error, Result};

/// Fixed values substituted when a notification does not carry them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionDefaults {
    /// Recipient of fees charged by the bank itself
    pub institution_name: String,
    /// IBAN reported for fees charged by the bank itself
    pub institution_iban: String,
    /// Description used when a fee carries no text
    pub missing_description: String,
    /// Recipient of the fallback payment details
    pub unknown_recipient: String,
}

impl Default for ExtractionDefaults {
    fn default() -> Self {
        Self {
            institution_name: "UNICREDIT BULBANK".to_string(),
            institution_iban: "N/A".to_string(),
            missing_description: "N/A".to_string(),
            unknown_recipient: "<N/A>".to_string(),
        }
    }
}

/// Everything the notification parser needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    pub long_line_threshold: usize,
    pub defaults: ExtractionDefaults,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            long_line_threshold: DEFAULT_LONG_LINE_THRESHOLD,
            defaults: ExtractionDefaults::default(),
        }
    }
}

/// Batch ingest settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    /// Ids requested from the source per page
    pub page_size: usize,
    /// Retries per fetch before giving up
    pub max_retry_depth: u32,
    /// Delay before the first retry; doubles each time
    pub retry_base: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            max_retry_depth: 5,
            retry_base: Duration::from_secs(1),
        }
    }
}

/// Full configuration file
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub parser: ParserConfig,
    pub ingest: IngestConfig,
}

impl Config {
    /// Load from `path`, the default override location, or built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let resolved = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        match resolved {
            Some(p) => {
                let content = fs::read_to_string(&p).map_err(|e| {
                    Error::Config(format!("Failed to read config {}: {}", p.display(), e))
                })?;
                Self::parse(&content)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse TOML content, keeping defaults for missing keys
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = Config::default();

        if let Some(parser) = raw.parser {
            if let Some(threshold) = parser.long_line_threshold {
                if threshold == 0 {
                    return Err(Error::Config(
                        "parser.long_line_threshold must be positive".to_string(),
                    ));
                }
                config.parser.long_line_threshold = threshold;
            }
        }

        if let Some(defaults) = raw.defaults {
            let target = &mut config.parser.defaults;
            if let Some(v) = defaults.institution_name {
                target.institution_name = v;
            }
            if let Some(v) = defaults.institution_iban {
                target.institution_iban = v;
            }
            if let Some(v) = defaults.missing_description {
                target.missing_description = v;
            }
            if let Some(v) = defaults.unknown_recipient {
                target.unknown_recipient = v;
            }
        }

        if let Some(ingest) = raw.ingest {
            if let Some(page_size) = ingest.page_size {
                if page_size == 0 {
                    return Err(Error::Config("ingest.page_size must be positive".to_string()));
                }
                config.ingest.page_size = page_size;
            }
            if let Some(depth) = ingest.max_retry_depth {
                config.ingest.max_retry_depth = depth;
            }
            if let Some(secs) = ingest.retry_base_secs {
                config.ingest.retry_base = Duration::from_secs(secs);
            }
        }

        Ok(config)
    }
}

/// Default override location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("ubbmail").join("config.toml"))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    parser: Option<RawParser>,
    defaults: Option<RawDefaults>,
    ingest: Option<RawIngest>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParser {
    long_line_threshold: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDefaults {
    institution_name: Option<String>,
    institution_iban: Option<String>,
    missing_description: Option<String>,
    unknown_recipient: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawIngest {
    page_size: Option<usize>,
    max_retry_depth: Option<u32>,
    retry_base_secs: Option<u64>,
}
