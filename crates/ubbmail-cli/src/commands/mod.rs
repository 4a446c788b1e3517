//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_db, load_config)
//! - `parse` - Single-attachment commands (decode, encode, parse)
//! - `ingest` - Batch ingest of an attachment directory
//! - `transactions` - Stored transaction listing

pub mod core;
pub mod ingest;
pub mod parse;
pub mod transactions;

// Re-export command functions for main.rs
pub use self::core::*;
pub use ingest::*;
pub use parse::*;
pub use transactions::*;

/// Truncate a string to at most `max` characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
