//! Single-attachment commands

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ubbmail_core::{decode_attachment, encode_attachment, Config, NotificationParser, TransactionRecord};

pub fn cmd_decode(file: &Path) -> Result<()> {
    let encoded = read_file(file)?;
    let html = decode_attachment(&encoded)
        .with_context(|| format!("Failed to decode {}", file.display()))?;
    println!("{}", html);
    Ok(())
}

pub fn cmd_encode(file: &Path) -> Result<()> {
    let html = read_file(file)?;
    println!("{}", encode_attachment(&html));
    Ok(())
}

pub fn cmd_parse(config: &Config, file: &Path, id: Option<&str>) -> Result<()> {
    let record = parse_file(config, file, id)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// Parse an attachment file; the id defaults to the file stem
pub fn parse_file(config: &Config, file: &Path, id: Option<&str>) -> Result<TransactionRecord> {
    let id = match id {
        Some(id) => id.to_string(),
        None => file
            .file_stem()
            .and_then(|s| s.to_str())
            .with_context(|| format!("Cannot derive an id from {}; pass --id", file.display()))?
            .to_string(),
    };

    let encoded = read_file(file)?;
    let parser = NotificationParser::new(config.parser.clone());
    parser
        .parse_attachment(&id, &encoded)
        .with_context(|| format!("Failed to parse {}", file.display()))
}

fn read_file(file: &Path) -> Result<String> {
    fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))
}
