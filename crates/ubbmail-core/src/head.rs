//! Typed parsing of the notification head cells

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use tracing::warn;

use crate::document::HeadCells;
use crate::error::{Error, Result};
use crate::models::{EntryType, HeadFields};

const DATE_TIME_FORMAT: &str = "%d.%m.%Y %H:%M:%S";
const DATE_FORMAT: &str = "%d.%m.%Y";

/// Parse the five head cells into typed values
///
/// An unrecognised entry-type token is not an error here: it becomes
/// [`EntryType::Invalid`] and is logged.
pub fn parse_head(cells: &HeadCells) -> Result<HeadFields> {
    let date = parse_date_time(&cells.date)?;

    let reference = cells.reference.trim();
    if reference.is_empty() {
        return Err(Error::malformed("empty reference"));
    }

    let value_date = parse_value_date(&cells.value_date)?;
    let sum = parse_sum(&cells.sum)?;

    let entry_type = EntryType::from_token(&cells.entry_type).unwrap_or_else(|e| {
        warn!(reference = %reference, error = %e, "Entry type not recognised, marking INVALID");
        EntryType::Invalid
    });

    Ok(HeadFields {
        date,
        reference: reference.to_string(),
        value_date,
        sum,
        entry_type,
    })
}

fn parse_date_time(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), DATE_TIME_FORMAT)
        .map_err(|_| Error::malformed(format!("unable to parse date: {:?}", s)))
}

fn parse_value_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| Error::malformed(format!("unable to parse value date: {:?}", s)))
}

/// Parse an amount into its unsigned magnitude
fn parse_sum(s: &str) -> Result<Decimal> {
    parse_amount(s)
        .map(|d| d.abs())
        .ok_or_else(|| Error::malformed(format!("unable to parse sum: {:?}", s)))
}

/// Parse a signed amount written with either separator convention
///
/// Whitespace is dropped. Without a `.`, a final `,` followed by one or two
/// digits is the decimal separator (`12,90`). Every other `,` is grouping
/// (`1,234.50`, `1,234`).
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();

    let decimal_comma = if compact.contains('.') {
        None
    } else {
        compact.rfind(',').filter(|&i| {
            let tail = &compact[i + 1..];
            (1..=2).contains(&tail.len()) && tail.chars().all(|c| c.is_ascii_digit())
        })
    };

    let normalized: String = compact
        .char_indices()
        .filter_map(|(i, c)| match c {
            ',' if Some(i) == decimal_comma => Some('.'),
            ',' => None,
            _ => Some(c),
        })
        .collect();

    Decimal::from_str(&normalized).ok()
}
