//! Cash withdrawals at a branch desk
//!
//! Line 0 is the purpose. Line 1 repeats it and appends the person who
//! collected the cash.

use super::{ExtractionError, Strategy};
use crate::config::ExtractionDefaults;
use crate::models::{PaymentDetails, TransferDetails};

const STRATEGY: Strategy = Strategy::DeskWithdrawal;

pub(super) fn extract(
    lines: &[String],
    defaults: &ExtractionDefaults,
) -> Result<PaymentDetails, ExtractionError> {
    let [description, second, ..] = lines else {
        return Err(ExtractionError::TooFewLines {
            strategy: STRATEGY,
            expected: 2,
            found: lines.len(),
        });
    };

    let description = description.trim();
    let recipient = second
        .trim()
        .strip_prefix(description)
        .ok_or(ExtractionError::NoMatch { strategy: STRATEGY })?
        .trim();

    if recipient.is_empty() {
        return Err(ExtractionError::MissingField {
            strategy: STRATEGY,
            field: "recipient",
        });
    }

    Ok(PaymentDetails::Transfer(TransferDetails {
        recipient: recipient.to_string(),
        recipient_iban: defaults.institution_iban.clone(),
        description: description.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_desk_withdrawal() {
        let details = extract(
            &lines(&["ТЕГЛ.НА КАСА", "ТЕГЛ.НА КАСА ИВАН ИВАНОВ ИВАНОВ"]),
            &ExtractionDefaults::default(),
        )
        .unwrap();
        assert_eq!(
            details,
            PaymentDetails::Transfer(TransferDetails {
                recipient: "ИВАН ИВАНОВ ИВАНОВ".to_string(),
                recipient_iban: "N/A".to_string(),
                description: "ТЕГЛ.НА КАСА".to_string(),
            })
        );
    }

    #[test]
    fn test_single_line() {
        assert_eq!(
            extract(&lines(&["ТЕГЛЕНЕ"]), &ExtractionDefaults::default()),
            Err(ExtractionError::TooFewLines {
                strategy: STRATEGY,
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_second_line_without_prefix() {
        assert_eq!(
            extract(&lines(&["ТЕГЛЕНЕ", "ИВАН ПЕТРОВ"]), &ExtractionDefaults::default()),
            Err(ExtractionError::NoMatch { strategy: STRATEGY })
        );
    }

    #[test]
    fn test_no_recipient() {
        assert!(matches!(
            extract(&lines(&["ТЕГЛЕНЕ", "ТЕГЛЕНЕ "]), &ExtractionDefaults::default()),
            Err(ExtractionError::MissingField { field: "recipient", .. })
        ));
    }
}
