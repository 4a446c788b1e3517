//! Cross-border transfers and the fees charged for them
//!
//! The bank prints the SWIFT-style payload with its segments in reverse order
//! across lines. Reversed and joined with commas it reads:
//!
//! ```text
//! AZV-<recipient>,<f1>,<f2>,<description>,<f4>,<f5>,<f6>,<iban>
//! ```

use super::{ExtractionError, Strategy};
use crate::config::ExtractionDefaults;
use crate::models::{PaymentDetails, TransferDetails};

const MARKER: &str = "AZV-";

const RECIPIENT_TOKEN: usize = 0;
const DESCRIPTION_TOKEN: usize = 3;
const IBAN_TOKEN: usize = 7;

fn tokens(lines: &[String]) -> Vec<String> {
    let joined = lines
        .iter()
        .rev()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(",");

    joined
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

pub(super) fn extract(lines: &[String]) -> Result<PaymentDetails, ExtractionError> {
    let strategy = Strategy::CrossBorderTransfer;
    let mut tokens = tokens(lines);

    if tokens.len() <= IBAN_TOKEN {
        return Err(ExtractionError::NoMatch { strategy });
    }

    if let Some(stripped) = tokens[RECIPIENT_TOKEN].strip_prefix(MARKER) {
        tokens[RECIPIENT_TOKEN] = stripped.trim().to_string();
    }

    let recipient = std::mem::take(&mut tokens[RECIPIENT_TOKEN]);
    if recipient.is_empty() {
        return Err(ExtractionError::MissingField {
            strategy,
            field: "recipient",
        });
    }

    Ok(PaymentDetails::Transfer(TransferDetails {
        recipient,
        recipient_iban: std::mem::take(&mut tokens[IBAN_TOKEN]),
        description: std::mem::take(&mut tokens[DESCRIPTION_TOKEN]),
    }))
}

/// The fee notification only names the transfer it was charged for
pub(super) fn extract_fee(
    lines: &[String],
    defaults: &ExtractionDefaults,
) -> Result<PaymentDetails, ExtractionError> {
    let strategy = Strategy::CrossBorderTransferFee;
    let joined = lines.join(" ");

    let start = joined
        .find(MARKER)
        .ok_or(ExtractionError::NoMatch { strategy })?
        + MARKER.len();
    let rest = &joined[start..];
    let description = rest.split(',').next().unwrap_or_default().trim();

    if description.is_empty() {
        return Err(ExtractionError::MissingField {
            strategy,
            field: "description",
        });
    }

    Ok(PaymentDetails::Transfer(TransferDetails {
        recipient: defaults.institution_name.clone(),
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

    fn transfer(details: PaymentDetails) -> TransferDetails {
        match details {
            PaymentDetails::Transfer(t) => t,
            other => panic!("unexpected details: {:?}", other),
        }
    }

    #[test]
    fn test_reversed_segments() {
        let details = extract(&lines(&[
            "DE89370400440532013000",
            "SHA,EUR",
            "INVOICE 2024-117,DEUTDEFF",
            "AZV-ACME GMBH,BERLIN,DE",
        ]))
        .unwrap();
        let t = transfer(details);
        assert_eq!(t.recipient, "ACME GMBH");
        assert_eq!(t.description, "INVOICE 2024-117");
        assert_eq!(t.recipient_iban, "DE89370400440532013000");
    }

    #[test]
    fn test_single_line_payload() {
        let details =
            extract(&lines(&["IBAN1", "AZV-NAME,A,B,DESC,C,D,E"])).unwrap();
        let t = transfer(details);
        assert_eq!(t.recipient, "NAME");
        assert_eq!(t.description, "DESC");
        assert_eq!(t.recipient_iban, "IBAN1");
    }

    #[test]
    fn test_without_marker() {
        let t = transfer(extract(&lines(&["IBAN", "NAME,A,B,DESC,C,D,E"])).unwrap());
        assert_eq!(t.recipient, "NAME");
    }

    #[test]
    fn test_too_few_segments() {
        assert_eq!(
            extract(&lines(&["AZV-NAME,A,B"])),
            Err(ExtractionError::NoMatch {
                strategy: Strategy::CrossBorderTransfer
            })
        );
    }

    #[test]
    fn test_empty_recipient() {
        assert!(matches!(
            extract(&lines(&["IBAN", "AZV-,A,B,DESC,C,D,E"])),
            Err(ExtractionError::MissingField { field: "recipient", .. })
        ));
    }

    #[test]
    fn test_fee_uses_institution() {
        let defaults = ExtractionDefaults::default();
        let t = transfer(
            extract_fee(&lines(&["ТАКСА ЗА", "AZV-ACME GMBH,BERLIN"]), &defaults).unwrap(),
        );
        assert_eq!(t.description, "ACME GMBH");
        assert_eq!(t.recipient, "UNICREDIT BULBANK");
        assert_eq!(t.recipient_iban, "N/A");
    }

    #[test]
    fn test_fee_without_marker() {
        assert_eq!(
            extract_fee(&lines(&["ACME"]), &ExtractionDefaults::default()),
            Err(ExtractionError::NoMatch {
                strategy: Strategy::CrossBorderTransferFee
            })
        );
    }
}
