//! Domestic transfers and payments
//!
//! The counterparty comes from the additional-details cell (IBAN first, name
//! second). The detail lines are the payment description.

use super::{join_lines, ExtractionError};
use crate::models::{PaymentDetails, TransferDetails};

const IBAN_LINE: usize = 0;
const NAME_LINE: usize = 1;

pub(super) fn extract(
    lines: &[String],
    additional: &[String],
) -> Result<PaymentDetails, ExtractionError> {
    let field = |idx: usize| additional.get(idx).map(|s| s.trim().to_string()).unwrap_or_default();

    Ok(PaymentDetails::Transfer(TransferDetails {
        recipient: field(NAME_LINE),
        recipient_iban: field(IBAN_LINE),
        description: join_lines(lines),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_transfer() {
        let details = extract(
            &lines(&["НАЕМ", "МАРТ 2024"]),
            &lines(&["BG80BNBG96611020345678", "ИВАН ИВАНОВ"]),
        )
        .unwrap();
        assert_eq!(
            details,
            PaymentDetails::Transfer(TransferDetails {
                recipient: "ИВАН ИВАНОВ".to_string(),
                recipient_iban: "BG80BNBG96611020345678".to_string(),
                description: "НАЕМ МАРТ 2024".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_additional_details() {
        let details = extract(&lines(&["ЗАПЛАТА"]), &[]).unwrap();
        assert_eq!(
            details,
            PaymentDetails::Transfer(TransferDetails {
                recipient: String::new(),
                recipient_iban: String::new(),
                description: "ЗАПЛАТА".to_string(),
            })
        );
    }

    #[test]
    fn test_iban_only() {
        match extract(&[], &lines(&["BG80BNBG96611020345678"])).unwrap() {
            PaymentDetails::Transfer(t) => {
                assert_eq!(t.recipient_iban, "BG80BNBG96611020345678");
                assert_eq!(t.recipient, "");
                assert_eq!(t.description, "");
            }
            other => panic!("unexpected details: {:?}", other),
        }
    }
}
