//! Card operations: POS payments, ATM withdrawals, online card payments

use std::sync::OnceLock;

use regex::Regex;

use super::{join_lines, ExtractionError, Strategy};
use crate::head::parse_amount;
use crate::models::{CardOperationDetails, PaymentDetails};

const STRATEGY: Strategy = Strategy::CardOperation;

/// `<instrument> <sum> <currency> авт.код:<code>-<merchant>[/<location>]`
fn card_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?P<instrument>\S+)\s+(?P<sum>\d+(?:[.,]\d+)*)\s+(?P<currency>[A-Z]{3})\s+авт\.код:\s*\S*?-(?P<merchant>[^/]+)",
        )
        .expect("invalid card operation regex")
    })
}

pub(super) fn extract(lines: &[String]) -> Result<PaymentDetails, ExtractionError> {
    let text = join_lines(lines);
    let caps = card_re()
        .captures(&text)
        .ok_or(ExtractionError::NoMatch { strategy: STRATEGY })?;

    let sum = parse_amount(&caps["sum"]).ok_or(ExtractionError::MissingField {
        strategy: STRATEGY,
        field: "sum",
    })?;

    let recipient = caps["merchant"].trim();
    if recipient.is_empty() {
        return Err(ExtractionError::MissingField {
            strategy: STRATEGY,
            field: "merchant",
        });
    }

    Ok(PaymentDetails::CardOperation(CardOperationDetails {
        recipient: recipient.to_string(),
        instrument: caps["instrument"].to_string(),
        sum,
        currency: caps["currency"].to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_pos_payment() {
        let details = extract(&lines(&[
            "ПОС 4.48 BGN авт.код:833023-GLOBAL RETAIL HOLDING EOO/VARNA/PAN:4402****5296/CT:01",
        ]))
        .unwrap();
        assert_eq!(
            details,
            PaymentDetails::CardOperation(CardOperationDetails {
                recipient: "GLOBAL RETAIL HOLDING EOO".to_string(),
                instrument: "ПОС".to_string(),
                sum: dec!(4.48),
                currency: "BGN".to_string(),
            })
        );
    }

    #[test]
    fn test_match_spans_lines() {
        let details = extract(&lines(&["ATM 200 BGN", "авт.код:000111-UNICREDIT ATM MLADOST"])).unwrap();
        match details {
            PaymentDetails::CardOperation(card) => {
                assert_eq!(card.instrument, "ATM");
                assert_eq!(card.sum, dec!(200));
                assert_eq!(card.recipient, "UNICREDIT ATM MLADOST");
            }
            other => panic!("unexpected details: {:?}", other),
        }
    }

    #[test]
    fn test_comma_decimal() {
        let details = extract(&lines(&["ПОС 12,90 EUR авт.код:A1-SHOP"])).unwrap();
        match details {
            PaymentDetails::CardOperation(card) => {
                assert_eq!(card.sum, dec!(12.90));
                assert_eq!(card.currency, "EUR");
            }
            other => panic!("unexpected details: {:?}", other),
        }
    }

    #[test]
    fn test_grouped_sum() {
        let details = extract(&lines(&["ПОС 1,234.50 BGN авт.код:A1-SHOP"])).unwrap();
        match details {
            PaymentDetails::CardOperation(card) => assert_eq!(card.sum, dec!(1234.50)),
            other => panic!("unexpected details: {:?}", other),
        }
    }

    #[test]
    fn test_no_match() {
        assert_eq!(
            extract(&lines(&["something else entirely"])),
            Err(ExtractionError::NoMatch { strategy: STRATEGY })
        );
        assert_eq!(
            extract(&[]),
            Err(ExtractionError::NoMatch { strategy: STRATEGY })
        );
    }

    #[test]
    fn test_blank_merchant() {
        assert!(matches!(
            extract(&lines(&["ПОС 1.00 BGN авт.код:1-   /SOFIA"])),
            Err(ExtractionError::MissingField { field: "merchant", .. })
        ));
    }
}
