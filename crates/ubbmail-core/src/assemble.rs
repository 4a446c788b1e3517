//! Final assembly of a transaction record

use crate::models::{HeadFields, PaymentDetails, TransactionRecord, TransactionType};

/// Combine the parsed head, the classified type and the payment details
pub fn assemble(
    id: impl Into<String>,
    head: HeadFields,
    transaction_type: TransactionType,
    payment_details: PaymentDetails,
) -> TransactionRecord {
    let HeadFields {
        date,
        reference,
        value_date,
        sum,
        entry_type,
    } = head;

    TransactionRecord {
        id: id.into(),
        date,
        reference,
        value_date,
        sum,
        entry_type,
        transaction_type,
        payment_details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DefaultDetails, EntryType};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_assemble_moves_every_field() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let head = HeadFields {
            date: date.and_hms_opt(9, 0, 0).unwrap(),
            reference: "REF42".to_string(),
            value_date: date,
            sum: dec!(10.00),
            entry_type: EntryType::Credit,
        };
        let details = PaymentDetails::Default(DefaultDetails {
            recipient: "<N/A>".to_string(),
        });

        let record = assemble("msg-1", head, TransactionType::Unknown, details.clone());

        assert_eq!(record.id, "msg-1");
        assert_eq!(record.reference, "REF42");
        assert_eq!(record.value_date, date);
        assert_eq!(record.sum, dec!(10.00));
        assert_eq!(record.entry_type, EntryType::Credit);
        assert_eq!(record.transaction_type, TransactionType::Unknown);
        assert_eq!(record.payment_details, details);
    }
}
