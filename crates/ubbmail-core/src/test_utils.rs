//! Test utilities for ubbmail-core
//!
//! [`NotificationBuilder`] renders documents in the bank's template so tests
//! can drive the whole pipeline from an encoded attachment.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::decode::encode_attachment;
use crate::models::{
    DefaultDetails, EntryType, PaymentDetails, TransactionRecord, TransactionType, TransferDetails,
};

/// Builds a notification document
#[derive(Debug, Clone)]
pub struct NotificationBuilder {
    date: String,
    reference: String,
    value_date: String,
    sum: String,
    entry_type: String,
    type_line: String,
    details: Vec<String>,
    additional: Option<Vec<String>>,
}

impl NotificationBuilder {
    /// Start a document whose first detail line is `type_line`
    pub fn new(type_line: &str) -> Self {
        Self {
            date: "05.03.2024 14:22:01".to_string(),
            reference: "1234ABCD5678".to_string(),
            value_date: "05.03.2024".to_string(),
            sum: "4.48".to_string(),
            entry_type: "ДТ".to_string(),
            type_line: type_line.to_string(),
            details: Vec::new(),
            additional: None,
        }
    }

    pub fn date(mut self, date: &str) -> Self {
        self.date = date.to_string();
        self
    }

    pub fn reference(mut self, reference: &str) -> Self {
        self.reference = reference.to_string();
        self
    }

    pub fn value_date(mut self, value_date: &str) -> Self {
        self.value_date = value_date.to_string();
        self
    }

    pub fn sum(mut self, sum: &str) -> Self {
        self.sum = sum.to_string();
        self
    }

    pub fn entry_type(mut self, token: &str) -> Self {
        self.entry_type = token.to_string();
        self
    }

    /// Add a detail line. The text is inserted as HTML, so `<wbr>` may be
    /// used to simulate renderer wrapping.
    pub fn detail(mut self, line: &str) -> Self {
        self.details.push(line.to_string());
        self
    }

    /// Add a line to the additional-details cell
    pub fn additional(mut self, line: &str) -> Self {
        self.additional.get_or_insert_with(Vec::new).push(line.to_string());
        self
    }

    /// Render the HTML document
    pub fn html(&self) -> String {
        let mut detail_cell = self.type_line.clone();
        for line in &self.details {
            detail_cell.push_str("<br>");
            detail_cell.push_str(line);
        }

        let additional_cells = match &self.additional {
            Some(lines) => format!("<td>&nbsp;</td><td>{}</td>", lines.join("<br>")),
            None => String::new(),
        };

        format!(
            r#"<html><head><meta charset="utf-16"></head><body>
<table>
  <tr><th>Дата</th><th>Референция</th><th>Вальор</th><th>Сума</th><th>Вид</th></tr>
  <tr><td>{date}</td><td><span><b>{reference}</b></span></td><td>{value_date}</td><td>{sum}</td><td>{entry_type}</td></tr>
  <tr><td>{detail_cell}</td>{additional_cells}</tr>
</table>
</body></html>"#,
            date = self.date,
            reference = self.reference,
            value_date = self.value_date,
            sum = self.sum,
            entry_type = self.entry_type,
            detail_cell = detail_cell,
            additional_cells = additional_cells,
        )
    }

    /// Render and encode as the mail attachment body
    pub fn encoded(&self) -> String {
        encode_attachment(&self.html())
    }
}

/// A valid record for storage tests
pub fn sample_record(id: &str, reference: &str, transaction_type: TransactionType) -> TransactionRecord {
    let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    TransactionRecord {
        id: id.to_string(),
        date: day.and_hms_opt(14, 22, 1).unwrap(),
        reference: reference.to_string(),
        value_date: day,
        sum: Decimal::new(448, 2),
        entry_type: EntryType::Debit,
        transaction_type,
        payment_details: match transaction_type {
            TransactionType::Unknown => PaymentDetails::Default(DefaultDetails {
                recipient: "<N/A>".to_string(),
            }),
            _ => PaymentDetails::Transfer(TransferDetails {
                recipient: "ИВАН ИВАНОВ".to_string(),
                recipient_iban: "BG80BNBG96611020345678".to_string(),
                description: "НАЕМ".to_string(),
            }),
        },
    }
}
