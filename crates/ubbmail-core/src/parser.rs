//! The notification parsing pipeline
//!
//! decode -> locate -> (head, classify) -> payment details -> assemble

use tracing::{debug, instrument};

use crate::assemble::assemble;
use crate::classify::Classifier;
use crate::config::ParserConfig;
use crate::decode::decode_attachment;
use crate::details::resolve;
use crate::document::locate_fields;
use crate::error::Result;
use crate::head::parse_head;
use crate::models::TransactionRecord;

/// Turns notification documents into transaction records
///
/// Holds only immutable configuration, so one instance can be shared across
/// threads and tasks.
#[derive(Debug, Clone)]
pub struct NotificationParser {
    classifier: Classifier,
    config: ParserConfig,
}

impl NotificationParser {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            classifier: Classifier::new(config.long_line_threshold),
            config,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse an encoded attachment as it arrives from the mail source
    #[instrument(skip(self, encoded), fields(len = encoded.len()))]
    pub fn parse_attachment(&self, id: &str, encoded: &str) -> Result<TransactionRecord> {
        let html = decode_attachment(encoded)?;
        self.parse_html(id, &html)
    }

    /// Parse an already decoded notification document
    pub fn parse_html(&self, id: &str, html: &str) -> Result<TransactionRecord> {
        let located = locate_fields(html)?;
        let head = parse_head(&located.head)?;
        let classification = self.classifier.classify(&located.body);

        let payment_details = resolve(
            classification.transaction_type,
            &head.reference,
            &classification.detail_lines,
            &classification.additional_details,
            &self.config.defaults,
        );

        debug!(
            id = %id,
            reference = %head.reference,
            transaction_type = %classification.transaction_type,
            "Parsed notification"
        );

        Ok(assemble(
            id,
            head,
            classification.transaction_type,
            payment_details,
        ))
    }
}

impl Default for NotificationParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::models::{EntryType, PaymentDetails, TransactionType};
    use crate::test_utils::NotificationBuilder;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_parser_is_shareable() {
        assert_send_sync::<NotificationParser>();
    }

    #[test]
    fn test_parse_card_operation() {
        let encoded = NotificationBuilder::new("ОПЕРАЦИЯ С КАРТА")
            .detail("ПОС 4.48 BGN авт.код:833023-GLOBAL RETAIL HOLDING EOO/VARNA")
            .encoded();

        let record = NotificationParser::default()
            .parse_attachment("msg-1", &encoded)
            .unwrap();

        assert_eq!(record.id, "msg-1");
        assert_eq!(record.transaction_type, TransactionType::CardOperation);
        assert_eq!(record.entry_type, EntryType::Debit);
        assert_eq!(record.payment_details.recipient(), "GLOBAL RETAIL HOLDING EOO");
    }

    #[test]
    fn test_unknown_type_is_not_an_error() {
        let html = NotificationBuilder::new("НЕЩО НОВО").detail("без тип").html();
        let record = NotificationParser::default().parse_html("msg-2", &html).unwrap();
        assert_eq!(record.transaction_type, TransactionType::Unknown);
        assert!(matches!(record.payment_details, PaymentDetails::Default(_)));
        assert_eq!(record.payment_details.recipient(), "<N/A>");
    }

    #[test]
    fn test_configured_threshold_is_used() {
        let long = "X".repeat(30);
        let html = NotificationBuilder::new("ИЗХОДЯЩ ПРЕВОД")
            .detail("НАЕМ")
            .detail(&long)
            .html();

        let config = ParserConfig {
            long_line_threshold: 20,
            ..ParserConfig::default()
        };
        let record = NotificationParser::new(config).parse_html("id", &html).unwrap();
        match record.payment_details {
            PaymentDetails::Transfer(t) => assert_eq!(t.description, format!("НАЕМ {}", long)),
            other => panic!("unexpected details: {:?}", other),
        }
    }

    #[test]
    fn test_bad_attachment() {
        let err = NotificationParser::default()
            .parse_attachment("id", "abcde")
            .unwrap_err();
        assert!(matches!(err, Error::Decode { length: 5, .. }));
    }
}
