//! Fees the bank charges to the account holder

use super::{join_lines, ExtractionError};
use crate::config::ExtractionDefaults;
use crate::models::{PaymentDetails, TransferDetails};

/// Never fails: an empty fee falls back to the configured description
pub(super) fn extract(
    lines: &[String],
    defaults: &ExtractionDefaults,
) -> Result<PaymentDetails, ExtractionError> {
    let description = join_lines(lines);
    let description = if description.is_empty() {
        defaults.missing_description.clone()
    } else {
        description
    };

    Ok(PaymentDetails::Transfer(TransferDetails {
        recipient: defaults.institution_name.clone(),
        recipient_iban: defaults.institution_iban.clone(),
        description,
    }))
}
