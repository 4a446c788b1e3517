//! Payment detail extraction
//!
//! Every transaction type maps to one extraction strategy:
//! - `card` - card payments and ATM operations
//! - `cross_border` - cross-border transfers and their fees
//! - `desk` - cash withdrawals at a branch desk
//! - `fee` - fees charged by the bank
//! - `transfer` - every other transfer or payment
//!
//! [`resolve`] is the only entry point the pipeline uses. It always returns
//! payment details: an unsupported type or a failed extraction is logged and
//! replaced by [`PaymentDetails::Default`], so one odd notification never
//! stops a batch.

use thiserror::Error;
use tracing::{error, warn};

use crate::config::ExtractionDefaults;
use crate::error::{Error as CrateError, Result};
use crate::models::{DefaultDetails, PaymentDetails, TransactionType};

mod card;
mod cross_border;
mod desk;
mod fee;
mod transfer;

/// Why a strategy could not build payment details
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("{strategy}: detail text does not match the expected layout")]
    NoMatch { strategy: Strategy },

    #[error("{strategy}: missing {field}")]
    MissingField {
        strategy: Strategy,
        field: &'static str,
    },

    #[error("{strategy}: expected at least {expected} detail lines, found {found}")]
    TooFewLines {
        strategy: Strategy,
        expected: usize,
        found: usize,
    },
}

/// Extraction strategy for a transaction type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    CardOperation,
    CrossBorderTransfer,
    CrossBorderTransferFee,
    DeskWithdrawal,
    StandardFee,
    StandardTransfer,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CardOperation => "card_operation",
            Self::CrossBorderTransfer => "cross_border_transfer",
            Self::CrossBorderTransferFee => "cross_border_transfer_fee",
            Self::DeskWithdrawal => "desk_withdrawal",
            Self::StandardFee => "standard_fee",
            Self::StandardTransfer => "standard_transfer",
        }
    }

    /// Pick the strategy for a transaction type
    pub fn for_type(transaction_type: TransactionType) -> Result<Self> {
        use TransactionType as T;

        match transaction_type {
            T::CardOperation => Ok(Self::CardOperation),
            T::CrossBorderTransfer => Ok(Self::CrossBorderTransfer),
            T::CrossBorderTransferFee => Ok(Self::CrossBorderTransferFee),
            T::DeskWithdrawal => Ok(Self::DeskWithdrawal),
            T::TransferFee
            | T::AccountMaintenanceFee
            | T::CardFee
            | T::DeskWithdrawalFee
            | T::OnlineBankingFee
            | T::SmsNotificationFee => Ok(Self::StandardFee),
            T::InternalTransfer
            | T::OutgoingTransfer
            | T::IncomingTransfer
            | T::InstantTransfer
            | T::BudgetPayment
            | T::UtilityPayment
            | T::StandingOrder
            | T::DirectDebit
            | T::SalaryPayment
            | T::LoanRepayment
            | T::CreditCardRepayment => Ok(Self::StandardTransfer),
            T::Unknown => Err(CrateError::UnsupportedTransactionType(transaction_type)),
        }
    }

    /// Run the strategy
    pub fn extract(
        &self,
        lines: &[String],
        additional: &[String],
        defaults: &ExtractionDefaults,
    ) -> std::result::Result<PaymentDetails, ExtractionError> {
        match self {
            Self::CardOperation => card::extract(lines),
            Self::CrossBorderTransfer => cross_border::extract(lines),
            Self::CrossBorderTransferFee => cross_border::extract_fee(lines, defaults),
            Self::DeskWithdrawal => desk::extract(lines, defaults),
            Self::StandardFee => fee::extract(lines, defaults),
            Self::StandardTransfer => transfer::extract(lines, additional),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fallback payment details
pub fn default_details(defaults: &ExtractionDefaults) -> PaymentDetails {
    PaymentDetails::Default(DefaultDetails {
        recipient: defaults.unknown_recipient.clone(),
    })
}

/// Build payment details for a classified transaction. Never fails.
pub fn resolve(
    transaction_type: TransactionType,
    reference: &str,
    lines: &[String],
    additional: &[String],
    defaults: &ExtractionDefaults,
) -> PaymentDetails {
    let strategy = match Strategy::for_type(transaction_type) {
        Ok(strategy) => strategy,
        Err(e) => {
            warn!(
                reference = %reference,
                transaction_type = %transaction_type,
                error = %e,
                "No payment detail strategy, using default"
            );
            return default_details(defaults);
        }
    };

    match strategy.extract(lines, additional, defaults) {
        Ok(details) => details,
        Err(e) => {
            error!(
                reference = %reference,
                transaction_type = %transaction_type,
                error = %e,
                "Payment detail extraction failed, using default"
            );
            default_details(defaults)
        }
    }
}

/// Lines joined by single spaces
pub(crate) fn join_lines(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
