//! Domain models for ubbmail

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryType {
    Debit,
    Credit,
    /// Parse-failure sentinel. Never stored.
    Invalid,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debit => "DEBIT",
            Self::Credit => "CREDIT",
            Self::Invalid => "INVALID",
        }
    }

    /// Map the document's entry-type token (Bulgarian or English)
    pub fn from_token(token: &str) -> Result<Self> {
        match token.trim().to_uppercase().as_str() {
            "ДТ" | "DR" => Ok(Self::Debit),
            "КТ" | "CR" => Ok(Self::Credit),
            _ => Err(Error::UnrecognisedEntryType(token.trim().to_string())),
        }
    }
}

impl std::str::FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBIT" => Ok(Self::Debit),
            "CREDIT" => Ok(Self::Credit),
            "INVALID" => Ok(Self::Invalid),
            _ => Err(format!("Unknown entry type: {}", s)),
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a transaction happened, as announced by the notification's type token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    CardOperation,
    CrossBorderTransfer,
    CrossBorderTransferFee,
    DeskWithdrawal,
    // Fees
    TransferFee,
    AccountMaintenanceFee,
    CardFee,
    DeskWithdrawalFee,
    OnlineBankingFee,
    SmsNotificationFee,
    // Transfers and payments
    InternalTransfer,
    OutgoingTransfer,
    IncomingTransfer,
    InstantTransfer,
    BudgetPayment,
    UtilityPayment,
    StandingOrder,
    DirectDebit,
    SalaryPayment,
    LoanRepayment,
    CreditCardRepayment,
    Unknown,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CardOperation => "CARD_OPERATION",
            Self::CrossBorderTransfer => "CROSS_BORDER_TRANSFER",
            Self::CrossBorderTransferFee => "CROSS_BORDER_TRANSFER_FEE",
            Self::DeskWithdrawal => "DESK_WITHDRAWAL",
            Self::TransferFee => "TRANSFER_FEE",
            Self::AccountMaintenanceFee => "ACCOUNT_MAINTENANCE_FEE",
            Self::CardFee => "CARD_FEE",
            Self::DeskWithdrawalFee => "DESK_WITHDRAWAL_FEE",
            Self::OnlineBankingFee => "ONLINE_BANKING_FEE",
            Self::SmsNotificationFee => "SMS_NOTIFICATION_FEE",
            Self::InternalTransfer => "INTERNAL_TRANSFER",
            Self::OutgoingTransfer => "OUTGOING_TRANSFER",
            Self::IncomingTransfer => "INCOMING_TRANSFER",
            Self::InstantTransfer => "INSTANT_TRANSFER",
            Self::BudgetPayment => "BUDGET_PAYMENT",
            Self::UtilityPayment => "UTILITY_PAYMENT",
            Self::StandingOrder => "STANDING_ORDER",
            Self::DirectDebit => "DIRECT_DEBIT",
            Self::SalaryPayment => "SALARY_PAYMENT",
            Self::LoanRepayment => "LOAN_REPAYMENT",
            Self::CreditCardRepayment => "CREDIT_CARD_REPAYMENT",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Every variant, `Unknown` last
    pub fn all() -> &'static [TransactionType] {
        &[
            Self::CardOperation,
            Self::CrossBorderTransfer,
            Self::CrossBorderTransferFee,
            Self::DeskWithdrawal,
            Self::TransferFee,
            Self::AccountMaintenanceFee,
            Self::CardFee,
            Self::DeskWithdrawalFee,
            Self::OnlineBankingFee,
            Self::SmsNotificationFee,
            Self::InternalTransfer,
            Self::OutgoingTransfer,
            Self::IncomingTransfer,
            Self::InstantTransfer,
            Self::BudgetPayment,
            Self::UtilityPayment,
            Self::StandingOrder,
            Self::DirectDebit,
            Self::SalaryPayment,
            Self::LoanRepayment,
            Self::CreditCardRepayment,
            Self::Unknown,
        ]
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| format!("Unknown transaction type: {}", s))
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Card payment or ATM operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardOperationDetails {
    /// Merchant name
    pub recipient: String,
    /// Terminal kind as printed by the bank (e.g. "ПОС", "АТМ")
    pub instrument: String,
    /// Amount in the original currency
    pub sum: Decimal,
    pub currency: String,
}

/// Transfer-shaped details: transfers, payments, fees, desk withdrawals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDetails {
    pub recipient: String,
    pub recipient_iban: String,
    pub description: String,
}

/// Placeholder used when classification or extraction failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultDetails {
    pub recipient: String,
}

/// Type-specific descriptive payload of a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaymentDetails {
    CardOperation(CardOperationDetails),
    Transfer(TransferDetails),
    Default(DefaultDetails),
}

impl PaymentDetails {
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default(_))
    }

    /// Recipient regardless of shape
    pub fn recipient(&self) -> &str {
        match self {
            Self::CardOperation(d) => &d.recipient,
            Self::Transfer(d) => &d.recipient,
            Self::Default(d) => &d.recipient,
        }
    }
}

/// Typed head fields of a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadFields {
    /// Processing timestamp, document-local time
    pub date: NaiveDateTime,
    pub reference: String,
    pub value_date: NaiveDate,
    /// Unsigned magnitude; direction is in `entry_type`
    pub sum: Decimal,
    pub entry_type: EntryType,
}

/// One parsed notification. Built once by the assembler and handed off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// External identifier of the source message, not read from the document
    pub id: String,
    pub date: NaiveDateTime,
    /// With `transaction_type`, the business key
    pub reference: String,
    pub value_date: NaiveDate,
    pub sum: Decimal,
    pub entry_type: EntryType,
    pub transaction_type: TransactionType,
    pub payment_details: PaymentDetails,
}
