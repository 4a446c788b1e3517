//! Transaction type classification
//!
//! The detail cell is a run of [`Fragment`]s. They are folded into logical
//! lines, overlong lines are glued back onto their predecessor, and the lines
//! are matched against the closed table of bilingual type tokens. Whatever is
//! left once the token is cut out becomes the payment detail lines.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::document::{BodyCells, Fragment};
use crate::models::TransactionType;

/// Lines at least this long (in characters) were not wrapped by the renderer
pub const DEFAULT_LONG_LINE_THRESHOLD: usize = 100;

/// Every known type token, Bulgarian and English
pub const TOKENS: &[(&str, TransactionType)] = &[
    ("ОПЕРАЦИЯ С КАРТА", TransactionType::CardOperation),
    ("CARD OPERATION", TransactionType::CardOperation),
    ("ТРАНСГРАНИЧЕН ПРЕВОД", TransactionType::CrossBorderTransfer),
    ("CROSS-BORDER TRANSFER", TransactionType::CrossBorderTransfer),
    ("ТАКСА ТРАНСГРАНИЧЕН ПРЕВОД", TransactionType::CrossBorderTransferFee),
    ("CROSS-BORDER TRANSFER FEE", TransactionType::CrossBorderTransferFee),
    ("ТЕГЛЕНЕ ОТ КАСА", TransactionType::DeskWithdrawal),
    ("DESK WITHDRAWAL", TransactionType::DeskWithdrawal),
    ("ТАКСА ЗА ПРЕВОД", TransactionType::TransferFee),
    ("TRANSFER FEE", TransactionType::TransferFee),
    ("ТАКСА ОБСЛУЖВАНЕ НА СМЕТКА", TransactionType::AccountMaintenanceFee),
    ("ACCOUNT MAINTENANCE FEE", TransactionType::AccountMaintenanceFee),
    ("ТАКСА КАРТА", TransactionType::CardFee),
    ("CARD FEE", TransactionType::CardFee),
    ("ТАКСА ТЕГЛЕНЕ ОТ КАСА", TransactionType::DeskWithdrawalFee),
    ("DESK WITHDRAWAL FEE", TransactionType::DeskWithdrawalFee),
    ("ТАКСА ОНЛАЙН БАНКИРАНЕ", TransactionType::OnlineBankingFee),
    ("ONLINE BANKING FEE", TransactionType::OnlineBankingFee),
    ("ТАКСА SMS ИЗВЕСТИЯ", TransactionType::SmsNotificationFee),
    ("SMS NOTIFICATION FEE", TransactionType::SmsNotificationFee),
    ("ВЪТРЕШНОБАНКОВ ПРЕВОД", TransactionType::InternalTransfer),
    ("INTERNAL TRANSFER", TransactionType::InternalTransfer),
    ("ИЗХОДЯЩ ПРЕВОД", TransactionType::OutgoingTransfer),
    ("OUTGOING TRANSFER", TransactionType::OutgoingTransfer),
    ("ВХОДЯЩ ПРЕВОД", TransactionType::IncomingTransfer),
    ("INCOMING TRANSFER", TransactionType::IncomingTransfer),
    ("МОМЕНТЕН ПРЕВОД", TransactionType::InstantTransfer),
    ("INSTANT TRANSFER", TransactionType::InstantTransfer),
    ("ПЛАЩАНЕ КЪМ БЮДЖЕТА", TransactionType::BudgetPayment),
    ("BUDGET PAYMENT", TransactionType::BudgetPayment),
    ("ПЛАЩАНЕ НА СМЕТКИ", TransactionType::UtilityPayment),
    ("UTILITY PAYMENT", TransactionType::UtilityPayment),
    ("ПОСТОЯННО НАРЕЖДАНЕ", TransactionType::StandingOrder),
    ("STANDING ORDER", TransactionType::StandingOrder),
    ("ДИРЕКТЕН ДЕБИТ", TransactionType::DirectDebit),
    ("DIRECT DEBIT", TransactionType::DirectDebit),
    ("ПОСТЪПЛЕНИЕ ЗАПЛАТА", TransactionType::SalaryPayment),
    ("SALARY PAYMENT", TransactionType::SalaryPayment),
    ("ПОГАСЯВАНЕ НА КРЕДИТ", TransactionType::LoanRepayment),
    ("LOAN REPAYMENT", TransactionType::LoanRepayment),
    ("ПОГАСЯВАНЕ КРЕДИТНА КАРТА", TransactionType::CreditCardRepayment),
    ("CREDIT CARD REPAYMENT", TransactionType::CreditCardRepayment),
];

/// Alternation over all tokens, one capture group per token, longest first.
/// The second element maps group `i + 1` to its transaction type.
fn token_matcher() -> &'static (Regex, Vec<TransactionType>) {
    static MATCHER: OnceLock<(Regex, Vec<TransactionType>)> = OnceLock::new();
    MATCHER.get_or_init(|| {
        let mut ordered: Vec<&(&str, TransactionType)> = TOKENS.iter().collect();
        // Tokens that prefix other tokens must lose to the longer one
        ordered.sort_by_key(|(token, _)| std::cmp::Reverse(token.chars().count()));

        let alternation = ordered
            .iter()
            .map(|(token, _)| format!("({})", regex::escape(token)))
            .collect::<Vec<_>>()
            .join("|");
        let re = Regex::new(&format!(r"(?i)\s?/?(?:{})\s?", alternation))
            .expect("invalid token regex");
        let types = ordered.iter().map(|(_, t)| *t).collect();
        (re, types)
    })
}

/// Per-type regex removing that type's tokens from a line
fn token_strippers() -> &'static HashMap<TransactionType, Regex> {
    static STRIPPERS: OnceLock<HashMap<TransactionType, Regex>> = OnceLock::new();
    STRIPPERS.get_or_init(|| {
        let mut by_type: HashMap<TransactionType, Vec<&str>> = HashMap::new();
        for (token, t) in TOKENS {
            by_type.entry(*t).or_default().push(*token);
        }
        by_type
            .into_iter()
            .map(|(t, mut tokens)| {
                tokens.sort_by_key(|token| std::cmp::Reverse(token.chars().count()));
                let alternation = tokens
                    .iter()
                    .map(|token| regex::escape(token))
                    .collect::<Vec<_>>()
                    .join("|");
                // Looser than the matcher so "ТОКЕН / TOKEN" pairs vanish entirely
                let re = Regex::new(&format!(r"(?i)\s*/?\s*(?:{})\s*", alternation))
                    .expect("invalid token strip regex");
                (t, re)
            })
            .collect()
    })
}

fn ws_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("invalid ws regex"))
}

fn normalize_ws(s: &str) -> String {
    ws_re().replace_all(s, " ").trim().to_string()
}

/// Result of classifying one notification body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub transaction_type: TransactionType,
    /// Folded lines with the type token removed, empties dropped
    pub detail_lines: Vec<String>,
    /// Lines of the additional-details cell
    pub additional_details: Vec<String>,
}

/// Classifies notification bodies by their type token
#[derive(Debug, Clone)]
pub struct Classifier {
    long_line_threshold: usize,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(DEFAULT_LONG_LINE_THRESHOLD)
    }
}

impl Classifier {
    pub fn new(long_line_threshold: usize) -> Self {
        Self {
            long_line_threshold,
        }
    }

    pub fn classify(&self, body: &BodyCells) -> Classification {
        let lines = remerge_long_lines(fold_fragments(&body.fragments), self.long_line_threshold);
        let additional_details = split_additional_details(body.additional_details.as_deref());

        let Some(transaction_type) = match_type(&lines) else {
            warn!(lines = ?lines, "No transaction type token found");
            return Classification {
                transaction_type: TransactionType::Unknown,
                detail_lines: lines,
                additional_details,
            };
        };

        debug!(transaction_type = %transaction_type, "Classified transaction");
        let detail_lines = strip_token(&lines, transaction_type);

        Classification {
            transaction_type,
            detail_lines,
            additional_details,
        }
    }
}

/// Fold fragments into logical lines
///
/// `<br>` ends a line. `<wbr>` joins the text on either side; a trailing one
/// has nothing to join and disappears.
pub fn fold_fragments(fragments: &[Fragment]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for fragment in fragments {
        match fragment {
            Fragment::Text(text) => current.push_str(text),
            Fragment::LineBreak => lines.push(std::mem::take(&mut current)),
            Fragment::SoftWrap => {}
        }
    }
    lines.push(current);

    lines
        .iter()
        .map(|line| normalize_ws(line))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Glue lines at or over `threshold` characters onto the line before them
pub fn remerge_long_lines(lines: Vec<String>, threshold: usize) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        match merged.last_mut() {
            Some(previous) if line.chars().count() >= threshold => {
                previous.push(' ');
                previous.push_str(&line);
            }
            _ => merged.push(line),
        }
    }
    merged
}

/// Type of the first line carrying a known token
pub fn match_type(lines: &[String]) -> Option<TransactionType> {
    let (re, types) = token_matcher();
    lines.iter().find_map(|line| {
        let caps = re.captures(line)?;
        caps.iter()
            .skip(1)
            .position(|group| group.is_some())
            .map(|idx| types[idx])
    })
}

fn strip_token(lines: &[String], transaction_type: TransactionType) -> Vec<String> {
    let Some(re) = token_strippers().get(&transaction_type) else {
        return lines.to_vec();
    };
    lines
        .iter()
        .map(|line| normalize_ws(&re.replace_all(line, " ")))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Split the additional-details cell into trimmed, non-empty lines
pub fn split_additional_details(cell: Option<&str>) -> Vec<String> {
    cell.map(|text| {
        text.split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Fragment {
        Fragment::Text(s.to_string())
    }

    fn body(fragments: Vec<Fragment>) -> BodyCells {
        BodyCells {
            fragments,
            additional_details: None,
        }
    }

    #[test]
    fn test_fold_line_breaks() {
        let lines = fold_fragments(&[text("A"), Fragment::LineBreak, text(" B ")]);
        assert_eq!(lines, vec!["A", "B"]);
    }

    #[test]
    fn test_fold_soft_wrap_merges_neighbours() {
        let lines = fold_fragments(&[
            text("ПЛАЩАНЕ НА СМЕ"),
            Fragment::SoftWrap,
            text("ТКИ"),
            Fragment::LineBreak,
            text("next"),
        ]);
        assert_eq!(lines, vec!["ПЛАЩАНЕ НА СМЕТКИ", "next"]);
    }

    #[test]
    fn test_fold_trailing_soft_wrap_dropped() {
        let lines = fold_fragments(&[text("A"), Fragment::LineBreak, text("B"), Fragment::SoftWrap]);
        assert_eq!(lines, vec!["A", "B"]);
    }

    #[test]
    fn test_fold_skips_blank_lines() {
        let lines = fold_fragments(&[
            text("\n   "),
            Fragment::LineBreak,
            text("A"),
            Fragment::LineBreak,
            Fragment::LineBreak,
        ]);
        assert_eq!(lines, vec!["A"]);
    }

    #[test]
    fn test_remerge_long_lines() {
        let long = "x".repeat(100);
        let lines = vec!["first".to_string(), long.clone(), "after".to_string()];
        let merged = remerge_long_lines(lines, 100);
        assert_eq!(merged, vec![format!("first {}", long), "after".to_string()]);
    }

    #[test]
    fn test_remerge_below_threshold_untouched() {
        let almost = "y".repeat(99);
        let lines = vec!["first".to_string(), almost.clone()];
        assert_eq!(remerge_long_lines(lines.clone(), 100), lines);
    }

    #[test]
    fn test_remerge_long_first_line_stays() {
        let long = "z".repeat(120);
        let lines = vec![long.clone(), "tail".to_string()];
        assert_eq!(remerge_long_lines(lines.clone(), 100), lines);
    }

    #[test]
    fn test_remerge_counts_characters_not_bytes() {
        // 60 Cyrillic chars = 120 bytes, still under the threshold
        let cyrillic = "Ж".repeat(60);
        let lines = vec!["a".to_string(), cyrillic];
        assert_eq!(remerge_long_lines(lines.clone(), 100), lines);
    }

    #[test]
    fn test_classify_card_operation() {
        let classification = Classifier::default().classify(&body(vec![
            text("ОПЕРАЦИЯ С КАРТА/CARD OPERATION"),
            Fragment::LineBreak,
            text("ПОС 4.48 BGN авт.код:833023-GLOBAL RETAIL HOLDING EOO/VARNA/PAN:4402****5296/CT:01"),
        ]));
        assert_eq!(classification.transaction_type, TransactionType::CardOperation);
        assert_eq!(
            classification.detail_lines,
            vec!["ПОС 4.48 BGN авт.код:833023-GLOBAL RETAIL HOLDING EOO/VARNA/PAN:4402****5296/CT:01"]
        );
    }

    #[test]
    fn test_longest_token_wins() {
        let classification = Classifier::default().classify(&body(vec![text(
            "CROSS-BORDER TRANSFER FEE",
        )]));
        assert_eq!(
            classification.transaction_type,
            TransactionType::CrossBorderTransferFee
        );
        assert!(classification.detail_lines.is_empty());

        let classification = Classifier::default().classify(&body(vec![text(
            "ТАКСА ТЕГЛЕНЕ ОТ КАСА / DESK WITHDRAWAL FEE",
        )]));
        assert_eq!(classification.transaction_type, TransactionType::DeskWithdrawalFee);
        assert!(classification.detail_lines.is_empty());
    }

    #[test]
    fn test_first_matching_line_wins() {
        let classification = Classifier::default().classify(&body(vec![
            text("something first"),
            Fragment::LineBreak,
            text("ИЗХОДЯЩ ПРЕВОД"),
            Fragment::LineBreak,
            text("ВХОДЯЩ ПРЕВОД"),
        ]));
        assert_eq!(classification.transaction_type, TransactionType::OutgoingTransfer);
        assert_eq!(
            classification.detail_lines,
            vec!["something first", "ВХОДЯЩ ПРЕВОД"]
        );
    }

    #[test]
    fn test_token_split_by_soft_wrap_still_matches() {
        let classification = Classifier::default().classify(&body(vec![
            text("ТЕГЛЕНЕ ОТ К"),
            Fragment::SoftWrap,
            text("АСА"),
            Fragment::LineBreak,
            text("ТЕГЛ.НА КАСА"),
        ]));
        assert_eq!(classification.transaction_type, TransactionType::DeskWithdrawal);
        assert_eq!(classification.detail_lines, vec!["ТЕГЛ.НА КАСА"]);
    }

    #[test]
    fn test_case_insensitive_match() {
        let classification =
            Classifier::default().classify(&body(vec![text("Такса за превод / transfer fee")]));
        assert_eq!(classification.transaction_type, TransactionType::TransferFee);
        assert!(classification.detail_lines.is_empty());
    }

    #[test]
    fn test_unknown_keeps_lines() {
        let classification = Classifier::default().classify(&body(vec![
            text("НЕЩО НЕПОЗНАТО"),
            Fragment::LineBreak,
            text("detail"),
        ]));
        assert_eq!(classification.transaction_type, TransactionType::Unknown);
        assert_eq!(classification.detail_lines, vec!["НЕЩО НЕПОЗНАТО", "detail"]);
    }

    #[test]
    fn test_every_token_classifies_and_is_stripped() {
        for (token, expected) in TOKENS {
            let classification = Classifier::default().classify(&body(vec![
                text("Detail before"),
                Fragment::LineBreak,
                text(&format!("{} extra", token)),
            ]));
            assert_eq!(classification.transaction_type, *expected, "token {}", token);
            for line in &classification.detail_lines {
                assert!(!line.contains(token), "{:?} still contains {}", line, token);
            }
            assert_eq!(classification.detail_lines, vec!["Detail before", "extra"]);
        }
    }

    #[test]
    fn test_additional_details_split() {
        assert_eq!(
            split_additional_details(Some("  BG80BNBG96611020345678 \n\n ИВАН ИВАНОВ\n")),
            vec!["BG80BNBG96611020345678", "ИВАН ИВАНОВ"]
        );
        assert!(split_additional_details(None).is_empty());
        assert!(split_additional_details(Some("\n \n")).is_empty());
    }

    #[test]
    fn test_long_line_threshold_configurable() {
        let line = "a".repeat(20);
        let classification = Classifier::new(10).classify(&body(vec![
            text("DIRECT DEBIT"),
            Fragment::LineBreak,
            text("short"),
            Fragment::LineBreak,
            text(&line),
        ]));
        assert_eq!(classification.transaction_type, TransactionType::DirectDebit);
        assert_eq!(classification.detail_lines, vec![format!("short {}", line)]);
    }
}
