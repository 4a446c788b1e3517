//! Transaction command implementations

use anyhow::Result;
use ubbmail_core::{Database, EntryType};

use super::truncate;

pub fn cmd_transactions_list(db: &Database, limit: i64) -> Result<()> {
    let transactions = db.list_transactions(limit, 0)?;

    if transactions.is_empty() {
        println!("No transactions found. Ingest some with:");
        println!("  ubbmail ingest --dir attachments/");
        return Ok(());
    }

    let count = db.count_transactions()?;

    println!();
    println!("📝 Recent Transactions ({} total)", count);
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let sum_str = match tx.entry_type {
            EntryType::Credit => format!("\x1b[32m+{}\x1b[0m", tx.sum), // Green for income
            _ => format!("\x1b[31m-{}\x1b[0m", tx.sum),                // Red for expenses
        };

        println!(
            "   {} │ {:>12} │ {:<26} │ {}",
            tx.date,
            sum_str,
            tx.transaction_type,
            truncate(tx.payment_details.recipient(), 35)
        );
    }

    Ok(())
}
