//! Transaction display formatting
//!
//! Transactions are listed grouped by day, each day headed by its net total.

use chrono::Local;

use crate::models::{Currency, Transaction, TransactionType};
use crate::services::aggregation::{AmountColor, DayGroup};

use super::NameLookup;

fn account_column(txn: &Transaction, names: &NameLookup) -> String {
    match txn.to_account_id {
        Some(to) => format!("{} -> {}", names.account(txn.from_account_id), names.account(to)),
        None => names.account(txn.from_account_id),
    }
}

fn amount_column(txn: &Transaction, currency: &Currency) -> String {
    match txn.transaction_type {
        TransactionType::Transfer => currency.format(txn.amount),
        _ => currency.format(txn.signed_amount()),
    }
}

/// Format day groups, newest day first
pub fn format_day_groups(groups: &[DayGroup], names: &NameLookup, currency: &Currency) -> String {
    if groups.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    for group in groups {
        let marker = match group.color {
            AmountColor::Red => "-",
            AmountColor::Green => "+",
        };
        output.push_str(&format!(
            "{} {}  [{}] {}\n",
            group.date.format("%a"),
            group.formatted_date,
            marker,
            group.total.formatted
        ));

        for txn in &group.transactions {
            output.push_str(&format!(
                "  {:<12}  {:<8}  {:<16}  {:<24}  {:>14}  {}\n",
                txn.id.to_string(),
                txn.transaction_type.to_string(),
                names.category(txn.category_id),
                account_column(txn, names),
                amount_column(txn, currency),
                txn.notes
            ));
        }
    }
    output
}

/// Format a single transaction's details
pub fn format_transaction_details(txn: &Transaction, names: &NameLookup, currency: &Currency) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id.as_key()));
    output.push_str(&format!("  Type:     {}\n", txn.transaction_type));
    output.push_str(&format!("  Amount:   {}\n", amount_column(txn, currency)));
    output.push_str(&format!("  Category: {}\n", names.category(txn.category_id)));
    output.push_str(&format!("  From:     {}\n", names.account(txn.from_account_id)));
    if let Some(to) = txn.to_account_id {
        output.push_str(&format!("  To:       {}\n", names.account(to)));
    }
    output.push_str(&format!(
        "  When:     {}\n",
        txn.created_on.with_timezone(&Local).format("%Y-%m-%d %H:%M")
    ));
    if !txn.notes.is_empty() {
        output.push_str(&format!("  Notes:    {}\n", txn.notes));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountId, CategoryId, Money};
    use crate::services::aggregation::group_by_day;
    use chrono::Utc;

    #[test]
    fn test_empty_groups() {
        assert_eq!(
            format_day_groups(&[], &NameLookup::default(), &Currency::default()),
            "No transactions found.\n"
        );
    }

    #[test]
    fn test_groups_show_day_total_and_rows() {
        let txn = Transaction::new(
            TransactionType::Expense,
            Money::from_units(8),
            CategoryId::new(),
            AccountId::new(),
            Utc::now(),
        );
        let currency = Currency::default();
        let groups = group_by_day(&[txn], &currency, "%d/%m/%Y");

        let output = format_day_groups(&groups, &NameLookup::default(), &currency);
        assert!(output.contains("[-] -$8.00"));
        assert!(output.contains("Expense"));
    }

    #[test]
    fn test_transfer_details() {
        let txn = Transaction::transfer(
            Money::from_units(50),
            CategoryId::new(),
            AccountId::new(),
            AccountId::new(),
            Utc::now(),
        );

        let output = format_transaction_details(&txn, &NameLookup::default(), &Currency::default());
        assert!(output.contains("Amount:   $50.00"));
        assert!(output.contains("To:"));
    }
}
