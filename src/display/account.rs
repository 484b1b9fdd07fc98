//! Account display formatting
//!
//! Formats accounts for terminal output in table and detail views.

use tabled::Tabled;

use crate::models::{Currency, Money};
use crate::services::account::AccountSummary;

use super::render_table;

#[derive(Tabled)]
struct AccountRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    account_type: String,
    #[tabled(rename = "Balance")]
    balance: String,
    #[tabled(rename = "Txns")]
    transactions: usize,
}

/// Format a list of accounts with balances as a table, with a total row
pub fn format_account_list(summaries: &[AccountSummary], currency: &Currency) -> String {
    if summaries.is_empty() {
        return "No accounts found.\n".to_string();
    }

    let mut rows: Vec<AccountRow> = summaries
        .iter()
        .map(|s| AccountRow {
            id: s.account.id.to_string(),
            name: s.account.name.clone(),
            account_type: s.account.account_type.to_string(),
            balance: currency.format(s.balance),
            transactions: s.transaction_count,
        })
        .collect();

    let total: Money = summaries.iter().map(|s| s.balance).sum();
    rows.push(AccountRow {
        id: String::new(),
        name: "TOTAL".into(),
        account_type: String::new(),
        balance: currency.format(total),
        transactions: summaries.iter().map(|s| s.transaction_count).sum(),
    });

    render_table(rows)
}

/// Format a single account's details
pub fn format_account_details(summary: &AccountSummary, currency: &Currency) -> String {
    let account = &summary.account;
    let mut output = String::new();

    output.push_str(&format!("Account: {}\n", account.name));
    output.push_str(&format!("  Type:             {}\n", account.account_type));
    output.push_str(&format!("  ID:               {}\n", account.id.as_key()));
    output.push_str(&format!(
        "  Starting Balance: {}\n",
        currency.format(account.starting_balance)
    ));
    output.push_str(&format!("  Balance:          {}\n", currency.format(summary.balance)));
    if let Some(limit) = account.credit_limit {
        output.push_str(&format!("  Credit Limit:     {}\n", currency.format(limit)));
    }
    output.push_str(&format!("  Transactions:     {}\n", summary.transaction_count));
    output.push_str(&format!(
        "  Created:          {}\n",
        account.created_at.format("%Y-%m-%d %H:%M")
    ));

    output
}
