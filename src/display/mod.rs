//! Display formatting for terminal output
//!
//! Lists render as `tabled` tables; single records render as aligned
//! key/value blocks.

pub mod account;
pub mod budget;
pub mod category;
pub mod report;
pub mod transaction;

use std::collections::HashMap;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::ExpenseResult;
use crate::models::{AccountId, CategoryId};
use crate::storage::Storage;

pub use account::{format_account_details, format_account_list};
pub use budget::{format_budget_details, format_budget_list};
pub use category::format_category_list;
pub use report::{format_averages, format_category_lines, format_overview, format_trend};
pub use transaction::{format_day_groups, format_transaction_details};

/// Render rows with the shared table style
pub(crate) fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Account and category names for rendering transactions
#[derive(Debug, Default)]
pub struct NameLookup {
    accounts: HashMap<AccountId, String>,
    categories: HashMap<CategoryId, String>,
}

impl NameLookup {
    pub fn from_storage(storage: &Storage) -> ExpenseResult<Self> {
        Ok(Self {
            accounts: storage
                .accounts
                .get_all()?
                .into_iter()
                .map(|a| (a.id, a.name))
                .collect(),
            categories: storage
                .categories
                .get_all()?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect(),
        })
    }

    pub fn account(&self, id: AccountId) -> String {
        self.accounts
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    pub fn category(&self, id: CategoryId) -> String {
        self.categories
            .get(&id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}
