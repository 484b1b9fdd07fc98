//! Transaction filtering
//!
//! A `TransactionQuery` combines a date window with account, category and
//! type selections. An empty or `All` selection does not narrow anything.

use chrono::{DateTime, Utc};

use crate::error::ExpenseResult;
use crate::models::{AccountId, CategoryId, DateRangeModel, Selection, Transaction, TransactionType};
use crate::preferences::PreferenceStore;
use crate::storage::TransactionRepository;

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionQuery {
    pub accounts: Selection<AccountId>,
    pub categories: Selection<CategoryId>,
    pub types: Selection<TransactionType>,
    pub start: DateTime<Utc>,
    /// Exclusive
    pub end: DateTime<Utc>,
}

impl TransactionQuery {
    /// Everything inside a window
    pub fn in_range(range: &DateRangeModel) -> Self {
        Self {
            accounts: Selection::All,
            categories: Selection::All,
            types: Selection::All,
            start: range.start,
            end: range.end,
        }
    }

    /// The window narrowed by the user's stored selections
    pub fn from_preferences(prefs: &PreferenceStore, range: &DateRangeModel) -> ExpenseResult<Self> {
        Ok(Self {
            accounts: prefs.selected_accounts()?,
            categories: prefs.selected_categories()?,
            types: prefs.transaction_types()?,
            start: range.start,
            end: range.end,
        })
    }

    pub fn matches(&self, txn: &Transaction) -> bool {
        let in_window = txn.created_on >= self.start && txn.created_on < self.end;
        let account_ok = self.accounts.is_all()
            || self.accounts.matches(&txn.from_account_id)
            || txn
                .to_account_id
                .map_or(false, |to| self.accounts.matches(&to));

        in_window
            && account_ok
            && self.categories.matches(&txn.category_id)
            && self.types.matches(&txn.transaction_type)
    }

    /// Keep matching transactions, preserving order
    pub fn apply(&self, transactions: impl IntoIterator<Item = Transaction>) -> Vec<Transaction> {
        transactions.into_iter().filter(|t| self.matches(t)).collect()
    }

    /// Run the query against the repository, newest first
    pub fn fetch(&self, repository: &TransactionRepository) -> ExpenseResult<Vec<Transaction>> {
        repository.get_matching(|t| self.matches(t))
    }
}
