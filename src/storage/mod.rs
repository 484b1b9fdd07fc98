//! Storage layer for expense-cli
//!
//! JSON file storage with atomic writes. Each entity type lives in its own
//! file under `data/`, and every committed change is announced on the
//! storage change subject.

pub mod accounts;
pub mod budgets;
pub mod categories;
pub mod file_io;
pub mod init;
pub mod transactions;

pub use accounts::{AccountData, AccountRepository};
pub use budgets::{BudgetData, BudgetRepository};
pub use categories::{CategoryData, CategoryRepository};
pub use file_io::{read_json, write_json_atomic};
pub use init::initialize_storage;
pub use transactions::{TransactionData, TransactionRepository};

use tracing::debug;

use crate::config::paths::ExpensePaths;
use crate::error::ExpenseError;
use crate::reactive::Subject;

/// Which collection a committed change touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataChange {
    Accounts,
    Categories,
    Transactions,
    Budgets,
    /// Everything was reloaded, e.g. after a restore
    All,
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: ExpensePaths,
    pub accounts: AccountRepository,
    pub categories: CategoryRepository,
    pub transactions: TransactionRepository,
    pub budgets: BudgetRepository,
    changes: Subject<DataChange>,
}

impl Storage {
    pub fn new(paths: ExpensePaths) -> Result<Self, ExpenseError> {
        paths.ensure_directories()?;

        Ok(Self {
            accounts: AccountRepository::new(paths.accounts_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            transactions: TransactionRepository::new(paths.transactions_file()),
            budgets: BudgetRepository::new(paths.budgets_file()),
            changes: Subject::new(),
            paths,
        })
    }

    pub fn paths(&self) -> &ExpensePaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&self) -> Result<(), ExpenseError> {
        self.accounts.load()?;
        self.categories.load()?;
        self.transactions.load()?;
        self.budgets.load()?;
        debug!(
            accounts = self.accounts.count()?,
            categories = self.categories.count()?,
            transactions = self.transactions.count()?,
            budgets = self.budgets.count()?,
            "Loaded storage"
        );
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), ExpenseError> {
        self.accounts.save()?;
        self.categories.save()?;
        self.transactions.save()?;
        self.budgets.save()?;
        Ok(())
    }

    /// Change notifications for committed writes
    pub fn changes(&self) -> &Subject<DataChange> {
        &self.changes
    }

    /// Announce a committed change to observers
    pub fn notify(&self, change: DataChange) {
        debug!(?change, "Storage changed");
        self.changes.publish(change);
    }

    /// Check if storage has been initialized (has any data)
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}
