//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions to transactions.json, with
//! account and category indexes kept in step with the data map.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use crate::error::ExpenseError;
use crate::models::{AccountId, CategoryId, Transaction, TransactionId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable transaction data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TransactionData {
    pub transactions: Vec<Transaction>,
}

/// Repository for transaction persistence with indexing
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
    /// Index: account_id -> transaction_ids (either side of a transfer)
    by_account: RwLock<HashMap<AccountId, Vec<TransactionId>>>,
    /// Index: category_id -> transaction_ids
    by_category: RwLock<HashMap<CategoryId, Vec<TransactionId>>>,
}

/// Most recent first
fn newest_first(a: &Transaction, b: &Transaction) -> std::cmp::Ordering {
    b.created_on
        .cmp(&a.created_on)
        .then(b.created_at.cmp(&a.created_at))
}

fn index_accounts(txn: &Transaction) -> impl Iterator<Item = AccountId> {
    std::iter::once(txn.from_account_id).chain(txn.to_account_id)
}

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
            by_account: RwLock::new(HashMap::new()),
            by_category: RwLock::new(HashMap::new()),
        }
    }

    /// Load transactions from disk and build indexes
    pub fn load(&self) -> Result<(), ExpenseError> {
        let file_data: TransactionData = read_json(&self.path)?;

        let mut data = self.data.write().map_err(|e| {
            ExpenseError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        let mut by_account = self.by_account.write().map_err(|e| {
            ExpenseError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        let mut by_category = self.by_category.write().map_err(|e| {
            ExpenseError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        data.clear();
        by_account.clear();
        by_category.clear();

        for txn in file_data.transactions {
            for account_id in index_accounts(&txn) {
                by_account.entry(account_id).or_default().push(txn.id);
            }
            by_category.entry(txn.category_id).or_default().push(txn.id);
            data.insert(txn.id, txn);
        }

        Ok(())
    }

    /// Save transactions to disk, newest first
    pub fn save(&self) -> Result<(), ExpenseError> {
        let file_data = TransactionData {
            transactions: self.get_all()?,
        };
        write_json_atomic(&self.path, &file_data)
    }

    pub fn get(&self, id: TransactionId) -> Result<Option<Transaction>, ExpenseError> {
        let data = self.data.read().map_err(|e| {
            ExpenseError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.get(&id).cloned())
    }

    /// Get all transactions, newest first
    pub fn get_all(&self) -> Result<Vec<Transaction>, ExpenseError> {
        self.get_matching(|_| true)
    }

    /// Get every transaction accepted by `predicate`, newest first
    pub fn get_matching<F>(&self, predicate: F) -> Result<Vec<Transaction>, ExpenseError>
    where
        F: Fn(&Transaction) -> bool,
    {
        let data = self.data.read().map_err(|e| {
            ExpenseError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let mut transactions: Vec<_> = data.values().filter(|t| predicate(t)).cloned().collect();
        transactions.sort_by(newest_first);
        Ok(transactions)
    }

    /// Transactions touching an account on either side
    pub fn get_by_account(&self, account_id: AccountId) -> Result<Vec<Transaction>, ExpenseError> {
        let data = self.data.read().map_err(|e| {
            ExpenseError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        let by_account = self.by_account.read().map_err(|e| {
            ExpenseError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let ids = by_account.get(&account_id).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut transactions: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        transactions.sort_by(newest_first);
        Ok(transactions)
    }

    pub fn get_by_category(&self, category_id: CategoryId) -> Result<Vec<Transaction>, ExpenseError> {
        let data = self.data.read().map_err(|e| {
            ExpenseError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        let by_category = self.by_category.read().map_err(|e| {
            ExpenseError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        let ids = by_category.get(&category_id).map(|v| v.as_slice()).unwrap_or(&[]);
        let mut transactions: Vec<_> = ids.iter().filter_map(|id| data.get(id).cloned()).collect();
        transactions.sort_by(newest_first);
        Ok(transactions)
    }

    /// Number of transactions filed under a category
    pub fn count_by_category(&self, category_id: CategoryId) -> Result<usize, ExpenseError> {
        let by_category = self.by_category.read().map_err(|e| {
            ExpenseError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(by_category.get(&category_id).map_or(0, |ids| ids.len()))
    }

    /// Number of transactions touching an account
    pub fn count_by_account(&self, account_id: AccountId) -> Result<usize, ExpenseError> {
        let by_account = self.by_account.read().map_err(|e| {
            ExpenseError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(by_account.get(&account_id).map_or(0, |ids| ids.len()))
    }

    /// Transactions with `start <= created_on < end`
    pub fn get_by_date_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, ExpenseError> {
        self.get_matching(|t| t.created_on >= start && t.created_on < end)
    }

    /// Insert or update a transaction
    pub fn upsert(&self, txn: Transaction) -> Result<(), ExpenseError> {
        let mut data = self.data.write().map_err(|e| {
            ExpenseError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        let mut by_account = self.by_account.write().map_err(|e| {
            ExpenseError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        let mut by_category = self.by_category.write().map_err(|e| {
            ExpenseError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        // Remove from old indexes if updating
        if let Some(old) = data.get(&txn.id) {
            for account_id in index_accounts(old) {
                if let Some(ids) = by_account.get_mut(&account_id) {
                    ids.retain(|&id| id != txn.id);
                }
            }
            if let Some(ids) = by_category.get_mut(&old.category_id) {
                ids.retain(|&id| id != txn.id);
            }
        }

        for account_id in index_accounts(&txn) {
            by_account.entry(account_id).or_default().push(txn.id);
        }
        by_category.entry(txn.category_id).or_default().push(txn.id);

        data.insert(txn.id, txn);
        Ok(())
    }

    pub fn delete(&self, id: TransactionId) -> Result<bool, ExpenseError> {
        let mut data = self.data.write().map_err(|e| {
            ExpenseError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        let mut by_account = self.by_account.write().map_err(|e| {
            ExpenseError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        let mut by_category = self.by_category.write().map_err(|e| {
            ExpenseError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;

        match data.remove(&id) {
            Some(txn) => {
                for account_id in index_accounts(&txn) {
                    if let Some(ids) = by_account.get_mut(&account_id) {
                        ids.retain(|&tid| tid != id);
                    }
                }
                if let Some(ids) = by_category.get_mut(&txn.category_id) {
                    ids.retain(|&tid| tid != id);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn count(&self) -> Result<usize, ExpenseError> {
        let data = self.data.read().map_err(|e| {
            ExpenseError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(data.len())
    }
}
