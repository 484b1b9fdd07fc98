//! Account repository for JSON storage
//!
//! Accounts are held as a list in display order. `sort_order` is kept dense
//! (0, 1, 2, ...) by `reorder`, and the file is written in that order.

use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::error::ExpenseError;
use crate::models::{Account, AccountId};

use super::file_io::{read_json, write_json_atomic};

/// On-disk layout of accounts.json
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct AccountData {
    pub accounts: Vec<Account>,
}

pub struct AccountRepository {
    path: PathBuf,
    ordered: RwLock<Vec<Account>>,
}

fn display_order(a: &Account, b: &Account) -> std::cmp::Ordering {
    a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name))
}

impl AccountRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            ordered: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Vec<Account>>, ExpenseError> {
        self.ordered
            .read()
            .map_err(|e| ExpenseError::Storage(format!("Account list lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Vec<Account>>, ExpenseError> {
        self.ordered
            .write()
            .map_err(|e| ExpenseError::Storage(format!("Account list lock poisoned: {}", e)))
    }

    /// Replace the in-memory list with the file contents
    pub fn load(&self) -> Result<(), ExpenseError> {
        let AccountData { mut accounts } = read_json(&self.path)?;
        accounts.sort_by(display_order);
        *self.write()? = accounts;
        Ok(())
    }

    pub fn save(&self) -> Result<(), ExpenseError> {
        let data = AccountData {
            accounts: self.get_all()?,
        };
        write_json_atomic(&self.path, &data)
    }

    pub fn get(&self, id: AccountId) -> Result<Option<Account>, ExpenseError> {
        Ok(self.read()?.iter().find(|a| a.id == id).cloned())
    }

    /// Every account in display order
    pub fn get_all(&self) -> Result<Vec<Account>, ExpenseError> {
        Ok(self.read()?.clone())
    }

    pub fn ids(&self) -> Result<Vec<AccountId>, ExpenseError> {
        Ok(self.read()?.iter().map(|a| a.id).collect())
    }

    pub fn count(&self) -> Result<usize, ExpenseError> {
        Ok(self.read()?.len())
    }

    /// Case-insensitive name lookup
    pub fn get_by_name(&self, name: &str) -> Result<Option<Account>, ExpenseError> {
        let wanted = name.to_lowercase();
        Ok(self.read()?.iter().find(|a| a.name.to_lowercase() == wanted).cloned())
    }

    pub fn exists(&self, id: AccountId) -> Result<bool, ExpenseError> {
        Ok(self.read()?.iter().any(|a| a.id == id))
    }

    /// Whether another account already uses `name`, ignoring case
    pub fn name_exists(&self, name: &str, exclude_id: Option<AccountId>) -> Result<bool, ExpenseError> {
        let wanted = name.to_lowercase();
        Ok(self
            .read()?
            .iter()
            .any(|a| Some(a.id) != exclude_id && a.name.to_lowercase() == wanted))
    }

    /// Sort order for an account placed after every existing one
    pub fn next_sort_order(&self) -> Result<i32, ExpenseError> {
        Ok(self
            .read()?
            .iter()
            .map(|a| a.sort_order)
            .max()
            .map_or(0, |max| max + 1))
    }

    /// Insert or replace an account, keeping the list in display order
    pub fn upsert(&self, account: Account) -> Result<(), ExpenseError> {
        let mut ordered = self.write()?;
        if let Some(pos) = ordered.iter().position(|a| a.id == account.id) {
            if ordered[pos].sort_order == account.sort_order && ordered[pos].name == account.name {
                ordered[pos] = account;
                return Ok(());
            }
            ordered.remove(pos);
        }
        let at = ordered.partition_point(|a| display_order(a, &account).is_le());
        ordered.insert(at, account);
        Ok(())
    }

    pub fn delete(&self, id: AccountId) -> Result<bool, ExpenseError> {
        let mut ordered = self.write()?;
        let before = ordered.len();
        ordered.retain(|a| a.id != id);
        Ok(ordered.len() != before)
    }

    /// Move the listed accounts to the front, in the given order, and
    /// renumber every account's `sort_order` from zero
    ///
    /// Unlisted accounts keep their relative order after the listed ones.
    pub fn reorder(&self, order: &[AccountId]) -> Result<Vec<Account>, ExpenseError> {
        let mut ordered = self.write()?;

        if let Some(missing) = order.iter().find(|id| !ordered.iter().any(|a| a.id == **id)) {
            return Err(ExpenseError::account_not_found(missing.to_string()));
        }

        ordered.sort_by_key(|a| order.iter().position(|id| *id == a.id).unwrap_or(order.len()));

        let now = Utc::now();
        for (rank, account) in (0_i32..).zip(ordered.iter_mut()) {
            if account.sort_order != rank {
                account.sort_order = rank;
                account.updated_at = now;
            }
        }
        Ok(ordered.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountType;
    use tempfile::TempDir;

    fn repo_in(temp_dir: &TempDir) -> AccountRepository {
        AccountRepository::new(temp_dir.path().join("accounts.json"))
    }

    fn account(name: &str, sort_order: i32) -> Account {
        let mut account = Account::new(name, AccountType::Regular);
        account.sort_order = sort_order;
        account
    }

    fn names(repo: &AccountRepository) -> Vec<String> {
        repo.get_all().unwrap().into_iter().map(|a| a.name).collect()
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let repo = repo_in(&temp_dir);
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
        assert_eq!(repo.next_sort_order().unwrap(), 0);
    }

    #[test]
    fn test_file_is_written_in_display_order() {
        let temp_dir = TempDir::new().unwrap();
        let repo = repo_in(&temp_dir);
        repo.upsert(account("Bank", 2)).unwrap();
        repo.upsert(account("Cash", 0)).unwrap();
        repo.upsert(account("Card", 1)).unwrap();
        repo.save().unwrap();

        let on_disk: AccountData = read_json(temp_dir.path().join("accounts.json")).unwrap();
        let order: Vec<_> = on_disk.accounts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(order, vec!["Cash", "Card", "Bank"]);

        let reloaded = repo_in(&temp_dir);
        reloaded.load().unwrap();
        assert_eq!(names(&reloaded), vec!["Cash", "Card", "Bank"]);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let temp_dir = TempDir::new().unwrap();
        let repo = repo_in(&temp_dir);
        let mut cash = account("Cash", 0);
        repo.upsert(cash.clone()).unwrap();
        repo.upsert(account("Bank", 1)).unwrap();

        cash.icon = "wallet".into();
        repo.upsert(cash.clone()).unwrap();
        assert_eq!(repo.count().unwrap(), 2);
        assert_eq!(repo.get(cash.id).unwrap().unwrap().icon, "wallet");

        cash.name = "Pocket".into();
        cash.sort_order = 5;
        repo.upsert(cash).unwrap();
        assert_eq!(names(&repo), vec!["Bank", "Pocket"]);
        assert_eq!(repo.next_sort_order().unwrap(), 6);
    }

    #[test]
    fn test_reorder_renumbers_from_zero() {
        let temp_dir = TempDir::new().unwrap();
        let repo = repo_in(&temp_dir);
        let a = account("A", 3);
        let c = account("C", 9);
        repo.upsert(a.clone()).unwrap();
        repo.upsert(account("B", 7)).unwrap();
        repo.upsert(c.clone()).unwrap();

        let reordered = repo.reorder(&[c.id, a.id]).unwrap();
        let ranks: Vec<_> = reordered.iter().map(|a| (a.name.as_str(), a.sort_order)).collect();
        assert_eq!(ranks, vec![("C", 0), ("A", 1), ("B", 2)]);
        assert_eq!(repo.ids().unwrap()[0], c.id);
    }

    #[test]
    fn test_reorder_unknown_id_changes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let repo = repo_in(&temp_dir);
        repo.upsert(account("A", 1)).unwrap();
        repo.upsert(account("B", 0)).unwrap();

        let err = repo.reorder(&[AccountId::new()]).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(names(&repo), vec!["B", "A"]);
    }

    #[test]
    fn test_name_lookup_ignores_case() {
        let temp_dir = TempDir::new().unwrap();
        let repo = repo_in(&temp_dir);
        let card = Account::new("Credit Card", AccountType::Credit);
        let id = card.id;
        repo.upsert(card).unwrap();

        assert!(repo.get_by_name("credit card").unwrap().is_some());
        assert!(repo.get_by_name("other").unwrap().is_none());
        assert!(repo.name_exists("CREDIT CARD", None).unwrap());
        assert!(!repo.name_exists("credit card", Some(id)).unwrap());
    }

    #[test]
    fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let repo = repo_in(&temp_dir);
        let temp = account("Temp", 0);
        repo.upsert(temp.clone()).unwrap();

        assert!(repo.delete(temp.id).unwrap());
        assert!(!repo.exists(temp.id).unwrap());
        assert!(!repo.delete(temp.id).unwrap());
    }
}
