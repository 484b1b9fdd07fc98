//! Account service
//!
//! Provides business logic for account management including CRUD operations,
//! balance calculation, ordering and validation.

use chrono::Utc;
use tracing::info;

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Account, AccountId, AccountType, Money};
use crate::storage::{DataChange, Storage};

/// Service for account management
pub struct AccountService<'a> {
    storage: &'a Storage,
}

/// Summary of an account with computed fields
#[derive(Debug, Clone)]
pub struct AccountSummary {
    pub account: Account,
    /// Starting balance plus every flow in or out
    pub balance: Money,
    pub transaction_count: usize,
}

/// Fields to change on an existing account
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
    pub credit_limit: Option<Option<Money>>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl<'a> AccountService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new account at the end of the current ordering
    pub fn create(
        &self,
        name: &str,
        account_type: AccountType,
        starting_balance: Money,
        credit_limit: Option<Money>,
    ) -> ExpenseResult<Account> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ExpenseError::Validation(
                "Account name cannot be empty".into(),
            ));
        }

        if self.storage.accounts.name_exists(name, None)? {
            return Err(ExpenseError::Duplicate {
                entity_type: "Account",
                identifier: name.to_string(),
            });
        }

        let mut account = Account::with_starting_balance(name, account_type, starting_balance);
        account.credit_limit = credit_limit;
        account.sort_order = self.storage.accounts.next_sort_order()?;

        account
            .validate()
            .map_err(|e| ExpenseError::Validation(e.to_string()))?;

        self.storage.accounts.upsert(account.clone())?;
        self.storage.accounts.save()?;
        self.storage.notify(DataChange::Accounts);

        info!(account = %account.name, "Created account");
        Ok(account)
    }

    pub fn get(&self, id: AccountId) -> ExpenseResult<Option<Account>> {
        self.storage.accounts.get(id)
    }

    /// Find an account by name or ID string
    pub fn find(&self, identifier: &str) -> ExpenseResult<Option<Account>> {
        if let Some(account) = self.storage.accounts.get_by_name(identifier)? {
            return Ok(Some(account));
        }

        if let Ok(id) = identifier.parse::<AccountId>() {
            return self.storage.accounts.get(id);
        }

        Ok(self
            .storage
            .accounts
            .get_all()?
            .into_iter()
            .find(|a| a.id.short() == identifier))
    }

    /// Like `find`, but a missing account is an error
    pub fn resolve(&self, identifier: &str) -> ExpenseResult<Account> {
        self.find(identifier)?
            .ok_or_else(|| ExpenseError::account_not_found(identifier))
    }

    pub fn list(&self) -> ExpenseResult<Vec<Account>> {
        self.storage.accounts.get_all()
    }

    pub fn list_with_balances(&self) -> ExpenseResult<Vec<AccountSummary>> {
        self.list()?
            .iter()
            .map(|account| self.get_summary(account))
            .collect()
    }

    pub fn get_summary(&self, account: &Account) -> ExpenseResult<AccountSummary> {
        let transactions = self.storage.transactions.get_by_account(account.id)?;

        let balance = transactions
            .iter()
            .fold(account.starting_balance, |balance, txn| {
                balance + txn.flow_for(account.id)
            });

        Ok(AccountSummary {
            account: account.clone(),
            balance,
            transaction_count: transactions.len(),
        })
    }

    /// Calculate the current balance for an account
    pub fn calculate_balance(&self, account_id: AccountId) -> ExpenseResult<Money> {
        let account = self
            .storage
            .accounts
            .get(account_id)?
            .ok_or_else(|| ExpenseError::account_not_found(account_id.to_string()))?;

        Ok(self.get_summary(&account)?.balance)
    }

    /// Sum of every account balance
    pub fn total_balance(&self) -> ExpenseResult<Money> {
        Ok(self
            .list_with_balances()?
            .iter()
            .map(|summary| summary.balance)
            .sum())
    }

    pub fn update(&self, id: AccountId, changes: AccountUpdate) -> ExpenseResult<Account> {
        let mut account = self
            .storage
            .accounts
            .get(id)?
            .ok_or_else(|| ExpenseError::account_not_found(id.to_string()))?;

        if let Some(new_name) = changes.name {
            let new_name = new_name.trim();
            if self.storage.accounts.name_exists(new_name, Some(id))? {
                return Err(ExpenseError::Duplicate {
                    entity_type: "Account",
                    identifier: new_name.to_string(),
                });
            }
            account.name = new_name.to_string();
        }
        if let Some(account_type) = changes.account_type {
            account.account_type = account_type;
        }
        if let Some(credit_limit) = changes.credit_limit {
            account.credit_limit = credit_limit;
        }
        if let Some(icon) = changes.icon {
            account.icon = icon;
        }
        if let Some(color) = changes.color {
            account.color = color;
        }

        account.updated_at = Utc::now();

        account
            .validate()
            .map_err(|e| ExpenseError::Validation(e.to_string()))?;

        self.storage.accounts.upsert(account.clone())?;
        self.storage.accounts.save()?;
        self.storage.notify(DataChange::Accounts);

        info!(account = %account.name, "Updated account");
        Ok(account)
    }

    /// Delete an account that no transaction refers to
    pub fn delete(&self, id: AccountId) -> ExpenseResult<Account> {
        let account = self
            .storage
            .accounts
            .get(id)?
            .ok_or_else(|| ExpenseError::account_not_found(id.to_string()))?;

        if self.storage.transactions.count_by_account(id)? > 0 {
            return Err(ExpenseError::InUse {
                entity_type: "Account",
                identifier: account.name,
            });
        }

        self.storage.accounts.delete(id)?;
        self.storage.accounts.save()?;
        self.storage.notify(DataChange::Accounts);

        info!(account = %account.name, "Deleted account");
        Ok(account)
    }

    /// Put the listed accounts first, in the given order
    pub fn reorder(&self, order: &[AccountId]) -> ExpenseResult<Vec<Account>> {
        let accounts = self.storage.accounts.reorder(order)?;
        self.storage.accounts.save()?;
        self.storage.notify(DataChange::Accounts);

        info!(count = order.len(), "Reordered accounts");
        Ok(accounts)
    }
}
