//! Transaction service
//!
//! Provides business logic for transaction management including CRUD
//! operations, reference checks, and defaulting the account and category
//! from the user's preferences.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{
    AccountId, CategoryId, CategoryType, Money, Transaction, TransactionId, TransactionType,
};
use crate::preferences::PreferenceStore;
use crate::storage::{DataChange, Storage};

use super::filter::TransactionQuery;

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
    prefs: Option<&'a PreferenceStore>,
}

/// Input for creating a new transaction
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub transaction_type: TransactionType,
    pub amount: Money,
    /// Falls back to the default category for the type
    pub category_id: Option<CategoryId>,
    /// Falls back to the default account
    pub from_account_id: Option<AccountId>,
    pub to_account_id: Option<AccountId>,
    pub created_on: DateTime<Utc>,
    pub notes: Option<String>,
}

impl NewTransaction {
    pub fn new(transaction_type: TransactionType, amount: Money, created_on: DateTime<Utc>) -> Self {
        Self {
            transaction_type,
            amount,
            category_id: None,
            from_account_id: None,
            to_account_id: None,
            created_on,
            notes: None,
        }
    }
}

/// Fields to change on an existing transaction
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub transaction_type: Option<TransactionType>,
    pub amount: Option<Money>,
    pub category_id: Option<CategoryId>,
    pub from_account_id: Option<AccountId>,
    pub to_account_id: Option<Option<AccountId>>,
    pub created_on: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            prefs: None,
        }
    }

    /// Use the stored default account and categories for omitted fields
    pub fn with_preferences(mut self, prefs: &'a PreferenceStore) -> Self {
        self.prefs = Some(prefs);
        self
    }

    pub fn create(&self, input: NewTransaction) -> ExpenseResult<Transaction> {
        let from_account_id = match input.from_account_id {
            Some(id) => id,
            None => self.default_account()?,
        };
        let category_id = match input.category_id {
            Some(id) => id,
            None => self.default_category(input.transaction_type)?,
        };

        let mut txn = Transaction::new(
            input.transaction_type,
            input.amount,
            category_id,
            from_account_id,
            input.created_on,
        );
        txn.to_account_id = input.to_account_id;
        if let Some(notes) = input.notes {
            txn.notes = notes.trim().to_string();
        }

        self.check(&txn)?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;
        self.storage.notify(DataChange::Transactions);

        info!(
            transaction = %txn.id,
            kind = %txn.transaction_type,
            amount = %txn.amount,
            "Created transaction"
        );
        Ok(txn)
    }

    pub fn get(&self, id: TransactionId) -> ExpenseResult<Option<Transaction>> {
        self.storage.transactions.get(id)
    }

    /// Find a transaction by full or short ID
    pub fn find(&self, identifier: &str) -> ExpenseResult<Option<Transaction>> {
        if let Ok(id) = identifier.parse::<TransactionId>() {
            return self.storage.transactions.get(id);
        }

        Ok(self
            .storage
            .transactions
            .get_matching(|t| t.id.short() == identifier)?
            .into_iter()
            .next())
    }

    /// Like `find`, but a missing transaction is an error
    pub fn resolve(&self, identifier: &str) -> ExpenseResult<Transaction> {
        self.find(identifier)?
            .ok_or_else(|| ExpenseError::transaction_not_found(identifier))
    }

    /// Transactions matching the query, newest first
    pub fn list(&self, query: &TransactionQuery, limit: Option<usize>) -> ExpenseResult<Vec<Transaction>> {
        let mut transactions = query.fetch(&self.storage.transactions)?;
        if let Some(limit) = limit {
            transactions.truncate(limit);
        }
        Ok(transactions)
    }

    pub fn count(&self) -> ExpenseResult<usize> {
        self.storage.transactions.count()
    }

    pub fn update(&self, id: TransactionId, changes: TransactionUpdate) -> ExpenseResult<Transaction> {
        let mut txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| ExpenseError::transaction_not_found(id.to_string()))?;

        if let Some(transaction_type) = changes.transaction_type {
            txn.transaction_type = transaction_type;
            if !transaction_type.is_transfer() && changes.to_account_id.is_none() {
                txn.to_account_id = None;
            }
        }
        if let Some(amount) = changes.amount {
            txn.amount = amount;
        }
        if let Some(category_id) = changes.category_id {
            txn.category_id = category_id;
        }
        if let Some(from_account_id) = changes.from_account_id {
            txn.from_account_id = from_account_id;
        }
        if let Some(to_account_id) = changes.to_account_id {
            txn.to_account_id = to_account_id;
        }
        if let Some(created_on) = changes.created_on {
            txn.created_on = created_on;
        }
        if let Some(notes) = changes.notes {
            txn.notes = notes.trim().to_string();
        }
        txn.updated_at = Utc::now();

        self.check(&txn)?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;
        self.storage.notify(DataChange::Transactions);

        info!(transaction = %txn.id, "Updated transaction");
        Ok(txn)
    }

    pub fn delete(&self, id: TransactionId) -> ExpenseResult<Transaction> {
        let txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| ExpenseError::transaction_not_found(id.to_string()))?;

        self.storage.transactions.delete(id)?;
        self.storage.transactions.save()?;
        self.storage.notify(DataChange::Transactions);

        info!(transaction = %txn.id, "Deleted transaction");
        Ok(txn)
    }

    /// Validate the transaction and the records it points at
    fn check(&self, txn: &Transaction) -> ExpenseResult<()> {
        txn.validate()
            .map_err(|e| ExpenseError::Validation(e.to_string()))?;

        for account_id in std::iter::once(txn.from_account_id).chain(txn.to_account_id) {
            if self.storage.accounts.get(account_id)?.is_none() {
                return Err(ExpenseError::account_not_found(account_id.to_string()));
            }
        }

        let category = self
            .storage
            .categories
            .get(txn.category_id)?
            .ok_or_else(|| ExpenseError::category_not_found(txn.category_id.to_string()))?;

        let expected = match txn.transaction_type {
            TransactionType::Income => Some(CategoryType::Income),
            TransactionType::Expense => Some(CategoryType::Expense),
            TransactionType::Transfer => None,
        };
        if let Some(expected) = expected {
            if category.category_type != expected {
                return Err(ExpenseError::Validation(format!(
                    "Category '{}' is not an {} category",
                    category.name,
                    expected.to_string().to_lowercase()
                )));
            }
        }

        Ok(())
    }

    fn default_account(&self) -> ExpenseResult<AccountId> {
        if let Some(prefs) = self.prefs {
            if let Some(id) = prefs.default_account()? {
                return Ok(id);
            }
        }
        Err(ExpenseError::Validation(
            "No account given and no default account set".into(),
        ))
    }

    fn default_category(&self, transaction_type: TransactionType) -> ExpenseResult<CategoryId> {
        let category_type = match transaction_type {
            TransactionType::Income => CategoryType::Income,
            TransactionType::Expense | TransactionType::Transfer => CategoryType::Expense,
        };
        if let Some(prefs) = self.prefs {
            if let Some(id) = prefs.default_category(category_type)? {
                return Ok(id);
            }
        }
        Err(ExpenseError::Validation(format!(
            "No category given and no default {} category set",
            category_type.to_string().to_lowercase()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::ExpensePaths;
    use crate::models::{Account, AccountType, Category, Selection};
    use chrono::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        storage: Storage,
        cash: AccountId,
        bank: AccountId,
        food: CategoryId,
        salary: CategoryId,
    }

    fn setup() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let paths = ExpensePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let cash = Account::new("Cash", AccountType::Regular);
        let bank = Account::new("Bank", AccountType::Bank);
        let food = Category::new("Food", CategoryType::Expense);
        let salary = Category::new("Salary", CategoryType::Income);
        let ids = (cash.id, bank.id, food.id, salary.id);

        storage.accounts.upsert(cash).unwrap();
        storage.accounts.upsert(bank).unwrap();
        storage.categories.upsert(food).unwrap();
        storage.categories.upsert(salary).unwrap();

        Fixture {
            _temp_dir: temp_dir,
            storage,
            cash: ids.0,
            bank: ids.1,
            food: ids.2,
            salary: ids.3,
        }
    }

    fn expense(f: &Fixture, units: i64) -> NewTransaction {
        NewTransaction {
            category_id: Some(f.food),
            from_account_id: Some(f.cash),
            ..NewTransaction::new(TransactionType::Expense, Money::from_units(units), Utc::now())
        }
    }

    #[test]
    fn test_create_and_find() {
        let f = setup();
        let service = TransactionService::new(&f.storage);

        let txn = service.create(expense(&f, 12)).unwrap();

        assert_eq!(service.count().unwrap(), 1);
        assert!(service.find(&txn.id.short()).unwrap().is_some());
        assert!(service.find(&txn.id.as_key()).unwrap().is_some());
        assert!(service.resolve("txn-00000000").unwrap_err().is_not_found());
    }

    #[test]
    fn test_create_rejects_unknown_account() {
        let f = setup();
        let service = TransactionService::new(&f.storage);

        let input = NewTransaction {
            from_account_id: Some(AccountId::new()),
            ..expense(&f, 5)
        };
        assert!(service.create(input).unwrap_err().is_not_found());
    }

    #[test]
    fn test_category_type_must_match() {
        let f = setup();
        let service = TransactionService::new(&f.storage);

        let input = NewTransaction {
            category_id: Some(f.salary),
            ..expense(&f, 5)
        };
        assert!(service.create(input).unwrap_err().is_validation());
    }

    #[test]
    fn test_transfer_needs_distinct_destination() {
        let f = setup();
        let service = TransactionService::new(&f.storage);

        let same = NewTransaction {
            category_id: Some(f.food),
            from_account_id: Some(f.cash),
            to_account_id: Some(f.cash),
            ..NewTransaction::new(TransactionType::Transfer, Money::from_units(5), Utc::now())
        };
        assert!(service.create(same).unwrap_err().is_validation());

        let ok = NewTransaction {
            category_id: Some(f.food),
            from_account_id: Some(f.cash),
            to_account_id: Some(f.bank),
            ..NewTransaction::new(TransactionType::Transfer, Money::from_units(5), Utc::now())
        };
        assert!(service.create(ok).is_ok());
    }

    #[test]
    fn test_defaults_from_preferences() {
        let f = setup();
        let prefs = PreferenceStore::in_memory();
        prefs.set_default_account(Some(f.bank)).unwrap();
        prefs
            .set_default_category(CategoryType::Income, Some(f.salary))
            .unwrap();

        let service = TransactionService::new(&f.storage).with_preferences(&prefs);
        let txn = service
            .create(NewTransaction::new(
                TransactionType::Income,
                Money::from_units(900),
                Utc::now(),
            ))
            .unwrap();

        assert_eq!(txn.from_account_id, f.bank);
        assert_eq!(txn.category_id, f.salary);

        let no_default = service.create(NewTransaction::new(
            TransactionType::Expense,
            Money::from_units(1),
            Utc::now(),
        ));
        assert!(no_default.unwrap_err().is_validation());
    }

    #[test]
    fn test_update_to_income_clears_destination() {
        let f = setup();
        let service = TransactionService::new(&f.storage);

        let transfer = service
            .create(NewTransaction {
                category_id: Some(f.salary),
                from_account_id: Some(f.cash),
                to_account_id: Some(f.bank),
                ..NewTransaction::new(TransactionType::Transfer, Money::from_units(5), Utc::now())
            })
            .unwrap();

        let income = service
            .update(
                transfer.id,
                TransactionUpdate {
                    transaction_type: Some(TransactionType::Income),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(income.to_account_id, None);
        assert_eq!(income.transaction_type, TransactionType::Income);
    }

    #[test]
    fn test_update_rejects_zero_amount() {
        let f = setup();
        let service = TransactionService::new(&f.storage);
        let txn = service.create(expense(&f, 3)).unwrap();

        let result = service.update(
            txn.id,
            TransactionUpdate {
                amount: Some(Money::zero()),
                ..Default::default()
            },
        );
        assert!(result.unwrap_err().is_validation());
        assert_eq!(service.get(txn.id).unwrap().unwrap().amount, Money::from_units(3));
    }

    #[test]
    fn test_list_with_query_and_limit() {
        let f = setup();
        let service = TransactionService::new(&f.storage);
        let now = Utc::now();

        for days in 0..3 {
            service
                .create(NewTransaction {
                    created_on: now - Duration::days(days),
                    ..expense(&f, 1)
                })
                .unwrap();
        }
        service
            .create(NewTransaction {
                category_id: Some(f.salary),
                from_account_id: Some(f.bank),
                ..NewTransaction::new(TransactionType::Income, Money::from_units(50), now)
            })
            .unwrap();

        let query = TransactionQuery {
            accounts: Selection::Only(vec![f.cash]),
            categories: Selection::All,
            types: Selection::All,
            start: now - Duration::days(30),
            end: now + Duration::seconds(1),
        };
        assert_eq!(service.list(&query, None).unwrap().len(), 3);

        let newest = service.list(&query, Some(1)).unwrap();
        assert_eq!(newest.len(), 1);
        assert_eq!(newest[0].created_on, now);
    }

    #[test]
    fn test_delete() {
        let f = setup();
        let service = TransactionService::new(&f.storage);
        let txn = service.create(expense(&f, 3)).unwrap();

        service.delete(txn.id).unwrap();
        assert_eq!(service.count().unwrap(), 0);
        assert!(service.delete(txn.id).unwrap_err().is_not_found());
    }
}
