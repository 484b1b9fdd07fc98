//! JSON-backed preference store with change notifications
//!
//! Every write is persisted immediately (atomic temp-file rename) and then
//! published on the store's change subject, after the value lock is
//! released, so observers can read the new value back.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, RwLock, Weak};

use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;

use crate::config::settings::Settings;
use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{
    AccountId, CategoryId, CategoryType, Currency, DateRangeType, Selection, SymbolPosition,
    TransactionType,
};
use crate::reactive::Subject;
use crate::storage::file_io::{read_json, write_json_atomic};

use super::keys::{self, Key, PreferenceType, PreferenceValue};

/// Published after a key is written or removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceChange {
    pub key: String,
}

pub struct PreferenceStore {
    path: Option<PathBuf>,
    values: RwLock<BTreeMap<String, PreferenceValue>>,
    changes: Subject<PreferenceChange>,
}

impl PreferenceStore {
    /// Open the store at `path`, reading whatever is already there
    pub fn open(path: PathBuf) -> ExpenseResult<Self> {
        let values: BTreeMap<String, PreferenceValue> = read_json(&path)?;
        debug!(path = %path.display(), keys = values.len(), "Loaded preferences");

        Ok(Self {
            path: Some(path),
            values: RwLock::new(values),
            changes: Subject::new(),
        })
    }

    /// A store that never touches disk
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: RwLock::new(BTreeMap::new()),
            changes: Subject::new(),
        }
    }

    /// Change notifications for every key
    pub fn changes(&self) -> &Subject<PreferenceChange> {
        &self.changes
    }

    pub fn get<T: PreferenceType>(&self, key: Key<T>) -> ExpenseResult<Option<T>> {
        let values = self.values.read().map_err(|e| {
            ExpenseError::Preference(format!("Failed to acquire read lock: {}", e))
        })?;

        Ok(values.get(key.name()).and_then(T::from_value))
    }

    pub fn set<T: PreferenceType>(&self, key: Key<T>, value: T) -> ExpenseResult<()> {
        self.write(key.name(), Some(value.into_value()))
    }

    pub fn remove<T>(&self, key: Key<T>) -> ExpenseResult<()> {
        self.write(key.name(), None)
    }

    fn write(&self, name: &str, value: Option<PreferenceValue>) -> ExpenseResult<()> {
        {
            let mut values = self.values.write().map_err(|e| {
                ExpenseError::Preference(format!("Failed to acquire write lock: {}", e))
            })?;

            let changed = match value {
                Some(value) => values.insert(name.to_string(), value.clone()) != Some(value),
                None => values.remove(name).is_some(),
            };
            if !changed {
                return Ok(());
            }

            if let Some(path) = &self.path {
                write_json_atomic(path, &*values)?;
            }
        }

        debug!(key = name, "Preference changed");
        self.changes.publish(PreferenceChange {
            key: name.to_string(),
        });
        Ok(())
    }

    /// Every stored value, keyed by name
    pub fn snapshot(&self) -> ExpenseResult<BTreeMap<String, PreferenceValue>> {
        let values = self.values.read().map_err(|e| {
            ExpenseError::Preference(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(values.clone())
    }

    /// Replace the whole store, notifying every key that was touched
    pub fn replace_all(&self, replacement: BTreeMap<String, PreferenceValue>) -> ExpenseResult<()> {
        let touched: BTreeSet<String> = {
            let mut values = self.values.write().map_err(|e| {
                ExpenseError::Preference(format!("Failed to acquire write lock: {}", e))
            })?;

            let touched = values
                .keys()
                .chain(replacement.keys())
                .filter(|k| values.get(*k) != replacement.get(*k))
                .cloned()
                .collect();

            *values = replacement;
            if let Some(path) = &self.path {
                write_json_atomic(path, &*values)?;
            }
            touched
        };

        for key in touched {
            self.changes.publish(PreferenceChange { key });
        }
        Ok(())
    }

    /// Stream one key: the current value first, then every change to it
    ///
    /// The subscription ends when the receiver is dropped or the store goes
    /// away.
    pub fn watch<T>(self: &Arc<Self>, key: Key<T>) -> Receiver<Option<T>>
    where
        T: PreferenceType + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let _ = tx.send(self.get(key).ok().flatten());

        let store: Weak<Self> = Arc::downgrade(self);
        self.changes.observe(move |change: &PreferenceChange| {
            if change.key != key.name() {
                return true;
            }
            match store.upgrade() {
                Some(store) => tx.send(store.get(key).ok().flatten()).is_ok(),
                None => false,
            }
        });
        rx
    }

    // Typed accessors

    /// Transaction-type filter; an empty stored set means all types
    pub fn transaction_types(&self) -> ExpenseResult<Selection<TransactionType>> {
        let stored = self.get(keys::TRANSACTION_TYPES)?.unwrap_or_default();
        let types = stored
            .iter()
            .filter_map(|s| s.parse::<u8>().ok())
            .filter_map(TransactionType::from_ordinal)
            .collect();
        Ok(Selection::from_items(types))
    }

    pub fn set_transaction_types(&self, types: &Selection<TransactionType>) -> ExpenseResult<()> {
        let stored = types
            .items()
            .iter()
            .map(|t| t.ordinal().to_string())
            .collect();
        self.set(keys::TRANSACTION_TYPES, stored)
    }

    pub fn selected_accounts(&self) -> ExpenseResult<Selection<AccountId>> {
        let stored = self.get(keys::SELECTED_ACCOUNTS)?.unwrap_or_default();
        Ok(Selection::from_items(parse_ids(&stored)))
    }

    pub fn set_selected_accounts(&self, accounts: &Selection<AccountId>) -> ExpenseResult<()> {
        let stored = accounts.items().iter().map(|id| id.as_key()).collect();
        self.set(keys::SELECTED_ACCOUNTS, stored)
    }

    pub fn selected_categories(&self) -> ExpenseResult<Selection<CategoryId>> {
        let stored = self.get(keys::SELECTED_CATEGORIES)?.unwrap_or_default();
        Ok(Selection::from_items(parse_ids(&stored)))
    }

    pub fn set_selected_categories(&self, categories: &Selection<CategoryId>) -> ExpenseResult<()> {
        let stored = categories.items().iter().map(|id| id.as_key()).collect();
        self.set(keys::SELECTED_CATEGORIES, stored)
    }

    /// Selected date-range type, `ThisMonth` when unset or unrecognised
    pub fn filter_type(&self) -> ExpenseResult<DateRangeType> {
        Ok(self
            .get(keys::DATE_FILTER_TYPE)?
            .and_then(DateRangeType::from_ordinal)
            .unwrap_or_default())
    }

    pub fn set_filter_type(&self, range_type: DateRangeType) -> ExpenseResult<()> {
        self.set(keys::DATE_FILTER_TYPE, range_type.ordinal())
    }

    /// Stored custom bounds, as given by the user
    pub fn custom_range(&self) -> ExpenseResult<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        let start = self.get(keys::DATE_RANGE_START)?.and_then(from_millis);
        let end = self.get(keys::DATE_RANGE_END)?.and_then(from_millis);
        Ok((start, end))
    }

    pub fn set_custom_range(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> ExpenseResult<()> {
        self.set(keys::DATE_RANGE_START, start.timestamp_millis())?;
        self.set(keys::DATE_RANGE_END, end.timestamp_millis())
    }

    pub fn is_preloaded(&self) -> ExpenseResult<bool> {
        Ok(self.get(keys::IS_PRELOADED)?.unwrap_or(false))
    }

    pub fn set_preloaded(&self, preloaded: bool) -> ExpenseResult<()> {
        self.set(keys::IS_PRELOADED, preloaded)
    }

    pub fn is_onboarding_completed(&self) -> ExpenseResult<bool> {
        Ok(self.get(keys::IS_ONBOARDING_COMPLETED)?.unwrap_or(false))
    }

    pub fn set_onboarding_completed(&self, completed: bool) -> ExpenseResult<()> {
        self.set(keys::IS_ONBOARDING_COMPLETED, completed)
    }

    pub fn symbol_position(&self) -> ExpenseResult<SymbolPosition> {
        Ok(self
            .get(keys::CURRENCY_SYMBOL_POSITION)?
            .map(SymbolPosition::from_ordinal)
            .unwrap_or_default())
    }

    pub fn set_symbol_position(&self, position: SymbolPosition) -> ExpenseResult<()> {
        self.set(keys::CURRENCY_SYMBOL_POSITION, position.ordinal())
    }

    /// The active currency, falling back to the configured default
    pub fn currency(&self, settings: &Settings) -> ExpenseResult<Currency> {
        let code = self
            .get(keys::CURRENCY_CODE)?
            .unwrap_or_else(|| settings.default_currency.clone());
        let currency = Currency::find(&code).unwrap_or_default();
        Ok(currency.with_position(self.symbol_position()?))
    }

    pub fn set_currency(&self, code: &str) -> ExpenseResult<Currency> {
        let currency =
            Currency::find(code).ok_or_else(|| ExpenseError::currency_not_found(code))?;
        self.set(keys::CURRENCY_CODE, currency.code.clone())?;
        Ok(currency)
    }

    pub fn default_account(&self) -> ExpenseResult<Option<AccountId>> {
        Ok(self
            .get(keys::DEFAULT_ACCOUNT)?
            .and_then(|s| s.parse().ok()))
    }

    pub fn set_default_account(&self, account: Option<AccountId>) -> ExpenseResult<()> {
        match account {
            Some(id) => self.set(keys::DEFAULT_ACCOUNT, id.as_key()),
            None => self.remove(keys::DEFAULT_ACCOUNT),
        }
    }

    pub fn default_category(&self, category_type: CategoryType) -> ExpenseResult<Option<CategoryId>> {
        Ok(self
            .get(default_category_key(category_type))?
            .and_then(|s| s.parse().ok()))
    }

    pub fn set_default_category(
        &self,
        category_type: CategoryType,
        category: Option<CategoryId>,
    ) -> ExpenseResult<()> {
        let key = default_category_key(category_type);
        match category {
            Some(id) => self.set(key, id.as_key()),
            None => self.remove(key),
        }
    }
}

fn default_category_key(category_type: CategoryType) -> Key<String> {
    match category_type {
        CategoryType::Income => keys::DEFAULT_INCOME_CATEGORY,
        CategoryType::Expense => keys::DEFAULT_EXPENSE_CATEGORY,
    }
}

fn parse_ids<T: std::str::FromStr>(stored: &BTreeSet<String>) -> Vec<T> {
    stored
        .iter()
        .filter_map(|s| match s.parse() {
            Ok(id) => Some(id),
            Err(_) => {
                debug!(value = %s, "Skipping unparseable stored id");
                None
            }
        })
        .collect()
}

fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_empty() {
        let store = PreferenceStore::in_memory();

        assert_eq!(store.filter_type().unwrap(), DateRangeType::ThisMonth);
        assert!(store.transaction_types().unwrap().is_all());
        assert!(store.selected_accounts().unwrap().is_all());
        assert_eq!(store.custom_range().unwrap(), (None, None));
        assert!(!store.is_preloaded().unwrap());
        assert!(!store.is_onboarding_completed().unwrap());
    }

    #[test]
    fn test_values_persist_across_open() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("preferences.json");
        let account = AccountId::new();

        {
            let store = PreferenceStore::open(path.clone()).unwrap();
            store.set_filter_type(DateRangeType::ThisYear).unwrap();
            store
                .set_selected_accounts(&Selection::Only(vec![account]))
                .unwrap();
            store.set_preloaded(true).unwrap();
        }

        let store = PreferenceStore::open(path).unwrap();
        assert_eq!(store.filter_type().unwrap(), DateRangeType::ThisYear);
        assert_eq!(
            store.selected_accounts().unwrap(),
            Selection::Only(vec![account])
        );
        assert!(store.is_preloaded().unwrap());
    }

    #[test]
    fn test_transaction_types_stored_as_ordinals() {
        let store = PreferenceStore::in_memory();
        store
            .set_transaction_types(&Selection::Only(vec![TransactionType::Expense]))
            .unwrap();

        let raw = store.get(keys::TRANSACTION_TYPES).unwrap().unwrap();
        assert!(raw.contains("1"));
        assert_eq!(
            store.transaction_types().unwrap(),
            Selection::Only(vec![TransactionType::Expense])
        );
    }

    #[test]
    fn test_custom_range_millis() {
        let store = PreferenceStore::in_memory();
        let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();

        store.set_custom_range(start, end).unwrap();

        assert_eq!(store.custom_range().unwrap(), (Some(start), Some(end)));
        assert_eq!(
            store.get(keys::DATE_RANGE_START).unwrap(),
            Some(start.timestamp_millis())
        );
    }

    #[test]
    fn test_set_publishes_only_real_changes() {
        let store = PreferenceStore::in_memory();
        let rx = store.changes().subscribe();

        store.set_preloaded(true).unwrap();
        store.set_preloaded(true).unwrap();

        assert_eq!(rx.try_recv().unwrap().key, "is_preloaded");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_watch_emits_current_then_updates() {
        let store = Arc::new(PreferenceStore::in_memory());
        store.set_filter_type(DateRangeType::Today).unwrap();

        let rx = store.watch(keys::DATE_FILTER_TYPE);
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), Some(0));

        store.set_preloaded(true).unwrap();
        store.set_filter_type(DateRangeType::All).unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(1)).unwrap(), Some(4));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_currency_falls_back_to_settings() {
        let store = PreferenceStore::in_memory();
        let mut settings = Settings::default();
        settings.default_currency = "GBP".into();

        assert_eq!(store.currency(&settings).unwrap().code, "GBP");

        store.set_currency("eur").unwrap();
        store.set_symbol_position(SymbolPosition::Suffix).unwrap();
        let currency = store.currency(&settings).unwrap();
        assert_eq!(currency.code, "EUR");
        assert_eq!(currency.position, SymbolPosition::Suffix);

        assert!(store.set_currency("ZZZ").unwrap_err().is_not_found());
    }

    #[test]
    fn test_default_category_per_type() {
        let store = PreferenceStore::in_memory();
        let food = CategoryId::new();

        store
            .set_default_category(CategoryType::Expense, Some(food))
            .unwrap();
        assert_eq!(
            store.default_category(CategoryType::Expense).unwrap(),
            Some(food)
        );
        assert_eq!(store.default_category(CategoryType::Income).unwrap(), None);

        store.set_default_category(CategoryType::Expense, None).unwrap();
        assert_eq!(store.default_category(CategoryType::Expense).unwrap(), None);
    }

    #[test]
    fn test_replace_all_notifies_touched_keys() {
        let store = PreferenceStore::in_memory();
        store.set_preloaded(true).unwrap();
        let rx = store.changes().subscribe();

        let mut replacement = BTreeMap::new();
        replacement.insert("is_preloaded".to_string(), PreferenceValue::Bool(true));
        replacement.insert("date_filter_type".to_string(), PreferenceValue::Int(0));
        store.replace_all(replacement).unwrap();

        let keys: Vec<String> = rx.try_iter().map(|c| c.key).collect();
        assert_eq!(keys, vec!["date_filter_type".to_string()]);
        assert_eq!(store.filter_type().unwrap(), DateRangeType::Today);
    }
}
