//! Typed preference keys
//!
//! Each key couples a persisted name with the value type stored under it, so
//! reading a key back can only ever yield the type it was written with.

use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// A stored preference value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PreferenceValue {
    Bool(bool),
    Int(i32),
    Long(i64),
    Text(String),
    StringSet(BTreeSet<String>),
}

/// Conversion between a Rust type and its stored form
pub trait PreferenceType: Sized {
    fn into_value(self) -> PreferenceValue;
    fn from_value(value: &PreferenceValue) -> Option<Self>;
}

impl PreferenceType for bool {
    fn into_value(self) -> PreferenceValue {
        PreferenceValue::Bool(self)
    }

    fn from_value(value: &PreferenceValue) -> Option<Self> {
        match value {
            PreferenceValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl PreferenceType for i32 {
    fn into_value(self) -> PreferenceValue {
        PreferenceValue::Int(self)
    }

    fn from_value(value: &PreferenceValue) -> Option<Self> {
        match value {
            PreferenceValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl PreferenceType for i64 {
    fn into_value(self) -> PreferenceValue {
        PreferenceValue::Long(self)
    }

    fn from_value(value: &PreferenceValue) -> Option<Self> {
        match value {
            PreferenceValue::Long(l) => Some(*l),
            _ => None,
        }
    }
}

impl PreferenceType for String {
    fn into_value(self) -> PreferenceValue {
        PreferenceValue::Text(self)
    }

    fn from_value(value: &PreferenceValue) -> Option<Self> {
        match value {
            PreferenceValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl PreferenceType for BTreeSet<String> {
    fn into_value(self) -> PreferenceValue {
        PreferenceValue::StringSet(self)
    }

    fn from_value(value: &PreferenceValue) -> Option<Self> {
        match value {
            PreferenceValue::StringSet(set) => Some(set.clone()),
            _ => None,
        }
    }
}

/// A named, typed preference key
pub struct Key<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.name)
    }
}

pub const TRANSACTION_TYPES: Key<BTreeSet<String>> = Key::new("transaction_types");
pub const SELECTED_ACCOUNTS: Key<BTreeSet<String>> = Key::new("selected_accounts");
pub const SELECTED_CATEGORIES: Key<BTreeSet<String>> = Key::new("selected_categories");
pub const DATE_FILTER_TYPE: Key<i32> = Key::new("date_filter_type");
pub const DATE_RANGE_START: Key<i64> = Key::new("date_range_start_date");
pub const DATE_RANGE_END: Key<i64> = Key::new("date_range_end_date");
pub const IS_PRELOADED: Key<bool> = Key::new("is_preloaded");
pub const IS_ONBOARDING_COMPLETED: Key<bool> = Key::new("is_on_boarding_completed");
pub const CURRENCY_CODE: Key<String> = Key::new("currency_code");
pub const CURRENCY_SYMBOL_POSITION: Key<i32> = Key::new("currency_symbol_position");
pub const DEFAULT_ACCOUNT: Key<String> = Key::new("default_account");
pub const DEFAULT_EXPENSE_CATEGORY: Key<String> = Key::new("default_expense_category");
pub const DEFAULT_INCOME_CATEGORY: Key<String> = Key::new("default_income_category");
