//! Budget model
//!
//! A budget caps spending for one calendar month over a selection of
//! accounts and categories. The month is stored as an `MM-YYYY` key.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, BudgetId, CategoryId};
use super::money::Money;
use super::selection::Selection;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    pub name: String,

    /// Spending limit for the month
    pub amount: Money,

    /// Month in `MM-YYYY` form
    pub selected_month: String,

    #[serde(default)]
    pub accounts: Selection<AccountId>,

    #[serde(default)]
    pub categories: Selection<CategoryId>,

    #[serde(default)]
    pub icon: String,

    #[serde(default)]
    pub color: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(name: impl Into<String>, amount: Money, selected_month: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetId::new(),
            name: name.into(),
            amount,
            selected_month: selected_month.into(),
            accounts: Selection::All,
            categories: Selection::All,
            icon: "savings".into(),
            color: "#FF9800".into(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.name.trim().is_empty() {
            return Err(BudgetValidationError::EmptyName);
        }
        if !self.amount.is_positive() {
            return Err(BudgetValidationError::NonPositiveAmount);
        }
        if parse_month_key(&self.selected_month).is_none() {
            return Err(BudgetValidationError::InvalidMonth(
                self.selected_month.clone(),
            ));
        }
        if matches!(&self.accounts, Selection::Only(ids) if ids.is_empty()) {
            return Err(BudgetValidationError::EmptyAccountSelection);
        }
        if matches!(&self.categories, Selection::Only(ids) if ids.is_empty()) {
            return Err(BudgetValidationError::EmptyCategorySelection);
        }
        Ok(())
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.selected_month)
    }
}

/// Format a date's month as `MM-YYYY`
pub fn month_key(date: NaiveDate) -> String {
    format!("{:02}-{:04}", date.month(), date.year())
}

/// Parse an `MM-YYYY` key into the first day of that month
pub fn parse_month_key(key: &str) -> Option<NaiveDate> {
    let (month, year) = key.split_once('-')?;
    let digits = |part: &str, len: usize| part.len() == len && part.bytes().all(|b| b.is_ascii_digit());
    if !digits(month, 2) || !digits(year, 4) {
        return None;
    }
    let month: u32 = month.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Severity band for a budget's spent percentage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetColor {
    Green,
    LightGreen,
    Orange,
    Red,
}

impl BudgetColor {
    /// Map a percentage onto its band.
    ///
    /// Bands are closed on the right: 35 is green, 60 light green, 85 orange.
    /// Negative percentages are green; anything above 85 (or NaN) is red.
    pub fn for_percent(percent: f64) -> Self {
        if percent <= 35.0 {
            Self::Green
        } else if percent <= 60.0 {
            Self::LightGreen
        } else if percent <= 85.0 {
            Self::Orange
        } else {
            Self::Red
        }
    }

}

impl fmt::Display for BudgetColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Green => write!(f, "green"),
            Self::LightGreen => write!(f, "light-green"),
            Self::Orange => write!(f, "orange"),
            Self::Red => write!(f, "red"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    EmptyName,
    NonPositiveAmount,
    InvalidMonth(String),
    EmptyAccountSelection,
    EmptyCategorySelection,
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Budget name cannot be empty"),
            Self::NonPositiveAmount => write!(f, "Budget amount must be greater than zero"),
            Self::InvalidMonth(m) => write!(f, "Invalid budget month '{}', expected MM-YYYY", m),
            Self::EmptyAccountSelection => write!(f, "Select at least one account"),
            Self::EmptyCategorySelection => write!(f, "Select at least one category"),
        }
    }
}

impl std::error::Error for BudgetValidationError {}
