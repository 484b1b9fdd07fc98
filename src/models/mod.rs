//! Core data models for expense-cli
//!
//! Accounts, categories, transactions and budgets, plus the value types
//! (money, currency, selections, date ranges) they are built from.

pub mod account;
pub mod budget;
pub mod category;
pub mod currency;
pub mod date_range;
pub mod ids;
pub mod money;
pub mod selection;
pub mod transaction;

pub use account::{Account, AccountType};
pub use budget::{month_key, parse_month_key, Budget, BudgetColor};
pub use category::{Category, CategoryType};
pub use currency::{Amount, Currency, SymbolPosition};
pub use date_range::{DateRangeModel, DateRangeType, GroupType};
pub use ids::{AccountId, BudgetId, CategoryId, TransactionId};
pub use money::Money;
pub use selection::Selection;
pub use transaction::{Transaction, TransactionType};
