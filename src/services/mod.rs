//! Service layer for expense-cli
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, computed fields, and cross-entity operations. Date
//! ranges, filtering and aggregation are pure functions the services and the
//! dashboard share.

pub mod account;
pub mod aggregation;
pub mod budget;
pub mod category;
pub mod date_range;
pub mod filter;
pub mod report;
pub mod transaction;

pub use account::{AccountService, AccountSummary, AccountUpdate};
pub use budget::{BudgetService, BudgetSummary, BudgetUpdate, TransactionLookup};
pub use category::{CategoryService, CategoryUpdate};
pub use filter::TransactionQuery;
pub use report::{CategoryLine, Overview, ReportService};
pub use transaction::{NewTransaction, TransactionService, TransactionUpdate};
