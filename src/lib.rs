//! expense-cli - terminal-based personal expense tracker
//!
//! This library provides the core of the expense tracker: accounts,
//! categories, transactions and monthly budgets stored as JSON, filtered by
//! date range and aggregated into totals, averages and trends.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (accounts, transactions, categories, budgets)
//! - `storage`: JSON file storage layer with change notifications
//! - `preferences`: Persistent key-value user preferences
//! - `services`: Business logic, date ranges, filtering and aggregation
//! - `dashboard`: Snapshot recomputed when data or preferences change
//! - `export`: CSV and PDF export
//! - `backup`: Backup archives and restore
//!
//! # Example
//!
//! ```rust,ignore
//! use expense_cli::config::{paths::ExpensePaths, settings::Settings};
//!
//! let paths = ExpensePaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```

pub mod backup;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod preferences;
pub mod reactive;
pub mod services;
pub mod storage;

pub use error::ExpenseError;
