//! Account model
//!
//! Accounts are the wallets, bank accounts and cards money moves between.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::AccountId;
use super::money::Money;

/// Type of account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Cash, wallet
    #[default]
    Regular,
    /// Bank account
    Bank,
    /// Credit card
    Credit,
}

impl AccountType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "regular" | "cash" | "wallet" => Some(Self::Regular),
            "bank" | "bank_account" => Some(Self::Bank),
            "credit" | "credit_card" | "card" => Some(Self::Credit),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Regular => write!(f, "Regular"),
            Self::Bank => write!(f, "Bank"),
            Self::Credit => write!(f, "Credit Card"),
        }
    }
}

/// A financial account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    #[serde(default)]
    pub account_type: AccountType,

    /// Balance before any recorded transaction
    #[serde(default)]
    pub starting_balance: Money,

    /// Spending limit for credit cards
    #[serde(default)]
    pub credit_limit: Option<Money>,

    #[serde(default)]
    pub icon: String,

    /// Hex colour, e.g. "#43A546"
    #[serde(default)]
    pub color: String,

    /// Position in user-defined ordering
    #[serde(default)]
    pub sort_order: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: impl Into<String>, account_type: AccountType) -> Self {
        let now = Utc::now();
        Self {
            id: AccountId::new(),
            name: name.into(),
            account_type,
            starting_balance: Money::zero(),
            credit_limit: None,
            icon: "account_balance_wallet".into(),
            color: "#43A546".into(),
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_starting_balance(
        name: impl Into<String>,
        account_type: AccountType,
        starting_balance: Money,
    ) -> Self {
        let mut account = Self::new(name, account_type);
        account.starting_balance = starting_balance;
        account
    }

    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.name.trim().is_empty() {
            return Err(AccountValidationError::EmptyName);
        }
        if self.name.len() > 100 {
            return Err(AccountValidationError::NameTooLong(self.name.len()));
        }
        if let Some(limit) = self.credit_limit {
            if self.account_type != AccountType::Credit {
                return Err(AccountValidationError::CreditLimitOnNonCredit);
            }
            if limit.is_negative() {
                return Err(AccountValidationError::NegativeCreditLimit);
            }
        }
        Ok(())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountValidationError {
    EmptyName,
    NameTooLong(usize),
    CreditLimitOnNonCredit,
    NegativeCreditLimit,
}

impl fmt::Display for AccountValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Account name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Account name too long ({} chars, max 100)", len)
            }
            Self::CreditLimitOnNonCredit => {
                write!(f, "Only credit card accounts can have a credit limit")
            }
            Self::NegativeCreditLimit => write!(f, "Credit limit cannot be negative"),
        }
    }
}

impl std::error::Error for AccountValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_account_type() {
        assert_eq!(AccountType::parse("Cash"), Some(AccountType::Regular));
        assert_eq!(AccountType::parse("bank"), Some(AccountType::Bank));
        assert_eq!(AccountType::parse("card"), Some(AccountType::Credit));
        assert_eq!(AccountType::parse("loan"), None);
    }

    #[test]
    fn test_validation() {
        let mut account = Account::new("Wallet", AccountType::Regular);
        assert!(account.validate().is_ok());

        account.credit_limit = Some(Money::from_units(500));
        assert_eq!(
            account.validate(),
            Err(AccountValidationError::CreditLimitOnNonCredit)
        );

        account.account_type = AccountType::Credit;
        assert!(account.validate().is_ok());

        account.name = "  ".into();
        assert_eq!(account.validate(), Err(AccountValidationError::EmptyName));
    }
}
