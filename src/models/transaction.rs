//! Transaction model
//!
//! A transaction records a non-negative amount together with its type. The
//! sign is derived from the type: income adds, expense subtracts, and a
//! transfer moves money between two accounts without changing the net.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{AccountId, CategoryId, TransactionId};
use super::money::Money;

/// Kind of transaction
///
/// The ordinal (`Income = 0`, `Expense = 1`, `Transfer = 2`) is what the
/// preference store persists for the type filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub const ALL: [TransactionType; 3] = [Self::Income, Self::Expense, Self::Transfer];

    pub fn ordinal(&self) -> u8 {
        match self {
            Self::Income => 0,
            Self::Expense => 1,
            Self::Transfer => 2,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "income" | "in" => Some(Self::Income),
            "expense" | "out" => Some(Self::Expense),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }

    pub fn is_income(&self) -> bool {
        matches!(self, Self::Income)
    }

    pub fn is_expense(&self) -> bool {
        matches!(self, Self::Expense)
    }

    pub fn is_transfer(&self) -> bool {
        matches!(self, Self::Transfer)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "Income"),
            Self::Expense => write!(f, "Expense"),
            Self::Transfer => write!(f, "Transfer"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub transaction_type: TransactionType,

    /// Magnitude, never negative
    pub amount: Money,

    pub category_id: CategoryId,
    pub from_account_id: AccountId,

    /// Destination account, transfers only
    #[serde(default)]
    pub to_account_id: Option<AccountId>,

    /// When the money moved
    pub created_on: DateTime<Utc>,

    #[serde(default)]
    pub notes: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        transaction_type: TransactionType,
        amount: Money,
        category_id: CategoryId,
        from_account_id: AccountId,
        created_on: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TransactionId::new(),
            transaction_type,
            amount,
            category_id,
            from_account_id,
            to_account_id: None,
            created_on,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn transfer(
        amount: Money,
        category_id: CategoryId,
        from_account_id: AccountId,
        to_account_id: AccountId,
        created_on: DateTime<Utc>,
    ) -> Self {
        let mut txn = Self::new(
            TransactionType::Transfer,
            amount,
            category_id,
            from_account_id,
            created_on,
        );
        txn.to_account_id = Some(to_account_id);
        txn
    }

    /// Net effect on overall wealth: `+amount`, `-amount`, or zero for transfers
    pub fn signed_amount(&self) -> Money {
        match self.transaction_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
            TransactionType::Transfer => Money::zero(),
        }
    }

    /// Effect of this transaction on one account's balance
    pub fn flow_for(&self, account_id: AccountId) -> Money {
        let mut flow = Money::zero();
        if self.from_account_id == account_id {
            flow += match self.transaction_type {
                TransactionType::Income => self.amount,
                TransactionType::Expense | TransactionType::Transfer => -self.amount,
            };
        }
        if self.transaction_type.is_transfer() && self.to_account_id == Some(account_id) {
            flow += self.amount;
        }
        flow
    }

    /// Does this transaction touch the account on either side?
    pub fn involves_account(&self, account_id: &AccountId) -> bool {
        self.from_account_id == *account_id || self.to_account_id.as_ref() == Some(account_id)
    }

    /// Calendar day of `created_on` on the local clock
    pub fn local_date(&self) -> NaiveDate {
        self.created_on.with_timezone(&Local).date_naive()
    }

    /// Local month key in `MM-YYYY` form, matching `Budget::selected_month`
    pub fn month_and_year(&self) -> String {
        self.created_on
            .with_timezone(&Local)
            .format("%m-%Y")
            .to_string()
    }

    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !self.amount.is_positive() {
            return Err(TransactionValidationError::NonPositiveAmount);
        }

        match (self.transaction_type, self.to_account_id) {
            (TransactionType::Transfer, None) => {
                Err(TransactionValidationError::TransferWithoutDestination)
            }
            (TransactionType::Transfer, Some(to)) if to == self.from_account_id => {
                Err(TransactionValidationError::TransferToSameAccount)
            }
            (TransactionType::Income | TransactionType::Expense, Some(_)) => {
                Err(TransactionValidationError::DestinationOnNonTransfer)
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.local_date().format("%Y-%m-%d"),
            self.transaction_type,
            self.signed_amount()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NonPositiveAmount,
    TransferWithoutDestination,
    TransferToSameAccount,
    DestinationOnNonTransfer,
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount => write!(f, "Amount must be greater than zero"),
            Self::TransferWithoutDestination => {
                write!(f, "Transfers need a destination account")
            }
            Self::TransferToSameAccount => {
                write!(f, "Cannot transfer to the same account")
            }
            Self::DestinationOnNonTransfer => {
                write!(f, "Only transfers can have a destination account")
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(year, month, day, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_type_ordinals_round_trip() {
        for t in TransactionType::ALL {
            assert_eq!(TransactionType::from_ordinal(t.ordinal()), Some(t));
        }
        assert_eq!(TransactionType::from_ordinal(7), None);
    }

    #[test]
    fn test_signed_amount() {
        let cat = CategoryId::new();
        let acc = AccountId::new();
        let when = noon(2025, 3, 1);

        let income = Transaction::new(TransactionType::Income, Money::from_units(5), cat, acc, when);
        let expense = Transaction::new(TransactionType::Expense, Money::from_units(5), cat, acc, when);
        let transfer = Transaction::transfer(Money::from_units(5), cat, acc, AccountId::new(), when);

        assert_eq!(income.signed_amount().cents(), 500);
        assert_eq!(expense.signed_amount().cents(), -500);
        assert!(transfer.signed_amount().is_zero());
    }

    #[test]
    fn test_flow_for_transfer_accounts() {
        let from = AccountId::new();
        let to = AccountId::new();
        let txn = Transaction::transfer(Money::from_units(20), CategoryId::new(), from, to, noon(2025, 3, 1));

        assert_eq!(txn.flow_for(from).cents(), -2000);
        assert_eq!(txn.flow_for(to).cents(), 2000);
        assert!(txn.flow_for(AccountId::new()).is_zero());
        assert!(txn.involves_account(&to));
    }

    #[test]
    fn test_month_and_year_uses_local_calendar() {
        let txn = Transaction::new(
            TransactionType::Expense,
            Money::from_units(1),
            CategoryId::new(),
            AccountId::new(),
            noon(2025, 3, 9),
        );
        assert_eq!(txn.month_and_year(), "03-2025");
        assert_eq!(txn.local_date(), NaiveDate::from_ymd_opt(2025, 3, 9).unwrap());
    }

    #[test]
    fn test_validation() {
        let acc = AccountId::new();
        let cat = CategoryId::new();
        let when = noon(2025, 3, 1);

        let zero = Transaction::new(TransactionType::Expense, Money::zero(), cat, acc, when);
        assert_eq!(zero.validate(), Err(TransactionValidationError::NonPositiveAmount));

        let mut transfer = Transaction::transfer(Money::from_units(1), cat, acc, acc, when);
        assert_eq!(
            transfer.validate(),
            Err(TransactionValidationError::TransferToSameAccount)
        );
        transfer.to_account_id = None;
        assert_eq!(
            transfer.validate(),
            Err(TransactionValidationError::TransferWithoutDestination)
        );

        let mut income = Transaction::new(TransactionType::Income, Money::from_units(1), cat, acc, when);
        income.to_account_id = Some(AccountId::new());
        assert_eq!(
            income.validate(),
            Err(TransactionValidationError::DestinationOnNonTransfer)
        );
    }
}
