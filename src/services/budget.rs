//! Budget service
//!
//! Budget CRUD plus spend-vs-limit evaluation. Evaluation always resolves
//! "all accounts" and "all categories" against the live lists, and a failed
//! transaction lookup degrades to zero spent instead of failing the list.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{
    month_key, parse_month_key, AccountId, Amount, Budget, BudgetColor, BudgetId, CategoryId,
    Currency, Money, Selection, Transaction, TransactionType,
};
use crate::storage::{DataChange, Storage, TransactionRepository};

use super::date_range::{first_of_next_month, local_midnight};
use super::filter::TransactionQuery;

/// Source of transactions for budget evaluation
pub trait TransactionLookup {
    fn find(&self, query: &TransactionQuery) -> ExpenseResult<Vec<Transaction>>;
}

impl TransactionLookup for TransactionRepository {
    fn find(&self, query: &TransactionQuery) -> ExpenseResult<Vec<Transaction>> {
        query.fetch(self)
    }
}

/// A budget with its evaluated spend
#[derive(Debug, Clone, Serialize)]
pub struct BudgetSummary {
    pub budget: Budget,
    pub percent: f64,
    pub spent: Amount,
    pub limit: Amount,
    pub color: BudgetColor,
}

/// Evaluation window for a budget
///
/// Starts at the first day of the budget's month and ends at the start of
/// the month after *today's* month, whatever month the budget is for.
/// Transactions outside the budget's own month are dropped afterwards by
/// matching their `MM-YYYY` key.
pub fn budget_window(budget: &Budget, today: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let month_start = parse_month_key(&budget.selected_month)?;
    Some((
        local_midnight(month_start),
        local_midnight(first_of_next_month(today)),
    ))
}

/// `spent / limit * 100`; a zero limit is 0% until anything is spent
pub fn spent_percent(spent: Money, limit: Money) -> f64 {
    if limit.is_zero() {
        if spent.is_zero() {
            0.0
        } else {
            f64::INFINITY
        }
    } else {
        spent.cents() as f64 * 100.0 / limit.cents() as f64
    }
}

/// Evaluate one budget against the given live account and category ids
pub fn evaluate_budget(
    lookup: &dyn TransactionLookup,
    budget: &Budget,
    live_accounts: &[AccountId],
    live_categories: &[CategoryId],
    currency: &Currency,
    today: NaiveDate,
) -> BudgetSummary {
    let spent = match spent_for(lookup, budget, live_accounts, live_categories, today) {
        Ok(spent) => spent,
        Err(e) => {
            warn!(budget = %budget.name, error = %e, "Budget transaction lookup failed, treating spent as zero");
            Money::zero()
        }
    };

    let percent = spent_percent(spent, budget.amount);
    BudgetSummary {
        budget: budget.clone(),
        percent,
        spent: currency.amount(spent),
        limit: currency.amount(budget.amount),
        color: BudgetColor::for_percent(percent),
    }
}

fn spent_for(
    lookup: &dyn TransactionLookup,
    budget: &Budget,
    live_accounts: &[AccountId],
    live_categories: &[CategoryId],
    today: NaiveDate,
) -> ExpenseResult<Money> {
    let (start, end) = budget_window(budget, today).ok_or_else(|| {
        ExpenseError::Validation(format!("Invalid budget month '{}'", budget.selected_month))
    })?;

    let accounts = budget.accounts.resolve(|| live_accounts.to_vec());
    let categories = budget.categories.resolve(|| live_categories.to_vec());
    // An empty id list would act as a wildcard in the query
    if accounts.is_empty() || categories.is_empty() {
        return Ok(Money::zero());
    }

    let query = TransactionQuery {
        accounts: Selection::Only(accounts),
        categories: Selection::Only(categories),
        types: Selection::All,
        start,
        end,
    };

    let spent = lookup
        .find(&query)?
        .iter()
        .filter(|t| t.month_and_year() == budget.selected_month)
        .filter(|t| t.transaction_type == TransactionType::Expense)
        .map(|t| t.amount)
        .sum();
    Ok(spent)
}

/// Fields to change on an existing budget
#[derive(Debug, Clone, Default)]
pub struct BudgetUpdate {
    pub name: Option<String>,
    pub amount: Option<Money>,
    pub selected_month: Option<String>,
    pub accounts: Option<Selection<AccountId>>,
    pub categories: Option<Selection<CategoryId>>,
}

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

impl<'a> BudgetService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(
        &self,
        name: &str,
        amount: Money,
        selected_month: &str,
        accounts: Selection<AccountId>,
        categories: Selection<CategoryId>,
    ) -> ExpenseResult<Budget> {
        let mut budget = Budget::new(name.trim(), amount, selected_month.trim());
        budget.accounts = accounts;
        budget.categories = categories;

        self.check(&budget)?;

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;
        self.storage.notify(DataChange::Budgets);

        info!(budget = %budget.name, month = %budget.selected_month, "Created budget");
        Ok(budget)
    }

    pub fn update(&self, id: BudgetId, changes: BudgetUpdate) -> ExpenseResult<Budget> {
        let mut budget = self
            .storage
            .budgets
            .get(id)?
            .ok_or_else(|| ExpenseError::budget_not_found(id.to_string()))?;

        if let Some(name) = changes.name {
            budget.name = name.trim().to_string();
        }
        if let Some(amount) = changes.amount {
            budget.amount = amount;
        }
        if let Some(month) = changes.selected_month {
            budget.selected_month = month.trim().to_string();
        }
        if let Some(accounts) = changes.accounts {
            budget.accounts = accounts;
        }
        if let Some(categories) = changes.categories {
            budget.categories = categories;
        }
        budget.updated_at = Utc::now();

        self.check(&budget)?;

        self.storage.budgets.upsert(budget.clone())?;
        self.storage.budgets.save()?;
        self.storage.notify(DataChange::Budgets);

        info!(budget = %budget.name, "Updated budget");
        Ok(budget)
    }

    pub fn delete(&self, id: BudgetId) -> ExpenseResult<Budget> {
        let budget = self
            .storage
            .budgets
            .get(id)?
            .ok_or_else(|| ExpenseError::budget_not_found(id.to_string()))?;

        self.storage.budgets.delete(id)?;
        self.storage.budgets.save()?;
        self.storage.notify(DataChange::Budgets);

        info!(budget = %budget.name, "Deleted budget");
        Ok(budget)
    }

    pub fn get(&self, id: BudgetId) -> ExpenseResult<Option<Budget>> {
        self.storage.budgets.get(id)
    }

    /// Find a budget by name or ID string
    pub fn find(&self, identifier: &str) -> ExpenseResult<Option<Budget>> {
        if let Some(budget) = self.storage.budgets.get_by_name(identifier)? {
            return Ok(Some(budget));
        }
        if let Ok(id) = identifier.parse::<BudgetId>() {
            return self.storage.budgets.get(id);
        }
        // Short ids as shown in tables
        Ok(self
            .storage
            .budgets
            .get_all()?
            .into_iter()
            .find(|b| b.id.short() == identifier))
    }

    pub fn resolve(&self, identifier: &str) -> ExpenseResult<Budget> {
        self.find(identifier)?
            .ok_or_else(|| ExpenseError::budget_not_found(identifier))
    }

    /// All budgets, or those for one `MM-YYYY` month
    pub fn list(&self, month: Option<&str>) -> ExpenseResult<Vec<Budget>> {
        match month {
            Some(month) => self.storage.budgets.get_for_month(month),
            None => self.storage.budgets.get_all(),
        }
    }

    /// Evaluate one budget against the current live accounts and categories
    pub fn evaluate(&self, budget: &Budget, currency: &Currency, today: NaiveDate) -> BudgetSummary {
        let live_accounts = self.live_accounts();
        let live_categories = self.live_categories();
        evaluate_budget(
            &self.storage.transactions,
            budget,
            &live_accounts,
            &live_categories,
            currency,
            today,
        )
    }

    /// Evaluate every listed budget
    pub fn evaluate_all(
        &self,
        month: Option<&str>,
        currency: &Currency,
        today: NaiveDate,
    ) -> ExpenseResult<Vec<BudgetSummary>> {
        let budgets = self.list(month)?;
        let live_accounts = self.live_accounts();
        let live_categories = self.live_categories();

        Ok(budgets
            .iter()
            .map(|budget| {
                evaluate_budget(
                    &self.storage.transactions,
                    budget,
                    &live_accounts,
                    &live_categories,
                    currency,
                    today,
                )
            })
            .collect())
    }

    /// Month key for today on the local calendar
    pub fn current_month() -> String {
        month_key(Local::now().date_naive())
    }

    fn live_accounts(&self) -> Vec<AccountId> {
        self.storage.accounts.ids().unwrap_or_else(|e| {
            warn!(error = %e, "Could not list accounts for budget evaluation");
            Vec::new()
        })
    }

    fn live_categories(&self) -> Vec<CategoryId> {
        self.storage.categories.ids().unwrap_or_else(|e| {
            warn!(error = %e, "Could not list categories for budget evaluation");
            Vec::new()
        })
    }

    fn check(&self, budget: &Budget) -> ExpenseResult<()> {
        budget
            .validate()
            .map_err(|e| ExpenseError::Validation(e.to_string()))?;

        for id in budget.accounts.items() {
            if !self.storage.accounts.exists(*id)? {
                return Err(ExpenseError::account_not_found(id.to_string()));
            }
        }
        for id in budget.categories.items() {
            if self.storage.categories.get(*id)?.is_none() {
                return Err(ExpenseError::category_not_found(id.to_string()));
            }
        }
        Ok(())
    }
}
