//! Report service
//!
//! Read-only views over a filtered set of transactions: the overview shown
//! on the dashboard, trend buckets for charts, and per-category breakdowns
//! with category names resolved.

use chrono::Weekday;
use serde::Serialize;

use crate::error::ExpenseResult;
use crate::models::{Amount, Currency, DateRangeModel, GroupType, TransactionType};
use crate::storage::Storage;

use super::aggregation::{self, DayGroup, Totals, TrendBucket, WholeAverageData};
use super::filter::TransactionQuery;

/// Totals, averages and day groups for one window
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub totals: Totals,
    pub income: Amount,
    pub expense: Amount,
    pub net: Amount,
    pub averages: WholeAverageData,
    pub groups: Vec<DayGroup>,
    pub transaction_count: usize,
}

/// A category's share with its display name
#[derive(Debug, Clone, Serialize)]
pub struct CategoryLine {
    pub name: String,
    pub amount: Amount,
    pub count: usize,
    pub percent: f64,
}

pub struct ReportService<'a> {
    storage: &'a Storage,
}

impl<'a> ReportService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn overview(
        &self,
        query: &TransactionQuery,
        range: &DateRangeModel,
        currency: &Currency,
        week_start: Weekday,
        date_format: &str,
    ) -> ExpenseResult<Overview> {
        let transactions = query.fetch(&self.storage.transactions)?;
        let totals = aggregation::totals(&transactions);

        Ok(Overview {
            income: currency.amount(totals.income),
            expense: currency.amount(totals.expense),
            net: currency.amount(totals.net()),
            averages: aggregation::averages(&totals, range, week_start, currency),
            groups: aggregation::group_by_day(&transactions, currency, date_format),
            transaction_count: transactions.len(),
            totals,
        })
    }

    pub fn trend(&self, query: &TransactionQuery, group_type: GroupType) -> ExpenseResult<Vec<TrendBucket>> {
        let transactions = query.fetch(&self.storage.transactions)?;
        Ok(aggregation::trend(&transactions, group_type))
    }

    /// Category breakdown for one type, largest first
    pub fn categories(
        &self,
        query: &TransactionQuery,
        transaction_type: TransactionType,
        currency: &Currency,
    ) -> ExpenseResult<Vec<CategoryLine>> {
        let transactions = query.fetch(&self.storage.transactions)?;

        aggregation::category_breakdown(&transactions, transaction_type)
            .into_iter()
            .map(|share| {
                let name = self
                    .storage
                    .categories
                    .get(share.category_id)?
                    .map(|c| c.name)
                    .unwrap_or_else(|| share.category_id.to_string());
                Ok(CategoryLine {
                    name,
                    amount: currency.amount(share.amount),
                    count: share.count,
                    percent: share.percent,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::ExpensePaths;
    use crate::models::{Account, AccountType, Category, CategoryType, Money, Transaction};
    use crate::services::date_range;
    use chrono::{DateTime, Local, TimeZone, Utc};
    use tempfile::TempDir;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(2026, 10, day, hour, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn setup() -> (TempDir, Storage, Category) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Storage::new(ExpensePaths::with_base_dir(temp_dir.path().to_path_buf())).unwrap();
        storage.load_all().unwrap();

        let cash = Account::new("Cash", AccountType::Regular);
        let food = Category::new("Food", CategoryType::Expense);
        let salary = Category::new("Salary", CategoryType::Income);

        let txns = [
            Transaction::new(TransactionType::Income, Money::from_units(1000), salary.id, cash.id, at(1, 9)),
            Transaction::new(TransactionType::Expense, Money::from_units(30), food.id, cash.id, at(2, 12)),
            Transaction::new(TransactionType::Expense, Money::from_units(10), food.id, cash.id, at(2, 18)),
        ];
        for txn in txns {
            storage.transactions.upsert(txn).unwrap();
        }
        storage.categories.upsert(salary).unwrap();
        storage.categories.upsert(food.clone()).unwrap();
        storage.accounts.upsert(cash).unwrap();

        (temp_dir, storage, food)
    }

    fn october() -> DateRangeModel {
        date_range::resolve(
            crate::models::DateRangeType::ThisMonth,
            (None, None),
            at(15, 12),
            Weekday::Sun,
        )
    }

    #[test]
    fn test_overview_totals_match_day_groups() {
        let (_temp_dir, storage, _) = setup();
        let service = ReportService::new(&storage);
        let range = october();

        let overview = service
            .overview(
                &TransactionQuery::in_range(&range),
                &range,
                &Currency::default(),
                Weekday::Sun,
                "%d/%m/%Y",
            )
            .unwrap();

        assert_eq!(overview.transaction_count, 3);
        assert_eq!(overview.totals.expense, Money::from_units(40));
        assert_eq!(overview.net.formatted, "$960.00");
        assert_eq!(overview.groups.len(), 2);

        let day_sum: Money = overview.groups.iter().map(|g| g.totals.net()).sum();
        assert_eq!(day_sum, overview.totals.net());
    }

    #[test]
    fn test_categories_resolve_names() {
        let (_temp_dir, storage, food) = setup();
        let service = ReportService::new(&storage);
        let range = october();

        let lines = service
            .categories(
                &TransactionQuery::in_range(&range),
                TransactionType::Expense,
                &Currency::default(),
            )
            .unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].name, food.name);
        assert_eq!(lines[0].count, 2);
        assert_eq!(lines[0].amount.formatted, "$40.00");
        assert!((lines[0].percent - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_trend_by_day() {
        let (_temp_dir, storage, _) = setup();
        let service = ReportService::new(&storage);
        let range = october();

        let buckets = service
            .trend(&TransactionQuery::in_range(&range), GroupType::Day)
            .unwrap();

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].totals.income, Money::from_units(1000));
        assert_eq!(buckets[1].totals.expense, Money::from_units(40));
    }
}
