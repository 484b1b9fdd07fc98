//! Aggregates over a filtered transaction set
//!
//! Totals by type, day groups for the transaction list, period-relative
//! averages, trend buckets and per-category breakdowns. All functions are
//! pure; callers fetch and filter first.

use std::collections::BTreeMap;

use chrono::{Datelike, Local, NaiveDate, Weekday};
use serde::Serialize;

use crate::models::{
    Amount, CategoryId, Currency, DateRangeModel, DateRangeType, GroupType, Money, Transaction,
    TransactionType,
};

use super::date_range::{days_in_month, days_in_year, weeks_in_month, weeks_in_year};

/// Sums by transaction type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub income: Money,
    pub expense: Money,
    pub transfer: Money,
}

impl Totals {
    pub fn add(&mut self, txn: &Transaction) {
        match txn.transaction_type {
            TransactionType::Income => self.income += txn.amount,
            TransactionType::Expense => self.expense += txn.amount,
            TransactionType::Transfer => self.transfer += txn.amount,
        }
    }

    /// Income minus expense
    pub fn net(&self) -> Money {
        self.income - self.expense
    }
}

pub fn totals<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Totals {
    let mut totals = Totals::default();
    for txn in transactions {
        totals.add(txn);
    }
    totals
}

/// Display colour for a signed total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AmountColor {
    Red,
    Green,
}

impl AmountColor {
    pub fn for_amount(amount: Money) -> Self {
        if amount.is_negative() {
            Self::Red
        } else {
            Self::Green
        }
    }
}

/// One calendar day of the transaction list
#[derive(Debug, Clone, Serialize)]
pub struct DayGroup {
    pub date: NaiveDate,
    pub formatted_date: String,
    pub totals: Totals,
    /// Income minus expense for the day
    pub total: Amount,
    pub color: AmountColor,
    /// Most recent first
    pub transactions: Vec<Transaction>,
}

/// Partition by local calendar day, newest day first
pub fn group_by_day(
    transactions: &[Transaction],
    currency: &Currency,
    date_format: &str,
) -> Vec<DayGroup> {
    let mut days: BTreeMap<NaiveDate, Vec<Transaction>> = BTreeMap::new();
    for txn in transactions {
        days.entry(txn.local_date()).or_default().push(txn.clone());
    }

    days.into_iter()
        .rev()
        .map(|(date, mut items)| {
            items.sort_by(|a, b| b.created_on.cmp(&a.created_on));
            let day_totals = totals(&items);
            let net = day_totals.net();
            DayGroup {
                date,
                formatted_date: date.format(date_format).to_string(),
                totals: day_totals,
                total: currency.amount(net),
                color: AmountColor::for_amount(net),
                transactions: items,
            }
        })
        .collect()
}

/// Day, week and month counts of the reference period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodLength {
    pub days: u32,
    pub weeks: u32,
    pub months: u32,
}

/// Length of the calendar period holding the range's start
///
/// Day, week and month ranges are measured against their month; year, all
/// and custom ranges against their year.
pub fn period_length(range: &DateRangeModel, week_start: Weekday) -> PeriodLength {
    let start = range.start.with_timezone(&Local).date_naive();
    match range.range_type {
        DateRangeType::Today | DateRangeType::ThisWeek | DateRangeType::ThisMonth => PeriodLength {
            days: days_in_month(start),
            weeks: weeks_in_month(start, week_start),
            months: 1,
        },
        DateRangeType::ThisYear | DateRangeType::All | DateRangeType::Custom => PeriodLength {
            days: days_in_year(start.year()),
            weeks: weeks_in_year(start.year(), week_start),
            months: 12,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AverageData {
    pub per_day: Amount,
    pub per_week: Amount,
    pub per_month: Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WholeAverageData {
    pub income: AverageData,
    pub expense: AverageData,
}

fn average(total: Money, period: PeriodLength, currency: &Currency) -> AverageData {
    AverageData {
        per_day: currency.amount(total.divide_by(period.days)),
        per_week: currency.amount(total.divide_by(period.weeks)),
        per_month: currency.amount(total.divide_by(period.months)),
    }
}

pub fn averages(
    totals: &Totals,
    range: &DateRangeModel,
    week_start: Weekday,
    currency: &Currency,
) -> WholeAverageData {
    let period = period_length(range, week_start);
    WholeAverageData {
        income: average(totals.income, period, currency),
        expense: average(totals.expense, period, currency),
    }
}

/// Totals for one chart bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendBucket {
    /// First day of the bucket
    pub start: NaiveDate,
    pub label: String,
    pub totals: Totals,
}

fn bucket_start(date: NaiveDate, group_type: GroupType) -> NaiveDate {
    match group_type {
        GroupType::Day => date,
        GroupType::Month => date.with_day(1).unwrap_or(date),
        GroupType::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
    }
}

fn bucket_label(start: NaiveDate, group_type: GroupType) -> String {
    match group_type {
        GroupType::Day => start.format("%d %b").to_string(),
        GroupType::Month => start.format("%b %Y").to_string(),
        GroupType::Year => start.format("%Y").to_string(),
    }
}

/// Bucketed totals, oldest first. Buckets without transactions are omitted.
pub fn trend(transactions: &[Transaction], group_type: GroupType) -> Vec<TrendBucket> {
    let mut buckets: BTreeMap<NaiveDate, Totals> = BTreeMap::new();
    for txn in transactions {
        buckets
            .entry(bucket_start(txn.local_date(), group_type))
            .or_default()
            .add(txn);
    }

    buckets
        .into_iter()
        .map(|(start, totals)| TrendBucket {
            start,
            label: bucket_label(start, group_type),
            totals,
        })
        .collect()
}

/// One category's share of a type's total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category_id: CategoryId,
    pub amount: Money,
    pub count: usize,
    pub percent: f64,
}

/// Per-category totals for one transaction type, largest first
pub fn category_breakdown(
    transactions: &[Transaction],
    transaction_type: TransactionType,
) -> Vec<CategoryShare> {
    let mut by_category: BTreeMap<CategoryId, (Money, usize)> = BTreeMap::new();
    for txn in transactions
        .iter()
        .filter(|t| t.transaction_type == transaction_type)
    {
        let entry = by_category.entry(txn.category_id).or_default();
        entry.0 += txn.amount;
        entry.1 += 1;
    }

    let grand_total: Money = by_category.values().map(|(amount, _)| *amount).sum();
    let mut shares: Vec<_> = by_category
        .into_iter()
        .map(|(category_id, (amount, count))| CategoryShare {
            category_id,
            amount,
            count,
            percent: if grand_total.is_zero() {
                0.0
            } else {
                amount.as_f64() / grand_total.as_f64() * 100.0
            },
        })
        .collect();
    shares.sort_by(|a, b| b.amount.cmp(&a.amount));
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountId;
    use chrono::{DateTime, TimeZone, Utc};

    fn local(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn txn(kind: TransactionType, cents: i64, category: CategoryId, when: DateTime<Utc>) -> Transaction {
        Transaction::new(kind, Money::from_cents(cents), category, AccountId::new(), when)
    }

    fn sample() -> (CategoryId, CategoryId, Vec<Transaction>) {
        let food = CategoryId::new();
        let salary = CategoryId::new();
        let transactions = vec![
            txn(TransactionType::Expense, 1200, food, local(2026, 10, 3, 9)),
            txn(TransactionType::Income, 50000, salary, local(2026, 10, 3, 18)),
            txn(TransactionType::Expense, 800, food, local(2026, 10, 5, 12)),
            txn(TransactionType::Expense, 3000, CategoryId::new(), local(2026, 10, 5, 8)),
        ];
        (food, salary, transactions)
    }

    #[test]
    fn test_totals_by_type() {
        let (_, _, transactions) = sample();
        let t = totals(&transactions);

        assert_eq!(t.income.cents(), 50000);
        assert_eq!(t.expense.cents(), 5000);
        assert_eq!(t.net().cents(), 45000);
    }

    #[test]
    fn test_group_by_day_orders_and_colours() {
        let (_, _, transactions) = sample();
        let groups = group_by_day(&transactions, &Currency::default(), "%d/%m/%Y");

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].formatted_date, "05/10/2026");
        assert_eq!(groups[0].color, AmountColor::Red);
        assert_eq!(groups[0].total.formatted, "-$38.00");
        // Noon entry before the 8am one
        assert_eq!(groups[0].transactions[0].amount.cents(), 800);

        assert_eq!(groups[1].color, AmountColor::Green);
    }

    #[test]
    fn test_day_groups_sum_to_overall_totals() {
        let (_, _, transactions) = sample();
        let overall = totals(&transactions);
        let groups = group_by_day(&transactions, &Currency::default(), "%d/%m/%Y");

        let income: Money = groups.iter().map(|g| g.totals.income).sum();
        let expense: Money = groups.iter().map(|g| g.totals.expense).sum();
        assert_eq!(income, overall.income);
        assert_eq!(expense, overall.expense);
    }

    #[test]
    fn test_month_period_uses_that_month() {
        let range = DateRangeModel {
            range_type: DateRangeType::ThisMonth,
            start: local(2026, 2, 1, 0),
            end: local(2026, 3, 1, 0),
        };
        let period = period_length(&range, Weekday::Sun);
        assert_eq!(
            period,
            PeriodLength {
                days: 28,
                weeks: 4,
                months: 1
            }
        );
    }

    #[test]
    fn test_year_period_uses_twelve_months() {
        let range = DateRangeModel {
            range_type: DateRangeType::Custom,
            start: local(2026, 5, 10, 0),
            end: local(2026, 6, 1, 0),
        };
        let period = period_length(&range, Weekday::Sun);
        assert_eq!(period.days, 365);
        assert_eq!(period.weeks, 52);
        assert_eq!(period.months, 12);
    }

    #[test]
    fn test_averages() {
        let range = DateRangeModel {
            range_type: DateRangeType::ThisMonth,
            start: local(2026, 2, 1, 0),
            end: local(2026, 3, 1, 0),
        };
        let t = Totals {
            income: Money::from_units(2800),
            expense: Money::from_units(560),
            transfer: Money::zero(),
        };

        let avg = averages(&t, &range, Weekday::Sun, &Currency::default());
        assert_eq!(avg.income.per_day.value, Money::from_units(100));
        assert_eq!(avg.income.per_week.value, Money::from_units(700));
        assert_eq!(avg.expense.per_month.value, Money::from_units(560));
        assert_eq!(avg.expense.per_day.formatted, "$20.00");
    }

    #[test]
    fn test_trend_buckets_by_month() {
        let c = CategoryId::new();
        let transactions = vec![
            txn(TransactionType::Expense, 100, c, local(2026, 1, 5, 12)),
            txn(TransactionType::Expense, 200, c, local(2026, 1, 20, 12)),
            txn(TransactionType::Income, 900, c, local(2026, 3, 2, 12)),
        ];

        let buckets = trend(&transactions, GroupType::Month);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].label, "Jan 2026");
        assert_eq!(buckets[0].totals.expense.cents(), 300);
        assert_eq!(buckets[1].totals.income.cents(), 900);
    }

    #[test]
    fn test_category_breakdown() {
        let (food, _, transactions) = sample();
        let shares = category_breakdown(&transactions, TransactionType::Expense);

        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].amount.cents(), 3000);
        assert_eq!(shares[1].category_id, food);
        assert_eq!(shares[1].count, 2);
        assert!((shares[1].percent - 40.0).abs() < 1e-9);
    }
}
