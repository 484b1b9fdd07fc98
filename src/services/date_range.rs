//! Date-range resolution
//!
//! Turns the selected `DateRangeType` (plus stored custom bounds) into a
//! concrete `[start, end)` window on the local calendar. Resolution is pure
//! and never fails.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};

use crate::models::{DateRangeModel, DateRangeType, GroupType};

/// Resolve a range type at `now`
///
/// Preset ranges run from the start of the current local day, week, month or
/// year to the start of the next one. `All` spans the Unix epoch to `now`.
/// `Custom` passes the stored bounds through untouched, substituting the
/// epoch or `now` for a missing side.
pub fn resolve(
    range_type: DateRangeType,
    custom: (Option<DateTime<Utc>>, Option<DateTime<Utc>>),
    now: DateTime<Utc>,
    week_start: Weekday,
) -> DateRangeModel {
    let today = now.with_timezone(&Local).date_naive();

    let (start, end) = match range_type {
        DateRangeType::Today => (today, today + Duration::days(1)),
        DateRangeType::ThisWeek => {
            let start = start_of_week(today, week_start);
            (start, start + Duration::days(7))
        }
        DateRangeType::ThisMonth => {
            let start = first_of_month(today);
            (start, first_of_next_month(today))
        }
        DateRangeType::ThisYear => (first_of_year(today.year()), first_of_year(today.year() + 1)),
        DateRangeType::All => {
            return DateRangeModel {
                range_type,
                start: DateTime::<Utc>::UNIX_EPOCH,
                end: now,
            }
        }
        DateRangeType::Custom => {
            let (start, end) = custom;
            return DateRangeModel {
                range_type,
                start: start.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
                end: end.unwrap_or(now),
            };
        }
    };

    DateRangeModel {
        range_type,
        start: local_midnight(start),
        end: local_midnight(end),
    }
}

/// Human-readable label, e.g. `This Week (11/10/2026 - 17/10/2026)`
pub fn label(model: &DateRangeModel, date_format: &str) -> String {
    let first = model.start.with_timezone(&Local).date_naive();
    let last = last_day(model);
    let fmt = |d: NaiveDate| d.format(date_format).to_string();

    match model.range_type {
        DateRangeType::All => "All".to_string(),
        DateRangeType::Today => format!("Today ({})", fmt(first)),
        DateRangeType::ThisMonth => format!("This Month ({})", first.format("%B %Y")),
        DateRangeType::ThisYear => format!("This Year ({})", first.year()),
        DateRangeType::ThisWeek | DateRangeType::Custom => format!(
            "{} ({} - {})",
            model.range_type.display_name(),
            fmt(first),
            fmt(last)
        ),
    }
}

/// Bucket size used when charting a range
pub fn group_type(range_type: DateRangeType) -> GroupType {
    match range_type {
        DateRangeType::Today | DateRangeType::ThisWeek | DateRangeType::ThisMonth => GroupType::Day,
        DateRangeType::ThisYear | DateRangeType::Custom => GroupType::Month,
        DateRangeType::All => GroupType::Year,
    }
}

/// Last calendar day covered by the window
pub fn last_day(model: &DateRangeModel) -> NaiveDate {
    let inclusive_end = if model.end > model.start {
        model.end - Duration::milliseconds(1)
    } else {
        model.end
    };
    inclusive_end.with_timezone(&Local).date_naive()
}

/// Midnight at the start of `date` on the local clock
///
/// Falls back to UTC midnight when local midnight does not exist.
pub fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

pub fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    date - Duration::days(i64::from(week_offset(date.weekday(), week_start)))
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

pub fn first_of_year(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN)
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    (first_of_next_month(date) - first_of_month(date)).num_days() as u32
}

pub fn days_in_year(year: i32) -> u32 {
    (first_of_year(year + 1) - first_of_year(year)).num_days() as u32
}

/// Calendar weeks (partial ones included) that overlap the month of `date`
pub fn weeks_in_month(date: NaiveDate, week_start: Weekday) -> u32 {
    let offset = week_offset(first_of_month(date).weekday(), week_start);
    (offset + days_in_month(date)).div_ceil(7)
}

/// Highest week-of-year number, with week 1 being the week holding January 1
///
/// A trailing partial week that runs into the next year counts as that
/// year's week 1.
pub fn weeks_in_year(year: i32, week_start: Weekday) -> u32 {
    let offset = week_offset(first_of_year(year).weekday(), week_start);
    let weeks = (offset + days_in_year(year)).div_ceil(7);

    let last = first_of_year(year + 1) - Duration::days(1);
    let ends_week = last.weekday().succ() == week_start;
    if ends_week {
        weeks
    } else {
        weeks - 1
    }
}

/// Days from `week_start` forward to `day`
fn week_offset(day: Weekday, week_start: Weekday) -> u32 {
    (7 + day.num_days_from_monday() - week_start.num_days_from_monday()) % 7
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_preset_ranges_bracket_now() {
        let now = local(2026, 10, 15, 12);
        for range_type in [
            DateRangeType::Today,
            DateRangeType::ThisWeek,
            DateRangeType::ThisMonth,
            DateRangeType::ThisYear,
            DateRangeType::All,
        ] {
            let model = resolve(range_type, (None, None), now, Weekday::Sun);
            assert!(model.start <= now, "{:?}", range_type);
            assert!(now <= model.end, "{:?}", range_type);
        }
    }

    #[test]
    fn test_this_month_starts_on_day_one() {
        let now = local(2026, 10, 15, 12);
        let model = resolve(DateRangeType::ThisMonth, (None, None), now, Weekday::Sun);

        assert_eq!(model.start, local(2026, 10, 1, 0));
        assert_eq!(model.end, local(2026, 11, 1, 0));
    }

    #[test]
    fn test_this_week_respects_week_start() {
        // 15 Oct 2026 is a Thursday
        let now = local(2026, 10, 15, 12);

        let sunday = resolve(DateRangeType::ThisWeek, (None, None), now, Weekday::Sun);
        assert_eq!(sunday.start, local(2026, 10, 11, 0));
        assert_eq!(sunday.end, local(2026, 10, 18, 0));

        let monday = resolve(DateRangeType::ThisWeek, (None, None), now, Weekday::Mon);
        assert_eq!(monday.start, local(2026, 10, 12, 0));
    }

    #[test]
    fn test_this_year_and_december_rollover() {
        let now = local(2026, 12, 31, 20);
        let year = resolve(DateRangeType::ThisYear, (None, None), now, Weekday::Sun);
        assert_eq!(year.start, local(2026, 1, 1, 0));
        assert_eq!(year.end, local(2027, 1, 1, 0));

        let month = resolve(DateRangeType::ThisMonth, (None, None), now, Weekday::Sun);
        assert_eq!(month.end, local(2027, 1, 1, 0));
    }

    #[test]
    fn test_all_without_bounds_is_epoch_to_now() {
        let now = local(2026, 10, 15, 12);
        let model = resolve(DateRangeType::All, (None, None), now, Weekday::Sun);

        assert_eq!(model.start, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(model.end, now);
    }

    #[test]
    fn test_custom_passes_bounds_through() {
        let now = local(2026, 10, 15, 12);
        let start = local(2026, 3, 4, 9);
        let end = local(2026, 2, 1, 0);

        let model = resolve(DateRangeType::Custom, (Some(start), Some(end)), now, Weekday::Sun);
        assert_eq!((model.start, model.end), (start, end));

        let open = resolve(DateRangeType::Custom, (None, None), now, Weekday::Sun);
        assert_eq!((open.start, open.end), (DateTime::<Utc>::UNIX_EPOCH, now));
    }

    #[test]
    fn test_labels() {
        let now = local(2026, 10, 15, 12);
        let week = resolve(DateRangeType::ThisWeek, (None, None), now, Weekday::Sun);
        assert_eq!(label(&week, "%d/%m/%Y"), "This Week (11/10/2026 - 17/10/2026)");

        let month = resolve(DateRangeType::ThisMonth, (None, None), now, Weekday::Sun);
        assert_eq!(label(&month, "%d/%m/%Y"), "This Month (October 2026)");

        let all = resolve(DateRangeType::All, (None, None), now, Weekday::Sun);
        assert_eq!(label(&all, "%d/%m/%Y"), "All");
    }

    #[test]
    fn test_group_type() {
        assert_eq!(group_type(DateRangeType::ThisWeek), GroupType::Day);
        assert_eq!(group_type(DateRangeType::Custom), GroupType::Month);
        assert_eq!(group_type(DateRangeType::All), GroupType::Year);
    }

    #[test]
    fn test_calendar_counts() {
        assert_eq!(days_in_month(date(2024, 2, 10)), 29);
        assert_eq!(days_in_month(date(2026, 12, 1)), 31);
        assert_eq!(days_in_year(2024), 366);

        // Oct 2026 starts on a Thursday: 5 Sunday-start weeks, 5 Monday-start
        assert_eq!(weeks_in_month(date(2026, 10, 1), Weekday::Sun), 5);
        // Feb 2026 starts on a Sunday and has 28 days
        assert_eq!(weeks_in_month(date(2026, 2, 1), Weekday::Sun), 4);
        assert_eq!(weeks_in_month(date(2026, 2, 1), Weekday::Mon), 5);

        assert_eq!(weeks_in_year(2026, Weekday::Sun), 52);
        // 2022 ends on a Saturday, closing its last Sunday-start week
        assert_eq!(weeks_in_year(2022, Weekday::Sun), 53);
    }
}
