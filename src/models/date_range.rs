//! Date-range filter types
//!
//! `DateRangeType` is what the user picks; `DateRangeModel` is the concrete
//! window it resolves to at a given instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Preset (or custom) window for filtering and aggregation
///
/// Persisted by ordinal, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateRangeType {
    Today,
    ThisWeek,
    #[default]
    ThisMonth,
    ThisYear,
    All,
    Custom,
}

impl DateRangeType {
    pub const ALL_TYPES: [DateRangeType; 6] = [
        Self::Today,
        Self::ThisWeek,
        Self::ThisMonth,
        Self::ThisYear,
        Self::All,
        Self::Custom,
    ];

    pub fn ordinal(&self) -> i32 {
        match self {
            Self::Today => 0,
            Self::ThisWeek => 1,
            Self::ThisMonth => 2,
            Self::ThisYear => 3,
            Self::All => 4,
            Self::Custom => 5,
        }
    }

    pub fn from_ordinal(ordinal: i32) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|i| Self::ALL_TYPES.get(i).copied())
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "today" => Some(Self::Today),
            "thisweek" | "week" => Some(Self::ThisWeek),
            "thismonth" | "month" => Some(Self::ThisMonth),
            "thisyear" | "year" => Some(Self::ThisYear),
            "all" => Some(Self::All),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::ThisWeek => "This Week",
            Self::ThisMonth => "This Month",
            Self::ThisYear => "This Year",
            Self::All => "All",
            Self::Custom => "Custom",
        }
    }
}

impl fmt::Display for DateRangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A resolved window. `end` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeModel {
    pub range_type: DateRangeType,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRangeModel {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Bucket size for trend charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    Day,
    Month,
    Year,
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::Month => write!(f, "month"),
            Self::Year => write!(f, "year"),
        }
    }
}
