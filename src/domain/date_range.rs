//! Chart date windows.
//!
//! Trailing windows subtract whole calendar months, clamping to the end of the
//! month (2024-02-29 minus one year is 2023-02-28).

use chrono::{Datelike, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::ChartfolioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    YearToDate,
    TrailingYear,
    TrailingFiveYears,
    Custom { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Builds a range from its short name plus the optional custom bounds.
    pub fn parse(
        kind: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, ChartfolioError> {
        match kind.trim().to_lowercase().as_str() {
            "custom" => match (start, end) {
                (Some(start), Some(end)) => Self::custom(start, end),
                _ => Err(ChartfolioError::InvalidRange {
                    reason: "custom range requires both start and end dates".into(),
                }),
            },
            other => other.parse(),
        }
    }

    pub fn custom(start: NaiveDate, end: NaiveDate) -> Result<Self, ChartfolioError> {
        if start > end {
            return Err(ChartfolioError::InvalidRange {
                reason: format!("start {} is after end {}", start, end),
            });
        }
        Ok(DateRange::Custom { start, end })
    }

    pub fn resolve(&self, today: NaiveDate) -> ResolvedRange {
        let start = match self {
            DateRange::YearToDate => today.with_ordinal(1).unwrap_or(today),
            DateRange::TrailingYear => months_before(today, 12),
            DateRange::TrailingFiveYears => months_before(today, 60),
            DateRange::Custom { start, end } => {
                return ResolvedRange {
                    start: *start,
                    end: *end,
                };
            }
        };
        ResolvedRange { start, end: today }
    }
}

fn months_before(date: NaiveDate, months: u32) -> NaiveDate {
    date.checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN)
}

impl FromStr for DateRange {
    type Err = ChartfolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ytd" => Ok(DateRange::YearToDate),
            "1y" => Ok(DateRange::TrailingYear),
            "5y" => Ok(DateRange::TrailingFiveYears),
            "custom" => Err(ChartfolioError::InvalidRange {
                reason: "custom range requires both start and end dates".into(),
            }),
            other => Err(ChartfolioError::InvalidRange {
                reason: format!("unknown range '{}' (expected ytd, 1y, 5y or custom)", other),
            }),
        }
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateRange::YearToDate => write!(f, "ytd"),
            DateRange::TrailingYear => write!(f, "1y"),
            DateRange::TrailingFiveYears => write!(f, "5y"),
            DateRange::Custom { start, end } => write!(f, "custom({}..{})", start, end),
        }
    }
}
