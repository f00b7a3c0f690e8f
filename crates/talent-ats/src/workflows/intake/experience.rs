use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::domain::ExperienceEntry;

/// Total work experience derived from the experience entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalExperience {
    pub years: u32,
    pub months: u32,
}

impl TotalExperience {
    pub fn from_months(total_months: u32) -> Self {
        Self {
            years: total_months / 12,
            months: total_months % 12,
        }
    }

    pub fn total_months(self) -> u32 {
        self.years * 12 + self.months
    }
}

impl fmt::Display for TotalExperience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn unit(count: u32, singular: &str) -> String {
            if count == 1 {
                format!("1 {singular}")
            } else {
                format!("{count} {singular}s")
            }
        }
        write!(f, "{}, {}", unit(self.years, "year"), unit(self.months, "month"))
    }
}

/// Whole calendar months from `start` to `end`; day of month is ignored.
fn elapsed_months(start: NaiveDate, end: NaiveDate) -> i64 {
    let years = i64::from(end.year()) - i64::from(start.year());
    let months = i64::from(end.month()) - i64::from(start.month());
    years * 12 + months
}

/// Sums the elapsed months of every entry with a start date.
///
/// Entries without an end date run until `today`. Overlapping jobs are counted twice and
/// negative spans contribute nothing.
pub fn total_experience(entries: &[ExperienceEntry], today: NaiveDate) -> TotalExperience {
    let total_months: i64 = entries
        .iter()
        .filter_map(|entry| {
            let start = entry.start_date?;
            let end = entry.end_date.unwrap_or(today);
            Some(elapsed_months(start, end).max(0))
        })
        .sum();

    TotalExperience::from_months(u32::try_from(total_months).unwrap_or(u32::MAX))
}
