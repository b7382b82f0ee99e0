use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Closed date interval `[start, end]`, serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Number of calendar days covered, both ends included.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Current analysis interval plus the optional comparison interval.
///
/// `comparison == None` means single-period mode: no evolution is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodContext {
    pub current: DateRange,
    pub comparison: Option<DateRange>,
}

impl PeriodContext {
    pub fn single(current: DateRange) -> Self {
        Self {
            current,
            comparison: None,
        }
    }

    pub fn compared(current: DateRange, comparison: DateRange) -> Self {
        Self {
            current,
            comparison: Some(comparison),
        }
    }

    pub fn has_comparison(&self) -> bool {
        self.comparison.is_some()
    }
}
