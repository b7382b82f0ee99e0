use chrono::{Months, NaiveDate};
use contracts::shared::analytics::{DateRange, PeriodContext};

use super::error::{AnalyticsError, AnalyticsResult};

/// Raw period bounds as requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodRequest {
    pub analysis_start: NaiveDate,
    pub analysis_end: NaiveDate,
    pub comparison_start: Option<NaiveDate>,
    pub comparison_end: Option<NaiveDate>,
    /// Derive the comparison as the same span one calendar year earlier
    /// when no explicit comparison bounds are given.
    pub auto_prior_year: bool,
}

impl PeriodRequest {
    pub fn new(analysis_start: NaiveDate, analysis_end: NaiveDate) -> Self {
        Self {
            analysis_start,
            analysis_end,
            comparison_start: None,
            comparison_end: None,
            auto_prior_year: false,
        }
    }
}

/// Resolve the current and comparison intervals.
///
/// Comparison is present only when both explicit bounds were given, or when
/// `auto_prior_year` is set without explicit bounds.
pub fn resolve(request: &PeriodRequest) -> AnalyticsResult<PeriodContext> {
    let current = checked_range("analysis", request.analysis_start, request.analysis_end)?;

    let comparison = match (request.comparison_start, request.comparison_end) {
        (Some(start), Some(end)) => Some(checked_range("comparison", start, end)?),
        (Some(_), None) | (None, Some(_)) => {
            return Err(AnalyticsError::InvalidRange(
                "comparison range needs both start and end".to_string(),
            ))
        }
        (None, None) if request.auto_prior_year => Some(prior_year(current)?),
        (None, None) => None,
    };

    Ok(PeriodContext {
        current,
        comparison,
    })
}

/// Same month-day span one calendar year earlier (N-1).
pub fn prior_year(range: DateRange) -> AnalyticsResult<DateRange> {
    Ok(DateRange::new(
        shift_back_one_year(range.start)?,
        shift_back_one_year(range.end)?,
    ))
}

/// Step back twelve calendar months. Feb 29 lands on Feb 28 when the
/// target year is not a leap year.
pub fn shift_back_one_year(date: NaiveDate) -> AnalyticsResult<NaiveDate> {
    date.checked_sub_months(Months::new(12)).ok_or_else(|| {
        AnalyticsError::InvalidRange(format!("cannot shift {} back one year", date))
    })
}

fn checked_range(label: &str, start: NaiveDate, end: NaiveDate) -> AnalyticsResult<DateRange> {
    if start > end {
        return Err(AnalyticsError::InvalidRange(format!(
            "{} start {} is after end {}",
            label, start, end
        )));
    }
    Ok(DateRange::new(start, end))
}
