use thiserror::Error;

/// Failure modes of the filter-composition and period-comparison engine.
///
/// Validation variants are raised before any fetch is issued. Arithmetic
/// problems (division by zero, missing join) are never errors: they degrade
/// to `None` or the new-entrant marker on the affected row.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Invalid filter combination: {0}")]
    InvalidFilterCombination(String),

    #[error("Query executor failure: {0}")]
    ExecutorFailure(String),

    #[error("Query deadline exceeded while fetching {0}")]
    Timeout(&'static str),

    /// Comparison was requested but only current-period rows are available.
    #[error("Partial result forbidden: {0}")]
    PartialResultForbidden(String),
}

impl AnalyticsError {
    /// Stable machine-readable code exposed to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            AnalyticsError::InvalidRange(_) => "invalid_range",
            AnalyticsError::InvalidFilterCombination(_) => "invalid_filter_combination",
            AnalyticsError::ExecutorFailure(_) => "executor_failure",
            AnalyticsError::Timeout(_) => "timeout",
            AnalyticsError::PartialResultForbidden(_) => "internal_error",
        }
    }

    /// Client-side mistakes; never retried.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalyticsError::InvalidRange(_) | AnalyticsError::InvalidFilterCombination(_)
        )
    }

    /// Message safe to show to clients (no predicate or SQL text).
    pub fn public_message(&self) -> String {
        match self {
            AnalyticsError::InvalidRange(_) | AnalyticsError::InvalidFilterCombination(_) => {
                self.to_string()
            }
            AnalyticsError::ExecutorFailure(_) => "The analytics query failed".to_string(),
            AnalyticsError::Timeout(_) => "The analytics query timed out".to_string(),
            AnalyticsError::PartialResultForbidden(_) => {
                "The comparison period could not be computed".to_string()
            }
        }
    }
}

impl From<sea_orm::DbErr> for AnalyticsError {
    fn from(e: sea_orm::DbErr) -> Self {
        AnalyticsError::ExecutorFailure(e.to_string())
    }
}

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;
