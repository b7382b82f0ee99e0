use contracts::shared::analytics::{
    DateRange, EntityMetricRow, FilterSelection, PeriodContext, RankedComparisonRow,
};
use std::future::Future;
use std::time::{Duration, Instant as StdInstant};
use tokio::time::Instant;

use super::error::{AnalyticsError, AnalyticsResult};
use super::ranking::{self, RankingSpec};

/// Deadline attached by the caller; applied to every fetch of a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchDeadline(Option<Instant>);

impl FetchDeadline {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn after(timeout: Duration) -> Self {
        Self(Some(Instant::now() + timeout))
    }

    async fn guard<Fut>(self, label: &'static str, fetch: Fut) -> AnalyticsResult<Vec<EntityMetricRow>>
    where
        Fut: Future<Output = AnalyticsResult<Vec<EntityMetricRow>>>,
    {
        match self.0 {
            Some(deadline) => tokio::time::timeout_at(deadline, fetch)
                .await
                .map_err(|_| AnalyticsError::Timeout(label))?,
            None => fetch.await,
        }
    }
}

/// Raw rows gathered for one request.
#[derive(Debug, Clone, Default)]
pub struct PeriodRows {
    pub current: Vec<EntityMetricRow>,
    pub comparison: Option<Vec<EntityMetricRow>>,
}

/// Fetch current and comparison rows concurrently, then rank them.
///
/// In comparison mode the two fetches run under `try_join!`: the first
/// failure is returned and the other fetch is dropped. Nothing is ranked
/// unless every requested period was fetched.
pub async fn run<'a, F, Fut>(
    selection: &'a FilterSelection,
    period: &PeriodContext,
    spec: &RankingSpec,
    deadline: FetchDeadline,
    fetch: F,
) -> AnalyticsResult<Vec<RankedComparisonRow>>
where
    F: Fn(&'a FilterSelection, DateRange) -> Fut,
    Fut: Future<Output = AnalyticsResult<Vec<EntityMetricRow>>>,
{
    let started = StdInstant::now();
    let current_fetch = deadline.guard("current period", fetch(selection, period.current));

    let rows = match period.comparison {
        None => PeriodRows {
            current: current_fetch.await.map_err(|e| {
                tracing::warn!("Current period fetch failed: {}", e);
                e
            })?,
            comparison: None,
        },
        Some(range) => {
            let comparison_fetch = deadline.guard("comparison period", fetch(selection, range));
            let (current, comparison) = tokio::try_join!(current_fetch, comparison_fetch)
                .map_err(|e| {
                    tracing::warn!("Period fetch failed: {}", e);
                    e
                })?;
            PeriodRows {
                current,
                comparison: Some(comparison),
            }
        }
    };

    tracing::debug!(
        "Fetched {} current / {:?} comparison rows in {}ms",
        rows.current.len(),
        rows.comparison.as_ref().map(Vec::len),
        started.elapsed().as_millis()
    );

    assemble(period, rows, spec)
}

/// Rank fetched rows, refusing current-only output when a comparison was
/// requested.
pub fn assemble(
    period: &PeriodContext,
    rows: PeriodRows,
    spec: &RankingSpec,
) -> AnalyticsResult<Vec<RankedComparisonRow>> {
    match (period.comparison, rows.comparison.as_deref()) {
        (Some(range), None) => Err(AnalyticsError::PartialResultForbidden(format!(
            "comparison {}..{} requested but no comparison rows were fetched",
            range.start, range.end
        ))),
        (Some(_), Some(comparison)) => Ok(ranking::compute(&rows.current, Some(comparison), spec)),
        (None, _) => Ok(ranking::compute(&rows.current, None, spec)),
    }
}
