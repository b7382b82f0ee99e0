use contracts::dashboards::d410_rankings::{Pagination, RankingResponse};
use contracts::shared::analytics::{FilterSelection, MetricKey, PeriodContext};
use std::collections::BTreeMap;
use std::time::Instant;

use super::cache_key::cache_key;
use super::column_map::ColumnMap;
use super::error::{AnalyticsError, AnalyticsResult};
use super::executor::{AggregationSpec, QueryExecutor};
use super::orchestrator::{self, FetchDeadline};
use super::predicate_builder::PredicateBuilder;
use super::ranking::RankingSpec;

/// Everything a repository adapter contributes for one analytic subject.
#[derive(Debug, Clone, Copy)]
pub struct SubjectQuery {
    /// Response key, e.g. `laboratories`.
    pub subject: &'static str,
    pub columns: &'static ColumnMap,
    pub aggregation: &'static AggregationSpec,
    pub ranking: RankingSpec,
}

impl SubjectQuery {
    /// Ranking spec with an optional caller override of the rank metric.
    pub fn ranking_for(&self, rank_metric: Option<MetricKey>) -> AnalyticsResult<RankingSpec> {
        match rank_metric {
            None => Ok(self.ranking),
            Some(key) if self.aggregation.produces(key) => Ok(RankingSpec {
                rank_metric: key,
                ..self.ranking
            }),
            Some(key) => Err(AnalyticsError::InvalidFilterCombination(format!(
                "{} cannot be ranked by {}",
                self.subject,
                key.as_str()
            ))),
        }
    }
}

/// 1-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>, default_limit: u32, max_limit: u32) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, max_limit.max(1)),
        }
    }
}

/// Slice one page out of already-ranked rows; ranks stay global.
pub fn paginate<T>(rows: Vec<T>, page: PageRequest) -> (Vec<T>, Pagination) {
    let total = rows.len() as u32;
    let total_pages = total.div_ceil(page.limit);
    let offset = (page.page as usize - 1) * page.limit as usize;
    let slice = rows
        .into_iter()
        .skip(offset)
        .take(page.limit as usize)
        .collect();
    (
        slice,
        Pagination {
            page: page.page,
            limit: page.limit,
            total,
            total_pages,
        },
    )
}

/// Run one subject ranking end to end.
///
/// The selection is validated and compiled once; the same predicates serve
/// both periods.
pub async fn run_ranking(
    query: &SubjectQuery,
    selection: &FilterSelection,
    period: &PeriodContext,
    rank_metric: Option<MetricKey>,
    page: PageRequest,
    deadline: FetchDeadline,
    executor: &dyn QueryExecutor,
) -> AnalyticsResult<RankingResponse> {
    let started = Instant::now();
    let spec = query.ranking_for(rank_metric)?;
    let predicates = PredicateBuilder::new(query.columns, selection).build()?;
    let key = cache_key(query.subject, selection, period, spec.rank_metric)?;

    tracing::debug!(
        "{}: {} predicate fragments ({} chars), cache key {}",
        query.subject,
        predicates.len(),
        predicates.text_len(),
        key
    );

    let aggregation = query.aggregation;
    let ranked = orchestrator::run(selection, period, &spec, deadline, |_, range| {
        let scoped = predicates.with_date_range(aggregation.date_column, range);
        async move { executor.aggregate(&scoped, aggregation).await }
    })
    .await?;

    let (rows, pagination) = paginate(ranked, page);
    let mut by_subject = BTreeMap::new();
    by_subject.insert(query.subject.to_string(), rows);

    Ok(RankingResponse {
        rows: by_subject,
        pagination,
        query_time: started.elapsed().as_millis() as u64,
        cache_key: key,
    })
}
