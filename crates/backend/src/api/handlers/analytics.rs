use axum::extract::rejection::JsonRejection;
use axum::Json;
use contracts::dashboards::d410_rankings::{RankingRequest, RankingResponse};
use contracts::system::auth::TokenClaims;
use std::time::Duration;

use crate::api::error::ApiError;
use crate::dashboards::{
    d410_laboratory_ranking, d411_product_ranking, d412_pharmacy_ranking, d413_supplier_analysis,
    d414_generic_groups, d415_category_ranking, d416_regional_stats,
};
use crate::shared::analytics::pipeline::run_ranking;
use crate::shared::analytics::request_mapping::{period_request, selection_from_request};
use crate::shared::analytics::{
    period, FetchDeadline, PageRequest, QueryExecutor, SeaOrmExecutor, SubjectQuery,
};
use crate::shared::config::{config, AnalyticsConfig};
use crate::shared::data::db::get_connection;
use crate::system::auth::scope::{apply_scope, CurrentUser};

type RankingResult = Result<Json<RankingResponse>, ApiError>;

/// POST /api/analytics/laboratories
pub async fn laboratories(
    CurrentUser(claims): CurrentUser,
    payload: Result<Json<RankingRequest>, JsonRejection>,
) -> RankingResult {
    let Json(request) = payload?;
    rank(d410_laboratory_ranking::repository::subject_query(), &claims, &request).await
}

/// POST /api/analytics/products
pub async fn products(
    CurrentUser(claims): CurrentUser,
    payload: Result<Json<RankingRequest>, JsonRejection>,
) -> RankingResult {
    let Json(request) = payload?;
    rank(d411_product_ranking::repository::subject_query(), &claims, &request).await
}

/// POST /api/analytics/pharmacies
pub async fn pharmacies(
    CurrentUser(claims): CurrentUser,
    payload: Result<Json<RankingRequest>, JsonRejection>,
) -> RankingResult {
    let Json(request) = payload?;
    rank(d412_pharmacy_ranking::repository::subject_query(), &claims, &request).await
}

/// POST /api/analytics/suppliers
pub async fn suppliers(
    CurrentUser(claims): CurrentUser,
    payload: Result<Json<RankingRequest>, JsonRejection>,
) -> RankingResult {
    let Json(request) = payload?;
    rank(d413_supplier_analysis::repository::subject_query(), &claims, &request).await
}

/// POST /api/analytics/generic-groups
pub async fn generic_groups(
    CurrentUser(claims): CurrentUser,
    payload: Result<Json<RankingRequest>, JsonRejection>,
) -> RankingResult {
    let Json(request) = payload?;
    rank(d414_generic_groups::repository::subject_query(), &claims, &request).await
}

/// POST /api/analytics/categories
pub async fn categories(
    CurrentUser(claims): CurrentUser,
    payload: Result<Json<RankingRequest>, JsonRejection>,
) -> RankingResult {
    let Json(request) = payload?;
    let query = d415_category_ranking::repository::subject_query(request.category_level)?;
    rank(query, &claims, &request).await
}

/// POST /api/analytics/regions
pub async fn regions(
    CurrentUser(claims): CurrentUser,
    payload: Result<Json<RankingRequest>, JsonRejection>,
) -> RankingResult {
    let Json(request) = payload?;
    rank(d416_regional_stats::repository::subject_query(), &claims, &request).await
}

async fn rank(query: SubjectQuery, claims: &TokenClaims, request: &RankingRequest) -> RankingResult {
    let executor = SeaOrmExecutor::new(get_connection()?.clone());
    let response = rank_with(query, claims, request, &config().analytics, &executor).await?;
    Ok(Json(response))
}

/// Map, scope and validate the request, then run the engine.
async fn rank_with(
    query: SubjectQuery,
    claims: &TokenClaims,
    request: &RankingRequest,
    settings: &AnalyticsConfig,
    executor: &dyn QueryExecutor,
) -> Result<RankingResponse, ApiError> {
    let selection = apply_scope(claims, selection_from_request(request)?)?;
    let period = period::resolve(&period_request(request)?)?;
    let page = PageRequest::new(
        request.page,
        request.limit,
        settings.default_page_size,
        settings.max_page_size,
    );
    let deadline = match settings.query_timeout_secs {
        0 => FetchDeadline::none(),
        secs => FetchDeadline::after(Duration::from_secs(secs)),
    };

    tracing::info!(
        "Ranking {} for {} ({}..{}, comparison: {})",
        query.subject,
        claims.sub,
        period.current.start,
        period.current.end,
        period.has_comparison()
    );

    let response = run_ranking(
        &query,
        &selection,
        &period,
        request.rank_metric,
        page,
        deadline,
        executor,
    )
    .await?;

    tracing::info!(
        "Ranking {} returned {} of {} rows in {}ms",
        query.subject,
        response.rows.values().map(Vec::len).sum::<usize>(),
        response.pagination.total,
        response.query_time
    );
    Ok(response)
}
