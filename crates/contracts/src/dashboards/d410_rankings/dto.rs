use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::shared::analytics::{
    Combinator, GenericStatus, MetricKey, NumericRange, ProductType, RangeDimension,
    RankedComparisonRow, ReimbursementStatus,
};

/// Request body shared by every ranking endpoint
/// (`POST /api/analytics/<subject>`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRequest {
    pub date_range: DateBounds,
    #[serde(default)]
    pub comparison_date_range: Option<DateBounds>,
    /// Compare against the same calendar span one year earlier (N-1)
    /// when no explicit comparison range is given.
    #[serde(default)]
    pub auto_prior_year: bool,

    #[serde(default)]
    pub product_codes: Vec<String>,
    #[serde(default)]
    pub laboratory_codes: Vec<String>,
    #[serde(default)]
    pub pharmacy_ids: Vec<String>,
    #[serde(default)]
    pub generic_group_ids: Vec<String>,
    /// Parallel to `category_types`; each entry pairs a category name with
    /// its tree level (`level_0` .. `level_5`).
    #[serde(default)]
    pub category_names: Vec<String>,
    #[serde(default)]
    pub category_types: Vec<String>,

    #[serde(default)]
    pub excluded_product_codes: Vec<String>,
    #[serde(default)]
    pub excluded_laboratory_codes: Vec<String>,
    #[serde(default)]
    pub excluded_pharmacy_ids: Vec<String>,
    #[serde(default)]
    pub excluded_generic_group_ids: Vec<String>,
    #[serde(default)]
    pub excluded_category_names: Vec<String>,
    #[serde(default)]
    pub excluded_category_types: Vec<String>,

    #[serde(default)]
    pub ranges: BTreeMap<RangeDimension, NumericRange>,
    #[serde(default)]
    pub tva_rates: Vec<f64>,
    #[serde(default)]
    pub reimbursement_status: ReimbursementStatus,
    #[serde(default)]
    pub generic_status: GenericStatus,
    #[serde(default)]
    pub product_type: ProductType,
    #[serde(default)]
    pub combinators: Vec<Combinator>,

    /// Overrides the subject's default ranking metric.
    #[serde(default)]
    pub rank_metric: Option<MetricKey>,
    /// Tree level to group by (categories endpoint only, default 0).
    #[serde(default)]
    pub category_level: Option<u8>,

    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Date bounds as sent by clients; either side may be missing and is
/// validated by the period resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateBounds {
    #[serde(default)]
    pub start: Option<NaiveDate>,
    #[serde(default)]
    pub end: Option<NaiveDate>,
}

/// Page window applied after ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u32,
    pub total_pages: u32,
}

/// Response body; rows are keyed by the subject name, e.g.
/// `{"laboratories": [...], "pagination": {...}, "queryTime": 42}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingResponse {
    #[serde(flatten)]
    pub rows: BTreeMap<String, Vec<RankedComparisonRow>>,
    pub pagination: Pagination,
    /// Milliseconds spent in the engine.
    pub query_time: u64,
    /// Content hash of the normalized request, usable as a cache key.
    pub cache_key: String,
}

/// Machine-readable error payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}
