use contracts::shared::analytics::{FilterSelection, MetricKey, PeriodContext};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use super::error::{AnalyticsError, AnalyticsResult};

#[derive(Serialize)]
struct CacheKeyInput<'a> {
    subject: &'a str,
    selection: &'a FilterSelection,
    period: &'a PeriodContext,
    rank_metric: MetricKey,
}

/// Content hash (hex SHA-256) of a normalized request.
///
/// Two requests that differ only in set ordering noise (duplicates, empty
/// sets) hash identically.
pub fn cache_key(
    subject: &str,
    selection: &FilterSelection,
    period: &PeriodContext,
    rank_metric: MetricKey,
) -> AnalyticsResult<String> {
    let normalized = normalize(selection);
    let input = CacheKeyInput {
        subject,
        selection: &normalized,
        period,
        rank_metric,
    };
    let canonical = serde_json::to_vec(&input).map_err(|e| {
        AnalyticsError::InvalidFilterCombination(format!("selection is not serializable: {}", e))
    })?;
    Ok(format!("{:x}", Sha256::digest(&canonical)))
}

/// Deduplicated selection without empty sets.
pub fn normalize(selection: &FilterSelection) -> FilterSelection {
    let mut normalized = selection.clone();
    for sets in [&mut normalized.entity_sets, &mut normalized.exclusions] {
        sets.retain(|_, ids| !ids.is_empty());
        for ids in sets.values_mut() {
            let mut seen = HashSet::new();
            ids.retain(|id| seen.insert(id.clone()));
        }
    }
    normalized
}
