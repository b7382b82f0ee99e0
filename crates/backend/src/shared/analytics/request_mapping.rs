use contracts::dashboards::d410_rankings::{DateBounds, RankingRequest};
use contracts::shared::analytics::{Dimension, EnumFilters, FilterSelection};

use super::error::{AnalyticsError, AnalyticsResult};
use super::period::PeriodRequest;

/// Build the engine's `FilterSelection` from an API request.
pub fn selection_from_request(request: &RankingRequest) -> AnalyticsResult<FilterSelection> {
    let mut selection = FilterSelection::new()
        .include(Dimension::Product, request.product_codes.iter().cloned())
        .include(Dimension::Laboratory, request.laboratory_codes.iter().cloned())
        .include(Dimension::Pharmacy, request.pharmacy_ids.iter().cloned())
        .include(Dimension::GenericGroup, request.generic_group_ids.iter().cloned())
        .exclude(Dimension::Product, request.excluded_product_codes.iter().cloned())
        .exclude(Dimension::Laboratory, request.excluded_laboratory_codes.iter().cloned())
        .exclude(Dimension::Pharmacy, request.excluded_pharmacy_ids.iter().cloned())
        .exclude(Dimension::GenericGroup, request.excluded_generic_group_ids.iter().cloned());

    for (dimension, name) in category_pairs(&request.category_names, &request.category_types)? {
        selection = selection.include(dimension, [name]);
    }
    for (dimension, name) in category_pairs(
        &request.excluded_category_names,
        &request.excluded_category_types,
    )? {
        selection = selection.exclude(dimension, [name]);
    }

    selection.entity_sets.retain(|_, ids| !ids.is_empty());
    selection.exclusions.retain(|_, ids| !ids.is_empty());
    selection.range_filters = request.ranges.clone();
    selection.enum_filters = EnumFilters {
        tva_rates: request.tva_rates.clone(),
        reimbursement_status: request.reimbursement_status,
        generic_status: request.generic_status,
        product_type: request.product_type,
    };
    selection.combinators = request.combinators.clone();

    Ok(selection)
}

/// Period bounds of an API request; both analysis bounds are mandatory.
pub fn period_request(request: &RankingRequest) -> AnalyticsResult<PeriodRequest> {
    let (analysis_start, analysis_end) = match request.date_range {
        DateBounds {
            start: Some(start),
            end: Some(end),
        } => (start, end),
        _ => {
            return Err(AnalyticsError::InvalidRange(
                "dateRange needs both start and end".to_string(),
            ))
        }
    };

    let (comparison_start, comparison_end) = request
        .comparison_date_range
        .map(|bounds| (bounds.start, bounds.end))
        .unwrap_or((None, None));

    Ok(PeriodRequest {
        comparison_start,
        comparison_end,
        auto_prior_year: request.auto_prior_year,
        ..PeriodRequest::new(analysis_start, analysis_end)
    })
}

/// Parse a category type such as `level_3` into its tree dimension.
pub fn category_dimension(category_type: &str) -> AnalyticsResult<Dimension> {
    category_type
        .strip_prefix("level_")
        .and_then(|level| level.parse::<u8>().ok())
        .and_then(Dimension::category_level)
        .ok_or_else(|| {
            AnalyticsError::InvalidFilterCombination(format!(
                "unknown category type: {}",
                category_type
            ))
        })
}

fn category_pairs(names: &[String], types: &[String]) -> AnalyticsResult<Vec<(Dimension, String)>> {
    if names.len() != types.len() {
        return Err(AnalyticsError::InvalidFilterCombination(format!(
            "{} category names for {} category types",
            names.len(),
            types.len()
        )));
    }
    names
        .iter()
        .zip(types)
        .map(|(name, category_type)| Ok((category_dimension(category_type)?, name.clone())))
        .collect()
}
