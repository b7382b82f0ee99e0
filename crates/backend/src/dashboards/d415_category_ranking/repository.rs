use contracts::shared::analytics::MetricKey;

use crate::shared::analytics::{
    AggregationSpec, AnalyticsError, AnalyticsResult, MetricColumn, RankingSpec, SubjectQuery,
};
use crate::shared::data::fact_tables::SALES_COLUMNS;

pub const SUBJECT: &str = "categories";

const CATEGORY_METRICS: &[MetricColumn] = &[
    MetricColumn {
        key: MetricKey::Quantity,
        expr: "SUM(f.quantity)",
    },
    MetricColumn {
        key: MetricKey::SalesAmount,
        expr: "SUM(f.sales_amount_ttc)",
    },
    MetricColumn {
        key: MetricKey::MarginAmount,
        expr: "SUM(f.margin_amount)",
    },
];

macro_rules! level_spec {
    ($column:literal) => {
        AggregationSpec {
            source: "f100_sales_facts f",
            date_column: "f.sale_date",
            entity_key: $column,
            entity_label: None,
            metrics: CATEGORY_METRICS,
        }
    };
}

/// One grouping per hierarchy level, indexed by level.
static LEVELS: [AggregationSpec; 6] = [
    level_spec!("f.category_level_0"),
    level_spec!("f.category_level_1"),
    level_spec!("f.category_level_2"),
    level_spec!("f.category_level_3"),
    level_spec!("f.category_level_4"),
    level_spec!("f.category_level_5"),
];

/// Categories of one hierarchy level (0 when not given).
pub fn subject_query(level: Option<u8>) -> AnalyticsResult<SubjectQuery> {
    let level = level.unwrap_or(0);
    let aggregation = LEVELS.get(usize::from(level)).ok_or_else(|| {
        AnalyticsError::InvalidFilterCombination(format!(
            "category level {} does not exist (0..5)",
            level
        ))
    })?;

    Ok(SubjectQuery {
        subject: SUBJECT,
        columns: &SALES_COLUMNS,
        aggregation,
        ranking: RankingSpec::by(MetricKey::SalesAmount).with_share(MetricKey::SalesAmount),
    })
}
