use contracts::shared::analytics::MetricKey;

use crate::shared::analytics::{AggregationSpec, MetricColumn, RankingSpec, SubjectQuery};
use crate::shared::data::fact_tables::SALES_COLUMNS;

pub const SUBJECT: &str = "regions";

static AGGREGATION: AggregationSpec = AggregationSpec {
    source: "f100_sales_facts f",
    date_column: "f.sale_date",
    entity_key: "f.region_code",
    entity_label: Some("f.region_name"),
    metrics: &[
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
        MetricColumn {
            key: MetricKey::PharmacyCount,
            expr: "COUNT(DISTINCT f.pharmacy_id)",
        },
    ],
};

pub fn subject_query() -> SubjectQuery {
    SubjectQuery {
        subject: SUBJECT,
        columns: &SALES_COLUMNS,
        aggregation: &AGGREGATION,
        ranking: RankingSpec::by(MetricKey::SalesAmount).with_share(MetricKey::SalesAmount),
    }
}
