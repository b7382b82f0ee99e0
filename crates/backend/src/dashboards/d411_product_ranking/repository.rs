use contracts::shared::analytics::MetricKey;

use crate::shared::analytics::{AggregationSpec, RankingSpec, SubjectQuery};
use crate::shared::data::fact_tables::{SALES_COLUMNS, SALES_METRICS};

pub const SUBJECT: &str = "products";

static AGGREGATION: AggregationSpec = AggregationSpec {
    source: "f100_sales_facts f",
    date_column: "f.sale_date",
    entity_key: "f.product_code",
    entity_label: Some("f.product_name"),
    metrics: SALES_METRICS,
};

pub fn subject_query() -> SubjectQuery {
    SubjectQuery {
        subject: SUBJECT,
        columns: &SALES_COLUMNS,
        aggregation: &AGGREGATION,
        ranking: RankingSpec::by(MetricKey::SalesAmount).with_share(MetricKey::SalesAmount),
    }
}
