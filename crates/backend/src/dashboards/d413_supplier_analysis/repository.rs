use contracts::shared::analytics::MetricKey;

use crate::shared::analytics::{AggregationSpec, RankingSpec, SubjectQuery};
use crate::shared::data::fact_tables::{PURCHASE_COLUMNS, PURCHASE_METRICS};

pub const SUBJECT: &str = "suppliers";

/// Purchases grouped by supplier category (wholesaler, direct, ...).
static AGGREGATION: AggregationSpec = AggregationSpec {
    source: "f101_purchase_facts f",
    date_column: "f.purchase_date",
    entity_key: "f.supplier_category",
    entity_label: None,
    metrics: PURCHASE_METRICS,
};

pub fn subject_query() -> SubjectQuery {
    SubjectQuery {
        subject: SUBJECT,
        columns: &PURCHASE_COLUMNS,
        aggregation: &AGGREGATION,
        ranking: RankingSpec::by(MetricKey::PurchaseAmount).with_share(MetricKey::PurchaseAmount),
    }
}
