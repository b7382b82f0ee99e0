use contracts::shared::analytics::MetricKey;

use crate::shared::analytics::{AggregationSpec, RankingSpec, SubjectQuery};
use crate::shared::data::fact_tables::{SALES_COLUMNS, SALES_METRICS};

pub const SUBJECT: &str = "pharmacies";

static AGGREGATION: AggregationSpec = AggregationSpec {
    source: "f100_sales_facts f",
    date_column: "f.sale_date",
    entity_key: "f.pharmacy_id",
    entity_label: Some("f.pharmacy_name"),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::analytics::pipeline::run_ranking;
    use crate::shared::analytics::{FetchDeadline, PageRequest, SeaOrmExecutor};
    use crate::shared::data::fixtures;
    use contracts::shared::analytics::{FilterSelection, PercentEvolution, ProductType};

    #[tokio::test]
    async fn test_pharmacy_ranking() {
        let executor = SeaOrmExecutor::new(fixtures::seeded_db().await);
        let mut selection = FilterSelection::new();
        selection.enum_filters.product_type = ProductType::Medicament;

        let response = run_ranking(
            &subject_query(),
            &selection,
            &fixtures::january_vs_prior_year(),
            None,
            PageRequest::new(None, None, 50, 500),
            FetchDeadline::none(),
            &executor,
        )
        .await
        .unwrap();

        let rows = &response.rows[SUBJECT];
        assert_eq!(rows[0].entity, "PH2");
        assert_eq!(rows[0].rank_gain, Some(1));
        assert_eq!(
            rows[0].metric(MetricKey::Quantity).unwrap().percent_evolution,
            Some(PercentEvolution::Change(300.0))
        );
        assert_eq!(rows[1].entity, "PH1");
        assert_eq!(rows[1].metric(MetricKey::SalesAmount).unwrap().current, 30.0);
    }
}
