use async_trait::async_trait;
use contracts::shared::analytics::{EntityMetricRow, MetricKey};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, QueryResult, Statement};

use super::error::AnalyticsResult;
use super::predicate_builder::PredicateSet;

/// Aggregated metric column: `expr` is evaluated per entity group.
#[derive(Debug)]
pub struct MetricColumn {
    pub key: MetricKey,
    pub expr: &'static str,
}

/// Server-side grouping for one analytic subject. All identifiers are
/// compile-time constants.
#[derive(Debug)]
pub struct AggregationSpec {
    /// Relation with alias, e.g. `f100_sales_facts f`.
    pub source: &'static str,
    pub date_column: &'static str,
    pub entity_key: &'static str,
    pub entity_label: Option<&'static str>,
    pub metrics: &'static [MetricColumn],
}

impl AggregationSpec {
    pub fn produces(&self, key: MetricKey) -> bool {
        self.metrics.iter().any(|m| m.key == key)
    }

    /// Render the grouped query for a predicate set.
    pub fn render(&self, predicates: &PredicateSet) -> String {
        let mut columns = vec![format!("CAST({} AS TEXT) AS entity_key", self.entity_key)];
        match self.entity_label {
            Some(label) => columns.push(format!("MAX({}) AS entity_label", label)),
            None => columns.push("NULL AS entity_label".to_string()),
        }
        for metric in self.metrics {
            columns.push(format!(
                "CAST(COALESCE({}, 0) AS REAL) AS {}",
                metric.expr,
                metric.key.as_str()
            ));
        }

        let mut sql = format!(
            "SELECT {} FROM {} WHERE {} IS NOT NULL",
            columns.join(", "),
            self.source,
            self.entity_key
        );
        if !predicates.is_empty() {
            sql.push_str(&format!(" AND {}", predicates.where_clause()));
        }
        sql.push_str(&format!(" GROUP BY {}", self.entity_key));
        sql
    }
}

/// Executes grouped aggregation queries. Implementations never hand raw
/// transaction rows to the engine.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn aggregate(
        &self,
        predicates: &PredicateSet,
        spec: &AggregationSpec,
    ) -> AnalyticsResult<Vec<EntityMetricRow>>;
}

/// `QueryExecutor` over the application's sea-orm connection pool.
#[derive(Clone)]
pub struct SeaOrmExecutor {
    db: DatabaseConnection,
}

impl SeaOrmExecutor {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QueryExecutor for SeaOrmExecutor {
    async fn aggregate(
        &self,
        predicates: &PredicateSet,
        spec: &AggregationSpec,
    ) -> AnalyticsResult<Vec<EntityMetricRow>> {
        debug_assert_eq!(
            predicates
                .fragments()
                .iter()
                .map(|f| f.param_count)
                .sum::<usize>(),
            predicates.params().len()
        );
        let sql = spec.render(predicates);
        let values: Vec<sea_orm::Value> = predicates.params().iter().cloned().map(Into::into).collect();
        let stmt = Statement::from_sql_and_values(DatabaseBackend::Sqlite, &sql, values);

        let rows = self.db.query_all(stmt).await?;
        rows.iter().map(|row| parse_row(row, spec)).collect()
    }
}

fn parse_row(row: &QueryResult, spec: &AggregationSpec) -> AnalyticsResult<EntityMetricRow> {
    let entity: String = row.try_get("", "entity_key")?;
    let label: Option<String> = row.try_get("", "entity_label")?;

    let mut parsed = EntityMetricRow::new(entity);
    parsed.label = label;
    for metric in spec.metrics {
        let value: Option<f64> = row.try_get("", metric.key.as_str())?;
        parsed
            .metrics
            .insert(metric.key, value.unwrap_or(0.0));
    }
    Ok(parsed)
}
