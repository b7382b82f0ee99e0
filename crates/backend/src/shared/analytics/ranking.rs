use contracts::shared::analytics::{
    EntityMetricRow, MetricComparison, MetricKey, MetricKind, PercentEvolution,
    RankedComparisonRow,
};
use std::collections::{BTreeSet, HashMap};

/// Which metric orders the ranking and which one feeds market share.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingSpec {
    pub rank_metric: MetricKey,
    pub share_metric: Option<MetricKey>,
}

impl RankingSpec {
    pub fn by(rank_metric: MetricKey) -> Self {
        Self {
            rank_metric,
            share_metric: None,
        }
    }

    pub fn with_share(mut self, share_metric: MetricKey) -> Self {
        self.share_metric = Some(share_metric);
        self
    }
}

/// Rank the current rows and annotate them with comparison-period values.
///
/// `comparison == None` is single-period mode: every comparison, evolution
/// and rank-gain field stays `None`. Entities present only in the
/// comparison rows are not returned.
pub fn compute(
    current: &[EntityMetricRow],
    comparison: Option<&[EntityMetricRow]>,
    spec: &RankingSpec,
) -> Vec<RankedComparisonRow> {
    if current.is_empty() {
        return Vec::new();
    }

    let ordered = rank_order(current, spec.rank_metric);
    let previous = comparison.map(|rows| PreviousPeriod::new(rows, spec));
    let current_total = spec
        .share_metric
        .map(|key| total(current, key))
        .unwrap_or(0.0);

    ordered
        .into_iter()
        .enumerate()
        .map(|(index, row)| {
            let rank = index as u32 + 1;
            let matched = previous.as_ref().and_then(|p| p.find(&row.entity));
            let previous_rank = matched.map(|m| m.rank);
            let rank_gain = previous_rank.map(|p| i64::from(p) - i64::from(rank));

            let mut keys: BTreeSet<MetricKey> = row.metrics.keys().copied().collect();
            if let Some(m) = matched {
                keys.extend(m.row.metrics.keys().copied());
            }

            let metrics = keys
                .into_iter()
                .map(|key| {
                    let comparison_value = matched.map(|m| m.row.metric(key));
                    (key, compare(key.kind(), row.metric(key), comparison_value))
                })
                .collect();

            let market_share = spec.share_metric.map(|key| {
                let share = share_of(row.metric(key), current_total);
                let previous_share = matched
                    .zip(previous.as_ref())
                    .map(|(m, p)| share_of(m.row.metric(key), p.share_total));
                compare(MetricKind::Percentage, share, previous_share)
            });

            RankedComparisonRow {
                entity: row.entity.clone(),
                label: row.label.clone(),
                rank,
                previous_rank,
                rank_gain,
                metrics,
                market_share,
            }
        })
        .collect()
}

/// Percentage change, or the new-entrant marker when the comparison value
/// is exactly zero and the current value is positive.
pub fn percent_evolution(current: f64, comparison: Option<f64>) -> Option<PercentEvolution> {
    let comparison = comparison?;
    if comparison == 0.0 {
        return if current > 0.0 {
            Some(PercentEvolution::NewEntrant)
        } else {
            None
        };
    }
    Some(PercentEvolution::Change(
        (current - comparison) / comparison * 100.0,
    ))
}

/// Difference in percentage points.
pub fn point_delta(current: f64, comparison: Option<f64>) -> Option<f64> {
    comparison.map(|c| current - c)
}

/// `value / total * 100`, or `0` when the total is zero.
pub fn share_of(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        0.0
    } else {
        value / total * 100.0
    }
}

fn compare(kind: MetricKind, current: f64, comparison: Option<f64>) -> MetricComparison {
    let (percent_evolution, point_delta_evolution) = match kind {
        MetricKind::Absolute => (percent_evolution(current, comparison), None),
        MetricKind::Percentage => (None, point_delta(current, comparison)),
    };
    MetricComparison {
        current,
        comparison,
        percent_evolution,
        point_delta_evolution,
    }
}

/// Rows sorted descending by `key`; ties keep input order.
fn rank_order(rows: &[EntityMetricRow], key: MetricKey) -> Vec<&EntityMetricRow> {
    let mut ordered: Vec<&EntityMetricRow> = rows.iter().collect();
    ordered.sort_by(|a, b| rank_value(b, key).total_cmp(&rank_value(a, key)));
    ordered
}

fn rank_value(row: &EntityMetricRow, key: MetricKey) -> f64 {
    let value = row.metric(key);
    if value.is_nan() {
        f64::NEG_INFINITY
    } else {
        value
    }
}

fn total(rows: &[EntityMetricRow], key: MetricKey) -> f64 {
    rows.iter().map(|r| r.metric(key)).sum()
}

struct PreviousMatch<'a> {
    rank: u32,
    row: &'a EntityMetricRow,
}

/// Comparison rows indexed by entity, ranked independently.
struct PreviousPeriod<'a> {
    by_entity: HashMap<&'a str, PreviousMatch<'a>>,
    share_total: f64,
}

impl<'a> PreviousPeriod<'a> {
    fn new(rows: &'a [EntityMetricRow], spec: &RankingSpec) -> Self {
        let mut by_entity = HashMap::with_capacity(rows.len());
        for (index, row) in rank_order(rows, spec.rank_metric).into_iter().enumerate() {
            by_entity
                .entry(row.entity.as_str())
                .or_insert(PreviousMatch {
                    rank: index as u32 + 1,
                    row,
                });
        }
        let share_total = spec.share_metric.map(|key| total(rows, key)).unwrap_or(0.0);
        Self {
            by_entity,
            share_total,
        }
    }

    fn find(&self, entity: &str) -> Option<&PreviousMatch<'a>> {
        self.by_entity.get(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(entity: &str, amount: f64) -> EntityMetricRow {
        EntityMetricRow::new(entity).with_metric(MetricKey::SalesAmount, amount)
    }

    fn spec() -> RankingSpec {
        RankingSpec::by(MetricKey::SalesAmount).with_share(MetricKey::SalesAmount)
    }

    fn ranks(rows: &[RankedComparisonRow]) -> Vec<(&str, u32)> {
        rows.iter().map(|r| (r.entity.as_str(), r.rank)).collect()
    }

    #[test]
    fn test_rank_by_metric_descending() {
        let current = vec![row("A", 100.0), row("B", 200.0), row("C", 50.0)];
        let result = compute(&current, None, &spec());
        assert_eq!(ranks(&result), vec![("B", 1), ("A", 2), ("C", 3)]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let current = vec![row("A", 10.0), row("B", 30.0), row("C", 10.0), row("D", 10.0)];
        let result = compute(&current, None, &spec());
        assert_eq!(ranks(&result), vec![("B", 1), ("A", 2), ("C", 3), ("D", 4)]);
    }

    #[test]
    fn test_empty_current() {
        let comparison = vec![row("A", 1.0)];
        assert!(compute(&[], Some(&comparison), &spec()).is_empty());
        assert!(compute(&[], None, &spec()).is_empty());
    }

    #[test]
    fn test_single_entity() {
        let result = compute(&[row("A", 42.0)], None, &spec());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].rank, 1);
        assert_eq!(result[0].market_share.as_ref().unwrap().current, 100.0);
    }

    #[test]
    fn test_no_comparison_leaves_evolution_null() {
        let current = vec![row("A", 100.0), row("B", 0.0)];
        let result = compute(&current, None, &spec());
        for r in &result {
            assert_eq!(r.previous_rank, None);
            assert_eq!(r.rank_gain, None);
            let amount = r.metric(MetricKey::SalesAmount).unwrap();
            assert_eq!(amount.comparison, None);
            assert_eq!(amount.percent_evolution, None);
            let share = r.market_share.as_ref().unwrap();
            assert_eq!(share.comparison, None);
            assert_eq!(share.point_delta_evolution, None);
        }
    }

    #[test]
    fn test_percent_evolution_normal_case() {
        let result = compute(&[row("A", 120.0)], Some(&[row("A", 100.0)]), &spec());
        let amount = result[0].metric(MetricKey::SalesAmount).unwrap();
        assert_eq!(amount.comparison, Some(100.0));
        match amount.percent_evolution {
            Some(PercentEvolution::Change(v)) => assert!((v - 20.0).abs() < 1e-9),
            other => panic!("unexpected evolution {:?}", other),
        }
    }

    #[test]
    fn test_new_entrant_marker() {
        assert_eq!(
            percent_evolution(50.0, Some(0.0)),
            Some(PercentEvolution::NewEntrant)
        );
        assert_eq!(percent_evolution(0.0, Some(0.0)), None);
        assert_eq!(percent_evolution(50.0, None), None);
    }

    #[test]
    fn test_negative_base_divides_by_signed_value() {
        match percent_evolution(-50.0, Some(-100.0)) {
            Some(PercentEvolution::Change(v)) => assert!((v + 50.0).abs() < 1e-9),
            other => panic!("unexpected evolution {:?}", other),
        }
    }

    #[test]
    fn test_rank_gain() {
        // A is 5th in the comparison period and 2nd now
        let comparison = vec![
            row("B", 900.0),
            row("C", 800.0),
            row("D", 700.0),
            row("E", 600.0),
            row("A", 100.0),
        ];
        let current = vec![row("B", 900.0), row("A", 850.0), row("C", 10.0)];
        let result = compute(&current, Some(&comparison), &spec());

        let a = result.iter().find(|r| r.entity == "A").unwrap();
        assert_eq!(a.rank, 2);
        assert_eq!(a.previous_rank, Some(5));
        assert_eq!(a.rank_gain, Some(3));

        let c = result.iter().find(|r| r.entity == "C").unwrap();
        assert_eq!(c.rank_gain, Some(-1));
    }

    #[test]
    fn test_entity_missing_from_comparison() {
        let result = compute(&[row("A", 10.0), row("Z", 5.0)], Some(&[row("A", 8.0)]), &spec());
        let z = result.iter().find(|r| r.entity == "Z").unwrap();
        assert_eq!(z.previous_rank, None);
        assert_eq!(z.rank_gain, None);
        let amount = z.metric(MetricKey::SalesAmount).unwrap();
        assert_eq!(amount.comparison, None);
        assert_eq!(amount.percent_evolution, None);
        assert_eq!(z.market_share.as_ref().unwrap().comparison, None);
    }

    #[test]
    fn test_join_is_exact_match() {
        let result = compute(&[row("lab a", 10.0)], Some(&[row("LAB A", 8.0)]), &spec());
        assert_eq!(result[0].previous_rank, None);
    }

    #[test]
    fn test_market_share_sums_to_hundred() {
        let current = vec![row("A", 33.0), row("B", 17.0), row("C", 71.5), row("D", 0.0)];
        let result = compute(&current, None, &spec());
        let sum: f64 = result
            .iter()
            .map(|r| r.market_share.as_ref().unwrap().current)
            .sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_market_share_all_zero() {
        let result = compute(&[row("A", 0.0), row("B", 0.0)], None, &spec());
        for r in &result {
            let share = r.market_share.as_ref().unwrap().current;
            assert_eq!(share, 0.0);
            assert!(!share.is_nan());
        }
    }

    #[test]
    fn test_market_share_point_delta() {
        let current = vec![row("A", 75.0), row("B", 25.0)];
        let comparison = vec![row("A", 50.0), row("B", 50.0)];
        let result = compute(&current, Some(&comparison), &spec());
        let a = result.iter().find(|r| r.entity == "A").unwrap();
        let share = a.market_share.as_ref().unwrap();
        assert_eq!(share.current, 75.0);
        assert_eq!(share.comparison, Some(50.0));
        assert_eq!(share.point_delta_evolution, Some(25.0));
        assert_eq!(share.percent_evolution, None);
    }

    #[test]
    fn test_percentage_metric_uses_point_delta() {
        let current = vec![EntityMetricRow::new("A")
            .with_metric(MetricKey::SalesAmount, 100.0)
            .with_metric(MetricKey::MarginRate, 32.5)];
        let comparison = vec![EntityMetricRow::new("A")
            .with_metric(MetricKey::SalesAmount, 90.0)
            .with_metric(MetricKey::MarginRate, 30.0)];
        let result = compute(&current, Some(&comparison), &spec());
        let rate = result[0].metric(MetricKey::MarginRate).unwrap();
        assert_eq!(rate.point_delta_evolution, Some(2.5));
        assert_eq!(rate.percent_evolution, None);
    }

    #[test]
    fn test_without_share_metric() {
        let result = compute(&[row("A", 1.0)], None, &RankingSpec::by(MetricKey::SalesAmount));
        assert!(result[0].market_share.is_none());
    }

    #[test]
    fn test_labels_are_carried() {
        let current = vec![row("L1", 5.0).with_label("Laboratoire Un")];
        let result = compute(&current, None, &spec());
        assert_eq!(result[0].label.as_deref(), Some("Laboratoire Un"));
    }

    #[test]
    fn test_metric_missing_in_one_period() {
        use maplit::btreemap;

        let current = vec![EntityMetricRow {
            entity: "A".into(),
            label: None,
            metrics: btreemap! {
                MetricKey::SalesAmount => 10.0,
                MetricKey::Quantity => 4.0,
            },
        }];
        let comparison = vec![EntityMetricRow {
            entity: "A".into(),
            label: None,
            metrics: btreemap! {
                MetricKey::SalesAmount => 5.0,
                MetricKey::MarginAmount => 2.0,
            },
        }];
        let result = compute(&current, Some(&comparison), &spec());

        let quantity = result[0].metric(MetricKey::Quantity).unwrap();
        assert_eq!(quantity.comparison, Some(0.0));
        assert_eq!(quantity.percent_evolution, Some(PercentEvolution::NewEntrant));

        let margin = result[0].metric(MetricKey::MarginAmount).unwrap();
        assert_eq!(margin.current, 0.0);
        assert_eq!(margin.percent_evolution, Some(PercentEvolution::Change(-100.0)));
    }
}
