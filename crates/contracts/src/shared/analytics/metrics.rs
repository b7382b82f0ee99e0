use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Metric identity
// ---------------------------------------------------------------------------

/// Numeric metric produced by an aggregation query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    Quantity,
    SalesAmount,
    MarginAmount,
    MarginRate,
    PurchaseQuantity,
    PurchaseAmount,
    PharmacyCount,
}

/// How the evolution of a metric is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Amounts and counts: relative change in percent.
    Absolute,
    /// Already a percentage: difference in points.
    Percentage,
}

impl MetricKey {
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricKey::MarginRate => MetricKind::Percentage,
            _ => MetricKind::Absolute,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::Quantity => "quantity",
            MetricKey::SalesAmount => "sales_amount",
            MetricKey::MarginAmount => "margin_amount",
            MetricKey::MarginRate => "margin_rate",
            MetricKey::PurchaseQuantity => "purchase_quantity",
            MetricKey::PurchaseAmount => "purchase_amount",
            MetricKey::PharmacyCount => "pharmacy_count",
        }
    }
}

// ---------------------------------------------------------------------------
// Raw and ranked rows
// ---------------------------------------------------------------------------

/// One aggregated row for one entity over one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMetricRow {
    /// Join key between periods (exact match).
    pub entity: String,
    pub label: Option<String>,
    pub metrics: BTreeMap<MetricKey, f64>,
}

impl EntityMetricRow {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            label: None,
            metrics: BTreeMap::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_metric(mut self, key: MetricKey, value: f64) -> Self {
        self.metrics.insert(key, value);
        self
    }

    /// Metric value, `0.0` when the row does not carry it.
    pub fn metric(&self, key: MetricKey) -> f64 {
        self.metrics.get(&key).copied().unwrap_or(0.0)
    }
}

/// Percentage change of an absolute metric.
///
/// Serialized as a plain number, or the string `"new"` when the comparison
/// value was exactly zero and the current value is positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PercentEvolution {
    Change(f64),
    NewEntrant,
}

const NEW_ENTRANT_MARKER: &str = "new";

impl Serialize for PercentEvolution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PercentEvolution::Change(value) => serializer.serialize_f64(*value),
            PercentEvolution::NewEntrant => serializer.serialize_str(NEW_ENTRANT_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for PercentEvolution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Marker(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(value) => Ok(PercentEvolution::Change(value)),
            Raw::Marker(marker) if marker == NEW_ENTRANT_MARKER => {
                Ok(PercentEvolution::NewEntrant)
            }
            Raw::Marker(other) => Err(serde::de::Error::custom(format!(
                "unknown evolution marker: {other}"
            ))),
        }
    }
}

/// Current value of one metric with its comparison-period counterpart.
///
/// Evolution fields are `null` (never `0`) when no comparison exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricComparison {
    pub current: f64,
    pub comparison: Option<f64>,
    pub percent_evolution: Option<PercentEvolution>,
    pub point_delta_evolution: Option<f64>,
}

/// Ranked, evolution-annotated entity row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedComparisonRow {
    pub entity: String,
    pub label: Option<String>,
    /// 1-based position in the current period.
    pub rank: u32,
    pub previous_rank: Option<u32>,
    /// `previous_rank - rank`; positive means the entity moved up.
    pub rank_gain: Option<i64>,
    pub metrics: BTreeMap<MetricKey, MetricComparison>,
    /// Share (in percent) of the share metric within the ranked collection.
    pub market_share: Option<MetricComparison>,
}

impl RankedComparisonRow {
    pub fn metric(&self, key: MetricKey) -> Option<&MetricComparison> {
        self.metrics.get(&key)
    }
}
