use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Filter axes
// ---------------------------------------------------------------------------

/// Entity axis filtered by id-set membership (inclusion or exclusion).
///
/// Category levels are the six depths of the product category tree; the
/// caller picks the level matching the depth of the chosen path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Pharmacy,
    Laboratory,
    Product,
    #[serde(rename = "category_level_0")]
    CategoryLevel0,
    #[serde(rename = "category_level_1")]
    CategoryLevel1,
    #[serde(rename = "category_level_2")]
    CategoryLevel2,
    #[serde(rename = "category_level_3")]
    CategoryLevel3,
    #[serde(rename = "category_level_4")]
    CategoryLevel4,
    #[serde(rename = "category_level_5")]
    CategoryLevel5,
    GenericGroup,
}

impl Dimension {
    pub const ALL: [Dimension; 10] = [
        Dimension::Pharmacy,
        Dimension::Laboratory,
        Dimension::Product,
        Dimension::CategoryLevel0,
        Dimension::CategoryLevel1,
        Dimension::CategoryLevel2,
        Dimension::CategoryLevel3,
        Dimension::CategoryLevel4,
        Dimension::CategoryLevel5,
        Dimension::GenericGroup,
    ];

    /// Category dimension for a tree depth (0..=5).
    pub fn category_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(Dimension::CategoryLevel0),
            1 => Some(Dimension::CategoryLevel1),
            2 => Some(Dimension::CategoryLevel2),
            3 => Some(Dimension::CategoryLevel3),
            4 => Some(Dimension::CategoryLevel4),
            5 => Some(Dimension::CategoryLevel5),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Pharmacy => "pharmacy",
            Dimension::Laboratory => "laboratory",
            Dimension::Product => "product",
            Dimension::CategoryLevel0 => "category_level_0",
            Dimension::CategoryLevel1 => "category_level_1",
            Dimension::CategoryLevel2 => "category_level_2",
            Dimension::CategoryLevel3 => "category_level_3",
            Dimension::CategoryLevel4 => "category_level_4",
            Dimension::CategoryLevel5 => "category_level_5",
            Dimension::GenericGroup => "generic_group",
        }
    }
}

/// Numeric product attribute filtered by an inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeDimension {
    PurchasePriceNet,
    PurchasePriceGross,
    SellPrice,
    DiscountPercent,
    MarginPercent,
}

impl RangeDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeDimension::PurchasePriceNet => "purchase_price_net",
            RangeDimension::PurchasePriceGross => "purchase_price_gross",
            RangeDimension::SellPrice => "sell_price",
            RangeDimension::DiscountPercent => "discount_percent",
            RangeDimension::MarginPercent => "margin_percent",
        }
    }
}

/// Inclusive `[min, max]` bounds. `{min: 0, max: 0}` is a real filter;
/// omit the key to skip the axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReimbursementStatus {
    #[default]
    All,
    Reimbursed,
    NotReimbursed,
}

/// Regulatory generic classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenericStatus {
    #[default]
    All,
    Generic,
    Princeps,
    /// Any product belonging to a generic group, generic or reference.
    PrincepsGeneric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    #[default]
    All,
    Medicament,
    Parapharmacie,
}

/// Enumerated filters. `ALL` and an empty TVA set produce no predicate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnumFilters {
    #[serde(default)]
    pub tva_rates: Vec<f64>,
    #[serde(default)]
    pub reimbursement_status: ReimbursementStatus,
    #[serde(default)]
    pub generic_status: GenericStatus,
    #[serde(default)]
    pub product_type: ProductType,
}

/// How two adjacent top-level filter groups combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Combinator {
    And,
    Or,
}

// ---------------------------------------------------------------------------
// Full selection
// ---------------------------------------------------------------------------

/// Complete filter state of one analytic request.
///
/// Membership inside one dimension is always any-of; dimensions compose
/// with AND.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FilterSelection {
    #[serde(default)]
    pub entity_sets: BTreeMap<Dimension, Vec<String>>,
    #[serde(default)]
    pub exclusions: BTreeMap<Dimension, Vec<String>>,
    #[serde(default)]
    pub range_filters: BTreeMap<RangeDimension, NumericRange>,
    #[serde(default)]
    pub enum_filters: EnumFilters,
    #[serde(default)]
    pub combinators: Vec<Combinator>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include<I, S>(mut self, dimension: Dimension, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entity_sets
            .entry(dimension)
            .or_default()
            .extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn exclude<I, S>(mut self, dimension: Dimension, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions
            .entry(dimension)
            .or_default()
            .extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_range(mut self, dimension: RangeDimension, range: NumericRange) -> Self {
        self.range_filters.insert(dimension, range);
        self
    }

    /// Ids included for a dimension (empty slice when unset).
    pub fn included(&self, dimension: Dimension) -> &[String] {
        self.entity_sets
            .get(&dimension)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Replace the inclusion set of one dimension.
    pub fn set_included(&mut self, dimension: Dimension, ids: Vec<String>) {
        if ids.is_empty() {
            self.entity_sets.remove(&dimension);
        } else {
            self.entity_sets.insert(dimension, ids);
        }
    }
}
