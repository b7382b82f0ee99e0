use contracts::shared::analytics::{Dimension, RangeDimension};

/// Allow-listed column identifiers for one aggregation source.
///
/// Every identifier is a compile-time constant; request data never reaches
/// SQL text through this map.
#[derive(Debug)]
pub struct ColumnMap {
    pub dimensions: &'static [(Dimension, &'static str)],
    pub ranges: &'static [(RangeDimension, &'static str)],
    pub tva_rate: Option<&'static str>,
    pub reimbursement: Option<&'static str>,
    pub generic_status: Option<&'static str>,
    pub product_type: Option<&'static str>,
}

impl ColumnMap {
    pub fn dimension(&self, dimension: Dimension) -> Option<&'static str> {
        self.dimensions
            .iter()
            .find(|(d, _)| *d == dimension)
            .map(|(_, column)| *column)
    }

    pub fn range(&self, dimension: RangeDimension) -> Option<&'static str> {
        self.ranges
            .iter()
            .find(|(d, _)| *d == dimension)
            .map(|(_, column)| *column)
    }
}
