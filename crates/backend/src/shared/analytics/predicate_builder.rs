use contracts::shared::analytics::{
    Combinator, DateRange, Dimension, FilterSelection, GenericStatus, ProductType, RangeDimension,
    ReimbursementStatus,
};
use std::collections::HashSet;

use super::column_map::ColumnMap;
use super::error::{AnalyticsError, AnalyticsResult};

/// Bound query parameter
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    Text(String),
    Integer(i64),
    Numeric(f64),
}

impl From<QueryParam> for sea_orm::Value {
    fn from(p: QueryParam) -> Self {
        match p {
            QueryParam::Text(s) => s.into(),
            QueryParam::Integer(i) => i.into(),
            QueryParam::Numeric(n) => n.into(),
        }
    }
}

/// Top-level filter group a fragment belongs to.
///
/// Inclusion and exclusion on the same dimension form one group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterGroup {
    Entity(Dimension),
    Range(RangeDimension),
    TvaRate,
    Reimbursement,
    GenericStatus,
    ProductType,
    Period,
}

/// One parameterised predicate. `sql` only contains allow-listed column
/// identifiers and `?` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateFragment {
    pub sql: String,
    pub param_count: usize,
    pub group: FilterGroup,
}

/// Ordered predicate fragments plus the positional parameter vector.
///
/// Parameters appear in exactly the order their fragments were emitted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PredicateSet {
    fragments: Vec<PredicateFragment>,
    params: Vec<QueryParam>,
}

impl PredicateSet {
    pub fn fragments(&self) -> &[PredicateFragment] {
        &self.fragments
    }

    pub fn params(&self) -> &[QueryParam] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Fragments joined with AND; empty when there is nothing to filter.
    pub fn where_clause(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.sql.as_str())
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    /// Length of the rendered predicate text (diagnostics).
    pub fn text_len(&self) -> usize {
        self.where_clause().len()
    }

    /// Number of distinct top-level filter groups.
    pub fn active_groups(&self) -> usize {
        let mut seen = Vec::new();
        for fragment in &self.fragments {
            if !seen.contains(&fragment.group) {
                seen.push(fragment.group);
            }
        }
        seen.len()
    }

    /// Copy of this set restricted to one closed date interval.
    pub fn with_date_range(&self, column: &'static str, range: DateRange) -> PredicateSet {
        let mut set = self.clone();
        set.push(
            FilterGroup::Period,
            format!("{} >= ?", column),
            vec![QueryParam::Text(range.start.format("%Y-%m-%d").to_string())],
        );
        set.push(
            FilterGroup::Period,
            format!("{} <= ?", column),
            vec![QueryParam::Text(range.end.format("%Y-%m-%d").to_string())],
        );
        set
    }

    fn push(&mut self, group: FilterGroup, sql: String, mut params: Vec<QueryParam>) {
        self.fragments.push(PredicateFragment {
            sql,
            param_count: params.len(),
            group,
        });
        self.params.append(&mut params);
    }
}

/// Turns a `FilterSelection` into a `PredicateSet` for one column map.
///
/// Pure: no I/O, identical input yields identical output.
pub struct PredicateBuilder<'a> {
    columns: &'a ColumnMap,
    selection: &'a FilterSelection,
}

impl<'a> PredicateBuilder<'a> {
    pub fn new(columns: &'a ColumnMap, selection: &'a FilterSelection) -> Self {
        Self { columns, selection }
    }

    /// Validate the selection and emit its predicates.
    pub fn build(&self) -> AnalyticsResult<PredicateSet> {
        let mut set = PredicateSet::default();

        self.build_inclusions(&mut set)?;
        self.build_exclusions(&mut set)?;
        self.build_ranges(&mut set)?;
        self.build_enums(&mut set)?;

        self.check_combinators(&set)?;

        Ok(set)
    }

    fn build_inclusions(&self, set: &mut PredicateSet) -> AnalyticsResult<()> {
        for (dimension, ids) in &self.selection.entity_sets {
            let ids = distinct(ids);
            if ids.is_empty() {
                continue;
            }
            let column = self.dimension_column(*dimension)?;
            set.push(
                FilterGroup::Entity(*dimension),
                format!("{} IN ({})", column, placeholders(ids.len())),
                text_params(&ids),
            );
        }
        Ok(())
    }

    fn build_exclusions(&self, set: &mut PredicateSet) -> AnalyticsResult<()> {
        for (dimension, ids) in &self.selection.exclusions {
            let ids = distinct(ids);
            if ids.is_empty() {
                continue;
            }
            let column = self.dimension_column(*dimension)?;
            // Rows without a value for the column are not excluded.
            set.push(
                FilterGroup::Entity(*dimension),
                format!(
                    "({} IS NULL OR {} NOT IN ({}))",
                    column,
                    column,
                    placeholders(ids.len())
                ),
                text_params(&ids),
            );
        }
        Ok(())
    }

    fn build_ranges(&self, set: &mut PredicateSet) -> AnalyticsResult<()> {
        for (dimension, range) in &self.selection.range_filters {
            if !range.min.is_finite() || !range.max.is_finite() {
                return Err(AnalyticsError::InvalidFilterCombination(format!(
                    "range {} must have finite bounds",
                    dimension.as_str()
                )));
            }
            if range.min > range.max {
                return Err(AnalyticsError::InvalidFilterCombination(format!(
                    "range {} has min {} greater than max {}",
                    dimension.as_str(),
                    range.min,
                    range.max
                )));
            }
            let column = self.columns.range(*dimension).ok_or_else(|| {
                AnalyticsError::InvalidFilterCombination(format!(
                    "range {} is not available for this analysis",
                    dimension.as_str()
                ))
            })?;
            set.push(
                FilterGroup::Range(*dimension),
                format!("({} >= ? AND {} <= ?)", column, column),
                vec![QueryParam::Numeric(range.min), QueryParam::Numeric(range.max)],
            );
        }
        Ok(())
    }

    fn build_enums(&self, set: &mut PredicateSet) -> AnalyticsResult<()> {
        let filters = &self.selection.enum_filters;

        if !filters.tva_rates.is_empty() {
            if let Some(rate) = filters
                .tva_rates
                .iter()
                .find(|r| !r.is_finite() || **r < 0.0)
            {
                return Err(AnalyticsError::InvalidFilterCombination(format!(
                    "invalid TVA rate: {}",
                    rate
                )));
            }
            let column = self.enum_column(self.columns.tva_rate, "tva_rate")?;
            set.push(
                FilterGroup::TvaRate,
                format!("{} IN ({})", column, placeholders(filters.tva_rates.len())),
                filters
                    .tva_rates
                    .iter()
                    .map(|r| QueryParam::Numeric(*r))
                    .collect(),
            );
        }

        match filters.reimbursement_status {
            ReimbursementStatus::All => {}
            ReimbursementStatus::Reimbursed => {
                let column = self.enum_column(self.columns.reimbursement, "reimbursement_status")?;
                set.push(
                    FilterGroup::Reimbursement,
                    format!("{} = ?", column),
                    vec![QueryParam::Integer(1)],
                );
            }
            ReimbursementStatus::NotReimbursed => {
                let column = self.enum_column(self.columns.reimbursement, "reimbursement_status")?;
                set.push(
                    FilterGroup::Reimbursement,
                    format!("({} IS NULL OR {} = ?)", column, column),
                    vec![QueryParam::Integer(0)],
                );
            }
        }

        let generic_values: &[&str] = match filters.generic_status {
            GenericStatus::All => &[],
            GenericStatus::Generic => &["GENERIC"],
            GenericStatus::Princeps => &["PRINCEPS"],
            GenericStatus::PrincepsGeneric => &["PRINCEPS", "GENERIC"],
        };
        if !generic_values.is_empty() {
            let column = self.enum_column(self.columns.generic_status, "generic_status")?;
            let sql = if generic_values.len() == 1 {
                format!("{} = ?", column)
            } else {
                format!("{} IN ({})", column, placeholders(generic_values.len()))
            };
            set.push(
                FilterGroup::GenericStatus,
                sql,
                generic_values
                    .iter()
                    .map(|v| QueryParam::Text((*v).to_string()))
                    .collect(),
            );
        }

        let product_type = match filters.product_type {
            ProductType::All => None,
            ProductType::Medicament => Some("MEDICAMENT"),
            ProductType::Parapharmacie => Some("PARAPHARMACIE"),
        };
        if let Some(value) = product_type {
            let column = self.enum_column(self.columns.product_type, "product_type")?;
            set.push(
                FilterGroup::ProductType,
                format!("{} = ?", column),
                vec![QueryParam::Text(value.to_string())],
            );
        }

        Ok(())
    }

    /// Dimensions always compose with AND. The combinator list must match
    /// the number of active groups, and OR is refused rather than ignored.
    fn check_combinators(&self, set: &PredicateSet) -> AnalyticsResult<()> {
        let combinators = &self.selection.combinators;
        if combinators.is_empty() {
            return Ok(());
        }

        let expected = set.active_groups().saturating_sub(1);
        if combinators.len() != expected {
            return Err(AnalyticsError::InvalidFilterCombination(format!(
                "expected {} combinators for {} filter groups, got {}",
                expected,
                set.active_groups(),
                combinators.len()
            )));
        }
        if combinators.contains(&Combinator::Or) {
            return Err(AnalyticsError::InvalidFilterCombination(
                "OR between filter groups is not supported".to_string(),
            ));
        }
        Ok(())
    }

    fn dimension_column(&self, dimension: Dimension) -> AnalyticsResult<&'static str> {
        self.columns.dimension(dimension).ok_or_else(|| {
            AnalyticsError::InvalidFilterCombination(format!(
                "filter {} is not available for this analysis",
                dimension.as_str()
            ))
        })
    }

    fn enum_column(
        &self,
        column: Option<&'static str>,
        name: &str,
    ) -> AnalyticsResult<&'static str> {
        column.ok_or_else(|| {
            AnalyticsError::InvalidFilterCombination(format!(
                "filter {} is not available for this analysis",
                name
            ))
        })
    }
}

/// Set members in first-seen order.
fn distinct(ids: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(String::as_str)
        .filter(|id| seen.insert(*id))
        .collect()
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn text_params(ids: &[&str]) -> Vec<QueryParam> {
    ids.iter().map(|id| QueryParam::Text((*id).to_string())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use contracts::shared::analytics::NumericRange;

    static COLUMNS: ColumnMap = ColumnMap {
        dimensions: &[
            (Dimension::Pharmacy, "f.pharmacy_id"),
            (Dimension::Laboratory, "f.laboratory_code"),
            (Dimension::Product, "f.product_code"),
            (Dimension::CategoryLevel2, "f.category_level_2"),
        ],
        ranges: &[
            (RangeDimension::SellPrice, "f.sell_price"),
            (RangeDimension::MarginPercent, "f.margin_percent"),
        ],
        tva_rate: Some("f.tva_rate"),
        reimbursement: Some("f.is_reimbursed"),
        generic_status: Some("f.generic_status"),
        product_type: Some("f.product_type"),
    };

    fn text(values: &[&str]) -> Vec<QueryParam> {
        values.iter().map(|v| QueryParam::Text(v.to_string())).collect()
    }

    #[test]
    fn test_empty_selection_yields_nothing() {
        let selection = FilterSelection::new();
        let set = PredicateBuilder::new(&COLUMNS, &selection).build().unwrap();
        assert!(set.is_empty());
        assert!(set.params().is_empty());
        assert_eq!(set.where_clause(), "");
    }

    #[test]
    fn test_empty_sets_are_skipped() {
        let selection = FilterSelection::new()
            .include(Dimension::Laboratory, Vec::<String>::new())
            .exclude(Dimension::Product, Vec::<String>::new());
        let set = PredicateBuilder::new(&COLUMNS, &selection).build().unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_inclusion_params_match_set() {
        let selection =
            FilterSelection::new().include(Dimension::Laboratory, ["LAB_B", "LAB_A", "LAB_C"]);
        let set = PredicateBuilder::new(&COLUMNS, &selection).build().unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.fragments()[0].sql, "f.laboratory_code IN (?, ?, ?)");
        assert_eq!(set.fragments()[0].param_count, 3);
        assert_eq!(set.params(), text(&["LAB_B", "LAB_A", "LAB_C"]).as_slice());
    }

    #[test]
    fn test_params_follow_fragment_order() {
        let selection = FilterSelection::new()
            .include(Dimension::Product, ["P1"])
            .include(Dimension::Pharmacy, ["PH1", "PH2"])
            .exclude(Dimension::Laboratory, ["LAB_Z"])
            .with_range(RangeDimension::SellPrice, NumericRange::new(1.5, 9.0));
        let set = PredicateBuilder::new(&COLUMNS, &selection).build().unwrap();

        let sql: Vec<&str> = set.fragments().iter().map(|f| f.sql.as_str()).collect();
        assert_eq!(
            sql,
            vec![
                "f.pharmacy_id IN (?, ?)",
                "f.product_code IN (?)",
                "(f.laboratory_code IS NULL OR f.laboratory_code NOT IN (?))",
                "(f.sell_price >= ? AND f.sell_price <= ?)",
            ]
        );

        let mut expected = text(&["PH1", "PH2", "P1", "LAB_Z"]);
        expected.push(QueryParam::Numeric(1.5));
        expected.push(QueryParam::Numeric(9.0));
        assert_eq!(set.params(), expected.as_slice());

        let counted: usize = set.fragments().iter().map(|f| f.param_count).sum();
        assert_eq!(counted, set.params().len());
    }

    #[test]
    fn test_duplicates_collapse_to_first_occurrence() {
        let selection = FilterSelection::new().include(Dimension::Product, ["P2", "P1", "P2"]);
        let set = PredicateBuilder::new(&COLUMNS, &selection).build().unwrap();
        assert_eq!(set.params(), text(&["P2", "P1"]).as_slice());
    }

    #[test]
    fn test_build_is_idempotent() {
        let selection = FilterSelection::new()
            .include(Dimension::CategoryLevel2, ["Antalgiques"])
            .exclude(Dimension::Product, ["P9"]);
        let builder = PredicateBuilder::new(&COLUMNS, &selection);
        let first = builder.build().unwrap();
        let second = builder.build().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.where_clause(), second.where_clause());
    }

    #[test]
    fn test_user_values_never_reach_sql_text() {
        let hostile = "x'); DROP TABLE f100_sales_facts; --";
        let selection = FilterSelection::new().include(Dimension::Product, [hostile]);
        let set = PredicateBuilder::new(&COLUMNS, &selection).build().unwrap();
        assert!(!set.where_clause().contains("DROP"));
        assert_eq!(set.params(), text(&[hostile]).as_slice());
    }

    #[test]
    fn test_zero_range_is_a_real_filter() {
        let selection = FilterSelection::new()
            .with_range(RangeDimension::MarginPercent, NumericRange::new(0.0, 0.0));
        let set = PredicateBuilder::new(&COLUMNS, &selection).build().unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(
            set.params(),
            &[QueryParam::Numeric(0.0), QueryParam::Numeric(0.0)]
        );
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let selection = FilterSelection::new()
            .with_range(RangeDimension::SellPrice, NumericRange::new(10.0, 2.0));
        let err = PredicateBuilder::new(&COLUMNS, &selection)
            .build()
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidFilterCombination(_)));
    }

    #[test]
    fn test_unmapped_dimension_is_rejected() {
        let selection = FilterSelection::new().include(Dimension::GenericGroup, ["G1"]);
        let err = PredicateBuilder::new(&COLUMNS, &selection)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("generic_group"));
    }

    #[test]
    fn test_all_sentinels_emit_nothing() {
        let mut selection = FilterSelection::new();
        selection.enum_filters.reimbursement_status = ReimbursementStatus::All;
        selection.enum_filters.generic_status = GenericStatus::All;
        selection.enum_filters.product_type = ProductType::All;
        let set = PredicateBuilder::new(&COLUMNS, &selection).build().unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_enum_filters() {
        let mut selection = FilterSelection::new();
        selection.enum_filters.tva_rates = vec![2.1, 5.5];
        selection.enum_filters.reimbursement_status = ReimbursementStatus::NotReimbursed;
        selection.enum_filters.generic_status = GenericStatus::PrincepsGeneric;
        selection.enum_filters.product_type = ProductType::Medicament;
        let set = PredicateBuilder::new(&COLUMNS, &selection).build().unwrap();

        let sql: Vec<&str> = set.fragments().iter().map(|f| f.sql.as_str()).collect();
        assert_eq!(
            sql,
            vec![
                "f.tva_rate IN (?, ?)",
                "(f.is_reimbursed IS NULL OR f.is_reimbursed = ?)",
                "f.generic_status IN (?, ?)",
                "f.product_type = ?",
            ]
        );
        assert_eq!(
            set.params(),
            &[
                QueryParam::Numeric(2.1),
                QueryParam::Numeric(5.5),
                QueryParam::Integer(0),
                QueryParam::Text("PRINCEPS".into()),
                QueryParam::Text("GENERIC".into()),
                QueryParam::Text("MEDICAMENT".into()),
            ]
        );
    }

    #[test]
    fn test_combinators_must_match_group_count() {
        let mut selection = FilterSelection::new()
            .include(Dimension::Laboratory, ["LAB_A"])
            .exclude(Dimension::Laboratory, ["LAB_B"])
            .include(Dimension::Product, ["P1"]);

        // two groups: laboratory (in + out) and product
        selection.combinators = vec![Combinator::And];
        assert!(PredicateBuilder::new(&COLUMNS, &selection).build().is_ok());

        selection.combinators = vec![Combinator::And, Combinator::And];
        assert!(PredicateBuilder::new(&COLUMNS, &selection).build().is_err());
    }

    #[test]
    fn test_or_combinator_is_refused() {
        let mut selection = FilterSelection::new()
            .include(Dimension::Laboratory, ["LAB_A"])
            .include(Dimension::Product, ["P1"]);
        selection.combinators = vec![Combinator::Or];
        let err = PredicateBuilder::new(&COLUMNS, &selection)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("OR"));
    }

    #[test]
    fn test_with_date_range_appends_period_bounds() {
        let selection = FilterSelection::new().include(Dimension::Laboratory, ["LAB_X"]);
        let base = PredicateBuilder::new(&COLUMNS, &selection).build().unwrap();
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        );
        let set = base.with_date_range("f.sale_date", range);

        assert_eq!(base.len(), 1);
        assert_eq!(
            set.where_clause(),
            "f.laboratory_code IN (?) AND f.sale_date >= ? AND f.sale_date <= ?"
        );
        assert_eq!(
            set.params(),
            text(&["LAB_X", "2025-01-01", "2025-01-31"]).as_slice()
        );
    }
}
