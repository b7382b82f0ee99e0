//! Filter composition and period-comparison engine.
//!
//! A request flows through:
//! - `request_mapping` - API request → `FilterSelection` + `PeriodRequest`
//! - `period` - `PeriodRequest` → `PeriodContext` (current + optional comparison)
//! - `predicate_builder` - `FilterSelection` + `ColumnMap` → `PredicateSet`
//! - `orchestrator` - concurrent fetch of both periods through a `QueryExecutor`
//! - `ranking` - ranks, rank gains, evolutions and market share
//!
//! `pipeline` chains these for one repository adapter.

pub mod cache_key;
pub mod column_map;
pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod period;
pub mod pipeline;
pub mod predicate_builder;
pub mod ranking;
pub mod request_mapping;

pub use column_map::ColumnMap;
pub use error::{AnalyticsError, AnalyticsResult};
pub use executor::{AggregationSpec, MetricColumn, QueryExecutor, SeaOrmExecutor};
pub use orchestrator::FetchDeadline;
pub use pipeline::{PageRequest, SubjectQuery};
pub use predicate_builder::{PredicateBuilder, PredicateSet, QueryParam};
pub use ranking::RankingSpec;
