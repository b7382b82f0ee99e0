pub mod filter;
pub mod metrics;
pub mod period;

pub use filter::*;
pub use metrics::*;
pub use period::*;
