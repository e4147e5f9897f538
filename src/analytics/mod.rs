//! Cash-flow analytics. `baseline`, `anomaly` and `ratio` are pure functions
//! over values; `report` wires them to a [`DataSource`].

pub mod anomaly;
pub mod baseline;
pub mod ratio;
pub mod report;
mod source;

pub use anomaly::{AnomalyResult, Severity, DEFAULT_THRESHOLD, MAX_THRESHOLD};
pub use ratio::{CategoryTotal, StabilityStatus, TrendDirection, TrendPoint};
pub use report::{AnomalyOptions, AnomalyReport, CashFlowMonth, Dashboard, GrowthReport};
pub use source::{DataSource, Granularity, PeriodSum};
