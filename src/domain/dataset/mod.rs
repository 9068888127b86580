// ============================================================
// DATASET DOMAIN LAYER
// ============================================================
// Core types for loaded tabular data and its analysis
// No I/O, no async

mod analysis;
mod analysis_config;
mod cell_value;
mod column_role;
mod record;
mod table;

pub use analysis::{AnalysisRecord, AnalysisResult, Metric, StatisticsMap};
pub use analysis_config::AnalysisConfig;
pub use cell_value::{CellValue, GroupKey};
pub use column_role::{ColumnRole, ColumnRoles};
pub use record::{DatasetRecord, DatasetSummary};
pub use table::{Dataset, Row};
