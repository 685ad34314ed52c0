use serde::{Deserialize, Serialize};

use super::keywords::KeywordTables;

/// Calibration constants tuned against historical results. They are not
/// derived from a formula and may be revised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub base_max_score: f64,
    /// Maximum when cash runway is pinned at its penalty by positive cash flow.
    pub positive_cash_flow_max_score: f64,
    pub droppiness_bonus: f64,
    pub news_recency_days: i64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            base_max_score: 150.0,
            positive_cash_flow_max_score: 113.0,
            droppiness_bonus: 12.0,
            news_recency_days: 7,
        }
    }
}

/// Everything the scoring engine can be tuned with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub keywords: KeywordTables,
    pub calibration: CalibrationConfig,
}
