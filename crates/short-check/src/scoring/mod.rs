//! Deterministic short-check scoring.
//!
//! The engine turns a sparse [`ExtractedData`] record into a bounded rating,
//! a verdict category, walk-away flags, and display artifacts. It performs no
//! I/O and reads no clock: the evaluation date is always passed in, so the same
//! input and date always produce the same result.

mod aggregate;
mod config;
pub mod domain;
mod factors;
mod keywords;
mod normalizer;
mod presentation;
pub mod router;
mod status;
mod walk_away;

#[cfg(test)]
mod tests;

pub use aggregate::{Category, ScoreBreakdown};
pub use config::{CalibrationConfig, ScoringConfig};
pub use domain::{ExtractedData, ProviderTag, Severity, StatusTag};
pub use factors::{NewsClass, ScoreFactor};
pub use keywords::{DilutionMechanism, KeywordTables, NewsKeywords};
pub use normalizer::{derive_runway_months, normalize_units, NormalizedInput};
pub use presentation::{AlertChip, ChipSeverity};
pub use router::{short_check_router, RequestError, ShortCheckRequest, ShortCheckResponse};
pub use status::{ResolvedStatus, ResolvedStatuses, StatusSource};
pub use walk_away::WalkAwayReason;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use factors::FactorContext;

/// Final output of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShortCheckResult {
    pub rating: f64,
    pub category: Category,
    pub category_label: &'static str,
    pub total_score: i32,
    pub max_possible_score: f64,
    pub walk_away_flags: Vec<String>,
    pub walk_away_reasons: Vec<WalkAwayReason>,
    pub alert_chips: Vec<AlertChip>,
    pub breakdown: ScoreBreakdown,
    pub statuses: ResolvedStatuses,
    pub synopsis: String,
    pub alert_card: String,
}

/// Stateless evaluator over a fixed scoring configuration.
#[derive(Debug, Clone, Default)]
pub struct ShortCheckEngine {
    config: ScoringConfig,
}

impl ShortCheckEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Scores one record. A droppiness signal that arrives later is applied by
    /// calling this again with the same record and date.
    pub fn evaluate(
        &self,
        data: &ExtractedData,
        droppiness: Option<f64>,
        as_of: NaiveDate,
    ) -> ShortCheckResult {
        let input = NormalizedInput::from_extracted(data);
        let droppiness = droppiness.and_then(sanitize_droppiness);
        let keywords = &self.config.keywords;
        let calibration = &self.config.calibration;

        let statuses = status::resolve_statuses(&input, keywords);
        let ctx = FactorContext {
            input: &input,
            statuses: &statuses,
            keywords,
            calibration,
            as_of,
            droppiness,
        };
        let breakdown = ScoreBreakdown::from_context(&ctx);

        let walk_away_reasons =
            walk_away::evaluate_walk_away(&input, keywords, calibration, as_of);
        let walk_away_flags: Vec<String> =
            walk_away_reasons.iter().map(WalkAwayReason::message).collect();

        let total_score = breakdown.total();
        let max_possible_score = aggregate::max_possible_score(
            calibration,
            input.positive_cash_flow(),
            droppiness.is_some(),
        );
        let rating = aggregate::rating(total_score, max_possible_score);
        let category = aggregate::categorize(rating, &walk_away_reasons);

        let mut mechanisms = statuses.mechanisms.clone();
        if let Some(headline) = &input.news_headline {
            mechanisms.extend(keywords.detect_mechanisms(headline));
        }
        let alert_chips = presentation::alert_chips(&input, &mechanisms);
        let synopsis = presentation::synopsis(&input, &mechanisms);
        let alert_card =
            presentation::alert_card(&input, rating, category, &walk_away_flags, &breakdown);

        debug!(
            ticker = input.ticker.as_deref().unwrap_or("-"),
            total_score,
            max_possible_score,
            rating,
            category = category.label(),
            walk_away = walk_away_flags.len(),
            "short check evaluated"
        );

        ShortCheckResult {
            rating,
            category,
            category_label: category.label(),
            total_score,
            max_possible_score,
            walk_away_flags,
            walk_away_reasons,
            alert_chips,
            breakdown,
            statuses,
            synopsis,
            alert_card,
        }
    }
}

fn sanitize_droppiness(score: f64) -> Option<f64> {
    if !score.is_finite() {
        warn!(value = score, "ignoring non-finite droppiness score");
        return None;
    }
    let clamped = score.clamp(0.0, 100.0);
    if clamped != score {
        warn!(value = score, "clamping droppiness into 0-100");
    }
    Some(clamped)
}
