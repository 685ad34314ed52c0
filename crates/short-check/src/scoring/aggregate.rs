use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::config::CalibrationConfig;
use super::factors::{actual_values, score_factor, FactorContext, ScoreFactor};
use super::walk_away::WalkAwayReason;

/// One contribution per factor plus the display values they were scored from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub cash_need: i32,
    pub cash_runway: i32,
    pub offering_ability: i32,
    pub historical_dilution: i32,
    pub institutional_ownership: i32,
    pub short_interest: i32,
    pub news_catalyst: i32,
    pub float: i32,
    pub overall_risk: i32,
    pub price_spike: i32,
    pub debt_to_cash: i32,
    pub droppiness: i32,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub actual_values: BTreeMap<ScoreFactor, String>,
}

impl ScoreBreakdown {
    pub(crate) fn from_context(ctx: &FactorContext<'_>) -> Self {
        let mut breakdown = Self {
            actual_values: actual_values(ctx),
            ..Self::default()
        };
        for factor in ScoreFactor::ALL {
            *breakdown.slot_mut(factor) = score_factor(factor, ctx);
        }
        breakdown
    }

    pub fn get(&self, factor: ScoreFactor) -> i32 {
        match factor {
            ScoreFactor::CashNeed => self.cash_need,
            ScoreFactor::CashRunway => self.cash_runway,
            ScoreFactor::OfferingAbility => self.offering_ability,
            ScoreFactor::HistoricalDilution => self.historical_dilution,
            ScoreFactor::InstitutionalOwnership => self.institutional_ownership,
            ScoreFactor::ShortInterest => self.short_interest,
            ScoreFactor::NewsCatalyst => self.news_catalyst,
            ScoreFactor::Float => self.float,
            ScoreFactor::OverallRisk => self.overall_risk,
            ScoreFactor::PriceSpike => self.price_spike,
            ScoreFactor::DebtToCash => self.debt_to_cash,
            ScoreFactor::Droppiness => self.droppiness,
        }
    }

    fn slot_mut(&mut self, factor: ScoreFactor) -> &mut i32 {
        match factor {
            ScoreFactor::CashNeed => &mut self.cash_need,
            ScoreFactor::CashRunway => &mut self.cash_runway,
            ScoreFactor::OfferingAbility => &mut self.offering_ability,
            ScoreFactor::HistoricalDilution => &mut self.historical_dilution,
            ScoreFactor::InstitutionalOwnership => &mut self.institutional_ownership,
            ScoreFactor::ShortInterest => &mut self.short_interest,
            ScoreFactor::NewsCatalyst => &mut self.news_catalyst,
            ScoreFactor::Float => &mut self.float,
            ScoreFactor::OverallRisk => &mut self.overall_risk,
            ScoreFactor::PriceSpike => &mut self.price_spike,
            ScoreFactor::DebtToCash => &mut self.debt_to_cash,
            ScoreFactor::Droppiness => &mut self.droppiness,
        }
    }

    pub fn contributions(&self) -> impl Iterator<Item = (ScoreFactor, i32)> + '_ {
        ScoreFactor::ALL
            .into_iter()
            .map(move |factor| (factor, self.get(factor)))
    }

    pub fn total(&self) -> i32 {
        self.contributions().map(|(_, score)| score).sum()
    }

    /// Factors ordered by absolute contribution, ties kept in display order.
    pub fn top_factors(&self, limit: usize) -> Vec<(ScoreFactor, i32)> {
        let mut ranked: Vec<_> = self.contributions().collect();
        ranked.sort_by_key(|(_, score)| std::cmp::Reverse(score.abs()));
        ranked.truncate(limit);
        ranked
    }
}

/// Ordered verdict tiers, best short candidate first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    HighPriority,
    Moderate,
    Speculative,
    NoTrade,
}

impl Category {
    pub fn from_rating(rating: f64) -> Self {
        if rating >= 70.0 {
            Self::HighPriority
        } else if rating >= 40.0 {
            Self::Moderate
        } else if rating >= 20.0 {
            Self::Speculative
        } else {
            Self::NoTrade
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::HighPriority => "High-Priority",
            Self::Moderate => "Moderate",
            Self::Speculative => "Speculative",
            Self::NoTrade => "No-Trade",
        }
    }
}

/// Highest total the breakdown can reach for this input.
pub fn max_possible_score(
    calibration: &CalibrationConfig,
    positive_cash_flow: bool,
    has_droppiness: bool,
) -> f64 {
    let base = if positive_cash_flow {
        calibration.positive_cash_flow_max_score
    } else {
        calibration.base_max_score
    };
    if has_droppiness {
        base + calibration.droppiness_bonus
    } else {
        base
    }
}

/// Percentage of the achievable maximum, one decimal, not floored at zero.
pub fn rating(total_score: i32, max_possible_score: f64) -> f64 {
    if max_possible_score <= 0.0 {
        return 0.0;
    }
    let raw = f64::from(total_score) / max_possible_score * 100.0;
    (raw * 10.0).round() / 10.0
}

pub fn categorize(rating: f64, walk_away: &[WalkAwayReason]) -> Category {
    if walk_away.iter().any(WalkAwayReason::forces_no_trade) {
        Category::NoTrade
    } else {
        Category::from_rating(rating)
    }
}
