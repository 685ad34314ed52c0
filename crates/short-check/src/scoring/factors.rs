//! One pure scorer per risk factor.
//!
//! Each scorer reads the normalized input and the resolved statuses and returns
//! a contribution inside the range reported by [`ScoreFactor::range`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::config::CalibrationConfig;
use super::domain::{ProviderTag, Severity};
use super::keywords::{KeywordTables, MatchText};
use super::normalizer::NormalizedInput;
use super::status::{historical_growth_pct, ResolvedStatuses, StatusSource, MICROCAP_LIMIT};

/// The twelve factors that make up a score breakdown, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    CashNeed,
    CashRunway,
    OfferingAbility,
    HistoricalDilution,
    InstitutionalOwnership,
    ShortInterest,
    NewsCatalyst,
    Float,
    OverallRisk,
    PriceSpike,
    DebtToCash,
    Droppiness,
}

impl ScoreFactor {
    pub const ALL: [ScoreFactor; 12] = [
        Self::CashNeed,
        Self::CashRunway,
        Self::OfferingAbility,
        Self::HistoricalDilution,
        Self::InstitutionalOwnership,
        Self::ShortInterest,
        Self::NewsCatalyst,
        Self::Float,
        Self::OverallRisk,
        Self::PriceSpike,
        Self::DebtToCash,
        Self::Droppiness,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::CashNeed => "Cash Need",
            Self::CashRunway => "Cash Runway",
            Self::OfferingAbility => "Offering Ability",
            Self::HistoricalDilution => "Historical Dilution",
            Self::InstitutionalOwnership => "Institutional Ownership",
            Self::ShortInterest => "Short Interest",
            Self::NewsCatalyst => "News Catalyst",
            Self::Float => "Float",
            Self::OverallRisk => "Overall Risk",
            Self::PriceSpike => "Price Spike",
            Self::DebtToCash => "Debt/Cash Ratio",
            Self::Droppiness => "Droppiness",
        }
    }

    /// Inclusive bounds of the factor's contribution.
    pub const fn range(self) -> (i32, i32) {
        match self {
            Self::CashNeed => (0, 25),
            Self::CashRunway => (-10, 15),
            Self::OfferingAbility => (-30, 25),
            Self::HistoricalDilution => (0, 10),
            Self::InstitutionalOwnership => (-5, 5),
            Self::ShortInterest => (-5, 15),
            Self::NewsCatalyst => (0, 15),
            Self::Float => (-10, 10),
            Self::OverallRisk => (0, 10),
            Self::PriceSpike => (0, 10),
            Self::DebtToCash => (0, 10),
            Self::Droppiness => (-8, 12),
        }
    }
}

/// Everything a scorer may read. Built once per evaluation.
pub struct FactorContext<'a> {
    pub input: &'a NormalizedInput,
    pub statuses: &'a ResolvedStatuses,
    pub keywords: &'a KeywordTables,
    pub calibration: &'a CalibrationConfig,
    pub as_of: NaiveDate,
    pub droppiness: Option<f64>,
}

/// Scores the resolved status; a record with no cash-need signal scores 0.
pub fn cash_need(ctx: &FactorContext<'_>) -> i32 {
    let status = &ctx.statuses.cash_need;
    match (status.source, status.severity) {
        (StatusSource::Default, _) => 0,
        (_, Severity::Red) => 25,
        (_, Severity::Yellow) => 18,
        (_, Severity::Green) => 5,
    }
}

pub fn cash_runway(ctx: &FactorContext<'_>) -> i32 {
    // A provider-tagged low cash need already discounts the runway; keep it positive.
    let need = &ctx.statuses.cash_need;
    if need.is_provider() && need.severity == Severity::Green {
        return match ctx.input.runway_months {
            Some(months) if months < 6.0 && !ctx.input.positive_cash_flow() => 15,
            _ => 10,
        };
    }

    if ctx.input.positive_cash_flow() {
        return -10;
    }

    match ctx.input.runway_months {
        Some(months) if months < 6.0 => 15,
        Some(months) if months < 12.0 => 10,
        Some(months) if months < 18.0 => 3,
        Some(months) if months < 24.0 => 1,
        Some(_) => -10,
        None => 0,
    }
}

pub fn offering_ability(ctx: &FactorContext<'_>) -> i32 {
    let offering = &ctx.statuses.offering_ability;
    if offering.provider_tag == Some(ProviderTag::Medium) {
        return 10;
    }

    match (offering.severity, ctx.statuses.overhead_supply.severity) {
        (Severity::Red, Severity::Red) => 25,
        (Severity::Red, Severity::Yellow) => 22,
        (Severity::Red, Severity::Green) => 18,
        (Severity::Yellow, Severity::Red) => 21,
        (Severity::Yellow, Severity::Yellow) => 15,
        (Severity::Yellow, Severity::Green) => 10,
        (Severity::Green, Severity::Red) => -5,
        (Severity::Green, Severity::Yellow) => -20,
        (Severity::Green, Severity::Green) => -30,
    }
}

pub fn historical_dilution(ctx: &FactorContext<'_>) -> i32 {
    match ctx.statuses.historical_dilution.severity {
        Severity::Red => 10,
        Severity::Yellow => 7,
        Severity::Green => 3,
    }
}

pub fn institutional_ownership(ctx: &FactorContext<'_>) -> i32 {
    match ctx.input.institutional_ownership {
        None => {
            let likely_microcap = ctx.input.market_cap.map_or(true, |cap| cap < MICROCAP_LIMIT);
            if likely_microcap {
                5
            } else {
                3
            }
        }
        Some(pct) if pct < 10.0 => 5,
        Some(pct) if pct < 25.0 => 4,
        Some(pct) if pct < 50.0 => 0,
        Some(_) => -5,
    }
}

pub fn short_interest(ctx: &FactorContext<'_>) -> i32 {
    match ctx.input.short_interest {
        None => 8,
        Some(pct) if pct < 3.0 => 15,
        Some(pct) if pct < 7.0 => 12,
        Some(pct) if pct < 10.0 => 10,
        Some(pct) if pct < 15.0 => 8,
        Some(pct) if pct < 20.0 => 6,
        Some(pct) if pct < 25.0 => 3,
        Some(pct) if pct < 30.0 => 0,
        Some(_) => -5,
    }
}

/// How a headline reads to a short seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsClass {
    Absent,
    RecentBullish,
    Dilution,
    Neutral,
    Mechanical,
    Speculative,
    Unclassified,
}

pub(crate) fn classify_news(
    input: &NormalizedInput,
    keywords: &KeywordTables,
    calibration: &CalibrationConfig,
    as_of: NaiveDate,
) -> NewsClass {
    let Some(headline) = input.news_headline.as_deref() else {
        return NewsClass::Absent;
    };
    if headline.eq_ignore_ascii_case("none") {
        return NewsClass::Absent;
    }

    let text = MatchText::new(headline);
    let news = &keywords.news;
    let recent = input
        .news_date
        .is_some_and(|date| (as_of - date).num_days() <= calibration.news_recency_days);

    if recent && text.contains_any(&news.bullish) {
        NewsClass::RecentBullish
    } else if text.contains_any(&news.dilution) {
        NewsClass::Dilution
    } else if text.contains_any(&news.neutral) {
        NewsClass::Neutral
    } else if text.contains_any(&news.mechanical) {
        NewsClass::Mechanical
    } else if text.contains_any(&news.speculative) {
        NewsClass::Speculative
    } else {
        NewsClass::Unclassified
    }
}

pub fn news_catalyst(ctx: &FactorContext<'_>) -> i32 {
    match classify_news(ctx.input, ctx.keywords, ctx.calibration, ctx.as_of) {
        NewsClass::RecentBullish => 0,
        NewsClass::Dilution | NewsClass::Speculative => 10,
        NewsClass::Neutral => 5,
        NewsClass::Absent | NewsClass::Mechanical | NewsClass::Unclassified => 15,
    }
}

pub fn float(ctx: &FactorContext<'_>) -> i32 {
    let green_offering = ctx.statuses.offering_ability.severity == Severity::Green;
    match ctx.input.float {
        None => 0,
        Some(shares) if shares < 500_000.0 => {
            if green_offering {
                -10
            } else {
                10
            }
        }
        Some(shares) if shares < 1_000_000.0 => {
            if green_offering {
                -5
            } else {
                9
            }
        }
        Some(shares) if shares < 2_000_000.0 => 8,
        Some(shares) if shares < 5_000_000.0 => 6,
        Some(shares) if shares < 10_000_000.0 => 4,
        Some(shares) if shares < 20_000_000.0 => 2,
        Some(_) => 0,
    }
}

pub fn overall_risk(ctx: &FactorContext<'_>) -> i32 {
    let status = &ctx.statuses.overall_risk;
    if status.is_stated() {
        return match status.severity {
            Severity::Red => 10,
            Severity::Yellow => 5,
            Severity::Green => 3,
        };
    }

    match ctx.statuses.risk_indicators {
        count if count >= 5 => 10,
        count if count >= 3 => 7,
        count if count >= 2 => 5,
        _ => 3,
    }
}

pub fn price_spike(ctx: &FactorContext<'_>) -> i32 {
    match (ctx.input.price_spike_pct, ctx.input.price_spike) {
        (Some(pct), _) if pct >= 20.0 => 10,
        (Some(_), _) => 0,
        (None, Some(true)) => 5,
        (None, _) => 0,
    }
}

pub fn debt_to_cash(ctx: &FactorContext<'_>) -> i32 {
    if ctx.input.debt_observed == Some(false) {
        return 0;
    }

    match ctx.input.debt_to_cash() {
        Some(ratio) if ratio > 2.0 => 10,
        Some(ratio) if ratio > 1.0 => 7,
        Some(_) => 4,
        None => 0,
    }
}

pub fn droppiness(ctx: &FactorContext<'_>) -> i32 {
    match ctx.droppiness {
        None => 0,
        Some(score) if score >= 70.0 => 12,
        Some(score) if score >= 50.0 => 5,
        Some(score) if score >= 40.0 => 0,
        Some(_) => -8,
    }
}

pub fn score_factor(factor: ScoreFactor, ctx: &FactorContext<'_>) -> i32 {
    match factor {
        ScoreFactor::CashNeed => cash_need(ctx),
        ScoreFactor::CashRunway => cash_runway(ctx),
        ScoreFactor::OfferingAbility => offering_ability(ctx),
        ScoreFactor::HistoricalDilution => historical_dilution(ctx),
        ScoreFactor::InstitutionalOwnership => institutional_ownership(ctx),
        ScoreFactor::ShortInterest => short_interest(ctx),
        ScoreFactor::NewsCatalyst => news_catalyst(ctx),
        ScoreFactor::Float => float(ctx),
        ScoreFactor::OverallRisk => overall_risk(ctx),
        ScoreFactor::PriceSpike => price_spike(ctx),
        ScoreFactor::DebtToCash => debt_to_cash(ctx),
        ScoreFactor::Droppiness => droppiness(ctx),
    }
}

/// Human-readable input behind each factor, for display only.
pub fn actual_values(ctx: &FactorContext<'_>) -> BTreeMap<ScoreFactor, String> {
    let input = ctx.input;
    let statuses = ctx.statuses;
    let mut values = BTreeMap::new();

    if let Some(months) = input.runway_months {
        values.insert(ScoreFactor::CashRunway, format!("{months:.1} months"));
    } else if input.positive_cash_flow() {
        values.insert(ScoreFactor::CashRunway, "positive cash flow".to_string());
    }
    values.insert(ScoreFactor::CashNeed, status_label(&statuses.cash_need));
    values.insert(
        ScoreFactor::OfferingAbility,
        format!(
            "offering {} / overhead {}",
            status_label(&statuses.offering_ability),
            status_label(&statuses.overhead_supply)
        ),
    );
    values.insert(
        ScoreFactor::HistoricalDilution,
        match historical_growth_pct(input) {
            Some(growth) if statuses.historical_dilution.source == StatusSource::Derived => {
                format!("{growth:.0}% share growth over 3 years")
            }
            _ => status_label(&statuses.historical_dilution),
        },
    );
    if let Some(pct) = input.institutional_ownership {
        values.insert(ScoreFactor::InstitutionalOwnership, format!("{pct:.1}%"));
    }
    if let Some(pct) = input.short_interest {
        values.insert(ScoreFactor::ShortInterest, format!("{pct:.1}%"));
    }
    if let Some(headline) = &input.news_headline {
        values.insert(ScoreFactor::NewsCatalyst, headline.clone());
    }
    if let Some(shares) = input.float {
        values.insert(ScoreFactor::Float, format_shares(shares));
    }
    values.insert(
        ScoreFactor::OverallRisk,
        if statuses.overall_risk.is_stated() {
            status_label(&statuses.overall_risk)
        } else {
            format!("{} risk indicator(s)", statuses.risk_indicators)
        },
    );
    match (input.price_spike_pct, input.price_spike) {
        (Some(pct), _) => {
            values.insert(ScoreFactor::PriceSpike, format!("{pct:.1}%"));
        }
        (None, Some(spike)) => {
            values.insert(
                ScoreFactor::PriceSpike,
                if spike { "spike" } else { "no spike" }.to_string(),
            );
        }
        (None, None) => {}
    }
    if input.debt_observed == Some(false) {
        values.insert(ScoreFactor::DebtToCash, "debt not observed".to_string());
    } else if let Some(ratio) = input.debt_to_cash() {
        values.insert(ScoreFactor::DebtToCash, format!("{ratio:.2}x"));
    }
    if let Some(score) = ctx.droppiness {
        values.insert(ScoreFactor::Droppiness, format!("{score:.0}/100"));
    }

    values
}

fn status_label(status: &super::status::ResolvedStatus) -> String {
    match status.provider_tag {
        Some(tag) => format!("{tag:?} (provider)"),
        None => status.severity.label().to_string(),
    }
}

pub(crate) fn format_shares(shares: f64) -> String {
    format!("{:.2}M", shares / 1_000_000.0)
}
