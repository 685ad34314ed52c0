use chrono::NaiveDate;
use serde::Serialize;

use super::config::CalibrationConfig;
use super::domain::{Severity, StatusTag};
use super::factors::{classify_news, NewsClass};
use super::keywords::KeywordTables;
use super::normalizer::NormalizedInput;
use super::status::MICROCAP_LIMIT;

const LONG_RUNWAY_MONTHS: f64 = 24.0;
const INSTITUTIONAL_CEILING: f64 = 75.0;
const SMALL_CAP_FLOOR: f64 = 70_000_000.0;
const ADEQUATE_RUNWAY_MONTHS: f64 = 6.0;
const URGENT_RUNWAY_MONTHS: f64 = 4.0;

/// Hard disqualifier found in the raw input.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum WalkAwayReason {
    LongRunway { months: f64 },
    PositiveCashFlow,
    InstitutionalOwnership { pct: f64 },
    RecentBullishNews { headline: String },
    LargeMarketCap { market_cap: f64 },
    MidMarketCapWithoutUrgency { market_cap: f64 },
    NoOfferingPressure,
}

impl WalkAwayReason {
    /// Runway flags are already priced in by the cash-runway penalty, so they
    /// never force the category.
    pub fn forces_no_trade(&self) -> bool {
        !matches!(self, Self::LongRunway { .. } | Self::PositiveCashFlow)
    }

    pub fn message(&self) -> String {
        match self {
            Self::LongRunway { months } => {
                format!("Cash runway of {months:.1} months is 24 months or longer")
            }
            Self::PositiveCashFlow => "Company has positive cash flow".to_string(),
            Self::InstitutionalOwnership { pct } => {
                format!("Institutional ownership {pct:.1}% exceeds 75%")
            }
            Self::RecentBullishNews { headline } => {
                format!("Recent bullish news catalyst: {headline}")
            }
            Self::LargeMarketCap { market_cap } => format!(
                "Market cap ${:.1}M exceeds $100M with adequate runway",
                market_cap / 1_000_000.0
            ),
            Self::MidMarketCapWithoutUrgency { market_cap } => format!(
                "Market cap ${:.1}M is between $70M and $100M without a runway of 4 months or less",
                market_cap / 1_000_000.0
            ),
            Self::NoOfferingPressure => {
                "Offering ability and overhead supply are both tagged Green".to_string()
            }
        }
    }
}

pub fn evaluate_walk_away(
    input: &NormalizedInput,
    keywords: &KeywordTables,
    calibration: &CalibrationConfig,
    as_of: NaiveDate,
) -> Vec<WalkAwayReason> {
    let mut reasons = Vec::new();

    if let Some(months) = input.runway_months {
        if months >= LONG_RUNWAY_MONTHS {
            reasons.push(WalkAwayReason::LongRunway { months });
        }
    }

    if input.positive_cash_flow() {
        reasons.push(WalkAwayReason::PositiveCashFlow);
    }

    if let Some(pct) = input.institutional_ownership {
        if pct >= INSTITUTIONAL_CEILING {
            reasons.push(WalkAwayReason::InstitutionalOwnership { pct });
        }
    }

    if classify_news(input, keywords, calibration, as_of) == NewsClass::RecentBullish {
        reasons.push(WalkAwayReason::RecentBullishNews {
            headline: input.news_headline.clone().unwrap_or_default(),
        });
    }

    if let Some(market_cap) = input.market_cap {
        let runway = input.runway_months.filter(|_| !input.positive_cash_flow());
        if market_cap > MICROCAP_LIMIT {
            if runway.map_or(true, |months| months >= ADEQUATE_RUNWAY_MONTHS) {
                reasons.push(WalkAwayReason::LargeMarketCap { market_cap });
            }
        } else if market_cap >= SMALL_CAP_FLOOR
            && runway.map_or(true, |months| months > URGENT_RUNWAY_MONTHS)
        {
            reasons.push(WalkAwayReason::MidMarketCapWithoutUrgency { market_cap });
        }
    }

    let provider_green = |tag: Option<&StatusTag>| {
        tag.and_then(|tag| tag.provider_tag())
            .is_some_and(|tag| tag.severity() == Severity::Green)
    };
    if provider_green(input.offering_ability.as_ref())
        && provider_green(input.overhead_supply.as_ref())
    {
        reasons.push(WalkAwayReason::NoOfferingPressure);
    }

    reasons
}
