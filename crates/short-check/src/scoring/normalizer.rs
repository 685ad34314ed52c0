use super::domain::{ExtractedData, StatusTag};
use tracing::warn;

const MILLIONS_SHORTHAND_LIMIT: f64 = 1_000.0;
const ONE_MILLION: f64 = 1_000_000.0;

/// Converts "millions" shorthand into raw units. Values whose magnitude is
/// below 1,000 are read as millions; anything larger is already raw.
pub fn normalize_units(value: f64) -> f64 {
    if value.abs() < MILLIONS_SHORTHAND_LIMIT {
        value * ONE_MILLION
    } else {
        value
    }
}

/// Months of runway implied by cash on hand and a negative quarterly burn.
/// Returns `None` for non-negative burn (positive cash flow).
pub fn derive_runway_months(cash_on_hand: f64, quarterly_burn: f64) -> Option<f64> {
    if quarterly_burn >= 0.0 {
        return None;
    }
    let monthly_burn = quarterly_burn.abs() / 3.0;
    Some(cash_on_hand / monthly_burn)
}

/// Input record after unit normalization and range clamping. Every scorer and
/// the walk-away evaluator read from this view, never from the raw record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedInput {
    pub ticker: Option<String>,
    pub cash_on_hand: Option<f64>,
    pub quarterly_burn_rate: Option<f64>,
    pub runway_months: Option<f64>,
    pub runway_derived: bool,
    pub outstanding_shares: Option<f64>,
    pub outstanding_shares_3y_ago: Option<f64>,
    pub float: Option<f64>,
    pub market_cap: Option<f64>,
    pub debt: Option<f64>,
    pub debt_observed: Option<bool>,
    pub offering_ability: Option<StatusTag>,
    pub overhead_supply: Option<StatusTag>,
    pub cash_need: Option<StatusTag>,
    pub historical_dilution: Option<StatusTag>,
    pub overall_risk: Option<StatusTag>,
    pub institutional_ownership: Option<f64>,
    pub short_interest: Option<f64>,
    pub price_spike: Option<bool>,
    pub price_spike_pct: Option<f64>,
    pub news_headline: Option<String>,
    pub news_date: Option<chrono::NaiveDate>,
}

impl NormalizedInput {
    pub fn from_extracted(data: &ExtractedData) -> Self {
        let cash_on_hand = count("cash_on_hand", data.cash_on_hand);
        let quarterly_burn_rate = finite("quarterly_burn_rate", data.quarterly_burn_rate)
            .map(normalize_units);

        let explicit_runway = non_negative("cash_runway", data.cash_runway);
        let derived_runway = match (cash_on_hand, quarterly_burn_rate) {
            (Some(cash), Some(burn)) => derive_runway_months(cash, burn),
            _ => None,
        };
        let runway_derived = explicit_runway.is_none() && derived_runway.is_some();

        Self {
            ticker: data
                .ticker
                .as_deref()
                .map(str::trim)
                .filter(|ticker| !ticker.is_empty())
                .map(str::to_ascii_uppercase),
            cash_on_hand,
            quarterly_burn_rate,
            runway_months: explicit_runway.or(derived_runway),
            runway_derived,
            outstanding_shares: count("outstanding_shares", data.outstanding_shares),
            outstanding_shares_3y_ago: count(
                "outstanding_shares_3y_ago",
                data.outstanding_shares_3y_ago,
            ),
            float: count("float", data.float),
            market_cap: count("market_cap", data.market_cap),
            debt: count("debt", data.debt),
            debt_observed: data.debt_observed,
            offering_ability: data.offering_ability.clone(),
            overhead_supply: data.overhead_supply.clone(),
            cash_need: data.cash_need.clone(),
            historical_dilution: data.historical_dilution.clone(),
            overall_risk: data.overall_risk.clone(),
            institutional_ownership: percentage(
                "institutional_ownership",
                data.institutional_ownership,
            ),
            short_interest: percentage("short_interest", data.short_interest),
            price_spike: data.price_spike,
            price_spike_pct: finite("price_spike_pct", data.price_spike_pct),
            news_headline: data
                .news_headline
                .as_deref()
                .map(str::trim)
                .filter(|headline| !headline.is_empty())
                .map(str::to_string),
            news_date: data.news_date,
        }
    }

    /// Non-negative burn means the company is not consuming cash.
    pub fn positive_cash_flow(&self) -> bool {
        self.quarterly_burn_rate.is_some_and(|burn| burn >= 0.0)
    }

    /// Outstanding shares divided by float, when both are known and float is non-zero.
    pub fn dilution_ratio(&self) -> Option<f64> {
        match (self.outstanding_shares, self.float) {
            (Some(outstanding), Some(float)) if float > 0.0 => Some(outstanding / float),
            _ => None,
        }
    }

    pub fn debt_to_cash(&self) -> Option<f64> {
        match (self.debt, self.cash_on_hand) {
            (Some(debt), Some(cash)) if debt > 0.0 && cash > 0.0 => Some(debt / cash),
            _ => None,
        }
    }
}

fn finite(field: &'static str, value: Option<f64>) -> Option<f64> {
    match value {
        Some(raw) if !raw.is_finite() => {
            warn!(field, "dropping non-finite input value");
            None
        }
        other => other,
    }
}

fn non_negative(field: &'static str, value: Option<f64>) -> Option<f64> {
    finite(field, value).map(|raw| {
        if raw < 0.0 {
            warn!(field, value = raw, "clamping negative input to zero");
            0.0
        } else {
            raw
        }
    })
}

fn count(field: &'static str, value: Option<f64>) -> Option<f64> {
    non_negative(field, value).map(normalize_units)
}

fn percentage(field: &'static str, value: Option<f64>) -> Option<f64> {
    finite(field, value).map(|raw| {
        let clamped = raw.clamp(0.0, 100.0);
        if clamped != raw {
            warn!(field, value = raw, "clamping percentage into 0-100");
        }
        clamped
    })
}
