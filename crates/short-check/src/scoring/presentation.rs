use std::collections::BTreeSet;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::aggregate::{Category, ScoreBreakdown};
use super::factors::format_shares;
use super::keywords::DilutionMechanism;
use super::normalizer::NormalizedInput;

const CASH_RAISE_RUNWAY_MONTHS: f64 = 2.0;
const CASH_RAISE_BURN: f64 = 1_000_000.0;
const LOW_FLOAT_SHARES: f64 = 3_000_000.0;
const MAX_DILUTION_TOOL_COUNT: usize = 3;
const ALERT_CARD_TOP_FACTORS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChipSeverity {
    Red,
    Orange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertChip {
    pub label: String,
    pub severity: ChipSeverity,
}

impl AlertChip {
    fn new(label: &str, severity: ChipSeverity) -> Self {
        Self {
            label: label.to_string(),
            severity,
        }
    }
}

pub fn alert_chips(
    input: &NormalizedInput,
    mechanisms: &BTreeSet<DilutionMechanism>,
) -> Vec<AlertChip> {
    let mut chips = Vec::new();

    let burning_hard = input
        .quarterly_burn_rate
        .is_some_and(|burn| burn < 0.0 && burn.abs() > CASH_RAISE_BURN);
    let runway_short = input
        .runway_months
        .is_some_and(|months| months <= CASH_RAISE_RUNWAY_MONTHS);
    if burning_hard && runway_short {
        chips.push(AlertChip::new("Cash Raise Likely", ChipSeverity::Red));
    }

    if input.float.is_some_and(|shares| shares < LOW_FLOAT_SHARES) {
        chips.push(AlertChip::new("Low Float Risk", ChipSeverity::Orange));
    }

    let atm_with_s1 =
        mechanisms.contains(&DilutionMechanism::Atm) && mechanisms.contains(&DilutionMechanism::S1);
    if mechanisms.len() >= MAX_DILUTION_TOOL_COUNT || atm_with_s1 {
        chips.push(AlertChip::new("Max Dilution Tools", ChipSeverity::Orange));
    }

    chips
}

/// One or two sentences covering whichever headline metrics are known.
pub fn synopsis(input: &NormalizedInput, mechanisms: &BTreeSet<DilutionMechanism>) -> String {
    let mut pressure = Vec::new();
    if let Some(months) = input.runway_months {
        pressure.push(format!("{months:.1} months of cash runway"));
    } else if input.positive_cash_flow() {
        pressure.push("positive cash flow".to_string());
    }
    if !mechanisms.is_empty() {
        let tools: Vec<_> = mechanisms.iter().map(|m| m.label()).collect();
        pressure.push(format!("dilution tools in place ({})", tools.join(", ")));
    }

    let mut structure = Vec::new();
    if let Some(shares) = input.float {
        structure.push(format!("float of {} shares", format_shares(shares)));
    }
    if let Some(pct) = input.institutional_ownership {
        structure.push(format!("{pct:.1}% institutional ownership"));
    }
    if let Some(pct) = input.short_interest {
        structure.push(format!("{pct:.1}% short interest"));
    }

    let subject = input.ticker.as_deref().unwrap_or("This company");
    let mut sentences = Vec::new();
    if !pressure.is_empty() {
        sentences.push(format!("{subject} has {}.", pressure.join(" and ")));
    }
    if !structure.is_empty() {
        let lead = if sentences.is_empty() {
            format!("{subject} shows")
        } else {
            "It shows".to_string()
        };
        sentences.push(format!("{lead} {}.", structure.join(", ")));
    }

    if sentences.is_empty() {
        "Not enough data for a risk synopsis.".to_string()
    } else {
        sentences.join(" ")
    }
}

pub fn alert_card(
    input: &NormalizedInput,
    rating: f64,
    category: Category,
    walk_away_flags: &[String],
    breakdown: &ScoreBreakdown,
) -> String {
    let mut card = String::new();
    let ticker = input.ticker.as_deref().unwrap_or("UNKNOWN");

    let _ = writeln!(card, "SHORT CHECK: {ticker}");
    let _ = writeln!(card, "Rating: {rating:.1}% ({})", category.label());

    let mut metrics = Vec::new();
    if let Some(months) = input.runway_months {
        metrics.push(format!("Runway {months:.1} mo"));
    }
    if let Some(burn) = input.quarterly_burn_rate {
        metrics.push(format!("Quarterly burn ${:.2}M", burn / 1_000_000.0));
    }
    if let Some(shares) = input.float {
        metrics.push(format!("Float {}", format_shares(shares)));
    }
    if let Some(pct) = input.institutional_ownership {
        metrics.push(format!("Inst {pct:.1}%"));
    }
    if let Some(pct) = input.short_interest {
        metrics.push(format!("SI {pct:.1}%"));
    }
    if let Some(cap) = input.market_cap {
        metrics.push(format!("Mkt cap ${:.1}M", cap / 1_000_000.0));
    }
    if metrics.is_empty() {
        let _ = writeln!(card, "Key metrics: none available");
    } else {
        let _ = writeln!(card, "Key metrics: {}", metrics.join(" | "));
    }

    if walk_away_flags.is_empty() {
        let _ = writeln!(card, "Walk-away flags: none");
    } else {
        let _ = writeln!(card, "Walk-away flags:");
        for flag in walk_away_flags {
            let _ = writeln!(card, "  - {flag}");
        }
    }

    let _ = writeln!(card, "Top factors:");
    for (rank, (factor, score)) in breakdown
        .top_factors(ALERT_CARD_TOP_FACTORS)
        .into_iter()
        .enumerate()
    {
        let _ = writeln!(card, "  {}. {}: {score:+}", rank + 1, factor.label());
    }

    card
}
