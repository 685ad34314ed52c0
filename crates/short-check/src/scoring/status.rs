use std::collections::BTreeSet;

use serde::Serialize;

use super::domain::{ProviderTag, Severity, StatusTag};
use super::keywords::{DilutionMechanism, KeywordTables};
use super::normalizer::NormalizedInput;

pub(crate) const ACTIVE_DILUTION_RATIO: f64 = 1.5;
pub(crate) const ELEVATED_DILUTION_RATIO: f64 = 1.2;
pub(crate) const MICROCAP_LIMIT: f64 = 100_000_000.0;
const NANOCAP_LIMIT: f64 = 50_000_000.0;

/// Where a resolved severity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSource {
    Provider,
    /// Free text that is nothing but a severity word, e.g. OCR output "High".
    Label,
    Derived,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedStatus {
    pub severity: Severity,
    pub source: StatusSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_tag: Option<ProviderTag>,
}

impl ResolvedStatus {
    fn provider(tag: ProviderTag) -> Self {
        Self {
            severity: tag.severity(),
            source: StatusSource::Provider,
            provider_tag: Some(tag),
        }
    }

    fn label(severity: Severity) -> Self {
        Self {
            severity,
            source: StatusSource::Label,
            provider_tag: None,
        }
    }

    fn derived(severity: Severity) -> Self {
        Self {
            severity,
            source: StatusSource::Derived,
            provider_tag: None,
        }
    }

    fn fallback() -> Self {
        Self {
            severity: Severity::Green,
            source: StatusSource::Default,
            provider_tag: None,
        }
    }

    pub fn is_provider(&self) -> bool {
        self.source == StatusSource::Provider
    }

    /// Provider tags and bare severity labels are taken at face value.
    pub fn is_stated(&self) -> bool {
        matches!(self.source, StatusSource::Provider | StatusSource::Label)
    }
}

/// Severities for every categorical factor, resolved once per evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedStatuses {
    pub offering_ability: ResolvedStatus,
    pub overhead_supply: ResolvedStatus,
    pub cash_need: ResolvedStatus,
    pub historical_dilution: ResolvedStatus,
    pub overall_risk: ResolvedStatus,
    /// Mechanisms named in the offering-ability and overhead-supply text.
    pub mechanisms: BTreeSet<DilutionMechanism>,
    /// Weighted count of overall-risk indicators found in the raw numbers.
    pub risk_indicators: u32,
}

/// Provider tag first, then a bare severity label, then the factor heuristic,
/// then Green.
fn resolve_with(
    tag: Option<&StatusTag>,
    derive: impl FnOnce() -> Option<Severity>,
) -> ResolvedStatus {
    if let Some(provider) = tag.and_then(StatusTag::provider_tag) {
        return ResolvedStatus::provider(provider);
    }
    if let Some(severity) = severity_word(tag) {
        return ResolvedStatus::label(severity);
    }
    derive()
        .map(ResolvedStatus::derived)
        .unwrap_or_else(ResolvedStatus::fallback)
}

fn severity_word(tag: Option<&StatusTag>) -> Option<Severity> {
    tag.and_then(StatusTag::text)
        .and_then(ProviderTag::parse)
        .map(ProviderTag::severity)
}

pub fn resolve_statuses(input: &NormalizedInput, keywords: &KeywordTables) -> ResolvedStatuses {
    let offering_text = input.offering_ability.as_ref().and_then(StatusTag::text);
    let overhead_text = input.overhead_supply.as_ref().and_then(StatusTag::text);

    let offering_mechanisms = offering_text
        .map(|text| keywords.detect_mechanisms(text))
        .unwrap_or_default();
    let overhead_mechanisms = overhead_text
        .map(|text| keywords.detect_mechanisms(text))
        .unwrap_or_default();
    let ratio = input.dilution_ratio();

    let offering_ability = resolve_with(input.offering_ability.as_ref(), || {
        if offering_mechanisms.iter().any(|m| m.is_active())
            || ratio.is_some_and(|r| r >= ACTIVE_DILUTION_RATIO)
        {
            Some(Severity::Red)
        } else if !offering_mechanisms.is_empty() {
            Some(Severity::Yellow)
        } else {
            None
        }
    });

    let overhead_supply = resolve_with(input.overhead_supply.as_ref(), || match ratio {
        Some(r) if r >= ACTIVE_DILUTION_RATIO => Some(Severity::Red),
        Some(r) if r >= ELEVATED_DILUTION_RATIO => Some(Severity::Yellow),
        Some(_) => Some(Severity::Green),
        None => overhead_mechanisms
            .iter()
            .any(|m| matches!(m, DilutionMechanism::Warrants | DilutionMechanism::Convertible))
            .then_some(Severity::Yellow),
    });

    let cash_need = resolve_with(input.cash_need.as_ref(), || {
        if input.positive_cash_flow() {
            return Some(Severity::Green);
        }
        input.runway_months.map(|months| {
            if months < 6.0 {
                Severity::Red
            } else if months < 24.0 {
                Severity::Yellow
            } else {
                Severity::Green
            }
        })
    });

    let historical_dilution = resolve_with(input.historical_dilution.as_ref(), || {
        historical_growth_pct(input).map(|growth| {
            if growth > 100.0 {
                Severity::Red
            } else if growth >= 30.0 {
                Severity::Yellow
            } else {
                Severity::Green
            }
        })
    });

    let mut mechanisms = offering_mechanisms;
    mechanisms.extend(overhead_mechanisms);

    let risk_indicators = risk_indicator_count(input, &mechanisms);
    let overall_risk = resolve_with(input.overall_risk.as_ref(), || match risk_indicators {
        0 => None,
        count if count >= 5 => Some(Severity::Red),
        count if count >= 2 => Some(Severity::Yellow),
        _ => Some(Severity::Green),
    });

    ResolvedStatuses {
        offering_ability,
        overhead_supply,
        cash_need,
        historical_dilution,
        overall_risk,
        mechanisms,
        risk_indicators,
    }
}

/// Three-year growth of outstanding shares, in percent.
pub fn historical_growth_pct(input: &NormalizedInput) -> Option<f64> {
    match (input.outstanding_shares, input.outstanding_shares_3y_ago) {
        (Some(current), Some(baseline)) if baseline > 0.0 => {
            Some((current - baseline) / baseline * 100.0)
        }
        _ => None,
    }
}

fn risk_indicator_count(input: &NormalizedInput, mechanisms: &BTreeSet<DilutionMechanism>) -> u32 {
    let mut count = 0;

    match input.runway_months {
        Some(months) if !input.positive_cash_flow() && months < 6.0 => count += 2,
        Some(months) if !input.positive_cash_flow() && months < 12.0 => count += 1,
        _ => {}
    }

    if mechanisms.iter().any(|m| m.is_active()) {
        count += 2;
    }

    match input.dilution_ratio() {
        Some(r) if r >= ACTIVE_DILUTION_RATIO => count += 2,
        Some(r) if r >= ELEVATED_DILUTION_RATIO => count += 1,
        _ => {}
    }

    match input.institutional_ownership {
        Some(pct) if pct < 5.0 => count += 2,
        Some(pct) if pct < 15.0 => count += 1,
        _ => {}
    }

    if input.debt_observed != Some(false) && input.debt_to_cash().is_some_and(|r| r > 1.0) {
        count += 1;
    }

    if input.market_cap.is_some_and(|cap| cap < NANOCAP_LIMIT) {
        count += 1;
    }

    count
}
