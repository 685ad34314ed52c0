use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::scoring::{
    ExtractedData, ProviderTag, ScoreBreakdown, ShortCheckEngine, ShortCheckResult, StatusTag,
};

pub(super) fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 16).expect("valid date")
}

pub(super) fn days_before_as_of(days: i64) -> NaiveDate {
    as_of() - chrono::Duration::days(days)
}

pub(super) fn engine() -> ShortCheckEngine {
    ShortCheckEngine::default()
}

pub(super) fn evaluate(data: &ExtractedData) -> ShortCheckResult {
    engine().evaluate(data, None, as_of())
}

pub(super) fn breakdown(data: &ExtractedData) -> ScoreBreakdown {
    evaluate(data).breakdown
}

pub(super) fn provider(tag: ProviderTag) -> Option<StatusTag> {
    Some(StatusTag::provider(tag))
}

pub(super) fn free_text(text: &str) -> Option<StatusTag> {
    Some(StatusTag::free_text(text))
}

/// Cash-starved microcap with an active dilution tool.
pub(super) fn scenario_a() -> ExtractedData {
    ExtractedData {
        ticker: Some("ABCD".to_string()),
        cash_runway: Some(2.0),
        quarterly_burn_rate: Some(-2_000_000.0),
        offering_ability: Some(StatusTag::from_raw("DT:Red")),
        institutional_ownership: Some(5.0),
        short_interest: Some(2.0),
        float: Some(400_000.0),
        market_cap: Some(30_000_000.0),
        ..ExtractedData::default()
    }
}

/// Cash-generating company held mostly by institutions.
pub(super) fn scenario_b() -> ExtractedData {
    ExtractedData {
        quarterly_burn_rate: Some(500_000.0),
        institutional_ownership: Some(80.0),
        ..ExtractedData::default()
    }
}

/// Scenario A with every remaining factor pushed toward a short, except for
/// institutional ownership above the walk-away ceiling.
pub(super) fn loaded_but_institutional() -> ExtractedData {
    ExtractedData {
        overhead_supply: provider(ProviderTag::Red),
        historical_dilution: provider(ProviderTag::Red),
        price_spike_pct: Some(30.0),
        debt: Some(3_000_000.0),
        cash_on_hand: Some(1_000_000.0),
        institutional_ownership: Some(80.0),
        ..scenario_a()
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
