use super::common::*;
use crate::scoring::{Category, ExtractedData, ProviderTag, WalkAwayReason};

fn reasons(data: &ExtractedData) -> Vec<WalkAwayReason> {
    evaluate(data).walk_away_reasons
}

#[test]
fn clean_microcap_has_no_flags() {
    let result = evaluate(&scenario_a());

    assert!(result.walk_away_reasons.is_empty());
    assert!(result.walk_away_flags.is_empty());
}

#[test]
fn long_runway_is_flagged_without_forcing_no_trade() {
    let data = ExtractedData {
        cash_runway: Some(30.0),
        offering_ability: provider(ProviderTag::Red),
        overhead_supply: provider(ProviderTag::Red),
        float: Some(400_000.0),
        short_interest: Some(1.0),
        ..ExtractedData::default()
    };

    let result = evaluate(&data);

    assert_eq!(
        result.walk_away_reasons,
        vec![WalkAwayReason::LongRunway { months: 30.0 }]
    );
    assert!(!result.walk_away_reasons[0].forces_no_trade());
    assert_eq!(result.category, Category::from_rating(result.rating));
}

#[test]
fn positive_cash_flow_is_flagged_without_forcing_no_trade() {
    let flags = reasons(&ExtractedData {
        quarterly_burn_rate: Some(0.0),
        ..ExtractedData::default()
    });

    assert_eq!(flags, vec![WalkAwayReason::PositiveCashFlow]);
    assert!(!WalkAwayReason::PositiveCashFlow.forces_no_trade());
}

#[test]
fn institutional_ceiling_is_inclusive() {
    let at = |pct: f64| {
        reasons(&ExtractedData {
            institutional_ownership: Some(pct),
            ..ExtractedData::default()
        })
    };

    assert_eq!(
        at(75.0),
        vec![WalkAwayReason::InstitutionalOwnership { pct: 75.0 }]
    );
    assert!(at(74.9).is_empty());
    assert_eq!(
        at(80.0)[0].message(),
        "Institutional ownership 80.0% exceeds 75%"
    );
}

#[test]
fn recent_bullish_news_is_flagged() {
    let headline = "FDA grants approval for lead candidate";
    let fresh = reasons(&ExtractedData {
        news_headline: Some(headline.to_string()),
        news_date: Some(days_before_as_of(2)),
        ..ExtractedData::default()
    });
    assert_eq!(
        fresh,
        vec![WalkAwayReason::RecentBullishNews {
            headline: headline.to_string()
        }]
    );

    let stale = reasons(&ExtractedData {
        news_headline: Some(headline.to_string()),
        news_date: Some(days_before_as_of(30)),
        ..ExtractedData::default()
    });
    assert!(stale.is_empty());
}

#[test]
fn large_market_cap_needs_adequate_runway() {
    let at = |runway: Option<f64>, burn: Option<f64>| {
        reasons(&ExtractedData {
            market_cap: Some(150.0),
            cash_runway: runway,
            quarterly_burn_rate: burn,
            ..ExtractedData::default()
        })
    };

    let large = WalkAwayReason::LargeMarketCap {
        market_cap: 150_000_000.0,
    };
    assert_eq!(at(None, None), vec![large.clone()]);
    assert_eq!(at(Some(8.0), Some(-1.0)), vec![large.clone()]);
    assert!(at(Some(3.0), Some(-1.0)).is_empty());
    assert!(at(Some(3.0), Some(1.0)).contains(&large));
}

#[test]
fn mid_market_cap_without_urgency() {
    let at = |runway: Option<f64>| {
        reasons(&ExtractedData {
            market_cap: Some(80_000_000.0),
            cash_runway: runway,
            ..ExtractedData::default()
        })
    };

    let mid = WalkAwayReason::MidMarketCapWithoutUrgency {
        market_cap: 80_000_000.0,
    };
    assert_eq!(at(Some(5.0)), vec![mid.clone()]);
    assert_eq!(at(None), vec![mid]);
    assert!(at(Some(4.0)).is_empty());

    let small = reasons(&ExtractedData {
        market_cap: Some(60.0),
        ..ExtractedData::default()
    });
    assert!(small.is_empty());
}

#[test]
fn no_offering_pressure_requires_provider_tags() {
    let tagged = reasons(&ExtractedData {
        offering_ability: provider(ProviderTag::Green),
        overhead_supply: provider(ProviderTag::Low),
        ..ExtractedData::default()
    });
    assert_eq!(tagged, vec![WalkAwayReason::NoOfferingPressure]);

    let untagged = reasons(&ExtractedData {
        offering_ability: free_text("Low"),
        overhead_supply: provider(ProviderTag::Green),
        ..ExtractedData::default()
    });
    assert!(untagged.is_empty());
    assert!(reasons(&ExtractedData::default()).is_empty());
}

#[test]
fn hard_flag_overrides_a_high_rating() {
    let result = evaluate(&loaded_but_institutional());

    assert_eq!(result.total_score, 137);
    assert_eq!(result.rating, 91.3);
    assert!(result.rating >= 70.0);
    assert_eq!(result.category, Category::NoTrade);
    assert_eq!(result.category_label, "No-Trade");
    assert_eq!(
        result.walk_away_flags,
        vec!["Institutional ownership 80.0% exceeds 75%".to_string()]
    );
}
