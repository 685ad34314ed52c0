use super::common::*;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::scoring::router::{evaluate_handler, ShortCheckRequest};
use crate::scoring::short_check_router;

const FADING_HISTORY: &str = "Date,Open,High,Low,Close,Volume\n\
    2025-06-02,1.00,1.02,0.98,1.00,100000\n\
    2025-06-03,1.05,1.60,1.02,1.40,900000\n\
    2025-06-04,1.35,1.38,1.10,1.15,400000\n\
    2025-06-05,1.12,1.14,1.05,1.08,200000\n";

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request builds")
}

fn scenario_a_body() -> Value {
    json!({
        "data": {
            "ticker": "abcd",
            "cash_runway": 2.0,
            "quarterly_burn_rate": -2.0,
            "offering_ability": "DT:Red",
            "institutional_ownership": 5.0,
            "short_interest": 2.0,
            "float": 0.4,
            "market_cap": 30.0
        },
        "as_of": "2025-06-16"
    })
}

#[tokio::test]
async fn evaluate_route_returns_scored_result() {
    let router = short_check_router(Arc::new(engine()));

    let response = router
        .oneshot(post_json("/api/v1/short-check", scenario_a_body()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["as_of"], "2025-06-16");
    assert_eq!(payload["result"]["total_score"], 113);
    assert_eq!(payload["result"]["rating"], 75.3);
    assert_eq!(payload["result"]["category"], "high_priority");
    assert_eq!(payload["result"]["category_label"], "High-Priority");
    assert_eq!(payload["result"]["breakdown"]["cash_need"], 25);
    assert!(payload.get("droppiness_report").is_none());
}

#[tokio::test]
async fn alert_card_route_returns_plain_text() {
    let router = short_check_router(Arc::new(engine()));

    let response = router
        .oneshot(post_json("/api/v1/short-check/alert-card", scenario_a_body()))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    assert_eq!(content_type.as_deref(), Some("text/plain; charset=utf-8"));

    let card = read_text_body(response).await;
    assert!(card.starts_with("SHORT CHECK: ABCD\nRating: 75.3% (High-Priority)"));
}

#[tokio::test]
async fn price_history_feeds_droppiness() {
    let mut body = scenario_a_body();
    body["price_history_csv"] = json!(FADING_HISTORY);

    let response = short_check_router(Arc::new(engine()))
        .oneshot(post_json("/api/v1/short-check", body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["droppiness_report"]["spikes"], 1);
    assert_eq!(payload["droppiness_report"]["faded"], 1);
    assert_eq!(payload["result"]["breakdown"]["droppiness"], 12);
    assert_eq!(payload["result"]["max_possible_score"], 162.0);
}

#[tokio::test]
async fn explicit_droppiness_wins_over_price_history() {
    let mut body = scenario_a_body();
    body["droppiness"] = json!(10.0);
    body["price_history_csv"] = json!("not,a,price,history");

    let response = short_check_router(Arc::new(engine()))
        .oneshot(post_json("/api/v1/short-check", body))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["result"]["breakdown"]["droppiness"], -8);
}

#[tokio::test]
async fn malformed_price_history_is_a_bad_request() {
    let request: ShortCheckRequest = serde_json::from_value(json!({
        "data": { "ticker": "ABCD" },
        "price_history_csv": "Date,Open,High,Low,Close,Volume\n06/02/2025,1,1,1,1,10\n"
    }))
    .expect("request deserializes");

    let response = evaluate_handler(State(Arc::new(engine())), axum::Json(request)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload = read_json_body(response).await;
    let message = payload["error"].as_str().expect("error message");
    assert!(message.contains("06/02/2025"));
}

#[tokio::test]
async fn missing_as_of_falls_back_to_today() {
    let response = short_check_router(Arc::new(engine()))
        .oneshot(post_json("/api/v1/short-check", json!({ "data": {} })))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert!(payload["as_of"].is_string());
    assert_eq!(payload["result"]["max_possible_score"], 150.0);
}

#[test]
fn request_evaluation_uses_supplied_today() {
    let request: ShortCheckRequest =
        serde_json::from_value(json!({ "data": {} })).expect("request deserializes");

    let response = request
        .evaluate(&engine(), as_of())
        .expect("evaluation succeeds");

    assert_eq!(response.as_of, as_of());
    assert!(response.droppiness_report.is_none());
}
