use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;

use super::domain::ExtractedData;
use super::{ShortCheckEngine, ShortCheckResult};
use crate::droppiness::{parse_price_history, DroppinessAnalyzer, DroppinessReport, PriceHistoryError};

/// Body accepted by the short-check endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShortCheckRequest {
    #[serde(default)]
    pub data: ExtractedData,
    #[serde(default)]
    pub droppiness: Option<f64>,
    #[serde(default)]
    pub price_history_csv: Option<String>,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShortCheckResponse {
    pub as_of: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub droppiness_report: Option<DroppinessReport>,
    pub result: ShortCheckResult,
}

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    PriceHistory(#[from] PriceHistoryError),
}

impl ShortCheckRequest {
    /// Scores the request, deriving droppiness from the price history when no
    /// explicit score was sent. `today` is used only when `as_of` is absent.
    pub fn evaluate(
        self,
        engine: &ShortCheckEngine,
        today: NaiveDate,
    ) -> Result<ShortCheckResponse, RequestError> {
        let as_of = self.as_of.unwrap_or(today);

        let droppiness_report = match (self.droppiness, self.price_history_csv) {
            (None, Some(csv)) => {
                let bars = parse_price_history(Cursor::new(csv.into_bytes()))?;
                DroppinessAnalyzer::default().analyze(&bars)
            }
            _ => None,
        };
        let droppiness = self
            .droppiness
            .or_else(|| droppiness_report.as_ref().map(|report| report.score));

        let result = engine.evaluate(&self.data, droppiness, as_of);
        Ok(ShortCheckResponse {
            as_of,
            droppiness_report,
            result,
        })
    }
}

/// Router builder exposing the scoring engine over HTTP.
pub fn short_check_router(engine: Arc<ShortCheckEngine>) -> Router {
    Router::new()
        .route("/api/v1/short-check", post(evaluate_handler))
        .route("/api/v1/short-check/alert-card", post(alert_card_handler))
        .with_state(engine)
}

pub(crate) async fn evaluate_handler(
    State(engine): State<Arc<ShortCheckEngine>>,
    axum::Json(request): axum::Json<ShortCheckRequest>,
) -> Response {
    match request.evaluate(&engine, Local::now().date_naive()) {
        Ok(response) => (StatusCode::OK, axum::Json(response)).into_response(),
        Err(error) => bad_request(error),
    }
}

pub(crate) async fn alert_card_handler(
    State(engine): State<Arc<ShortCheckEngine>>,
    axum::Json(request): axum::Json<ShortCheckRequest>,
) -> Response {
    match request.evaluate(&engine, Local::now().date_naive()) {
        Ok(response) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            response.result.alert_card,
        )
            .into_response(),
        Err(error) => bad_request(error),
    }
}

fn bad_request(error: RequestError) -> Response {
    let payload = json!({
        "error": error.to_string(),
    });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}
