use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_short_check_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use short_check::config::AppConfig;
use short_check::error::AppError;
use short_check::scoring::ShortCheckEngine;
use short_check::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let engine = Arc::new(ShortCheckEngine::new(config.scoring.clone()));

    let app = with_short_check_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "short check service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
