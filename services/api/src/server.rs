use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

use civic_docs::config::AppConfig;
use civic_docs::error::AppError;
use civic_docs::requests::{DocumentRequestService, InMemoryRequestStore};
use civic_docs::telemetry;

use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_request_routes;

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

    let store = Arc::new(InMemoryRequestStore::default());
    let service = Arc::new(DocumentRequestService::new(
        store,
        config.requests.to_policy(),
    ));

    let app = with_request_routes(service, config.requests.admin_token.clone())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "document request desk ready");

    axum::serve(listener, app).await?;
    Ok(())
}
