use crate::cli::ServeArgs;
use crate::infra::{
    default_scoring_config, load_catalog, AppState, InMemorySessionRepository,
    SeededCareerDirectory,
};
use crate::routes::with_coaching_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use reality_coach::config::AppConfig;
use reality_coach::error::AppError;
use reality_coach::telemetry;
use reality_coach::workflows::coaching::CoachingService;
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
    if let Some(path) = args.templates_csv.take() {
        config.catalog.templates_csv = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemorySessionRepository::default());
    let catalog = Arc::new(load_catalog(config.catalog.templates_csv.as_deref())?);
    let directory = Arc::new(SeededCareerDirectory::seeded());
    let template_count = catalog.template_count();
    let coaching_service = Arc::new(CoachingService::new(
        repository,
        catalog,
        directory,
        default_scoring_config(),
    ));

    let app = with_coaching_routes(coaching_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        template_count,
        "career reality coach ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
