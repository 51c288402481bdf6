use crate::cli::ServeArgs;
use crate::infra::{seeded_marketplace, AppState, InMemoryMarketplace};
use crate::routes::{with_workflow_routes, Services};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use jobmatch::config::AppConfig;
use jobmatch::error::AppError;
use jobmatch::telemetry;
use jobmatch::workflows::applications::ApplicationLifecycleService;
use jobmatch::workflows::matching::{MatchingService, PostingImporter};
use jobmatch::workflows::trust::TrustService;
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

    let market = Arc::new(if args.empty {
        InMemoryMarketplace::default()
    } else {
        seeded_marketplace(Utc::now())
    });
    if let Some(path) = args.postings_csv.take() {
        let postings = PostingImporter::from_path(&path)?;
        info!(path = %path.display(), count = postings.len(), "loaded postings");
        market.replace_postings(postings);
    }

    let services = Services {
        matching: Arc::new(MatchingService::new(
            market.clone(),
            market.clone(),
            config.matching,
        )),
        lifecycle: Arc::new(ApplicationLifecycleService::new(
            market.clone(),
            market.clone(),
            config.lifecycle,
        )),
        trust: Arc::new(TrustService::new(market)),
    };

    let app = with_workflow_routes(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "matching engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
