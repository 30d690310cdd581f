use crate::cli::ServeArgs;
use crate::infra::{import_listings_from_path, seed_demo_accounts, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use realty_market::access::{AccessError, InMemoryRoleCache, RoleCache, UserDirectory};
use realty_market::config::{AppConfig, WorkflowConfig};
use realty_market::error::AppError;
use realty_market::listings::{listing_router, MarketplaceState, PropertyRepository};
use realty_market::store::InMemoryDocumentStore;
use realty_market::telemetry;
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

    let marketplace = build_marketplace(&args, config.workflow).await?;

    let app = with_service_routes(listing_router(marketplace))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        policy = ?config.workflow.transition_policy,
        "property marketplace ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Fresh in-memory marketplace with the startup accounts and listings from `args`.
pub(crate) async fn build_marketplace(
    args: &ServeArgs,
    workflow: WorkflowConfig,
) -> Result<MarketplaceState<InMemoryDocumentStore>, AppError> {
    let store = Arc::new(InMemoryDocumentStore::new());
    let repository = PropertyRepository::with_policy(Arc::clone(&store), workflow.transition_policy);

    if args.demo_accounts || args.seed_csv.is_some() {
        seed_demo_accounts(Arc::clone(&store)).await?;
        info!("demo accounts registered");
    }

    let directory = UserDirectory::new(Arc::clone(&store));
    for uid in &args.admins {
        let email = directory
            .profile(uid)
            .await
            .map_err(AccessError::from)?
            .map(|profile| profile.email)
            .unwrap_or_default();
        directory
            .grant_admin(uid, &email)
            .await
            .map_err(AccessError::from)?;
    }

    if let Some(path) = &args.seed_csv {
        let imported = import_listings_from_path(&repository, path, &args.seed_owner, false).await?;
        info!(count = imported.len(), path = %path.display(), "seeded listings awaiting review");
    }

    Ok(MarketplaceState {
        repository,
        cache: Arc::new(InMemoryRoleCache::new()) as Arc<dyn RoleCache>,
        activity_limit: workflow.recent_activity_limit,
    })
}
