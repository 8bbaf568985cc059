//! Journal HTTP Gateway
//!
//! The entry point for all external requests against the journal catalog.
//! Handles:
//! - Catalog browsing (current issue, archive, article listings)
//! - View counting and citation sync
//! - Mailing-list intake
//! - Sitemap feed and site-wide settings
//! - Observability (logging, metrics, tracing)

mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use journal_common::{
    config::AppConfig,
    db::{DbPool, Repository},
    scholar::{CitationSyncService, SerpScholarClient},
    BibliographicSearch,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub citations: Arc<CitationSyncService>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        e
    })?;

    // Initialize tracing
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&config.observability.log_level)
            }),
        )
        .with_target(true);
    if config.observability.json_logging {
        fmt.json().init();
    } else {
        fmt.init();
    }

    info!("Starting journal gateway v{}", journal_common::VERSION);

    let config = Arc::new(config);

    // Initialize metrics
    journal_common::metrics::register_metrics();
    if config.observability.metrics_port != 0 {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()?;
        info!("Prometheus exporter listening on {}", addr);
    }

    // Initialize database connection
    info!("Connecting to database...");
    let db = DbPool::new(&config.database).await?;

    // Citation sync gets its search capability decided once, here
    let search: Option<Arc<dyn BibliographicSearch>> = if config.has_scholar_search() {
        Some(Arc::new(SerpScholarClient::from_config(&config.scholar)?))
    } else {
        info!("No bibliographic search configured, citation sync degraded");
        None
    };
    let citations = Arc::new(CitationSyncService::new(
        Repository::new(db.clone()),
        search,
    ));

    // Create app state
    let state = AppState {
        config: config.clone(),
        db,
        citations,
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let api_routes = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Issue endpoints
        .route("/issues/current", get(handlers::issues::current_issue))
        .route("/issues/archive", get(handlers::issues::archive))
        .route("/issues/{id}", get(handlers::issues::get_issue))
        // Article endpoints
        .route("/articles/latest", get(handlers::articles::latest_articles))
        .route(
            "/articles/most-read",
            get(handlers::articles::most_read_articles),
        )
        .route("/articles/{id}", get(handlers::articles::get_article))
        .route(
            "/articles/{id}/sync-citations",
            post(handlers::articles::sync_citations),
        )
        // Mailing-list endpoint
        .route("/mailing-list/join", post(handlers::mailing::join))
        // Site content endpoints
        .route("/site-context", get(handlers::pages::site_context))
        .route("/about", get(handlers::pages::list_about))
        .route("/about/{id}", get(handlers::pages::get_about))
        .route("/subscribe", get(handlers::pages::subscribe_page))
        .route("/submission", get(handlers::pages::submission_guidelines))
        .route("/permissions", get(handlers::pages::list_permissions))
        .route("/permissions/notice", get(handlers::pages::permission_notice))
        .route("/permissions/{id}", get(handlers::pages::get_permission));

    // Compose the app; the sitemap lives at the root, not under the API prefix
    Router::new()
        .nest("/v1", api_routes)
        .route("/sitemap.xml", get(handlers::sitemap::sitemap))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
