use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use serenade_core::ports::{Notifier, RequestStore};
use serenade_db::PgRequestStore;
use serenade_events::{
    EmailConfig, EmailDelivery, EventBus, EventPersistence, FeedScope, LogNotifier,
};
use serenade_fulfillment::{
    FulfillmentConfig, FulfillmentCoordinator, LocalMediaStorage, ReconciliationLoop,
};
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use serenade_api::config::ServerConfig;
use serenade_api::routes;
use serenade_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "serenade_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    let fulfillment = FulfillmentConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    tracing::info!(
        trusted_hosts = ?fulfillment.trusted_media_hosts,
        reconcile_interval_secs = fulfillment.reconcile_interval.as_secs(),
        "Loaded fulfillment configuration"
    );
    if config.payment_webhook_secret.is_none() {
        tracing::warn!("PAYMENT_WEBHOOK_SECRET not set, payment webhook will refuse all calls");
    }

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = serenade_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    serenade_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    serenade_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let pg_store = Arc::new(PgRequestStore::new(pool.clone()));
    let store: Arc<dyn RequestStore> = pg_store.clone();

    // --- CORS ---
    let cors = build_cors_layer(&config);

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    let persistence_handle = tokio::spawn(EventPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));

    // --- Delivery ---
    let notifier: Arc<dyn Notifier> = match EmailConfig::from_env() {
        Some(email) => {
            tracing::info!(smtp_host = %email.smtp_host, "SMTP delivery enabled");
            Arc::new(EmailDelivery::new(email))
        }
        None => {
            tracing::info!("SMTP_HOST not set, deliveries are logged only");
            Arc::new(LogNotifier)
        }
    };

    // --- Fulfillment ---
    let media = Arc::new(LocalMediaStorage::new(
        fulfillment.media_root.clone(),
        fulfillment.media_public_base_url.clone(),
    ));
    let coordinator = Arc::new(
        FulfillmentCoordinator::new(Arc::clone(&store), pg_store.clone(), notifier)
            .with_validator(fulfillment.validator())
            .with_media_storage(media)
            .with_event_bus(Arc::clone(&event_bus)),
    );

    // Admin board kept fresh from the feed plus a periodic poll.
    let admin_board = Arc::new(
        ReconciliationLoop::new(Arc::clone(&store), FeedScope::Admin)
            .with_interval(fulfillment.reconcile_interval)
            .with_timeout(fulfillment.optimistic_timeout_chrono()),
    );
    let sync_cancel = CancellationToken::new();
    let sync_handle = tokio::spawn(
        Arc::clone(&admin_board).run(event_bus.subscribe(), sync_cancel.clone()),
    );

    tracing::info!("Background services started (event persistence, admin reconciliation)");

    // --- App state ---
    let state = AppState {
        pool: Some(pool),
        config: Arc::new(config.clone()),
        store,
        testimonials: pg_store,
        coordinator,
        admin_board,
    };

    let request_id_header = HeaderName::from_static("x-request-id");

    // --- Router ---
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        // -- Middleware stack (applied bottom-up) --
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let grace = Duration::from_secs(config.shutdown_timeout_secs);

    sync_cancel.cancel();
    let _ = tokio::time::timeout(grace, sync_handle).await;
    tracing::info!("Admin reconciliation stopped");

    // Dropping the last bus handle closes the channel and stops persistence.
    drop(event_bus);
    let _ = tokio::time::timeout(grace, persistence_handle).await;
    tracing::info!("Event persistence shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Build the CORS layer. Panics on an invalid origin so misconfiguration
/// fails at startup.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
