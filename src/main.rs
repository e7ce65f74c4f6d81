//! Message Sender API
//!
//! Transactional outbox delivery: HTTP intake + periodic webhook dispatch
//! Stack: Axum, PostgreSQL, Redis

use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use message_sender::{
    cache::DeliveryCache,
    config::Config,
    db::Database,
    docs,
    messages::MessageStore,
    queue::{worker::OutboxWorker, OutboxQueue},
    routes,
    scheduler::{control::SenderControl, SchedulerManager},
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "message_sender=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!("Starting Message Sender API");
    tracing::info!("Environment: {}", config.environment);

    // Initialize database
    let db = Database::new(&config.database).await?;
    tracing::info!("Database connected");

    db.migrate().await?;
    tracing::info!("Migrations completed");

    // Initialize services
    let services = Services::new(&config).await?;
    tracing::info!("Services initialized");

    let outbox = OutboxQueue::new(db.clone());
    let store = MessageStore::new(db.clone(), outbox.clone());
    let deliveries = DeliveryCache::new(services.redis.clone(), config.redis.ttl);

    // Process-scoped root token; cancelled on shutdown so the worker
    // finishes at most its in-flight webhook call.
    let shutdown = CancellationToken::new();

    let worker = OutboxWorker::new(
        config.scheduler.clone(),
        outbox.clone(),
        services.webhook.clone(),
        deliveries.clone(),
    );
    let manager = SchedulerManager::new(Arc::new(worker), shutdown.clone());
    let control = SenderControl::new(manager.clone());

    if config.scheduler.enabled {
        manager.start().await;
        tracing::info!("Outbox scheduler started");
    } else {
        tracing::info!("Outbox scheduler disabled at boot");
    }

    // Create app state
    let state = AppState {
        db,
        config: config.clone(),
        store,
        control,
        deliveries,
    };

    let swagger_router =
        SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi());

    let app = axum::Router::new()
        .merge(routes::health::router())
        .nest("/api", routes::api_router())
        .merge(swagger_router)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);
    tracing::info!(
        "📚 API Documentation: http://{}:{}/swagger-ui",
        addr.ip(),
        addr.port()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    Ok(())
}

/// Wait for SIGINT/SIGTERM, then cancel the process root token
async fn shutdown_signal(root: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
    root.cancel();
}
