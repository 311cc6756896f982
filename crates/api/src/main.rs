use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use concert_db::store::PgConcertStore;
use concert_events::{BusPublisher, EventBus, EventLogger, NotificationPublisher, RedisPublisher};
use concert_service::ConcertService;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use concert_api::config::ServerConfig;
use concert_api::router::build_app_router;
use concert_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "concert_api=debug,concert_service=debug,concert_events=debug,tower_http=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = concert_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    concert_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    concert_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Notification publisher ---
    let (publisher, logger_handle) = build_publisher(&config).await;

    // --- Lifecycle service ---
    let concerts = ConcertService::new(
        Arc::new(PgConcertStore::new(pool.clone())),
        Arc::clone(&publisher),
    )
    .with_dependency_timeout(Duration::from_secs(config.dependency_timeout_secs));

    // --- App state ---
    let state = AppState {
        concerts: Arc::new(concerts),
        config: Arc::new(config.clone()),
    };

    let app = build_app_router(state, &config);

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

    publisher.shutdown().await;
    // Dropping the last publisher handle closes the bus, which stops the logger.
    drop(publisher);
    if let Some(handle) = logger_handle {
        let wait = Duration::from_secs(config.shutdown_timeout_secs);
        let _ = tokio::time::timeout(wait, handle).await;
    }
    tracing::info!("Notification publisher shut down");

    pool.close().await;
    tracing::info!("Database pool closed");

    tracing::info!("Graceful shutdown complete");
}

/// Connect to Redis when `REDIS_URL` is set; otherwise publish to an
/// in-process bus drained by [`EventLogger`].
///
/// The broker is connected eagerly so a bad URL or unreachable broker stops
/// startup instead of failing the first create.
async fn build_publisher(
    config: &ServerConfig,
) -> (Arc<dyn NotificationPublisher>, Option<JoinHandle<()>>) {
    match &config.redis_url {
        Some(url) => {
            let publisher = RedisPublisher::new(url, config.queue_prefix.clone())
                .expect("REDIS_URL must be a valid Redis URL");
            let wait = Duration::from_secs(config.dependency_timeout_secs);
            tokio::time::timeout(wait, publisher.connect())
                .await
                .expect("Timed out connecting to notification broker")
                .expect("Failed to connect to notification broker");
            tracing::info!("Publishing notifications to Redis");
            (Arc::new(publisher), None)
        }
        None => {
            let bus = Arc::new(EventBus::default());
            let handle = tokio::spawn(EventLogger::run(bus.subscribe()));
            tracing::warn!("REDIS_URL not set, notifications are only logged");
            (Arc::new(BusPublisher::new(bus)), Some(handle))
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
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
