//! RateNextDoor server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use ratenextdoor_api::{AppState, app};
use ratenextdoor_common::{Config, StorageBackend, StorageConfig};
use ratenextdoor_core::{
    DashboardService, ForumService, GeocodingService, GoTrueClient, IdentityService, ImageService,
    ProfileService, RateService, UsernameService, VoteService,
};
use ratenextdoor_db::repositories::{
    ForumPostRepository, ForumVoteRepository, ProfileRepository, RateSubmissionRepository,
};
use sea_orm::{ConnectOptions, Database};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
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
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ratenextdoor=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting RateNextDoor server...");

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Connect to database
    let mut db_opts = ConnectOptions::new(&config.database.url);
    db_opts
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections);

    let db = Database::connect(db_opts)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    ratenextdoor_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let post_repo = ForumPostRepository::new(Arc::clone(&db));
    let vote_repo = ForumVoteRepository::new(Arc::clone(&db));
    let profile_repo = ProfileRepository::new(Arc::clone(&db));
    let rate_repo = RateSubmissionRepository::new(Arc::clone(&db));

    // External services
    let identity: IdentityService = Arc::new(GoTrueClient::new(&config.auth)?);
    let geocoding_service = GeocodingService::new(config.geocoding.clone())?;
    if !geocoding_service.is_enabled() {
        tracing::warn!("No geocoding access token configured; address validation is disabled");
    }

    let storage: Arc<dyn StorageBackend> =
        Arc::from(StorageConfig::from(config.storage.clone()).into_backend());

    // Initialize services
    let state = AppState {
        identity,
        profile_service: ProfileService::new(profile_repo.clone()),
        forum_service: ForumService::new(post_repo.clone(), profile_repo.clone(), vote_repo.clone()),
        vote_service: VoteService::new(vote_repo),
        rate_service: RateService::new(rate_repo.clone()),
        image_service: ImageService::new(storage),
        geocoding_service,
        username_service: UsernameService::new(profile_repo.clone()),
        dashboard_service: DashboardService::new(profile_repo, rate_repo, post_repo),
        session_cookie: config.auth.cookie_name.clone(),
        secure_cookies: config.server.url.starts_with("https://"),
    };

    // Build router
    let app = app(state)
        .nest_service("/files", ServeDir::new(&config.storage.base_path))
        .layer(DefaultBodyLimit::max(config.storage.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}
