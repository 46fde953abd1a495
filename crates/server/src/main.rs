//! Plaza server entry point.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::{Router, middleware};
use plaza_api::{AppState, TokenVerifier, auth_middleware, router as api_router};
use plaza_common::{Config, LocalClock};
use plaza_core::{
    AnnexService, EngagementService, EventService, LifecycleService, ModerationService,
    VotingService,
};
use plaza_db::repositories::{
    EngagementRepository, EventAnnexRepository, EventModerationRepository, EventRepository,
    EventVoteRepository, UserRoleRepository, VotingOptionRepository,
};
use plaza_queue::{LifecycleExecutor, SchedulerConfig, SchedulerState, run_scheduler};
use tokio::signal;
use tokio::sync::RwLock;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 1024 * 1024;

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
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plaza=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting plaza server...");

    // Load configuration
    let config = Config::load()?;
    let clock = LocalClock::from_name(&config.events.timezone)?;
    info!(timezone = %clock.timezone(), "Event clock configured");

    // Connect to database
    let db = Arc::new(plaza_db::init(&config).await?);
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    plaza_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let event_repo = EventRepository::new(Arc::clone(&db));
    let option_repo = VotingOptionRepository::new(Arc::clone(&db));
    let vote_repo = EventVoteRepository::new(Arc::clone(&db));
    let moderation_repo = EventModerationRepository::new(Arc::clone(&db));
    let engagement_repo = EngagementRepository::new(Arc::clone(&db));
    let annex_repo = EventAnnexRepository::new(Arc::clone(&db));
    let user_role_repo = UserRoleRepository::new(Arc::clone(&db));

    // Initialize services
    let lifecycle_service =
        LifecycleService::new(event_repo.clone(), option_repo.clone(), vote_repo.clone());
    let event_service = EventService::new(
        event_repo.clone(),
        option_repo.clone(),
        moderation_repo.clone(),
        engagement_repo.clone(),
        lifecycle_service.clone(),
    );
    let voting_service = VotingService::new(event_repo.clone(), option_repo, vote_repo);
    let engagement_service = EngagementService::new(engagement_repo, event_repo.clone());
    let moderation_service = ModerationService::new(moderation_repo, event_repo.clone());
    let annex_service = AnnexService::new(annex_repo, event_repo);

    let state = AppState {
        event_service,
        voting_service,
        lifecycle_service: lifecycle_service.clone(),
        engagement_service,
        moderation_service,
        annex_service,
        user_role_repo,
        tokens: Arc::new(TokenVerifier::from_config(&config.auth)),
        clock,
    };

    // Build router
    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start the lifecycle sweep
    let scheduler_config = SchedulerConfig::from(&config.events);
    info!(
        interval_secs = scheduler_config.sweep_interval.as_secs(),
        "Starting event sweep scheduler..."
    );
    let scheduler = run_scheduler(
        &scheduler_config,
        Arc::new(LifecycleExecutor::new(lifecycle_service, clock)),
        Arc::new(RwLock::new(SchedulerState::default())),
    );

    // Start server with graceful shutdown
    let host: IpAddr = config.server.host.parse()?;
    let addr = SocketAddr::from((host, config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.abort();
    info!("Server shutdown complete");
    Ok(())
}
