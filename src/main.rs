use anyhow::Result;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ielts_practice::{
    api::{create_router, AppState},
    config::{Config, LoggingConfig},
    log_system_event, log_validation, AdminService, Database, GenerationClient, ReadingService,
    WritingService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging with optional file output
    let _guard = setup_logging(&LoggingConfig::from_env()?)?;

    let config = Config::from_env()?;

    if let Err(e) = config.validate() {
        log_validation!(failure, "configuration", error = e);
        return Err(e);
    }

    log_system_event!(startup, component = "server", "Starting IELTS practice server");

    let database = Database::new(&config.database.url).await?;
    info!("Database initialized successfully");

    // Key and model lists are checked once here, not per request.
    let client = match GenerationClient::from_config(&config.generation) {
        Ok(client) => {
            info!(
                models = ?client.models(),
                key_count = client.pool().len(),
                "Initialized generation client"
            );
            Some(client.with_attempt_log(Arc::new(database.clone())))
        }
        Err(e) => {
            warn!(error = %e, "Generation client disabled");
            None
        }
    };

    let state = AppState {
        reading_service: ReadingService::new(client.clone(), Arc::new(database.clone())),
        writing_service: WritingService::new(client.clone(), Arc::new(database.clone())),
        admin_service: AdminService::new(client),
        database,
    };

    let app = create_router(state).layer(ServiceBuilder::new().layer(CorsLayer::permissive()));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log_system_event!(shutdown, component = "server", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}

fn setup_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    use tracing_subscriber::fmt;

    let env_filter = EnvFilter::try_new(&config.level)
        .unwrap_or_else(|_| EnvFilter::new("info,ielts_practice=debug"));

    // Configure console output
    let console_layer = config.console_enabled.then(|| {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(true)
    });

    // Configure file output (no ANSI colors for files), rotated daily
    let (file_layer, guard) = if config.file_enabled {
        std::fs::create_dir_all(&config.log_directory).unwrap_or_else(|e| {
            eprintln!("Warning: Could not create logs directory: {}", e);
        });
        let file_appender = tracing_appender::rolling::daily(&config.log_directory, "ielts-practice.log");
        let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
        let layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(non_blocking_file);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!(
        file_enabled = config.file_enabled,
        log_directory = %config.log_directory,
        "Logging initialized"
    );

    Ok(guard)
}
