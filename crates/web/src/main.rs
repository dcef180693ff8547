use anyhow::Context;
use storage::Database;
use tokio::net::TcpListener;
use web::{AppState, build_router, config::Config, sse::Broadcaster};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting tournament server");

    let config = Config::from_env().context("Failed to load server configuration")?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!("Opening database at: {}", config.database_url);
    let db = Database::new(&config.database_url)
        .await
        .context("Failed to initialize database")?;
    tracing::info!("Database connection established");

    tracing::info!("Running database migrations");
    db.run_migrations()
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Database migrations completed successfully");

    let broadcaster = Broadcaster::new(config.broadcast_topic.as_str(), config.broadcast_capacity);
    let app = build_router(AppState::new(db, broadcaster));

    let bind_address = config.bind_address();
    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Listening on http://{}", bind_address);
    tracing::info!(
        "Viewers subscribe at http://{}/api/topics/{}/events",
        bind_address,
        config.broadcast_topic
    );
    tracing::info!("OpenAPI document at http://{}/api-docs/openapi.json", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
