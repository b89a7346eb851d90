use anyhow::Context;
use dotenvy::dotenv;
use tracing::{error, info, warn};

use pookkolam_designer::api;
use pookkolam_designer::config::Config;
use pookkolam_designer::state::AppState;
use pookkolam_designer::utils::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::load()?;
    let _logging_guards = init_logging(&config);

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("failed to create {}", config.upload_dir.display()))?;

    let placeholder = config.upload_dir.join("placeholder-preview.jpg");
    if !placeholder.exists() {
        warn!(
            "Placeholder image not found at {}; add one manually",
            placeholder.display()
        );
    }

    if config.serve_frontend {
        info!("Serving frontend from {}", config.frontend_dir.display());
    }

    let port = config.port;
    let environment = config.environment;
    let state = AppState::new(config)?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .context("failed to bind to port")?;

    info!("Pookkolam Designer backend running at http://localhost:{port}");
    info!("Health endpoint available at http://localhost:{port}/api/health");
    info!("Environment: {}", environment.label());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server shut down successfully");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down server..."),
        Err(err) => error!("Failed to listen for shutdown signal: {err}"),
    }
}
