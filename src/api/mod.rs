use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

mod flowers;
mod health;
mod process_guided;
mod process_image;

const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let mut app = Router::new()
        .route("/api/health", get(health::health_handler))
        .route("/api/flowers", get(flowers::list_flowers_handler))
        .route(
            "/api/process-image",
            post(process_image::process_image_handler),
        )
        .route(
            "/api/process-guided",
            post(process_guided::process_guided_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .nest_service("/Flowers", ServeDir::new(&config.flowers_dir))
        .nest_service("/bg_onam", ServeDir::new(&config.bg_dir))
        // Kept alias so older frontend asset URLs keep resolving.
        .nest_service("/Onam/bg_onam", ServeDir::new(&config.bg_dir));

    if config.serve_frontend {
        let index = config.frontend_dir.join("index.html");
        app = app.fallback_service(
            ServeDir::new(&config.frontend_dir).fallback(ServeFile::new(index)),
        );
    }

    app.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
