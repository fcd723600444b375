pub mod docs;
pub mod health;

use anyhow::{bail, Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::analysis::handlers;
use crate::config::Config;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/analyze/", post(handlers::handle_analyze_upload))
        .route("/analyze", post(handlers::handle_analyze_upload));

    if state.config.debug {
        router = router.route("/docs", get(docs::docs_handler));
    }

    // The analyze handler streams uploads and enforces MAX_FILE_SIZE_MB itself.
    router.layer(DefaultBodyLimit::disable()).with_state(state)
}

/// Origin allow-list for GET/POST with credentials. Request headers are
/// mirrored since a credentialed response cannot use a header wildcard.
pub fn cors_layer(config: &Config) -> Result<CorsLayer> {
    let mut origins = Vec::with_capacity(config.allowed_origins.len());
    for origin in &config.allowed_origins {
        if origin == "*" {
            bail!("ALLOWED_ORIGINS cannot contain '*' when credentials are allowed");
        }
        origins.push(
            HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid origin in ALLOWED_ORIGINS: '{origin}'"))?,
        );
    }

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true)
        .allow_headers(AllowHeaders::mirror_request()))
}
