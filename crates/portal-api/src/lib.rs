pub mod admin;
pub mod announcements;
pub mod error;
pub mod users;

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, header::InvalidHeaderValue},
    routing::{get, post},
};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use portal_db::{Database, SeedData};

pub use error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    /// Document used at startup; `/reset-db` seeds from it again.
    pub seed: SeedData,
}

pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/announcements", get(announcements::list_announcements))
        .route("/announcements/new", post(announcements::create_announcement))
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user))
        .route("/reset-db", post(admin::reset_database))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Credentialed CORS for an explicit origin list. Methods and headers are
/// mirrored from the preflight, since wildcards are not allowed together
/// with credentials.
pub fn cors_layer(origins: &[String]) -> Result<CorsLayer, InvalidHeaderValue> {
    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}
