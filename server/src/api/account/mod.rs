pub mod logout;
pub mod me;

use crate::AppState;
use axum::routing::{get, post};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for session endpoints (mounted at the root)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/me", get(me::me))
        .route("/api/auth/logout", post(logout::logout))
}

#[derive(OpenApi)]
#[openapi(paths(me::me, logout::logout), components(schemas(me::UserResponse)))]
pub struct ApiDoc;
