pub mod add;
pub mod delete;
pub mod list;

use crate::AppState;
use axum::routing::{delete, get};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/favorites endpoints (mounted at /api/favorites)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_favorites).post(add::add_favorite))
        .route("/{recipe_id}", delete(delete::delete_favorite))
}

#[derive(OpenApi)]
#[openapi(
    paths(list::list_favorites, add::add_favorite, delete::delete_favorite),
    components(schemas(list::FavoritesResponse, add::AddFavoriteResponse))
)]
pub struct ApiDoc;
