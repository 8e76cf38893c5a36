use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::favorites::PgFavoriteStore;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use recipeready_core::{FavoriteStore, Recipe};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FavoritesResponse {
    pub favorites: Vec<Recipe>,
}

#[utoipa::path(
    get,
    path = "/api/favorites",
    tag = "favorites",
    responses(
        (status = 200, description = "The user's favorite recipes, oldest first", body = FavoritesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_favorites(
    AuthUser(user): AuthUser,
    State(store): State<Arc<PgFavoriteStore>>,
) -> impl IntoResponse {
    match store.list(user.id).await {
        Ok(favorites) => Json(FavoritesResponse { favorites }).into_response(),
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "Error fetching favorite recipes");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to load favorite recipes".to_string(),
                }),
            )
                .into_response()
        }
    }
}
