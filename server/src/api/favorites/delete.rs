use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::favorites::PgFavoriteStore;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

#[utoipa::path(
    delete,
    path = "/api/favorites/{recipe_id}",
    tag = "favorites",
    params(
        ("recipe_id" = String, Path, description = "Id of the favorited recipe")
    ),
    responses(
        (status = 204, description = "Favorite removed (or was never saved)"),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_favorite(
    AuthUser(user): AuthUser,
    State(store): State<Arc<PgFavoriteStore>>,
    Path(recipe_id): Path<String>,
) -> impl IntoResponse {
    match store.delete_existing(user.id, &recipe_id) {
        Ok(removed) => {
            tracing::info!(user_id = %user.id, recipe_id = %recipe_id, removed, "Recipe removed from favorites");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => {
            tracing::error!(user_id = %user.id, recipe_id = %recipe_id, error = %e, "Error removing from favorites");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to remove from favorites".to_string(),
                }),
            )
                .into_response()
        }
    }
}
