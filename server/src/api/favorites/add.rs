use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::favorites::PgFavoriteStore;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use recipeready_core::Recipe;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AddFavoriteResponse {
    pub id: String,
    /// False when the recipe was already a favorite.
    pub created: bool,
}

#[utoipa::path(
    post,
    path = "/api/favorites",
    tag = "favorites",
    request_body = Recipe,
    responses(
        (status = 201, description = "Favorite saved", body = AddFavoriteResponse),
        (status = 200, description = "Already a favorite", body = AddFavoriteResponse),
        (status = 400, description = "Recipe has no id or title", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn add_favorite(
    AuthUser(user): AuthUser,
    State(store): State<Arc<PgFavoriteStore>>,
    Json(recipe): Json<Recipe>,
) -> impl IntoResponse {
    if recipe.id.trim().is_empty() || recipe.title.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Recipe must have an id and a title".to_string(),
            }),
        )
            .into_response();
    }

    match store.insert_new(user.id, &recipe) {
        Ok(created) => {
            let status = if created {
                tracing::info!(user_id = %user.id, recipe_id = %recipe.id, "Recipe added to favorites");
                StatusCode::CREATED
            } else {
                StatusCode::OK
            };
            (
                status,
                Json(AddFavoriteResponse {
                    id: recipe.id,
                    created,
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(user_id = %user.id, recipe_id = %recipe.id, error = %e, "Error adding to favorites");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to add to favorites".to_string(),
                }),
            )
                .into_response()
        }
    }
}
