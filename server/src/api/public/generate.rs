use crate::api::ErrorResponse;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use recipeready_core::{Recipe, RecipeFilters, RecipeGenerator};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GenerateRecipeRequest {
    /// What the user wants to cook, or the ingredients they have.
    pub input: String,
    #[serde(default)]
    pub filters: RecipeFilters,
}

#[utoipa::path(
    post,
    path = "/api/recipes/generate",
    tag = "recipes",
    request_body(content = GenerateRecipeRequest, example = json!({
        "input": "I have potatoes, make me something delicious",
        "filters": {"servings": 2, "cuisine": "italian", "dietary": "vegetarian"}
    })),
    responses(
        (status = 200, description = "Generated recipe", body = Recipe),
        (status = 400, description = "Blank request or invalid filters", body = ErrorResponse),
        (status = 502, description = "The model call or its output failed", body = ErrorResponse)
    )
)]
pub async fn generate_recipe(
    State(generator): State<Arc<RecipeGenerator>>,
    Json(request): Json<GenerateRecipeRequest>,
) -> impl IntoResponse {
    match generator.generate(&request.input, &request.filters).await {
        Ok(recipe) => (StatusCode::OK, Json(recipe)).into_response(),
        Err(e) => {
            let status = if e.is_validation() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::BAD_GATEWAY
            };
            (
                status,
                Json(ErrorResponse {
                    error: e.user_message(),
                }),
            )
                .into_response()
        }
    }
}
