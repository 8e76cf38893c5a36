use axum::{extract::State, response::IntoResponse, Json};
use recipeready_core::RecipeGenerator;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Model answering generation requests.
    pub model: String,
}

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
pub async fn health(State(generator): State<Arc<RecipeGenerator>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: generator.model_name().to_string(),
    })
}
