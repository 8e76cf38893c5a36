//! HTTP client for the RecipeReady server.

use async_trait::async_trait;
use recipeready_core::{FavoriteStore, Recipe, RecipeFilters, StoreError, User};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const DEFAULT_SERVER: &str = "http://localhost:3000";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Not signed in")]
    Unauthorized,

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    #[error("{message} (HTTP {status})")]
    Status { status: u16, message: String },
}

impl From<ApiError> for StoreError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Request(e) => StoreError::RequestFailed(e.to_string()),
            ApiError::Unauthorized => StoreError::Unauthorized,
            ApiError::InvalidUrl(e) => StoreError::RequestFailed(e),
            ApiError::Status { status, message } => StoreError::Api { status, message },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct GenerateBody<'a> {
    input: &'a str,
    filters: &'a RecipeFilters,
}

#[derive(Deserialize)]
struct FavoritesBody {
    favorites: Vec<Recipe>,
}

#[derive(Deserialize)]
struct AddFavoriteBody {
    created: bool,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/api/favorites/{id}` with the id percent-encoded as one segment.
    fn favorite_url(&self, recipe_id: &str) -> Result<reqwest::Url, ApiError> {
        let mut url = reqwest::Url::parse(&self.url("/api/favorites"))
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?
            .push(recipe_id);
        Ok(url)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::Unauthorized)?;
        Ok(builder.bearer_auth(token))
    }

    /// Turn a non-2xx response into an error carrying the server's message.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(builder: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = Self::check(builder.send().await?).await?;
        Ok(response.json().await?)
    }

    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        Self::json(self.http.get(self.url("/api/health"))).await
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        Self::json(
            self.http
                .post(self.url("/api/auth/signup"))
                .json(&Credentials { email, password }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        Self::json(
            self.http
                .post(self.url("/api/auth/login"))
                .json(&Credentials { email, password }),
        )
        .await
    }

    pub async fn logout(&self) -> Result<(), ApiError> {
        let request = self.authed(self.http.post(self.url("/api/auth/logout")))?;
        Self::check(request.send().await?).await?;
        Ok(())
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        Self::json(self.authed(self.http.get(self.url("/api/me")))?).await
    }

    pub async fn generate(&self, input: &str, filters: &RecipeFilters) -> Result<Recipe, ApiError> {
        Self::json(
            self.http
                .post(self.url("/api/recipes/generate"))
                .json(&GenerateBody { input, filters }),
        )
        .await
    }

    pub async fn list_favorites(&self) -> Result<Vec<Recipe>, ApiError> {
        let body: FavoritesBody =
            Self::json(self.authed(self.http.get(self.url("/api/favorites")))?).await?;
        Ok(body.favorites)
    }

    /// Returns false when the recipe was already a favorite.
    pub async fn add_favorite(&self, recipe: &Recipe) -> Result<bool, ApiError> {
        let request = self.authed(self.http.post(self.url("/api/favorites")))?;
        let body: AddFavoriteBody = Self::json(request.json(recipe)).await?;
        Ok(body.created)
    }

    pub async fn delete_favorite(&self, recipe_id: &str) -> Result<(), ApiError> {
        let request = self.authed(self.http.delete(self.favorite_url(recipe_id)?))?;
        Self::check(request.send().await?).await?;
        Ok(())
    }
}

/// Favorite store that goes through the server API.
///
/// The server scopes every favorite to the session token, so the `user_id`
/// arguments only need to match the signed-in user.
pub struct HttpFavoriteStore {
    api: ApiClient,
}

impl HttpFavoriteStore {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl FavoriteStore for HttpFavoriteStore {
    async fn list(&self, _user_id: Uuid) -> Result<Vec<Recipe>, StoreError> {
        Ok(self.api.list_favorites().await?)
    }

    async fn insert(&self, _user_id: Uuid, recipe: &Recipe) -> Result<(), StoreError> {
        self.api.add_favorite(recipe).await?;
        Ok(())
    }

    async fn delete(&self, _user_id: Uuid, recipe_id: &str) -> Result<(), StoreError> {
        Ok(self.api.delete_favorite(recipe_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let api = ApiClient::new("http://localhost:3000/", None);
        assert_eq!(api.url("/api/health"), "http://localhost:3000/api/health");
    }

    #[test]
    fn test_favorite_url_encodes_id() {
        let api = ApiClient::new("http://localhost:3000", None);
        assert_eq!(
            api.favorite_url("b7e2c1d0").unwrap().as_str(),
            "http://localhost:3000/api/favorites/b7e2c1d0"
        );
        assert_eq!(
            api.favorite_url("a/b?c#d").unwrap().path(),
            "/api/favorites/a%2Fb%3Fc%23d"
        );
    }

    #[test]
    fn test_favorite_url_keeps_base_path() {
        let api = ApiClient::new("http://example.com/recipes/", None);
        assert_eq!(
            api.favorite_url("x").unwrap().path(),
            "/recipes/api/favorites/x"
        );
    }

    #[tokio::test]
    async fn test_store_without_token_is_unauthorized() {
        let store = HttpFavoriteStore::new(ApiClient::new(DEFAULT_SERVER, None));
        let err = store.list(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized));
    }

    #[test]
    fn test_status_error_maps_to_store_error() {
        let err: StoreError = ApiError::Status {
            status: 500,
            message: "boom".to_string(),
        }
        .into();
        assert!(matches!(err, StoreError::Api { status: 500, .. }));
    }
}
