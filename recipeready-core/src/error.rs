use thiserror::Error;

use crate::ai::AiError;
use crate::favorites::StoreError;
use crate::filters::FilterError;

/// Shown when the request text is blank.
pub const EMPTY_INPUT_MESSAGE: &str =
    "Please tell me what you want to cook or what ingredients you have";

/// Shown for every generation failure that isn't a validation error.
pub const GENERATION_FAILED_MESSAGE: &str = "Couldn't create your recipe. Please try again!";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("Request text is empty")]
    EmptyInput,

    #[error("Invalid filters: {0}")]
    InvalidFilters(#[from] FilterError),

    #[error("AI request failed: {0}")]
    Ai(#[from] AiError),

    #[error("Failed to parse recipe: {0}")]
    Parse(String),
}

impl GenerateError {
    /// Whether the caller can fix this by changing the input.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GenerateError::EmptyInput | GenerateError::InvalidFilters(_)
        )
    }

    /// Message for the person at the keyboard. API and parse failures are
    /// deliberately indistinguishable here.
    pub fn user_message(&self) -> String {
        match self {
            GenerateError::EmptyInput => EMPTY_INPUT_MESSAGE.to_string(),
            GenerateError::InvalidFilters(e) => e.to_string(),
            GenerateError::Ai(_) | GenerateError::Parse(_) => {
                GENERATION_FAILED_MESSAGE.to_string()
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum FavoriteError {
    #[error("Not signed in")]
    NotSignedIn,

    #[error("Failed to add favorite: {0}")]
    AddFailed(StoreError),

    #[error("Failed to remove favorite: {0}")]
    RemoveFailed(StoreError),

    #[error("Failed to load favorites: {0}")]
    LoadFailed(StoreError),
}

impl FavoriteError {
    pub fn user_message(&self) -> &'static str {
        match self {
            FavoriteError::NotSignedIn => "Please sign in to save favorites",
            FavoriteError::AddFailed(_) => "Failed to add to favorites",
            FavoriteError::RemoveFailed(_) => "Failed to remove from favorites",
            FavoriteError::LoadFailed(_) => "Failed to load favorite recipes",
        }
    }
}
