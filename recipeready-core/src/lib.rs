pub mod ai;
pub mod coordinator;
pub mod error;
pub mod favorites;
pub mod filters;
pub mod generate;
pub mod storage;
pub mod types;

pub use coordinator::{RecipeCoordinator, RecipeState};
pub use error::{FavoriteError, GenerateError, EMPTY_INPUT_MESSAGE, GENERATION_FAILED_MESSAGE};
pub use favorites::{FavoriteStore, InMemoryFavoriteStore, StoreError};
pub use filters::{
    CookTime, Cuisine, Dietary, DifficultyFilter, FilterError, HealthProfile, MealType,
    RecipeFilters, SpiceLevel, DEFAULT_SERVINGS, MAX_SERVINGS, MIN_SERVINGS,
};
pub use generate::{parse_recipe_response, RecipeGenerator};
pub use storage::{
    FileStorage, GeneratedRecipeCache, LocalStorage, MemoryStorage, StorageError,
    GENERATED_RECIPES_KEY,
};
pub use types::{Difficulty, Recipe, User, DEFAULT_CUISINE, RECENT_LIMIT};

/// Canned requests offered on the empty home screen.
pub const QUICK_SUGGESTIONS: [&str; 6] = [
    "I have potatoes, make me something delicious",
    "Quick breakfast with eggs",
    "Healthy dinner for weight loss",
    "Spicy Indian curry recipe",
    "Easy pasta for 4 people",
    "Chocolate dessert recipe",
];
