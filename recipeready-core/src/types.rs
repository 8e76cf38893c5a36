use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cuisine label used when the model doesn't name one.
pub const DEFAULT_CUISINE: &str = "International";

/// How many generated recipes the home screen shows.
pub const RECENT_LIMIT: usize = 5;

/// How hard a recipe is to cook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: &'static [Difficulty] = &[Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Lenient parse for model output ("Easy", " hard ").
    pub fn parse_lenient(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "beginner" | "simple" => Some(Difficulty::Easy),
            "medium" | "intermediate" | "moderate" => Some(Difficulty::Medium),
            "hard" | "advanced" | "difficult" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated recipe.
///
/// Recipes are values: once generated they are never edited, only copied
/// between the generated list and the favorites list. Field names are
/// camelCase on the wire so stored favorite documents stay readable by
/// other clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub servings: u32,
    #[serde(default)]
    pub prep_time: u32,
    #[serde(default)]
    pub cook_time: u32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_cuisine")]
    pub cuisine: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

fn default_cuisine() -> String {
    DEFAULT_CUISINE.to_string()
}

impl Recipe {
    /// Prep plus cook time, in minutes.
    pub fn total_time(&self) -> u32 {
        self.prep_time.saturating_add(self.cook_time)
    }

    /// Whether the cuisine is worth showing (everything defaults to "International").
    pub fn has_specific_cuisine(&self) -> bool {
        !self.cuisine.is_empty() && self.cuisine != DEFAULT_CUISINE
    }
}

/// The signed-in account, as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
