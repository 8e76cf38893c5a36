//! Recipe filters: one closed enum per filter dimension.
//!
//! Every dimension has an `Any` variant meaning "no preference". Tags are the
//! kebab-case strings the home screen sends ("gluten-free", "very-hot").
//! An empty string is accepted as `Any`, since untouched form selects submit
//! nothing else.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MIN_SERVINGS: u32 = 1;
pub const MAX_SERVINGS: u32 = 20;
pub const DEFAULT_SERVINGS: u32 = 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown {dimension} option: {value}")]
    UnknownOption {
        dimension: &'static str,
        value: String,
    },

    #[error("Servings must be between 1 and 20, got {0}")]
    ServingsOutOfRange(u32),
}

/// Declares a filter dimension enum with its tag and prompt label per variant.
macro_rules! filter_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $dimension:literal {
            $($variant:ident => ($tag:literal, $label:literal)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            #[default]
            Any,
            $($variant),+
        }

        impl $name {
            /// Every variant, `Any` first.
            pub const ALL: &'static [$name] = &[$name::Any, $($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $name::Any => "any",
                    $($name::$variant => $tag),+
                }
            }

            /// Human-readable label used in prompts. `None` for `Any`.
            pub fn label(&self) -> Option<&'static str> {
                match self {
                    $name::Any => None,
                    $($name::$variant => Some($label)),+
                }
            }
        }

        impl FromStr for $name {
            type Err = FilterError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    "" | "any" => Ok($name::Any),
                    $($tag => Ok($name::$variant),)+
                    other => Err(FilterError::UnknownOption {
                        dimension: $dimension,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

filter_enum! {
    /// Total time budget.
    CookTime, "cook time" {
        Quick => ("quick", "under 30 minutes"),
        Medium => ("medium", "30 to 60 minutes"),
        Long => ("long", "over 1 hour"),
    }
}

filter_enum! {
    Dietary, "dietary" {
        Vegetarian => ("vegetarian", "vegetarian"),
        Vegan => ("vegan", "vegan"),
        GlutenFree => ("gluten-free", "gluten-free"),
        Keto => ("keto", "keto"),
        Paleo => ("paleo", "paleo"),
        DairyFree => ("dairy-free", "dairy-free"),
        LowCarb => ("low-carb", "low-carb"),
        HighProtein => ("high-protein", "high-protein"),
        LowCalorie => ("low-calorie", "low-calorie"),
        SugarFree => ("sugar-free", "sugar-free"),
    }
}

filter_enum! {
    Cuisine, "cuisine" {
        Italian => ("italian", "Italian"),
        Mexican => ("mexican", "Mexican"),
        Chinese => ("chinese", "Chinese"),
        Indian => ("indian", "Indian"),
        Thai => ("thai", "Thai"),
        Japanese => ("japanese", "Japanese"),
        Korean => ("korean", "Korean"),
        French => ("french", "French"),
        Mediterranean => ("mediterranean", "Mediterranean"),
        American => ("american", "American"),
        Spanish => ("spanish", "Spanish"),
        German => ("german", "German"),
        British => ("british", "British"),
        Turkish => ("turkish", "Turkish"),
        Lebanese => ("lebanese", "Lebanese"),
        Moroccan => ("moroccan", "Moroccan"),
        Brazilian => ("brazilian", "Brazilian"),
        Vietnamese => ("vietnamese", "Vietnamese"),
        Greek => ("greek", "Greek"),
        Russian => ("russian", "Russian"),
    }
}

filter_enum! {
    SpiceLevel, "spice level" {
        Mild => ("mild", "mild"),
        Medium => ("medium", "medium"),
        Hot => ("hot", "hot"),
        VeryHot => ("very-hot", "very hot"),
    }
}

filter_enum! {
    MealType, "meal type" {
        Breakfast => ("breakfast", "breakfast"),
        Brunch => ("brunch", "brunch"),
        Lunch => ("lunch", "lunch"),
        Dinner => ("dinner", "dinner"),
        Snack => ("snack", "snack"),
        Dessert => ("dessert", "dessert"),
        Appetizer => ("appetizer", "appetizer"),
        SideDish => ("side-dish", "side dish"),
    }
}

filter_enum! {
    HealthProfile, "health focus" {
        WeightLoss => ("weight-loss", "weight loss"),
        MuscleGain => ("muscle-gain", "muscle gain"),
        HeartHealthy => ("heart-healthy", "heart healthy"),
        DiabeticFriendly => ("diabetic-friendly", "diabetic friendly"),
        AntiInflammatory => ("anti-inflammatory", "anti-inflammatory"),
        EnergyBoost => ("energy-boost", "energy boost"),
        ImmuneBoost => ("immune-boost", "immune boost"),
    }
}

filter_enum! {
    DifficultyFilter, "difficulty" {
        Easy => ("easy", "easy"),
        Medium => ("medium", "medium"),
        Hard => ("hard", "hard"),
    }
}

/// User-chosen generation preferences.
///
/// Filters are advice for the model, not constraints checked on its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct RecipeFilters {
    pub servings: u32,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub cook_time: CookTime,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub dietary: Dietary,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub cuisine: Cuisine,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub spice_level: SpiceLevel,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub meal_type: MealType,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub health_profile: HealthProfile,
    #[cfg_attr(feature = "openapi", schema(value_type = String))]
    pub difficulty: DifficultyFilter,
}

impl Default for RecipeFilters {
    fn default() -> Self {
        Self {
            servings: DEFAULT_SERVINGS,
            cook_time: CookTime::Any,
            dietary: Dietary::Any,
            cuisine: Cuisine::Any,
            spice_level: SpiceLevel::Any,
            meal_type: MealType::Any,
            health_profile: HealthProfile::Any,
            difficulty: DifficultyFilter::Any,
        }
    }
}

impl RecipeFilters {
    /// Check the constraints enum membership can't express.
    pub fn validate(&self) -> Result<(), FilterError> {
        if !(MIN_SERVINGS..=MAX_SERVINGS).contains(&self.servings) {
            return Err(FilterError::ServingsOutOfRange(self.servings));
        }
        Ok(())
    }

    /// (dimension, label) for every dimension that isn't `Any`, servings first.
    pub fn preferences(&self) -> Vec<(&'static str, String)> {
        let mut prefs = vec![("Servings", self.servings.to_string())];

        let dims: [(&'static str, Option<&'static str>); 7] = [
            ("Cook time", self.cook_time.label()),
            ("Dietary", self.dietary.label()),
            ("Cuisine", self.cuisine.label()),
            ("Spice level", self.spice_level.label()),
            ("Meal type", self.meal_type.label()),
            ("Health focus", self.health_profile.label()),
            ("Difficulty", self.difficulty.label()),
        ];
        prefs.extend(
            dims.into_iter()
                .filter_map(|(name, label)| label.map(|l| (name, l.to_string()))),
        );

        prefs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!("gluten-free".parse::<Dietary>().unwrap(), Dietary::GlutenFree);
        assert_eq!("Very-Hot".parse::<SpiceLevel>().unwrap(), SpiceLevel::VeryHot);
        assert_eq!("".parse::<Cuisine>().unwrap(), Cuisine::Any);
        assert_eq!("any".parse::<MealType>().unwrap(), MealType::Any);
    }

    #[test]
    fn test_unknown_tag_names_dimension() {
        let err = "martian".parse::<Cuisine>().unwrap_err();
        assert_eq!(
            err,
            FilterError::UnknownOption {
                dimension: "cuisine",
                value: "martian".to_string()
            }
        );
        assert_eq!(err.to_string(), "Unknown cuisine option: martian");
    }

    #[test]
    fn test_every_tag_round_trips() {
        for c in Cuisine::ALL {
            assert_eq!(c.as_str().parse::<Cuisine>().unwrap(), *c);
        }
        for d in Dietary::ALL {
            assert_eq!(d.as_str().parse::<Dietary>().unwrap(), *d);
        }
        assert_eq!(Cuisine::ALL.len(), 21);
        assert_eq!(Dietary::ALL.len(), 11);
        assert_eq!(MealType::ALL.len(), 9);
        assert_eq!(HealthProfile::ALL.len(), 8);
    }

    #[test]
    fn test_deserialize_form_payload() {
        let filters: RecipeFilters = serde_json::from_str(
            r#"{"servings":4,"cuisine":"italian","dietary":"vegan","spiceLevel":"","mealType":"any"}"#,
        )
        .unwrap();
        assert_eq!(filters.servings, 4);
        assert_eq!(filters.cuisine, Cuisine::Italian);
        assert_eq!(filters.dietary, Dietary::Vegan);
        assert_eq!(filters.spice_level, SpiceLevel::Any);
        assert_eq!(filters.cook_time, CookTime::Any);
    }

    #[test]
    fn test_deserialize_rejects_unknown_tag() {
        let result = serde_json::from_str::<RecipeFilters>(r#"{"dietary":"carnivore"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_servings() {
        let mut filters = RecipeFilters::default();
        assert!(filters.validate().is_ok());
        filters.servings = 0;
        assert_eq!(filters.validate(), Err(FilterError::ServingsOutOfRange(0)));
        filters.servings = 21;
        assert!(filters.validate().is_err());
    }

    #[test]
    fn test_preferences_skip_any() {
        let filters = RecipeFilters {
            servings: 4,
            cuisine: Cuisine::Italian,
            dietary: Dietary::Vegan,
            ..Default::default()
        };
        let prefs = filters.preferences();
        assert_eq!(
            prefs,
            vec![
                ("Servings", "4".to_string()),
                ("Dietary", "vegan".to_string()),
                ("Cuisine", "Italian".to_string()),
            ]
        );
    }
}
