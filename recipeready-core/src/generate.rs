//! Recipe generation: free text + filters in, normalized [`Recipe`] out.

use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::ai::prompts::{
    render_generate_recipe_system_prompt, render_generate_recipe_user_prompt,
    GENERATE_RECIPE_PROMPT_NAME,
};
use crate::ai::{AiClient, ChatMessage, ChatRequest};
use crate::error::GenerateError;
use crate::filters::RecipeFilters;
use crate::types::{Difficulty, Recipe, DEFAULT_CUISINE};

/// Turns a request into a recipe with one model call.
///
/// There is no retry: a failed call is reported and the user resubmits.
pub struct RecipeGenerator {
    client: Arc<dyn AiClient>,
}

impl RecipeGenerator {
    pub fn new(client: Arc<dyn AiClient>) -> Self {
        Self { client }
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    /// Generate a recipe. Blank input is rejected before any model call.
    ///
    /// The returned recipe always has a fresh id.
    pub async fn generate(
        &self,
        input: &str,
        filters: &RecipeFilters,
    ) -> Result<Recipe, GenerateError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(GenerateError::EmptyInput);
        }
        filters.validate()?;

        let request = ChatRequest {
            messages: vec![
                ChatMessage::system(render_generate_recipe_system_prompt()),
                ChatMessage::user(render_generate_recipe_user_prompt(input, filters)),
            ],
            max_tokens: Some(2048),
            temperature: Some(0.7),
            json_response: true,
        };

        let response = self
            .client
            .complete(GENERATE_RECIPE_PROMPT_NAME, request)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, model = self.client.model_name(), "Recipe generation request failed");
                GenerateError::from(e)
            })?;

        let recipe = parse_recipe_response(&response.content, filters.servings).map_err(|e| {
            tracing::error!(error = %e, "Could not parse generated recipe");
            e
        })?;

        tracing::info!(
            recipe_id = %recipe.id,
            title = %recipe.title,
            total_tokens = response.usage.total_tokens,
            "Generated recipe"
        );

        Ok(recipe)
    }
}

/// Shape the model is asked to produce. Everything is optional so missing
/// fields can be defaulted instead of failing the whole parse.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipeDraft {
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    ingredients: Vec<Value>,
    #[serde(default, alias = "steps")]
    instructions: Vec<Value>,
    #[serde(default)]
    servings: Option<Value>,
    #[serde(default, alias = "prep_time")]
    prep_time: Option<Value>,
    #[serde(default, alias = "cook_time")]
    cook_time: Option<Value>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    cuisine: Option<String>,
    #[serde(default)]
    image: Option<String>,
}

/// Parse model output into a recipe with a fresh id.
///
/// `requested_servings` fills in when the model omits servings; when the
/// model does report servings, its value wins.
pub fn parse_recipe_response(
    content: &str,
    requested_servings: u32,
) -> Result<Recipe, GenerateError> {
    let draft: RecipeDraft = serde_json::from_value(first_json_object(content)?)
        .map_err(|e| GenerateError::Parse(e.to_string()))?;

    let title = draft
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| GenerateError::Parse("Missing title".to_string()))?;

    let ingredients = text_list(&draft.ingredients);
    if ingredients.is_empty() {
        return Err(GenerateError::Parse("Missing ingredients".to_string()));
    }

    let instructions = text_list(&draft.instructions);
    if instructions.is_empty() {
        return Err(GenerateError::Parse("Missing instructions".to_string()));
    }

    let servings = draft
        .servings
        .as_ref()
        .and_then(parse_number)
        .unwrap_or(requested_servings)
        .max(1);

    let difficulty = draft
        .difficulty
        .as_deref()
        .and_then(Difficulty::parse_lenient)
        .unwrap_or_default();

    let cuisine = draft
        .cuisine
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CUISINE.to_string());

    Ok(Recipe {
        id: Uuid::new_v4().to_string(),
        title,
        description: draft.description.unwrap_or_default().trim().to_string(),
        ingredients,
        instructions,
        servings,
        prep_time: draft.prep_time.as_ref().and_then(parse_minutes).unwrap_or(0),
        cook_time: draft.cook_time.as_ref().and_then(parse_minutes).unwrap_or(0),
        difficulty,
        cuisine,
        image: draft.image.filter(|i| !i.trim().is_empty()),
    })
}

/// First JSON object in the reply, ignoring code fences and chatter on
/// either side of it.
fn first_json_object(content: &str) -> Result<Value, GenerateError> {
    let mut first_error = None;
    for (start, _) in content.match_indices('{') {
        let mut values = serde_json::Deserializer::from_str(&content[start..]).into_iter::<Value>();
        match values.next() {
            Some(Ok(value @ Value::Object(_))) => return Ok(value),
            Some(Err(e)) if first_error.is_none() => first_error = Some(e.to_string()),
            _ => {}
        }
    }
    Err(GenerateError::Parse(
        first_error.unwrap_or_else(|| "No JSON object in response".to_string()),
    ))
}

/// Flatten a list the model may have written as strings or small objects.
fn text_list(values: &[Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::Object(map) => {
                let parts: Vec<String> = ["amount", "quantity", "unit", "item", "name", "text", "step"]
                    .iter()
                    .filter_map(|key| match map.get(*key) {
                        Some(Value::String(s)) => Some(s.trim().to_string()),
                        Some(Value::Number(n)) => Some(n.to_string()),
                        _ => None,
                    })
                    .filter(|s| !s.is_empty())
                    .collect();
                Some(parts.join(" "))
            }
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Leading non-negative integer of a number or string ("4", 4, "4 people").
fn parse_number(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => {
            let digits: String = s
                .trim()
                .chars()
                .skip_while(|c| !c.is_ascii_digit())
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        }
        _ => None,
    }
}

/// Minutes from a number or a duration string.
///
/// Every number+unit pair is summed, so "1 hour 30 minutes", "1.5 hours",
/// "1 hr 15 min" and "PT1H30M" all work. A bare number counts as minutes.
/// For ranges ("10-15 minutes", "1 to 2 hours") the upper bound wins.
fn parse_minutes(value: &Value) -> Option<u32> {
    match value {
        Value::String(s) => {
            let minutes = parse_duration(s);
            if minutes.is_none() && !s.trim().is_empty() {
                tracing::warn!(value = %s, "Unreadable recipe time, using 0");
            }
            minutes
        }
        other => parse_number(other),
    }
}

fn parse_duration(text: &str) -> Option<u32> {
    let lower = text.to_ascii_lowercase();
    let mut rest = lower.as_str();
    let mut total = 0.0_f64;
    let mut found = false;

    while let Some(start) = rest.find(|c: char| c.is_ascii_digit()) {
        rest = &rest[start..];
        let end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let amount: f64 = rest[..end].trim_end_matches('.').parse().ok()?;
        rest = rest[end..].trim_start();

        // Lower bound of a range; the next number carries the unit.
        if rest.starts_with('-') || rest.starts_with("to ") {
            continue;
        }

        let unit_end = rest
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(rest.len());
        let unit = &rest[..unit_end];
        rest = &rest[unit_end..];

        let factor = if unit.starts_with('h') {
            60.0
        } else if unit.starts_with('d') {
            24.0 * 60.0
        } else if unit == "s" || unit.starts_with("sec") {
            1.0 / 60.0
        } else {
            1.0
        };
        total += amount * factor;
        found = true;
    }

    if !found || !total.is_finite() {
        return None;
    }
    // Float-to-int casts saturate.
    Some(total.round() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{FakeAiClient, SAMPLE_RECIPE_JSON};
    use crate::error::{EMPTY_INPUT_MESSAGE, GENERATION_FAILED_MESSAGE};
    use crate::filters::{Cuisine, Dietary};

    fn generator(client: Arc<FakeAiClient>) -> RecipeGenerator {
        RecipeGenerator::new(client)
    }

    #[tokio::test]
    async fn test_blank_input_never_calls_model() {
        let client = Arc::new(FakeAiClient::with_sample_recipe());
        let generator = generator(client.clone());

        for input in ["", "   ", "\n\t"] {
            let err = generator
                .generate(input, &RecipeFilters::default())
                .await
                .unwrap_err();
            assert!(matches!(err, GenerateError::EmptyInput));
            assert!(err.is_validation());
            assert_eq!(err.user_message(), EMPTY_INPUT_MESSAGE);
        }
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_servings_never_calls_model() {
        let client = Arc::new(FakeAiClient::with_sample_recipe());
        let filters = RecipeFilters {
            servings: 50,
            ..Default::default()
        };
        let err = generator(client.clone())
            .generate("soup", &filters)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::InvalidFilters(_)));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generate_sample_recipe() {
        let client = Arc::new(FakeAiClient::with_sample_recipe());
        let recipe = generator(client)
            .generate("I have potatoes", &RecipeFilters::default())
            .await
            .unwrap();

        assert_eq!(recipe.title, "Garlic Butter Potatoes");
        assert!(recipe.servings >= 1);
        assert_eq!(recipe.total_time(), 45);
        assert!(Difficulty::ALL.contains(&recipe.difficulty));
        assert!(Uuid::parse_str(&recipe.id).is_ok());
    }

    #[tokio::test]
    async fn test_each_generation_gets_fresh_id() {
        let client = Arc::new(FakeAiClient::with_sample_recipe());
        let generator = generator(client);
        let a = generator.generate("potatoes", &RecipeFilters::default()).await.unwrap();
        let b = generator.generate("potatoes", &RecipeFilters::default()).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_filters_reach_prompt_and_model_servings_win() {
        let client = Arc::new(FakeAiClient::with_sample_recipe());
        let filters = RecipeFilters {
            servings: 4,
            cuisine: Cuisine::Italian,
            dietary: Dietary::Vegan,
            ..Default::default()
        };

        let recipe = generator(client.clone())
            .generate("pasta with tomatoes", &filters)
            .await
            .unwrap();

        let prompt = client.requests()[0].prompt_text();
        assert!(prompt.contains("pasta with tomatoes"));
        assert!(prompt.contains("Servings: 4"));
        assert!(prompt.contains("Cuisine: Italian"));
        assert!(prompt.contains("Dietary: vegan"));
        assert!(client.requests()[0].json_response);

        // The sample says 2 servings; filters are advice, not post-hoc constraints.
        assert_eq!(recipe.servings, 2);
    }

    #[tokio::test]
    async fn test_api_failure_is_generic_for_user() {
        let client = Arc::new(FakeAiClient::new());
        let err = generator(client)
            .generate("soup", &RecipeFilters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Ai(_)));
        assert_eq!(err.user_message(), GENERATION_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn test_unparseable_output_is_generic_for_user() {
        let client = Arc::new(FakeAiClient::new().with_default_response("Sorry, I can't cook."));
        let err = generator(client)
            .generate("soup", &RecipeFilters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateError::Parse(_)));
        assert_eq!(err.user_message(), GENERATION_FAILED_MESSAGE);
    }

    #[test]
    fn test_parse_fenced_json() {
        let content = format!("Here you go!\n```json\n{}\n```", SAMPLE_RECIPE_JSON);
        let recipe = parse_recipe_response(&content, 2).unwrap();
        assert_eq!(recipe.ingredients.len(), 5);
        assert_eq!(recipe.instructions.len(), 5);
    }

    #[test]
    fn test_parse_defaults_missing_fields() {
        let recipe = parse_recipe_response(
            r#"{"title":"Toast","ingredients":["bread"],"steps":["toast it"]}"#,
            3,
        )
        .unwrap();
        assert_eq!(recipe.servings, 3);
        assert_eq!(recipe.prep_time, 0);
        assert_eq!(recipe.cook_time, 0);
        assert_eq!(recipe.difficulty, Difficulty::Medium);
        assert_eq!(recipe.cuisine, DEFAULT_CUISINE);
        assert_eq!(recipe.instructions, vec!["toast it"]);
    }

    #[test]
    fn test_parse_lenient_numbers() {
        let recipe = parse_recipe_response(
            r#"{"title":"Stew","ingredients":[{"amount":"2","unit":"cups","item":"beans"}],
                "instructions":["simmer"],"servings":"6 people","prepTime":"15 minutes",
                "cookTime":"2 hours","difficulty":"Hard","cuisine":"  "}"#,
            2,
        )
        .unwrap();
        assert_eq!(recipe.servings, 6);
        assert_eq!(recipe.prep_time, 15);
        assert_eq!(recipe.cook_time, 120);
        assert_eq!(recipe.difficulty, Difficulty::Hard);
        assert_eq!(recipe.cuisine, DEFAULT_CUISINE);
        assert_eq!(recipe.ingredients, vec!["2 cups beans"]);
    }

    #[test]
    fn test_parse_compound_durations() {
        let minutes = |s: &str| parse_minutes(&Value::String(s.to_string()));
        assert_eq!(minutes("1 hour 30 minutes"), Some(90));
        assert_eq!(minutes("1.5 hours"), Some(90));
        assert_eq!(minutes("1 hr 15 min"), Some(75));
        assert_eq!(minutes("PT1H30M"), Some(90));
        assert_eq!(minutes("1h30"), Some(90));
        assert_eq!(minutes("10-15 minutes"), Some(15));
        assert_eq!(minutes("1 to 2 hours"), Some(120));
        assert_eq!(minutes("45"), Some(45));
        assert_eq!(minutes("about an hour"), None);
        assert_eq!(minutes(""), None);
    }

    #[test]
    fn test_parse_hours_and_minutes_in_reply() {
        let recipe = parse_recipe_response(
            r#"{"title":"Roast","ingredients":["lamb"],"instructions":["roast"],
                "prepTime":"1 hour 30 minutes","cookTime":"1.5 hours"}"#,
            2,
        )
        .unwrap();
        assert_eq!(recipe.prep_time, 90);
        assert_eq!(recipe.cook_time, 90);
    }

    #[test]
    fn test_parse_ignores_braces_after_object() {
        let content = format!("{}\n\nEnjoy :}}", SAMPLE_RECIPE_JSON);
        let recipe = parse_recipe_response(&content, 2).unwrap();
        assert_eq!(recipe.title, "Garlic Butter Potatoes");
    }

    #[test]
    fn test_parse_skips_braces_in_leading_prose() {
        let content = format!("Swap {{butter}} for oil if you like.\n{}", SAMPLE_RECIPE_JSON);
        let recipe = parse_recipe_response(&content, 2).unwrap();
        assert_eq!(recipe.title, "Garlic Butter Potatoes");
    }

    #[test]
    fn test_parse_zero_servings_clamped() {
        let recipe = parse_recipe_response(
            r#"{"title":"Tea","ingredients":["tea"],"instructions":["steep"],"servings":0}"#,
            2,
        )
        .unwrap();
        assert_eq!(recipe.servings, 1);
    }

    #[test]
    fn test_parse_requires_title_ingredients_instructions() {
        assert!(parse_recipe_response(r#"{"ingredients":["a"],"instructions":["b"]}"#, 2).is_err());
        assert!(parse_recipe_response(r#"{"title":"A","instructions":["b"]}"#, 2).is_err());
        assert!(parse_recipe_response(r#"{"title":"A","ingredients":["a"]}"#, 2).is_err());
    }

    #[test]
    fn test_model_id_is_replaced() {
        let recipe = parse_recipe_response(
            r#"{"id":"model-id","title":"A","ingredients":["a"],"instructions":["b"]}"#,
            2,
        )
        .unwrap();
        assert_ne!(recipe.id, "model-id");
    }
}
