//! Terminal rendering for recipes.

use recipeready_core::Recipe;
use std::fmt::Write;

/// One line per recipe, for lists.
pub fn format_summary(recipe: &Recipe, favorite: bool) -> String {
    let mut line = format!(
        "{}  {}  ({} min, {} servings, {})",
        recipe.id,
        recipe.title,
        recipe.total_time(),
        recipe.servings,
        recipe.difficulty
    );
    if favorite {
        line.push_str("  ★");
    }
    line
}

/// The full recipe card.
pub fn format_recipe(recipe: &Recipe, favorite: bool) -> String {
    let mut out = String::new();

    let star = if favorite { " ★" } else { "" };
    let _ = writeln!(out, "{}{}", recipe.title, star);
    if !recipe.description.is_empty() {
        let _ = writeln!(out, "{}", recipe.description);
    }
    let _ = writeln!(out);

    let mut meta = vec![
        format!("Prep {} min", recipe.prep_time),
        format!("Cook {} min", recipe.cook_time),
        format!("Total {} min", recipe.total_time()),
        format!("{} servings", recipe.servings),
        recipe.difficulty.to_string(),
    ];
    if recipe.has_specific_cuisine() {
        meta.push(recipe.cuisine.clone());
    }
    let _ = writeln!(out, "{}", meta.join(" · "));
    let _ = writeln!(out);

    let _ = writeln!(out, "Ingredients");
    for ingredient in &recipe.ingredients {
        let _ = writeln!(out, "  • {}", ingredient);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Instructions");
    for (i, step) in recipe.instructions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, step);
    }

    let _ = writeln!(out);
    let _ = write!(out, "id: {}", recipe.id);
    out
}
