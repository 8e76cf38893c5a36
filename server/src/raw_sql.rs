//! Raw SQL fragments that can't be expressed in Diesel's type-safe DSL.
//!
//! # Safety
//!
//! User input is ALWAYS passed via `.bind()` parameters. No string
//! concatenation or interpolation with user data.

/// Filter expression matching a stored favorite by its recipe id.
///
/// Compares `favorite_recipes.recipe_data->>'id'`, the same expression the
/// unique index is built on, so lookups and deletes can use it.
///
/// # Safety
/// The recipe id is passed via `.bind()`, not interpolated.
///
/// # Why raw SQL?
/// Diesel has no operator for extracting a JSONB field as text.
#[macro_export]
macro_rules! favorite_recipe_id_eq {
    ($recipe_id:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>("(favorite_recipes.recipe_data->>'id') = ")
            .bind::<diesel::sql_types::Text, _>($recipe_id)
    };
}

/// Case-insensitive email match against `users.email`.
///
/// # Safety
/// The email is passed via `.bind()`, not interpolated.
#[macro_export]
macro_rules! email_matches {
    ($email:expr) => {
        diesel::dsl::sql::<diesel::sql_types::Bool>("LOWER(users.email) = LOWER(")
            .bind::<diesel::sql_types::Text, _>($email)
            .sql(")")
    };
}
