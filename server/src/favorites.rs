//! Postgres-backed favorite store: one `favorite_recipes` row per saved
//! recipe, with the recipe document kept whole in `recipe_data`.

use async_trait::async_trait;
use diesel::prelude::*;
use recipeready_core::{FavoriteStore, Recipe, StoreError};
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{DbConn, DbPool};
use crate::models::NewFavoriteRecipe;
use crate::schema::favorite_recipes;

pub struct PgFavoriteStore {
    pool: Arc<DbPool>,
}

fn db_error(e: diesel::result::Error) -> StoreError {
    StoreError::RequestFailed(e.to_string())
}

impl PgFavoriteStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConn, StoreError> {
        self.pool
            .get()
            .map_err(|e| StoreError::RequestFailed(e.to_string()))
    }

    /// Save a favorite, returning whether a new row was created.
    ///
    /// The unique index on `(user_id, recipe_data->>'id')` turns a repeat
    /// save into a no-op.
    pub fn insert_new(&self, user_id: Uuid, recipe: &Recipe) -> Result<bool, StoreError> {
        let recipe_data =
            serde_json::to_value(recipe).map_err(|e| StoreError::InvalidData(e.to_string()))?;
        let mut conn = self.conn()?;

        let inserted = diesel::insert_into(favorite_recipes::table)
            .values(&NewFavoriteRecipe {
                user_id,
                recipe_data: &recipe_data,
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .map_err(db_error)?;

        tracing::debug!(user_id = %user_id, recipe_id = %recipe.id, inserted = inserted > 0, "Saved favorite");
        Ok(inserted > 0)
    }

    /// Delete a favorite, returning whether a row was removed.
    pub fn delete_existing(&self, user_id: Uuid, recipe_id: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn()?;

        let deleted = diesel::delete(
            favorite_recipes::table
                .filter(favorite_recipes::user_id.eq(user_id))
                .filter(crate::favorite_recipe_id_eq!(recipe_id)),
        )
        .execute(&mut conn)
        .map_err(db_error)?;

        Ok(deleted > 0)
    }
}

#[async_trait]
impl FavoriteStore for PgFavoriteStore {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Recipe>, StoreError> {
        let mut conn = self.conn()?;

        let rows: Vec<(Uuid, serde_json::Value)> = favorite_recipes::table
            .filter(favorite_recipes::user_id.eq(user_id))
            .order(favorite_recipes::created_at.asc())
            .select((favorite_recipes::id, favorite_recipes::recipe_data))
            .load(&mut conn)
            .map_err(db_error)?;

        // A row another client wrote in a shape we can't read is skipped
        // rather than hiding every other favorite.
        let recipes = rows
            .into_iter()
            .filter_map(|(row_id, data)| match serde_json::from_value::<Recipe>(data) {
                Ok(recipe) => Some(recipe),
                Err(e) => {
                    tracing::warn!(row_id = %row_id, error = %e, "Skipping unreadable favorite");
                    None
                }
            })
            .collect();

        Ok(recipes)
    }

    async fn insert(&self, user_id: Uuid, recipe: &Recipe) -> Result<(), StoreError> {
        self.insert_new(user_id, recipe).map(|_| ())
    }

    async fn delete(&self, user_id: Uuid, recipe_id: &str) -> Result<(), StoreError> {
        self.delete_existing(user_id, recipe_id).map(|_| ())
    }
}
