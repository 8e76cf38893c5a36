//! Remote favorite store abstraction.
//!
//! One row per (user, recipe). Implementations must not create a second row
//! for a recipe id the user has already saved.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::RwLock;
use thiserror::Error;
use uuid::Uuid;

use crate::types::Recipe;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    RequestFailed(String),

    #[error("Store returned error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Not authorized")]
    Unauthorized,

    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

/// Row-per-favorite persistence keyed by user and recipe id.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// All favorites for a user, oldest first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<Recipe>, StoreError>;

    /// Save a favorite. Saving an id the user already has is a no-op.
    async fn insert(&self, user_id: Uuid, recipe: &Recipe) -> Result<(), StoreError>;

    /// Delete the user's favorite with the given recipe id, if any.
    async fn delete(&self, user_id: Uuid, recipe_id: &str) -> Result<(), StoreError>;
}

/// Favorite store backed by a vector, with switchable failures.
#[derive(Debug, Default)]
pub struct InMemoryFavoriteStore {
    rows: RwLock<Vec<(Uuid, Recipe)>>,
    fail: AtomicBool,
    mutations: AtomicUsize,
}

impl InMemoryFavoriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail (or succeed again).
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Number of successful inserts and deletes.
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    /// Total rows across all users.
    pub fn row_count(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::RequestFailed("store unavailable".to_string()));
        }
        Ok(())
    }

    fn poisoned() -> StoreError {
        StoreError::RequestFailed("store lock poisoned".to_string())
    }
}

#[async_trait]
impl FavoriteStore for InMemoryFavoriteStore {
    async fn list(&self, user_id: Uuid) -> Result<Vec<Recipe>, StoreError> {
        self.check()?;
        let rows = self.rows.read().map_err(|_| Self::poisoned())?;
        Ok(rows
            .iter()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, recipe)| recipe.clone())
            .collect())
    }

    async fn insert(&self, user_id: Uuid, recipe: &Recipe) -> Result<(), StoreError> {
        self.check()?;
        let mut rows = self.rows.write().map_err(|_| Self::poisoned())?;
        let exists = rows
            .iter()
            .any(|(owner, r)| *owner == user_id && r.id == recipe.id);
        if !exists {
            rows.push((user_id, recipe.clone()));
        }
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete(&self, user_id: Uuid, recipe_id: &str) -> Result<(), StoreError> {
        self.check()?;
        let mut rows = self.rows.write().map_err(|_| Self::poisoned())?;
        rows.retain(|(owner, r)| !(*owner == user_id && r.id == recipe_id));
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Difficulty;

    fn recipe(id: &str) -> Recipe {
        Recipe {
            id: id.to_string(),
            title: "Soup".to_string(),
            description: String::new(),
            ingredients: vec!["water".to_string()],
            instructions: vec!["boil".to_string()],
            servings: 1,
            prep_time: 0,
            cook_time: 5,
            difficulty: Difficulty::Easy,
            cuisine: "International".to_string(),
            image: None,
        }
    }

    #[tokio::test]
    async fn test_rows_are_per_user() {
        let store = InMemoryFavoriteStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store.insert(alice, &recipe("1")).await.unwrap();
        store.insert(bob, &recipe("2")).await.unwrap();

        let ids: Vec<String> = store.list(alice).await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["1"]);

        store.delete(alice, "2").await.unwrap();
        assert_eq!(store.list(bob).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_insert_keeps_one_row() {
        let store = InMemoryFavoriteStore::new();
        let user = Uuid::new_v4();
        store.insert(user, &recipe("1")).await.unwrap();
        store.insert(user, &recipe("1")).await.unwrap();
        assert_eq!(store.row_count(), 1);
    }

    #[tokio::test]
    async fn test_failing_store() {
        let store = InMemoryFavoriteStore::new();
        store.set_failing(true);
        assert!(store.insert(Uuid::new_v4(), &recipe("1")).await.is_err());
        assert_eq!(store.mutation_count(), 0);
        assert_eq!(store.row_count(), 0);
    }
}
