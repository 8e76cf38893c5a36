//! Recipe state coordinator.
//!
//! Single owner of "which recipes exist in this session". It merges the
//! device-local generated list with the signed-in user's remote favorites,
//! and publishes an immutable [`RecipeState`] snapshot after every change.
//!
//! `clear_generated_recipes` filters against the favorites held in memory
//! at call time. If favorites are still loading, favorited recipes can be
//! dropped from the generated list. This matches the reference behavior and
//! is left as is.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::FavoriteError;
use crate::favorites::FavoriteStore;
use crate::storage::GeneratedRecipeCache;
use crate::types::{Recipe, User, RECENT_LIMIT};

/// Snapshot of everything the presentation layer renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeState {
    pub user: Option<User>,
    /// Remote favorites, in store order.
    pub favorites: Vec<Recipe>,
    /// Generated recipes, most recent first.
    pub generated: Vec<Recipe>,
    /// True while favorites are being fetched.
    pub loading: bool,
}

impl RecipeState {
    pub fn is_favorite(&self, recipe_id: &str) -> bool {
        self.favorites.iter().any(|r| r.id == recipe_id)
    }

    /// Favorites then generated recipes, each id once.
    pub fn all_recipes(&self) -> Vec<Recipe> {
        let mut seen = HashSet::new();
        self.favorites
            .iter()
            .chain(self.generated.iter())
            .filter(|r| seen.insert(r.id.as_str()))
            .cloned()
            .collect()
    }

    pub fn find_recipe(&self, recipe_id: &str) -> Option<&Recipe> {
        self.favorites
            .iter()
            .chain(self.generated.iter())
            .find(|r| r.id == recipe_id)
    }

    /// The generated recipes the home screen shows.
    pub fn recent_recipes(&self) -> &[Recipe] {
        &self.generated[..self.generated.len().min(RECENT_LIMIT)]
    }
}

pub struct RecipeCoordinator {
    store: Arc<dyn FavoriteStore>,
    cache: GeneratedRecipeCache,
    state: RecipeState,
    tx: watch::Sender<RecipeState>,
}

impl RecipeCoordinator {
    /// Start a session: load the generated list from local storage.
    /// Nobody is signed in until [`set_user`](Self::set_user) is called.
    pub fn new(store: Arc<dyn FavoriteStore>, cache: GeneratedRecipeCache) -> Self {
        let state = RecipeState {
            generated: cache.load(),
            ..Default::default()
        };
        let (tx, _rx) = watch::channel(state.clone());

        Self {
            store,
            cache,
            state,
            tx,
        }
    }

    /// Current snapshot.
    pub fn state(&self) -> &RecipeState {
        &self.state
    }

    /// Receive a fresh snapshot after every state transition.
    pub fn subscribe(&self) -> watch::Receiver<RecipeState> {
        self.tx.subscribe()
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    pub fn is_favorite(&self, recipe_id: &str) -> bool {
        self.state.is_favorite(recipe_id)
    }

    pub fn all_recipes(&self) -> Vec<Recipe> {
        self.state.all_recipes()
    }

    pub fn find_recipe(&self, recipe_id: &str) -> Option<&Recipe> {
        self.state.find_recipe(recipe_id)
    }

    pub fn recent_recipes(&self) -> &[Recipe] {
        self.state.recent_recipes()
    }

    fn publish(&self) {
        self.tx.send_replace(self.state.clone());
    }

    fn persist_generated(&self) {
        if let Err(e) = self.cache.save(&self.state.generated) {
            tracing::error!(error = %e, "Error storing generated recipes");
        }
    }

    /// React to an identity change (sign-in, sign-out, session restore).
    ///
    /// A different user reloads favorites wholesale; `None` clears them.
    /// Re-announcing the same user changes nothing.
    pub async fn set_user(&mut self, user: Option<User>) -> Result<(), FavoriteError> {
        let unchanged = match (&self.state.user, &user) {
            (Some(current), Some(next)) => current.id == next.id,
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return Ok(());
        }

        self.state.user = user;
        self.state.favorites.clear();

        let Some(user_id) = self.state.user.as_ref().map(|u| u.id) else {
            tracing::debug!("Signed out, favorites cleared");
            self.publish();
            return Ok(());
        };

        self.state.loading = true;
        self.publish();

        let result = self.store.list(user_id).await;
        self.state.loading = false;

        let outcome = match result {
            Ok(favorites) => {
                tracing::debug!(user_id = %user_id, count = favorites.len(), "Loaded favorites");
                self.state.favorites = favorites;
                Ok(())
            }
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Error fetching favorite recipes");
                Err(FavoriteError::LoadFailed(e))
            }
        };

        self.publish();
        outcome
    }

    /// End the session for the current user.
    pub fn sign_out(&mut self) {
        if self.state.user.take().is_some() || !self.state.favorites.is_empty() {
            self.state.favorites.clear();
            self.state.loading = false;
            self.publish();
        }
    }

    /// Prepend a freshly generated recipe and persist the full list.
    /// No dedup: regenerating similar content yields a new entry.
    pub fn add_generated_recipe(&mut self, recipe: Recipe) {
        self.state.generated.insert(0, recipe);
        self.persist_generated();
        self.publish();
    }

    /// Drop every generated recipe that isn't currently a favorite.
    pub fn clear_generated_recipes(&mut self) {
        let favorited: HashSet<&str> = self
            .state
            .favorites
            .iter()
            .map(|r| r.id.as_str())
            .collect();

        let kept: Vec<Recipe> = self
            .state
            .generated
            .iter()
            .filter(|r| favorited.contains(r.id.as_str()))
            .cloned()
            .collect();

        self.state.generated = kept;
        self.persist_generated();
        self.publish();
    }

    /// Drop every generated recipe and erase the stored list.
    pub fn clear_all_generated_recipes(&mut self) {
        self.state.generated.clear();
        if let Err(e) = self.cache.clear() {
            tracing::error!(error = %e, "Error clearing all generated recipes");
        }
        self.publish();
    }

    /// Save a recipe to the signed-in user's favorites.
    ///
    /// The in-memory list only changes after the store confirms.
    pub async fn add_to_favorites(&mut self, recipe: &Recipe) -> Result<(), FavoriteError> {
        let user_id = self
            .state
            .user
            .as_ref()
            .map(|u| u.id)
            .ok_or(FavoriteError::NotSignedIn)?;

        if let Err(e) = self.store.insert(user_id, recipe).await {
            tracing::error!(recipe_id = %recipe.id, error = %e, "Error adding to favorites");
            return Err(FavoriteError::AddFailed(e));
        }

        if !self.state.is_favorite(&recipe.id) {
            self.state.favorites.push(recipe.clone());
        }
        tracing::info!(recipe_id = %recipe.id, "Recipe added to favorites");
        self.publish();
        Ok(())
    }

    /// Remove a favorite. Does nothing when nobody is signed in.
    pub async fn remove_from_favorites(&mut self, recipe_id: &str) -> Result<(), FavoriteError> {
        let Some(user_id) = self.state.user.as_ref().map(|u| u.id) else {
            return Ok(());
        };

        if let Err(e) = self.store.delete(user_id, recipe_id).await {
            tracing::error!(recipe_id = recipe_id, error = %e, "Error removing from favorites");
            return Err(FavoriteError::RemoveFailed(e));
        }

        self.state.favorites.retain(|r| r.id != recipe_id);
        tracing::info!(recipe_id = recipe_id, "Recipe removed from favorites");
        self.publish();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::favorites::InMemoryFavoriteStore;
    use crate::storage::{LocalStorage, MemoryStorage, GENERATED_RECIPES_KEY};
    use crate::types::Difficulty;
    use chrono::Utc;
    use uuid::Uuid;

    fn recipe(id: &str) -> Recipe {
        Recipe {
            id: id.to_string(),
            title: format!("Recipe {}", id),
            description: String::new(),
            ingredients: vec!["rice".to_string()],
            instructions: vec!["cook".to_string()],
            servings: 2,
            prep_time: 5,
            cook_time: 20,
            difficulty: Difficulty::Medium,
            cuisine: "International".to_string(),
            image: None,
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "cook@example.com".to_string(),
            created_at: Utc::now(),
        }
    }

    struct Harness {
        store: Arc<InMemoryFavoriteStore>,
        storage: Arc<MemoryStorage>,
        coordinator: RecipeCoordinator,
    }

    fn harness() -> Harness {
        let store = Arc::new(InMemoryFavoriteStore::new());
        let storage = Arc::new(MemoryStorage::new());
        let coordinator = RecipeCoordinator::new(
            store.clone(),
            GeneratedRecipeCache::new(Box::new(storage.clone())),
        );
        Harness {
            store,
            storage,
            coordinator,
        }
    }

    fn stored_ids(storage: &MemoryStorage) -> Vec<String> {
        let raw = storage.get_item(GENERATED_RECIPES_KEY).unwrap().unwrap();
        let recipes: Vec<Recipe> = serde_json::from_str(&raw).unwrap();
        recipes.into_iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_add_generated_prepends_and_persists() {
        let mut h = harness();
        h.coordinator.add_generated_recipe(recipe("a"));
        h.coordinator.add_generated_recipe(recipe("b"));

        assert_eq!(h.coordinator.state().generated[0].id, "b");
        assert_eq!(stored_ids(&h.storage), vec!["b", "a"]);

        // Storage round-trips into a new session.
        let reloaded = RecipeCoordinator::new(
            h.store.clone(),
            GeneratedRecipeCache::new(Box::new(h.storage.clone())),
        );
        assert_eq!(reloaded.state().generated, h.coordinator.state().generated);
    }

    #[test]
    fn test_add_generated_does_not_dedup() {
        let mut h = harness();
        h.coordinator.add_generated_recipe(recipe("a"));
        h.coordinator.add_generated_recipe(recipe("a"));
        assert_eq!(h.coordinator.state().generated.len(), 2);
    }

    #[tokio::test]
    async fn test_clear_generated_keeps_only_favorites() {
        let mut h = harness();
        h.coordinator.set_user(Some(user())).await.unwrap();
        for id in ["a", "b", "c"] {
            h.coordinator.add_generated_recipe(recipe(id));
        }
        h.coordinator.add_to_favorites(&recipe("b")).await.unwrap();

        h.coordinator.clear_generated_recipes();

        let ids: Vec<&str> = h.coordinator.state().generated.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b"]);
        assert_eq!(stored_ids(&h.storage), vec!["b"]);
    }

    #[tokio::test]
    async fn test_clear_all_ignores_favorites() {
        let mut h = harness();
        h.coordinator.set_user(Some(user())).await.unwrap();
        h.coordinator.add_generated_recipe(recipe("a"));
        h.coordinator.add_to_favorites(&recipe("a")).await.unwrap();

        h.coordinator.clear_all_generated_recipes();

        assert!(h.coordinator.state().generated.is_empty());
        assert!(!h.storage.contains(GENERATED_RECIPES_KEY));
        assert!(h.coordinator.is_favorite("a"));
    }

    #[tokio::test]
    async fn test_add_to_favorites_requires_user() {
        let mut h = harness();
        let err = h.coordinator.add_to_favorites(&recipe("a")).await.unwrap_err();
        assert!(matches!(err, FavoriteError::NotSignedIn));
        assert_eq!(err.user_message(), "Please sign in to save favorites");
        assert_eq!(h.store.mutation_count(), 0);
        assert!(!h.coordinator.is_favorite("a"));
    }

    #[tokio::test]
    async fn test_favorite_then_unfavorite() {
        let mut h = harness();
        h.coordinator.set_user(Some(user())).await.unwrap();

        h.coordinator.add_to_favorites(&recipe("a")).await.unwrap();
        assert!(h.coordinator.is_favorite("a"));

        h.coordinator.remove_from_favorites("a").await.unwrap();
        assert!(!h.coordinator.is_favorite("a"));
        assert_eq!(h.store.row_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_favorite_appears_once() {
        let mut h = harness();
        h.coordinator.set_user(Some(user())).await.unwrap();
        h.coordinator.add_to_favorites(&recipe("a")).await.unwrap();
        h.coordinator.add_to_favorites(&recipe("a")).await.unwrap();
        assert_eq!(h.coordinator.state().favorites.len(), 1);
        assert_eq!(h.store.row_count(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_leaves_state_unchanged() {
        let mut h = harness();
        h.coordinator.set_user(Some(user())).await.unwrap();
        h.coordinator.add_to_favorites(&recipe("a")).await.unwrap();

        h.store.set_failing(true);

        let err = h.coordinator.add_to_favorites(&recipe("b")).await.unwrap_err();
        assert!(matches!(err, FavoriteError::AddFailed(_)));
        assert!(!h.coordinator.is_favorite("b"));

        let err = h.coordinator.remove_from_favorites("a").await.unwrap_err();
        assert_eq!(err.user_message(), "Failed to remove from favorites");
        assert!(h.coordinator.is_favorite("a"));
    }

    #[tokio::test]
    async fn test_remove_without_user_is_silent() {
        let mut h = harness();
        assert!(h.coordinator.remove_from_favorites("a").await.is_ok());
        assert_eq!(h.store.mutation_count(), 0);
    }

    #[tokio::test]
    async fn test_identity_change_reloads_favorites() {
        let mut h = harness();
        let alice = user();
        let bob = user();

        h.store.insert(alice.id, &recipe("alice-1")).await.unwrap();
        h.store.insert(bob.id, &recipe("bob-1")).await.unwrap();

        h.coordinator.set_user(Some(alice.clone())).await.unwrap();
        assert!(h.coordinator.is_favorite("alice-1"));

        h.coordinator.set_user(Some(bob)).await.unwrap();
        assert!(h.coordinator.is_favorite("bob-1"));
        assert!(!h.coordinator.is_favorite("alice-1"));

        h.coordinator.set_user(None).await.unwrap();
        assert!(h.coordinator.state().favorites.is_empty());
        assert!(h.coordinator.user().is_none());
    }

    #[tokio::test]
    async fn test_load_failure_reports_and_leaves_empty() {
        let mut h = harness();
        h.store.set_failing(true);
        let err = h.coordinator.set_user(Some(user())).await.unwrap_err();
        assert_eq!(err.user_message(), "Failed to load favorite recipes");
        assert!(h.coordinator.state().favorites.is_empty());
        assert!(!h.coordinator.state().loading);
        assert!(h.coordinator.user().is_some());
    }

    #[tokio::test]
    async fn test_all_recipes_dedups_by_id() {
        let mut h = harness();
        h.coordinator.set_user(Some(user())).await.unwrap();
        h.coordinator.add_generated_recipe(recipe("a"));
        h.coordinator.add_generated_recipe(recipe("b"));
        h.coordinator.add_to_favorites(&recipe("a")).await.unwrap();

        let ids: Vec<String> = h.coordinator.all_recipes().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(h.coordinator.find_recipe("b").is_some());
        assert!(h.coordinator.find_recipe("zzz").is_none());
    }

    #[test]
    fn test_recent_recipes_capped() {
        let mut h = harness();
        for i in 0..8 {
            h.coordinator.add_generated_recipe(recipe(&i.to_string()));
        }
        let recent = h.coordinator.recent_recipes();
        assert_eq!(recent.len(), RECENT_LIMIT);
        assert_eq!(recent[0].id, "7");
        assert_eq!(h.coordinator.state().generated.len(), 8);
    }

    #[tokio::test]
    async fn test_subscribers_see_snapshots() {
        let mut h = harness();
        let mut rx = h.coordinator.subscribe();

        h.coordinator.add_generated_recipe(recipe("a"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().generated.len(), 1);

        h.coordinator.sign_out();
        assert!(!rx.has_changed().unwrap());
    }
}
