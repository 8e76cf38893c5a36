//! Device-local persistence for recently generated recipes.
//!
//! Storage is a small string key-value store: [`FileStorage`] keeps one JSON
//! file per key under the data directory, [`MemoryStorage`] is for tests.
//! [`GeneratedRecipeCache`] stores the whole generated list under one key.
//! Persistence here is best-effort: callers log failures and carry on with
//! in-memory state.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;
use thiserror::Error;

use crate::types::Recipe;

/// Key holding the JSON-serialized generated-recipe list.
pub const GENERATED_RECIPES_KEY: &str = "generated-recipes";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// A string key-value store that outlives the process.
pub trait LocalStorage: Send + Sync {
    /// `Ok(None)` when the key was never written or has been removed.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// File-per-key storage under a directory.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Get the default data directory: ~/.recipeready
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".recipeready"))
            .unwrap_or_else(|| PathBuf::from("data/recipeready"))
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;

        // Write-then-rename so a crash never leaves half a file behind.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items
            .read()
            .map(|items| items.contains_key(key))
            .unwrap_or(false)
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.read().map_err(|_| StorageError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().map_err(|_| StorageError::Poisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().map_err(|_| StorageError::Poisoned)?;
        items.remove(key);
        Ok(())
    }
}

impl<T: LocalStorage + ?Sized> LocalStorage for std::sync::Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// The generated-recipe list, most recent first, stored under
/// [`GENERATED_RECIPES_KEY`].
pub struct GeneratedRecipeCache {
    storage: Box<dyn LocalStorage>,
}

impl GeneratedRecipeCache {
    pub fn new(storage: Box<dyn LocalStorage>) -> Self {
        Self { storage }
    }

    /// Load the stored list. A missing key is an empty list; so is corrupt
    /// content, which is logged and otherwise ignored.
    pub fn load(&self) -> Vec<Recipe> {
        let raw = match self.storage.get_item(GENERATED_RECIPES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::error!(error = %e, "Error loading stored recipes");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(recipes) => recipes,
            Err(e) => {
                tracing::error!(error = %e, "Stored recipes are corrupt, starting empty");
                Vec::new()
            }
        }
    }

    /// Persist the full list, replacing whatever was stored.
    pub fn save(&self, recipes: &[Recipe]) -> Result<(), StorageError> {
        let json = serde_json::to_string(recipes)?;
        self.storage.set_item(GENERATED_RECIPES_KEY, &json)
    }

    /// Erase the stored entry.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(GENERATED_RECIPES_KEY)
    }

    /// Whether anything is stored at all (distinct from an empty list).
    pub fn is_stored(&self) -> bool {
        matches!(self.storage.get_item(GENERATED_RECIPES_KEY), Ok(Some(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Difficulty;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn recipe(id: &str) -> Recipe {
        Recipe {
            id: id.to_string(),
            title: format!("Recipe {}", id),
            description: String::new(),
            ingredients: vec!["salt".to_string()],
            instructions: vec!["season".to_string()],
            servings: 2,
            prep_time: 5,
            cook_time: 10,
            difficulty: Difficulty::Easy,
            cuisine: "International".to_string(),
            image: None,
        }
    }

    #[test]
    fn test_file_storage_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path().join("nested"));

        assert_eq!(storage.get_item("k").unwrap(), None);
        storage.set_item("k", "v1").unwrap();
        storage.set_item("k", "v2").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), Some("v2".to_string()));

        storage.remove_item("k").unwrap();
        assert_eq!(storage.get_item("k").unwrap(), None);
        storage.remove_item("k").unwrap();
    }

    #[test]
    fn test_file_storage_rejects_path_keys() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        assert!(matches!(
            storage.set_item("../escape", "x"),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(storage.get_item("").is_err());
    }

    #[test]
    fn test_cache_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let cache = GeneratedRecipeCache::new(Box::new(FileStorage::new(temp_dir.path())));

        assert!(cache.load().is_empty());
        assert!(!cache.is_stored());

        let recipes = vec![recipe("b"), recipe("a")];
        cache.save(&recipes).unwrap();
        assert_eq!(cache.load(), recipes);

        cache.clear().unwrap();
        assert!(!cache.is_stored());
        assert!(cache.load().is_empty());
    }

    #[test]
    fn test_corrupt_cache_loads_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set_item(GENERATED_RECIPES_KEY, "{not json")
            .unwrap();

        let cache = GeneratedRecipeCache::new(Box::new(storage.clone()));
        assert!(cache.load().is_empty());
        // Corrupt content is left alone until the next save.
        assert!(storage.contains(GENERATED_RECIPES_KEY));
    }
}
