//! Shape Store
//!
//! Keeps the ordered collection of saved shapes in a key-value persistent
//! store. Every save rewrites the whole collection under one key.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use landplot_core::interchange::{decode_collection, encode_collection};
use landplot_core::{Shape, ShapeError};
use thiserror::Error;

use crate::config::StorageConfig;

/// Storage errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

/// Durable string storage addressed by key
pub trait PersistentStore: Send {
    /// Read a value; `Ok(None)` when nothing is stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store, used for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the OS-standard data directory
    pub fn in_data_dir() -> Self {
        let dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("landplot");
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl PersistentStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e.to_string())),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| StoreError::Io(e.to_string()))?;

        // Write aside, then swap in
        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, value).map_err(|e| StoreError::Io(e.to_string()))?;
        std::fs::rename(&staging, &path).map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(())
    }
}

/// Ordered, append-only list of saved shapes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeCollection {
    shapes: Vec<Shape>,
}

impl ShapeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn last(&self) -> Option<&Shape> {
        self.shapes.last()
    }

    /// The two most recently saved shapes, older first
    pub fn latest_pair(&self) -> Option<(&Shape, &Shape)> {
        match self.shapes.as_slice() {
            [.., a, b] => Some((a, b)),
            _ => None,
        }
    }

    /// New collection with `shape` appended
    pub fn appended(&self, shape: Shape) -> ShapeCollection {
        let mut shapes = self.shapes.clone();
        shapes.push(shape);
        ShapeCollection { shapes }
    }
}

impl From<Vec<Shape>> for ShapeCollection {
    fn from(shapes: Vec<Shape>) -> Self {
        Self { shapes }
    }
}

/// Default key under which the collection is stored
pub const DEFAULT_STORAGE_KEY: &str = "shapes";

/// Serializes shape collections into a persistent store
pub struct ShapeStore {
    backend: Box<dyn PersistentStore>,
    key: String,
}

impl ShapeStore {
    pub fn new(backend: Box<dyn PersistentStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// In-memory store under the default key
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()), DEFAULT_STORAGE_KEY)
    }

    /// File-backed store as described by the storage configuration
    pub fn from_config(config: &StorageConfig) -> Self {
        let backend = match &config.directory {
            Some(dir) => FileStore::new(dir),
            None => FileStore::in_data_dir(),
        };
        Self::new(Box::new(backend), config.key.clone())
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the saved collection
    ///
    /// Nothing stored yields an empty collection. Content that cannot be
    /// decoded yields `MalformedRecord`.
    pub fn load_all(&self) -> Result<ShapeCollection, StoreError> {
        match self.backend.get(&self.key)? {
            None => Ok(ShapeCollection::new()),
            Some(content) if content.trim().is_empty() => Ok(ShapeCollection::new()),
            Some(content) => Ok(decode_collection(&content)?.into()),
        }
    }

    /// Append `shape` and rewrite the entire stored collection
    ///
    /// On failure nothing is written and `collection` is untouched.
    pub fn append_and_persist(
        &mut self,
        collection: &ShapeCollection,
        shape: Shape,
    ) -> Result<ShapeCollection, StoreError> {
        let next = collection.appended(shape);
        self.replace_all(&next)?;
        Ok(next)
    }

    /// Overwrite the stored collection
    pub fn replace_all(&mut self, collection: &ShapeCollection) -> Result<(), StoreError> {
        let content = encode_collection(collection.shapes())?;
        self.backend.set(&self.key, &content)
    }
}

impl std::fmt::Debug for ShapeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShapeStore").field("key", &self.key).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landplot_core::{GeoPoint, Ring};

    fn block(lat: f64, lng: f64) -> Shape {
        Shape::polygon(
            Ring::new(vec![
                GeoPoint::new(lat, lng),
                GeoPoint::new(lat, lng + 0.001),
                GeoPoint::new(lat + 0.001, lng + 0.001),
                GeoPoint::new(lat + 0.001, lng),
            ])
            .unwrap(),
        )
    }

    /// Store whose writes always fail
    struct ReadOnlyStore;

    impl PersistentStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Ok(None)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Io("read-only".into()))
        }
    }

    #[test]
    fn test_load_empty_store() {
        let store = ShapeStore::in_memory();
        let collection = store.load_all().unwrap();
        assert!(collection.is_empty());
    }

    #[test]
    fn test_append_then_load() {
        let mut store = ShapeStore::in_memory();
        let empty = store.load_all().unwrap();
        let shape = block(19.0, -99.0);

        let saved = store.append_and_persist(&empty, shape.clone()).unwrap();
        assert_eq!(saved.len(), 1);
        assert!(empty.is_empty());

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded.shapes(), &[shape]);
    }

    #[test]
    fn test_append_rewrites_whole_collection() {
        let mut store = ShapeStore::in_memory();
        let first = store
            .append_and_persist(&ShapeCollection::new(), block(19.0, -99.0))
            .unwrap();
        let second = store.append_and_persist(&first, block(20.0, -99.0)).unwrap();

        let loaded = store.load_all().unwrap();
        assert_eq!(loaded, second);
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_failed_write_leaves_collection() {
        let mut store = ShapeStore::new(Box::new(ReadOnlyStore), DEFAULT_STORAGE_KEY);
        let collection = ShapeCollection::from(vec![block(19.0, -99.0)]);
        let result = store.append_and_persist(&collection, block(20.0, -99.0));
        assert!(matches!(result, Err(StoreError::Io(_))));
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_malformed_content() {
        let mut backend = MemoryStore::new();
        backend.set(DEFAULT_STORAGE_KEY, "{ not json").unwrap();
        let store = ShapeStore::new(Box::new(backend), DEFAULT_STORAGE_KEY);
        assert!(matches!(
            store.load_all(),
            Err(StoreError::Shape(ShapeError::MalformedRecord(_)))
        ));
    }

    #[test]
    fn test_latest_pair() {
        let a = block(1.0, 1.0);
        let b = block(2.0, 2.0);
        let c = block(3.0, 3.0);
        assert!(ShapeCollection::from(vec![a.clone()]).latest_pair().is_none());

        let collection = ShapeCollection::from(vec![a, b.clone(), c.clone()]);
        let (older, newer) = collection.latest_pair().unwrap();
        assert_eq!(older, &b);
        assert_eq!(newer, &c);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = FileStore::new(dir.path().join("nested"));
        assert_eq!(files.get("shapes").unwrap(), None);

        files.set("shapes", "[]").unwrap();
        assert_eq!(files.get("shapes").unwrap().as_deref(), Some("[]"));
        files.set("shapes", "[[]]").unwrap();
        assert_eq!(files.get("shapes").unwrap().as_deref(), Some("[[]]"));

        assert!(matches!(
            files.set("../escape", "x"),
            Err(StoreError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_file_backed_shape_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            key: "fields".into(),
            directory: Some(dir.path().to_path_buf()),
        };
        let mut store = ShapeStore::from_config(&config);
        let shape = block(19.0, -99.0);
        store
            .append_and_persist(&ShapeCollection::new(), shape.clone())
            .unwrap();

        let reopened = ShapeStore::from_config(&config);
        assert_eq!(reopened.load_all().unwrap().shapes(), &[shape]);
        assert!(dir.path().join("fields.json").exists());
    }
}
