//! Flat-file persistence for libris.
//!
//! Each collection lives in its own JSON file behind a [`Store`] instance.
//! Saving merges new records into the stored set by unique key, so repeated
//! save cycles never produce duplicate entries.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::book::Book;
use crate::checkout::Checkout;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::user::User;

/// A record type with a unique integer merge key.
pub trait Keyed {
    /// Name of the key field in the stored mapping.
    const KEY_FIELD: &'static str;

    /// The record's unique key value.
    fn key(&self) -> i64;
}

impl Keyed for Book {
    const KEY_FIELD: &'static str = "isbn";

    fn key(&self) -> i64 {
        self.isbn
    }
}

impl Keyed for User {
    const KEY_FIELD: &'static str = "user_id";

    fn key(&self) -> i64 {
        self.user_id
    }
}

impl Keyed for Checkout {
    // One active checkout per ISBN, so the ISBN is the merge key.
    const KEY_FIELD: &'static str = "isbn";

    fn key(&self) -> i64 {
        self.isbn
    }
}

/// A JSON flat-file gateway bound to one collection path.
#[derive(Debug, Clone)]
pub struct Store {
    /// Path to the collection file.
    path: PathBuf,
}

impl Store {
    /// Create a store for the given collection file.
    ///
    /// The file is not touched until the first load or save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the path to the collection file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all records from the collection file.
    ///
    /// A missing or empty file yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreRead`] if the file exists but cannot be read,
    /// or [`Error::StoreDecode`] if it holds malformed JSON.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                warn!("store file not found: {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(Error::StoreRead {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if raw.trim().is_empty() {
            warn!("store file is empty: {}", self.path.display());
            return Ok(Vec::new());
        }

        let records = serde_json::from_str(&raw).map_err(|source| Error::StoreDecode {
            path: self.path.clone(),
            source,
        })?;
        debug!("loaded store file {}", self.path.display());
        Ok(records)
    }

    /// Save records, merging with the stored set by unique key.
    ///
    /// Stored entries whose key matches a new record are overwritten in
    /// place; all other stored entries are preserved, and records with new
    /// keys are appended. Saving the same snapshot twice yields the same
    /// stored content.
    ///
    /// # Errors
    ///
    /// Returns a store error if the existing file cannot be loaded, the
    /// parent directory cannot be created, or the merged set cannot be
    /// written.
    pub fn save<T>(&self, records: &[T]) -> Result<()>
    where
        T: Serialize + DeserializeOwned + Keyed + Clone,
    {
        let mut merged: Vec<T> = self.load()?;
        for record in records {
            match merged.iter().position(|entry| entry.key() == record.key()) {
                Some(index) => merged[index] = record.clone(),
                None => merged.push(record.clone()),
            }
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let json = serde_json::to_string(&merged)?;
        fs::write(&self.path, json).map_err(|source| Error::StoreWrite {
            path: self.path.clone(),
            source,
        })?;

        info!(
            "saved {} records ({} merged by {}) to {}",
            records.len(),
            merged.len(),
            T::KEY_FIELD,
            self.path.display()
        );
        Ok(())
    }
}

/// The three collection gateways, one per flat file.
#[derive(Debug, Clone)]
pub struct Stores {
    /// Gateway for the books collection.
    pub books: Store,
    /// Gateway for the users collection.
    pub users: Store,
    /// Gateway for the checkouts collection.
    pub checkouts: Store,
}

impl Stores {
    /// Create the gateways from resolved configuration paths.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            books: Store::new(config.books_path()),
            users: Store::new(config.users_path()),
            checkouts: Store::new(config.checkouts_path()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("libris_store_{}_{name}.json", std::process::id()))
    }

    fn cleanup(path: &Path) {
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let store = Store::new(test_path("missing"));
        let books: Vec<Book> = store.load().unwrap();
        assert!(books.is_empty());
    }

    #[test]
    fn test_load_empty_file_is_empty() {
        let path = test_path("empty");
        fs::write(&path, "").unwrap();

        let store = Store::new(&path);
        let books: Vec<Book> = store.load().unwrap();
        assert!(books.is_empty());

        cleanup(&path);
    }

    #[test]
    fn test_load_whitespace_file_is_empty() {
        let path = test_path("whitespace");
        fs::write(&path, "  \n\t ").unwrap();

        let store = Store::new(&path);
        let users: Vec<User> = store.load().unwrap();
        assert!(users.is_empty());

        cleanup(&path);
    }

    #[test]
    fn test_load_corrupt_file_is_decode_error() {
        let path = test_path("corrupt");
        fs::write(&path, "{ not json").unwrap();

        let store = Store::new(&path);
        let result: Result<Vec<Book>> = store.load();
        assert!(matches!(result, Err(Error::StoreDecode { .. })));

        cleanup(&path);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = test_path("round_trip");
        let store = Store::new(&path);

        let books = vec![
            Book::new("Dune", "Herbert", 1001),
            Book::new("Emma", "Austen", 1002),
        ];
        store.save(&books).unwrap();

        let loaded: Vec<Book> = store.load().unwrap();
        assert_eq!(loaded, books);

        cleanup(&path);
    }

    #[test]
    fn test_save_merges_by_key() {
        let path = test_path("merge");
        let store = Store::new(&path);

        store
            .save(&[
                Book::new("Dune", "Herbert", 1001),
                Book::new("Emma", "Austen", 1002),
            ])
            .unwrap();

        // Overwrite 1001, add 1003; 1002 must be preserved.
        store
            .save(&[
                Book::new("Dune Messiah", "Herbert", 1001),
                Book::new("Ubik", "Dick", 1003),
            ])
            .unwrap();

        let loaded: Vec<Book> = store.load().unwrap();
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].title, "Dune Messiah");
        assert_eq!(loaded[1].title, "Emma");
        assert_eq!(loaded[2].title, "Ubik");

        cleanup(&path);
    }

    #[test]
    fn test_save_is_idempotent() {
        let path = test_path("idempotent");
        let store = Store::new(&path);
        let users = vec![User::new("Ann", 7), User::new("Ben", 8)];

        store.save(&users).unwrap();
        let first = fs::read_to_string(&path).unwrap();

        store.save(&users).unwrap();
        let second = fs::read_to_string(&path).unwrap();
        assert_eq!(first, second);

        cleanup(&path);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("libris_store_{}_nested", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("deep").join("books.json");

        let store = Store::new(&path);
        store.save(&[Book::new("Dune", "Herbert", 1001)]).unwrap();
        assert!(path.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_save_availability_survives_round_trip() {
        let path = test_path("availability");
        let store = Store::new(&path);

        let mut book = Book::new("Dune", "Herbert", 1001);
        book.available = false;
        store.save(&[book]).unwrap();

        let loaded: Vec<Book> = store.load().unwrap();
        assert!(!loaded[0].available);

        cleanup(&path);
    }

    #[test]
    fn test_checkout_round_trip() {
        let path = test_path("checkouts");
        let store = Store::new(&path);

        let checkouts = vec![Checkout::new(7, 1001)];
        store.save(&checkouts).unwrap();

        let loaded: Vec<Checkout> = store.load().unwrap();
        assert_eq!(loaded, checkouts);

        cleanup(&path);
    }

    #[test]
    fn test_keyed_impls() {
        assert_eq!(Book::new("Dune", "Herbert", 1001).key(), 1001);
        assert_eq!(Book::KEY_FIELD, "isbn");

        assert_eq!(User::new("Ann", 7).key(), 7);
        assert_eq!(User::KEY_FIELD, "user_id");

        assert_eq!(Checkout::new(7, 1001).key(), 1001);
        assert_eq!(Checkout::KEY_FIELD, "isbn");
    }

    #[test]
    fn test_path_accessor() {
        let path = test_path("accessor");
        let store = Store::new(&path);
        assert_eq!(store.path(), path);
    }

    #[test]
    fn test_stores_from_config() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/var/lib/library"));

        let stores = Stores::from_config(&config);
        assert_eq!(stores.books.path(), Path::new("/var/lib/library/books.json"));
        assert_eq!(stores.users.path(), Path::new("/var/lib/library/users.json"));
        assert_eq!(
            stores.checkouts.path(),
            Path::new("/var/lib/library/checkouts.json")
        );
    }

    #[test]
    fn test_save_empty_snapshot_preserves_stored() {
        let path = test_path("empty_snapshot");
        let store = Store::new(&path);

        store.save(&[User::new("Ann", 7)]).unwrap();
        store.save::<User>(&[]).unwrap();

        let loaded: Vec<User> = store.load().unwrap();
        assert_eq!(loaded.len(), 1);

        cleanup(&path);
    }
}
