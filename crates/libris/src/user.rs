//! User records and the directory that owns them.
//!
//! Mirrors the book catalog, keyed by unique user ID.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A registered library patron.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The patron's name.
    pub name: String,

    /// The patron's ID, unique within a directory.
    pub user_id: i64,
}

impl User {
    /// Create a new user.
    #[must_use]
    pub fn new(name: impl Into<String>, user_id: i64) -> Self {
        Self {
            name: name.into(),
            user_id,
        }
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Name: {}, User ID: {}", self.name, self.user_id)
    }
}

/// The collection of users, keyed by unique user ID.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new user.
    ///
    /// Returns `false` without changing the directory if a user with the
    /// same ID already exists.
    pub fn add(&mut self, name: impl Into<String>, user_id: i64) -> bool {
        if self.find_by_id(user_id).is_some() {
            warn!("duplicate add rejected: a user with ID {user_id} already exists");
            return false;
        }
        let user = User::new(name, user_id);
        info!("user added: {user}");
        self.users.push(user);
        true
    }

    /// Find a user by their ID.
    #[must_use]
    pub fn find_by_id(&self, user_id: i64) -> Option<&User> {
        self.users.iter().find(|user| user.user_id == user_id)
    }

    /// Find users whose name contains the given text, case-insensitively.
    #[must_use]
    pub fn find_by_name(&self, text: &str) -> Vec<&User> {
        let needle = text.to_lowercase();
        self.users
            .iter()
            .filter(|user| user.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Update a user's name.
    ///
    /// Only a provided, non-empty name is applied. Returns `false` if no
    /// user with the given ID exists.
    pub fn update(&mut self, user_id: i64, name: Option<&str>) -> bool {
        let Some(user) = self.users.iter_mut().find(|user| user.user_id == user_id) else {
            warn!("update failed: user ID {user_id} not found");
            return false;
        };
        if let Some(name) = name.filter(|n| !n.is_empty()) {
            user.name = name.to_string();
            info!("user updated: {user}");
        }
        true
    }

    /// Remove a user by their ID.
    pub fn remove(&mut self, user_id: i64) -> bool {
        let Some(index) = self.users.iter().position(|user| user.user_id == user_id) else {
            warn!("remove failed: user ID {user_id} not found");
            return false;
        };
        let user = self.users.remove(index);
        info!("user removed: {user}");
        true
    }

    /// All users in directory order.
    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Number of users in the directory.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Check whether the directory holds no users.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Replace the directory contents with records loaded from storage.
    pub fn hydrate(&mut self, users: Vec<User>) {
        info!("directory hydrated with {} users", users.len());
        self.users = users;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_directory() -> UserDirectory {
        let mut directory = UserDirectory::new();
        assert!(directory.add("Ann", 7));
        assert!(directory.add("Ben", 8));
        directory
    }

    #[test]
    fn test_add_and_find() {
        let directory = sample_directory();
        let user = directory.find_by_id(7).unwrap();
        assert_eq!(user.name, "Ann");
    }

    #[test]
    fn test_add_duplicate_is_noop() {
        let mut directory = sample_directory();
        assert!(!directory.add("Another Ann", 7));

        assert_eq!(directory.len(), 2);
        assert_eq!(directory.find_by_id(7).unwrap().name, "Ann");
    }

    #[test]
    fn test_find_absent_is_none() {
        let directory = sample_directory();
        assert!(directory.find_by_id(99).is_none());
    }

    #[test]
    fn test_find_by_name_case_insensitive() {
        let directory = sample_directory();
        let matches = directory.find_by_name("aNn");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].user_id, 7);
    }

    #[test]
    fn test_find_by_name_no_match() {
        let directory = sample_directory();
        assert!(directory.find_by_name("zelda").is_empty());
    }

    #[test]
    fn test_update_name() {
        let mut directory = sample_directory();
        assert!(directory.update(7, Some("Anna")));
        assert_eq!(directory.find_by_id(7).unwrap().name, "Anna");
    }

    #[test]
    fn test_update_empty_name_keeps_current() {
        let mut directory = sample_directory();
        assert!(directory.update(7, Some("")));
        assert_eq!(directory.find_by_id(7).unwrap().name, "Ann");
    }

    #[test]
    fn test_update_absent() {
        let mut directory = sample_directory();
        assert!(!directory.update(99, Some("Ghost")));
    }

    #[test]
    fn test_remove() {
        let mut directory = sample_directory();
        assert!(directory.remove(7));
        assert!(directory.find_by_id(7).is_none());
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_remove_absent() {
        let mut directory = sample_directory();
        assert!(!directory.remove(99));
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn test_display() {
        let user = User::new("Ann", 7);
        assert_eq!(user.to_string(), "Name: Ann, User ID: 7");
    }

    #[test]
    fn test_serde_round_trip() {
        let user = User::new("Ann", 7);
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();
        assert_eq!(user, back);
    }

    #[test]
    fn test_hydrate_replaces_contents() {
        let mut directory = sample_directory();
        directory.hydrate(vec![User::new("Cleo", 9)]);

        assert_eq!(directory.len(), 1);
        assert!(directory.find_by_id(7).is_none());
        assert!(directory.find_by_id(9).is_some());
    }
}
