//! Book records and the catalog that owns them.
//!
//! The catalog is an insertion-ordered collection with a unique-ISBN
//! invariant. Duplicate adds and lookups of absent ISBNs are normal outcomes,
//! not errors.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A single book in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// The title of the book.
    pub title: String,

    /// The author of the book.
    pub author: String,

    /// The ISBN, unique within a catalog.
    pub isbn: i64,

    /// Whether the book may currently be checked out.
    ///
    /// Mutated only by the checkout ledger; stored records without the field
    /// are treated as available.
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

impl Book {
    /// Create a new, available book.
    #[must_use]
    pub fn new(title: impl Into<String>, author: impl Into<String>, isbn: i64) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn,
            available: true,
        }
    }

    /// Human-readable availability status.
    #[must_use]
    pub fn status(&self) -> &'static str {
        if self.available {
            "Available"
        } else {
            "Checked Out"
        }
    }
}

impl std::fmt::Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Title: {}, Author: {}, ISBN: {}, Status: {}",
            self.title,
            self.author,
            self.isbn,
            self.status()
        )
    }
}

/// The collection of books, keyed by unique ISBN.
///
/// Insertion order is preserved and used as display order.
#[derive(Debug, Default)]
pub struct BookCatalog {
    books: Vec<Book>,
}

impl BookCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new book.
    ///
    /// Returns `false` without changing the catalog if a book with the same
    /// ISBN already exists; the duplicate add is a conflict, not an error.
    pub fn add(&mut self, title: impl Into<String>, author: impl Into<String>, isbn: i64) -> bool {
        if self.find_by_isbn(isbn).is_some() {
            warn!("duplicate add rejected: a book with ISBN {isbn} already exists");
            return false;
        }
        let book = Book::new(title, author, isbn);
        info!("book added: {book}");
        self.books.push(book);
        true
    }

    /// Find a book by its ISBN.
    #[must_use]
    pub fn find_by_isbn(&self, isbn: i64) -> Option<&Book> {
        self.books.iter().find(|book| book.isbn == isbn)
    }

    /// Find books whose title contains the given text, case-insensitively.
    ///
    /// Results are in catalog order; no match yields an empty list.
    #[must_use]
    pub fn find_by_title(&self, text: &str) -> Vec<&Book> {
        let needle = text.to_lowercase();
        self.books
            .iter()
            .filter(|book| book.title.to_lowercase().contains(&needle))
            .collect()
    }

    /// Find books whose author contains the given text, case-insensitively.
    #[must_use]
    pub fn find_by_author(&self, text: &str) -> Vec<&Book> {
        let needle = text.to_lowercase();
        self.books
            .iter()
            .filter(|book| book.author.to_lowercase().contains(&needle))
            .collect()
    }

    /// Update a book's title and/or author.
    ///
    /// Only provided, non-empty fields are applied. Returns `false` if no
    /// book with the given ISBN exists.
    pub fn update(&mut self, isbn: i64, title: Option<&str>, author: Option<&str>) -> bool {
        let Some(book) = self.books.iter_mut().find(|book| book.isbn == isbn) else {
            warn!("update failed: ISBN {isbn} not found");
            return false;
        };
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            book.title = title.to_string();
        }
        if let Some(author) = author.filter(|a| !a.is_empty()) {
            book.author = author.to_string();
        }
        info!("book updated: {book}");
        true
    }

    /// Remove a book by its ISBN.
    ///
    /// Returns `false` if no book with the given ISBN exists.
    pub fn remove(&mut self, isbn: i64) -> bool {
        let Some(index) = self.books.iter().position(|book| book.isbn == isbn) else {
            warn!("remove failed: ISBN {isbn} not found");
            return false;
        };
        let book = self.books.remove(index);
        info!("book removed: {book}");
        true
    }

    /// Set the availability flag of a book.
    ///
    /// Invoked by the checkout ledger to keep the cached flag consistent
    /// with ledger membership. Returns `false` if the ISBN is unknown.
    pub(crate) fn set_availability(&mut self, isbn: i64, available: bool) -> bool {
        match self.books.iter_mut().find(|book| book.isbn == isbn) {
            Some(book) => {
                book.available = available;
                true
            }
            None => false,
        }
    }

    /// All books in catalog order.
    #[must_use]
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Number of books in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Check whether the catalog holds no books.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Replace the catalog contents with records loaded from storage.
    pub fn hydrate(&mut self, books: Vec<Book>) {
        info!("catalog hydrated with {} books", books.len());
        self.books = books;
    }
}
