//! Checkout records and the ledger of active loans.
//!
//! The ledger is the single source of truth for "is this book out". A book's
//! `available` flag is a cached view of ledger membership, kept consistent by
//! writing it through the catalog on every successful checkout and return.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::book::BookCatalog;
use crate::user::UserDirectory;

/// An active loan linking a user to a book.
///
/// No return history is kept; returning a book deletes its record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkout {
    /// ID of the user holding the book.
    pub user_id: i64,

    /// ISBN of the checked-out book.
    pub isbn: i64,
}

impl Checkout {
    /// Create a new checkout record.
    #[must_use]
    pub fn new(user_id: i64, isbn: i64) -> Self {
        Self { user_id, isbn }
    }
}

impl std::fmt::Display for Checkout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "User ID: {}, ISBN: {}", self.user_id, self.isbn)
    }
}

/// The result of a checkout attempt.
///
/// All failure cases are normal outcomes the caller reports to the user;
/// none of them mutate any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum CheckoutOutcome {
    /// The loan was recorded and the book marked unavailable.
    Success,
    /// No user with the given ID exists in the directory.
    UnknownUser,
    /// No book with the given ISBN exists in the catalog.
    UnknownBook,
    /// The book exists but is already checked out.
    Unavailable,
}

impl CheckoutOutcome {
    /// Check if the checkout succeeded.
    #[must_use]
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// The collection of active checkouts.
///
/// Validates references against the catalog and directory supplied to each
/// operation; the exclusive borrows make the whole check-then-mutate
/// sequence atomic.
#[derive(Debug, Default)]
pub struct CheckoutLedger {
    checkouts: Vec<Checkout>,
}

impl CheckoutLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a book is currently checked out.
    ///
    /// Ledger membership is the authoritative answer, independent of the
    /// book's cached `available` flag.
    #[must_use]
    pub fn is_checked_out(&self, isbn: i64) -> bool {
        self.checkouts.iter().any(|checkout| checkout.isbn == isbn)
    }

    /// Check out a book to a user.
    ///
    /// The user must exist in the directory, the book must exist in the
    /// catalog, and the book's `available` flag must be set. On success the
    /// loan is recorded and the flag cleared through the catalog.
    pub fn checkout(
        &mut self,
        user_id: i64,
        isbn: i64,
        directory: &UserDirectory,
        catalog: &mut BookCatalog,
    ) -> CheckoutOutcome {
        if directory.find_by_id(user_id).is_none() {
            warn!("checkout failed: no user with ID {user_id}");
            return CheckoutOutcome::UnknownUser;
        }
        let Some(book) = catalog.find_by_isbn(isbn) else {
            warn!("checkout failed: no book with ISBN {isbn}");
            return CheckoutOutcome::UnknownBook;
        };
        if !book.available {
            warn!("checkout failed: book with ISBN {isbn} is already checked out");
            return CheckoutOutcome::Unavailable;
        }

        let checkout = Checkout::new(user_id, isbn);
        info!("book checked out: {checkout}");
        self.checkouts.push(checkout);
        catalog.set_availability(isbn, false);
        CheckoutOutcome::Success
    }

    /// Find the first active checkout for an ISBN.
    #[must_use]
    pub fn find_by_isbn(&self, isbn: i64) -> Option<&Checkout> {
        self.checkouts.iter().find(|checkout| checkout.isbn == isbn)
    }

    /// Return a checked-out book.
    ///
    /// Both lookups must succeed: a checkout matching the exact
    /// (ISBN, user ID) pair, and the first checkout matching the ISBN alone.
    /// The ISBN match is the record removed. Returns `false` with no state
    /// change if the book is not checked out or the user ID does not match.
    pub fn return_book(&mut self, isbn: i64, user_id: i64, catalog: &mut BookCatalog) -> bool {
        let pair_match = self
            .checkouts
            .iter()
            .position(|co| co.isbn == isbn && co.user_id == user_id);
        let isbn_match = self.checkouts.iter().position(|co| co.isbn == isbn);

        let (Some(_), Some(index)) = (pair_match, isbn_match) else {
            warn!("return failed: ISBN {isbn} not found in active checkouts for user {user_id}");
            return false;
        };

        let checkout = self.checkouts.remove(index);
        catalog.set_availability(isbn, true);
        info!("book returned: {checkout}");
        true
    }

    /// All active checkouts in ledger order.
    #[must_use]
    pub fn checkouts(&self) -> &[Checkout] {
        &self.checkouts
    }

    /// Number of active checkouts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checkouts.len()
    }

    /// Check whether the ledger holds no active checkouts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checkouts.is_empty()
    }

    /// Replace the ledger contents with records loaded from storage.
    pub fn hydrate(&mut self, checkouts: Vec<Checkout>) {
        info!("ledger hydrated with {} checkouts", checkouts.len());
        self.checkouts = checkouts;
    }
}
