//! `libris` - A flat-file library management system
//!
//! This library provides the record-management core for tracking books,
//! patrons, and active checkouts, together with the JSON flat-file
//! persistence gateway and the interactive menu driver.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod book;
pub mod checkout;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod menu;
pub mod store;
pub mod user;

pub use book::{Book, BookCatalog};
pub use checkout::{Checkout, CheckoutLedger, CheckoutOutcome};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use store::{Keyed, Store, Stores};
pub use user::{User, UserDirectory};
