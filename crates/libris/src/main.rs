//! `libris` - CLI for the flat-file library management system
//!
//! Loads the persisted collections, runs the interactive menu on stdin and
//! stdout, and reports startup failures without crashing the session.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;

use libris::cli::Cli;
use libris::{init_logging, menu, BookCatalog, CheckoutLedger, Config, Stores, UserDirectory};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration, letting the CLI override the data directory
    let mut config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;
    if let Some(data_dir) = cli.data_dir.clone() {
        config.storage.data_dir = Some(data_dir);
    }

    let stores = Stores::from_config(&config);

    // Hydrate the collections from their flat files
    let mut catalog = BookCatalog::new();
    catalog.hydrate(stores.books.load().context("failed to load books")?);

    let mut directory = UserDirectory::new();
    directory.hydrate(stores.users.load().context("failed to load users")?);

    let mut ledger = CheckoutLedger::new();
    ledger.hydrate(stores.checkouts.load().context("failed to load checkouts")?);

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    menu::run(
        &mut stdin.lock(),
        &mut stdout.lock(),
        &mut catalog,
        &mut directory,
        &mut ledger,
        &stores,
    )
    .context("menu session failed")?;

    Ok(())
}
