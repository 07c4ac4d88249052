//! Interactive menu driver.
//!
//! The menu loop owns all user-facing text and all parsing of raw input.
//! Identifiers are parsed to integers here, at the boundary; a parse failure
//! is reported as a retryable message and never reaches the core components.

use std::io::{BufRead, Write};

use tracing::error;

use crate::book::BookCatalog;
use crate::checkout::{CheckoutLedger, CheckoutOutcome};
use crate::error::{Error, Result};
use crate::store::Stores;
use crate::user::UserDirectory;

/// Whether the menu loop should keep running after an option completes.
enum Flow {
    Continue,
    Exit,
}

/// Run the interactive menu loop until the user exits.
///
/// Input and output handles are injected so the loop can be driven by
/// scripted text in tests.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails, or if the
/// save-and-exit option hits an unreportable store failure. Invalid-key
/// input errors are handled inside the loop and never propagate.
pub fn run<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    catalog: &mut BookCatalog,
    directory: &mut UserDirectory,
    ledger: &mut CheckoutLedger,
    stores: &Stores,
) -> Result<()> {
    loop {
        print_menu(output)?;
        let Some(choice) = prompt(input, output, "Enter your choice: ")? else {
            writeln!(output, "Exiting without saving.")?;
            break;
        };

        let result = match choice.as_str() {
            "1" => add_book(input, output, catalog),
            "2" => list_books(output, catalog),
            "3" => search_books(input, output, catalog),
            "4" => update_book(input, output, catalog),
            "5" => remove_book(input, output, catalog),
            "6" => add_user(input, output, directory),
            "7" => list_users(output, directory),
            "8" => search_users(input, output, directory),
            "9" => update_user(input, output, directory),
            "10" => remove_user(input, output, directory),
            "11" => checkout_book(input, output, catalog, directory, ledger),
            "12" => return_book(input, output, catalog, ledger),
            "13" => list_checkouts(output, ledger),
            "14" => save_and_exit(output, catalog, directory, ledger, stores),
            "15" => {
                writeln!(output, "Exiting without saving.")?;
                Ok(Flow::Exit)
            }
            _ => {
                writeln!(output, "Invalid choice, please try again.")?;
                Ok(Flow::Continue)
            }
        };

        match result {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(Error::InvalidKey { field, .. }) => {
                writeln!(
                    output,
                    "Invalid input. {field} must be an integer. Please try again."
                )?;
            }
            Err(err) => return Err(err),
        }
    }

    writeln!(output, "Session ended.")?;
    Ok(())
}

fn print_menu<W: Write>(output: &mut W) -> Result<()> {
    writeln!(output)?;
    writeln!(output, "Library Management System")?;
    writeln!(output, "1: Add a Book")?;
    writeln!(output, "2: List Books")?;
    writeln!(output, "3: Search Books")?;
    writeln!(output, "4: Update a Book")?;
    writeln!(output, "5: Remove a Book")?;
    writeln!(output, "6: Add a User")?;
    writeln!(output, "7: List Users")?;
    writeln!(output, "8: Search Users")?;
    writeln!(output, "9: Update a User")?;
    writeln!(output, "10: Remove a User")?;
    writeln!(output, "11: Checkout a Book")?;
    writeln!(output, "12: Return a Book")?;
    writeln!(output, "13: List Checkouts")?;
    writeln!(output, "14: Save and Exit")?;
    writeln!(output, "15: Exit without Saving")?;
    Ok(())
}

/// Print a prompt and read one trimmed line. `None` means end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    text: &str,
) -> Result<Option<String>> {
    write!(output, "{text}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Parse an identifier typed by the user.
fn parse_key(field: &'static str, raw: &str) -> Result<i64> {
    raw.parse()
        .map_err(|_| Error::invalid_key(field, raw))
}

/// Prompt for and parse an identifier. End of input parses as invalid.
fn prompt_key<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    text: &str,
    field: &'static str,
) -> Result<i64> {
    let raw = prompt(input, output, text)?.unwrap_or_default();
    parse_key(field, &raw)
}

fn add_book<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    catalog: &mut BookCatalog,
) -> Result<Flow> {
    let title = prompt(input, output, "Enter book title: ")?.unwrap_or_default();
    let author = prompt(input, output, "Enter book author: ")?.unwrap_or_default();
    let isbn = prompt_key(input, output, "Enter book ISBN (integer): ", "ISBN")?;

    if catalog.add(title, author, isbn) {
        writeln!(output, "Book added.")?;
    } else {
        writeln!(output, "A book with ISBN {isbn} already exists.")?;
    }
    Ok(Flow::Continue)
}

fn list_books<W: Write>(output: &mut W, catalog: &BookCatalog) -> Result<Flow> {
    writeln!(output, "Books in library:")?;
    if catalog.is_empty() {
        writeln!(output, "No books available in the library.")?;
    } else {
        for book in catalog.books() {
            writeln!(output, "{book}")?;
        }
    }
    Ok(Flow::Continue)
}

fn search_books<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    catalog: &BookCatalog,
) -> Result<Flow> {
    let choice = prompt(input, output, "Search by (1) Title, (2) Author, (3) ISBN: ")?
        .unwrap_or_default();
    match choice.as_str() {
        "1" => {
            let text = prompt(input, output, "Enter title to search: ")?.unwrap_or_default();
            print_book_matches(output, &catalog.find_by_title(&text))?;
        }
        "2" => {
            let text = prompt(input, output, "Enter author to search: ")?.unwrap_or_default();
            print_book_matches(output, &catalog.find_by_author(&text))?;
        }
        "3" => {
            let isbn = prompt_key(input, output, "Enter ISBN to search: ", "ISBN")?;
            match catalog.find_by_isbn(isbn) {
                Some(book) => writeln!(output, "{book}")?,
                None => writeln!(output, "Book not found.")?,
            }
        }
        _ => writeln!(output, "Invalid choice, please try again.")?,
    }
    Ok(Flow::Continue)
}

fn print_book_matches<W: Write>(output: &mut W, matches: &[&crate::book::Book]) -> Result<()> {
    if matches.is_empty() {
        writeln!(output, "No matching books found.")?;
    } else {
        for book in matches {
            writeln!(output, "{book}")?;
        }
    }
    Ok(())
}

fn update_book<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    catalog: &mut BookCatalog,
) -> Result<Flow> {
    let isbn = prompt_key(input, output, "Enter ISBN of the book to update: ", "ISBN")?;
    let title =
        prompt(input, output, "Enter new title (leave blank to keep current): ")?.unwrap_or_default();
    let author = prompt(input, output, "Enter new author (leave blank to keep current): ")?
        .unwrap_or_default();

    if catalog.update(isbn, Some(&title), Some(&author)) {
        writeln!(output, "Book updated successfully.")?;
    } else {
        writeln!(output, "Book not found.")?;
    }
    Ok(Flow::Continue)
}

fn remove_book<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    catalog: &mut BookCatalog,
) -> Result<Flow> {
    let isbn = prompt_key(input, output, "Enter book ISBN (integer): ", "ISBN")?;
    if catalog.remove(isbn) {
        writeln!(output, "Book removed successfully.")?;
    } else {
        writeln!(output, "Book not found.")?;
    }
    Ok(Flow::Continue)
}

fn add_user<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    directory: &mut UserDirectory,
) -> Result<Flow> {
    let name = prompt(input, output, "Enter user name: ")?.unwrap_or_default();
    let user_id = prompt_key(input, output, "Enter user ID (integer): ", "User ID")?;

    if directory.add(name, user_id) {
        writeln!(output, "User added.")?;
    } else {
        writeln!(output, "A user with ID {user_id} already exists.")?;
    }
    Ok(Flow::Continue)
}

fn list_users<W: Write>(output: &mut W, directory: &UserDirectory) -> Result<Flow> {
    writeln!(output, "Users in library:")?;
    if directory.is_empty() {
        writeln!(output, "No users registered in the library.")?;
    } else {
        for user in directory.users() {
            writeln!(output, "{user}")?;
        }
    }
    Ok(Flow::Continue)
}

fn search_users<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    directory: &UserDirectory,
) -> Result<Flow> {
    let choice = prompt(input, output, "Search by (1) Name, (2) User ID: ")?.unwrap_or_default();
    match choice.as_str() {
        "1" => {
            let text = prompt(input, output, "Enter name to search: ")?.unwrap_or_default();
            let matches = directory.find_by_name(&text);
            if matches.is_empty() {
                writeln!(output, "No matching users found.")?;
            } else {
                for user in matches {
                    writeln!(output, "{user}")?;
                }
            }
        }
        "2" => {
            let user_id = prompt_key(input, output, "Enter user ID to search: ", "User ID")?;
            match directory.find_by_id(user_id) {
                Some(user) => writeln!(output, "{user}")?,
                None => writeln!(output, "User not found.")?,
            }
        }
        _ => writeln!(output, "Invalid choice, please try again.")?,
    }
    Ok(Flow::Continue)
}

fn update_user<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    directory: &mut UserDirectory,
) -> Result<Flow> {
    let user_id = prompt_key(input, output, "Enter User ID to update: ", "User ID")?;
    let name =
        prompt(input, output, "Enter new name (leave blank to keep current): ")?.unwrap_or_default();

    if directory.update(user_id, Some(&name)) {
        writeln!(output, "User updated successfully.")?;
    } else {
        writeln!(output, "User not found.")?;
    }
    Ok(Flow::Continue)
}

fn remove_user<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    directory: &mut UserDirectory,
) -> Result<Flow> {
    let user_id = prompt_key(input, output, "Enter user ID (integer): ", "User ID")?;
    if directory.remove(user_id) {
        writeln!(output, "User removed successfully.")?;
    } else {
        writeln!(output, "User not found.")?;
    }
    Ok(Flow::Continue)
}

fn checkout_book<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    catalog: &mut BookCatalog,
    directory: &UserDirectory,
    ledger: &mut CheckoutLedger,
) -> Result<Flow> {
    let user_id = prompt_key(input, output, "Enter user ID: ", "User ID")?;
    let isbn = prompt_key(input, output, "Enter book ISBN: ", "ISBN")?;

    match ledger.checkout(user_id, isbn, directory, catalog) {
        CheckoutOutcome::Success => {
            writeln!(output, "Book with ISBN {isbn} checked out by user {user_id}.")?;
        }
        CheckoutOutcome::UnknownUser => writeln!(output, "No user with ID {user_id} found.")?,
        CheckoutOutcome::UnknownBook => writeln!(output, "No book with ISBN {isbn} found.")?,
        CheckoutOutcome::Unavailable => {
            writeln!(output, "Book with ISBN {isbn} is already checked out.")?;
        }
    }
    Ok(Flow::Continue)
}

fn return_book<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    catalog: &mut BookCatalog,
    ledger: &mut CheckoutLedger,
) -> Result<Flow> {
    let user_id = prompt_key(input, output, "Enter user ID: ", "User ID")?;
    let isbn = prompt_key(input, output, "Enter book ISBN to return: ", "ISBN")?;

    if ledger.return_book(isbn, user_id, catalog) {
        writeln!(output, "Book returned successfully.")?;
    } else {
        writeln!(output, "Failed to return book. It may not be checked out.")?;
    }
    Ok(Flow::Continue)
}

fn list_checkouts<W: Write>(output: &mut W, ledger: &CheckoutLedger) -> Result<Flow> {
    writeln!(output, "Checkout list:")?;
    if ledger.is_empty() {
        writeln!(output, "No active checkouts.")?;
    } else {
        for checkout in ledger.checkouts() {
            writeln!(output, "{checkout}")?;
        }
    }
    Ok(Flow::Continue)
}

fn save_and_exit<W: Write>(
    output: &mut W,
    catalog: &BookCatalog,
    directory: &UserDirectory,
    ledger: &CheckoutLedger,
    stores: &Stores,
) -> Result<Flow> {
    writeln!(output, "Saving data and exiting...")?;

    let saved = stores
        .books
        .save(catalog.books())
        .and_then(|()| stores.users.save(directory.users()))
        .and_then(|()| stores.checkouts.save(ledger.checkouts()));

    match saved {
        Ok(()) => writeln!(output, "Data saved successfully.")?,
        Err(err) => {
            error!("failed to save data: {err}");
            writeln!(
                output,
                "An error occurred while saving the data. Please check the logs."
            )?;
        }
    }
    Ok(Flow::Exit)
}
