/*! This module defines the traits and functions for setting up the application's database. */

use std::{
    path::Path,
    sync::{Mutex, MutexGuard},
    time::Duration,
};

use rusqlite::{Connection, Row, Transaction, TransactionBehavior};

use crate::{Error, category::SQLiteCategoryStore, preference::SQLitePreferenceStore};

/// How long a connection waits on a lock held by another connection before
/// failing with `SQLITE_BUSY`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create a table for the model.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// A trait for mapping from a `rusqlite::Row` from a SQLite database to a concrete rust type.
///
/// The offset lets a row from a join be split between several types, e.g. a
/// preference followed by the columns of its category.
pub trait MapRow {
    /// The type the row is mapped to.
    type ReturnType;

    /// Convert a row into a concrete type.
    fn map_row(row: &Row) -> Result<Self::ReturnType, rusqlite::Error> {
        Self::map_row_with_offset(row, 0)
    }

    /// Convert a row into a concrete type, starting at column `offset`.
    fn map_row_with_offset(row: &Row, offset: usize)
    -> Result<Self::ReturnType, rusqlite::Error>;
}

/// Open the SQLite database at `path`, creating the file if it does not exist.
///
/// The schema is not created, call [initialize] on the returned connection.
///
/// # Errors
/// Returns an error if the file cannot be opened.
pub fn open(path: impl AsRef<Path>) -> Result<Connection, rusqlite::Error> {
    let path = path.as_ref();
    tracing::debug!("Opening database at {}", path.display());

    let connection = Connection::open(path)?;
    connection.busy_timeout(BUSY_TIMEOUT)?;

    Ok(connection)
}

/// Open a private in-memory database for tests.
#[cfg(test)]
pub fn open_in_memory() -> Result<Connection, rusqlite::Error> {
    let connection = Connection::open_in_memory()?;
    connection.busy_timeout(BUSY_TIMEOUT)?;

    Ok(connection)
}

/// Create the tables for the domain models and enable foreign key enforcement.
///
/// This function is idempotent and can be called on a database that has
/// already been initialized.
///
/// # Errors
/// Returns an error if the tables cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    // Has no effect inside a transaction, so it must come first.
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    SQLiteCategoryStore::create_table(&transaction)?;
    SQLitePreferenceStore::create_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Start a transaction that takes the database write lock immediately.
///
/// Existence checks made inside the transaction cannot be invalidated by
/// another writer before the transaction commits.
pub(crate) fn begin_write(connection: &Connection) -> Result<Transaction<'_>, rusqlite::Error> {
    Transaction::new_unchecked(connection, TransactionBehavior::Immediate)
}

/// Acquire the shared database connection.
///
/// # Errors
/// Returns [Error::DatabaseLockError] if the lock is poisoned.
pub(crate) fn lock_connection(
    connection: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}
