//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    category::{CategoryStore, SQLiteCategoryStore},
    db::initialize,
    preference::{PreferenceStore, SQLitePreferenceStore},
};

/// The state of the REST server.
///
/// Route handlers extract only the store they need through `FromRef`.
#[derive(Debug, Clone)]
pub struct AppState<C, P>
where
    C: CategoryStore + Send + Sync,
    P: PreferenceStore + Send + Sync,
{
    /// The store for [categories](crate::category::Category).
    pub category_store: C,
    /// The store for [preferences](crate::preference::Preference).
    pub preference_store: P,
}

impl<C, P> AppState<C, P>
where
    C: CategoryStore + Send + Sync,
    P: PreferenceStore + Send + Sync,
{
    /// Create a new [AppState].
    pub fn new(category_store: C, preference_store: P) -> Self {
        Self {
            category_store,
            preference_store,
        }
    }
}

/// An alias for an [AppState] that uses SQLite for the backend.
pub type SQLAppState = AppState<SQLiteCategoryStore, SQLitePreferenceStore>;

/// Creates an [AppState] instance that uses SQLite for the backend.
///
/// This function will modify the database by adding the tables for the domain
/// models to the database.
///
/// # Errors
/// Returns an error if the database cannot be initialized.
pub fn create_app_state(db_connection: Connection) -> Result<SQLAppState, rusqlite::Error> {
    initialize(&db_connection)?;

    let connection = Arc::new(Mutex::new(db_connection));
    let category_store = SQLiteCategoryStore::new(connection.clone());
    let preference_store = SQLitePreferenceStore::new(connection);

    Ok(AppState::new(category_store, preference_store))
}
