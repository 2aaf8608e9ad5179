//! Implements a SQLite backed category store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OptionalExtension, Row};

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName, CategoryStore},
    db::{CreateTable, MapRow, begin_write, lock_connection},
    preference::count_preferences_in_category,
    retry::with_retry,
};

/// Creates, retrieves, renames and deletes preference categories in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteCategoryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteCategoryStore {
    /// Create a new category store with a SQLite database.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CategoryStore for SQLiteCategoryStore {
    /// Create a category in the database.
    ///
    /// The name check and the insert run in one transaction, and the UNIQUE
    /// constraint on the name column catches writers outside this process.
    fn create(&self, name: CategoryName) -> Result<Category, Error> {
        with_retry(|| {
            let connection = lock_connection(&self.connection)?;
            let transaction = begin_write(&connection)?;

            if let Some(existing) = select_category_by_name(&name, &transaction)? {
                tracing::debug!(
                    "rejected category \"{name}\", it already exists with ID {}",
                    existing.id
                );
                return Err(Error::DuplicateCategoryName(name.to_string()));
            }

            transaction
                .execute(
                    "INSERT INTO preference_categories (name) VALUES (?1);",
                    (name.as_ref(),),
                )
                .map_err(|error| map_duplicate_name(error, &name))?;
            let id = transaction.last_insert_rowid();

            transaction.commit()?;

            Ok(Category {
                id,
                name: name.clone(),
            })
        })
    }

    /// Retrieve the category with `category_id`.
    fn get(&self, category_id: CategoryId) -> Result<Category, Error> {
        with_retry(|| {
            let connection = lock_connection(&self.connection)?;

            select_category(category_id, &connection)
        })
    }

    /// Retrieve all categories ordered by ID, i.e. in the order they were created.
    fn get_all(&self) -> Result<Vec<Category>, Error> {
        with_retry(|| {
            let connection = lock_connection(&self.connection)?;

            connection
                .prepare("SELECT id, name FROM preference_categories ORDER BY id ASC;")?
                .query_map([], SQLiteCategoryStore::map_row)?
                .map(|maybe_category| maybe_category.map_err(|error| error.into()))
                .collect()
        })
    }

    /// Rename a category, keeping category names unique.
    ///
    /// Renaming a category to its current name is allowed.
    fn update(&self, category_id: CategoryId, name: CategoryName) -> Result<Category, Error> {
        with_retry(|| {
            let connection = lock_connection(&self.connection)?;
            let transaction = begin_write(&connection)?;

            if !category_exists(category_id, &transaction)? {
                return Err(Error::UpdateMissingCategory);
            }

            match select_category_by_name(&name, &transaction)? {
                Some(existing) if existing.id != category_id => {
                    tracing::debug!(
                        "rejected rename of category {category_id} to \"{name}\", \
                        category {} already has that name",
                        existing.id
                    );
                    return Err(Error::DuplicateCategoryName(name.to_string()));
                }
                _ => {}
            }

            transaction
                .execute(
                    "UPDATE preference_categories SET name = ?1 WHERE id = ?2;",
                    (name.as_ref(), category_id),
                )
                .map_err(|error| map_duplicate_name(error, &name))?;

            transaction.commit()?;

            Ok(Category {
                id: category_id,
                name: name.clone(),
            })
        })
    }

    /// Delete a category that no preference refers to.
    ///
    /// The foreign key on `preferences.category_id` restricts deletes, so a
    /// preference inserted by another process still blocks the delete.
    fn delete(&self, category_id: CategoryId) -> Result<(), Error> {
        with_retry(|| {
            let connection = lock_connection(&self.connection)?;
            let transaction = begin_write(&connection)?;

            if !category_exists(category_id, &transaction)? {
                return Err(Error::DeleteMissingCategory);
            }

            let preference_count = count_preferences_in_category(category_id, &transaction)?;
            if preference_count > 0 {
                tracing::debug!(
                    "rejected delete of category {category_id}, \
                    {preference_count} preference(s) still refer to it"
                );
                return Err(Error::CategoryInUse(category_id));
            }

            transaction
                .execute(
                    "DELETE FROM preference_categories WHERE id = ?1;",
                    [category_id],
                )
                .map_err(|error| map_category_in_use(error, category_id))?;

            transaction.commit()?;

            Ok(())
        })
    }
}

impl CreateTable for SQLiteCategoryStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS preference_categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );",
        )?;

        Ok(())
    }
}

impl MapRow for SQLiteCategoryStore {
    type ReturnType = Category;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;

        let raw_name: String = row.get(offset + 1)?;
        let name = CategoryName::new_unchecked(&raw_name);

        Ok(Self::ReturnType { id, name })
    }
}

/// Retrieve a single category by ID.
///
/// # Errors
/// Returns [Error::NotFound] if there is no category with `category_id`.
pub(crate) fn select_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name FROM preference_categories WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], SQLiteCategoryStore::map_row)
        .map_err(|error| error.into())
}

/// Check whether a category with `category_id` exists.
pub(crate) fn category_exists(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<bool, rusqlite::Error> {
    connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM preference_categories WHERE id = ?1);",
        [category_id],
        |row| row.get(0),
    )
}

fn select_category_by_name(
    name: &CategoryName,
    connection: &Connection,
) -> Result<Option<Category>, rusqlite::Error> {
    connection
        .prepare("SELECT id, name FROM preference_categories WHERE name = ?1;")?
        .query_row([name.as_ref()], SQLiteCategoryStore::map_row)
        .optional()
}

fn map_duplicate_name(error: rusqlite::Error, name: &CategoryName) -> Error {
    match error {
        // Code 2067 occurs when a UNIQUE constraint failed.
        rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
            if sql_error.extended_code == 2067
                && desc.ends_with("preference_categories.name") =>
        {
            Error::DuplicateCategoryName(name.to_string())
        }
        error => error.into(),
    }
}

fn map_category_in_use(error: rusqlite::Error, category_id: CategoryId) -> Error {
    match error {
        // Code 787 occurs when a FOREIGN KEY constraint failed.
        rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 787 => {
            Error::CategoryInUse(category_id)
        }
        error => error.into(),
    }
}
