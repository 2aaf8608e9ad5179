//! Implements a SQLite backed preference store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{CategoryId, SQLiteCategoryStore, category_exists},
    database_id::UserID,
    db::{CreateTable, MapRow, begin_write, lock_connection},
    preference::{Preference, PreferenceData, PreferenceId, PreferenceStore},
    retry::with_retry,
};

/// Selects a preference followed by the columns of its category.
const PREFERENCE_SELECT_SQL: &str = "SELECT
    preferences.id,
    preferences.user_id,
    preferences.value,
    preference_categories.id,
    preference_categories.name
FROM preferences
INNER JOIN preference_categories ON preference_categories.id = preferences.category_id";

/// Creates, retrieves, replaces and deletes user preferences in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLitePreferenceStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLitePreferenceStore {
    /// Create a new preference store with a SQLite database.
    ///
    /// The connection should be shared with the category store so that
    /// category checks and preference writes run in the same transaction.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl PreferenceStore for SQLitePreferenceStore {
    fn create(&self, data: PreferenceData) -> Result<Preference, Error> {
        with_retry(|| {
            let connection = lock_connection(&self.connection)?;
            let transaction = begin_write(&connection)?;

            if !category_exists(data.category_id, &transaction)? {
                tracing::debug!(
                    "rejected preference for user {}, category {} does not exist",
                    data.user_id,
                    data.category_id
                );
                return Err(Error::InvalidCategory(data.category_id));
            }

            transaction
                .execute(
                    "INSERT INTO preferences (user_id, category_id, value) VALUES (?1, ?2, ?3);",
                    (data.user_id, data.category_id, &data.value),
                )
                .map_err(|error| map_invalid_category(error, data.category_id))?;
            let id = transaction.last_insert_rowid();

            let preference = select_preference(id, &transaction)?;
            transaction.commit()?;

            Ok(preference)
        })
    }

    fn get(&self, preference_id: PreferenceId) -> Result<Preference, Error> {
        with_retry(|| {
            let connection = lock_connection(&self.connection)?;

            select_preference(preference_id, &connection)
        })
    }

    fn get_all(&self) -> Result<Vec<Preference>, Error> {
        with_retry(|| {
            let connection = lock_connection(&self.connection)?;

            connection
                .prepare(&format!("{PREFERENCE_SELECT_SQL} ORDER BY preferences.id ASC;"))?
                .query_map([], SQLitePreferenceStore::map_row)?
                .map(|maybe_preference| maybe_preference.map_err(|error| error.into()))
                .collect()
        })
    }

    fn get_by_user(&self, user_id: UserID) -> Result<Vec<Preference>, Error> {
        with_retry(|| {
            let connection = lock_connection(&self.connection)?;

            connection
                .prepare(&format!(
                    "{PREFERENCE_SELECT_SQL} WHERE preferences.user_id = :user_id \
                    ORDER BY preferences.id ASC;"
                ))?
                .query_map(&[(":user_id", &user_id)], SQLitePreferenceStore::map_row)?
                .map(|maybe_preference| maybe_preference.map_err(|error| error.into()))
                .collect()
        })
    }

    /// Replace all fields of a preference.
    ///
    /// The preference is checked before the category, so a missing preference
    /// is reported as missing even when the new category is also invalid.
    fn update(
        &self,
        preference_id: PreferenceId,
        data: PreferenceData,
    ) -> Result<Preference, Error> {
        with_retry(|| {
            let connection = lock_connection(&self.connection)?;
            let transaction = begin_write(&connection)?;

            if !preference_exists(preference_id, &transaction)? {
                return Err(Error::UpdateMissingPreference);
            }

            if !category_exists(data.category_id, &transaction)? {
                tracing::debug!(
                    "rejected update of preference {preference_id}, category {} does not exist",
                    data.category_id
                );
                return Err(Error::InvalidCategory(data.category_id));
            }

            transaction
                .execute(
                    "UPDATE preferences SET user_id = ?1, category_id = ?2, value = ?3 \
                    WHERE id = ?4;",
                    (data.user_id, data.category_id, &data.value, preference_id),
                )
                .map_err(|error| map_invalid_category(error, data.category_id))?;

            let preference = select_preference(preference_id, &transaction)?;
            transaction.commit()?;

            Ok(preference)
        })
    }

    fn delete(&self, preference_id: PreferenceId) -> Result<(), Error> {
        with_retry(|| {
            let connection = lock_connection(&self.connection)?;

            let rows_affected =
                connection.execute("DELETE FROM preferences WHERE id = ?1;", [preference_id])?;

            if rows_affected == 0 {
                return Err(Error::DeleteMissingPreference);
            }

            Ok(())
        })
    }
}

impl CreateTable for SQLitePreferenceStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS preferences (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category_id INTEGER NOT NULL,
                value TEXT NOT NULL,
                FOREIGN KEY(category_id) REFERENCES preference_categories(id) ON DELETE RESTRICT
            );

            CREATE INDEX IF NOT EXISTS idx_preferences_user_id ON preferences(user_id);
            CREATE INDEX IF NOT EXISTS idx_preferences_category_id ON preferences(category_id);",
        )?;

        Ok(())
    }
}

impl MapRow for SQLitePreferenceStore {
    type ReturnType = Preference;

    fn map_row_with_offset(row: &Row, offset: usize) -> Result<Self::ReturnType, rusqlite::Error> {
        let id = row.get(offset)?;
        let user_id = row.get(offset + 1)?;
        let value = row.get(offset + 2)?;
        let category = SQLiteCategoryStore::map_row_with_offset(row, offset + 3)?;

        Ok(Self::ReturnType {
            id,
            user_id,
            category,
            value,
        })
    }
}

/// Count the preferences that refer to the category with `category_id`.
pub(crate) fn count_preferences_in_category(
    category_id: CategoryId,
    connection: &Connection,
) -> Result<i64, rusqlite::Error> {
    connection.query_row(
        "SELECT COUNT(*) FROM preferences WHERE category_id = ?1;",
        [category_id],
        |row| row.get(0),
    )
}

fn select_preference(
    preference_id: PreferenceId,
    connection: &Connection,
) -> Result<Preference, Error> {
    connection
        .prepare(&format!(
            "{PREFERENCE_SELECT_SQL} WHERE preferences.id = :id;"
        ))?
        .query_row(&[(":id", &preference_id)], SQLitePreferenceStore::map_row)
        .map_err(|error| error.into())
}

fn preference_exists(
    preference_id: PreferenceId,
    connection: &Connection,
) -> Result<bool, rusqlite::Error> {
    connection.query_row(
        "SELECT EXISTS(SELECT 1 FROM preferences WHERE id = ?1);",
        [preference_id],
        |row| row.get(0),
    )
}

fn map_invalid_category(error: rusqlite::Error, category_id: CategoryId) -> Error {
    match error {
        // Code 787 occurs when a FOREIGN KEY constraint failed.
        rusqlite::Error::SqliteFailure(sql_error, Some(_)) if sql_error.extended_code == 787 => {
            Error::InvalidCategory(category_id)
        }
        error => error.into(),
    }
}

#[cfg(test)]
mod preference_store_tests {
    use std::sync::{Arc, Mutex};

    use crate::{
        Error,
        category::{Category, CategoryName, CategoryStore, SQLiteCategoryStore},
        db::{initialize, open_in_memory},
        preference::{PreferenceData, PreferenceStore},
    };

    use super::{SQLitePreferenceStore, map_invalid_category};

    fn get_test_stores() -> (SQLiteCategoryStore, SQLitePreferenceStore) {
        let connection = open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");
        let connection = Arc::new(Mutex::new(connection));

        (
            SQLiteCategoryStore::new(connection.clone()),
            SQLitePreferenceStore::new(connection),
        )
    }

    fn create_category(store: &SQLiteCategoryStore, name: &str) -> Category {
        store
            .create(CategoryName::new_unchecked(name))
            .expect("Could not create test category")
    }

    fn preference_data(user_id: i64, category_id: i64, value: &str) -> PreferenceData {
        PreferenceData {
            user_id,
            category_id,
            value: value.to_owned(),
        }
    }

    #[test]
    fn create_preference_embeds_category() {
        let (category_store, preference_store) = get_test_stores();
        create_category(&category_store, "diet");
        let sleep = create_category(&category_store, "sleep");

        let preference = preference_store
            .create(preference_data(7, sleep.id, "8h"))
            .expect("Could not create preference");

        assert_eq!(preference.id, 1);
        assert_eq!(preference.user_id, 7);
        assert_eq!(preference.value, "8h");
        assert_eq!(preference.category, sleep);
        assert_eq!(preference.category.name.as_ref(), "sleep");
    }

    #[test]
    fn create_preference_with_missing_category_fails() {
        let (_, preference_store) = get_test_stores();

        let result = preference_store.create(preference_data(7, 999, "x"));

        assert_eq!(result, Err(Error::InvalidCategory(999)));
        assert_eq!(preference_store.get_all(), Ok(vec![]));
    }

    #[test]
    fn get_preference_succeeds() {
        let (category_store, preference_store) = get_test_stores();
        let category = create_category(&category_store, "sleep");
        let preference = preference_store
            .create(preference_data(7, category.id, "8h"))
            .unwrap();

        let selected_preference = preference_store.get(preference.id);

        assert_eq!(selected_preference, Ok(preference));
    }

    #[test]
    fn get_preference_with_invalid_id_returns_not_found() {
        let (_, preference_store) = get_test_stores();

        let result = preference_store.get(999999);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn get_all_preferences_in_insertion_order() {
        let (category_store, preference_store) = get_test_stores();
        let category = create_category(&category_store, "sleep");
        let inserted_preferences = vec![
            preference_store
                .create(preference_data(7, category.id, "8h"))
                .unwrap(),
            preference_store
                .create(preference_data(8, category.id, "6h"))
                .unwrap(),
            preference_store
                .create(preference_data(7, category.id, "early"))
                .unwrap(),
        ];

        let selected_preferences = preference_store.get_all();

        assert_eq!(selected_preferences, Ok(inserted_preferences));
    }

    #[test]
    fn get_preferences_by_user() {
        let (category_store, preference_store) = get_test_stores();
        let sleep = create_category(&category_store, "sleep");
        let diet = create_category(&category_store, "diet");
        let first = preference_store
            .create(preference_data(7, sleep.id, "8h"))
            .unwrap();
        preference_store
            .create(preference_data(8, sleep.id, "6h"))
            .unwrap();
        let second = preference_store
            .create(preference_data(7, diet.id, "vegetarian"))
            .unwrap();

        let selected_preferences = preference_store.get_by_user(7);

        assert_eq!(selected_preferences, Ok(vec![first, second]));
    }

    #[test]
    fn get_preferences_by_unknown_user_is_empty() {
        let (category_store, preference_store) = get_test_stores();
        let category = create_category(&category_store, "sleep");
        preference_store
            .create(preference_data(7, category.id, "8h"))
            .unwrap();

        let selected_preferences = preference_store.get_by_user(42);

        assert_eq!(selected_preferences, Ok(vec![]));
    }

    #[test]
    fn update_preference_replaces_all_fields() {
        let (category_store, preference_store) = get_test_stores();
        let sleep = create_category(&category_store, "sleep");
        let diet = create_category(&category_store, "diet");
        let preference = preference_store
            .create(preference_data(7, sleep.id, "8h"))
            .unwrap();

        let updated_preference = preference_store
            .update(preference.id, preference_data(8, diet.id, "vegan"))
            .expect("Could not update preference");

        assert_eq!(updated_preference.id, preference.id);
        assert_eq!(updated_preference.user_id, 8);
        assert_eq!(updated_preference.category, diet);
        assert_eq!(updated_preference.value, "vegan");
        assert_eq!(preference_store.get(preference.id), Ok(updated_preference));
    }

    #[test]
    fn update_preference_with_missing_category_leaves_preference_unchanged() {
        let (category_store, preference_store) = get_test_stores();
        let category = create_category(&category_store, "sleep");
        let preference = preference_store
            .create(preference_data(7, category.id, "8h"))
            .unwrap();

        let result = preference_store.update(preference.id, preference_data(7, 999, "9h"));

        assert_eq!(result, Err(Error::InvalidCategory(999)));
        assert_eq!(preference_store.get(preference.id), Ok(preference));
    }

    #[test]
    fn update_missing_preference_returns_not_found() {
        let (category_store, preference_store) = get_test_stores();
        let category = create_category(&category_store, "sleep");

        let result = preference_store.update(999999, preference_data(7, category.id, "8h"));

        assert_eq!(result, Err(Error::UpdateMissingPreference));
        assert_eq!(preference_store.get_all(), Ok(vec![]));
    }

    #[test]
    fn update_deleted_preference_returns_not_found() {
        let (category_store, preference_store) = get_test_stores();
        let category = create_category(&category_store, "sleep");
        let preference = preference_store
            .create(preference_data(7, category.id, "8h"))
            .unwrap();
        preference_store.delete(preference.id).unwrap();

        let result = preference_store.update(preference.id, preference_data(7, category.id, "9h"));

        assert_eq!(result, Err(Error::UpdateMissingPreference));
        assert_eq!(preference_store.get(preference.id), Err(Error::NotFound));
    }

    #[test]
    fn delete_preference_succeeds() {
        let (category_store, preference_store) = get_test_stores();
        let category = create_category(&category_store, "sleep");
        let preference = preference_store
            .create(preference_data(7, category.id, "8h"))
            .unwrap();

        let result = preference_store.delete(preference.id);

        assert_eq!(result, Ok(()));
        assert_eq!(preference_store.get(preference.id), Err(Error::NotFound));
        assert_eq!(category_store.get(category.id), Ok(category));
    }

    #[test]
    fn delete_preference_with_invalid_id_returns_not_found() {
        let (_, preference_store) = get_test_stores();

        let result = preference_store.delete(999999);

        assert_eq!(result, Err(Error::DeleteMissingPreference));
    }

    #[test]
    fn renamed_category_is_reflected_in_preferences() {
        let (category_store, preference_store) = get_test_stores();
        let category = create_category(&category_store, "sleep");
        let preference = preference_store
            .create(preference_data(7, category.id, "8h"))
            .unwrap();

        let renamed = category_store
            .update(category.id, CategoryName::new_unchecked("rest"))
            .unwrap();

        assert_eq!(
            preference_store.get(preference.id).map(|p| p.category),
            Ok(renamed)
        );
    }

    #[test]
    fn foreign_key_violation_on_insert_maps_to_invalid_category() {
        let connection = open_in_memory().unwrap();
        initialize(&connection).unwrap();

        let sql_error = connection
            .execute(
                "INSERT INTO preferences (user_id, category_id, value) VALUES (7, 999, 'x');",
                (),
            )
            .expect_err("Inserting a dangling category ID should fail");

        assert_eq!(
            map_invalid_category(sql_error, 999),
            Error::InvalidCategory(999)
        );
    }

    #[test]
    fn foreign_key_violation_on_update_maps_to_invalid_category() {
        let connection = open_in_memory().unwrap();
        initialize(&connection).unwrap();
        connection
            .execute_batch(
                "INSERT INTO preference_categories (name) VALUES ('sleep');
                INSERT INTO preferences (user_id, category_id, value) VALUES (7, 1, '8h');",
            )
            .unwrap();

        let sql_error = connection
            .execute("UPDATE preferences SET category_id = 999 WHERE id = 1;", ())
            .expect_err("Moving a preference to a dangling category ID should fail");

        assert_eq!(
            map_invalid_category(sql_error, 999),
            Error::InvalidCategory(999)
        );
    }

    #[test]
    fn other_errors_are_not_invalid_category() {
        assert_eq!(
            map_invalid_category(rusqlite::Error::QueryReturnedNoRows, 999),
            Error::NotFound
        );
    }
}
