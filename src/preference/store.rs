//! Defines the preference store trait.

use crate::{
    Error,
    database_id::UserID,
    preference::{Preference, PreferenceData, PreferenceId},
};

/// Creates, retrieves, replaces and deletes user preferences.
///
/// Every write that sets a category ID checks that the category exists.
pub trait PreferenceStore {
    /// Create a new preference and add it to the store.
    ///
    /// # Errors
    /// Returns [Error::InvalidCategory] if `data.category_id` does not refer to a category.
    fn create(&self, data: PreferenceData) -> Result<Preference, Error>;

    /// Get a preference by its ID.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no preference with `preference_id`.
    fn get(&self, preference_id: PreferenceId) -> Result<Preference, Error>;

    /// Get all preferences in the order they were created.
    fn get_all(&self) -> Result<Vec<Preference>, Error>;

    /// Get the preferences of the user with `user_id` in the order they were created.
    fn get_by_user(&self, user_id: UserID) -> Result<Vec<Preference>, Error>;

    /// Replace every field of the preference with `preference_id`.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingPreference] if the preference does not exist,
    /// or [Error::InvalidCategory] if `data.category_id` does not refer to a category.
    fn update(&self, preference_id: PreferenceId, data: PreferenceData)
    -> Result<Preference, Error>;

    /// Delete the preference with `preference_id`.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingPreference] if the preference does not exist.
    fn delete(&self, preference_id: PreferenceId) -> Result<(), Error>;
}
