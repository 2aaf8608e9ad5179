//! Defines the category store trait.

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName},
};

/// Creates, retrieves, renames and deletes preference categories.
pub trait CategoryStore {
    /// Create a new category and add it to the store.
    ///
    /// # Errors
    /// Returns [Error::DuplicateCategoryName] if a category with `name` already exists.
    fn create(&self, name: CategoryName) -> Result<Category, Error>;

    /// Get a category by its ID.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if there is no category with `category_id`.
    fn get(&self, category_id: CategoryId) -> Result<Category, Error>;

    /// Get all categories in the order they were created.
    fn get_all(&self) -> Result<Vec<Category>, Error>;

    /// Replace the name of the category with `category_id`.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingCategory] if the category does not exist,
    /// or [Error::DuplicateCategoryName] if another category already uses `name`.
    fn update(&self, category_id: CategoryId, name: CategoryName) -> Result<Category, Error>;

    /// Delete the category with `category_id`.
    ///
    /// # Errors
    /// Returns [Error::DeleteMissingCategory] if the category does not exist,
    /// or [Error::CategoryInUse] if any preference still refers to it.
    fn delete(&self, category_id: CategoryId) -> Result<(), Error>;
}
