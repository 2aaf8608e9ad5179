//! Preference categories: named groups that preferences belong to.

mod domain;
mod endpoints;
mod sqlite;
mod store;

pub use domain::{Category, CategoryData, CategoryId, CategoryName, MAX_CATEGORY_NAME_LENGTH};
pub use endpoints::{
    create_category_endpoint, delete_category_endpoint, get_categories_endpoint,
    get_category_endpoint, update_category_endpoint,
};
pub use sqlite::SQLiteCategoryStore;
pub(crate) use sqlite::category_exists;
pub use store::CategoryStore;
