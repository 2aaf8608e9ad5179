//! User preferences: a value a user has chosen within a category.

mod domain;
mod endpoints;
mod sqlite;
mod store;

pub use domain::{Preference, PreferenceData, PreferenceId};
pub use endpoints::{
    create_preference_endpoint, delete_preference_endpoint,
    get_preference_endpoint, get_preferences_endpoint, get_user_preferences_endpoint,
    update_preference_endpoint,
};
pub use sqlite::SQLitePreferenceStore;
pub(crate) use sqlite::count_preferences_in_category;
pub use store::PreferenceStore;
