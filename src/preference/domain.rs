//! Core preference domain types.

use serde::{Deserialize, Serialize};

use crate::{
    category::{Category, CategoryId},
    database_id::{DatabaseID, UserID},
};

/// Database identifier for a preference.
pub type PreferenceId = DatabaseID;

/// A user's preference, with the category it belongs to.
///
/// The category is resolved when the preference is read, so clients get the
/// category name without a second request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    /// The ID of the preference, assigned by the store.
    pub id: PreferenceId,
    /// The user the preference belongs to.
    pub user_id: UserID,
    /// The category the preference belongs to.
    pub category: Category,
    /// The preference itself, e.g. "vegetarian".
    pub value: String,
}

/// Request body for preference creation and editing.
///
/// Updates replace every field, so this is also the full record for an update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceData {
    /// The user the preference belongs to.
    pub user_id: UserID,
    /// Must refer to an existing category.
    pub category_id: CategoryId,
    /// The preference itself.
    pub value: String,
}
