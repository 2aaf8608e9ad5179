//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;

/// Identifies the user that owns a preference.
///
/// This service has no user registry, so user IDs are stored as given and never checked.
pub type UserID = i64;
