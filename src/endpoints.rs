//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/categories/{category_id}', use [format_endpoint].

/// The route for creating and listing categories.
pub const CATEGORIES: &str = "/categories";
/// [CATEGORIES] with a trailing slash, which existing clients use.
pub const CATEGORIES_WITH_SLASH: &str = "/categories/";
/// The route for getting, updating and deleting a single category.
pub const CATEGORY: &str = "/categories/{category_id}";
/// The route for creating and listing preferences.
pub const PREFERENCES: &str = "/preferences";
/// [PREFERENCES] with a trailing slash, which existing clients use.
pub const PREFERENCES_WITH_SLASH: &str = "/preferences/";
/// The route for getting, updating and deleting a single preference.
pub const PREFERENCE: &str = "/preferences/{preference_id}";
/// The route for listing the preferences of one user.
pub const USER_PREFERENCES: &str = "/preferences/user/{user_id}";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace and ends with a
/// right brace, e.g. '{category_id}' in '/categories/{category_id}'.
///
/// Only the first parameter is replaced. If no parameter is found in
/// `endpoint_path`, the function returns the original `endpoint_path`.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |end| param_start + end + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
