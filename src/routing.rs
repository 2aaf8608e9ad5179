//! Application router configuration.

use axum::{
    Router, middleware,
    routing::{MethodRouter, get, post},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    category::{
        CategoryStore, create_category_endpoint, delete_category_endpoint,
        get_categories_endpoint, get_category_endpoint, update_category_endpoint,
    },
    endpoints,
    logging::logging_middleware,
    preference::{
        PreferenceStore, create_preference_endpoint, delete_preference_endpoint,
        get_preference_endpoint, get_preferences_endpoint, get_user_preferences_endpoint,
        update_preference_endpoint,
    },
};

/// The body of a successful delete response.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DeleteResponse {
    /// A short confirmation, e.g. "Category deleted".
    pub detail: String,
}

impl DeleteResponse {
    pub(crate) fn new(detail: &str) -> Self {
        Self {
            detail: detail.to_owned(),
        }
    }
}

/// Return a router with all the app's routes.
///
/// The category and preference collections are served both with and without
/// a trailing slash.
pub fn build_router<C, P>(state: AppState<C, P>) -> Router
where
    C: CategoryStore + Clone + Send + Sync + 'static,
    P: PreferenceStore + Clone + Send + Sync + 'static,
{
    let categories: MethodRouter<AppState<C, P>> =
        post(create_category_endpoint::<C>).get(get_categories_endpoint::<C>);
    let preferences: MethodRouter<AppState<C, P>> =
        post(create_preference_endpoint::<P>).get(get_preferences_endpoint::<P>);

    Router::new()
        .route(endpoints::CATEGORIES, categories.clone())
        .route(endpoints::CATEGORIES_WITH_SLASH, categories)
        .route(
            endpoints::CATEGORY,
            get(get_category_endpoint::<C>)
                .put(update_category_endpoint::<C>)
                .delete(delete_category_endpoint::<C>),
        )
        .route(endpoints::PREFERENCES, preferences.clone())
        .route(endpoints::PREFERENCES_WITH_SLASH, preferences)
        .route(
            endpoints::USER_PREFERENCES,
            get(get_user_preferences_endpoint::<P>),
        )
        .route(
            endpoints::PREFERENCE,
            get(get_preference_endpoint::<P>)
                .put(update_preference_endpoint::<P>)
                .delete(delete_preference_endpoint::<P>),
        )
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}
