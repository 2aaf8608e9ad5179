//! Route handlers for user preferences.

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};

use crate::{
    AppState, Error,
    extract::{AppJson, AppPath},
    category::CategoryStore,
    database_id::UserID,
    preference::{Preference, PreferenceData, PreferenceId, PreferenceStore},
    routing::DeleteResponse,
};

/// The state needed by the preference route handlers.
#[derive(Debug, Clone)]
pub struct PreferenceState<P>
where
    P: PreferenceStore + Send + Sync,
{
    /// The store for preferences.
    pub preference_store: P,
}

impl<C, P> FromRef<AppState<C, P>> for PreferenceState<P>
where
    C: CategoryStore + Send + Sync,
    P: PreferenceStore + Clone + Send + Sync,
{
    fn from_ref(state: &AppState<C, P>) -> Self {
        Self {
            preference_store: state.preference_store.clone(),
        }
    }
}

/// Create a preference, responding with the new preference and `201 Created`.
///
/// Responds with `422 Unprocessable Entity` if the category does not exist.
pub async fn create_preference_endpoint<P>(
    State(state): State<PreferenceState<P>>,
    AppJson(new_preference): AppJson<PreferenceData>,
) -> Result<(StatusCode, Json<Preference>), Error>
where
    P: PreferenceStore + Send + Sync,
{
    let preference = state.preference_store.create(new_preference)?;

    tracing::info!(
        "Created preference {} for user {} in category {}",
        preference.id,
        preference.user_id,
        preference.category.id
    );

    Ok((StatusCode::CREATED, Json(preference)))
}

/// List all preferences.
pub async fn get_preferences_endpoint<P>(
    State(state): State<PreferenceState<P>>,
) -> Result<Json<Vec<Preference>>, Error>
where
    P: PreferenceStore + Send + Sync,
{
    state.preference_store.get_all().map(Json)
}

/// List the preferences of a single user.
///
/// A user without preferences gets an empty list, not an error.
pub async fn get_user_preferences_endpoint<P>(
    State(state): State<PreferenceState<P>>,
    AppPath(user_id): AppPath<UserID>,
) -> Result<Json<Vec<Preference>>, Error>
where
    P: PreferenceStore + Send + Sync,
{
    state.preference_store.get_by_user(user_id).map(Json)
}

/// Get a preference by its ID.
pub async fn get_preference_endpoint<P>(
    State(state): State<PreferenceState<P>>,
    AppPath(preference_id): AppPath<PreferenceId>,
) -> Result<Json<Preference>, Error>
where
    P: PreferenceStore + Send + Sync,
{
    state.preference_store.get(preference_id).map(Json)
}

/// Replace every field of a preference.
pub async fn update_preference_endpoint<P>(
    State(state): State<PreferenceState<P>>,
    AppPath(preference_id): AppPath<PreferenceId>,
    AppJson(preference_data): AppJson<PreferenceData>,
) -> Result<Json<Preference>, Error>
where
    P: PreferenceStore + Send + Sync,
{
    let preference = state
        .preference_store
        .update(preference_id, preference_data)?;

    tracing::info!("Updated preference {}", preference.id);

    Ok(Json(preference))
}

/// Delete a preference. Its category is left untouched.
pub async fn delete_preference_endpoint<P>(
    State(state): State<PreferenceState<P>>,
    AppPath(preference_id): AppPath<PreferenceId>,
) -> Result<Json<DeleteResponse>, Error>
where
    P: PreferenceStore + Send + Sync,
{
    state.preference_store.delete(preference_id)?;

    tracing::info!("Deleted preference {preference_id}");

    Ok(Json(DeleteResponse::new("Preference deleted")))
}
