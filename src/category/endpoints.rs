//! Route handlers for creating, reading, renaming and deleting categories.

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};

use crate::{
    AppState, Error,
    extract::{AppJson, AppPath},
    category::{Category, CategoryData, CategoryId, CategoryName, CategoryStore},
    preference::PreferenceStore,
    routing::DeleteResponse,
};

/// The state needed by the category route handlers.
#[derive(Debug, Clone)]
pub struct CategoryState<C>
where
    C: CategoryStore + Send + Sync,
{
    /// The store for categories.
    pub category_store: C,
}

impl<C, P> FromRef<AppState<C, P>> for CategoryState<C>
where
    C: CategoryStore + Clone + Send + Sync,
    P: PreferenceStore + Send + Sync,
{
    fn from_ref(state: &AppState<C, P>) -> Self {
        Self {
            category_store: state.category_store.clone(),
        }
    }
}

/// Create a category, responding with the new category and `201 Created`.
pub async fn create_category_endpoint<C>(
    State(state): State<CategoryState<C>>,
    AppJson(new_category): AppJson<CategoryData>,
) -> Result<(StatusCode, Json<Category>), Error>
where
    C: CategoryStore + Send + Sync,
{
    let name = CategoryName::new(&new_category.name)?;
    let category = state.category_store.create(name)?;

    tracing::info!("Created category {} \"{}\"", category.id, category.name);

    Ok((StatusCode::CREATED, Json(category)))
}

/// List all categories in the order they were created.
pub async fn get_categories_endpoint<C>(
    State(state): State<CategoryState<C>>,
) -> Result<Json<Vec<Category>>, Error>
where
    C: CategoryStore + Send + Sync,
{
    state.category_store.get_all().map(Json)
}

/// Get a category by its ID, responding with `404 Not Found` if it does not exist.
pub async fn get_category_endpoint<C>(
    State(state): State<CategoryState<C>>,
    AppPath(category_id): AppPath<CategoryId>,
) -> Result<Json<Category>, Error>
where
    C: CategoryStore + Send + Sync,
{
    state.category_store.get(category_id).map(Json)
}

/// Rename a category.
pub async fn update_category_endpoint<C>(
    State(state): State<CategoryState<C>>,
    AppPath(category_id): AppPath<CategoryId>,
    AppJson(category_data): AppJson<CategoryData>,
) -> Result<Json<Category>, Error>
where
    C: CategoryStore + Send + Sync,
{
    let name = CategoryName::new(&category_data.name)?;
    let category = state.category_store.update(category_id, name)?;

    tracing::info!("Renamed category {} to \"{}\"", category.id, category.name);

    Ok(Json(category))
}

/// Delete a category that no preference refers to.
pub async fn delete_category_endpoint<C>(
    State(state): State<CategoryState<C>>,
    AppPath(category_id): AppPath<CategoryId>,
) -> Result<Json<DeleteResponse>, Error>
where
    C: CategoryStore + Send + Sync,
{
    state.category_store.delete(category_id)?;

    tracing::info!("Deleted category {category_id}");

    Ok(Json(DeleteResponse::new("Category deleted")))
}
