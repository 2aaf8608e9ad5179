//! A REST API for managing preference categories and the preferences users
//! record against them.
//!
//! Categories have unique names and are referred to by preferences.
//! A category cannot be deleted while a preference still refers to it, and a
//! preference can only be created in, or moved to, a category that exists.
//!
//! Data is stored in SQLite, see [create_app_state] and [build_router].

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod category;
mod database_id;
mod db;
mod endpoints;
mod error;
mod extract;
mod logging;
mod preference;
mod retry;
mod routing;

pub use app_state::{AppState, SQLAppState, create_app_state};
pub use category::{
    Category, CategoryData, CategoryId, CategoryName, CategoryStore, MAX_CATEGORY_NAME_LENGTH,
    SQLiteCategoryStore,
};
pub use database_id::{DatabaseID, UserID};
pub use db::{initialize as initialize_db, open as open_db};
pub use error::{Error, ErrorResponse};
pub use logging::{LOG_BODY_LENGTH_LIMIT, MAX_REQUEST_BODY_BYTES, logging_middleware};
pub use preference::{Preference, PreferenceData, PreferenceId, PreferenceStore, SQLitePreferenceStore};
pub use routing::{DeleteResponse, build_router};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
