//! Defines the app level error type and its conversion to JSON error responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::ErrorCode;
use serde::{Deserialize, Serialize};

use crate::{category::CategoryId, category::MAX_CATEGORY_NAME_LENGTH};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used to create a category name.
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    /// The category name is longer than [MAX_CATEGORY_NAME_LENGTH] characters.
    #[error("category name cannot be longer than {MAX_CATEGORY_NAME_LENGTH} characters, got {0}")]
    CategoryNameTooLong(usize),

    /// The specified category name already exists in the database.
    ///
    /// Category names are unique, so creating or renaming a category to a
    /// name that another category already uses is rejected.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategoryName(String),

    /// The category ID used to create or update a preference did not match a
    /// category in the database.
    #[error("the category ID {0} does not refer to a valid category")]
    InvalidCategory(CategoryId),

    /// Tried to delete a category that preferences still refer to.
    ///
    /// The preferences must be deleted or moved to another category first.
    #[error("the category {0} is still used by one or more preferences")]
    CategoryInUse(CategoryId),

    /// The request body or path could not be parsed, e.g. a missing JSON
    /// field or an ID that is not an integer.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request body is larger than the server accepts.
    #[error("the request body cannot be larger than {0} bytes")]
    RequestBodyTooLarge(usize),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update a preference that does not exist
    #[error("tried to update a preference that is not in the database")]
    UpdateMissingPreference,

    /// Tried to delete a preference that does not exist
    #[error("tried to delete a preference that is not in the database")]
    DeleteMissingPreference,

    /// The database was busy or locked by another connection.
    ///
    /// This is the only error that is safe to retry, see [crate::retry::with_retry].
    #[error("the store is temporarily unavailable: {0}")]
    StoreUnavailable(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(ref sql_error, _)
                if matches!(
                    sql_error.code,
                    ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked
                ) =>
            {
                tracing::warn!("the database is busy: {}", value);
                Error::StoreUnavailable(value.to_string())
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

/// The JSON body sent to clients when a request fails.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    /// A stable, machine readable error code, e.g. "duplicate_name".
    pub code: String,
    /// A human readable description of the error.
    pub detail: String,
}

impl Error {
    /// The stable error code reported to clients.
    pub fn code(&self) -> &'static str {
        match self {
            Error::EmptyCategoryName | Error::CategoryNameTooLong(_) => "invalid_category_name",
            Error::InvalidRequest(_) => "invalid_request",
            Error::RequestBodyTooLarge(_) => "payload_too_large",
            Error::DuplicateCategoryName(_) => "duplicate_name",
            Error::InvalidCategory(_) => "category_not_found",
            Error::CategoryInUse(_) => "category_in_use",
            Error::NotFound
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory
            | Error::UpdateMissingPreference
            | Error::DeleteMissingPreference => "not_found",
            Error::StoreUnavailable(_) => "store_unavailable",
            Error::SqlError(_) | Error::DatabaseLockError => "internal_error",
        }
    }

    /// The HTTP status code reported to clients.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::EmptyCategoryName
            | Error::CategoryNameTooLong(_)
            | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateCategoryName(_) | Error::CategoryInUse(_) => StatusCode::CONFLICT,
            Error::InvalidCategory(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::RequestBodyTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::NotFound
            | Error::UpdateMissingCategory
            | Error::DeleteMissingCategory
            | Error::UpdateMissingPreference
            | Error::DeleteMissingPreference => StatusCode::NOT_FOUND,
            Error::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::SqlError(_) | Error::DatabaseLockError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let detail = match self {
            // SQL errors may leak details about the schema, so they are only logged.
            Error::SqlError(_) | Error::DatabaseLockError => {
                tracing::error!("An unexpected error occurred: {}", self);
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            ref error => error.to_string(),
        };

        let body = ErrorResponse {
            code: self.code().to_owned(),
            detail,
        };

        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use rusqlite::{Connection, ErrorCode};

    use crate::Error;

    use super::ErrorResponse;

    async fn parse_body(error: Error) -> (StatusCode, ErrorResponse) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not read response body");

        (
            status,
            serde_json::from_slice(&body).expect("Could not parse error body"),
        )
    }

    #[test]
    fn query_returned_no_rows_is_not_found() {
        let error: Error = rusqlite::Error::QueryReturnedNoRows.into();

        assert_eq!(error, Error::NotFound);
    }

    #[test]
    fn busy_database_is_store_unavailable() {
        let sql_error = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: ErrorCode::DatabaseBusy,
                extended_code: 5,
            },
            Some("database is locked".to_owned()),
        );

        let error: Error = sql_error.into();

        assert!(matches!(error, Error::StoreUnavailable(_)));
    }

    #[test]
    fn other_sql_errors_are_wrapped() {
        let connection = Connection::open_in_memory().unwrap();
        let sql_error = connection
            .execute("SELECT * FROM missing_table", [])
            .expect_err("Query on missing table should fail");

        let error: Error = sql_error.into();

        assert!(matches!(error, Error::SqlError(_)));
    }

    #[tokio::test]
    async fn error_kinds_have_distinct_codes() {
        let cases = [
            (
                Error::DuplicateCategoryName("diet".to_owned()),
                StatusCode::CONFLICT,
                "duplicate_name",
            ),
            (Error::NotFound, StatusCode::NOT_FOUND, "not_found"),
            (
                Error::DeleteMissingPreference,
                StatusCode::NOT_FOUND,
                "not_found",
            ),
            (
                Error::InvalidCategory(999),
                StatusCode::UNPROCESSABLE_ENTITY,
                "category_not_found",
            ),
            (
                Error::CategoryInUse(2),
                StatusCode::CONFLICT,
                "category_in_use",
            ),
            (
                Error::StoreUnavailable("busy".to_owned()),
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
            ),
            (
                Error::EmptyCategoryName,
                StatusCode::BAD_REQUEST,
                "invalid_category_name",
            ),
            (
                Error::InvalidRequest("missing field `name`".to_owned()),
                StatusCode::BAD_REQUEST,
                "invalid_request",
            ),
            (
                Error::RequestBodyTooLarge(1024),
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
            ),
        ];

        for (error, want_status, want_code) in cases {
            let (status, body) = parse_body(error).await;

            assert_eq!(status, want_status);
            assert_eq!(body.code, want_code);
        }
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) = parse_body(Error::SqlError(rusqlite::Error::InvalidQuery)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.code, "internal_error");
        assert!(!body.detail.contains("SQL"), "got detail {}", body.detail);
    }
}
