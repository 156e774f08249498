//! A personal finance tracker backend.
//!
//! Users record income and expense transactions over a JSON REST API. New
//! transactions are categorized by an external text classification service,
//! and transactions can be re-categorized one at a time or in batches, either
//! manually or by asking the classifier again.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde::{Deserialize, Serialize};
use tokio::signal;

mod app_state;
mod auth;
mod category;
mod classifier;
mod database_id;
mod db;
mod endpoints;
mod logging;
mod routing;
mod stats;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{Claims, encode_jwt};
pub use classifier::{
    Classifier, ClassifierConfig, ClassifierError, FALLBACK_CATEGORY, HttpClassifier, Prediction,
};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use user::{User, UserID, create_user};

use crate::{classifier::ClassifierError as AiError, database_id::CategoryId};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
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

/// The errors that may occur in the application.
///
/// Every variant maps to a stable, machine readable code (see [Error::code])
/// that is sent to API clients alongside a human readable message.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request body or a query parameter could not be parsed or failed
    /// validation.
    #[error("{0}")]
    Validation(String),

    /// The request did not select exactly one categorization mode.
    #[error("{0}")]
    InvalidRequest(String),

    /// A batch operation was requested with no transaction IDs.
    #[error("no transactions were selected")]
    EmptyRequest,

    /// The category does not exist or is owned by another user.
    #[error("category {0} could not be found")]
    InvalidCategory(CategoryId),

    /// A category with the same name and owner already exists.
    #[error("the category \"{0}\" already exists")]
    DuplicateCategory(String),

    /// The request did not include a bearer token.
    #[error("an authorization token is required")]
    MissingToken,

    /// The bearer token could not be decoded or has expired.
    #[error("the authorization token is invalid or has expired")]
    InvalidToken,

    /// A token could not be created.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("could not create token: {0}")]
    TokenCreation(String),

    /// The transaction does not exist, has been deleted or is owned by
    /// another user.
    #[error("the transaction could not be found")]
    TransactionNotFound,

    /// None of the transactions in a batch request could be found.
    #[error("none of the selected transactions could be found")]
    NoTransactions,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// A category could not be found or created for a transaction.
    #[error("could not determine the transaction category: {0}")]
    CategoryResolution(String),

    /// The classification service failed during a batch request.
    #[error("batch categorization failed: {0}")]
    AiBatch(AiError),

    /// The classification service failed during a diagnostic request.
    #[error("categorization failed: {0}")]
    Ai(AiError),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// The stable error code sent to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation_error",
            Error::InvalidRequest(_) => "invalid_request",
            Error::EmptyRequest => "empty_request",
            Error::InvalidCategory(_) => "invalid_category",
            Error::DuplicateCategory(_) => "duplicate_category",
            Error::MissingToken => "missing_token",
            Error::InvalidToken => "invalid_token",
            Error::TokenCreation(_) => "token_error",
            Error::TransactionNotFound => "transaction_not_found",
            Error::NoTransactions => "no_transactions",
            Error::NotFound => "not_found",
            Error::CategoryResolution(_) => "category_error",
            Error::AiBatch(_) => "ai_batch_error",
            Error::Ai(_) => "ai_error",
            Error::DatabaseLockError | Error::SqlError(_) => "database_error",
        }
    }

    /// The HTTP status code for the error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_)
            | Error::InvalidRequest(_)
            | Error::EmptyRequest
            | Error::InvalidCategory(_) => StatusCode::BAD_REQUEST,
            Error::DuplicateCategory(_) => StatusCode::CONFLICT,
            Error::MissingToken | Error::InvalidToken => StatusCode::UNAUTHORIZED,
            Error::TransactionNotFound | Error::NoTransactions | Error::NotFound => {
                StatusCode::NOT_FOUND
            }
            Error::AiBatch(_) | Error::Ai(_) => StatusCode::BAD_GATEWAY,
            Error::TokenCreation(_)
            | Error::CategoryResolution(_)
            | Error::DatabaseLockError
            | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Error::CategoryResolution(_) => {
                "Could not determine the category for the transaction.".to_owned()
            }
            Error::AiBatch(_) => {
                "The categorization service could not categorize the selected transactions."
                    .to_owned()
            }
            Error::TokenCreation(_) | Error::DatabaseLockError | Error::SqlError(_) => {
                "An unexpected error occurred, check the server logs for more details.".to_owned()
            }
            error => error.to_string(),
        }
    }
}

/// The JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A stable, machine readable error code, e.g. "invalid_category".
    pub error: String,
    /// A human readable description of the error.
    pub message: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server side details are not intended to be shown to the client.
        if status.is_server_error() {
            tracing::error!("An error occurred while handling a request: {}", self);
        }

        let body = ErrorResponse {
            error: self.code().to_owned(),
            message: self.client_message(),
        };

        (status, Json(body)).into_response()
    }
}
