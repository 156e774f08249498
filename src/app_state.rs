//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{Error, auth::AuthState, classifier::Classifier, db::initialize};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// The state needed to verify bearer tokens.
    pub auth_state: AuthState,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The client for the transaction classification service.
    pub classifier: Arc<dyn Classifier>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `jwt_secret` is the secret that bearer tokens are signed with.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        jwt_secret: &str,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            auth_state: AuthState::new(jwt_secret),
            db_connection: Arc::new(Mutex::new(db_connection)),
            classifier,
        })
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth_state.clone()
    }
}

/// The state needed by endpoints that only read or write the database.
#[derive(Clone)]
pub struct DatabaseState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DatabaseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed by endpoints that categorize transactions.
#[derive(Clone)]
pub struct CategorizationState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
    /// The client for the transaction classification service.
    pub classifier: Arc<dyn Classifier>,
}

impl FromRef<AppState> for CategorizationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            classifier: state.classifier.clone(),
        }
    }
}

/// The state needed by the classification service diagnostics endpoints.
#[derive(Clone)]
pub struct ClassifierState {
    /// The client for the transaction classification service.
    pub classifier: Arc<dyn Classifier>,
}

impl FromRef<AppState> for ClassifierState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            classifier: state.classifier.clone(),
        }
    }
}

/// Acquire the database lock.
///
/// # Errors
/// Returns an [Error::DatabaseLockError] if the lock is poisoned.
pub fn lock_connection(
    db_connection: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}
