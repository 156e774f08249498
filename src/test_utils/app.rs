//! Helpers for testing route handlers.

use std::sync::Arc;

use axum_test::TestServer;
use jsonwebtoken::EncodingKey;
use rusqlite::Connection;
use time::Duration;

use crate::{
    AppState, build_router,
    auth::encode_jwt,
    classifier::Classifier,
    db::initialize,
    user::User,
};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret";

/// An initialized in-memory database.
pub fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize(&connection).expect("Could not initialize database");
    connection
}

pub fn get_test_app_state(classifier: Arc<dyn Classifier>) -> AppState {
    AppState::new(get_test_connection(), TEST_JWT_SECRET, classifier)
        .expect("Could not create app state")
}

pub fn get_test_server(state: AppState) -> TestServer {
    TestServer::try_new(build_router(state)).expect("Could not create test server")
}

/// A valid bearer token for `user`.
pub fn bearer_token(user: &User) -> String {
    encode_jwt(
        user,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
        Duration::minutes(15),
    )
    .expect("Could not create token")
}
