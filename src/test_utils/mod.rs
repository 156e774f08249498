#![allow(missing_docs)]

pub(crate) mod app;
pub(crate) mod classifier;

pub(crate) use app::{
    TEST_JWT_SECRET, bearer_token, get_test_app_state, get_test_connection, get_test_server,
};
pub(crate) use classifier::StubClassifier;
