//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router, middleware,
    routing::{get, post, put},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    category::{
        create_category_endpoint, get_categories_endpoint, get_category_stats_endpoint,
        suggest_categories_endpoint,
    },
    classifier::{get_ai_status, test_ai_classification},
    endpoints,
    logging::logging_middleware,
    stats::{get_monthly_stats_endpoint, get_summary_endpoint},
    transaction::{
        batch_recategorize_endpoint, create_transaction_endpoint, delete_transaction_endpoint,
        get_transaction_endpoint, get_transactions_endpoint, recategorize_transaction_endpoint,
        update_transaction_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Every route under `/api/v1` takes a [crate::Claims] argument, so requests
/// without a valid bearer token are rejected before the handler runs.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new().route(endpoints::HEALTH, get(get_health));

    let protected_routes = Router::new()
        .route(
            endpoints::CATEGORIES,
            get(get_categories_endpoint).post(create_category_endpoint),
        )
        .route(
            endpoints::CATEGORY_SUGGESTIONS,
            get(suggest_categories_endpoint),
        )
        .route(endpoints::CATEGORY_STATS, get(get_category_stats_endpoint))
        .route(
            endpoints::TRANSACTIONS,
            get(get_transactions_endpoint).post(create_transaction_endpoint),
        )
        .route(
            endpoints::TRANSACTION,
            get(get_transaction_endpoint)
                .put(update_transaction_endpoint)
                .delete(delete_transaction_endpoint),
        )
        .route(
            endpoints::RECATEGORIZE_TRANSACTION,
            put(recategorize_transaction_endpoint),
        )
        .route(
            endpoints::BATCH_RECATEGORIZE,
            post(batch_recategorize_endpoint),
        )
        .route(endpoints::AI_STATUS, get(get_ai_status))
        .route(endpoints::AI_TEST, post(test_ai_classification))
        .route(endpoints::STATS_SUMMARY, get(get_summary_endpoint))
        .route(endpoints::STATS_MONTHLY, get(get_monthly_stats_endpoint));

    protected_routes
        .merge(unprotected_routes)
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// The response body for the liveness check.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_owned(),
        service: env!("CARGO_PKG_NAME").to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    })
}

async fn get_404_not_found() -> Error {
    Error::NotFound
}
