//! Route handlers for changing the category of transactions.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    app_state::CategorizationState,
    auth::Claims,
    database_id::TransactionId,
    transaction::{
        BatchOutcome, BatchRecategorizeRequest, CategorizationMethod, RecategorizeMode,
        RecategorizeRequest, TransactionView, batch_recategorize, parse_batch_request,
        parse_transaction_id, recategorize_transaction,
    },
};

/// The response body for a re-categorized transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct RecategorizeResponse {
    pub transaction: TransactionView,
    pub method: CategorizationMethod,
    pub confidence: f64,
}

/// A route handler for changing the category of a single transaction.
///
/// The request body must select exactly one of `category_id`, `use_ai` and `category_name`.
pub async fn recategorize_transaction_endpoint(
    State(state): State<CategorizationState>,
    claims: Claims,
    path: Result<Path<TransactionId>, PathRejection>,
    request: Result<Json<RecategorizeRequest>, JsonRejection>,
) -> Result<Json<RecategorizeResponse>, Error> {
    let transaction_id = parse_transaction_id(path)?;
    let Json(request) = request.map_err(|rejection| Error::Validation(rejection.body_text()))?;
    let mode = RecategorizeMode::try_from(request)?;

    let recategorized = recategorize_transaction(
        transaction_id,
        claims.user_id,
        mode,
        state.classifier.as_ref(),
        &state.db_connection,
    )
    .await?;

    Ok(Json(RecategorizeResponse {
        transaction: recategorized.view(),
        method: recategorized.method,
        confidence: recategorized.confidence,
    }))
}

/// A route handler for changing the category of many transactions at once.
///
/// Responds with 200 OK when some of the transactions could not be changed,
/// the counts in the response body say how many succeeded.
pub async fn batch_recategorize_endpoint(
    State(state): State<CategorizationState>,
    claims: Claims,
    request: Result<Json<BatchRecategorizeRequest>, JsonRejection>,
) -> Result<Json<BatchOutcome>, Error> {
    let Json(request) = request.map_err(|rejection| Error::Validation(rejection.body_text()))?;
    let (transaction_ids, mode) = parse_batch_request(request)?;

    let outcome = batch_recategorize(
        &transaction_ids,
        claims.user_id,
        mode,
        state.classifier.as_ref(),
        &state.db_connection,
    )
    .await?;

    Ok(Json(outcome))
}

#[cfg(test)]
mod recategorize_endpoint_tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::{
        AppState, ErrorResponse,
        classifier::{Classifier, ClassifierError},
        endpoints::{self, format_endpoint},
        test_utils::{StubClassifier, bearer_token, get_test_app_state, get_test_server},
        transaction::{
            BatchOutcome, CategorizationMethod, Transaction, create_transaction,
            get_transactions_by_ids,
        },
        user::{User, create_user},
    };

    use super::RecategorizeResponse;

    fn get_state_with_transactions(
        classifier: StubClassifier,
    ) -> (AppState, User, Vec<Transaction>) {
        let classifier: Arc<dyn Classifier> = Arc::new(classifier);
        let state = get_test_app_state(classifier);
        let connection = state.db_connection.lock().unwrap();
        let user = create_user("alice", &connection).unwrap();
        let transactions = ["Isi bensin pertamina", "Nonton bioskop"]
            .iter()
            .map(|description| {
                create_transaction(Transaction::build(user.id, -50.0, description), &connection)
                    .unwrap()
            })
            .collect();
        drop(connection);

        (state, user, transactions)
    }

    #[tokio::test]
    async fn recategorize_with_category_id() {
        let (state, user, transactions) = get_state_with_transactions(StubClassifier::default());
        let server = get_test_server(state);

        let response = server
            .put(&format_endpoint(
                endpoints::RECATEGORIZE_TRANSACTION,
                transactions[0].id,
            ))
            .authorization_bearer(bearer_token(&user))
            .json(&json!({ "category_id": 2 }))
            .await;

        response.assert_status_ok();
        let body = response.json::<RecategorizeResponse>();
        assert_eq!(body.method, CategorizationMethod::ManualOverride);
        assert_eq!(body.confidence, 1.0);
        assert_eq!(body.transaction.category_name.as_deref(), Some("Transportasi"));
        assert_eq!(
            body.transaction.prediction_method,
            CategorizationMethod::ManualOverride
        );
    }

    #[tokio::test]
    async fn recategorize_with_ai() {
        let (state, user, transactions) =
            get_state_with_transactions(StubClassifier::new("Transportasi", 0.77));
        let server = get_test_server(state);

        let response = server
            .put(&format_endpoint(
                endpoints::RECATEGORIZE_TRANSACTION,
                transactions[0].id,
            ))
            .authorization_bearer(bearer_token(&user))
            .json(&json!({ "use_ai": true }))
            .await;

        response.assert_status_ok();
        let body = response.json::<RecategorizeResponse>();
        assert_eq!(body.method, CategorizationMethod::AiCategorization);
        assert_eq!(body.confidence, 0.77);
    }

    #[tokio::test]
    async fn recategorize_with_new_category_name() {
        let (state, user, transactions) = get_state_with_transactions(StubClassifier::default());
        let server = get_test_server(state);

        let response = server
            .put(&format_endpoint(
                endpoints::RECATEGORIZE_TRANSACTION,
                transactions[1].id,
            ))
            .authorization_bearer(bearer_token(&user))
            .json(&json!({ "category_name": "Custom" }))
            .await;

        response.assert_status_ok();
        let body = response.json::<RecategorizeResponse>();
        assert_eq!(body.method, CategorizationMethod::ManualNewCategory);
        assert_eq!(body.transaction.category_name.as_deref(), Some("Custom"));
    }

    #[tokio::test]
    async fn recategorize_without_mode_is_invalid_request() {
        let (state, user, transactions) = get_state_with_transactions(StubClassifier::default());
        let server = get_test_server(state);

        let response = server
            .put(&format_endpoint(
                endpoints::RECATEGORIZE_TRANSACTION,
                transactions[0].id,
            ))
            .authorization_bearer(bearer_token(&user))
            .json(&json!({}))
            .await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<ErrorResponse>().error, "invalid_request");
    }

    #[tokio::test]
    async fn recategorize_with_hidden_category_is_invalid_category() {
        let (state, user, transactions) = get_state_with_transactions(StubClassifier::default());
        let server = get_test_server(state);

        let response = server
            .put(&format_endpoint(
                endpoints::RECATEGORIZE_TRANSACTION,
                transactions[0].id,
            ))
            .authorization_bearer(bearer_token(&user))
            .json(&json!({ "category_id": 999 }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<ErrorResponse>().error, "invalid_category");
    }

    #[tokio::test]
    async fn recategorize_missing_transaction_is_not_found() {
        let (state, user, _) = get_state_with_transactions(StubClassifier::default());
        let server = get_test_server(state);

        let response = server
            .put(&format_endpoint(endpoints::RECATEGORIZE_TRANSACTION, 999))
            .authorization_bearer(bearer_token(&user))
            .json(&json!({ "category_id": 2 }))
            .await;

        response.assert_status_not_found();
        assert_eq!(
            response.json::<ErrorResponse>().error,
            "transaction_not_found"
        );
    }

    #[tokio::test]
    async fn batch_with_category_id() {
        let (state, user, transactions) = get_state_with_transactions(StubClassifier::default());
        let server = get_test_server(state);

        let response = server
            .post(endpoints::BATCH_RECATEGORIZE)
            .authorization_bearer(bearer_token(&user))
            .json(&json!({
                "transaction_ids": [transactions[1].id, transactions[0].id, 999],
                "category_id": 5,
            }))
            .await;

        response.assert_status_ok();
        let outcome = response.json::<BatchOutcome>();
        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.error_count, 0);
        assert_eq!(outcome.updated_transactions[0].id, transactions[0].id);
        assert_eq!(
            outcome.updated_transactions[1].prediction_method,
            CategorizationMethod::ManualBatch
        );
    }

    #[tokio::test]
    async fn batch_with_ai() {
        let classifier = StubClassifier::default()
            .with_prediction("Isi bensin pertamina", "Transportasi", 0.9)
            .with_prediction("Nonton bioskop", "Hiburan", 0.85);
        let (state, user, transactions) = get_state_with_transactions(classifier);
        let server = get_test_server(state);

        let response = server
            .post(endpoints::BATCH_RECATEGORIZE)
            .authorization_bearer(bearer_token(&user))
            .json(&json!({
                "transaction_ids": [transactions[0].id, transactions[1].id],
                "use_ai": true,
            }))
            .await;

        response.assert_status_ok();
        let outcome = response.json::<BatchOutcome>();
        let categories: Vec<Option<&str>> = outcome
            .updated_transactions
            .iter()
            .map(|view| view.category_name.as_deref())
            .collect();
        assert_eq!(outcome.success_count, 2);
        assert_eq!(categories, vec![Some("Transportasi"), Some("Hiburan")]);
    }

    #[tokio::test]
    async fn batch_classifier_failure_is_ai_batch_error() {
        let classifier = StubClassifier::new("Hiburan", 0.9)
            .with_batch_error(ClassifierError::Timeout);
        let (state, user, transactions) = get_state_with_transactions(classifier);
        let db_connection = state.db_connection.clone();
        let server = get_test_server(state);
        let ids: Vec<i64> = transactions.iter().map(|transaction| transaction.id).collect();

        let response = server
            .post(endpoints::BATCH_RECATEGORIZE)
            .authorization_bearer(bearer_token(&user))
            .json(&json!({ "transaction_ids": ids, "use_ai": true }))
            .await;

        response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
        assert_eq!(response.json::<ErrorResponse>().error, "ai_batch_error");
        let stored = get_transactions_by_ids(&ids, user.id, &db_connection.lock().unwrap())
            .unwrap();
        assert_eq!(stored, transactions);
    }

    #[tokio::test]
    async fn batch_with_no_ids_is_empty_request() {
        let (state, user, _) = get_state_with_transactions(StubClassifier::default());
        let server = get_test_server(state);

        let response = server
            .post(endpoints::BATCH_RECATEGORIZE)
            .authorization_bearer(bearer_token(&user))
            .json(&json!({ "transaction_ids": [], "use_ai": true }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<ErrorResponse>().error, "empty_request");
    }

    #[tokio::test]
    async fn batch_with_unknown_ids_is_no_transactions() {
        let (state, user, _) = get_state_with_transactions(StubClassifier::default());
        let server = get_test_server(state);

        let response = server
            .post(endpoints::BATCH_RECATEGORIZE)
            .authorization_bearer(bearer_token(&user))
            .json(&json!({ "transaction_ids": [998, 999], "category_id": 1 }))
            .await;

        response.assert_status_not_found();
        assert_eq!(response.json::<ErrorResponse>().error, "no_transactions");
    }
}
