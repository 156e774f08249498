//! The route handler for creating transactions.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    app_state::CategorizationState,
    auth::Claims,
    transaction::{
        CategorizationMethod, NewTransaction, TransactionView, create_categorized_transaction,
    },
};

/// What the classification service said about a new transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct AiInfo {
    /// The label the classifier chose, or the fallback label if it failed.
    pub predicted_category: String,
    /// The classifier's confidence in the label.
    pub confidence: f64,
    /// Whether the label matched an existing category or created one.
    pub method: CategorizationMethod,
}

/// The response body for a new transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTransactionResponse {
    /// The stored transaction.
    pub transaction: TransactionView,
    pub ai_info: AiInfo,
}

/// A route handler for creating a new transaction, categorized by the classification service.
///
/// Responds with 201 Created even when the classification service is down,
/// in which case the transaction is stored in the fallback category.
pub async fn create_transaction_endpoint(
    State(state): State<CategorizationState>,
    claims: Claims,
    request: Result<Json<NewTransaction>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateTransactionResponse>), Error> {
    let Json(new_transaction) =
        request.map_err(|rejection| Error::Validation(rejection.body_text()))?;

    let created = create_categorized_transaction(
        new_transaction,
        claims.user_id,
        state.classifier.as_ref(),
        &state.db_connection,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTransactionResponse {
            transaction: created.view(),
            ai_info: AiInfo {
                predicted_category: created.label,
                confidence: created.confidence,
                method: created.method,
            },
        }),
    ))
}

#[cfg(test)]
mod create_transaction_endpoint_tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;
    use time::macros::datetime;

    use crate::{
        ErrorResponse,
        classifier::{Classifier, ClassifierError},
        endpoints,
        test_utils::{StubClassifier, bearer_token, get_test_app_state, get_test_server},
        transaction::CategorizationMethod,
        user::create_user,
    };

    use super::CreateTransactionResponse;

    async fn post_transaction(
        classifier: StubClassifier,
        body: serde_json::Value,
    ) -> axum_test::TestResponse {
        let classifier: Arc<dyn Classifier> = Arc::new(classifier);
        let state = get_test_app_state(classifier);
        let user = create_user("alice", &state.db_connection.lock().unwrap()).unwrap();
        let server = get_test_server(state);

        server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(bearer_token(&user))
            .json(&body)
            .await
    }

    #[tokio::test]
    async fn creates_categorized_transaction() {
        let response = post_transaction(
            StubClassifier::new("Makanan & Minuman", 0.92),
            json!({
                "description": "Beli nasi ayam di warteg",
                "amount": -25000.0,
                "transaction_date": "2025-01-15T12:30:00Z",
            }),
        )
        .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<CreateTransactionResponse>();
        assert_eq!(
            body.transaction.category_name.as_deref(),
            Some("Makanan & Minuman")
        );
        assert_eq!(body.transaction.amount, -25000.0);
        assert_eq!(
            body.transaction.transaction_date,
            datetime!(2025-01-15 12:30 UTC)
        );
        assert_eq!(body.transaction.ai_confidence, 0.92);
        assert_eq!(body.ai_info.predicted_category, "Makanan & Minuman");
        assert_eq!(body.ai_info.confidence, 0.92);
        assert_eq!(body.ai_info.method, CategorizationMethod::AiCategorization);
    }

    #[tokio::test]
    async fn classifier_outage_still_creates_transaction() {
        let response = post_transaction(
            StubClassifier::failing(ClassifierError::Unreachable(
                "connection refused".to_owned(),
            )),
            json!({ "description": "Bayar listrik PLN", "amount": -350000.0 }),
        )
        .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<CreateTransactionResponse>();
        assert_eq!(body.transaction.category_name.as_deref(), Some("Lainnya"));
        assert_eq!(body.ai_info.predicted_category, "Lainnya");
        assert_eq!(body.ai_info.confidence, 0.0);
    }

    #[tokio::test]
    async fn missing_amount_is_validation_error() {
        let response = post_transaction(
            StubClassifier::new("Tagihan", 0.9),
            json!({ "description": "Bayar listrik PLN" }),
        )
        .await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<ErrorResponse>().error, "validation_error");
    }

    #[tokio::test]
    async fn invalid_utf8_body_is_validation_error() {
        let state = get_test_app_state(Arc::new(StubClassifier::new("Tagihan", 0.9)));
        let user = create_user("alice", &state.db_connection.lock().unwrap()).unwrap();
        let server = get_test_server(state);
        let mut body = br#"{"description": "Bayar "#.to_vec();
        body.push(0xFF);
        body.extend_from_slice(br#" listrik", "amount": -350000.0}"#);

        let response = server
            .post(endpoints::TRANSACTIONS)
            .authorization_bearer(bearer_token(&user))
            .content_type("application/json")
            .bytes(body.into())
            .await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<ErrorResponse>().error, "validation_error");
    }

    #[tokio::test]
    async fn blank_description_is_validation_error() {
        let response = post_transaction(
            StubClassifier::new("Tagihan", 0.9),
            json!({ "description": "  ", "amount": 10.0 }),
        )
        .await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<ErrorResponse>().error, "validation_error");
    }
}
