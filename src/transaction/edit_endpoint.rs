//! Route handlers for changing and deleting transactions.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

use crate::{
    Error,
    app_state::{DatabaseState, lock_connection},
    auth::Claims,
    database_id::TransactionId,
    transaction::{
        NewTransaction, TransactionResponse, TransactionUpdate, delete_transaction,
        parse_transaction_id, update_transaction, validate_amount, validate_description,
    },
};

/// A route handler for changing the description, amount and date of a transaction.
///
/// The category is left unchanged, use the recategorize endpoint to change it.
pub async fn update_transaction_endpoint(
    State(state): State<DatabaseState>,
    claims: Claims,
    path: Result<Path<TransactionId>, PathRejection>,
    request: Result<Json<NewTransaction>, JsonRejection>,
) -> Result<Json<TransactionResponse>, Error> {
    let transaction_id = parse_transaction_id(path)?;
    let Json(request) = request.map_err(|rejection| Error::Validation(rejection.body_text()))?;
    validate_description(&request.description)?;
    validate_amount(request.amount)?;

    let connection = lock_connection(&state.db_connection)?;
    let transaction = update_transaction(
        transaction_id,
        claims.user_id,
        TransactionUpdate {
            description: request.description,
            amount: request.amount,
            transaction_date: request.transaction_date,
        },
        &connection,
    )?;

    Ok(Json(TransactionResponse {
        transaction: transaction.into(),
    }))
}

/// A route handler for soft deleting a transaction, responds with 204 No Content on success.
pub async fn delete_transaction_endpoint(
    State(state): State<DatabaseState>,
    claims: Claims,
    path: Result<Path<TransactionId>, PathRejection>,
) -> Result<StatusCode, Error> {
    let transaction_id = parse_transaction_id(path)?;

    let connection = lock_connection(&state.db_connection)?;
    delete_transaction(transaction_id, claims.user_id, &connection)?;

    tracing::info!(transaction_id, user_id = %claims.user_id, "deleted transaction");

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod edit_endpoint_tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use serde_json::json;
    use time::macros::datetime;

    use crate::{
        AppState, ErrorResponse,
        endpoints::{self, format_endpoint},
        test_utils::{StubClassifier, bearer_token, get_test_app_state, get_test_server},
        transaction::{Transaction, TransactionResponse, create_transaction, get_transaction},
        user::{User, create_user},
    };

    fn get_state_with_transaction() -> (AppState, User, Transaction) {
        let state = get_test_app_state(Arc::new(StubClassifier::default()));
        let connection = state.db_connection.lock().unwrap();
        let user = create_user("alice", &connection).unwrap();
        let transaction = create_transaction(
            Transaction::build(user.id, -20.0, "Gojek")
                .category_id(Some(2))
                .transaction_date(Some(datetime!(2025-01-10 08:00 UTC))),
            &connection,
        )
        .unwrap();
        drop(connection);

        (state, user, transaction)
    }

    #[tokio::test]
    async fn update_changes_fields_but_not_category() {
        let (state, user, transaction) = get_state_with_transaction();
        let server = get_test_server(state);

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .authorization_bearer(bearer_token(&user))
            .json(&json!({
                "description": "Gojek ke bandara",
                "amount": -85.0,
                "transaction_date": "2025-01-11T06:00:00Z",
            }))
            .await;

        response.assert_status_ok();
        let updated = response.json::<TransactionResponse>().transaction;
        assert_eq!(updated.description, "Gojek ke bandara");
        assert_eq!(updated.amount, -85.0);
        assert_eq!(updated.transaction_date, datetime!(2025-01-11 06:00 UTC));
        assert_eq!(updated.category_id, Some(2));
    }

    #[tokio::test]
    async fn update_with_zero_amount_is_rejected() {
        let (state, user, transaction) = get_state_with_transaction();
        let server = get_test_server(state);

        let response = server
            .put(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .authorization_bearer(bearer_token(&user))
            .json(&json!({ "description": "Gojek", "amount": 0.0 }))
            .await;

        response.assert_status_bad_request();
        assert_eq!(response.json::<ErrorResponse>().error, "validation_error");
    }

    #[tokio::test]
    async fn delete_hides_transaction() {
        let (state, user, transaction) = get_state_with_transaction();
        let db_connection = state.db_connection.clone();
        let server = get_test_server(state);
        let token = bearer_token(&user);

        server
            .delete(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        let second_delete = server
            .delete(&format_endpoint(endpoints::TRANSACTION, transaction.id))
            .authorization_bearer(&token)
            .await;

        second_delete.assert_status_not_found();
        assert_eq!(
            second_delete.json::<ErrorResponse>().error,
            "transaction_not_found"
        );
        assert!(get_transaction(transaction.id, user.id, &db_connection.lock().unwrap()).is_err());
    }
}
