//! Route handlers for reading transactions.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
};
use serde::{Deserialize, Serialize};
use time::{Date, macros::format_description};

use crate::{
    Error,
    app_state::{DatabaseState, lock_connection},
    auth::Claims,
    database_id::{CategoryId, TransactionId},
    transaction::{TransactionFilter, TransactionView, get_transaction, get_transactions},
};

/// Get the transaction ID from the request path.
///
/// # Errors
/// Returns an [Error::Validation] if the ID is not an integer.
pub fn parse_transaction_id(
    path: Result<Path<TransactionId>, PathRejection>,
) -> Result<TransactionId, Error> {
    path.map(|Path(id)| id)
        .map_err(|rejection| Error::Validation(rejection.body_text()))
}

/// The query parameters for listing transactions.
///
/// Dates are calendar days in the form "2025-01-31" and both ends are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionQuery {
    pub category_id: Option<CategoryId>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl TryFrom<&TransactionQuery> for TransactionFilter {
    type Error = Error;

    fn try_from(query: &TransactionQuery) -> Result<Self, Self::Error> {
        Ok(Self {
            category_id: query.category_id,
            start_date: parse_date("start_date", query.start_date.as_deref())?,
            end_date: parse_date("end_date", query.end_date.as_deref())?,
        })
    }
}

fn parse_date(field: &str, value: Option<&str>) -> Result<Option<Date>, Error> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Date::parse(value, format_description!("[year]-[month]-[day]"))
            .map(Some)
            .map_err(|_| Error::Validation(format!("{field} must be a date like 2025-01-31"))),
    }
}

/// The user's transactions and their totals.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<TransactionView>,
    pub total_count: usize,
    pub total_amount: f64,
    pub filters: TransactionQuery,
}

/// A route handler for listing the caller's transactions, newest first.
pub async fn get_transactions_endpoint(
    State(state): State<DatabaseState>,
    claims: Claims,
    query: Result<Query<TransactionQuery>, QueryRejection>,
) -> Result<Json<TransactionsResponse>, Error> {
    let Query(query) = query.map_err(|rejection| Error::Validation(rejection.body_text()))?;
    let filter = TransactionFilter::try_from(&query)?;

    let transactions = {
        let connection = lock_connection(&state.db_connection)?;
        get_transactions(claims.user_id, &filter, &connection)?
    };

    let total_amount = transactions
        .iter()
        .map(|transaction| transaction.amount)
        .sum();
    let transactions: Vec<TransactionView> =
        transactions.into_iter().map(TransactionView::from).collect();

    Ok(Json(TransactionsResponse {
        total_count: transactions.len(),
        total_amount,
        transactions,
        filters: query,
    }))
}

/// A single transaction.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub transaction: TransactionView,
}

/// A route handler for getting one of the caller's transactions.
pub async fn get_transaction_endpoint(
    State(state): State<DatabaseState>,
    claims: Claims,
    path: Result<Path<TransactionId>, PathRejection>,
) -> Result<Json<TransactionResponse>, Error> {
    let transaction_id = parse_transaction_id(path)?;

    let connection = lock_connection(&state.db_connection)?;
    let transaction = get_transaction(transaction_id, claims.user_id, &connection)?;

    Ok(Json(TransactionResponse {
        transaction: transaction.into(),
    }))
}
