//! Creating and re-categorizing transactions.
//!
//! Categories come either from the user or from the classification service.
//! The service is always called before the database lock is taken, and every
//! change to a transaction's category is written together with a row in the
//! categorization log.

use std::{collections::BTreeSet, sync::Mutex};

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    app_state::lock_connection,
    category::{CategoryName, get_visible_category, resolve_category, resolve_personal_category},
    classifier::{Classifier, Prediction},
    database_id::{CategoryId, TransactionId},
    transaction::{
        CategorizationMethod, Transaction, TransactionView, create_transaction,
        get_transaction, get_transactions_by_ids, log_categorization, set_transaction_category,
        set_transactions_category, validate_amount, validate_description,
    },
    user::UserID,
};

/// The details for a new transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    /// What the transaction was for.
    pub description: String,
    /// The signed amount, positive for income and negative for expenses.
    pub amount: f64,
    /// When the transaction happened, defaults to now.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub transaction_date: Option<OffsetDateTime>,
}

/// A transaction that was just categorized.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorizedTransaction {
    /// The stored transaction.
    pub transaction: Transaction,
    /// The label that was predicted or chosen.
    pub label: String,
    /// The classifier confidence, or 1.0 for manual changes.
    pub confidence: f64,
    /// How the category was chosen.
    pub method: CategorizationMethod,
}

impl CategorizedTransaction {
    /// The transaction with its categorization details.
    pub fn view(&self) -> TransactionView {
        TransactionView::categorized(self.transaction.clone(), self.method, self.confidence)
    }
}

/// Store a new transaction, categorized by the classification service.
///
/// Classification failures never fail the request: the transaction is
/// stored in the fallback category instead.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if the description or amount is invalid,
/// - [Error::CategoryResolution] if the predicted category could not be found or created,
/// - or a database error if the transaction could not be stored.
pub async fn create_categorized_transaction(
    new_transaction: NewTransaction,
    user_id: UserID,
    classifier: &dyn Classifier,
    db_connection: &Mutex<Connection>,
) -> Result<CategorizedTransaction, Error> {
    validate_description(&new_transaction.description)?;
    validate_amount(new_transaction.amount)?;

    let prediction = classifier.classify(&new_transaction.description).await;

    let connection = lock_connection(db_connection)?;
    let sql_transaction = connection.unchecked_transaction()?;

    let resolved = resolve_category(user_id, &prediction.label, &sql_transaction)?;
    let method = CategorizationMethod::ai(resolved.outcome);

    let transaction = create_transaction(
        Transaction::build(user_id, new_transaction.amount, &new_transaction.description)
            .transaction_date(new_transaction.transaction_date)
            .category_id(Some(resolved.category.id)),
        &sql_transaction,
    )?;
    log_categorization(
        transaction.id,
        resolved.category.id,
        method,
        prediction.confidence,
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    tracing::info!(
        transaction_id = transaction.id,
        category = %resolved.category.name,
        %method,
        confidence = prediction.confidence,
        "created transaction"
    );

    Ok(CategorizedTransaction {
        transaction,
        label: prediction.label,
        confidence: prediction.confidence,
        method,
    })
}

/// The request body for re-categorizing a single transaction.
///
/// Exactly one of the fields must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecategorizeRequest {
    /// Move the transaction to this category.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Ask the classification service for a new category.
    #[serde(default)]
    pub use_ai: Option<bool>,
    /// Move the transaction to the user's category with this name, creating it if needed.
    #[serde(default)]
    pub category_name: Option<String>,
}

/// How a single transaction should be re-categorized.
#[derive(Debug, Clone, PartialEq)]
pub enum RecategorizeMode {
    /// Use the category with this ID.
    Category(CategoryId),
    /// Ask the classification service.
    UseAi,
    /// Use the user's personal category with this name.
    CategoryName(CategoryName),
}

impl TryFrom<RecategorizeRequest> for RecategorizeMode {
    type Error = Error;

    fn try_from(request: RecategorizeRequest) -> Result<Self, Self::Error> {
        let use_ai = request.use_ai.unwrap_or(false);
        let category_name = request.category_name.filter(|name| !name.is_empty());

        match (request.category_id, use_ai, category_name) {
            (Some(category_id), false, None) => Ok(Self::Category(category_id)),
            (None, true, None) => Ok(Self::UseAi),
            (None, false, Some(name)) => Ok(Self::CategoryName(CategoryName::new(&name)?)),
            _ => Err(Error::InvalidRequest(
                "select exactly one of category_id, use_ai or category_name".to_owned(),
            )),
        }
    }
}

/// Change the category of one of the user's transactions.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if the user has no such transaction,
/// - [Error::InvalidCategory] if the category is not visible to the user,
/// - [Error::CategoryResolution] if a category could not be found or created,
/// - or a database error if the change could not be stored.
pub async fn recategorize_transaction(
    transaction_id: TransactionId,
    user_id: UserID,
    mode: RecategorizeMode,
    classifier: &dyn Classifier,
    db_connection: &Mutex<Connection>,
) -> Result<CategorizedTransaction, Error> {
    let prediction = match mode {
        RecategorizeMode::UseAi => {
            let description = {
                let connection = lock_connection(db_connection)?;
                get_transaction(transaction_id, user_id, &connection)?.description
            };

            Some(classifier.classify(&description).await)
        }
        _ => None,
    };

    let connection = lock_connection(db_connection)?;
    let sql_transaction = connection.unchecked_transaction()?;

    get_transaction(transaction_id, user_id, &sql_transaction)?;

    let (category, method, confidence) = match (mode, prediction) {
        (RecategorizeMode::Category(category_id), _) => {
            let category = get_visible_category(category_id, user_id, &sql_transaction)
                .map_err(|error| match error {
                    Error::NotFound => Error::InvalidCategory(category_id),
                    error => error,
                })?;

            (category, CategorizationMethod::ManualOverride, 1.0)
        }
        (RecategorizeMode::CategoryName(name), _) => {
            let resolved = resolve_personal_category(user_id, &name, &sql_transaction)?;

            (
                resolved.category,
                CategorizationMethod::named(resolved.outcome),
                1.0,
            )
        }
        (RecategorizeMode::UseAi, prediction) => {
            let prediction = prediction.unwrap_or_else(Prediction::fallback);
            let resolved = resolve_category(user_id, &prediction.label, &sql_transaction)?;

            (
                resolved.category,
                CategorizationMethod::ai(resolved.outcome),
                prediction.confidence,
            )
        }
    };

    let transaction =
        set_transaction_category(transaction_id, user_id, category.id, &sql_transaction)?;
    log_categorization(transaction.id, category.id, method, confidence, &sql_transaction)?;

    sql_transaction.commit()?;

    tracing::info!(
        transaction_id,
        category = %category.name,
        %method,
        confidence,
        "recategorized transaction"
    );

    Ok(CategorizedTransaction {
        transaction,
        label: category.name.to_string(),
        confidence,
        method,
    })
}

/// The request body for re-categorizing many transactions.
///
/// Exactly one of `use_ai` and `category_id` must be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchRecategorizeRequest {
    /// The transactions to re-categorize.
    pub transaction_ids: Vec<TransactionId>,
    /// Ask the classification service for new categories.
    #[serde(default)]
    pub use_ai: Option<bool>,
    /// Move every transaction to this category.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

/// How a batch of transactions should be re-categorized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BatchMode {
    /// Ask the classification service.
    UseAi,
    /// Use the category with this ID.
    Category(CategoryId),
}

/// The result of re-categorizing a batch of transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// The number of transactions that were re-categorized.
    pub success_count: usize,
    /// The number of transactions that could not be re-categorized.
    pub error_count: usize,
    /// The re-categorized transactions, in ascending ID order.
    pub updated_transactions: Vec<TransactionView>,
}

/// Check a batch request, returning the distinct transaction IDs in ascending order and the mode.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyRequest] if no transaction IDs were given,
/// - or [Error::InvalidRequest] if not exactly one mode was selected.
pub fn parse_batch_request(
    request: BatchRecategorizeRequest,
) -> Result<(Vec<TransactionId>, BatchMode), Error> {
    if request.transaction_ids.is_empty() {
        return Err(Error::EmptyRequest);
    }

    let mode = match (request.use_ai.unwrap_or(false), request.category_id) {
        (true, None) => BatchMode::UseAi,
        (false, Some(category_id)) => BatchMode::Category(category_id),
        _ => {
            return Err(Error::InvalidRequest(
                "select exactly one of use_ai or category_id".to_owned(),
            ));
        }
    };

    let ids: BTreeSet<TransactionId> = request.transaction_ids.into_iter().collect();

    Ok((ids.into_iter().collect(), mode))
}

/// Re-categorize the user's transactions in `ids`.
///
/// IDs that do not refer to the user's transactions are skipped. With
/// [BatchMode::UseAi] each transaction is saved on its own, so one failure
/// does not stop the others. With [BatchMode::Category] all transactions
/// are updated together.
///
/// # Errors
/// This function will return a:
/// - [Error::NoTransactions] if none of the IDs refer to the user's transactions,
/// - [Error::AiBatch] if the classification service failed, in which case nothing is changed,
/// - [Error::InvalidCategory] if the category is not visible to the user,
/// - or a database error if the transactions could not be read or stored.
pub async fn batch_recategorize(
    ids: &[TransactionId],
    user_id: UserID,
    mode: BatchMode,
    classifier: &dyn Classifier,
    db_connection: &Mutex<Connection>,
) -> Result<BatchOutcome, Error> {
    let transactions = {
        let connection = lock_connection(db_connection)?;
        get_transactions_by_ids(ids, user_id, &connection)?
    };

    if transactions.is_empty() {
        return Err(Error::NoTransactions);
    }

    match mode {
        BatchMode::UseAi => {
            let descriptions: Vec<String> = transactions
                .iter()
                .map(|transaction| transaction.description.clone())
                .collect();
            let predictions = classifier
                .classify_batch(&descriptions)
                .await
                .map_err(|error| {
                    tracing::warn!(%error, count = descriptions.len(), "batch classification failed");
                    Error::AiBatch(error)
                })?;

            let connection = lock_connection(db_connection)?;
            let mut outcome = BatchOutcome {
                success_count: 0,
                error_count: 0,
                updated_transactions: Vec::new(),
            };

            for (transaction, prediction) in transactions.iter().zip(predictions) {
                match apply_prediction(transaction.id, user_id, &prediction, &connection) {
                    Ok(categorized) => {
                        outcome.success_count += 1;
                        outcome.updated_transactions.push(categorized.view());
                    }
                    Err(error) => {
                        tracing::warn!(
                            transaction_id = transaction.id,
                            %error,
                            "could not recategorize transaction"
                        );
                        outcome.error_count += 1;
                    }
                }
            }

            Ok(outcome)
        }
        BatchMode::Category(category_id) => {
            let connection = lock_connection(db_connection)?;
            let sql_transaction = connection.unchecked_transaction()?;

            let category = get_visible_category(category_id, user_id, &sql_transaction)
                .map_err(|error| match error {
                    Error::NotFound => Error::InvalidCategory(category_id),
                    error => error,
                })?;

            let found_ids: Vec<TransactionId> =
                transactions.iter().map(|transaction| transaction.id).collect();
            let success_count =
                set_transactions_category(&found_ids, user_id, category.id, &sql_transaction)?;

            for id in &found_ids {
                log_categorization(
                    *id,
                    category.id,
                    CategorizationMethod::ManualBatch,
                    1.0,
                    &sql_transaction,
                )?;
            }

            let updated_transactions = get_transactions_by_ids(&found_ids, user_id, &sql_transaction)?
                .into_iter()
                .map(|transaction| {
                    TransactionView::categorized(transaction, CategorizationMethod::ManualBatch, 1.0)
                })
                .collect();

            sql_transaction.commit()?;

            tracing::info!(
                count = success_count,
                category = %category.name,
                "recategorized transactions"
            );

            Ok(BatchOutcome {
                success_count,
                error_count: 0,
                updated_transactions,
            })
        }
    }
}

fn apply_prediction(
    transaction_id: TransactionId,
    user_id: UserID,
    prediction: &Prediction,
    connection: &Connection,
) -> Result<CategorizedTransaction, Error> {
    let sql_transaction = connection.unchecked_transaction()?;

    let resolved = resolve_category(user_id, &prediction.label, &sql_transaction)?;
    let method = CategorizationMethod::ai(resolved.outcome);
    let transaction =
        set_transaction_category(transaction_id, user_id, resolved.category.id, &sql_transaction)?;
    log_categorization(
        transaction_id,
        resolved.category.id,
        method,
        prediction.confidence,
        &sql_transaction,
    )?;

    sql_transaction.commit()?;

    Ok(CategorizedTransaction {
        transaction,
        label: prediction.label.clone(),
        confidence: prediction.confidence,
        method,
    })
}

#[cfg(test)]
mod create_categorized_transaction_tests {
    use std::sync::Mutex;

    use crate::{
        Error,
        classifier::{ClassifierError, FALLBACK_CATEGORY},
        test_utils::{StubClassifier, get_test_connection},
        transaction::{
            CategorizationMethod, NewTransaction, create_categorized_transaction,
            log::get_logged_methods,
        },
        user::create_user,
    };

    fn new_transaction(description: &str) -> NewTransaction {
        NewTransaction {
            description: description.to_owned(),
            amount: -25_000.0,
            transaction_date: None,
        }
    }

    #[tokio::test]
    async fn uses_predicted_category() {
        let connection = get_test_connection();
        let user = create_user("alice", &connection).unwrap();
        let db_connection = Mutex::new(connection);
        let classifier = StubClassifier::new("Makanan & Minuman", 0.92);

        let created = create_categorized_transaction(
            new_transaction("Beli nasi ayam di warteg"),
            user.id,
            &classifier,
            &db_connection,
        )
        .await
        .expect("Could not create transaction");

        let view = created.view();
        assert_eq!(view.category_name.as_deref(), Some("Makanan & Minuman"));
        assert_eq!(view.ai_confidence, 0.92);
        assert_eq!(view.prediction_method, CategorizationMethod::AiCategorization);
        assert_eq!(created.label, "Makanan & Minuman");
        assert_eq!(
            get_logged_methods(view.id, &db_connection.lock().unwrap()),
            vec![(CategorizationMethod::AiCategorization, 0.92)]
        );
    }

    #[tokio::test]
    async fn unknown_label_creates_personal_category() {
        let connection = get_test_connection();
        let user = create_user("alice", &connection).unwrap();
        let db_connection = Mutex::new(connection);
        let classifier = StubClassifier::new("Kopi", 0.6);

        let created = create_categorized_transaction(
            new_transaction("Kopi susu gula aren"),
            user.id,
            &classifier,
            &db_connection,
        )
        .await
        .unwrap();

        assert_eq!(
            created.method,
            CategorizationMethod::AiCategorizationNewCategory
        );
        assert_eq!(created.transaction.category_name.as_deref(), Some("Kopi"));
    }

    #[tokio::test]
    async fn classifier_failure_uses_fallback_category() {
        let connection = get_test_connection();
        let user = create_user("alice", &connection).unwrap();
        let db_connection = Mutex::new(connection);
        let classifier = StubClassifier::failing(ClassifierError::Timeout);

        let created = create_categorized_transaction(
            new_transaction("Bayar listrik"),
            user.id,
            &classifier,
            &db_connection,
        )
        .await
        .expect("Classifier failures should not fail the request");

        assert_eq!(created.label, FALLBACK_CATEGORY);
        assert_eq!(created.confidence, 0.0);
        assert_eq!(created.method, CategorizationMethod::AiCategorization);
        assert_eq!(
            created.transaction.category_name.as_deref(),
            Some(FALLBACK_CATEGORY)
        );
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_classifying() {
        let connection = get_test_connection();
        let user = create_user("alice", &connection).unwrap();
        let db_connection = Mutex::new(connection);
        let classifier = StubClassifier::new("Tagihan", 0.9);

        let blank = create_categorized_transaction(
            new_transaction("   "),
            user.id,
            &classifier,
            &db_connection,
        )
        .await;
        let zero = create_categorized_transaction(
            NewTransaction {
                amount: 0.0,
                ..new_transaction("Bayar listrik")
            },
            user.id,
            &classifier,
            &db_connection,
        )
        .await;

        assert!(matches!(blank, Err(Error::Validation(_))));
        assert!(matches!(zero, Err(Error::Validation(_))));
        assert_eq!(classifier.call_count(), 0);
    }
}


#[cfg(test)]
mod batch_recategorize_tests {
    use std::sync::Mutex;

    use rusqlite::Connection;

    use crate::{
        Error,
        category::{CategoryName, create_category},
        classifier::ClassifierError,
        test_utils::{StubClassifier, get_test_connection},
        transaction::{
            BatchMode, BatchRecategorizeRequest, CategorizationMethod, Transaction,
            batch_recategorize, create_transaction, get_transactions_by_ids,
            parse_batch_request,
        },
        user::{User, create_user},
    };

    fn setup() -> (Mutex<Connection>, User, User, Vec<Transaction>) {
        let connection = get_test_connection();
        let alice = create_user("alice", &connection).unwrap();
        let bob = create_user("bob", &connection).unwrap();
        let transactions = ["Gojek ke kantor", "Bayar listrik PLN", "Netflix"]
            .iter()
            .map(|description| {
                create_transaction(Transaction::build(alice.id, -10.0, description), &connection)
                    .unwrap()
            })
            .collect();

        (Mutex::new(connection), alice, bob, transactions)
    }

    #[test]
    fn empty_ids_are_rejected_first() {
        let result = parse_batch_request(BatchRecategorizeRequest::default());

        assert_eq!(result, Err(Error::EmptyRequest));
    }

    #[test]
    fn exactly_one_mode_is_required() {
        let neither = parse_batch_request(BatchRecategorizeRequest {
            transaction_ids: vec![1],
            ..Default::default()
        });
        let both = parse_batch_request(BatchRecategorizeRequest {
            transaction_ids: vec![1],
            use_ai: Some(true),
            category_id: Some(1),
        });

        assert!(matches!(neither, Err(Error::InvalidRequest(_))));
        assert!(matches!(both, Err(Error::InvalidRequest(_))));
    }

    #[test]
    fn duplicate_ids_are_collapsed_and_sorted() {
        let (ids, mode) = parse_batch_request(BatchRecategorizeRequest {
            transaction_ids: vec![3, 1, 3, 2, 1],
            use_ai: Some(true),
            category_id: None,
        })
        .unwrap();

        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(mode, BatchMode::UseAi);
    }

    #[tokio::test]
    async fn no_owned_transactions_is_an_error() {
        let (db_connection, _, bob, transactions) = setup();
        let ids: Vec<i64> = transactions.iter().map(|transaction| transaction.id).collect();

        let result = batch_recategorize(
            &ids,
            bob.id,
            BatchMode::UseAi,
            &StubClassifier::new("Tagihan", 0.9),
            &db_connection,
        )
        .await;

        assert_eq!(result, Err(Error::NoTransactions));
    }

    #[tokio::test]
    async fn use_ai_categorizes_each_transaction() {
        let (db_connection, alice, _, transactions) = setup();
        let ids: Vec<i64> = transactions.iter().map(|transaction| transaction.id).collect();
        let classifier = StubClassifier::default()
            .with_prediction("Gojek ke kantor", "Transportasi", 0.9)
            .with_prediction("Bayar listrik PLN", "Tagihan", 0.8)
            .with_prediction("Netflix", "Langganan", 0.7);

        let outcome = batch_recategorize(
            &ids,
            alice.id,
            BatchMode::UseAi,
            &classifier,
            &db_connection,
        )
        .await
        .unwrap();

        assert_eq!(outcome.success_count, 3);
        assert_eq!(outcome.error_count, 0);
        assert_eq!(classifier.call_count(), 1);
        let summary: Vec<(Option<&str>, CategorizationMethod, f64)> = outcome
            .updated_transactions
            .iter()
            .map(|view| {
                (
                    view.category_name.as_deref(),
                    view.prediction_method,
                    view.ai_confidence,
                )
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                (Some("Transportasi"), CategorizationMethod::AiCategorization, 0.9),
                (Some("Tagihan"), CategorizationMethod::AiCategorization, 0.8),
                (
                    Some("Langganan"),
                    CategorizationMethod::AiCategorizationNewCategory,
                    0.7
                ),
            ]
        );
    }

    #[tokio::test]
    async fn batch_classifier_failure_changes_nothing() {
        let (db_connection, alice, _, transactions) = setup();
        let ids: Vec<i64> = transactions.iter().map(|transaction| transaction.id).collect();
        let classifier = StubClassifier::new("Tagihan", 0.9)
            .with_batch_error(ClassifierError::Unreachable("connection refused".to_owned()));

        let result = batch_recategorize(
            &ids,
            alice.id,
            BatchMode::UseAi,
            &classifier,
            &db_connection,
        )
        .await;

        assert!(matches!(result, Err(Error::AiBatch(_))));
        let stored = get_transactions_by_ids(&ids, alice.id, &db_connection.lock().unwrap())
            .unwrap();
        assert_eq!(stored, transactions);
    }

    #[tokio::test]
    async fn one_failed_item_does_not_stop_the_rest() {
        let (db_connection, alice, _, transactions) = setup();
        let ids: Vec<i64> = transactions.iter().map(|transaction| transaction.id).collect();
        let too_long_label = "x".repeat(101);
        let classifier = StubClassifier::new("Hiburan", 0.5).with_prediction(
            "Bayar listrik PLN",
            &too_long_label,
            0.5,
        );

        let outcome = batch_recategorize(
            &ids,
            alice.id,
            BatchMode::UseAi,
            &classifier,
            &db_connection,
        )
        .await
        .unwrap();

        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.error_count, 1);
        let updated_ids: Vec<i64> = outcome
            .updated_transactions
            .iter()
            .map(|view| view.id)
            .collect();
        assert_eq!(updated_ids, vec![ids[0], ids[2]]);
    }

    #[tokio::test]
    async fn category_mode_updates_all_transactions() {
        let (db_connection, alice, bob, transactions) = setup();
        let bobs_transaction = create_transaction(
            Transaction::build(bob.id, -1.0, "Punya bob"),
            &db_connection.lock().unwrap(),
        )
        .unwrap();
        let ids = vec![transactions[0].id, transactions[2].id, bobs_transaction.id];

        let outcome = batch_recategorize(
            &ids,
            alice.id,
            BatchMode::Category(5),
            &StubClassifier::default(),
            &db_connection,
        )
        .await
        .unwrap();

        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.error_count, 0);
        assert!(outcome.updated_transactions.iter().all(|view| {
            view.category_id == Some(5)
                && view.prediction_method == CategorizationMethod::ManualBatch
                && view.ai_confidence == 1.0
        }));
    }

    #[tokio::test]
    async fn invisible_category_changes_nothing() {
        let (db_connection, alice, bob, transactions) = setup();
        let bobs_category = create_category(
            CategoryName::new_unchecked("Rahasia"),
            Some(bob.id),
            &db_connection.lock().unwrap(),
        )
        .unwrap();
        let ids: Vec<i64> = transactions.iter().map(|transaction| transaction.id).collect();

        let result = batch_recategorize(
            &ids,
            alice.id,
            BatchMode::Category(bobs_category.id),
            &StubClassifier::default(),
            &db_connection,
        )
        .await;

        assert_eq!(result, Err(Error::InvalidCategory(bobs_category.id)));
        let stored = get_transactions_by_ids(&ids, alice.id, &db_connection.lock().unwrap())
            .unwrap();
        assert_eq!(stored, transactions);
    }
}
