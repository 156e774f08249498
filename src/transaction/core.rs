//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row, ToSql, params_from_iter};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, UtcOffset};

use crate::{
    Error,
    database_id::{CategoryId, TransactionId},
    user::UserID,
};

// ============================================================================
// MODELS
// ============================================================================

/// The maximum number of characters in a transaction description.
pub const MAX_DESCRIPTION_LENGTH: usize = 255;

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The amount of money spent or earned in this transaction.
    pub amount: f64,
    /// When the transaction happened, in UTC.
    pub transaction_date: OffsetDateTime,
    /// The user that owns the transaction.
    pub user_id: UserID,
    /// The ID of the category the transaction belongs to.
    pub category_id: Option<CategoryId>,
    /// The name of the category the transaction belongs to.
    pub category_name: Option<String>,
    /// When the transaction was recorded.
    pub created_at: OffsetDateTime,
    /// When the transaction was last changed.
    pub updated_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(user_id: UserID, amount: f64, description: &str) -> TransactionBuilder {
        TransactionBuilder {
            user_id,
            amount,
            description: description.to_owned(),
            transaction_date: None,
            category_id: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// ```ignore
/// let builder = Transaction::build(user_id, -25_000.0, "Beli nasi ayam di warteg")
///     .category_id(Some(1))
///     .transaction_date(Some(datetime!(2025-01-15 12:30 UTC)));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The user that owns the transaction.
    pub user_id: UserID,

    /// The monetary amount of the transaction.
    ///
    /// Positive values represent income, negative values represent expenses.
    pub amount: f64,

    /// A human-readable description of the transaction, e.g. "Bayar listrik PLN".
    pub description: String,

    /// When the transaction happened. Defaults to the time it is stored.
    pub transaction_date: Option<OffsetDateTime>,

    /// The category of the transaction.
    pub category_id: Option<CategoryId>,
}

impl TransactionBuilder {
    /// Set the date of the transaction.
    pub fn transaction_date(mut self, transaction_date: Option<OffsetDateTime>) -> Self {
        self.transaction_date = transaction_date;
        self
    }

    /// Set the category id for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }
}

/// New values for the user editable fields of a transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionUpdate {
    /// The new description.
    pub description: String,
    /// The new amount.
    pub amount: f64,
    /// The new date, or `None` to keep the current date.
    pub transaction_date: Option<OffsetDateTime>,
}

/// Limits which transactions are listed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Only include transactions in this category.
    pub category_id: Option<CategoryId>,
    /// Only include transactions on or after this day (UTC).
    pub start_date: Option<Date>,
    /// Only include transactions on or before this day (UTC).
    pub end_date: Option<Date>,
}

/// Check that a transaction description is not blank and not too long.
///
/// # Errors
/// Returns an [Error::Validation] describing the problem.
pub fn validate_description(description: &str) -> Result<(), Error> {
    if description.trim().is_empty() {
        Err(Error::Validation("description must not be empty".to_owned()))
    } else if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        Err(Error::Validation(format!(
            "description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )))
    } else {
        Ok(())
    }
}

/// Check that a transaction amount is a finite, non-zero number.
///
/// # Errors
/// Returns an [Error::Validation] describing the problem.
pub fn validate_amount(amount: f64) -> Result<(), Error> {
    if !amount.is_finite() {
        Err(Error::Validation("amount must be a finite number".to_owned()))
    } else if amount == 0.0 {
        Err(Error::Validation("amount must not be zero".to_owned()))
    } else {
        Ok(())
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str = "t.id, t.description, t.amount, t.transaction_date, t.user_id,
    t.category_id, c.name, t.created_at, t.updated_at";

const TRANSACTION_SOURCE: &str =
    "\"transaction\" t LEFT JOIN category c ON t.category_id = c.id";

/// Create a new transaction in the database from a builder.
///
/// The transaction date defaults to now and is stored in UTC.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category ID does not refer to a real category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let now = OffsetDateTime::now_utc();
    let transaction_date = builder.transaction_date.unwrap_or(now).to_offset(UtcOffset::UTC);

    let id: TransactionId = connection
        .prepare(
            "INSERT INTO \"transaction\"
                (description, amount, transaction_date, user_id, category_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
             RETURNING id",
        )?
        .query_row(
            (
                &builder.description,
                builder.amount,
                transaction_date,
                builder.user_id.as_i64(),
                builder.category_id,
                now,
            ),
            |row| row.get(0),
        )
        .map_err(|error| map_insert_error(error, builder.category_id))?;

    get_transaction(id, builder.user_id, connection)
}

/// A foreign key failure on insert means the category is missing, but only if one was given.
fn map_insert_error(error: rusqlite::Error, category_id: Option<CategoryId>) -> Error {
    match (error, category_id) {
        (
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ),
            Some(category_id),
        ) => Error::InvalidCategory(category_id),
        (error, _) => error.into(),
    }
}

/// Retrieve a transaction owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if `id` does not refer to a transaction owned
///   by the user, or the transaction was deleted,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM {TRANSACTION_SOURCE}
             WHERE t.id = ?1 AND t.user_id = ?2 AND t.deleted_at IS NULL"
        ))?
        .query_row((id, user_id.as_i64()), map_transaction_row)
        .map_err(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Error::TransactionNotFound,
            error => error.into(),
        })
}

/// Retrieve the user's transactions that match `filter`, most recent first.
pub fn get_transactions(
    user_id: UserID,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let start = filter.start_date.map(|date| date.to_string());
    // The end date is inclusive, so compare against the start of the next day.
    let end = filter
        .end_date
        .and_then(|date| date.next_day())
        .map(|date| date.to_string());

    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM {TRANSACTION_SOURCE}
             WHERE t.user_id = ?1 AND t.deleted_at IS NULL
                AND (?2 IS NULL OR t.category_id = ?2)
                AND (?3 IS NULL OR t.transaction_date >= ?3)
                AND (?4 IS NULL OR t.transaction_date < ?4)
             ORDER BY t.transaction_date DESC, t.created_at DESC, t.id DESC"
        ))?
        .query_map(
            (user_id.as_i64(), filter.category_id, start, end),
            map_transaction_row,
        )?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the transactions in `ids` that the user owns, in ascending ID order.
///
/// IDs of missing, deleted or other users' transactions are skipped.
pub fn get_transactions_by_ids(
    ids: &[TransactionId],
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let params = std::iter::once(user_id.as_i64()).chain(ids.iter().copied());

    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM {TRANSACTION_SOURCE}
             WHERE t.user_id = ? AND t.deleted_at IS NULL AND t.id IN ({placeholders})
             ORDER BY t.id ASC"
        ))?
        .query_map(params_from_iter(params), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Change the description, amount and optionally the date of a transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if the user has no such transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    user_id: UserID,
    update: TransactionUpdate,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET description = ?1, amount = ?2, transaction_date = COALESCE(?3, transaction_date),
            updated_at = ?4
         WHERE id = ?5 AND user_id = ?6 AND deleted_at IS NULL",
        (
            &update.description,
            update.amount,
            update
                .transaction_date
                .map(|date| date.to_offset(UtcOffset::UTC)),
            OffsetDateTime::now_utc(),
            id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::TransactionNotFound);
    }

    get_transaction(id, user_id, connection)
}

/// Set the category of a single transaction.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if the user has no such transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn set_transaction_category(
    id: TransactionId,
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let rows_affected = set_transactions_category(&[id], user_id, category_id, connection)?;

    if rows_affected == 0 {
        return Err(Error::TransactionNotFound);
    }

    get_transaction(id, user_id, connection)
}

/// Set the category of every transaction in `ids` that the user owns.
///
/// Returns the number of transactions that were changed.
pub fn set_transactions_category(
    ids: &[TransactionId],
    user_id: UserID,
    category_id: CategoryId,
    connection: &Connection,
) -> Result<usize, Error> {
    if ids.is_empty() {
        return Ok(0);
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let now = OffsetDateTime::now_utc();
    let owner = user_id.as_i64();
    let mut params: Vec<&dyn ToSql> = vec![&category_id, &now, &owner];
    params.extend(ids.iter().map(|id| id as &dyn ToSql));

    let rows_affected = connection.execute(
        &format!(
            "UPDATE \"transaction\" SET category_id = ?, updated_at = ?
             WHERE user_id = ? AND deleted_at IS NULL AND id IN ({placeholders})"
        ),
        params_from_iter(params),
    )?;

    Ok(rows_affected)
}

/// Mark a transaction as deleted so it is excluded from every query.
///
/// # Errors
/// This function will return a:
/// - [Error::TransactionNotFound] if the user has no such transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE \"transaction\" SET deleted_at = ?1
         WHERE id = ?2 AND user_id = ?3 AND deleted_at IS NULL",
        (OffsetDateTime::now_utc(), id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::TransactionNotFound);
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                description TEXT NOT NULL,
                amount REAL NOT NULL,
                transaction_date TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                category_id INTEGER,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                deleted_at TEXT,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date
            ON \"transaction\"(user_id, transaction_date);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let description = row.get(1)?;
    let amount = row.get(2)?;
    let transaction_date = row.get(3)?;
    let user_id = UserID::new(row.get(4)?);
    let category_id = row.get(5)?;
    let category_name = row.get(6)?;
    let created_at = row.get(7)?;
    let updated_at = row.get(8)?;

    Ok(Transaction {
        id,
        description,
        amount,
        transaction_date,
        user_id,
        category_id,
        category_name,
        created_at,
        updated_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================
