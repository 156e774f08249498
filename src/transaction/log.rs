//! The append-only log of transaction categorizations.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::{CategoryId, TransactionId},
    transaction::CategorizationMethod,
    user::UserID,
};

/// Record that a transaction was assigned a category.
pub fn log_categorization(
    transaction_id: TransactionId,
    category_id: CategoryId,
    method: CategorizationMethod,
    confidence: f64,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO categorization_log (transaction_id, category_id, method, confidence, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            transaction_id,
            category_id,
            method.as_str(),
            confidence,
            OffsetDateTime::now_utc(),
        ),
    )?;

    Ok(())
}

/// How many of a user's transactions were last categorized by a method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodStat {
    /// The categorization method.
    pub method: CategorizationMethod,
    /// The number of transactions.
    pub count: i64,
}

/// Count the user's transactions by the method of their latest categorization.
///
/// Transactions that were never categorized count as [CategorizationMethod::Manual].
pub fn count_categorization_methods(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<MethodStat>, Error> {
    let mut statement = connection.prepare(
        "SELECT COALESCE(l.method, 'manual') AS latest_method, COUNT(*)
         FROM \"transaction\" t
         LEFT JOIN categorization_log l ON l.id = (
            SELECT MAX(id) FROM categorization_log WHERE transaction_id = t.id
         )
         WHERE t.user_id = ?1 AND t.deleted_at IS NULL
         GROUP BY latest_method
         ORDER BY COUNT(*) DESC, latest_method ASC",
    )?;

    let rows = statement.query_map([user_id.as_i64()], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
    })?;

    let mut stats = Vec::new();
    for row in rows {
        let (method, count) = row?;
        stats.push(MethodStat {
            method: method.parse()?,
            count,
        });
    }

    Ok(stats)
}

/// Create the categorization log table.
pub fn create_categorization_log_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS categorization_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            transaction_id INTEGER NOT NULL,
            category_id INTEGER,
            method TEXT NOT NULL,
            confidence REAL NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(transaction_id) REFERENCES \"transaction\"(id) ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_categorization_log_transaction
            ON categorization_log(transaction_id);",
    )?;

    Ok(())
}

#[cfg(test)]
pub fn get_logged_methods(
    transaction_id: TransactionId,
    connection: &Connection,
) -> Vec<(CategorizationMethod, f64)> {
    connection
        .prepare(
            "SELECT method, confidence FROM categorization_log
             WHERE transaction_id = ?1 ORDER BY id ASC",
        )
        .unwrap()
        .query_map([transaction_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
        })
        .unwrap()
        .map(|row| {
            let (method, confidence) = row.unwrap();
            (method.parse().unwrap(), confidence)
        })
        .collect()
}
