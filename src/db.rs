//! Database initialization for the application's SQLite store.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    category::{create_category_table, seed_system_categories},
    transaction::{create_categorization_log_table, create_transaction_table},
    user::create_user_table,
};

/// Create all the application tables and seed the shared system categories.
///
/// This function is idempotent and can be called on an existing database.
///
/// # Errors
/// Returns an error if a table could not be created or there is some other SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.pragma_update(None, "foreign_keys", true)?;

    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_category_table(&transaction)?;
    seed_system_categories(&transaction)?;
    create_transaction_table(&transaction)?;
    create_categorization_log_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
