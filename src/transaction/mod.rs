//! Transactions and how they are categorized.
//!
//! This module contains:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying and soft deleting transactions
//! - The categorization workflow that assigns categories manually or with the
//!   classification service, and the log of those categorizations
//! - Route handlers for the transaction API

mod categorize;
mod core;
mod create_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod log;
mod recategorize_endpoint;
mod view;

pub use categorize::{
    BatchMode, BatchOutcome, BatchRecategorizeRequest, CategorizedTransaction, NewTransaction,
    RecategorizeMode, RecategorizeRequest, batch_recategorize, create_categorized_transaction,
    parse_batch_request, recategorize_transaction,
};
pub use core::{
    MAX_DESCRIPTION_LENGTH, Transaction, TransactionBuilder, TransactionFilter, TransactionUpdate,
    create_transaction, create_transaction_table, delete_transaction, get_transaction,
    get_transactions, get_transactions_by_ids, set_transaction_category,
    set_transactions_category, update_transaction, validate_amount, validate_description,
};
pub use create_endpoint::create_transaction_endpoint;
pub use edit_endpoint::{delete_transaction_endpoint, update_transaction_endpoint};
pub use list_endpoint::{
    TransactionResponse, get_transaction_endpoint, get_transactions_endpoint,
    parse_transaction_id,
};
pub use log::{
    MethodStat, count_categorization_methods, create_categorization_log_table, log_categorization,
};
pub use recategorize_endpoint::{batch_recategorize_endpoint, recategorize_transaction_endpoint};
pub use view::{CategorizationMethod, TransactionView};
