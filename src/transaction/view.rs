//! The JSON representation of transactions and how they were categorized.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    category::ResolutionOutcome,
    database_id::{CategoryId, TransactionId},
    transaction::Transaction,
    user::UserID,
};

/// How a transaction got its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorizationMethod {
    /// The classifier predicted an existing category.
    AiCategorization,
    /// The classifier predicted a label that needed a new category.
    AiCategorizationNewCategory,
    /// The user picked an existing category.
    ManualOverride,
    /// The user named a category that had to be created.
    ManualNewCategory,
    /// The user assigned a category to many transactions at once.
    ManualBatch,
    /// No categorization details are known.
    Manual,
}

impl CategorizationMethod {
    /// The method for a category predicted by the classifier.
    pub fn ai(outcome: ResolutionOutcome) -> Self {
        match outcome {
            ResolutionOutcome::Existing => Self::AiCategorization,
            ResolutionOutcome::Created => Self::AiCategorizationNewCategory,
        }
    }

    /// The method for a category named by the user.
    pub fn named(outcome: ResolutionOutcome) -> Self {
        match outcome {
            ResolutionOutcome::Existing => Self::ManualOverride,
            ResolutionOutcome::Created => Self::ManualNewCategory,
        }
    }

    /// The stable name of the method, e.g. "ai_categorization".
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AiCategorization => "ai_categorization",
            Self::AiCategorizationNewCategory => "ai_categorization_new_category",
            Self::ManualOverride => "manual_override",
            Self::ManualNewCategory => "manual_new_category",
            Self::ManualBatch => "manual_batch",
            Self::Manual => "manual",
        }
    }
}

impl Display for CategorizationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategorizationMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ai_categorization" => Ok(Self::AiCategorization),
            "ai_categorization_new_category" => Ok(Self::AiCategorizationNewCategory),
            "manual_override" => Ok(Self::ManualOverride),
            "manual_new_category" => Ok(Self::ManualNewCategory),
            "manual_batch" => Ok(Self::ManualBatch),
            "manual" => Ok(Self::Manual),
            other => Err(Error::Validation(format!(
                "unknown categorization method \"{other}\""
            ))),
        }
    }
}

/// A transaction as sent to API clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionView {
    pub id: TransactionId,
    pub description: String,
    /// Positive for income, negative for expenses.
    pub amount: f64,
    /// When the money moved, as opposed to when the row was created.
    #[serde(with = "time::serde::rfc3339")]
    pub transaction_date: OffsetDateTime,
    /// `None` only for transactions whose category was never set.
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub user_id: UserID,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// The classifier confidence for AI categorizations, 1.0 for manual changes.
    pub ai_confidence: f64,
    /// How the current category was chosen. Read endpoints report [CategorizationMethod::Manual].
    pub prediction_method: CategorizationMethod,
}

impl TransactionView {
    /// Describe a transaction that was just categorized.
    pub fn categorized(
        transaction: Transaction,
        method: CategorizationMethod,
        confidence: f64,
    ) -> Self {
        Self {
            id: transaction.id,
            description: transaction.description,
            amount: transaction.amount,
            transaction_date: transaction.transaction_date,
            category_id: transaction.category_id,
            category_name: transaction.category_name,
            user_id: transaction.user_id,
            created_at: transaction.created_at,
            updated_at: transaction.updated_at,
            ai_confidence: confidence,
            prediction_method: method,
        }
    }
}

impl From<Transaction> for TransactionView {
    /// Describe a stored transaction. Categorization details are only reported
    /// when a transaction is categorized, so stored transactions are "manual".
    fn from(transaction: Transaction) -> Self {
        Self::categorized(transaction, CategorizationMethod::Manual, 0.0)
    }
}
