//! Route handlers for listing, creating and searching categories.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    app_state::{DatabaseState, lock_connection},
    auth::Claims,
    category::{
        Category, CategoryData, CategoryName, CategoryStat, create_category,
        get_category_distribution, get_visible_categories, search_visible_categories,
    },
    database_id::CategoryId,
    transaction::{MethodStat, count_categorization_methods},
};

/// The number of suggestions returned when the client does not ask for a limit.
pub const DEFAULT_SUGGESTION_LIMIT: u32 = 10;
/// The most suggestions a client may ask for.
pub const MAX_SUGGESTION_LIMIT: u32 = 50;

/// The categories visible to a user.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

/// List the shared categories and the caller's personal categories.
pub async fn get_categories_endpoint(
    State(state): State<DatabaseState>,
    claims: Claims,
) -> Result<Json<CategoriesResponse>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let categories = get_visible_categories(claims.user_id, &connection)?;

    Ok(Json(CategoriesResponse { categories }))
}

/// A single category.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub category: Category,
}

/// Create a personal category for the caller.
///
/// Responds with 409 Conflict if the caller already has a category with the same name.
pub async fn create_category_endpoint(
    State(state): State<DatabaseState>,
    claims: Claims,
    request: Result<Json<CategoryData>, JsonRejection>,
) -> Result<(StatusCode, Json<CategoryResponse>), Error> {
    let Json(request) = request.map_err(|rejection| Error::Validation(rejection.body_text()))?;
    let name = CategoryName::new(&request.name)?;

    let connection = lock_connection(&state.db_connection)?;
    let category = create_category(name, Some(claims.user_id), &connection)?;

    tracing::info!(user_id = %claims.user_id, category = %category.name, "created category");

    Ok((StatusCode::CREATED, Json(CategoryResponse { category })))
}

/// The query parameters for category suggestions.
#[derive(Debug, Default, Deserialize)]
pub struct SuggestionQuery {
    /// Part of the category name, matched ignoring case.
    #[serde(default)]
    pub q: String,
    pub limit: Option<u32>,
}

/// Whether a suggested category is shared or belongs to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionType {
    Personal,
    System,
}

/// A category that matched a suggestion query.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategorySuggestion {
    pub id: CategoryId,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: SuggestionType,
}

impl From<Category> for CategorySuggestion {
    fn from(category: Category) -> Self {
        let type_ = if category.is_shared() {
            SuggestionType::System
        } else {
            SuggestionType::Personal
        };

        Self {
            id: category.id,
            name: category.name.to_string(),
            type_,
        }
    }
}

/// The categories that matched a suggestion query.
#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<CategorySuggestion>,
    pub query: String,
    pub count: usize,
}

/// Search the caller's visible categories by name, e.g. for autocompletion.
pub async fn suggest_categories_endpoint(
    State(state): State<DatabaseState>,
    claims: Claims,
    query: Result<Query<SuggestionQuery>, QueryRejection>,
) -> Result<Json<SuggestionsResponse>, Error> {
    let Query(query) = query.map_err(|rejection| Error::Validation(rejection.body_text()))?;
    let limit = match query.limit {
        None | Some(0) => DEFAULT_SUGGESTION_LIMIT,
        Some(limit) => limit.min(MAX_SUGGESTION_LIMIT),
    };

    let connection = lock_connection(&state.db_connection)?;
    let suggestions: Vec<CategorySuggestion> =
        search_visible_categories(query.q.trim(), limit, claims.user_id, &connection)?
            .into_iter()
            .map(CategorySuggestion::from)
            .collect();

    Ok(Json(SuggestionsResponse {
        count: suggestions.len(),
        suggestions,
        query: query.q,
    }))
}

/// How the caller's transactions are spread over categories and categorization methods.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryStatsResponse {
    pub category_distribution: Vec<CategoryStat>,
    pub prediction_methods: Vec<MethodStat>,
    pub total_transactions: i64,
    pub total_categories: usize,
}

/// Report the per-category distribution of the caller's transactions.
pub async fn get_category_stats_endpoint(
    State(state): State<DatabaseState>,
    claims: Claims,
) -> Result<Json<CategoryStatsResponse>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let category_distribution = get_category_distribution(claims.user_id, &connection)?;
    let prediction_methods = count_categorization_methods(claims.user_id, &connection)?;

    Ok(Json(CategoryStatsResponse {
        total_transactions: category_distribution
            .iter()
            .map(|stat| stat.transaction_count)
            .sum(),
        total_categories: category_distribution.len(),
        category_distribution,
        prediction_methods,
    }))
}
