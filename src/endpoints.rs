//! The API endpoints URIs.
//!
//! Tests fill in path parameters, e.g., '/api/v1/transactions/{transaction_id}', with `format_endpoint`.

/// The liveness check.
pub const HEALTH: &str = "/health";

/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/v1/categories";
/// The route to search categories by name.
pub const CATEGORY_SUGGESTIONS: &str = "/api/v1/categories/suggest";
/// The route for the distribution of transactions over categories.
pub const CATEGORY_STATS: &str = "/api/v1/categories/stats";

/// The route to list and create transactions.
pub const TRANSACTIONS: &str = "/api/v1/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/v1/transactions/{transaction_id}";
/// The route to change the category of a single transaction.
pub const RECATEGORIZE_TRANSACTION: &str = "/api/v1/transactions/{transaction_id}/recategorize";
/// The route to change the category of many transactions.
pub const BATCH_RECATEGORIZE: &str = "/api/v1/transactions/batch-recategorize";

/// The route for the health of the classification service.
pub const AI_STATUS: &str = "/api/v1/ai/status";
/// The route to classify a sample description.
pub const AI_TEST: &str = "/api/v1/ai/test";

/// The route for the user's income and expense totals.
pub const STATS_SUMMARY: &str = "/api/v1/stats/summary";
/// The route for the user's income and expenses per month.
pub const STATS_MONTHLY: &str = "/api/v1/stats/monthly";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/users/{user_id}', '{user_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
#[cfg(test)]
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}

// These tests are here so that we know when we call `Uri::from_shared` it will not panic.
#[cfg(test)]
mod endpoints_tests {
    use axum::http::Uri;

    use crate::endpoints;

    use super::format_endpoint;

    fn assert_endpoint_is_valid_uri(uri: &str) {
        assert!(uri.parse::<Uri>().is_ok());
    }

    #[test]
    fn endpoints_are_valid_uris() {
        assert_endpoint_is_valid_uri(endpoints::HEALTH);
        assert_endpoint_is_valid_uri(endpoints::CATEGORIES);
        assert_endpoint_is_valid_uri(endpoints::CATEGORY_SUGGESTIONS);
        assert_endpoint_is_valid_uri(endpoints::CATEGORY_STATS);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTIONS);
        assert_endpoint_is_valid_uri(endpoints::TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::RECATEGORIZE_TRANSACTION);
        assert_endpoint_is_valid_uri(endpoints::BATCH_RECATEGORIZE);
        assert_endpoint_is_valid_uri(endpoints::AI_STATUS);
        assert_endpoint_is_valid_uri(endpoints::AI_TEST);
        assert_endpoint_is_valid_uri(endpoints::STATS_SUMMARY);
        assert_endpoint_is_valid_uri(endpoints::STATS_MONTHLY);
    }

    #[test]
    fn produces_valid_uri() {
        let formatted_path = format_endpoint("/hello/{world_id}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());

        // Parameter with single word should also work.
        let formatted_path = format_endpoint("/hello/{world}", 1);

        assert_eq!(formatted_path, "/hello/1");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn returns_original_path_with_no_parameter() {
        let formatted_path = format_endpoint("/hello/world", 1);

        assert_eq!(formatted_path, "/hello/world");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }

    #[test]
    fn parameter_in_middle() {
        let formatted_path = format_endpoint(endpoints::RECATEGORIZE_TRANSACTION, 7);

        assert_eq!(formatted_path, "/api/v1/transactions/7/recategorize");
        assert!(formatted_path.parse::<Uri>().is_ok());
    }
}
