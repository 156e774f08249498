//! Income and expense statistics for a user's transactions.
//!
//! Income is the sum of positive amounts and expenses the sum of the absolute
//! values of negative amounts. Deleted transactions are never counted.

use std::collections::HashMap;

use axum::{Json, extract::State};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Date, Month, OffsetDateTime};

use crate::{
    Error,
    app_state::{DatabaseState, lock_connection},
    auth::Claims,
    user::UserID,
};

/// The number of calendar months covered by the monthly statistics, including the current month.
pub const MONTHS_IN_STATS: usize = 6;

/// The totals over all of a user's transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// The sum of positive amounts.
    pub total_income: f64,
    /// The sum of the absolute values of negative amounts.
    pub total_expense: f64,
    /// Income minus expenses.
    pub balance: f64,
    pub transaction_count: i64,
}

/// Income and expenses for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStat {
    /// The month in the form "2025-01".
    pub month: String,
    pub income: f64,
    pub expense: f64,
    /// Income minus expenses for the month.
    pub balance: f64,
}

/// Gets the income and expense totals over all of the user's transactions.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub fn get_summary(user_id: UserID, connection: &Connection) -> Result<Summary, Error> {
    let (total_income, total_expense, transaction_count): (f64, f64, i64) = connection
        .query_row(
            "SELECT
                COALESCE(SUM(CASE WHEN amount > 0 THEN amount ELSE 0 END), 0.0),
                COALESCE(SUM(CASE WHEN amount < 0 THEN -amount ELSE 0 END), 0.0),
                COUNT(*)
            FROM \"transaction\"
            WHERE user_id = ?1 AND deleted_at IS NULL",
            [user_id.as_i64()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

    Ok(Summary {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        transaction_count,
    })
}

/// Gets the income and expenses for the month of `today` and the months before it.
///
/// # Arguments
/// * `user_id` - The user whose transactions are counted
/// * `today` - The date that decides the most recent month
/// * `connection` - Database connection reference
///
/// # Returns
/// One entry per month for [MONTHS_IN_STATS] months, most recent first.
/// Months without transactions are included with zero totals.
///
/// # Errors
/// Returns [Error::SqlError] if the SQL query fails.
pub fn get_monthly_stats(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Vec<MonthlyStat>, Error> {
    let months = months_up_to(today);
    let (Some(oldest), Some(newest)) = (months.last(), months.first()) else {
        return Ok(Vec::new());
    };
    let end = next_month(*newest);

    let mut statement = connection.prepare(
        "SELECT
            substr(transaction_date, 1, 7) AS month,
            COALESCE(SUM(CASE WHEN amount > 0 THEN amount ELSE 0 END), 0.0),
            COALESCE(SUM(CASE WHEN amount < 0 THEN -amount ELSE 0 END), 0.0)
        FROM \"transaction\"
        WHERE user_id = ?1 AND deleted_at IS NULL
            AND transaction_date >= ?2 AND transaction_date < ?3
        GROUP BY month",
    )?;
    let mut totals: HashMap<String, (f64, f64)> = HashMap::new();
    let rows = statement.query_map(
        (user_id.as_i64(), oldest.to_string(), end.to_string()),
        |row| Ok((row.get::<_, String>(0)?, row.get(1)?, row.get(2)?)),
    )?;

    for row in rows {
        let (month, income, expense) = row?;
        totals.insert(month, (income, expense));
    }

    Ok(months
        .into_iter()
        .map(|month| {
            let key = month_key(month);
            let (income, expense) = totals.get(&key).copied().unwrap_or((0.0, 0.0));

            MonthlyStat {
                month: key,
                income,
                expense,
                balance: income - expense,
            }
        })
        .collect())
}

/// The first day of the month of `today` and the months before it, most recent first.
fn months_up_to(today: Date) -> Vec<Date> {
    let mut months = Vec::with_capacity(MONTHS_IN_STATS);
    let mut month = today.replace_day(1).ok();

    while let Some(current) = month {
        if months.len() == MONTHS_IN_STATS {
            break;
        }

        months.push(current);
        month = previous_month(current);
    }

    months
}

fn previous_month(first_of_month: Date) -> Option<Date> {
    let year = match first_of_month.month() {
        Month::January => first_of_month.year() - 1,
        _ => first_of_month.year(),
    };

    Date::from_calendar_date(year, first_of_month.month().previous(), 1).ok()
}

fn next_month(first_of_month: Date) -> Date {
    let year = match first_of_month.month() {
        Month::December => first_of_month.year() + 1,
        _ => first_of_month.year(),
    };

    Date::from_calendar_date(year, first_of_month.month().next(), 1).unwrap_or(Date::MAX)
}

fn month_key(first_of_month: Date) -> String {
    format!(
        "{:04}-{:02}",
        first_of_month.year(),
        u8::from(first_of_month.month())
    )
}

/// The response body for the summary statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: Summary,
}

/// A route handler for the caller's income and expense totals.
pub async fn get_summary_endpoint(
    State(state): State<DatabaseState>,
    claims: Claims,
) -> Result<Json<SummaryResponse>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let summary = get_summary(claims.user_id, &connection)?;

    Ok(Json(SummaryResponse { summary }))
}

/// The response body for the monthly statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct MonthlyStatsResponse {
    pub monthly_stats: Vec<MonthlyStat>,
}

/// A route handler for the caller's income and expenses in recent months.
pub async fn get_monthly_stats_endpoint(
    State(state): State<DatabaseState>,
    claims: Claims,
) -> Result<Json<MonthlyStatsResponse>, Error> {
    let today = OffsetDateTime::now_utc().date();

    let connection = lock_connection(&state.db_connection)?;
    let monthly_stats = get_monthly_stats(claims.user_id, today, &connection)?;

    Ok(Json(MonthlyStatsResponse { monthly_stats }))
}
