//! Database operations for categories.

use rusqlite::{Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    category::{Category, CategoryName},
    database_id::CategoryId,
    user::UserID,
};

/// The shared categories every user can see.
pub const SYSTEM_CATEGORIES: [&str; 9] = [
    "Makanan & Minuman",
    "Transportasi",
    "Tagihan",
    "Belanja",
    "Hiburan",
    "Kesehatan",
    "Pendidikan",
    "Investasi",
    "Lainnya",
];

/// The name reported for transactions without a category.
pub const UNCATEGORIZED: &str = "Tidak Berkategori";

const CATEGORY_COLUMNS: &str = "id, name, user_id, created_at";

/// Create a category and return it with its generated ID.
///
/// `owner` is `None` for a shared category.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateCategory] if the owner already has a category with the same name,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_category(
    name: CategoryName,
    owner: Option<UserID>,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "INSERT INTO category (name, user_id, created_at) VALUES (?1, ?2, ?3)
             RETURNING {CATEGORY_COLUMNS}"
        ))?
        .query_row(
            (
                name.as_ref(),
                owner.map(|id| id.as_i64()),
                OffsetDateTime::now_utc(),
            ),
            map_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateCategory(name.to_string()),
            error => error.into(),
        })
}

/// Retrieve a category by ID if it is shared or owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the category does not exist or belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_visible_category(
    category_id: CategoryId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category
             WHERE id = ?1 AND (user_id = ?2 OR user_id IS NULL)"
        ))?
        .query_row((category_id, user_id.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Find the category named `name` that is visible to `user_id`.
///
/// When both a personal and a shared category match, the personal category
/// wins. Ties within a tier go to the lowest ID.
pub fn find_visible_category_by_name(
    name: &str,
    user_id: UserID,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category
             WHERE name = ?1 AND (user_id = ?2 OR user_id IS NULL)
             ORDER BY user_id IS NULL, id
             LIMIT 1"
        ))?
        .query_row((name, user_id.as_i64()), map_row)
        .optional()
        .map_err(|error| error.into())
}

/// Find the category named `name` that is owned by `user_id`, ignoring shared categories.
pub fn find_personal_category_by_name(
    name: &str,
    user_id: UserID,
    connection: &Connection,
) -> Result<Option<Category>, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category WHERE name = ?1 AND user_id = ?2"
        ))?
        .query_row((name, user_id.as_i64()), map_row)
        .optional()
        .map_err(|error| error.into())
}

/// Retrieve the shared categories and the categories owned by `user_id`, ordered by name.
pub fn get_visible_categories(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category
             WHERE user_id = ?1 OR user_id IS NULL
             ORDER BY name ASC, id ASC"
        ))?
        .query_map([user_id.as_i64()], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Retrieve at most `limit` visible categories whose name contains `query`, ignoring ASCII case.
///
/// An empty `query` matches every visible category.
pub fn search_visible_categories(
    query: &str,
    limit: u32,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM category
             WHERE (user_id = ?1 OR user_id IS NULL) AND instr(lower(name), lower(?2)) > 0
             ORDER BY name ASC, id ASC
             LIMIT ?3"
        ))?
        .query_map((user_id.as_i64(), query, limit), map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// How a user's transactions are spread over their categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStat {
    /// The category ID, `None` for uncategorized transactions.
    pub category_id: Option<CategoryId>,
    /// The category name, or [UNCATEGORIZED].
    pub category_name: String,
    /// The number of transactions in the category.
    pub transaction_count: i64,
    /// The sum of the transaction amounts.
    pub total_amount: f64,
    /// The mean transaction amount.
    pub avg_amount: f64,
}

/// Get the per-category distribution of the user's transactions, largest first.
pub fn get_category_distribution(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<CategoryStat>, Error> {
    connection
        .prepare(
            "SELECT t.category_id, COALESCE(c.name, ?2), COUNT(*),
                COALESCE(SUM(t.amount), 0.0), COALESCE(AVG(t.amount), 0.0)
             FROM \"transaction\" t
             LEFT JOIN category c ON t.category_id = c.id
             WHERE t.user_id = ?1 AND t.deleted_at IS NULL
             GROUP BY t.category_id
             ORDER BY COUNT(*) DESC, t.category_id ASC",
        )?
        .query_map((user_id.as_i64(), UNCATEGORIZED), |row| {
            Ok(CategoryStat {
                category_id: row.get(0)?,
                category_name: row.get(1)?,
                transaction_count: row.get(2)?,
                total_amount: row.get(3)?,
                avg_amount: row.get(4)?,
            })
        })?
        .map(|maybe_stat| maybe_stat.map_err(|error| error.into()))
        .collect()
}

/// Initialize the category table and indexes.
///
/// A name may be used once per owner, and once among the shared categories.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            user_id INTEGER,
            created_at TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_category_name_owner
            ON category(name, IFNULL(user_id, -1));

        CREATE INDEX IF NOT EXISTS idx_category_user ON category(user_id);",
    )?;

    Ok(())
}

/// Insert the [SYSTEM_CATEGORIES] as shared categories, skipping any that already exist.
pub fn seed_system_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let mut statement = connection.prepare(
        "INSERT OR IGNORE INTO category (name, user_id, created_at) VALUES (?1, NULL, ?2)",
    )?;
    let now = OffsetDateTime::now_utc();

    for name in SYSTEM_CATEGORIES {
        statement.execute((name, now))?;
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let user_id: Option<i64> = row.get(2)?;
    let created_at = row.get(3)?;

    Ok(Category {
        id,
        name: CategoryName::new_unchecked(&raw_name),
        user_id: user_id.map(UserID::new),
        created_at,
    })
}
