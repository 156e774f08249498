//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, database_id::CategoryId, user::UserID};

/// The maximum number of characters in a category name.
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;

/// A validated, non-empty category name of at most [MAX_CATEGORY_NAME_LENGTH] characters.
///
/// Leading and trailing whitespace is removed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::Validation] if `name` is empty,
    /// just whitespace or longer than [MAX_CATEGORY_NAME_LENGTH] characters.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::Validation(
                "category name must not be empty".to_owned(),
            ))
        } else if name.chars().count() > MAX_CATEGORY_NAME_LENGTH {
            Err(Error::Validation(format!(
                "category name must be at most {MAX_CATEGORY_NAME_LENGTH} characters"
            )))
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is trimmed, not empty and not too long.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A label for grouping transactions, e.g. 'Transportasi'.
///
/// Shared categories have no owner and are visible to every user, personal
/// categories are only visible to the user that owns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The display name of the category.
    pub name: CategoryName,
    /// The owner of a personal category, `None` for shared categories.
    pub user_id: Option<UserID>,
    /// When the category was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Category {
    /// Whether the category is a shared system category.
    pub fn is_shared(&self) -> bool {
        self.user_id.is_none()
    }
}

/// The request body for creating a category.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryData {
    /// The name of the new category.
    pub name: String,
}
