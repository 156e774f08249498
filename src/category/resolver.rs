//! Find-or-create resolution of category labels.
//!
//! Labels come from the classification service or from users, and are
//! resolved against the categories visible to the caller. When no category
//! matches, a personal category is created for the caller.

use rusqlite::Connection;

use crate::{
    Error,
    category::{
        Category, CategoryName, create_category, find_personal_category_by_name,
        find_visible_category_by_name,
    },
    user::UserID,
};

/// Whether a category was found or had to be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// An existing category was reused.
    Existing,
    /// A new personal category was created.
    Created,
}

/// A category that a label was resolved to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCategory {
    /// The resolved category.
    pub category: Category,
    /// Whether the category already existed.
    pub outcome: ResolutionOutcome,
}

/// Resolve `label` to a category visible to `user_id`, creating a personal category if none exists.
///
/// Personal categories take precedence over shared categories with the same name.
/// If another writer creates the category first, their category is returned
/// as [ResolutionOutcome::Existing].
///
/// # Errors
/// Returns an [Error::CategoryResolution] if the label is not a valid category
/// name or the category could not be read or created.
pub fn resolve_category(
    user_id: UserID,
    label: &str,
    connection: &Connection,
) -> Result<ResolvedCategory, Error> {
    let name = CategoryName::new(label).map_err(resolution_error)?;

    if let Some(category) =
        find_visible_category_by_name(name.as_ref(), user_id, connection).map_err(resolution_error)?
    {
        return Ok(ResolvedCategory {
            category,
            outcome: ResolutionOutcome::Existing,
        });
    }

    let resolved = create_or_fetch(name, user_id, connection, find_visible_category_by_name)?;
    if resolved.outcome == ResolutionOutcome::Created {
        tracing::info!(%user_id, category = %resolved.category.name, "created category for label");
    }

    Ok(resolved)
}

/// Resolve `name` to a category owned by `user_id`, creating it if the user has none by that name.
///
/// Shared categories are never returned, so a personal category may be
/// created alongside a shared category with the same name.
///
/// # Errors
/// Returns an [Error::CategoryResolution] if the category could not be read or created.
pub fn resolve_personal_category(
    user_id: UserID,
    name: &CategoryName,
    connection: &Connection,
) -> Result<ResolvedCategory, Error> {
    if let Some(category) = find_personal_category_by_name(name.as_ref(), user_id, connection)
        .map_err(resolution_error)?
    {
        return Ok(ResolvedCategory {
            category,
            outcome: ResolutionOutcome::Existing,
        });
    }

    create_or_fetch(name.clone(), user_id, connection, find_personal_category_by_name)
}

/// Create a personal category named `name`, or fetch it with `find` if
/// another writer created it after the caller's lookup.
///
/// The unique index on category names decides which writer wins.
fn create_or_fetch<F>(
    name: CategoryName,
    user_id: UserID,
    connection: &Connection,
    find: F,
) -> Result<ResolvedCategory, Error>
where
    F: Fn(&str, UserID, &Connection) -> Result<Option<Category>, Error>,
{
    match create_category(name.clone(), Some(user_id), connection) {
        Ok(category) => Ok(ResolvedCategory {
            category,
            outcome: ResolutionOutcome::Created,
        }),
        Err(Error::DuplicateCategory(_)) => find(name.as_ref(), user_id, connection)
            .map_err(resolution_error)?
            .map(|category| ResolvedCategory {
                category,
                outcome: ResolutionOutcome::Existing,
            })
            .ok_or_else(|| resolution_error(Error::NotFound)),
        Err(error) => Err(resolution_error(error)),
    }
}

fn resolution_error(error: Error) -> Error {
    match error {
        Error::CategoryResolution(_) => error,
        error => {
            tracing::error!("could not resolve category: {error}");
            Error::CategoryResolution(error.to_string())
        }
    }
}
