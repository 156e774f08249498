//! Categories for grouping transactions.
//!
//! A category is either shared (visible to every user) or personal (owned by,
//! and only visible to, a single user).

mod db;
mod domain;
mod endpoints;
mod resolver;

pub use db::{
    CategoryStat, SYSTEM_CATEGORIES, UNCATEGORIZED, create_category, create_category_table,
    find_personal_category_by_name, find_visible_category_by_name, get_category_distribution,
    get_visible_categories, get_visible_category, search_visible_categories,
    seed_system_categories,
};
pub use domain::{Category, CategoryData, CategoryName, MAX_CATEGORY_NAME_LENGTH};
pub use endpoints::{
    create_category_endpoint, get_categories_endpoint, get_category_stats_endpoint,
    suggest_categories_endpoint,
};
pub use resolver::{ResolutionOutcome, ResolvedCategory, resolve_category, resolve_personal_category};
