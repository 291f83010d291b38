//! Permission-filtered navigation menu.
//!
//! Menu items are visible to a user only when at least one of their linked
//! permissions is reachable through the user's roles; visible items are
//! arranged into a parent/child tree ordered by position.

mod handlers;
mod queries;
mod tree;

pub use handlers::{create_item, create_permission_link, list_menu};
pub use tree::{build_menu_tree, MenuNode};
