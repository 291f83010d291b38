//! Role-based permission resolution.
//!
//! Users hold roles, roles carry permissions, and every privileged mutation
//! gates on whether some role of the caller matches the required
//! `(resource, action)` pair.

mod queries;
mod resolver;

pub use queries::*;
pub use resolver::{has_permission, permission_ids_for_user, role_names_for_user};
