//! Role-based access control over a loaded [`Principal`](warden_entity::user::Principal).

pub mod requirement;
pub mod resolver;

pub use requirement::Requirement;
pub use resolver::{has_any_role, has_permission, has_role};
