//! User domain entities.

pub mod model;
pub mod principal;

pub use model::{CreateUser, UpdateUser, User, UserFilter};
pub use principal::Principal;
