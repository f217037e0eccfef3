//! # warden-database
//!
//! Persistence for Warden. The [`store`] module defines one async trait
//! per table; [`repositories`] implements them over PostgreSQL and
//! [`memory`] implements them in process for tests and local runs.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod seed;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::{
    FailedLoginStore, PermissionStore, RefreshTokenStore, RequestLogStore, RoleStore, Stores,
    UserStore,
};
