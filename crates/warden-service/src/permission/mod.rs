//! Permission catalogue management.

pub mod service;

pub use service::PermissionService;
