//! Security audit views.

pub mod service;

pub use service::SecurityService;
