//! Core type definitions used across the Warden workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
