//! # Bandroom Shared Library
//!
//! This crate contains the types and business logic shared across the
//! bandroom API server: database models, connection pooling, authentication
//! primitives, and the form schema/binding layer.
//!
//! ## Module Organization
//!
//! - `models`: Database models (users, bands, events) and their queries
//! - `auth`: Password hashing, credential checks, sessions, authorization
//! - `db`: Connection pool and migration runner
//! - `forms`: Declarative form schemas with validation and view-models

pub mod auth;
pub mod db;
pub mod forms;
pub mod models;

/// Current version of the bandroom shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
