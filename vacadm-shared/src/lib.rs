//! # Vacadm Shared Library
//!
//! This crate contains the domain types, storage abstraction, and business
//! logic used by the vacadm API server.
//!
//! ## Module Organization
//!
//! - `models`: Users, teams, vacations, vacation requests and resources
//! - `repository`: CRUD abstraction with in-memory and PostgreSQL backends
//! - `db`: PostgreSQL pool and migrations
//! - `auth`: Tokens, authentication context, relations and access decisions
//! - `approval`: Vacation request approval workflow
//! - `capacity`: Team availability aggregation and reports
//! - `notify`: User and team notifications

pub mod approval;
pub mod auth;
pub mod capacity;
pub mod db;
pub mod models;
pub mod notify;
pub mod repository;

/// Current version of the vacadm shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
