//! Common library for the helpdesk backend
//!
//! This crate provides shared infrastructure used by the helpdesk service:
//! PostgreSQL connectivity, the Redis cache pool, and common error types.

pub mod cache;
pub mod database;
pub mod error;
