//! Test utilities for dispenser services.
//!
//! Provides `MockVisitor` request headers and a migrated in-memory SQLite
//! database. Import from dev-dependencies only.

pub mod db;
pub mod visitor;
