//! Domain logic for the cinecat people catalog.
//!
//! Pure types and algorithms with no database access. The merge engine
//! talks to storage only through the unit-of-work traits in
//! [`merge::store`], which `cinecat-db` implements over a Postgres
//! transaction.

pub mod cache;
pub mod error;
pub mod names;
pub mod person;
pub mod slug;
pub mod types;

pub mod merge;
