//! Request handlers.
//!
//! Handlers validate input, open a unit of work on the pool, delegate to
//! `cinecat_core::merge` and map errors via [`AppError`](crate::error::AppError).

pub mod people_merge;
