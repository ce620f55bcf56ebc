//! Row structs for the catalog tables.
//!
//! Each `FromRow` struct mirrors the columns a repository selects and
//! converts into the matching `cinecat_core::person` type.

pub mod credit;
pub mod person;
pub mod satellite;
