//! Merge pipeline states and errors.

use std::fmt;
use std::time::Duration;

use crate::error::CoreError;
use crate::types::DbId;

/// Boxed backend error carried through the storage traits.
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A failure reported by a unit-of-work implementation.
///
/// Backend-agnostic: `cinecat-db` wraps `sqlx::Error` here, the in-memory
/// store used in tests wraps its own errors.
#[derive(Debug, thiserror::Error)]
#[error("{operation}: {source}")]
pub struct StoreError {
    /// The storage operation that failed, e.g. `"delete cast credit"`.
    pub operation: &'static str,
    #[source]
    pub source: BoxedSource,
}

impl StoreError {
    pub fn new(operation: &'static str, source: impl Into<BoxedSource>) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Pipeline position of a merge run.
///
/// A run moves strictly forward through these states; any failure ends in
/// `Aborted` with the unit of work rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeState {
    Validated,
    Loaded,
    SurvivorChosen,
    FieldsResolved,
    AltNamesMigrated,
    RelationsMigrated,
    SurvivorUpdated,
    AbsorbedDeleted,
    Committed,
    Aborted,
}

impl fmt::Display for MergeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MergeState::Validated => "validated",
            MergeState::Loaded => "loaded",
            MergeState::SurvivorChosen => "survivor_chosen",
            MergeState::FieldsResolved => "fields_resolved",
            MergeState::AltNamesMigrated => "alt_names_migrated",
            MergeState::RelationsMigrated => "relations_migrated",
            MergeState::SurvivorUpdated => "survivor_updated",
            MergeState::AbsorbedDeleted => "absorbed_deleted",
            MergeState::Committed => "committed",
            MergeState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// The request was rejected before any storage access.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// One of the operands does not exist.
    #[error("Person with id {0} not found")]
    PersonNotFound(DbId),

    /// A storage operation failed; the unit of work was rolled back.
    ///
    /// `state` is the last state the pipeline completed.
    #[error("Merge aborted after {state}: {source}")]
    Storage {
        state: MergeState,
        #[source]
        source: StoreError,
    },

    /// The pipeline ran past its deadline and was rolled back.
    ///
    /// Commit is never cut off; this only fires before it starts.
    #[error("Merge timed out after {}s in state {state}", .deadline.as_secs())]
    TimedOut { state: MergeState, deadline: Duration },
}

impl From<MergeError> for CoreError {
    fn from(err: MergeError) -> Self {
        match err {
            MergeError::Validation(msg) => CoreError::Validation(msg),
            MergeError::PersonNotFound(id) => CoreError::NotFound { entity: "Person", id },
            other => CoreError::Internal(other.to_string()),
        }
    }
}
