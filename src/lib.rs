//! # campusdb - School records store
//!
//! An in-memory relational store for students, instructors, courses and
//! enrollments.
//!
//! campusdb provides:
//! - Typed records for the four entity kinds
//! - A store that enforces unique identifiers and foreign keys on every mutation
//! - JSON seed fixtures applied through the validated write path
//! - An HTTP API mirroring the classic `add_*` / `get_*` endpoints

pub mod entity;
pub mod store;
pub mod seed;
pub mod server;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use entity::{Course, Enrollment, EntityKind, Instructor, Record, Student};
pub use store::{Collection, RelationalStore, StoreStats, Table};
pub use seed::Seed;

/// Result type alias for campusdb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for campusdb operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{kind} '{id}' already exists")]
    DuplicateKey { kind: EntityKind, id: String },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: EntityKind, id: String },

    #[error("{kind} '{id}' references missing {target} '{reference}'")]
    ForeignKeyViolation {
        kind: EntityKind,
        id: String,
        target: EntityKind,
        reference: String,
    },

    #[error("{kind} '{id}' is still referenced by {dependent} '{dependent_id}'")]
    ReferentialIntegrityViolation {
        kind: EntityKind,
        id: String,
        dependent: EntityKind,
        dependent_id: String,
    },

    #[error("Unknown entity kind: {0}")]
    UnknownEntity(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for rejections produced by store validation.
    ///
    /// These never leave the store modified and retrying with the same input
    /// fails the same way.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::DuplicateKey { .. }
                | Error::NotFound { .. }
                | Error::ForeignKeyViolation { .. }
                | Error::ReferentialIntegrityViolation { .. }
        )
    }
}
