//! Storage traits and implementations for progress and roster documents.
//!
//! The read-modify-write cycle inside [`ProgressStore::upsert`] is not
//! locked across concurrent submissions for the same key; the monotonic
//! max-merge makes that safe (a lost update redoes a merge, it never
//! regresses progress). Implementations must keep each document write
//! atomic so no partial-field record is ever observable.

mod error;
mod libsql;
mod memory;

pub use error::{Error, Result};
pub use libsql::LibsqlStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::progress::{ProgressKey, ProgressRecord, ProgressUpdate};
use crate::student::{AssignmentGrade, Student};

/// Fetch and upsert of per-student progress documents.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Get the record for a key, `None` on first interaction.
    async fn get(&self, key: &ProgressKey) -> Result<Option<ProgressRecord>>;

    /// Apply a set-semantics update, creating the record on first save.
    ///
    /// Merging happens inside the store so every write path shares the
    /// monotonic merge. Returns the record as persisted.
    async fn upsert(&self, key: &ProgressKey, update: ProgressUpdate) -> Result<ProgressRecord>;

    /// All records for one student.
    async fn list_for_student(&self, student_id: &str) -> Result<Vec<ProgressRecord>>;

    /// Zero the record's scores and vectors, keeping it. `None` when the
    /// record does not exist.
    async fn reset(&self, key: &ProgressKey) -> Result<Option<ProgressRecord>>;
}

/// Roster access for the administrative endpoints.
#[async_trait]
pub trait StudentStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<Student>>;

    async fn list(&self) -> Result<Vec<Student>>;

    /// Insert a new student; duplicate emails are a conflict.
    async fn create(&self, student: Student) -> Result<Student>;

    /// Flip the access flag. Returns false when the student is unknown.
    async fn set_allowed(&self, user_id: &str, allowed: bool) -> Result<bool>;
}

/// Assignment grade history.
#[async_trait]
pub trait AssignmentGradeStore: Send + Sync {
    /// Record a grade, replacing any previous grade for the same
    /// (student, topic, subtopic).
    async fn record(&self, grade: AssignmentGrade) -> Result<()>;

    async fn list_for_student(&self, student_id: &str) -> Result<Vec<AssignmentGrade>>;
}
