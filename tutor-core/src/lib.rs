//! Core domain for the tutor backend.
//!
//! This crate holds everything that is pure and deterministic:
//!
//! - **Progress** ([`ObjectiveFlag`], [`ProgressVector`]) - tri-state
//!   per-objective completion with a monotonic max-merge
//! - **Records** ([`ProgressRecord`]) - per-student progress documents and
//!   the set-semantics update applied on every chat turn or submission
//! - **Objectives** ([`ObjectiveRegistry`]) - static lookup of the learning
//!   objectives for a (topic, subtopic, nested subtopic) path
//! - **Storage** ([`ProgressStore`] and friends) - async traits with libSQL
//!   and in-memory implementations
//!
//! The merge is a join over a partial order: idempotent, commutative, and
//! monotone. That is what makes unlocked read-modify-write against the store
//! safe - a lost update can at worst cause a merge to be redone, never a
//! regression.

pub mod objectives;
pub mod progress;
pub mod store;
pub mod student;

pub use objectives::{ObjectiveRegistry, TopicPath};
pub use progress::{
    LengthDrift, MergeOutcome, ObjectiveFlag, ProgressKey, ProgressRecord, ProgressUpdate,
    ProgressVector, QUIZ_READY_RATIO,
};
pub use store::{AssignmentGradeStore, LibsqlStore, MemoryStore, ProgressStore, StudentStore};
pub use student::{AssignmentGrade, NewStudent, Student};
