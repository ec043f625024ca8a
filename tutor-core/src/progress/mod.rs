//! Objective progress: tri-state flags, vectors, and per-student records.

mod flag;
mod record;
mod vector;

pub use flag::ObjectiveFlag;
pub use record::{ProgressKey, ProgressRecord, ProgressUpdate};
pub use vector::{LengthDrift, MergeOutcome, ProgressVector, QUIZ_READY_RATIO};
