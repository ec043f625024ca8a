//! Roster records owned by the administrative surface.
//!
//! The tutoring core only ever reads the access flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub user_id: String,
    pub name: String,
    pub email: String,
    /// Whether the student may use the tutoring endpoints.
    pub allowed: bool,
}

/// Enrollment request; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
}

impl NewStudent {
    /// Mint a full record with a fresh id. New students start disallowed
    /// until an administrator flips the flag.
    #[must_use]
    pub fn into_student(self) -> Student {
        Student {
            user_id: Uuid::new_v4().to_string(),
            name: self.name,
            email: self.email,
            allowed: false,
        }
    }
}

/// One graded spreadsheet assignment, kept as its own document so feedback
/// history survives progress resets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentGrade {
    pub student_id: String,
    pub topic_id: String,
    pub subtopic_id: String,
    pub score: u8,
    pub feedback: String,
    pub graded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_students_start_disallowed() {
        let student = NewStudent {
            name: "Ada".to_string(),
            email: "ada@example.edu".to_string(),
        }
        .into_student();

        assert!(!student.allowed);
        assert!(!student.user_id.is_empty());
    }
}
