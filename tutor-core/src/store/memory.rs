//! In-memory store, used by tests and as the zero-setup default.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::warn;

use crate::progress::{ProgressKey, ProgressRecord, ProgressUpdate};
use crate::student::{AssignmentGrade, Student};

use super::{AssignmentGradeStore, Error, ProgressStore, Result, StudentStore};

/// RwLock-backed store keeping everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    progress: RwLock<HashMap<ProgressKey, ProgressRecord>>,
    students: RwLock<HashMap<String, Student>>,
    grades: RwLock<Vec<AssignmentGrade>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn get(&self, key: &ProgressKey) -> Result<Option<ProgressRecord>> {
        Ok(self.progress.read().unwrap().get(key).cloned())
    }

    async fn upsert(&self, key: &ProgressKey, update: ProgressUpdate) -> Result<ProgressRecord> {
        let mut progress = self.progress.write().unwrap();
        let record = progress
            .entry(key.clone())
            .or_insert_with(|| ProgressRecord::new(key.clone()));
        for drift in record.apply(update) {
            warn!(
                key = %key.path,
                student = %key.student_id,
                stored = drift.stored,
                incoming = drift.incoming,
                "progress vector length drift; padded with not_started"
            );
        }
        Ok(record.clone())
    }

    async fn list_for_student(&self, student_id: &str) -> Result<Vec<ProgressRecord>> {
        let progress = self.progress.read().unwrap();
        let mut records: Vec<_> = progress
            .values()
            .filter(|r| r.key.student_id == student_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.key.path.to_string().cmp(&b.key.path.to_string()));
        Ok(records)
    }

    async fn reset(&self, key: &ProgressKey) -> Result<Option<ProgressRecord>> {
        let mut progress = self.progress.write().unwrap();
        Ok(progress.get_mut(key).map(|record| {
            record.reset();
            record.clone()
        }))
    }
}

#[async_trait]
impl StudentStore for MemoryStore {
    async fn get(&self, user_id: &str) -> Result<Option<Student>> {
        Ok(self.students.read().unwrap().get(user_id).cloned())
    }

    async fn list(&self) -> Result<Vec<Student>> {
        let mut students: Vec<_> = self.students.read().unwrap().values().cloned().collect();
        students.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(students)
    }

    async fn create(&self, student: Student) -> Result<Student> {
        let mut students = self.students.write().unwrap();
        if students.values().any(|s| s.email == student.email) {
            return Err(Error::DuplicateStudent(student.email));
        }
        students.insert(student.user_id.clone(), student.clone());
        Ok(student)
    }

    async fn set_allowed(&self, user_id: &str, allowed: bool) -> Result<bool> {
        let mut students = self.students.write().unwrap();
        match students.get_mut(user_id) {
            Some(student) => {
                student.allowed = allowed;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl AssignmentGradeStore for MemoryStore {
    async fn record(&self, grade: AssignmentGrade) -> Result<()> {
        let mut grades = self.grades.write().unwrap();
        grades.retain(|g| {
            !(g.student_id == grade.student_id
                && g.topic_id == grade.topic_id
                && g.subtopic_id == grade.subtopic_id)
        });
        grades.push(grade);
        Ok(())
    }

    async fn list_for_student(&self, student_id: &str) -> Result<Vec<AssignmentGrade>> {
        Ok(self
            .grades
            .read()
            .unwrap()
            .iter()
            .filter(|g| g.student_id == student_id)
            .cloned()
            .collect())
    }
}
