//! libSQL implementation of the tutor stores.
//!
//! Connects to either a local embedded SQLite file or a remote Turso
//! database. Progress vectors are stored as JSON columns; a malformed
//! vector column degrades to an empty vector rather than failing the merge.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Builder, Connection, Database};
use tracing::{instrument, warn};

use crate::progress::{ProgressKey, ProgressRecord, ProgressUpdate, ProgressVector};
use crate::student::{AssignmentGrade, Student};

use super::{AssignmentGradeStore, Error, ProgressStore, Result, StudentStore};

/// SQL schema for the progress table.
const SCHEMA_PROGRESS: &str = r#"
CREATE TABLE IF NOT EXISTS progress (
    student_id TEXT NOT NULL,
    topic_id TEXT NOT NULL,
    subtopic_id TEXT NOT NULL,
    nested_subtopic_id TEXT NOT NULL,
    quiz_progress TEXT NOT NULL,
    ai_progress TEXT NOT NULL,
    objective_progress TEXT NOT NULL,
    quiz_score INTEGER NOT NULL,
    ai_score INTEGER NOT NULL,
    assignment_score INTEGER NOT NULL,
    topic_grade INTEGER NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (student_id, topic_id, subtopic_id, nested_subtopic_id)
)
"#;

/// SQL schema for the students table.
const SCHEMA_STUDENTS: &str = r#"
CREATE TABLE IF NOT EXISTS students (
    user_id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    allowed INTEGER NOT NULL DEFAULT 0
)
"#;

/// SQL schema for the assignment grades table.
const SCHEMA_GRADES: &str = r#"
CREATE TABLE IF NOT EXISTS assignment_grades (
    student_id TEXT NOT NULL,
    topic_id TEXT NOT NULL,
    subtopic_id TEXT NOT NULL,
    score INTEGER NOT NULL,
    feedback TEXT NOT NULL,
    graded_at TEXT NOT NULL,
    PRIMARY KEY (student_id, topic_id, subtopic_id)
)
"#;

const INDEX_PROGRESS_STUDENT: &str = r#"
CREATE INDEX IF NOT EXISTS idx_progress_student
ON progress(student_id)
"#;

const PROGRESS_COLUMNS: &str = "student_id, topic_id, subtopic_id, nested_subtopic_id, \
     quiz_progress, ai_progress, objective_progress, \
     quiz_score, ai_score, assignment_score, topic_grade, updated_at";

/// libSQL-backed store.
///
/// Each document write is a single `INSERT OR REPLACE`, so records are
/// updated atomically at the document level; no partial-field write is
/// ever visible to a concurrent reader.
#[derive(Clone)]
pub struct LibsqlStore {
    db: Arc<Database>,
    /// A shared-cache in-memory database is deleted once its last connection
    /// closes, so memory-mode stores pin one connection open for their
    /// lifetime. `None` for file-backed and remote databases.
    _mem_keepalive: Option<Connection>,
}

impl LibsqlStore {
    /// Open (or create) a local embedded database.
    pub async fn new_local(path: &Path) -> Result<Self> {
        let db = Builder::new_local(path).build().await?;
        let store = Self {
            db: Arc::new(db),
            _mem_keepalive: None,
        };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Connect to a remote Turso database.
    pub async fn new_remote(url: &str, token: &str) -> Result<Self> {
        let db = Builder::new_remote(url.to_string(), token.to_string())
            .build()
            .await?;
        let store = Self {
            db: Arc::new(db),
            _mem_keepalive: None,
        };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// In-memory database (for testing).
    pub async fn new_memory() -> Result<Self> {
        // A plain `:memory:` database is private to each connection, so the
        // schema created here would be invisible to later `connect()` calls.
        // A uniquely named shared-cache memory URI keeps one database per
        // store while remaining isolated from other stores in the process.
        static NEXT_ID: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
        let id = NEXT_ID.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let uri = format!("file:tutor_mem_{id}?mode=memory&cache=shared");
        let db = Builder::new_local(uri).build().await?;
        let keepalive = db.connect()?;
        let store = Self {
            db: Arc::new(db),
            _mem_keepalive: Some(keepalive),
        };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn conn(&self) -> Result<Connection> {
        Ok(self.db.connect()?)
    }

    async fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn().await?;
        conn.execute(SCHEMA_PROGRESS, ()).await?;
        conn.execute(SCHEMA_STUDENTS, ()).await?;
        conn.execute(SCHEMA_GRADES, ()).await?;
        conn.execute(INDEX_PROGRESS_STUDENT, ()).await?;
        Ok(())
    }

    /// Parse a progress record from a database row.
    fn parse_record(row: &libsql::Row) -> Result<ProgressRecord> {
        let student_id: String = row.get(0)?;
        let topic_id: String = row.get(1)?;
        let subtopic_id: String = row.get(2)?;
        let nested_subtopic_id: String = row.get(3)?;
        let quiz_json: String = row.get(4)?;
        let ai_json: String = row.get(5)?;
        let combined_json: String = row.get(6)?;
        let quiz_score: i64 = row.get(7)?;
        let ai_score: i64 = row.get(8)?;
        let assignment_score: i64 = row.get(9)?;
        let topic_grade: i64 = row.get(10)?;
        let updated_at_str: String = row.get(11)?;

        let key = ProgressKey::new(
            student_id,
            crate::objectives::TopicPath::new(topic_id, subtopic_id, nested_subtopic_id),
        );

        Ok(ProgressRecord {
            key,
            quiz_progress: parse_vector(&quiz_json),
            ai_progress: parse_vector(&ai_json),
            objective_progress: parse_vector(&combined_json),
            quiz_score: clamp_score(quiz_score),
            ai_score: clamp_score(ai_score),
            assignment_score: clamp_score(assignment_score),
            topic_grade: clamp_score(topic_grade),
            updated_at: parse_datetime(&updated_at_str)?,
        })
    }

    async fn write_record(&self, record: &ProgressRecord) -> Result<()> {
        let conn = self.conn().await?;
        conn.execute(
            &format!("INSERT OR REPLACE INTO progress ({PROGRESS_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"),
            libsql::params![
                record.key.student_id.clone(),
                record.key.path.topic_id.clone(),
                record.key.path.subtopic_id.clone(),
                record.key.path.nested_subtopic_id.clone(),
                serde_json::to_string(&record.quiz_progress)?,
                serde_json::to_string(&record.ai_progress)?,
                serde_json::to_string(&record.objective_progress)?,
                record.quiz_score as i64,
                record.ai_score as i64,
                record.assignment_score as i64,
                record.topic_grade as i64,
                format_datetime(record.updated_at)
            ],
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for LibsqlStore {
    #[instrument(skip(self), level = "debug")]
    async fn get(&self, key: &ProgressKey) -> Result<Option<ProgressRecord>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                &format!("SELECT {PROGRESS_COLUMNS} FROM progress WHERE student_id = ? AND topic_id = ? AND subtopic_id = ? AND nested_subtopic_id = ?"),
                libsql::params![
                    key.student_id.clone(),
                    key.path.topic_id.clone(),
                    key.path.subtopic_id.clone(),
                    key.path.nested_subtopic_id.clone()
                ],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::parse_record(&row)?))
        } else {
            Ok(None)
        }
    }

    #[instrument(skip(self, update), level = "debug")]
    async fn upsert(&self, key: &ProgressKey, update: ProgressUpdate) -> Result<ProgressRecord> {
        let mut record = ProgressStore::get(self, key)
            .await?
            .unwrap_or_else(|| ProgressRecord::new(key.clone()));

        for drift in record.apply(update) {
            warn!(
                key = %key.path,
                student = %key.student_id,
                stored = drift.stored,
                incoming = drift.incoming,
                "progress vector length drift; padded with not_started"
            );
        }

        self.write_record(&record).await?;
        Ok(record)
    }

    #[instrument(skip(self), level = "debug")]
    async fn list_for_student(&self, student_id: &str) -> Result<Vec<ProgressRecord>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                &format!("SELECT {PROGRESS_COLUMNS} FROM progress WHERE student_id = ? ORDER BY topic_id, subtopic_id, nested_subtopic_id"),
                [student_id],
            )
            .await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(Self::parse_record(&row)?);
        }
        Ok(records)
    }

    #[instrument(skip(self), level = "debug")]
    async fn reset(&self, key: &ProgressKey) -> Result<Option<ProgressRecord>> {
        let Some(mut record) = ProgressStore::get(self, key).await? else {
            return Ok(None);
        };
        record.reset();
        self.write_record(&record).await?;
        Ok(Some(record))
    }
}

#[async_trait]
impl StudentStore for LibsqlStore {
    #[instrument(skip(self), level = "debug")]
    async fn get(&self, user_id: &str) -> Result<Option<Student>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT user_id, name, email, allowed FROM students WHERE user_id = ?",
                [user_id],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(parse_student(&row)?))
        } else {
            Ok(None)
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn list(&self) -> Result<Vec<Student>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT user_id, name, email, allowed FROM students ORDER BY name",
                (),
            )
            .await?;

        let mut students = Vec::new();
        while let Some(row) = rows.next().await? {
            students.push(parse_student(&row)?);
        }
        Ok(students)
    }

    #[instrument(skip(self, student), level = "debug")]
    async fn create(&self, student: Student) -> Result<Student> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT 1 FROM students WHERE email = ?",
                [student.email.clone()],
            )
            .await?;
        if rows.next().await?.is_some() {
            return Err(Error::DuplicateStudent(student.email));
        }

        conn.execute(
            "INSERT INTO students (user_id, name, email, allowed) VALUES (?, ?, ?, ?)",
            libsql::params![
                student.user_id.clone(),
                student.name.clone(),
                student.email.clone(),
                student.allowed as i64
            ],
        )
        .await?;
        Ok(student)
    }

    #[instrument(skip(self), level = "debug")]
    async fn set_allowed(&self, user_id: &str, allowed: bool) -> Result<bool> {
        let conn = self.conn().await?;
        let changed = conn
            .execute(
                "UPDATE students SET allowed = ? WHERE user_id = ?",
                libsql::params![allowed as i64, user_id],
            )
            .await?;
        Ok(changed > 0)
    }
}

#[async_trait]
impl AssignmentGradeStore for LibsqlStore {
    #[instrument(skip(self, grade), level = "debug")]
    async fn record(&self, grade: AssignmentGrade) -> Result<()> {
        let conn = self.conn().await?;
        conn.execute(
            "INSERT OR REPLACE INTO assignment_grades (student_id, topic_id, subtopic_id, score, feedback, graded_at) VALUES (?, ?, ?, ?, ?, ?)",
            libsql::params![
                grade.student_id.clone(),
                grade.topic_id.clone(),
                grade.subtopic_id.clone(),
                grade.score as i64,
                grade.feedback.clone(),
                format_datetime(grade.graded_at)
            ],
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self), level = "debug")]
    async fn list_for_student(&self, student_id: &str) -> Result<Vec<AssignmentGrade>> {
        let conn = self.conn().await?;
        let mut rows = conn
            .query(
                "SELECT student_id, topic_id, subtopic_id, score, feedback, graded_at FROM assignment_grades WHERE student_id = ? ORDER BY graded_at DESC",
                [student_id],
            )
            .await?;

        let mut grades = Vec::new();
        while let Some(row) = rows.next().await? {
            let student_id: String = row.get(0)?;
            let topic_id: String = row.get(1)?;
            let subtopic_id: String = row.get(2)?;
            let score: i64 = row.get(3)?;
            let feedback: String = row.get(4)?;
            let graded_at_str: String = row.get(5)?;
            grades.push(AssignmentGrade {
                student_id,
                topic_id,
                subtopic_id,
                score: clamp_score(score),
                feedback,
                graded_at: parse_datetime(&graded_at_str)?,
            });
        }
        Ok(grades)
    }
}

fn parse_student(row: &libsql::Row) -> Result<Student> {
    let user_id: String = row.get(0)?;
    let name: String = row.get(1)?;
    let email: String = row.get(2)?;
    let allowed: i64 = row.get(3)?;
    Ok(Student {
        user_id,
        name,
        email,
        allowed: allowed != 0,
    })
}

/// Parse a stored vector column; malformed data degrades to empty rather
/// than crashing the merge.
fn parse_vector(json: &str) -> ProgressVector {
    match serde_json::from_str(json) {
        Ok(vector) => vector,
        Err(e) => {
            warn!(error = %e, "malformed progress vector in store; treating as empty");
            ProgressVector::default()
        }
    }
}

fn clamp_score(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

/// Format a datetime for storage.
fn format_datetime(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Parse a datetime from storage.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| Error::InvalidData(format!("invalid datetime: {}", s)))
}
