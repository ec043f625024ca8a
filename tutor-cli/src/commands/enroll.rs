//! Enroll a student directly against the database.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tutor_core::{LibsqlStore, NewStudent, StudentStore};

/// Arguments for the enroll command
#[derive(Debug, Args)]
pub struct EnrollArgs {
    /// Student's display name
    #[arg(long)]
    pub name: String,

    /// Student's email (unique per roster)
    #[arg(long)]
    pub email: String,

    /// Allow tutoring access immediately
    #[arg(long)]
    pub allow: bool,

    /// Path to the local database file (env: TUTOR_DB)
    #[arg(long, env = "TUTOR_DB")]
    pub db: PathBuf,
}

/// Run the enroll command
pub async fn run(args: EnrollArgs) -> Result<()> {
    let store = LibsqlStore::new_local(&args.db)
        .await
        .with_context(|| format!("opening database {}", args.db.display()))?;

    let student = NewStudent {
        name: args.name,
        email: args.email,
    }
    .into_student();
    let user_id = student.user_id.clone();

    let mut created = store.create(student).await.context("enrolling student")?;
    if args.allow {
        store.set_allowed(&user_id, true).await?;
        created.allowed = true;
    }

    println!("{}", serde_json::to_string_pretty(&created)?);
    Ok(())
}
