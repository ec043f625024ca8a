//! Tutor serve command.
//!
//! Builds the stores, model provider, evaluator registry, and prompt table,
//! then hands the assembled state to the server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use tutor_core::{
    AssignmentGradeStore, LibsqlStore, MemoryStore, ObjectiveRegistry, ProgressStore, StudentStore,
};
use tutor_evals::EvaluatorRegistry;
use tutor_models::{ModelProvider, OpenAiConfig, OpenAiProvider};
use tutor_server::{AppState, PromptTable, ServerConfig, TutorServer};

/// Default port for the tutor server
pub const DEFAULT_PORT: u16 = 7480;
/// Default host for the tutor server
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Host to bind to
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Path to the local database file (env: TUTOR_DB). Omit for an
    /// in-memory store.
    #[arg(long, env = "TUTOR_DB")]
    pub db: Option<PathBuf>,

    /// Path to a prompt table JSON file (defaults to the embedded table)
    #[arg(long)]
    pub prompts: Option<PathBuf>,

    /// Model used for tutoring replies and the LLM judge
    #[arg(long, default_value = "gpt-4o")]
    pub model: String,

    /// Base URL for an OpenAI-compatible gateway (env: OPENAI_BASE_URL)
    #[arg(long, env = "OPENAI_BASE_URL")]
    pub base_url: Option<String>,
}

/// Run the serve command
pub async fn run(args: ServeArgs) -> Result<()> {
    let api_key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?;
    let mut provider_config = OpenAiConfig::new(api_key);
    if let Some(base_url) = &args.base_url {
        provider_config = provider_config.base_url(base_url);
    }
    let provider: Arc<dyn ModelProvider> = Arc::new(OpenAiProvider::new(provider_config)?);

    let (progress, students, grades) = open_stores(args.db.as_deref()).await?;

    let objectives = Arc::new(ObjectiveRegistry::builtin());
    let evaluators = Arc::new(EvaluatorRegistry::builtin_number_systems(
        &objectives,
        provider.clone(),
        &args.model,
    ));
    let prompts = match &args.prompts {
        Some(path) => PromptTable::from_path(path)
            .with_context(|| format!("reading prompt table {}", path.display()))?,
        None => PromptTable::builtin(),
    };

    let state = Arc::new(AppState::new(
        progress,
        students,
        grades,
        provider,
        evaluators,
        objectives,
        Arc::new(prompts),
        &args.model,
    ));

    let config = ServerConfig::new(args.host.clone(), args.port);
    info!("Starting tutor server on {}", config.addr());

    TutorServer::new(config, state).run().await?;
    Ok(())
}

type Stores = (
    Arc<dyn ProgressStore>,
    Arc<dyn StudentStore>,
    Arc<dyn AssignmentGradeStore>,
);

async fn open_stores(db: Option<&std::path::Path>) -> Result<Stores> {
    match db {
        Some(path) => {
            let store = Arc::new(
                LibsqlStore::new_local(path)
                    .await
                    .with_context(|| format!("opening database {}", path.display()))?,
            );
            info!("Using database at {}", path.display());
            Ok((store.clone(), store.clone(), store))
        }
        None => {
            let store = Arc::new(MemoryStore::new());
            info!("No database configured, progress is kept in memory");
            Ok((store.clone(), store.clone(), store))
        }
    }
}
