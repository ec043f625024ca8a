//! Shared application state for the tutor server

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tutor_core::{
    AssignmentGradeStore, MemoryStore, ObjectiveRegistry, ProgressStore, StudentStore,
};
use tutor_evals::EvaluatorRegistry;
use tutor_models::ModelProvider;

use crate::prompts::PromptTable;

/// Shared application state accessible by all handlers
pub struct AppState {
    /// Progress document store
    pub progress: Arc<dyn ProgressStore>,
    /// Student roster store
    pub students: Arc<dyn StudentStore>,
    /// Assignment grade history
    pub grades: Arc<dyn AssignmentGradeStore>,
    /// Model provider for tutoring replies and the LLM judge
    pub provider: Arc<dyn ModelProvider>,
    /// Per-path evaluation strategies, resolved at startup
    pub evaluators: Arc<EvaluatorRegistry>,
    /// Per-path learning objective sets
    pub objectives: Arc<ObjectiveRegistry>,
    /// Per-path tutoring system prompts
    pub prompts: Arc<PromptTable>,
    /// Model used for tutoring replies
    pub chat_model: String,
    /// When the server started
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create state from explicit components.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        progress: Arc<dyn ProgressStore>,
        students: Arc<dyn StudentStore>,
        grades: Arc<dyn AssignmentGradeStore>,
        provider: Arc<dyn ModelProvider>,
        evaluators: Arc<EvaluatorRegistry>,
        objectives: Arc<ObjectiveRegistry>,
        prompts: Arc<PromptTable>,
        chat_model: impl Into<String>,
    ) -> Self {
        Self {
            progress,
            students,
            grades,
            provider,
            evaluators,
            objectives,
            prompts,
            chat_model: chat_model.into(),
            started_at: Utc::now(),
        }
    }

    /// In-memory state with the built-in number-systems configuration,
    /// for tests and local runs without a database.
    pub fn in_memory(provider: Arc<dyn ModelProvider>, chat_model: impl Into<String>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let objectives = Arc::new(ObjectiveRegistry::builtin());
        let chat_model = chat_model.into();
        let evaluators = Arc::new(EvaluatorRegistry::builtin_number_systems(
            &objectives,
            provider.clone(),
            &chat_model,
        ));

        Self::new(
            store.clone(),
            store.clone(),
            store,
            provider,
            evaluators,
            objectives,
            Arc::new(PromptTable::builtin()),
            chat_model,
        )
    }

    /// Returns how long the server has been running
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
