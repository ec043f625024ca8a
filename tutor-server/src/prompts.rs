//! Tutoring system prompts, keyed by topic path.
//!
//! Prompts are configuration resolved at startup, either from the embedded
//! table or from a JSON file supplied on the command line. Lookup falls
//! back to a generic tutoring prompt so an unconfigured path still chats.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tutor_core::TopicPath;

const BUILTIN_PROMPTS: &str = include_str!("../data/prompts.json");

const FALLBACK_PROMPT: &str = "You are a patient tutor for an electronics course. \
     Teach the student the topic they ask about, check their understanding \
     with short questions, and keep explanations concrete.";

/// One entry of a prompt configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptEntry {
    #[serde(flatten)]
    pub path: TopicPath,
    pub prompt: String,
}

/// Lookup table from topic path to the tutoring system prompt.
#[derive(Debug, Clone, Default)]
pub struct PromptTable {
    prompts: HashMap<TopicPath, String>,
}

impl PromptTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, path: TopicPath, prompt: impl Into<String>) {
        self.prompts.insert(path, prompt.into());
    }

    /// The system prompt for a path, falling back to the generic tutor
    /// prompt when the path is unconfigured.
    #[must_use]
    pub fn system_prompt(&self, path: &TopicPath) -> &str {
        self.prompts
            .get(path)
            .map_or(FALLBACK_PROMPT, String::as_str)
    }

    #[must_use]
    pub fn from_entries(entries: Vec<PromptEntry>) -> Self {
        let mut table = Self::new();
        for entry in entries {
            table.register(entry.path, entry.prompt);
        }
        table
    }

    /// The embedded prompt table.
    ///
    /// The embedded JSON is validated by a test, so a parse failure can
    /// only come from a bad build.
    #[must_use]
    pub fn builtin() -> Self {
        let entries: Vec<PromptEntry> =
            serde_json::from_str(BUILTIN_PROMPTS).unwrap_or_default();
        Self::from_entries(entries)
    }

    /// Load a prompt table from a JSON file.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let entries: Vec<PromptEntry> = serde_json::from_str(&raw)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(Self::from_entries(entries))
    }
}
