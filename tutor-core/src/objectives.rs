//! Static registry of learning objectives.
//!
//! Objective sets are configuration resolved once at startup and looked up
//! by an explicit, caller-supplied path. They are never loaded from
//! request-built file paths and never inferred from message content.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Explicit (topic, subtopic, nested subtopic) coordinates supplied by the
/// client on every request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TopicPath {
    pub topic_id: String,
    pub subtopic_id: String,
    pub nested_subtopic_id: String,
}

impl TopicPath {
    pub fn new(
        topic_id: impl Into<String>,
        subtopic_id: impl Into<String>,
        nested_subtopic_id: impl Into<String>,
    ) -> Self {
        Self {
            topic_id: topic_id.into(),
            subtopic_id: subtopic_id.into(),
            nested_subtopic_id: nested_subtopic_id.into(),
        }
    }
}

impl std::fmt::Display for TopicPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.topic_id, self.subtopic_id, self.nested_subtopic_id
        )
    }
}

/// One entry of an objective-set configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveSetEntry {
    #[serde(flatten)]
    pub path: TopicPath,
    pub objectives: Vec<String>,
}

/// Lookup table from [`TopicPath`] to the ordered objective descriptions
/// for that nested subtopic.
#[derive(Debug, Clone, Default)]
pub struct ObjectiveRegistry {
    sets: HashMap<TopicPath, Vec<String>>,
}

impl ObjectiveRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the objective set for a path, replacing any previous set.
    pub fn register(&mut self, path: TopicPath, objectives: Vec<String>) {
        self.sets.insert(path, objectives);
    }

    /// Ordered objective descriptions for a path, if configured.
    #[must_use]
    pub fn lookup(&self, path: &TopicPath) -> Option<&[String]> {
        self.sets.get(path).map(Vec::as_slice)
    }

    /// Number of objectives configured for a path (0 when absent).
    #[must_use]
    pub fn objective_count(&self, path: &TopicPath) -> usize {
        self.lookup(path).map_or(0, <[String]>::len)
    }

    /// Build a registry from configuration entries (e.g. a JSON file).
    #[must_use]
    pub fn from_entries(entries: Vec<ObjectiveSetEntry>) -> Self {
        let mut registry = Self::new();
        for entry in entries {
            registry.register(entry.path, entry.objectives);
        }
        registry
    }

    /// The built-in digital-electronics number-systems objective sets.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for (nested, objectives) in NUMBER_SYSTEMS_SETS {
            registry.register(
                TopicPath::new("digital_electronics", "number_systems", *nested),
                objectives.iter().map(|s| (*s).to_string()).collect(),
            );
        }
        registry
    }
}

const NUMBER_SYSTEMS_SETS: &[(&str, &[&str])] = &[
    (
        "binary",
        &[
            "Understand that binary is a base-2 number system using only 0 and 1.",
            "Convert decimal numbers to 4-bit and 8-bit binary values.",
            "Convert binary numbers back to decimal form.",
            "Explain the significance of the least significant bit (LSB) and most significant bit (MSB).",
            "Identify how 4-bit binary forms a nibble and 8-bit binary forms a byte.",
            "Use binary place values (1, 2, 4, 8...) to compute decimal equivalents.",
        ],
    ),
    (
        "octal",
        &[
            "Understand that octal is a base-8 number system using digits 0 to 7.",
            "Convert decimal numbers to octal values.",
            "Convert octal numbers back to decimal form.",
            "Explain the relationship between octal and binary.",
            "Use place values in octal to compute decimal equivalents.",
            "Apply octal conversions in computing contexts.",
        ],
    ),
    (
        "hex",
        &[
            "Explain what hexadecimal is and how it relates to binary.",
            "Convert binary to hexadecimal.",
            "Convert hexadecimal to binary.",
            "Explain common uses of hex in computing (e.g. memory addresses).",
            "Identify a single hex digit represents 4 binary bits.",
            "Convert hex to decimal and vice versa.",
        ],
    ),
    (
        "bcd",
        &[
            "Understand Binary Coded Decimal (BCD) representation.",
            "Convert decimal numbers to BCD format.",
            "Convert BCD numbers back to decimal form.",
            "Explain how BCD differs from pure binary representation.",
            "Use BCD in digital systems and applications.",
            "Identify advantages and limitations of BCD.",
        ],
    ),
    (
        "gray_code",
        &[
            "Understand the concept of Gray Code and its properties.",
            "Convert binary numbers to Gray Code.",
            "Convert Gray Code back to binary numbers.",
            "Explain uses of Gray Code in error correction and digital communication.",
            "Identify the relationship between successive Gray Code values.",
            "Apply Gray Code in practical digital systems.",
        ],
    ),
];
