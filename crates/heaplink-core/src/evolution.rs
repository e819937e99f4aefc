//! Code change records supplied alongside the two captures

use serde::{Deserialize, Serialize};

/// The kind of edit a change record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModificationType {
    Insert,
    Delete,
    Modify,
}

/// Which capture a change record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModificationSource {
    Base,
    Modified,
}

/// Line/column span of a change within its file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeChangeSpan {
    pub line_start: u32,
    pub line_end: u32,
    pub column_start: u32,
    pub column_end: u32,
}

/// A single code change between the baseline and modified versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeEvolution {
    pub file_id: String,
    pub modification_type: ModificationType,
    pub modification_source: ModificationSource,
    pub code_change_span: CodeChangeSpan,
}

impl std::fmt::Display for ModificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModificationType::Insert => write!(f, "insert"),
            ModificationType::Delete => write!(f, "delete"),
            ModificationType::Modify => write!(f, "modify"),
        }
    }
}

impl std::fmt::Display for ModificationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModificationSource::Base => write!(f, "base"),
            ModificationSource::Modified => write!(f, "modified"),
        }
    }
}
