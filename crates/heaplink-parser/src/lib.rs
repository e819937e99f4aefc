//! Heaplink Parser — JSON boundary for runtimes, code changes, and settings
//!
//! Schema enforcement happens here, at parse time; the domain types stay
//! plain records. Anything serde rejects surfaces as [`CoreError::Parse`].

use serde::Deserialize;

use heaplink_core::{CodeEvolution, CoreError, ModificationSource, Runtime};

/// Parse a runtime document. The returned [`Runtime`] has its node index
/// built and is ready for O(1) lookups.
pub fn parse_runtime(raw: &str) -> Result<Runtime, CoreError> {
    serde_json::from_str(raw).map_err(|e| CoreError::Parse(format!("runtime document: {e}")))
}

/// Reject runtimes that carry no nodes at all. Empty edge and stack lists
/// are fine; they simply produce empty results downstream.
pub fn require_nonempty(runtime: &Runtime, label: &str) -> Result<(), CoreError> {
    if runtime.is_empty() {
        return Err(CoreError::InvalidRuntime(format!(
            "{label} runtime has no nodes"
        )));
    }
    Ok(())
}

/// Parse the code evolution list.
pub fn parse_code_evolutions(raw: &str) -> Result<Vec<CodeEvolution>, CoreError> {
    serde_json::from_str(raw).map_err(|e| CoreError::Parse(format!("code evolution list: {e}")))
}

/// Split a change list into (baseline, modified) by modification source.
pub fn split_by_source(changes: Vec<CodeEvolution>) -> (Vec<CodeEvolution>, Vec<CodeEvolution>) {
    changes
        .into_iter()
        .partition(|c| c.modification_source == ModificationSource::Base)
}

/// The settings document selecting a strategy and its parameters. Every
/// parameter carries the documented default, so a partial (or absent)
/// document is always usable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub strategy: Option<String>,
    #[serde(default)]
    pub parameters: Parameters,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Parameters {
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub subgraph: SubgraphSettings,
    #[serde(default)]
    pub code_link: CodeLinkSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubgraphSettings {
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_resolution")]
    pub resolution: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CodeLinkSettings {
    #[serde(default = "default_max_distance")]
    pub max_distance: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        MatchingSettings {
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

impl Default for SubgraphSettings {
    fn default() -> Self {
        SubgraphSettings {
            k: default_k(),
            resolution: default_resolution(),
            seed: default_seed(),
        }
    }
}

impl Default for CodeLinkSettings {
    fn default() -> Self {
        CodeLinkSettings {
            max_distance: default_max_distance(),
        }
    }
}

fn default_similarity_threshold() -> f64 {
    0.3
}

fn default_k() -> usize {
    2
}

fn default_resolution() -> f64 {
    1.0
}

fn default_seed() -> u64 {
    1
}

fn default_max_distance() -> usize {
    10
}

/// Parse a settings document.
pub fn parse_settings(raw: &str) -> Result<Settings, CoreError> {
    serde_json::from_str(raw).map_err(|e| CoreError::Parse(format!("settings document: {e}")))
}

impl Settings {
    /// The strategy name to resolve against the catalogue; documents without
    /// one fall through to the unsupported-strategy path.
    pub fn strategy_name(&self) -> &str {
        self.strategy.as_deref().unwrap_or("unknown")
    }
}
