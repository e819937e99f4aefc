//! Causal linkage result types

use serde::{Deserialize, Serialize};

use crate::evolution::CodeEvolution;

/// How an attribution was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    /// The node's own allocation trace intersects the code change.
    Direct,
    /// Attribution inherited from a retainer within the hop cap.
    Derived,
}

/// An assertion that a code change explains a heap node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CausalPair {
    pub node_id: String,
    pub code_evolution: CodeEvolution,
    pub confidence: Confidence,
}

/// Output of the code-link stage. Node ids are unique within `regressions`
/// and within `improvements`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeLinkContainer {
    /// Modified-side attributions.
    pub regressions: Vec<CausalPair>,
    /// Baseline-side attributions.
    pub improvements: Vec<CausalPair>,
    pub unmappable_regressions: Vec<String>,
    pub unmappable_improvements: Vec<String>,
}
