//! Differentiation result types
//!
//! Every record carries the full node-id lists of both sides so downstream
//! stages and reports never have to re-derive subgraph membership.

use serde::{Deserialize, Serialize};

/// A subgraph pair judged exactly equivalent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub nodes_baseline_id: Vec<String>,
    pub nodes_modified_id: Vec<String>,
}

/// A subgraph pair matched below the similarity-distance threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiedPair {
    pub nodes_baseline_id: Vec<String>,
    pub nodes_modified_id: Vec<String>,
    /// 1 − distance; always in (0, 1].
    pub similarity_score: f64,
}

/// A subgraph present on only one side. Exactly one of the two id lists is
/// populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaRecord {
    pub nodes_baseline_id: Vec<String>,
    pub nodes_modified_id: Vec<String>,
}

/// The classification of every subgraph on both sides.
///
/// Each baseline center appears in exactly one of matched/modified/removed;
/// each modified center in exactly one of matched/modified/added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchingResult {
    pub matched: Vec<MatchedPair>,
    pub modified: Vec<ModifiedPair>,
    pub added_node_ids: Vec<DeltaRecord>,
    pub removed_node_ids: Vec<DeltaRecord>,
}

impl MatchingResult {
    /// Modified-side node ids that need causal attribution: everything added
    /// plus the modified side of every inexact pair, in result order.
    pub fn regression_targets(&self) -> Vec<&str> {
        let mut targets = Vec::new();
        for record in &self.added_node_ids {
            targets.extend(record.nodes_modified_id.iter().map(String::as_str));
        }
        for pair in &self.modified {
            targets.extend(pair.nodes_modified_id.iter().map(String::as_str));
        }
        targets
    }

    /// Baseline-side node ids that need causal attribution: everything
    /// removed plus the baseline side of every inexact pair, in result order.
    pub fn improvement_targets(&self) -> Vec<&str> {
        let mut targets = Vec::new();
        for record in &self.removed_node_ids {
            targets.extend(record.nodes_baseline_id.iter().map(String::as_str));
        }
        for pair in &self.modified {
            targets.extend(pair.nodes_baseline_id.iter().map(String::as_str));
        }
        targets
    }
}
