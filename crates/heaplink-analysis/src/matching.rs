//! Three-phase heuristic graph differentiation
//!
//! Phase 1 pairs structurally equivalent subgraphs, phase 2 pairs the
//! remainder below a distance threshold, phase 3 classifies what is left as
//! added or removed.

use std::collections::{HashMap, HashSet, VecDeque};

use heaplink_core::{MatchedPair, MatchingResult, ModifiedPair, DeltaRecord, Node, Subgraph};

/// Common seam for the differentiation stage.
pub trait MatchingAlgorithm {
    fn differentiate(&self) -> MatchingResult;
}

/// Tuning knobs for [`HeuristicMatcher`]. The weights sum to 1.0 and weigh a
/// center-type mismatch most heavily.
#[derive(Debug, Clone, Copy)]
pub struct MatchingParams {
    pub similarity_threshold: f64,
    pub weight_type: f64,
    pub weight_value: f64,
    pub weight_topology: f64,
}

impl Default for MatchingParams {
    fn default() -> Self {
        MatchingParams {
            similarity_threshold: 0.3,
            weight_type: 0.5,
            weight_value: 0.35,
            weight_topology: 0.10,
        }
    }
}

/// Deterministic rendering of the identity-relevant node attributes.
fn signature(node: &Node) -> String {
    format!(
        "{}:{}:{}",
        node.node_type,
        node.value.as_deref().unwrap_or(""),
        node.root
    )
}

/// Bucket key for exact matching: two subgraphs are structurally equivalent
/// iff their keys are equal (node ids and edge attributes are ignored).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ExactKey {
    node_count: usize,
    edge_count: usize,
    signatures: Vec<String>,
}

impl ExactKey {
    fn of(subgraph: &Subgraph) -> Self {
        let mut signatures: Vec<String> = subgraph.nodes.iter().map(signature).collect();
        signatures.sort_unstable();
        ExactKey {
            node_count: subgraph.nodes.len(),
            edge_count: subgraph.edges.len(),
            signatures,
        }
    }
}

pub struct HeuristicMatcher<'a> {
    subgraphs_baseline: &'a [Subgraph],
    subgraphs_modified: &'a [Subgraph],
    params: MatchingParams,
}

impl<'a> HeuristicMatcher<'a> {
    pub fn new(
        subgraphs_baseline: &'a [Subgraph],
        subgraphs_modified: &'a [Subgraph],
        params: MatchingParams,
    ) -> Self {
        HeuristicMatcher {
            subgraphs_baseline,
            subgraphs_modified,
            params,
        }
    }

    /// Weighted distance between two subgraphs in [0, 1]: 0 identical. The
    /// type/value components compare the center nodes; the topology
    /// component is the Jaccard distance of the node-type sets.
    fn distance(&self, a: &Subgraph, b: &Subgraph, center_a: &Node, center_b: &Node) -> f64 {
        let dist_type = if center_a.node_type != center_b.node_type {
            1.0
        } else {
            0.0
        };
        let dist_value = if center_a.value != center_b.value {
            1.0
        } else {
            0.0
        };

        let types_a: HashSet<&str> = a.nodes.iter().map(|n| n.node_type.as_str()).collect();
        let types_b: HashSet<&str> = b.nodes.iter().map(|n| n.node_type.as_str()).collect();
        let intersection = types_a.intersection(&types_b).count();
        let union = types_a.union(&types_b).count();
        let dist_topology = if union > 0 {
            1.0 - intersection as f64 / union as f64
        } else {
            1.0
        };

        dist_type * self.params.weight_type
            + dist_value * self.params.weight_value
            + dist_topology * self.params.weight_topology
    }
}

impl MatchingAlgorithm for HeuristicMatcher<'_> {
    fn differentiate(&self) -> MatchingResult {
        let mut claimed_baseline: HashSet<&str> = HashSet::new();
        let mut claimed_modified: HashSet<&str> = HashSet::new();
        let mut result = MatchingResult::default();

        // Phase 1 — exact matching. Baseline subgraphs are bucketed under
        // their structural key with FIFO order inside each bucket, so every
        // modified subgraph claims the first equivalent unclaimed baseline
        // subgraph in list order.
        let mut buckets: HashMap<ExactKey, VecDeque<usize>> = HashMap::new();
        for (index, subgraph) in self.subgraphs_baseline.iter().enumerate() {
            buckets.entry(ExactKey::of(subgraph)).or_default().push_back(index);
        }

        for mod_sg in self.subgraphs_modified {
            let key = ExactKey::of(mod_sg);
            let Some(bucket) = buckets.get_mut(&key) else {
                continue;
            };
            let Some(base_index) = bucket.pop_front() else {
                continue;
            };
            let base_sg = &self.subgraphs_baseline[base_index];

            claimed_baseline.insert(&base_sg.center_node_id);
            claimed_modified.insert(&mod_sg.center_node_id);
            result.matched.push(MatchedPair {
                nodes_baseline_id: base_sg.node_ids(),
                nodes_modified_id: mod_sg.node_ids(),
            });
        }

        // Phase 2 — inexact matching over the unclaimed remainder.
        let unmatched_modified: Vec<&Subgraph> = self
            .subgraphs_modified
            .iter()
            .filter(|sg| !claimed_modified.contains(sg.center_node_id.as_str()))
            .collect();
        let unmatched_baseline: Vec<&Subgraph> = self
            .subgraphs_baseline
            .iter()
            .filter(|sg| !claimed_baseline.contains(sg.center_node_id.as_str()))
            .collect();

        struct Candidate<'s> {
            dist: f64,
            mod_sg: &'s Subgraph,
            base_sg: &'s Subgraph,
        }

        let mut candidates: Vec<Candidate<'_>> = Vec::new();
        for &mod_sg in &unmatched_modified {
            // A center missing from its own node list is skipped best-effort.
            let Some(mod_center) = mod_sg.center() else {
                continue;
            };
            for &base_sg in &unmatched_baseline {
                let Some(base_center) = base_sg.center() else {
                    continue;
                };
                let dist = self.distance(mod_sg, base_sg, mod_center, base_center);
                if dist < self.params.similarity_threshold {
                    candidates.push(Candidate {
                        dist,
                        mod_sg,
                        base_sg,
                    });
                }
            }
        }

        // Stable sort: ties keep candidate generation order.
        candidates.sort_by(|a, b| a.dist.total_cmp(&b.dist));

        for candidate in candidates {
            if claimed_modified.contains(candidate.mod_sg.center_node_id.as_str())
                || claimed_baseline.contains(candidate.base_sg.center_node_id.as_str())
            {
                continue;
            }
            claimed_modified.insert(&candidate.mod_sg.center_node_id);
            claimed_baseline.insert(&candidate.base_sg.center_node_id);
            result.modified.push(ModifiedPair {
                nodes_baseline_id: candidate.base_sg.node_ids(),
                nodes_modified_id: candidate.mod_sg.node_ids(),
                similarity_score: 1.0 - candidate.dist,
            });
        }

        // Phase 3 — residual classification.
        for mod_sg in self.subgraphs_modified {
            if !claimed_modified.contains(mod_sg.center_node_id.as_str()) {
                result.added_node_ids.push(DeltaRecord {
                    nodes_baseline_id: vec![],
                    nodes_modified_id: mod_sg.node_ids(),
                });
            }
        }
        for base_sg in self.subgraphs_baseline {
            if !claimed_baseline.contains(base_sg.center_node_id.as_str()) {
                result.removed_node_ids.push(DeltaRecord {
                    nodes_baseline_id: base_sg.node_ids(),
                    nodes_modified_id: vec![],
                });
            }
        }

        result
    }
}
