//! Deterministic causal linkage between heap nodes and code changes
//!
//! Two phases per side: direct linkage walks each target's allocation trace
//! looking for a frame that intersects a code change; derived linkage walks
//! the retainer graph (reverse edges) up to a hop cap, inheriting the first
//! attribution it meets.

use std::collections::{HashMap, HashSet, VecDeque};

use heaplink_core::{
    CausalPair, CodeEvolution, CodeLinkContainer, Confidence, MatchingResult, ModificationSource,
    Node, Runtime, Stack,
};

/// Common seam for the linkage stage.
pub trait CodeLinkAlgorithm {
    fn link(&mut self) -> CodeLinkContainer;
}

#[derive(Debug, Clone, Copy)]
pub struct CodeLinkParams {
    /// Hop cap for the retainer search.
    pub max_distance: usize,
}

impl Default for CodeLinkParams {
    fn default() -> Self {
        CodeLinkParams { max_distance: 10 }
    }
}

/// Per-side state: lookup maps, the reverse-edge index, the file-grouped
/// change context, and the two memo caches that keep a multi-million-node
/// run tractable. Regressions and improvements each get their own context,
/// so every cache is keyed per (context, id) by construction.
struct SideContext<'a> {
    node_map: HashMap<&'a str, &'a Node>,
    stack_map: HashMap<&'a str, &'a Stack>,
    reverse_edges: HashMap<&'a str, Vec<&'a str>>,
    /// Context changes grouped by file id in first-appearance order.
    grouped_changes: Vec<(&'a str, Vec<&'a CodeEvolution>)>,
    frame_cache: HashMap<&'a str, Option<&'a CodeEvolution>>,
    trace_cache: HashMap<&'a str, Option<&'a CodeEvolution>>,
    max_distance: usize,
}

impl<'a> SideContext<'a> {
    fn new(
        runtime: &'a Runtime,
        changes: &'a [CodeEvolution],
        source: ModificationSource,
        max_distance: usize,
    ) -> Self {
        let node_map = runtime.nodes.iter().map(|n| (n.id.as_str(), n)).collect();
        let stack_map = runtime.stacks.iter().map(|s| (s.id.as_str(), s)).collect();

        let mut reverse_edges: HashMap<&'a str, Vec<&'a str>> = HashMap::new();
        for edge in &runtime.edges {
            reverse_edges
                .entry(edge.to_node_id.as_str())
                .or_default()
                .push(edge.from_node_id.as_str());
        }

        let context: Vec<&'a CodeEvolution> = changes
            .iter()
            .filter(|c| c.modification_source == source)
            .collect();

        SideContext {
            node_map,
            stack_map,
            reverse_edges,
            grouped_changes: group_by_file(&context),
            frame_cache: HashMap::new(),
            trace_cache: HashMap::new(),
            max_distance,
        }
    }

    /// Run both phases over `targets` and return the attributions plus the
    /// node ids that stayed unmappable.
    fn attribute(&mut self, side: &str, targets: &[&'a str]) -> (Vec<CausalPair>, Vec<String>) {
        let mut pairs: Vec<CausalPair> = Vec::new();
        let mut link_map: HashMap<&'a str, &'a CodeEvolution> = HashMap::new();
        let mut unmapped: Vec<&'a str> = Vec::new();

        tracing::debug!(side, targets = targets.len(), "starting direct linkage");
        for (index, &node_id) in targets.iter().enumerate() {
            if index % 500 == 0 && !targets.is_empty() {
                tracing::debug!(
                    side,
                    "direct linkage {:.2}% done",
                    index as f64 / targets.len() as f64 * 100.0
                );
            }
            // Dangling target ids are skipped silently.
            let Some(&node) = self.node_map.get(node_id) else {
                continue;
            };
            match self.sl_verify(Some(node)) {
                Some(change) => {
                    link_map.insert(node_id, change);
                    pairs.push(CausalPair {
                        node_id: node_id.to_string(),
                        code_evolution: change.clone(),
                        confidence: Confidence::Direct,
                    });
                }
                None => unmapped.push(node_id),
            }
        }

        tracing::debug!(side, unmapped = unmapped.len(), "starting derived linkage");
        let mut unmappable: Vec<String> = Vec::new();
        for (index, &node_id) in unmapped.iter().enumerate() {
            if index % 500 == 0 && !unmapped.is_empty() {
                tracing::debug!(
                    side,
                    "derived linkage {:.2}% done",
                    index as f64 / unmapped.len() as f64 * 100.0
                );
            }
            match self.find_causal_retainer(node_id, &mut link_map) {
                Some(change) => {
                    link_map.insert(node_id, change);
                    pairs.push(CausalPair {
                        node_id: node_id.to_string(),
                        code_evolution: change.clone(),
                        confidence: Confidence::Derived,
                    });
                }
                None => unmappable.push(node_id.to_string()),
            }
        }

        (pairs, unmappable)
    }

    /// Direct verification: walk the allocation trace rooted at the node's
    /// trace frame through parent frames, returning the first code change any
    /// visited frame intersects. Results are memoised per trace id.
    fn sl_verify(&mut self, node: Option<&'a Node>) -> Option<&'a CodeEvolution> {
        let trace_id = node?.trace_id.as_deref()?;
        if let Some(cached) = self.trace_cache.get(trace_id).copied() {
            return cached;
        }

        let mut queue: VecDeque<&'a str> = VecDeque::from([trace_id]);
        let mut visited: HashSet<&'a str> = HashSet::from([trace_id]);
        let mut result = None;

        while let Some(frame_id) = queue.pop_front() {
            if let Some(change) = self.frame_match(frame_id) {
                result = Some(change);
                break;
            }
            // A missing frame terminates this branch without error.
            let Some(frame) = self.stack_map.get(frame_id).copied() else {
                continue;
            };
            for parent in &frame.frame_ids {
                let parent = parent.as_str();
                if self.stack_map.contains_key(parent) && visited.insert(parent) {
                    queue.push_back(parent);
                }
            }
        }

        self.trace_cache.insert(trace_id, result);
        result
    }

    /// Does a single frame intersect any change in the context? File match is
    /// substring containment of the change's file id in the frame's script
    /// name, so unrelated files sharing a path fragment can collide; line
    /// match is inclusive span containment. Memoised per frame id.
    fn frame_match(&mut self, frame_id: &'a str) -> Option<&'a CodeEvolution> {
        if let Some(cached) = self.frame_cache.get(frame_id).copied() {
            return cached;
        }

        let mut found: Option<&'a CodeEvolution> = None;
        if let Some(frame) = self.stack_map.get(frame_id).copied() {
            'files: for (file_id, changes) in &self.grouped_changes {
                if !frame.script_name.contains(file_id) {
                    continue;
                }
                for &change in changes {
                    let span = &change.code_change_span;
                    if span.line_start <= frame.line_number && frame.line_number <= span.line_end {
                        found = Some(change);
                        break 'files;
                    }
                }
            }
        }

        self.frame_cache.insert(frame_id, found);
        found
    }

    /// Derived linkage: BFS through the retainer graph up to the hop cap.
    /// `link_map` threads the attributions accumulated so far; a retainer
    /// already present there is inherited, otherwise it is verified directly
    /// and inserted on success.
    fn find_causal_retainer(
        &mut self,
        node_id: &'a str,
        link_map: &mut HashMap<&'a str, &'a CodeEvolution>,
    ) -> Option<&'a CodeEvolution> {
        let mut queue: VecDeque<(&'a str, usize)> = VecDeque::from([(node_id, 0)]);
        let mut visited: HashSet<&'a str> = HashSet::from([node_id]);

        while let Some((current, distance)) = queue.pop_front() {
            if let Some(&change) = link_map.get(current) {
                return Some(change);
            }
            let node = self.node_map.get(current).copied();
            if let Some(change) = self.sl_verify(node) {
                link_map.insert(current, change);
                return Some(change);
            }
            if distance >= self.max_distance {
                continue;
            }
            let Some(retainers) = self.reverse_edges.get(current) else {
                continue;
            };
            for &retainer in retainers {
                if visited.insert(retainer) {
                    queue.push_back((retainer, distance + 1));
                }
            }
        }
        None
    }
}

/// Group context changes by file id, preserving first-appearance order for
/// both files and changes within a file.
fn group_by_file<'a>(changes: &[&'a CodeEvolution]) -> Vec<(&'a str, Vec<&'a CodeEvolution>)> {
    let mut order: Vec<&'a str> = Vec::new();
    let mut by_file: HashMap<&'a str, Vec<&'a CodeEvolution>> = HashMap::new();
    for &change in changes {
        let file = change.file_id.as_str();
        if !by_file.contains_key(file) {
            order.push(file);
        }
        by_file.entry(file).or_default().push(change);
    }
    order
        .into_iter()
        .map(|file| {
            let grouped = by_file.remove(file).unwrap_or_default();
            (file, grouped)
        })
        .collect()
}

pub struct DeterministicLinker<'a> {
    matching: &'a MatchingResult,
    regression: SideContext<'a>,
    improvement: SideContext<'a>,
}

impl<'a> DeterministicLinker<'a> {
    pub fn new(
        matching: &'a MatchingResult,
        baseline: &'a Runtime,
        changes_baseline: &'a [CodeEvolution],
        modified: &'a Runtime,
        changes_modified: &'a [CodeEvolution],
        params: CodeLinkParams,
    ) -> Self {
        DeterministicLinker {
            matching,
            regression: SideContext::new(
                modified,
                changes_modified,
                ModificationSource::Modified,
                params.max_distance,
            ),
            improvement: SideContext::new(
                baseline,
                changes_baseline,
                ModificationSource::Base,
                params.max_distance,
            ),
        }
    }
}

impl CodeLinkAlgorithm for DeterministicLinker<'_> {
    fn link(&mut self) -> CodeLinkContainer {
        // Overlapping partitions can list a node twice; first occurrence
        // wins so each side attributes every node at most once.
        let regression_targets = dedup_preserving_order(self.matching.regression_targets());
        let improvement_targets = dedup_preserving_order(self.matching.improvement_targets());

        let (regressions, unmappable_regressions) =
            self.regression.attribute("regression", &regression_targets);
        let (improvements, unmappable_improvements) =
            self.improvement.attribute("improvement", &improvement_targets);

        CodeLinkContainer {
            regressions,
            improvements,
            unmappable_regressions,
            unmappable_improvements,
        }
    }
}

fn dedup_preserving_order(ids: Vec<&str>) -> Vec<&str> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|&id| seen.insert(id)).collect()
}
