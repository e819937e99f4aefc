//! Pipeline orchestration: partition → differentiate → link, with timing

use chrono::{DateTime, Utc};
use serde::Serialize;

use heaplink_core::{CodeEvolution, CodeLinkContainer, CoreError, MatchingResult, Runtime};

use crate::code_link::{CodeLinkAlgorithm, CodeLinkParams, DeterministicLinker};
use crate::matching::{HeuristicMatcher, MatchingAlgorithm, MatchingParams};
use crate::partition::{
    CommunityPartitioner, KHopPartitioner, OneHopPartitioner, PrimitivePartitioner,
    SubgraphPartitioner,
};

/// The strategy catalogue. Every entry pairs the heuristic matcher and the
/// deterministic linker with one of the partitioners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Greedy K-hop partitioning.
    HeuristicGreedy,
    /// Louvain community partitioning.
    CommunityDetection,
    /// Singleton partitioning.
    Primitive,
    /// One-hop neighbourhood partitioning (overlapping).
    OneHop,
}

impl Strategy {
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "heuristic-greedy" => Ok(Strategy::HeuristicGreedy),
            "community-detection" => Ok(Strategy::CommunityDetection),
            "primitive" => Ok(Strategy::Primitive),
            "one-hop" => Ok(Strategy::OneHop),
            other => Err(CoreError::UnsupportedStrategy(other.to_string())),
        }
    }
}

/// Partitioner parameters; each strategy reads only the fields it needs.
#[derive(Debug, Clone, Copy)]
pub struct PartitionParams {
    pub k: usize,
    pub resolution: f64,
    pub seed: u64,
}

impl Default for PartitionParams {
    fn default() -> Self {
        PartitionParams {
            k: 2,
            resolution: 1.0,
            seed: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AnalysisParams {
    pub partition: PartitionParams,
    pub matching: MatchingParams,
    pub code_link: CodeLinkParams,
}

/// Wall-clock stamps around each pipeline stage.
#[derive(Debug, Clone, Serialize)]
pub struct TimeTracking {
    pub subgraph_generation_start: DateTime<Utc>,
    pub subgraph_generation_end: DateTime<Utc>,
    pub differentiation_start: DateTime<Utc>,
    pub differentiation_end: DateTime<Utc>,
    pub code_link_start: DateTime<Utc>,
    pub code_link_end: DateTime<Utc>,
}

/// Sequences the three stages. The partitioner is constructed eagerly from
/// its parameters; matcher and linker are constructed lazily inside [`run`]
/// with their parameters plus the actual data.
///
/// [`run`]: AnalysisPipeline::run
pub struct AnalysisPipeline {
    partitioner: Box<dyn SubgraphPartitioner>,
    matching: MatchingParams,
    code_link: CodeLinkParams,
}

impl AnalysisPipeline {
    pub fn new(strategy: Strategy, params: AnalysisParams) -> Self {
        let partitioner: Box<dyn SubgraphPartitioner> = match strategy {
            Strategy::HeuristicGreedy => Box::new(KHopPartitioner {
                k: params.partition.k,
            }),
            Strategy::CommunityDetection => Box::new(CommunityPartitioner {
                resolution: params.partition.resolution,
                seed: params.partition.seed,
            }),
            Strategy::Primitive => Box::new(PrimitivePartitioner),
            Strategy::OneHop => Box::new(OneHopPartitioner),
        };
        AnalysisPipeline {
            partitioner,
            matching: params.matching,
            code_link: params.code_link,
        }
    }

    pub fn run(
        &self,
        baseline: &Runtime,
        changes_baseline: &[CodeEvolution],
        modified: &Runtime,
        changes_modified: &[CodeEvolution],
    ) -> (MatchingResult, CodeLinkContainer, TimeTracking) {
        let subgraph_generation_start = Utc::now();
        let subgraphs_baseline = self.partitioner.generate(baseline);
        tracing::info!(
            count = subgraphs_baseline.len(),
            "generated baseline subgraphs"
        );
        let subgraphs_modified = self.partitioner.generate(modified);
        tracing::info!(
            count = subgraphs_modified.len(),
            "generated modified subgraphs"
        );
        let subgraph_generation_end = Utc::now();

        let differentiation_start = Utc::now();
        let matcher =
            HeuristicMatcher::new(&subgraphs_baseline, &subgraphs_modified, self.matching);
        let matching = matcher.differentiate();
        tracing::info!(
            matched = matching.matched.len(),
            modified = matching.modified.len(),
            added = matching.added_node_ids.len(),
            removed = matching.removed_node_ids.len(),
            "differentiation finished"
        );
        let differentiation_end = Utc::now();

        // The partitions are no longer needed once matching has consumed them.
        drop(subgraphs_baseline);
        drop(subgraphs_modified);

        let code_link_start = Utc::now();
        let mut linker = DeterministicLinker::new(
            &matching,
            baseline,
            changes_baseline,
            modified,
            changes_modified,
            self.code_link,
        );
        let links = linker.link();
        tracing::info!(
            regressions = links.regressions.len(),
            improvements = links.improvements.len(),
            unmappable_regressions = links.unmappable_regressions.len(),
            unmappable_improvements = links.unmappable_improvements.len(),
            "code linkage finished"
        );
        let code_link_end = Utc::now();

        (
            matching,
            links,
            TimeTracking {
                subgraph_generation_start,
                subgraph_generation_end,
                differentiation_start,
                differentiation_end,
                code_link_start,
                code_link_end,
            },
        )
    }
}
