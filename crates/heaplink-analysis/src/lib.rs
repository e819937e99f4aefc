//! Heaplink Analysis — subgraph partitioning, differentiation, and code linkage
//!
//! The three pipeline stages live here, each behind its own seam:
//! [`partition::SubgraphPartitioner`], [`matching::MatchingAlgorithm`], and
//! [`code_link::CodeLinkAlgorithm`]. [`pipeline::AnalysisPipeline`] sequences
//! them and records stage timing.

pub mod partition;
pub mod matching;
pub mod code_link;
pub mod pipeline;


pub use partition::{
    CommunityPartitioner, KHopPartitioner, OneHopPartitioner, PrimitivePartitioner,
    SubgraphPartitioner,
};
pub use matching::{HeuristicMatcher, MatchingAlgorithm, MatchingParams};
pub use code_link::{CodeLinkAlgorithm, CodeLinkParams, DeterministicLinker};
pub use pipeline::{AnalysisParams, AnalysisPipeline, PartitionParams, Strategy, TimeTracking};
