//! Subgraph partitioning strategies
//!
//! All strategies expose the same operation: decompose a runtime into a list
//! of subgraphs. Downstream stages never know which strategy produced them.
//! An empty runtime yields an empty list, never an error.

mod primitive;
mod one_hop;
mod k_hop;
mod community;

pub use community::CommunityPartitioner;
pub use k_hop::KHopPartitioner;
pub use one_hop::OneHopPartitioner;
pub use primitive::PrimitivePartitioner;

use heaplink_core::{Runtime, Subgraph};

/// Common seam for the partitioning stage.
pub trait SubgraphPartitioner {
    fn generate(&self, runtime: &Runtime) -> Vec<Subgraph>;
}
