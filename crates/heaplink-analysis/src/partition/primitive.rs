//! Singleton partitioner

use heaplink_core::{Runtime, Subgraph};

use super::SubgraphPartitioner;

/// Every node becomes its own subgraph with no edges. O(N).
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitivePartitioner;

impl SubgraphPartitioner for PrimitivePartitioner {
    fn generate(&self, runtime: &Runtime) -> Vec<Subgraph> {
        runtime
            .nodes
            .iter()
            .map(|node| Subgraph {
                center_node_id: node.id.clone(),
                nodes: vec![node.clone()],
                edges: vec![],
            })
            .collect()
    }
}
