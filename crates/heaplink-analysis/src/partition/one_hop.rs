//! One-hop neighbourhood partitioner

use std::collections::HashMap;

use heaplink_core::{Edge, Runtime, Subgraph};

use super::SubgraphPartitioner;

/// Per node: the node itself, every incident edge (either direction), and
/// all endpoint nodes of those edges.
///
/// The only strategy whose subgraphs may share nodes; downstream code that
/// requires one attribution per node deduplicates its targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneHopPartitioner;

impl SubgraphPartitioner for OneHopPartitioner {
    fn generate(&self, runtime: &Runtime) -> Vec<Subgraph> {
        let mut incident: HashMap<&str, Vec<&Edge>> = HashMap::new();
        for edge in &runtime.edges {
            incident.entry(&edge.from_node_id).or_default().push(edge);
            incident.entry(&edge.to_node_id).or_default().push(edge);
        }

        let mut subgraphs = Vec::with_capacity(runtime.nodes.len());
        for node in &runtime.nodes {
            let connected = incident.get(node.id.as_str()).map_or(&[][..], Vec::as_slice);

            // Neighbour ids in discovery order, the node itself first.
            let mut neighbour_ids: Vec<&str> = vec![&node.id];
            for edge in connected {
                for endpoint in [edge.from_node_id.as_str(), edge.to_node_id.as_str()] {
                    if !neighbour_ids.contains(&endpoint) {
                        neighbour_ids.push(endpoint);
                    }
                }
            }

            let nodes = neighbour_ids
                .iter()
                .filter_map(|id| runtime.node_by_id(id))
                .cloned()
                .collect();

            subgraphs.push(Subgraph {
                center_node_id: node.id.clone(),
                nodes,
                edges: connected.iter().map(|&e| e.clone()).collect(),
            });
        }
        subgraphs
    }
}
