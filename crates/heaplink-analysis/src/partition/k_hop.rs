//! Greedy K-hop partitioner

use std::collections::{HashMap, HashSet, VecDeque};

use heaplink_core::{Edge, Runtime, Subgraph};

use super::SubgraphPartitioner;

/// Disjoint cover built from greedy BFS clusters of depth `k`.
///
/// Nodes are processed in ascending id order so partitions are reproducible.
/// Every node reached by a BFS is claimed globally the moment it is entered
/// and never seeds its own subgraph, so cluster membership depends on the id
/// iteration order rather than topology alone.
#[derive(Debug, Clone, Copy)]
pub struct KHopPartitioner {
    pub k: usize,
}

impl Default for KHopPartitioner {
    fn default() -> Self {
        KHopPartitioner { k: 2 }
    }
}

impl SubgraphPartitioner for KHopPartitioner {
    fn generate(&self, runtime: &Runtime) -> Vec<Subgraph> {
        // Undirected adjacency over the directed edge list.
        let mut adjacency: HashMap<&str, Vec<&Edge>> = HashMap::new();
        for edge in &runtime.edges {
            adjacency.entry(&edge.from_node_id).or_default().push(edge);
            adjacency.entry(&edge.to_node_id).or_default().push(edge);
        }

        let mut start_order: Vec<&str> = runtime.nodes.iter().map(|n| n.id.as_str()).collect();
        start_order.sort_unstable();

        let mut subgraphs = Vec::new();
        let mut claimed: HashSet<&str> = HashSet::new();

        for start_id in start_order {
            if claimed.contains(start_id) {
                continue;
            }
            claimed.insert(start_id);

            let mut cluster_node_ids: Vec<&str> = vec![start_id];
            let mut cluster_edges: Vec<&Edge> = Vec::new();
            let mut seen_edge_ids: HashSet<&str> = HashSet::new();
            let mut queue: VecDeque<(&str, usize)> = VecDeque::from([(start_id, 0)]);

            while let Some((current, depth)) = queue.pop_front() {
                if depth >= self.k {
                    continue;
                }
                let Some(edges) = adjacency.get(current) else {
                    continue;
                };
                for &edge in edges {
                    let neighbour = if edge.to_node_id == current {
                        edge.from_node_id.as_str()
                    } else {
                        edge.to_node_id.as_str()
                    };

                    // Boundary edges are kept even when the neighbour belongs
                    // to an earlier cluster; deduplicate by edge identity.
                    if seen_edge_ids.insert(&edge.id) {
                        cluster_edges.push(edge);
                    }

                    if claimed.insert(neighbour) {
                        cluster_node_ids.push(neighbour);
                        queue.push_back((neighbour, depth + 1));
                    }
                }
            }

            let nodes = cluster_node_ids
                .iter()
                .filter_map(|id| runtime.node_by_id(id))
                .cloned()
                .collect();

            subgraphs.push(Subgraph {
                center_node_id: start_id.to_string(),
                nodes,
                edges: cluster_edges.into_iter().cloned().collect(),
            });
        }
        subgraphs
    }
}
