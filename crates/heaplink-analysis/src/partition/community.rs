//! Louvain community partitioner

use std::collections::{HashMap, HashSet};

use heaplink_core::{Edge, Runtime, Subgraph};
use petgraph::graph::{NodeIndex, UnGraph};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::SubgraphPartitioner;

/// Disjoint cover from modularity-based clustering.
///
/// The directed heap graph is projected onto an undirected simple graph
/// (multi-edges collapse, self-references drop), then partitioned with a
/// single-level Louvain sweep. `resolution` > 1 favours smaller communities,
/// < 1 larger ones. The `seed` shuffles the local-move sweep order once, so
/// identical seeds produce identical partitions.
///
/// Community edges are mapped back to the original directed edges through a
/// canonical unordered-pair key; the first directed edge seen for a pair
/// wins. The center is the member of maximum induced degree, ties resolved
/// by first position in member iteration order (runtime node order).
#[derive(Debug, Clone, Copy)]
pub struct CommunityPartitioner {
    pub resolution: f64,
    pub seed: u64,
}

impl Default for CommunityPartitioner {
    fn default() -> Self {
        CommunityPartitioner {
            resolution: 1.0,
            seed: 1,
        }
    }
}

impl SubgraphPartitioner for CommunityPartitioner {
    fn generate(&self, runtime: &Runtime) -> Vec<Subgraph> {
        if runtime.nodes.is_empty() {
            return Vec::new();
        }

        // Undirected simple projection. Node weights index into runtime.nodes.
        let mut graph: UnGraph<usize, ()> = UnGraph::new_undirected();
        let mut index_of: HashMap<&str, NodeIndex> = HashMap::new();
        for (position, node) in runtime.nodes.iter().enumerate() {
            index_of.insert(&node.id, graph.add_node(position));
        }

        let mut edge_lookup: HashMap<(NodeIndex, NodeIndex), &Edge> = HashMap::new();
        for edge in &runtime.edges {
            let (Some(&a), Some(&b)) = (
                index_of.get(edge.from_node_id.as_str()),
                index_of.get(edge.to_node_id.as_str()),
            ) else {
                continue;
            };
            if a == b {
                continue;
            }
            let key = if a < b { (a, b) } else { (b, a) };
            if !edge_lookup.contains_key(&key) {
                edge_lookup.insert(key, edge);
                graph.add_edge(a, b, ());
            }
        }

        let adjacency: Vec<Vec<usize>> = graph
            .node_indices()
            .map(|idx| graph.neighbors(idx).map(|n| n.index()).collect())
            .collect();
        let assignment = louvain(&adjacency, self.resolution, self.seed);

        let community_count = assignment.iter().copied().max().map_or(0, |m| m + 1);
        let mut communities: Vec<Vec<NodeIndex>> = vec![Vec::new(); community_count as usize];
        for idx in graph.node_indices() {
            communities[assignment[idx.index()] as usize].push(idx);
        }

        let mut subgraphs = Vec::with_capacity(communities.len());
        for members in communities {
            let member_set: HashSet<NodeIndex> = members.iter().copied().collect();

            let mut cluster_edges: Vec<Edge> = Vec::new();
            for &a in &members {
                for b in graph.neighbors(a) {
                    if b.index() > a.index() && member_set.contains(&b) {
                        if let Some(&edge) = edge_lookup.get(&(a, b)) {
                            cluster_edges.push(edge.clone());
                        }
                    }
                }
            }

            let mut center = members[0];
            let mut best_degree = induced_degree(&graph, members[0], &member_set);
            for &member in &members[1..] {
                let degree = induced_degree(&graph, member, &member_set);
                if degree > best_degree {
                    best_degree = degree;
                    center = member;
                }
            }

            let nodes = members
                .iter()
                .map(|&idx| runtime.nodes[graph[idx]].clone())
                .collect();

            subgraphs.push(Subgraph {
                center_node_id: runtime.nodes[graph[center]].id.clone(),
                nodes,
                edges: cluster_edges,
            });
        }
        subgraphs
    }
}

fn induced_degree(
    graph: &UnGraph<usize, ()>,
    member: NodeIndex,
    member_set: &HashSet<NodeIndex>,
) -> usize {
    graph
        .neighbors(member)
        .filter(|n| member_set.contains(n))
        .count()
}

/// Single-level Louvain over an unweighted undirected adjacency list.
///
/// Returns one community id per node, renumbered contiguously by first
/// appearance in node order. Candidate communities are examined in sorted
/// order so the result never depends on hash iteration.
fn louvain(adjacency: &[Vec<usize>], resolution: f64, seed: u64) -> Vec<u32> {
    let n = adjacency.len();
    let strengths: Vec<f64> = adjacency.iter().map(|nbrs| nbrs.len() as f64).collect();
    let total_weight: f64 = strengths.iter().sum::<f64>() / 2.0;

    let mut community: Vec<u32> = (0..n as u32).collect();
    if total_weight == 0.0 {
        return community;
    }

    let mut community_strength: HashMap<u32, f64> = HashMap::with_capacity(n);
    for (node, &ki) in strengths.iter().enumerate() {
        *community_strength.entry(community[node]).or_default() += ki;
    }

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let m2 = 2.0 * total_weight;
    let mut improved = true;
    let mut passes = 0;
    const MAX_PASSES: usize = 100;

    while improved && passes < MAX_PASSES {
        improved = false;
        passes += 1;

        for &node in &order {
            let current = community[node];
            let ki = strengths[node];

            let mut neighbour_weights: HashMap<u32, f64> = HashMap::new();
            for &nb in &adjacency[node] {
                *neighbour_weights.entry(community[nb]).or_default() += 1.0;
            }

            let w_current = neighbour_weights.get(&current).copied().unwrap_or(0.0);
            let sigma_current = community_strength.get(&current).copied().unwrap_or(0.0);
            let remove_cost = w_current / m2 - resolution * ki * (sigma_current - ki) / (m2 * m2);

            let mut candidates: Vec<(u32, f64)> = neighbour_weights.into_iter().collect();
            candidates.sort_unstable_by_key(|&(comm, _)| comm);

            let mut best_community = current;
            let mut best_gain = 0.0;
            for (target, w_target) in candidates {
                if target == current {
                    continue;
                }
                let sigma_target = community_strength.get(&target).copied().unwrap_or(0.0);
                let insert_cost = w_target / m2 - resolution * ki * sigma_target / (m2 * m2);
                let gain = insert_cost - remove_cost;
                if gain > best_gain {
                    best_gain = gain;
                    best_community = target;
                }
            }

            if best_community != current {
                *community_strength.entry(current).or_default() -= ki;
                *community_strength.entry(best_community).or_default() += ki;
                community[node] = best_community;
                improved = true;
            }
        }
    }

    // Contiguous renumbering by first appearance in node order.
    let mut remap: HashMap<u32, u32> = HashMap::new();
    let mut next_id = 0u32;
    for comm in community.iter_mut() {
        let renumbered = *remap.entry(*comm).or_insert_with(|| {
            let id = next_id;
            next_id += 1;
            id
        });
        *comm = renumbered;
    }
    community
}
