//! Heap snapshot entities in the common runtime format
//!
//! All entities are plain records deserialized at the JSON boundary; after a
//! `Runtime` is constructed they are treated as read-only. Wire names are
//! camelCase, matching the capture format.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-object access counters captured alongside the heap graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyMetrics {
    pub node_id: String,
    pub read_counter: u64,
    pub write_counter: u64,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation_time: Option<f64>,
}

/// A single heap object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    /// Outgoing edge ids as recorded in the capture. Advisory only; the
    /// analysis derives adjacency from the edge list.
    pub edge_ids: Vec<String>,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub root: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<EnergyMetrics>,
}

/// A directed reference between two heap objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub from_node_id: String,
    pub to_node_id: String,
    pub name: String,
}

/// An allocation stack frame. `frame_ids` point at *parent* (caller) frames,
/// forming an acyclic call tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stack {
    pub id: String,
    pub frame_ids: Vec<String>,
    pub function_name: String,
    pub script_name: String,
    pub line_number: u32,
    pub column_number: u32,
}

/// A full heap snapshot: nodes, edges, and allocation stacks.
///
/// The id→node index is built once at construction so `node_by_id` is O(1).
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RuntimeDoc")]
pub struct Runtime {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub stacks: Vec<Stack>,
    node_index: HashMap<String, usize>,
}

/// Wire shape of a runtime document; converted into [`Runtime`] so the node
/// index exists for every deserialized instance.
#[derive(Debug, Deserialize)]
struct RuntimeDoc {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    stacks: Vec<Stack>,
}

impl From<RuntimeDoc> for Runtime {
    fn from(doc: RuntimeDoc) -> Self {
        Runtime::new(doc.nodes, doc.edges, doc.stacks)
    }
}

impl Runtime {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>, stacks: Vec<Stack>) -> Self {
        let node_index = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect();
        Runtime {
            nodes,
            edges,
            stacks,
            node_index,
        }
    }

    /// Look up a node by id in O(1).
    pub fn node_by_id(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&index| &self.nodes[index])
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// A portion of a heap graph produced by a partitioner.
///
/// `center_node_id` designates the representative node used as the unit of
/// matching; it always appears in `nodes`.
#[derive(Debug, Clone)]
pub struct Subgraph {
    pub center_node_id: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Subgraph {
    /// The center node, if present in the node list.
    pub fn center(&self) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == self.center_node_id)
    }

    pub fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|n| n.id.clone()).collect()
    }
}
