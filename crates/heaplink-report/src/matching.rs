//! Access-count analysis report over a matching result

use std::collections::BTreeMap;
use std::fmt::Write as _;

use heaplink_core::{AccessEnergy, MatchingResult, Runtime, access_energy};

use crate::TABLE_STYLE;

/// Renders the "Access Count Analysis Overview": per category the node
/// counts of both sides and the four access-energy dimensions of both
/// sides, followed by per-category node-type analytics.
pub struct MatchingReport<'a> {
    baseline: &'a Runtime,
    modified: &'a Runtime,
}

struct Category<'r> {
    label: &'static str,
    baseline_ids: Vec<&'r str>,
    modified_ids: Vec<&'r str>,
}

impl<'a> MatchingReport<'a> {
    pub fn new(baseline: &'a Runtime, modified: &'a Runtime) -> Self {
        MatchingReport { baseline, modified }
    }

    pub fn render(&self, result: &MatchingResult) -> String {
        let categories = [
            Category {
                label: "Matched",
                baseline_ids: collect(result.matched.iter().map(|p| &p.nodes_baseline_id)),
                modified_ids: collect(result.matched.iter().map(|p| &p.nodes_modified_id)),
            },
            Category {
                label: "Modified",
                baseline_ids: collect(result.modified.iter().map(|p| &p.nodes_baseline_id)),
                modified_ids: collect(result.modified.iter().map(|p| &p.nodes_modified_id)),
            },
            Category {
                label: "Added",
                baseline_ids: collect(result.added_node_ids.iter().map(|p| &p.nodes_baseline_id)),
                modified_ids: collect(result.added_node_ids.iter().map(|p| &p.nodes_modified_id)),
            },
            Category {
                label: "Removed",
                baseline_ids: collect(result.removed_node_ids.iter().map(|p| &p.nodes_baseline_id)),
                modified_ids: collect(result.removed_node_ids.iter().map(|p| &p.nodes_modified_id)),
            },
        ];

        let mut html = String::new();
        let _ = write!(html, "<style>{TABLE_STYLE}</style>");
        html.push_str("<h1>Access Count Analysis Overview</h1>\n<table>\n<thead><tr>");
        for heading in [
            "Category",
            "Nodes (Baseline)",
            "Nodes (Modified)",
            "Read Counter Baseline",
            "Read Counter Modified",
            "Write Counter Baseline",
            "Write Counter Modified",
            "Read Size Baseline",
            "Read Size Modified",
            "Write Size Baseline",
            "Write Size Modified",
        ] {
            let _ = write!(html, "<th>{heading}</th>");
        }
        html.push_str("</tr></thead>\n<tbody>\n");

        for category in &categories {
            let base_energy = self.energy_of(self.baseline, &category.baseline_ids);
            let mod_energy = self.energy_of(self.modified, &category.modified_ids);
            let _ = write!(
                html,
                "<tr><td>{}</td><td>{}</td><td>{}</td>{}{}{}{}</tr>\n",
                category.label,
                category.baseline_ids.len(),
                category.modified_ids.len(),
                pair_cells(base_energy.read_counter, mod_energy.read_counter),
                pair_cells(base_energy.write_counter, mod_energy.write_counter),
                pair_cells(base_energy.read_size, mod_energy.read_size),
                pair_cells(base_energy.write_size, mod_energy.write_size),
            );
        }
        html.push_str("</tbody>\n</table>\n");

        for category in &categories {
            html.push_str(&self.render_type_analytics(category));
        }
        html
    }

    fn energy_of(&self, runtime: &Runtime, ids: &[&str]) -> AccessEnergy {
        access_energy(ids.iter().filter_map(|id| runtime.node_by_id(id)))
    }

    /// Per-type count and total size, both sides. Empty categories render
    /// nothing.
    fn render_type_analytics(&self, category: &Category<'_>) -> String {
        let base_types = type_analytics(self.baseline, &category.baseline_ids);
        let mod_types = type_analytics(self.modified, &category.modified_ids);

        let mut all_types: Vec<&str> = base_types.keys().chain(mod_types.keys()).copied().collect();
        all_types.sort_unstable();
        all_types.dedup();
        if all_types.is_empty() {
            return String::new();
        }

        let mut html = String::new();
        let _ = write!(html, "<h2>{} Elements Analytics</h2>\n", category.label);
        html.push_str(
            "<table>\n<thead><tr><th>Node Type</th><th>Count (Baseline)</th>\
             <th>Count (Modified)</th><th>Total Size (Baseline)</th>\
             <th>Total Size (Modified)</th></tr></thead>\n<tbody>\n",
        );
        for node_type in all_types {
            let (base_count, base_size) = base_types.get(node_type).copied().unwrap_or((0, 0));
            let (mod_count, mod_size) = mod_types.get(node_type).copied().unwrap_or((0, 0));
            let _ = write!(
                html,
                "<tr><td>{node_type}</td><td>{base_count}</td><td>{mod_count}</td>\
                 <td>{base_size}</td><td>{mod_size}</td></tr>\n",
            );
        }
        html.push_str("</tbody>\n</table>\n");
        html
    }
}

fn collect<'r>(lists: impl Iterator<Item = &'r Vec<String>>) -> Vec<&'r str> {
    lists.flatten().map(String::as_str).collect()
}

fn pair_cells(baseline: u64, modified: u64) -> String {
    format!("<td>{baseline}</td><td>{modified}</td>")
}

/// Count and total captured size per node type; missing ids are skipped.
fn type_analytics<'r>(runtime: &'r Runtime, ids: &[&str]) -> BTreeMap<&'r str, (u64, u64)> {
    let mut analytics: BTreeMap<&str, (u64, u64)> = BTreeMap::new();
    for id in ids {
        let Some(node) = runtime.node_by_id(id) else {
            continue;
        };
        let entry = analytics.entry(node.node_type.as_str()).or_insert((0, 0));
        entry.0 += 1;
        if let Some(energy) = &node.energy {
            entry.1 += energy.size;
        }
    }
    analytics
}
