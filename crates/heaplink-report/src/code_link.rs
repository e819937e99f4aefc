//! Per-file causal linkage report

use std::collections::HashMap;
use std::fmt::Write as _;

use heaplink_core::{CausalPair, CodeLinkContainer, Runtime, access_energy_difference};

use crate::TABLE_STYLE;

/// Renders causal pairs grouped by code change file, with the signed
/// access-energy difference of the involved nodes per group.
pub struct CodeLinkReport<'a> {
    baseline: &'a Runtime,
    modified: &'a Runtime,
}

impl<'a> CodeLinkReport<'a> {
    pub fn new(baseline: &'a Runtime, modified: &'a Runtime) -> Self {
        CodeLinkReport { baseline, modified }
    }

    pub fn render(&self, container: &CodeLinkContainer) -> String {
        // Group by file + modification kind, first appearance first;
        // regressions are walked before improvements.
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, (Vec<&CausalPair>, Vec<&CausalPair>)> = HashMap::new();

        for pair in &container.regressions {
            let key = group_key(pair);
            if !groups.contains_key(&key) {
                order.push(key.clone());
            }
            groups.entry(key).or_default().0.push(pair);
        }
        for pair in &container.improvements {
            let key = group_key(pair);
            if !groups.contains_key(&key) {
                order.push(key.clone());
            }
            groups.entry(key).or_default().1.push(pair);
        }

        let mut html = String::new();
        let _ = write!(
            html,
            "<html>\n<head>\n<style>{TABLE_STYLE}</style>\n</head>\n<body>\n\
             <h1>Code Linkage Analysis Report</h1>\n"
        );
        for key in &order {
            let (regressions, improvements) = &groups[key];
            html.push_str(&self.render_file_section(key, regressions, improvements));
        }
        html.push_str("</body></html>");
        html
    }

    fn render_file_section(
        &self,
        key: &str,
        regressions: &[&CausalPair],
        improvements: &[&CausalPair],
    ) -> String {
        // Resolve the involved nodes on both sides; ids missing from a
        // runtime are skipped.
        let pair_ids = || {
            regressions
                .iter()
                .chain(improvements.iter())
                .map(|p| p.node_id.as_str())
        };
        let baseline_nodes = pair_ids().filter_map(|id| self.baseline.node_by_id(id));
        let modified_nodes = pair_ids().filter_map(|id| self.modified.node_by_id(id));
        let delta = access_energy_difference(baseline_nodes, modified_nodes);

        let mut html = String::new();
        let _ = write!(
            html,
            "<div class=\"file-header\"><h2>File: {key}</h2></div>\n\
             <h3>Total Metrics Difference</h3>\n<table>\n<thead><tr>\
             <th>Read Counter Diff</th><th>Write Counter Diff</th>\
             <th>Read Size Diff</th><th>Write Size Diff</th>\
             </tr></thead>\n<tbody>\n<tr>{}{}{}{}</tr>\n</tbody>\n</table>\n",
            diff_cell(delta.read_counter_diff),
            diff_cell(delta.write_counter_diff),
            diff_cell(delta.read_size_diff),
            diff_cell(delta.write_size_diff),
        );

        let _ = write!(html, "<h3>Regressions ({})</h3>\n", regressions.len());
        html.push_str(&pairs_table(regressions));
        let _ = write!(html, "<h3>Improvements ({})</h3>\n", improvements.len());
        html.push_str(&pairs_table(improvements));
        html
    }
}

fn group_key(pair: &CausalPair) -> String {
    let change = &pair.code_evolution;
    format!(
        "{} - {} - {}",
        change.file_id, change.modification_type, change.modification_source
    )
}

fn diff_cell(value: i64) -> String {
    if value > 0 {
        format!("<td><span class=\"regression\">+{value}</span></td>")
    } else if value < 0 {
        format!("<td><span class=\"improvement\">{value}</span></td>")
    } else {
        "<td><span class=\"neutral\">0</span></td>".to_string()
    }
}

fn pairs_table(pairs: &[&CausalPair]) -> String {
    if pairs.is_empty() {
        return "<p>None found.</p>\n".to_string();
    }

    let mut html = String::from(
        "<table>\n<thead><tr><th>Node ID</th><th>Mod Type</th><th>Source</th>\
         <th>Span</th><th>Confidence</th></tr></thead>\n<tbody>\n",
    );
    for pair in pairs {
        let change = &pair.code_evolution;
        let span = &change.code_change_span;
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>L{}:{} - L{}:{}</td><td>{:?}</td></tr>\n",
            pair.node_id,
            change.modification_type,
            change.modification_source,
            span.line_start,
            span.column_start,
            span.line_end,
            span.column_end,
            pair.confidence,
        );
    }
    html.push_str("</tbody>\n</table>\n");
    html
}
