//! Integration tests for heaplink
//!
//! End-to-end scenarios over the full pipeline plus the CLI surface.

use std::fs;
use std::process::Command;

use heaplink_analysis::{AnalysisParams, AnalysisPipeline, CodeLinkParams, Strategy};
use heaplink_core::{
    CodeChangeSpan, CodeEvolution, Confidence, ModificationSource, ModificationType, Runtime,
};

fn change(
    file: &str,
    modification_type: ModificationType,
    source: ModificationSource,
    start: u32,
    end: u32,
) -> CodeEvolution {
    CodeEvolution {
        file_id: file.to_string(),
        modification_type,
        modification_source: source,
        code_change_span: CodeChangeSpan {
            line_start: start,
            line_end: end,
            column_start: 0,
            column_end: 100,
        },
    }
}

fn runtime_from_json(raw: &str) -> Runtime {
    heaplink_parser::parse_runtime(raw).unwrap()
}

const BASELINE_JSON: &str = r#"{
    "nodes": [
        {"id": "n1", "edgeIds": ["e1"], "type": "root", "root": true},
        {"id": "n2", "edgeIds": [], "type": "object", "value": "old_value", "traceId": "s1"}
    ],
    "edges": [
        {"id": "e1", "fromNodeId": "n1", "toNodeId": "n2", "name": "ref"}
    ],
    "stacks": [
        {"id": "s1", "frameIds": [], "functionName": "func", "scriptName": "app.js",
         "lineNumber": 10, "columnNumber": 1}
    ]
}"#;

const MODIFIED_JSON: &str = r#"{
    "nodes": [
        {"id": "n1", "edgeIds": ["e1"], "type": "root", "root": true},
        {"id": "n2", "edgeIds": ["e2"], "type": "object", "value": "new_value", "traceId": "s1"},
        {"id": "n3", "edgeIds": [], "type": "object", "value": "added_value", "traceId": "s2"}
    ],
    "edges": [
        {"id": "e1", "fromNodeId": "n1", "toNodeId": "n2", "name": "ref"},
        {"id": "e2", "fromNodeId": "n2", "toNodeId": "n3", "name": "child"}
    ],
    "stacks": [
        {"id": "s1", "frameIds": [], "functionName": "func", "scriptName": "app.js",
         "lineNumber": 10, "columnNumber": 1},
        {"id": "s2", "frameIds": [], "functionName": "func2", "scriptName": "app.js",
         "lineNumber": 20, "columnNumber": 1}
    ]
}"#;

fn scenario_changes() -> (Vec<CodeEvolution>, Vec<CodeEvolution>) {
    let changes_baseline = vec![change(
        "app.js",
        ModificationType::Modify,
        ModificationSource::Base,
        5,
        15,
    )];
    let changes_modified = vec![change(
        "app.js",
        ModificationType::Insert,
        ModificationSource::Modified,
        18,
        25,
    )];
    (changes_baseline, changes_modified)
}

/// Value change: n2 is classified as modified and attributed as a Direct
/// improvement, never as a regression.
#[test]
fn test_value_change_yields_direct_improvement() {
    let baseline = runtime_from_json(BASELINE_JSON);
    let modified = runtime_from_json(MODIFIED_JSON);
    let (changes_baseline, changes_modified) = scenario_changes();

    let pipeline = AnalysisPipeline::new(Strategy::HeuristicGreedy, AnalysisParams::default());
    let (matching, links, _) =
        pipeline.run(&baseline, &changes_baseline, &modified, &changes_modified);

    let modified_side_ids: Vec<&str> = matching
        .modified
        .iter()
        .flat_map(|p| p.nodes_modified_id.iter().map(String::as_str))
        .collect();
    assert!(modified_side_ids.contains(&"n2"));
    assert!(modified_side_ids.contains(&"n3"));

    let improvement = links
        .improvements
        .iter()
        .find(|p| p.node_id == "n2")
        .expect("n2 must be attributed as improvement");
    assert_eq!(improvement.confidence, Confidence::Direct);
    assert_eq!(improvement.code_evolution.file_id, "app.js");

    assert!(links.regressions.iter().all(|p| p.node_id != "n2"));
}

/// Pure addition: with singleton partitions n3 is an added subgraph and a
/// Direct regression.
#[test]
fn test_pure_addition_yields_direct_regression() {
    let baseline = runtime_from_json(BASELINE_JSON);
    // identical n2 so only n3 differs
    let modified = runtime_from_json(&MODIFIED_JSON.replace("new_value", "old_value"));
    let (changes_baseline, changes_modified) = scenario_changes();

    let pipeline = AnalysisPipeline::new(Strategy::Primitive, AnalysisParams::default());
    let (matching, links, _) =
        pipeline.run(&baseline, &changes_baseline, &modified, &changes_modified);

    let added_ids: Vec<&str> = matching
        .added_node_ids
        .iter()
        .flat_map(|r| r.nodes_modified_id.iter().map(String::as_str))
        .collect();
    assert_eq!(added_ids, vec!["n3"]);

    let regression = links
        .regressions
        .iter()
        .find(|p| p.node_id == "n3")
        .expect("n3 must be attributed as regression");
    assert_eq!(regression.confidence, Confidence::Direct);
    assert_eq!(
        regression.code_evolution.modification_type,
        ModificationType::Insert
    );
}

const RETAINED_BASELINE_JSON: &str = r#"{
    "nodes": [
        {"id": "holder", "edgeIds": [], "type": "object", "value": "stable", "traceId": "s1"}
    ],
    "edges": [],
    "stacks": [
        {"id": "s1", "frameIds": [], "functionName": "make", "scriptName": "app.js",
         "lineNumber": 20, "columnNumber": 1}
    ]
}"#;

/// Derived reach: the new node has no usable allocation trace but its
/// retainer verifies directly, so the attribution is inherited as Derived.
#[test]
fn test_unreachable_addition_is_derived_through_retainer() {
    let baseline = runtime_from_json(RETAINED_BASELINE_JSON);
    let modified = runtime_from_json(
        r#"{
        "nodes": [
            {"id": "holder", "edgeIds": ["e1"], "type": "object", "value": "stable", "traceId": "s1"},
            {"id": "n_new", "edgeIds": [], "type": "object", "value": "fresh"}
        ],
        "edges": [
            {"id": "e1", "fromNodeId": "holder", "toNodeId": "n_new", "name": "keeps"}
        ],
        "stacks": [
            {"id": "s1", "frameIds": [], "functionName": "make", "scriptName": "app.js",
             "lineNumber": 20, "columnNumber": 1}
        ]
    }"#,
    );
    let (changes_baseline, changes_modified) = scenario_changes();

    let pipeline = AnalysisPipeline::new(Strategy::Primitive, AnalysisParams::default());
    let (_, links, _) = pipeline.run(&baseline, &changes_baseline, &modified, &changes_modified);

    let regression = links
        .regressions
        .iter()
        .find(|p| p.node_id == "n_new")
        .expect("n_new must be attributed through its retainer");
    assert_eq!(regression.confidence, Confidence::Derived);
    assert_eq!(regression.code_evolution.file_id, "app.js");
}

/// Out of reach: the retainer chain is longer than the hop cap, so the new
/// node stays unmappable. The chain itself exists in both captures, so only
/// the new node is a target.
#[test]
fn test_retainer_beyond_hop_cap_is_unmappable() {
    let baseline = runtime_from_json(
        r#"{
        "nodes": [
            {"id": "holder", "edgeIds": ["e1"], "type": "object", "value": "stable", "traceId": "s1"},
            {"id": "mid1", "edgeIds": ["e2"], "type": "object"},
            {"id": "mid2", "edgeIds": [], "type": "object"}
        ],
        "edges": [
            {"id": "e1", "fromNodeId": "holder", "toNodeId": "mid1", "name": "a"},
            {"id": "e2", "fromNodeId": "mid1", "toNodeId": "mid2", "name": "b"}
        ],
        "stacks": [
            {"id": "s1", "frameIds": [], "functionName": "make", "scriptName": "app.js",
             "lineNumber": 20, "columnNumber": 1}
        ]
    }"#,
    );
    let modified = runtime_from_json(
        r#"{
        "nodes": [
            {"id": "holder", "edgeIds": ["e1"], "type": "object", "value": "stable", "traceId": "s1"},
            {"id": "mid1", "edgeIds": ["e2"], "type": "object"},
            {"id": "mid2", "edgeIds": ["e3"], "type": "object"},
            {"id": "n_new", "edgeIds": [], "type": "object", "value": "fresh"}
        ],
        "edges": [
            {"id": "e1", "fromNodeId": "holder", "toNodeId": "mid1", "name": "a"},
            {"id": "e2", "fromNodeId": "mid1", "toNodeId": "mid2", "name": "b"},
            {"id": "e3", "fromNodeId": "mid2", "toNodeId": "n_new", "name": "c"}
        ],
        "stacks": [
            {"id": "s1", "frameIds": [], "functionName": "make", "scriptName": "app.js",
             "lineNumber": 20, "columnNumber": 1}
        ]
    }"#,
    );
    let (changes_baseline, changes_modified) = scenario_changes();

    let params = AnalysisParams {
        code_link: CodeLinkParams { max_distance: 2 },
        ..AnalysisParams::default()
    };
    let pipeline = AnalysisPipeline::new(Strategy::Primitive, params);
    let (_, links, _) = pipeline.run(&baseline, &changes_baseline, &modified, &changes_modified);

    assert!(links.regressions.iter().all(|p| p.node_id != "n_new"));
    assert!(
        links
            .unmappable_regressions
            .contains(&"n_new".to_string())
    );
}

fn chain_json(len: usize) -> String {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    nodes.push(
        r#"{"id": "root", "edgeIds": ["e0"], "type": "root", "root": true}"#.to_string(),
    );
    edges.push(r#"{"id": "e0", "fromNodeId": "root", "toNodeId": "n01", "name": "start"}"#.to_string());
    for i in 1..=len {
        nodes.push(format!(
            r#"{{"id": "n{i:02}", "edgeIds": [], "type": "object", "value": "value_{i}"}}"#
        ));
        if i < len {
            edges.push(format!(
                r#"{{"id": "e{i:02}", "fromNodeId": "n{i:02}", "toNodeId": "n{:02}", "name": "next"}}"#,
                i + 1
            ));
        }
    }
    format!(
        r#"{{"nodes": [{}], "edges": [{}], "stacks": []}}"#,
        nodes.join(","),
        edges.join(",")
    )
}

/// Large chain identity: two identical 50-node chains with no code changes
/// match completely; both containers stay empty.
#[test]
fn test_identical_chains_fully_match() {
    let baseline = runtime_from_json(&chain_json(50));
    let modified = runtime_from_json(&chain_json(50));

    let pipeline = AnalysisPipeline::new(Strategy::HeuristicGreedy, AnalysisParams::default());
    let (matching, links, _) = pipeline.run(&baseline, &[], &modified, &[]);

    assert!(matching.modified.is_empty());
    assert!(matching.added_node_ids.is_empty());
    assert!(matching.removed_node_ids.is_empty());
    let matched_ids: usize = matching
        .matched
        .iter()
        .map(|p| p.nodes_baseline_id.len())
        .sum();
    assert_eq!(matched_ids, baseline.node_count());

    assert!(links.regressions.is_empty());
    assert!(links.improvements.is_empty());
    assert!(links.unmappable_regressions.is_empty());
    assert!(links.unmappable_improvements.is_empty());
}

/// Identical inputs and parameters produce byte-identical serialized output.
#[test]
fn test_runs_are_deterministic() {
    let baseline = runtime_from_json(BASELINE_JSON);
    let modified = runtime_from_json(MODIFIED_JSON);
    let (changes_baseline, changes_modified) = scenario_changes();

    let mut outputs = Vec::new();
    for _ in 0..2 {
        let pipeline =
            AnalysisPipeline::new(Strategy::CommunityDetection, AnalysisParams::default());
        let (matching, links, _) =
            pipeline.run(&baseline, &changes_baseline, &modified, &changes_modified);
        outputs.push(format!(
            "{}{}",
            serde_json::to_string(&matching).unwrap(),
            serde_json::to_string(&links).unwrap()
        ));
    }
    assert_eq!(outputs[0], outputs[1]);
}

// ── CLI surface ──────────────────────────────────────────

fn write_fixture(dir: &std::path::Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_cli_compare_writes_results_and_reports() {
    let dir = tempfile::tempdir().unwrap();
    let baseline = write_fixture(dir.path(), "baseline.json", BASELINE_JSON);
    let modified = write_fixture(dir.path(), "modified.json", MODIFIED_JSON);
    let settings = write_fixture(
        dir.path(),
        "settings.json",
        r#"{"strategy": "heuristic-greedy", "parameters": {"subgraph": {"k": 2}}}"#,
    );
    let evolutions = write_fixture(
        dir.path(),
        "changes.json",
        r#"[
            {"fileId": "app.js", "modificationType": "modify", "modificationSource": "base",
             "codeChangeSpan": {"lineStart": 5, "lineEnd": 15, "columnStart": 0, "columnEnd": 100}},
            {"fileId": "app.js", "modificationType": "insert", "modificationSource": "modified",
             "codeChangeSpan": {"lineStart": 18, "lineEnd": 25, "columnStart": 0, "columnEnd": 100}}
        ]"#,
    );
    let output = dir.path().join("result.json");
    let report_prefix = dir.path().join("report");

    let status = Command::new(env!("CARGO_BIN_EXE_heaplink"))
        .args([
            "compare",
            "--baseline",
            baseline.to_str().unwrap(),
            "--modified",
            modified.to_str().unwrap(),
            "--settings",
            settings.to_str().unwrap(),
            "--code-evolution",
            evolutions.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--output-report",
            report_prefix.to_str().unwrap(),
        ])
        .status()
        .expect("failed to run heaplink");
    assert!(status.success());

    let result: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
    assert!(result["time_tracking"]["subgraph_generation_start"].is_string());
    assert!(result["matching"]["modified"].is_array());
    let regressions = result["causal_links"]["regressions"].as_array().unwrap();
    assert!(regressions.iter().any(|p| p["node_id"] == "n3"));

    let matching_report =
        fs::read_to_string(dir.path().join("report-matching-report.html")).unwrap();
    assert!(matching_report.contains("Access Count Analysis Overview"));
    let link_report =
        fs::read_to_string(dir.path().join("report-code-link-report.html")).unwrap();
    assert!(link_report.contains("Code Linkage Analysis Report"));
}

#[test]
fn test_cli_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let baseline = write_fixture(dir.path(), "baseline.json", BASELINE_JSON);
    let modified = write_fixture(dir.path(), "modified.json", MODIFIED_JSON);
    let empty = write_fixture(
        dir.path(),
        "empty.json",
        r#"{"nodes": [], "edges": [], "stacks": []}"#,
    );
    let garbage = write_fixture(dir.path(), "garbage.json", "not json");
    let bad_settings = write_fixture(
        dir.path(),
        "settings.json",
        r#"{"strategy": "quantum-annealing"}"#,
    );

    let run = |args: &[&str]| {
        Command::new(env!("CARGO_BIN_EXE_heaplink"))
            .args(args)
            .output()
            .expect("failed to run heaplink")
            .status
            .code()
    };

    // file not found
    assert_eq!(
        run(&[
            "compare",
            "--baseline",
            "/nonexistent/baseline.json",
            "--modified",
            modified.to_str().unwrap(),
        ]),
        Some(2)
    );
    // parse failure
    assert_eq!(
        run(&[
            "compare",
            "--baseline",
            garbage.to_str().unwrap(),
            "--modified",
            modified.to_str().unwrap(),
        ]),
        Some(3)
    );
    // empty runtime
    assert_eq!(
        run(&[
            "compare",
            "--baseline",
            empty.to_str().unwrap(),
            "--modified",
            modified.to_str().unwrap(),
        ]),
        Some(4)
    );
    // unsupported strategy
    assert_eq!(
        run(&[
            "compare",
            "--baseline",
            baseline.to_str().unwrap(),
            "--modified",
            modified.to_str().unwrap(),
            "--settings",
            bad_settings.to_str().unwrap(),
        ]),
        Some(5)
    );
}

#[test]
fn test_cli_version() {
    let output = Command::new(env!("CARGO_BIN_EXE_heaplink"))
        .arg("version")
        .output()
        .expect("failed to run heaplink");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("heaplink"));
}
