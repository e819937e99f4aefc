//! CLI command implementations

use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use heaplink_analysis::{
    AnalysisParams, AnalysisPipeline, CodeLinkParams, MatchingParams, PartitionParams, Strategy,
};
use heaplink_parser::Settings;
use heaplink_report::{CodeLinkReport, MatchingReport};

pub fn compare(
    baseline: PathBuf,
    modified: PathBuf,
    settings: Option<PathBuf>,
    code_evolution: Option<PathBuf>,
    output: Option<PathBuf>,
    output_report: Option<PathBuf>,
) -> anyhow::Result<()> {
    let settings = match settings {
        Some(path) => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("cannot read settings file {}", path.display()))?;
            heaplink_parser::parse_settings(&raw)?
        }
        None => Settings::default(),
    };

    let baseline_raw = fs::read_to_string(&baseline)
        .with_context(|| format!("cannot read baseline file {}", baseline.display()))?;
    let baseline_runtime = heaplink_parser::parse_runtime(&baseline_raw)?;
    heaplink_parser::require_nonempty(&baseline_runtime, "baseline")?;

    let modified_raw = fs::read_to_string(&modified)
        .with_context(|| format!("cannot read modified file {}", modified.display()))?;
    let modified_runtime = heaplink_parser::parse_runtime(&modified_raw)?;
    heaplink_parser::require_nonempty(&modified_runtime, "modified")?;

    tracing::info!(
        baseline_nodes = baseline_runtime.node_count(),
        baseline_edges = baseline_runtime.edge_count(),
        modified_nodes = modified_runtime.node_count(),
        modified_edges = modified_runtime.edge_count(),
        "loaded runtimes"
    );

    let strategy = Strategy::from_name(settings.strategy_name())?;

    let (changes_baseline, changes_modified) = match code_evolution {
        Some(path) => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("cannot read code evolution file {}", path.display()))?;
            heaplink_parser::split_by_source(heaplink_parser::parse_code_evolutions(&raw)?)
        }
        None => (vec![], vec![]),
    };

    let params = AnalysisParams {
        partition: PartitionParams {
            k: settings.parameters.subgraph.k,
            resolution: settings.parameters.subgraph.resolution,
            seed: settings.parameters.subgraph.seed,
        },
        matching: MatchingParams {
            similarity_threshold: settings.parameters.matching.similarity_threshold,
            ..MatchingParams::default()
        },
        code_link: CodeLinkParams {
            max_distance: settings.parameters.code_link.max_distance,
        },
    };

    let pipeline = AnalysisPipeline::new(strategy, params);
    let (matching, links, time_tracking) = pipeline.run(
        &baseline_runtime,
        &changes_baseline,
        &modified_runtime,
        &changes_modified,
    );

    let result = serde_json::json!({
        "time_tracking": time_tracking,
        "matching": matching,
        "causal_links": links,
    });
    let rendered = serde_json::to_string_pretty(&result)?;

    match &output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("cannot write result to {}", path.display()))?;
            tracing::info!("results saved to {}", path.display());
        }
        None => println!("{rendered}"),
    }

    if let Some(prefix) = output_report {
        let matching_html =
            MatchingReport::new(&baseline_runtime, &modified_runtime).render(&matching);
        let matching_path = report_path(&prefix, "matching-report");
        fs::write(&matching_path, matching_html)
            .with_context(|| format!("cannot write report to {}", matching_path.display()))?;
        tracing::info!("report saved to {}", matching_path.display());

        let link_html = CodeLinkReport::new(&baseline_runtime, &modified_runtime).render(&links);
        let link_path = report_path(&prefix, "code-link-report");
        fs::write(&link_path, link_html)
            .with_context(|| format!("cannot write report to {}", link_path.display()))?;
        tracing::info!("report saved to {}", link_path.display());
    }

    Ok(())
}

fn report_path(prefix: &PathBuf, suffix: &str) -> PathBuf {
    PathBuf::from(format!("{}-{suffix}.html", prefix.display()))
}
