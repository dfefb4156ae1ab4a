//! Pattern scanning, heuristic taint flow and risk aggregation.
//!
//! The engine never parses code. A [`loader::Catalog`] of regular
//! expressions is matched against raw text, hits become the nodes of a
//! per-file [`DataFlow`], and weights are summed into per-file and
//! per-directory risk scores. Every entry point is a pure function of its
//! inputs apart from file reads in the sweep.

use ir::DataFlow;
use loader::Catalog;

pub mod detectors;
pub mod flow;
pub mod heatmap;
pub mod issues;
pub mod risk;
pub mod scanner;
pub mod taint;

pub use detectors::{issue_id, run_detectors};
pub use flow::{AdjacencyPass, FlowBuilder, FlowPass, UnsanitizedPass, UNSANITIZED};
pub use heatmap::{
    aggregate_directories, build_heatmap, sweep_workspace, CancellationToken, NoProgress,
    SweepConfig, SweepProgress, DEFAULT_DIRECTORY_LIMIT,
};
pub use issues::{collect_issues, pattern_issues, IssueProvider};
pub use risk::{
    analyze_file_risk, analyze_path_risk, quick_check, HeatmapPolicy, QuickCheckPolicy,
    RiskPolicy, Thresholds, DEFAULT_HOTSPOT_LIMIT,
};
pub use scanner::{scan_matches, Match};
pub use taint::{find_path, find_tainted_paths};

/// Catalog hits of a file together with the flow built from them.
#[derive(Debug, Clone)]
pub struct ScanResult<'c> {
    pub matches: Vec<Match<'c>>,
    pub flow: DataFlow,
}

/// Scans `text` and builds its flow graph with the default passes.
pub fn scan_file<'c>(file: &str, text: &str, catalog: &'c Catalog) -> ScanResult<'c> {
    let matches = scan_matches(text, catalog);
    let flow = FlowBuilder::default().build(file, &matches);
    tracing::debug!(
        file,
        matches = matches.len(),
        nodes = flow.nodes.len(),
        paths = flow.tainted_paths.len(),
        "File scanned"
    );
    ScanResult { matches, flow }
}

fn mentions(line: &str, ident: &str) -> bool {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$';
    line.match_indices(ident).any(|(pos, _)| {
        let before = line[..pos].chars().next_back();
        let after = line[pos + ident.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}

/// Flow of the matches whose line mentions `identifier` as a whole word.
pub fn trace_variable(file: &str, text: &str, catalog: &Catalog, identifier: &str) -> DataFlow {
    if identifier.is_empty() {
        return DataFlow::default();
    }
    let lines: Vec<&str> = text.lines().collect();
    let matches: Vec<Match<'_>> = scan_matches(text, catalog)
        .into_iter()
        .filter(|m| {
            lines
                .get(m.line - 1)
                .is_some_and(|l| mentions(l, identifier))
        })
        .collect();
    FlowBuilder::default().build(file, &matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_word_mentions() {
        assert!(mentions("eval(x)", "x"));
        assert!(!mentions("eval(xy)", "x"));
        assert!(!mentions("$x = 1", "x"));
        assert!(mentions("a.x + 1", "x"));
        assert!(mentions("$el.innerHTML = v", "$el"));
    }

    #[test]
    fn trace_keeps_only_lines_mentioning_the_variable() {
        let text = "const a = req.body.a;\nconst b = req.query.b;\neval(a);\n";
        let flow = trace_variable("t.js", text, Catalog::builtin(), "a");
        let lines: Vec<_> = flow.nodes.iter().map(|n| n.line).collect();
        assert_eq!(lines, vec![1, 3]);
        assert_eq!(flow.tainted_paths.len(), 1);
    }

    #[test]
    fn empty_identifier_gives_empty_flow() {
        let flow = trace_variable("t.js", "eval(x)", Catalog::builtin(), "");
        assert!(flow.is_empty());
    }
}
