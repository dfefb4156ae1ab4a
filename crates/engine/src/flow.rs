//! Builds the heuristic data-flow graph of one file from its source, sink
//! and transform matches.
//!
//! Edges come from independent [`FlowPass`] strategies applied over the
//! same line-ordered node list. Their outputs are concatenated, so one
//! pair of nodes may be linked by several passes.

use ir::{DataFlow, EdgeKind, FlowEdge, FlowNode, NodeKind, RiskLevel};
use loader::{PatternRole, RiskPattern, RiskTier};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::debug;

use crate::scanner::Match;
use crate::taint::find_tainted_paths;

/// Roles that become flow nodes.
pub const FLOW_ROLES: &[PatternRole] = &[
    PatternRole::Source,
    PatternRole::Sink,
    PatternRole::Transform,
];

/// Tokens never used to link nodes.
pub const KEYWORDS: &[&str] = &[
    "const",
    "let",
    "var",
    "function",
    "return",
    "if",
    "else",
    "for",
    "while",
    "true",
    "false",
    "null",
    "undefined",
];

/// Label of edges added by [`UnsanitizedPass`].
pub const UNSANITIZED: &str = "Unsanitized";

/// Sinks at or above this weight are critical, the rest high.
const CRITICAL_SINK_WEIGHT: u32 = 9;

static IDENT_RE: OnceLock<Regex> = OnceLock::new();

/// Identifier tokens of a snippet, in first-appearance order, without
/// duplicates or [`KEYWORDS`].
pub fn identifiers(code: &str) -> Vec<String> {
    let re = IDENT_RE.get_or_init(|| {
        Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").expect("valid identifier regex")
    });
    let mut seen = HashSet::new();
    re.find_iter(code)
        .map(|m| m.as_str())
        .filter(|t| !KEYWORDS.contains(t))
        .filter(|t| seen.insert(*t))
        .map(str::to_string)
        .collect()
}

fn node_kind(role: PatternRole) -> Option<NodeKind> {
    match role {
        PatternRole::Source => Some(NodeKind::Source),
        PatternRole::Sink => Some(NodeKind::Sink),
        PatternRole::Transform => Some(NodeKind::Transform),
        PatternRole::Generic => None,
    }
}

fn tier_level(tier: RiskTier) -> RiskLevel {
    match tier {
        RiskTier::Low => RiskLevel::Low,
        RiskTier::Medium => RiskLevel::Medium,
        RiskTier::High => RiskLevel::High,
        RiskTier::Critical => RiskLevel::Critical,
    }
}

/// Risk level a node inherits from its pattern.
pub fn node_risk(pattern: &RiskPattern) -> Option<RiskLevel> {
    match pattern.role {
        PatternRole::Sink if pattern.weight >= CRITICAL_SINK_WEIGHT => Some(RiskLevel::Critical),
        PatternRole::Sink => Some(RiskLevel::High),
        PatternRole::Source => Some(pattern.tier.map_or(RiskLevel::Medium, tier_level)),
        PatternRole::Transform if pattern.safe => Some(RiskLevel::Safe),
        PatternRole::Transform => Some(RiskLevel::Low),
        PatternRole::Generic => None,
    }
}

/// One node per source, sink or transform match, stably sorted by line.
///
/// Ids carry the discovery index, so they stay the same for identical
/// input.
pub fn build_nodes(file: &str, matches: &[Match<'_>]) -> Vec<FlowNode> {
    let mut nodes: Vec<FlowNode> = matches
        .iter()
        .filter_map(|m| node_kind(m.pattern.role).map(|kind| (m, kind)))
        .enumerate()
        .map(|(idx, (m, kind))| FlowNode {
            id: format!("{kind}-{idx}"),
            kind,
            label: m.pattern.message.clone(),
            file: file.to_string(),
            line: m.line,
            column: m.column,
            code: m.matched_text.clone(),
            tainted: kind == NodeKind::Source,
            category: m.pattern.category.clone(),
            risk_level: node_risk(m.pattern),
        })
        .collect();
    // stable: same-line nodes keep discovery order
    nodes.sort_by_key(|n| n.line);
    nodes
}

/// Strategy producing edges over a line-ordered node list.
pub trait FlowPass: Send + Sync {
    fn name(&self) -> &'static str;
    fn edges(&self, nodes: &[FlowNode]) -> Vec<FlowEdge>;
}

/// Links consecutive nodes whose snippets share identifier tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdjacencyPass;

impl FlowPass for AdjacencyPass {
    fn name(&self) -> &'static str {
        "adjacency"
    }

    fn edges(&self, nodes: &[FlowNode]) -> Vec<FlowEdge> {
        nodes
            .windows(2)
            .filter_map(|pair| {
                let (a, b) = (&pair[0], &pair[1]);
                let theirs = identifiers(&b.code);
                let shared: Vec<String> = identifiers(&a.code)
                    .into_iter()
                    .filter(|t| theirs.contains(t))
                    .collect();
                (!shared.is_empty()).then(|| FlowEdge {
                    from: a.id.clone(),
                    to: b.id.clone(),
                    label: Some(shared.join(", ")),
                    kind: EdgeKind::Data,
                })
            })
            .collect()
    }
}

/// Links every source to every later sink unless a safe transform sits
/// strictly between them by line.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsanitizedPass;

/// Sorted lines holding a safe transform.
struct SafeLines(Vec<usize>);

impl SafeLines {
    fn new(nodes: &[FlowNode]) -> Self {
        let mut lines: Vec<usize> = nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Transform && n.risk_level == Some(RiskLevel::Safe))
            .map(|n| n.line)
            .collect();
        lines.sort_unstable();
        lines.dedup();
        Self(lines)
    }

    /// Whether a safe transform sits on a line strictly between `from` and `to`.
    fn between(&self, from: usize, to: usize) -> bool {
        let first_after = self.0.partition_point(|&l| l <= from);
        self.0.get(first_after).is_some_and(|&l| l < to)
    }
}

impl FlowPass for UnsanitizedPass {
    fn name(&self) -> &'static str {
        "unsanitized"
    }

    fn edges(&self, nodes: &[FlowNode]) -> Vec<FlowEdge> {
        let safe = SafeLines::new(nodes);
        let sinks: Vec<&FlowNode> = nodes.iter().filter(|n| n.kind == NodeKind::Sink).collect();
        let mut out = Vec::new();
        for source in nodes.iter().filter(|n| n.kind == NodeKind::Source) {
            for sink in &sinks {
                if source.line >= sink.line || safe.between(source.line, sink.line) {
                    continue;
                }
                out.push(FlowEdge {
                    from: source.id.clone(),
                    to: sink.id.clone(),
                    label: Some(UNSANITIZED.to_string()),
                    kind: EdgeKind::Data,
                });
            }
        }
        out
    }
}

/// Ordered list of passes turning matches into a [`DataFlow`].
pub struct FlowBuilder {
    passes: Vec<Box<dyn FlowPass>>,
}

impl Default for FlowBuilder {
    fn default() -> Self {
        Self::new(vec![Box::new(AdjacencyPass), Box::new(UnsanitizedPass)])
    }
}

impl FlowBuilder {
    pub fn new(passes: Vec<Box<dyn FlowPass>>) -> Self {
        Self { passes }
    }

    /// Appends a pass after the existing ones.
    pub fn with_pass(mut self, pass: Box<dyn FlowPass>) -> Self {
        self.passes.push(pass);
        self
    }

    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Builds the graph and its tainted paths. Generic matches are ignored.
    pub fn build(&self, file: &str, matches: &[Match<'_>]) -> DataFlow {
        let nodes = build_nodes(file, matches);
        let mut edges = Vec::new();
        for pass in &self.passes {
            let added = pass.edges(&nodes);
            debug!(file, pass = pass.name(), edges = added.len(), "Flow pass applied");
            edges.extend(added);
        }
        let entry_point = nodes.first().map(|n| n.id.clone());
        let exit_points = nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Sink)
            .map(|n| n.id.clone())
            .collect();
        let risk_level = nodes
            .iter()
            .filter_map(|n| n.risk_level)
            .max()
            .unwrap_or_default();
        let mut flow = DataFlow {
            nodes,
            edges,
            entry_point,
            exit_points,
            tainted_paths: Vec::new(),
            risk_level,
        };
        flow.tainted_paths = find_tainted_paths(&flow);
        flow
    }
}
