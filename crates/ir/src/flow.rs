use crate::RiskLevel;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Source,
    Sink,
    Transform,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Source => "source",
            NodeKind::Sink => "sink",
            NodeKind::Transform => "transform",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Data,
    Control,
    Call,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    /// Identifier unique within one analysis run.
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
    /// Matched snippet.
    pub code: String,
    pub tainted: bool,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub kind: EdgeKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
/// Heuristic data-flow graph of one file.
pub struct DataFlow {
    /// Sorted by line.
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    pub exit_points: Vec<String>,
    pub tainted_paths: Vec<Vec<String>>,
    /// Highest node risk level, `safe` for an empty graph.
    pub risk_level: RiskLevel,
}

impl DataFlow {
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Exports the graph to DOT format.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph DataFlow {\n");
        for node in &self.nodes {
            let shape = match node.kind {
                NodeKind::Source => "invhouse",
                NodeKind::Sink => "house",
                NodeKind::Transform => "box",
            };
            out.push_str(&format!(
                "    \"{}\" [label=\"{}:{} {}\", shape={shape}];\n",
                node.id,
                node.line,
                node.kind,
                escape(&node.label)
            ));
        }
        for edge in &self.edges {
            match &edge.label {
                Some(l) => out.push_str(&format!(
                    "    \"{}\" -> \"{}\" [label=\"{}\"];\n",
                    edge.from,
                    edge.to,
                    escape(l)
                )),
                None => out.push_str(&format!("    \"{}\" -> \"{}\";\n", edge.from, edge.to)),
            }
        }
        out.push('}');
        out
    }

    /// Exports the graph to Mermaid format.
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from("graph TD\n");
        for node in &self.nodes {
            out.push_str(&format!(
                "    {}[\"{}:{} {}\"]\n",
                mermaid_id(&node.id),
                node.line,
                node.kind,
                escape(&node.label)
            ));
        }
        for edge in &self.edges {
            match &edge.label {
                Some(l) => out.push_str(&format!(
                    "    {} -->|{}| {}\n",
                    mermaid_id(&edge.from),
                    escape(l),
                    mermaid_id(&edge.to)
                )),
                None => out.push_str(&format!(
                    "    {} --> {}\n",
                    mermaid_id(&edge.from),
                    mermaid_id(&edge.to)
                )),
            }
        }
        out
    }

    /// Exports the graph to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn mermaid_id(id: &str) -> String {
    id.replace('-', "_")
}
