//! Result types produced by the analysis engine.
//!
//! Every value here is an immutable snapshot: consumers render it and
//! replace it wholesale on the next analysis, they never patch it.

pub mod flow;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub use flow::{DataFlow, EdgeKind, FlowEdge, FlowNode, NodeKind};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "UPPERCASE")]
/// Severity associated with an issue.
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Maps a pattern weight onto a severity.
    pub fn from_weight(weight: u32) -> Self {
        match weight {
            w if w >= 9 => Severity::Critical,
            w if w >= 7 => Severity::High,
            w if w >= 4 => Severity::Medium,
            _ => Severity::Low,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "INFO",
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "low" => Ok(Severity::Low),
            "medium" | "warning" => Ok(Severity::Medium),
            "high" | "error" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!("unknown severity '{other}'")),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
)]
#[serde(rename_all = "lowercase")]
/// Risk classification of a node, a flow or a file.
pub enum RiskLevel {
    #[default]
    Safe,
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Safe => "safe",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// Which detector family produced an [`Issue`].
pub enum IssueOrigin {
    /// Hand-written line detectors.
    Builtin,
    /// Sink or generic hits of the pattern catalog.
    Pattern,
    /// An external scanning engine.
    External,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A diagnostic attached to a file location.
pub struct Issue {
    /// Stable identifier derived from rule and location.
    pub id: String,
    pub file: PathBuf,
    pub line: usize,
    pub column: usize,
    pub severity: Severity,
    pub rule_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixable: Option<bool>,
    pub origin: IssueOrigin,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// One pattern hit as reported inside a [`FileRisk`].
pub struct RiskIssue {
    pub line: usize,
    pub severity: Severity,
    pub message: String,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A line with a high aggregated pattern weight.
pub struct Hotspot {
    pub line: usize,
    pub score: u32,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FileMetrics {
    pub lines_of_code: usize,
    pub complexity: usize,
    pub dependency_count: usize,
    pub sensitive_pattern_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Risk summary of a single file.
pub struct FileRisk {
    /// Path relative to the sweep root, `/`-separated.
    pub file: String,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    /// Name of the classification policy that produced the score.
    pub policy: String,
    pub issue_count: usize,
    pub issues: Vec<RiskIssue>,
    pub hotspots: Vec<Hotspot>,
    pub metrics: FileMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryRisk {
    pub path: String,
    pub average_score: f64,
    pub file_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
/// Workspace-wide ranking of file and directory risk.
pub struct Heatmap {
    /// Sorted by descending score.
    pub files: Vec<FileRisk>,
    pub hot_directories: Vec<DirectoryRisk>,
    pub total_files: usize,
    pub total_risk: f64,
    pub average_risk: f64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Set when the sweep stopped early on cancellation.
    #[serde(default)]
    pub cancelled: bool,
}
