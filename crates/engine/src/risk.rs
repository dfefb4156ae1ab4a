//! Per-file risk scoring.
//!
//! Two classification policies exist and are kept apart on purpose: the
//! workspace heatmap normalizes the raw weight sum onto 0-100, the quick
//! single-file check classifies the raw sum directly with its own
//! thresholds. [`FileRisk::policy`] records which one produced a value.

use ir::{FileMetrics, FileRisk, Hotspot, RiskIssue, RiskLevel, Severity};
use loader::{relative_path, Catalog, PatternRole};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

use crate::scanner::{line_scores, scan_matches, total_score, Match};

/// Number of hotspots kept per file unless configured otherwise.
pub const DEFAULT_HOTSPOT_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
/// Upper bounds (exclusive) of each level; anything above `high` is
/// critical.
pub struct Thresholds {
    pub safe: f64,
    pub low: f64,
    pub medium: f64,
    pub high: f64,
}

impl Thresholds {
    pub fn level(&self, score: f64) -> RiskLevel {
        if score < self.safe {
            RiskLevel::Safe
        } else if score < self.low {
            RiskLevel::Low
        } else if score < self.medium {
            RiskLevel::Medium
        } else if score < self.high {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    /// Thresholds must be non-decreasing.
    pub fn validate(&self) -> Result<(), String> {
        if self.safe <= self.low && self.low <= self.medium && self.medium <= self.high {
            Ok(())
        } else {
            Err(format!(
                "thresholds must be ascending, got {}/{}/{}/{}",
                self.safe, self.low, self.medium, self.high
            ))
        }
    }
}

/// Turns a raw weight sum into a score and a level.
pub trait RiskPolicy: Send + Sync {
    fn name(&self) -> &'static str;
    fn classify(&self, raw_score: u32) -> (f64, RiskLevel);
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Workspace sweep policy: `min(cap, raw / divisor)`.
pub struct HeatmapPolicy {
    pub divisor: f64,
    pub cap: f64,
    pub thresholds: Thresholds,
}

impl Default for HeatmapPolicy {
    fn default() -> Self {
        Self {
            divisor: 10.0,
            cap: 100.0,
            thresholds: Thresholds {
                safe: 10.0,
                low: 30.0,
                medium: 60.0,
                high: 85.0,
            },
        }
    }
}

impl RiskPolicy for HeatmapPolicy {
    fn name(&self) -> &'static str {
        "heatmap"
    }

    fn classify(&self, raw_score: u32) -> (f64, RiskLevel) {
        let raw = f64::from(raw_score);
        let scaled = if self.divisor > 0.0 {
            raw / self.divisor
        } else {
            raw
        };
        let score = scaled.min(self.cap);
        (score, self.thresholds.level(score))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Single-file quick check policy on the unnormalized sum.
pub struct QuickCheckPolicy {
    pub thresholds: Thresholds,
}

impl Default for QuickCheckPolicy {
    fn default() -> Self {
        Self {
            thresholds: Thresholds {
                safe: 30.0,
                low: 100.0,
                medium: 200.0,
                high: 500.0,
            },
        }
    }
}

impl RiskPolicy for QuickCheckPolicy {
    fn name(&self) -> &'static str {
        "quick-check"
    }

    fn classify(&self, raw_score: u32) -> (f64, RiskLevel) {
        let score = f64::from(raw_score);
        (score, self.thresholds.level(score))
    }
}

static DECISION_RE: OnceLock<Regex> = OnceLock::new();
static DEPENDENCY_RE: OnceLock<Regex> = OnceLock::new();

/// Size and shape metrics of a file.
pub fn file_metrics(text: &str, matches: &[Match<'_>]) -> FileMetrics {
    let decision = DECISION_RE.get_or_init(|| {
        Regex::new(r"\b(?:if|for|while|case|catch)\b|&&|\|\||\s\?\s").expect("valid decision regex")
    });
    let dependency = DEPENDENCY_RE.get_or_init(|| {
        Regex::new(r"^\s*import\s|\brequire\s*\(|^\s*from\s+\S+\s+import\s")
            .expect("valid dependency regex")
    });
    let mut metrics = FileMetrics {
        complexity: 1,
        ..Default::default()
    };
    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        metrics.lines_of_code += 1;
        metrics.complexity += decision.find_iter(line).count();
        if dependency.is_match(line) {
            metrics.dependency_count += 1;
        }
    }
    metrics.sensitive_pattern_count = matches
        .iter()
        .filter(|m| matches!(m.pattern.role, PatternRole::Source | PatternRole::Sink))
        .count();
    metrics
}

/// Lines by descending aggregated weight, ties by ascending line.
pub fn hotspots(matches: &[Match<'_>], limit: usize) -> Vec<Hotspot> {
    let mut spots: Vec<Hotspot> = line_scores(matches)
        .into_iter()
        .map(|(line, s)| Hotspot {
            line,
            score: s.score,
            reasons: s.reasons,
        })
        .collect();
    // line_scores is line-ordered, so a stable sort keeps ties ascending
    spots.sort_by(|a, b| b.score.cmp(&a.score));
    spots.truncate(limit);
    spots
}

/// Scores `text` under `policy`.
///
/// A file without matches is a valid zero result, never an absence.
pub fn analyze_file_risk(
    file: &str,
    text: &str,
    catalog: &Catalog,
    policy: &dyn RiskPolicy,
    hotspot_limit: usize,
) -> FileRisk {
    let matches = scan_matches(text, catalog);
    let (risk_score, risk_level) = policy.classify(total_score(&matches));
    let mut issues: Vec<RiskIssue> = matches
        .iter()
        .map(|m| RiskIssue {
            line: m.line,
            severity: Severity::from_weight(m.pattern.weight),
            message: m.pattern.message.clone(),
            category: m.pattern.category.clone(),
        })
        .collect();
    issues.sort_by_key(|i| i.line);
    debug!(
        file,
        policy = policy.name(),
        score = risk_score,
        matches = matches.len(),
        "File risk computed"
    );
    FileRisk {
        file: file.to_string(),
        risk_score,
        risk_level,
        policy: policy.name().to_string(),
        issue_count: issues.len(),
        issues,
        hotspots: hotspots(&matches, hotspot_limit),
        metrics: file_metrics(text, &matches),
    }
}

/// Reads `path` and scores it; unreadable files yield `None`.
pub fn analyze_path_risk(
    root: &Path,
    path: &Path,
    catalog: &Catalog,
    policy: &dyn RiskPolicy,
    hotspot_limit: usize,
) -> Option<FileRisk> {
    let text = loader::read_source(path)?;
    Some(analyze_file_risk(
        &relative_path(root, path),
        &text,
        catalog,
        policy,
        hotspot_limit,
    ))
}

/// Single-file check under the default [`QuickCheckPolicy`].
pub fn quick_check(file: &str, text: &str, catalog: &Catalog) -> FileRisk {
    analyze_file_risk(
        file,
        text,
        catalog,
        &QuickCheckPolicy::default(),
        DEFAULT_HOTSPOT_LIMIT,
    )
}
