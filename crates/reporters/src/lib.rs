//! Formatters for issues, heatmaps and flow graphs.
//! Provide human and tool-friendly output.

use ir::{DataFlow, FileRisk, Heatmap, Issue, RiskLevel, Severity};
use serde::Serialize;
use std::io::{self, Write};
use tracing::debug;

mod sarif;
pub use sarif::to_sarif;

/// Returns the severity colored with simple ANSI codes.
fn color_severity(sev: Severity) -> String {
    let code = match sev {
        Severity::Info | Severity::Low => "\x1b[32m",
        Severity::Medium => "\x1b[33m",
        Severity::High | Severity::Critical => "\x1b[31m",
    };
    format!("{code}{sev}\x1b[0m")
}

fn color_level(level: RiskLevel) -> String {
    let code = match level {
        RiskLevel::Safe | RiskLevel::Low => "\x1b[32m",
        RiskLevel::Medium => "\x1b[33m",
        RiskLevel::High | RiskLevel::Critical => "\x1b[31m",
    };
    format!("{code}{:<8}\x1b[0m", level.to_string().to_uppercase())
}

fn simple_box(title: &str) -> String {
    let width = title.chars().count() + 2;
    format!(
        "╭{}╮\n│ {} │\n╰{}╯\n",
        "─".repeat(width),
        title,
        "─".repeat(width)
    )
}

const RULE: &str =
    "    ──────────────────────────────────────────────────────────────────────────────\n";

fn scan_stats(info: &ScanInfo) -> String {
    let mut output = simple_box("Analysis Status");
    output.push('\n');
    output.push_str(&format!(
        "    Scanning {} files with {} patterns and {} built-in rules:\n\n",
        info.files_queued, info.patterns_loaded, info.detectors_loaded
    ));
    output.push_str("    PERFORMANCE\n");
    output.push_str(RULE);
    output.push_str("    Metric                    Value\n");
    output.push_str(RULE);
    output.push_str(&format!(
        "    Duration                  {}ms\n",
        info.duration_ms
    ));
    output.push_str(&format!(
        "    Failed files              {}\n",
        info.failed_files
    ));
    output.push_str(&format!(
        "    Success rate              {:.1}%\n",
        if info.files_queued > 0 {
            (info.files_queued.saturating_sub(info.failed_files)) as f64
                / info.files_queued as f64
                * 100.0
        } else {
            0.0
        }
    ));
    output
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Supported formats for printing issues.
pub enum Format {
    /// Human-readable output in plain text.
    Text,
    /// JSON structure for integrations.
    Json,
    /// Report conforming to the SARIF specification.
    Sarif,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Formats for heatmaps and single-file risk summaries.
pub enum SummaryFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowFormat {
    Text,
    Json,
    Dot,
    Mermaid,
}

#[derive(Serialize)]
/// Simple wrapper used when serialising to JSON.
struct IssuesOut<'a> {
    issues: &'a [Issue],
    total: usize,
}

/// Additional information to display in statistics
pub struct ScanInfo {
    pub patterns_loaded: usize,
    pub detectors_loaded: usize,
    /// Files selected for the scan, readable or not.
    pub files_queued: usize,
    pub duration_ms: u64,
    pub failed_files: usize,
}

/// Prints issues in the selected format.
///
/// # Example
/// ```
/// use reporters::{print_issues, Format, ScanInfo};
/// let info = ScanInfo {
///     patterns_loaded: 40,
///     detectors_loaded: 7,
///     files_queued: 5,
///     duration_ms: 12,
///     failed_files: 0,
/// };
/// print_issues(&[], Format::Text, Some(&info)).unwrap();
/// ```
pub fn print_issues(issues: &[Issue], fmt: Format, scan_info: Option<&ScanInfo>) -> io::Result<()> {
    let mut out = io::stdout();
    write_issues(&mut out, issues, fmt, scan_info)
}

/// Writes issues to a generic `Write`, used for tests.
pub fn write_issues<W: Write>(
    out: &mut W,
    issues: &[Issue],
    fmt: Format,
    scan_info: Option<&ScanInfo>,
) -> io::Result<()> {
    debug!(format = ?fmt, count = issues.len(), "Writing issues");
    match fmt {
        Format::Text => {
            if let Some(info) = scan_info {
                writeln!(out, "{}", scan_stats(info))?;
            }
            writeln!(out, "{}", simple_box("Results"))?;
            if issues.is_empty() {
                writeln!(out, "✔ No issues found.")?;
                return Ok(());
            }
            writeln!(out, "⚠ Found {} issue(s):\n", issues.len())?;
            for i in issues {
                writeln!(
                    out,
                    "{} {}:{}:{} {}",
                    color_severity(i.severity),
                    i.file.display(),
                    i.line,
                    i.column,
                    i.rule_id
                )?;
                writeln!(out, "    {}", i.message)?;
                if let Some(s) = &i.suggestion {
                    writeln!(out, "    • Suggestion: {s}")?;
                }
                if i.fixable == Some(true) {
                    writeln!(out, "    • Auto-fixable")?;
                }
                writeln!(out)?;
            }
            writeln!(out, "Total: {}", issues.len())?;
        }
        Format::Json => {
            let json = IssuesOut {
                issues,
                total: issues.len(),
            };
            serde_json::to_writer_pretty(&mut *out, &json)?;
            writeln!(out)?;
        }
        Format::Sarif => {
            let sarif = sarif::to_sarif(issues);
            serde_json::to_writer_pretty(&mut *out, &sarif)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

pub fn print_heatmap(heatmap: &Heatmap, fmt: SummaryFormat, top: usize) -> io::Result<()> {
    write_heatmap(&mut io::stdout(), heatmap, fmt, top)
}

/// Writes a heatmap; text output lists at most `top` files.
pub fn write_heatmap<W: Write>(
    out: &mut W,
    heatmap: &Heatmap,
    fmt: SummaryFormat,
    top: usize,
) -> io::Result<()> {
    if fmt == SummaryFormat::Json {
        serde_json::to_writer_pretty(&mut *out, heatmap)?;
        writeln!(out)?;
        return Ok(());
    }
    writeln!(out, "{}", simple_box("Risk Heatmap"))?;
    if heatmap.cancelled {
        writeln!(out, "⚠ Sweep cancelled, results are partial.\n")?;
    }
    writeln!(
        out,
        "    Files: {}   Total risk: {:.1}   Average risk: {:.1}\n",
        heatmap.total_files, heatmap.total_risk, heatmap.average_risk
    )?;
    writeln!(out, "    FILES")?;
    write!(out, "{RULE}")?;
    writeln!(out, "    Level     Score  Issues  File")?;
    write!(out, "{RULE}")?;
    for f in heatmap.files.iter().take(top) {
        writeln!(
            out,
            "    {}  {:>5.1}  {:>6}  {}",
            color_level(f.risk_level),
            f.risk_score,
            f.issue_count,
            f.file
        )?;
    }
    if heatmap.files.len() > top {
        writeln!(out, "    … {} more", heatmap.files.len() - top)?;
    }
    writeln!(out)?;
    writeln!(out, "    HOT DIRECTORIES")?;
    write!(out, "{RULE}")?;
    writeln!(out, "    Average  Files  Directory")?;
    write!(out, "{RULE}")?;
    for d in &heatmap.hot_directories {
        writeln!(
            out,
            "    {:>7.1}  {:>5}  {}",
            d.average_score, d.file_count, d.path
        )?;
    }
    Ok(())
}

pub fn print_file_risk(risk: &FileRisk, fmt: SummaryFormat) -> io::Result<()> {
    write_file_risk(&mut io::stdout(), risk, fmt)
}

pub fn write_file_risk<W: Write>(out: &mut W, risk: &FileRisk, fmt: SummaryFormat) -> io::Result<()> {
    if fmt == SummaryFormat::Json {
        serde_json::to_writer_pretty(&mut *out, risk)?;
        writeln!(out)?;
        return Ok(());
    }
    writeln!(out, "{}", simple_box(&risk.file))?;
    writeln!(
        out,
        "    {} score {:.1} ({} policy)",
        color_level(risk.risk_level),
        risk.risk_score,
        risk.policy
    )?;
    let m = &risk.metrics;
    writeln!(
        out,
        "    {} lines, complexity {}, {} dependencies, {} sensitive patterns\n",
        m.lines_of_code, m.complexity, m.dependency_count, m.sensitive_pattern_count
    )?;
    if risk.hotspots.is_empty() {
        writeln!(out, "✔ No hotspots.")?;
        return Ok(());
    }
    writeln!(out, "    HOTSPOTS")?;
    write!(out, "{RULE}")?;
    for h in &risk.hotspots {
        writeln!(out, "    line {:<5} {:>4}  {}", h.line, h.score, h.reasons.join("; "))?;
    }
    Ok(())
}

pub fn print_flow(flow: &DataFlow, fmt: FlowFormat) -> io::Result<()> {
    write_flow(&mut io::stdout(), flow, fmt)
}

/// Writes a flow graph; DOT and Mermaid reuse the graph's own exporters.
pub fn write_flow<W: Write>(out: &mut W, flow: &DataFlow, fmt: FlowFormat) -> io::Result<()> {
    match fmt {
        FlowFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, flow)?;
            writeln!(out)?;
        }
        FlowFormat::Dot => writeln!(out, "{}", flow.to_dot())?,
        FlowFormat::Mermaid => write!(out, "{}", flow.to_mermaid())?,
        FlowFormat::Text => {
            writeln!(out, "{}", simple_box("Data Flow"))?;
            if flow.is_empty() {
                writeln!(out, "✔ No sources, sinks or transforms found.")?;
                return Ok(());
            }
            writeln!(
                out,
                "    {} nodes, {} edges, risk {}\n",
                flow.nodes.len(),
                flow.edges.len(),
                color_level(flow.risk_level)
            )?;
            for n in &flow.nodes {
                writeln!(
                    out,
                    "    {:<12} {:<9} {}:{}  {}",
                    n.id,
                    n.kind.to_string(),
                    n.line,
                    n.column,
                    n.label
                )?;
            }
            if flow.tainted_paths.is_empty() {
                writeln!(out, "\n✔ No tainted paths.")?;
            } else {
                writeln!(out, "\n⚠ {} tainted path(s):", flow.tainted_paths.len())?;
                for p in &flow.tainted_paths {
                    writeln!(out, "    {}", p.join(" → "))?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests;
