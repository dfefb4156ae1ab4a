//! Line-oriented built-in rules that run without any external engine.

use ir::{Issue, IssueOrigin, Severity};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

pub struct Detector {
    pub rule_id: &'static str,
    pub regex: Regex,
    pub severity: Severity,
    pub message: &'static str,
    pub suggestion: Option<&'static str>,
    pub fixable: Option<bool>,
}

static DETECTORS: OnceLock<Vec<Detector>> = OnceLock::new();

fn detector(
    rule_id: &'static str,
    re: &str,
    severity: Severity,
    message: &'static str,
    suggestion: Option<&'static str>,
    fixable: Option<bool>,
) -> Detector {
    Detector {
        rule_id,
        regex: Regex::new(re).expect("built-in detector regex"),
        severity,
        message,
        suggestion,
        fixable,
    }
}

/// The built-in rule table, compiled on first use.
pub fn detectors() -> &'static [Detector] {
    DETECTORS.get_or_init(|| {
        vec![
            detector(
                "empty-function",
                r"\bfunction\b[^(]*\([^)]*\)\s*\{\s*\}|\([^)]*\)\s*=>\s*\{\s*\}",
                Severity::Low,
                "Empty function body",
                Some("Implement the function or remove it"),
                Some(false),
            ),
            detector(
                "hardcoded-secret",
                r#"(?i)\b(?:password|passwd|secret|api[_-]?key|token)\b\s*[:=]\s*["'][^"']{4,}["']"#,
                Severity::High,
                "Hardcoded credential",
                Some("Load secrets from the environment or a secret store"),
                Some(false),
            ),
            detector(
                "unsafe-eval",
                r"\beval\s*\(|\bnew\s+Function\s*\(",
                Severity::Critical,
                "Dynamic code evaluation",
                Some("Avoid eval; parse data with JSON.parse or use a lookup table"),
                Some(false),
            ),
            detector(
                "unsafe-inner-html",
                r"\.(?:inner|outer)HTML\s*=(?:[^=]|$)",
                Severity::High,
                "Assignment to innerHTML/outerHTML",
                Some("Use textContent or sanitize the markup first"),
                Some(false),
            ),
            detector(
                "suspicious-import",
                r#"(?:\brequire\s*\(\s*|\bimport\b[^'"]*|\bfrom\s+)['"][^'"]*(?:crypto-js-fork|-malicious|evil|backdoor)[^'"]*['"]"#,
                Severity::High,
                "Import of a suspicious package",
                Some("Verify the package name and its publisher"),
                Some(false),
            ),
            detector(
                "debugger-statement",
                r"\bdebugger\s*;",
                Severity::Medium,
                "Debugger statement left in code",
                Some("Remove the debugger statement"),
                Some(true),
            ),
            detector(
                "console-log",
                r"\bconsole\.log\s*\(",
                Severity::Low,
                "Console logging",
                Some("Remove it or use a logger"),
                Some(true),
            ),
        ]
    })
}

/// Stable issue identifier for a rule hit at a location.
pub fn issue_id(rule_id: &str, file: &Path, line: usize, column: usize) -> String {
    blake3::hash(format!("{}:{}:{}:{}", rule_id, file.display(), line, column).as_bytes())
        .to_hex()
        .to_string()
}

/// Runs every built-in detector over `text`, one line at a time.
pub fn run_detectors(path: &Path, text: &str) -> Vec<Issue> {
    let mut out = Vec::new();
    for (idx, line_text) in text.lines().enumerate() {
        let line = idx + 1;
        for d in detectors() {
            for m in d.regex.find_iter(line_text) {
                let column = m.start() + 1;
                out.push(Issue {
                    id: issue_id(d.rule_id, path, line, column),
                    file: path.to_path_buf(),
                    line,
                    column,
                    severity: d.severity,
                    rule_id: d.rule_id.to_string(),
                    message: d.message.to_string(),
                    suggestion: d.suggestion.map(str::to_string),
                    fixable: d.fixable,
                    origin: IssueOrigin::Builtin,
                });
            }
        }
    }
    out
}
