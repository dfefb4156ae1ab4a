//! Diagnostics for editors and CI: an optional external engine, with the
//! built-in detectors and catalog hits as fallback.

use ir::{Issue, IssueOrigin, Severity};
use loader::{Catalog, PatternRole};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use crate::detectors::{issue_id, run_detectors};
use crate::scanner::scan_roles;

/// An external scanning engine.
pub trait IssueProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Issues for `path`, or `None` when the engine cannot be reached.
    fn issues(&self, path: &Path, text: &str) -> Option<Vec<Issue>>;
}

/// Sink and generic catalog hits as issues.
pub fn pattern_issues(path: &Path, text: &str, catalog: &Catalog) -> Vec<Issue> {
    scan_roles(text, catalog, &[PatternRole::Sink, PatternRole::Generic])
        .into_iter()
        .map(|m| Issue {
            id: issue_id(&m.pattern.id, path, m.line, m.column),
            file: path.to_path_buf(),
            line: m.line,
            column: m.column,
            severity: Severity::from_weight(m.pattern.weight),
            rule_id: m.pattern.id.clone(),
            message: m.pattern.message.clone(),
            suggestion: None,
            fixable: None,
            origin: IssueOrigin::Pattern,
        })
        .collect()
}

/// Issues of one file, ordered by position then rule id, without
/// duplicate ids.
pub fn collect_issues(
    provider: Option<&dyn IssueProvider>,
    path: &Path,
    text: &str,
    catalog: &Catalog,
) -> Vec<Issue> {
    let external = provider.and_then(|p| {
        let res = p.issues(path, text);
        if res.is_none() {
            debug!(provider = p.name(), path = %path.display(), "Provider unavailable, using built-in detectors");
        }
        res
    });
    let mut issues = match external {
        Some(found) => found,
        None => {
            let mut found = run_detectors(path, text);
            found.extend(pattern_issues(path, text, catalog));
            found
        }
    };
    issues.sort_by(|a, b| {
        (a.line, a.column, &a.rule_id).cmp(&(b.line, b.column, &b.rule_id))
    });
    let mut seen = HashSet::new();
    issues.retain(|i| seen.insert(i.id.clone()));
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<Vec<Issue>>);

    impl IssueProvider for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn issues(&self, _path: &Path, _text: &str) -> Option<Vec<Issue>> {
            self.0.clone()
        }
    }

    fn external(line: usize) -> Issue {
        Issue {
            id: format!("ext-{line}"),
            file: "a.js".into(),
            line,
            column: 1,
            severity: Severity::Info,
            rule_id: "ext".into(),
            message: "external".into(),
            suggestion: None,
            fixable: None,
            origin: IssueOrigin::External,
        }
    }

    #[test]
    fn provider_answer_replaces_builtin() {
        let provider = Fixed(Some(vec![external(3), external(1), external(1)]));
        let issues = collect_issues(
            Some(&provider),
            Path::new("a.js"),
            "eval(x)",
            Catalog::builtin(),
        );
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.origin == IssueOrigin::External));
        assert_eq!(issues[0].line, 1);
    }

    #[test]
    fn unreachable_provider_falls_back() {
        let provider = Fixed(None);
        let issues = collect_issues(
            Some(&provider),
            Path::new("a.js"),
            "eval(x)",
            Catalog::builtin(),
        );
        let origins: HashSet<_> = issues.iter().map(|i| i.origin as u8).collect();
        assert!(issues.iter().any(|i| i.rule_id == "unsafe-eval"));
        assert!(issues.iter().any(|i| i.rule_id == "sink.eval"));
        assert_eq!(origins.len(), 2);
    }

    #[test]
    fn sources_and_transforms_are_not_issues() {
        let issues = pattern_issues(
            Path::new("a.js"),
            "const x = req.body.name;\nencodeURIComponent(x);",
            Catalog::builtin(),
        );
        assert!(issues.is_empty());
    }
}
