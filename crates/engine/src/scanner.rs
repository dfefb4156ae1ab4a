//! Applies a pattern catalog to one file's text.

use loader::{Catalog, PatternRole, RiskPattern};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
/// One catalog hit.
pub struct Match<'c> {
    /// 1-based line number.
    pub line: usize,
    /// 1-based byte column within the line.
    pub column: usize,
    /// Byte offset of the match in the scanned text.
    pub offset: usize,
    pub matched_text: String,
    pub pattern: &'c RiskPattern,
}

/// Byte offsets of every line start, for offset to line/column lookups.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    fn line_col(&self, pos: usize) -> (usize, usize) {
        // number of line starts at or before `pos` == number of '\n' before it + 1
        let line = self.starts.partition_point(|&s| s <= pos);
        let column = pos - self.starts[line - 1] + 1;
        (line, column)
    }
}

/// Every non-overlapping match of every catalog entry, in catalog order and
/// then text order.
pub fn scan_matches<'c>(text: &str, catalog: &'c Catalog) -> Vec<Match<'c>> {
    scan_filtered(text, catalog, |_| true)
}

/// Same as [`scan_matches`] restricted to the given roles.
pub fn scan_roles<'c>(text: &str, catalog: &'c Catalog, roles: &[PatternRole]) -> Vec<Match<'c>> {
    scan_filtered(text, catalog, |p| roles.contains(&p.role))
}

fn scan_filtered<'c, F>(text: &str, catalog: &'c Catalog, keep: F) -> Vec<Match<'c>>
where
    F: Fn(&RiskPattern) -> bool,
{
    let index = LineIndex::new(text);
    let mut out = Vec::new();
    for pattern in catalog.patterns().iter().filter(|p| keep(p)) {
        for m in pattern.matcher.find_iter(text) {
            let (line, column) = index.line_col(m.start());
            out.push(Match {
                line,
                column,
                offset: m.start(),
                matched_text: m.as_str().to_string(),
                pattern,
            });
        }
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Aggregated weight of one line.
pub struct LineScore {
    pub score: u32,
    /// Distinct pattern messages, in first-hit order.
    pub reasons: Vec<String>,
}

/// Per-line running sum of pattern weights.
pub fn line_scores(matches: &[Match<'_>]) -> BTreeMap<usize, LineScore> {
    let mut lines: BTreeMap<usize, LineScore> = BTreeMap::new();
    for m in matches {
        let entry = lines.entry(m.line).or_default();
        entry.score = entry.score.saturating_add(m.pattern.weight);
        if !entry.reasons.iter().any(|r| r == &m.pattern.message) {
            entry.reasons.push(m.pattern.message.clone());
        }
    }
    lines
}

/// Sum of the weights of all matches.
pub fn total_score(matches: &[Match<'_>]) -> u32 {
    matches
        .iter()
        .fold(0u32, |acc, m| acc.saturating_add(m.pattern.weight))
}
