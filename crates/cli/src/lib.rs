//! Common utilities for the command line interface.
use anyhow::{bail, Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use loader::{collect_source_files, load_catalog, Catalog};

pub mod args;
pub mod config;
pub mod flow;
pub mod heatmap;
pub mod logging;
pub mod output;
pub mod patterns;
pub mod quick;
pub mod scan;
pub mod ui;

/// Default maximum size: 5 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Converts a basic glob pattern to a regular expression.
///
/// # Example
///
/// ```
/// use taintmap::glob_to_regex;
/// let re = glob_to_regex("src/*.js").unwrap();
/// assert!(re.is_match("src/main.js"));
/// assert!(!re.is_match("src/lib/main.js"));
/// ```
pub fn glob_to_regex(pat: &str) -> Result<Regex, regex::Error> {
    if pat.contains('[') || pat.contains(']') {
        // character classes are not supported; surface a regex error
        return Regex::new("[");
    }
    let mut regex = String::from("^");
    let mut chars = pat.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    if chars.peek() == Some(&'/') {
                        // `**/` also matches no directory at all
                        chars.next();
                        regex.push_str("(?:.*/)?");
                    } else {
                        regex.push_str(".*");
                    }
                } else {
                    regex.push_str("[^/]*");
                }
            }
            '?' => regex.push('.'),
            '.' => regex.push_str("\\."),
            '(' | ')' | '+' | '|' | '^' | '$' | '{' | '}' | '\\' => {
                regex.push('\\');
                regex.push(c);
            }
            _ => regex.push(c),
        }
    }
    regex.push('$');
    Regex::new(&regex)
}

/// Transforms a glob-style exclusion string into [`Regex`].
/// Accepts trailing slashes and expands to `**` automatically.
///
/// # Example
///
/// ```
/// use taintmap::parse_exclude;
/// let re = parse_exclude("dist/").unwrap();
/// assert!(re.is_match("dist/bundle.js"));
/// ```
pub fn parse_exclude(s: &str) -> Result<Regex, String> {
    let glob_str = if s.ends_with('/') {
        format!("{s}**")
    } else {
        s.to_string()
    };
    glob_to_regex(&glob_str).map_err(|e| e.to_string())
}

/// Directories skipped unless `--no-default-exclude` is given.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &["node_modules", ".git", "target", "dist", "build", "out"];

/// Default exclusion patterns.
pub fn default_excludes() -> Vec<Regex> {
    DEFAULT_EXCLUDED_DIRS
        .iter()
        .filter_map(|d| parse_exclude(&format!("**/{d}/**")).ok())
        .collect()
}

/// Reads `.gitignore` and `.taintmapignore` from `root` and converts their
/// valid entries to regular expressions.
pub fn load_ignore_patterns(root: &Path) -> Vec<Regex> {
    let mut patterns = Vec::new();
    for name in [".gitignore", ".taintmapignore"] {
        let Ok(content) = fs::read_to_string(root.join(name)) else {
            continue;
        };
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let mut pat = line.trim_start_matches('/').to_string();
            if !pat.starts_with("**/") {
                pat = format!("**/{pat}");
            }
            match parse_exclude(&pat) {
                Ok(re) => patterns.push(re),
                Err(e) => debug!(file = name, pattern = line, error = %e, "Ignore pattern skipped"),
            }
        }
    }
    patterns
}

/// Indicates whether a path should be omitted according to patterns or size.
/// Separators are normalised to support Windows and Unix. Directories
/// also match patterns written for their contents.
///
/// # Example
///
/// ```
/// use taintmap::{is_excluded, parse_exclude};
/// use std::path::Path;
/// let patterns = vec![parse_exclude("**/vendor/**").unwrap()];
/// assert!(is_excluded(Path::new("/repo/vendor/lib.js"), &patterns, 0));
/// assert!(!is_excluded(Path::new("/repo/src/lib.js"), &patterns, 0));
/// ```
pub fn is_excluded(path: &Path, patterns: &[Regex], max_file_size: u64) -> bool {
    let path_str = path.to_string_lossy().replace('\\', "/");
    let as_dir = format!("{path_str}/");
    if patterns
        .iter()
        .any(|re| re.is_match(&path_str) || re.is_match(&as_dir))
    {
        return true;
    }
    if max_file_size > 0 {
        if let Ok(meta) = fs::metadata(path) {
            if meta.is_file() && meta.len() > max_file_size {
                return true;
            }
        }
    }
    false
}

/// Source files to analyze under `root`; a file argument is returned as is.
///
/// Exclusion patterns see paths relative to `root`, so directories above
/// the root never exclude anything.
pub fn collect_inputs(root: &Path, patterns: &[Regex], max_file_size: u64) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        bail!("path not found: {}", root.display());
    }
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    let excluded = |p: &Path| {
        let rel = p.strip_prefix(root).unwrap_or(p);
        !rel.as_os_str().is_empty() && is_excluded(rel, patterns, 0)
    };
    let files = collect_source_files(root, &excluded, max_file_size)
        .with_context(|| format!("failed to walk {}", root.display()))?;
    info!(root = %root.display(), count = files.len(), "Files queued");
    Ok(files)
}

/// Exclusion patterns for a scan of `root`: CLI and config patterns, the
/// defaults unless disabled, and the root's ignore files.
pub fn exclusion_patterns(
    root: &Path,
    cli: &[Regex],
    configured: &[String],
    no_default_exclude: bool,
) -> Result<Vec<Regex>> {
    let mut patterns = cli.to_vec();
    for pat in configured {
        let re = parse_exclude(pat)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("invalid exclude pattern '{pat}' in config"))?;
        patterns.push(re);
    }
    if !no_default_exclude {
        patterns.extend(default_excludes());
    }
    let ignore_root = if root.is_file() {
        root.parent().unwrap_or(root)
    } else {
        root
    };
    patterns.extend(load_ignore_patterns(ignore_root));
    Ok(patterns)
}

/// Built-in patterns plus the configured and command-line pattern files.
pub fn build_catalog(configured: &[PathBuf], cli: &[PathBuf]) -> Result<Catalog> {
    let extra: Vec<PathBuf> = configured.iter().chain(cli).cloned().collect();
    let catalog = load_catalog(&extra)?;
    info!(patterns = catalog.len(), extra_files = extra.len(), "Patterns loaded");
    Ok(catalog)
}
