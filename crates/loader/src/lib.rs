//! Loads the risk pattern catalog and discovers the source files of a
//! workspace. Everything the engine reads from disk goes through here.

use std::fs;
use std::path::Path;
use tracing::debug;

mod catalog;
pub use catalog::{load_catalog, parse_patterns, read_pattern_file, Catalog, RiskPattern};
pub use patterns::{PatternDef, PatternRole, RiskTier};

mod walk;
pub use walk::{collect_source_files, is_source_file, visit, SOURCE_EXTENSIONS};

/// Reads a file as UTF-8 text.
///
/// Unreadable or undecodable files yield `None`; callers skip them.
pub fn read_source(path: &Path) -> Option<String> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "File unreadable");
            return None;
        }
    };
    match String::from_utf8(bytes) {
        Ok(s) => Some(s),
        Err(_) => {
            debug!(path = %path.display(), "File is not valid UTF-8");
            None
        }
    }
}

/// Path of `path` relative to `root`, with `/` separators.
///
/// Paths outside `root` are returned unchanged.
pub fn relative_path(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let s = rel.to_string_lossy().replace('\\', "/");
    if s.is_empty() {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        s
    }
}
