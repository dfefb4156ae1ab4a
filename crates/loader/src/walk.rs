use std::collections::{HashSet, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extensions treated as analysable source text.
pub const SOURCE_EXTENSIONS: &[&str] = &[
    "js", "jsx", "mjs", "cjs", "ts", "tsx", "vue", "svelte", "html", "py", "rb", "php", "java",
    "go", "cs", "kt", "rs",
];

/// Turns a permission error into `None` so the walk can carry on.
fn allow_denied<T>(res: io::Result<T>, path: &Path) -> io::Result<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            debug!(path = %path.display(), "Permission denied");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Breadth-first walk calling `callback` for every regular file under
/// `path`. Symlinks are never followed and unreadable entries are skipped.
pub fn visit<F, C>(path: &Path, excludes: &F, callback: &mut C) -> anyhow::Result<()>
where
    F: Fn(&Path) -> bool,
    C: FnMut(&Path) -> anyhow::Result<()>,
{
    let mut pending: VecDeque<PathBuf> = VecDeque::from([path.to_path_buf()]);
    let mut visited: HashSet<PathBuf> = HashSet::new();

    while let Some(current) = pending.pop_front() {
        if !visited.insert(current.clone()) {
            continue;
        }
        if excludes(&current) {
            debug!(path = %current.display(), "Path excluded");
            continue;
        }
        let Some(meta) = allow_denied(fs::symlink_metadata(&current), &current)? else {
            continue;
        };
        let file_type = meta.file_type();
        if file_type.is_symlink() {
            debug!(path = %current.display(), "Symlink skipped");
        } else if file_type.is_file() {
            callback(&current)?;
        } else if file_type.is_dir() {
            let Some(entries) = allow_denied(fs::read_dir(&current), &current)? else {
                continue;
            };
            let mut children = Vec::new();
            for entry in entries {
                if let Some(entry) = allow_denied(entry, &current)? {
                    children.push(entry.path());
                }
            }
            // read_dir order is platform dependent
            children.sort();
            pending.extend(children);
        }
    }

    Ok(())
}

/// Whether `path` carries one of [`SOURCE_EXTENSIONS`].
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// Lists the source files under `root` that `excludes` does not reject,
/// sorted by path. `max_file_size == 0` disables the size limit.
pub fn collect_source_files<F>(
    root: &Path,
    excludes: &F,
    max_file_size: u64,
) -> anyhow::Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    let mut files = Vec::new();
    visit(root, excludes, &mut |p| {
        if !is_source_file(p) {
            return Ok(());
        }
        if max_file_size > 0 {
            if let Ok(meta) = fs::metadata(p) {
                if meta.len() > max_file_size {
                    debug!(path = %p.display(), size = meta.len(), "File too large");
                    return Ok(());
                }
            }
        }
        files.push(p.to_path_buf());
        Ok(())
    })?;
    files.sort();
    debug!(root = %root.display(), count = files.len(), "Source files collected");
    Ok(files)
}
