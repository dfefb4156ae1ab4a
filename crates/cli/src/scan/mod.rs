use anyhow::{Context, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use engine::{collect_issues, detectors};
use ir::Issue;
use loader::{read_source, relative_path, Catalog};
use reporters::ScanInfo;

use crate::args::ScanArgs;
use crate::config::Config;
use crate::output::Format;
use crate::{build_catalog, collect_inputs, exclusion_patterns, ui};

/// Path shown for `file`: relative to a directory root, as given otherwise.
fn display_path(root: &Path, file: &Path) -> PathBuf {
    if root.is_dir() {
        PathBuf::from(relative_path(root, file))
    } else {
        file.to_path_buf()
    }
}

/// Issues of every file, in file order; unreadable files are counted.
pub fn scan_files(root: &Path, files: &[PathBuf], catalog: &Catalog) -> (Vec<Issue>, usize) {
    let per_file: Vec<Option<Vec<Issue>>> = files
        .par_iter()
        .map(|file| {
            let text = read_source(file)?;
            let shown = display_path(root, file);
            let issues = collect_issues(None, &shown, &text, catalog);
            debug!(file = %shown.display(), issues = issues.len(), "File scanned");
            Some(issues)
        })
        .collect();
    let failed = per_file.iter().filter(|r| r.is_none()).count();
    (per_file.into_iter().flatten().flatten().collect(), failed)
}

pub fn run_scan(args: ScanArgs, config: &Config, quiet: bool) -> Result<()> {
    let start = Instant::now();
    if args.format == Format::Text && !quiet {
        ui::print_header();
    }
    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("path not found: {}", args.path.display()))?;
    info!(target = %root.display(), "Scan started");

    let patterns = exclusion_patterns(
        &root,
        &args.walk.exclude,
        &config.scan.exclude,
        args.walk.no_default_exclude,
    )?;
    let max_file_size = args.walk.max_file_size.unwrap_or(config.scan.max_file_size);
    let files = collect_inputs(&root, &patterns, max_file_size)?;
    let catalog = build_catalog(&config.patterns.extra, &args.catalog.patterns)?;

    let (issues, failed) = scan_files(&root, &files, &catalog);
    let info = ScanInfo {
        patterns_loaded: catalog.len(),
        detectors_loaded: detectors::detectors().len(),
        files_queued: files.len(),
        duration_ms: start.elapsed().as_millis() as u64,
        failed_files: failed,
    };
    let scan_info = (args.format == Format::Text).then_some(&info);
    reporters::print_issues(&issues, args.format.into(), scan_info)?;

    info!(issues = issues.len(), failed_files = failed, "Scan completed");
    if let Some(threshold) = args.fail_on {
        if issues.iter().any(|i| i.severity >= threshold) {
            std::process::exit(1);
        }
    }
    Ok(())
}
