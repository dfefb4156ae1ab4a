//! Workspace sweep: maps every file to a [`FileRisk`], then folds the
//! results into a [`Heatmap`] with per-directory averages.

use ir::{DirectoryRisk, FileRisk, Heatmap};
use loader::Catalog;
use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::risk::{analyze_path_risk, HeatmapPolicy, DEFAULT_HOTSPOT_LIMIT};

/// Number of directories kept in [`Heatmap::hot_directories`] by default.
pub const DEFAULT_DIRECTORY_LIMIT: usize = 10;

/// Cooperative stop signal shared between a sweep and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Notified after every file the sweep has finished with, analyzed or
/// skipped.
pub trait SweepProgress: Send + Sync {
    fn file_done(&self, processed: usize, total: usize, path: &Path);
}

pub struct NoProgress;

impl SweepProgress for NoProgress {
    fn file_done(&self, _processed: usize, _total: usize, _path: &Path) {}
}

#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// 1 runs on the calling thread, 0 uses rayon's default size.
    pub threads: usize,
    pub file_timeout: Option<Duration>,
    pub hotspot_limit: usize,
    pub directory_limit: usize,
    pub policy: HeatmapPolicy,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            file_timeout: None,
            hotspot_limit: DEFAULT_HOTSPOT_LIMIT,
            directory_limit: DEFAULT_DIRECTORY_LIMIT,
            policy: HeatmapPolicy::default(),
        }
    }
}

/// Runs `job` on `pool` and waits at most `limit` once it has started.
///
/// Time spent queued behind other jobs does not count against `limit`.
/// Returns `None` on timeout; the job keeps running and its result is
/// dropped.
pub fn run_with_timeout<T, F>(pool: &ThreadPool, limit: Duration, job: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (started_tx, started_rx) = mpsc::channel();
    let (done_tx, done_rx) = mpsc::channel();
    pool.spawn(move || {
        let _ = started_tx.send(());
        let _ = done_tx.send(job());
    });
    started_rx.recv().ok()?;
    done_rx.recv_timeout(limit).ok()
}

/// Pool running timed file analyses, one thread per sweep worker.
fn timeout_pool(cfg: &SweepConfig) -> Option<ThreadPool> {
    cfg.file_timeout?;
    let workers = match cfg.threads {
        0 => rayon::current_num_threads(),
        n => n,
    };
    match ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            warn!(error = %e, "Timeout pool unavailable, analyzing without timeout");
            None
        }
    }
}

fn analyze_one(
    root: &Path,
    path: &Path,
    catalog: &Catalog,
    cfg: &SweepConfig,
    timeout_pool: Option<&ThreadPool>,
) -> Option<FileRisk> {
    let (Some(limit), Some(pool)) = (cfg.file_timeout, timeout_pool) else {
        return analyze_path_risk(root, path, catalog, &cfg.policy, cfg.hotspot_limit);
    };
    let root_owned = root.to_path_buf();
    let path_owned = path.to_path_buf();
    let catalog = catalog.clone();
    let policy = cfg.policy.clone();
    let hotspot_limit = cfg.hotspot_limit;
    let outcome = run_with_timeout(pool, limit, move || {
        analyze_path_risk(&root_owned, &path_owned, &catalog, &policy, hotspot_limit)
    });
    match outcome {
        Some(res) => res,
        None => {
            warn!(
                path = %path.display(),
                timeout_ms = limit.as_millis(),
                "File analysis timed out, skipping"
            );
            None
        }
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn parent_dir(file: &str) -> &str {
    match file.rsplit_once('/') {
        Some(("", _)) => "/",
        Some((dir, _)) => dir,
        None => ".",
    }
}

/// Average normalized score per parent directory, highest first.
///
/// The result does not depend on the order of `files`.
pub fn aggregate_directories(files: &[FileRisk], limit: usize) -> Vec<DirectoryRisk> {
    let mut sorted: Vec<&FileRisk> = files.iter().collect();
    sorted.sort_by(|a, b| a.file.cmp(&b.file));
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for f in sorted {
        let entry = groups.entry(parent_dir(&f.file)).or_insert((0.0, 0));
        entry.0 += f.risk_score;
        entry.1 += 1;
    }
    let mut dirs: Vec<DirectoryRisk> = groups
        .into_iter()
        .map(|(path, (sum, count))| DirectoryRisk {
            path: path.to_string(),
            average_score: sum / count as f64,
            file_count: count,
        })
        .collect();
    dirs.sort_by(|a, b| {
        b.average_score
            .total_cmp(&a.average_score)
            .then_with(|| a.path.cmp(&b.path))
    });
    dirs.truncate(limit);
    dirs
}

/// Ranks already analyzed files.
pub fn build_heatmap(mut files: Vec<FileRisk>, directory_limit: usize, cancelled: bool) -> Heatmap {
    files.sort_by(|a, b| {
        b.risk_score
            .total_cmp(&a.risk_score)
            .then_with(|| a.file.cmp(&b.file))
    });
    let total_files = files.len();
    let total_risk: f64 = files.iter().map(|f| f.risk_score).sum();
    let average_risk = if total_files == 0 {
        0.0
    } else {
        total_risk / total_files as f64
    };
    let hot_directories = aggregate_directories(&files, directory_limit);
    Heatmap {
        files,
        hot_directories,
        total_files,
        total_risk,
        average_risk,
        timestamp: unix_millis(),
        cancelled,
    }
}

/// Analyzes `files` under `root` and builds the heatmap.
///
/// Cancellation is checked before each file. Files already analyzed when
/// the token fires are kept and the heatmap is marked `cancelled`.
/// Unreadable and timed-out files are left out. With a file timeout,
/// the clock of each file starts when its analysis starts.
pub fn sweep_workspace(
    root: &Path,
    files: &[PathBuf],
    catalog: &Catalog,
    cfg: &SweepConfig,
    cancel: &CancellationToken,
    progress: &dyn SweepProgress,
) -> Heatmap {
    let total = files.len();
    let processed = AtomicUsize::new(0);
    let timeout_pool = timeout_pool(cfg);
    let step = |path: &PathBuf| -> Option<FileRisk> {
        if cancel.is_cancelled() {
            return None;
        }
        let res = analyze_one(root, path, catalog, cfg, timeout_pool.as_ref());
        let done = processed.fetch_add(1, Ordering::SeqCst) + 1;
        progress.file_done(done, total, path);
        res
    };

    let results: Vec<FileRisk> = if cfg.threads == 1 {
        let mut out = Vec::new();
        for path in files {
            if cancel.is_cancelled() {
                break;
            }
            out.extend(step(path));
        }
        out
    } else {
        let mut builder = ThreadPoolBuilder::new();
        if cfg.threads > 0 {
            builder = builder.num_threads(cfg.threads);
        }
        match builder.build() {
            Ok(pool) => pool.install(|| files.par_iter().filter_map(&step).collect()),
            Err(e) => {
                warn!(error = %e, "Thread pool unavailable, sweeping sequentially");
                files.iter().filter_map(&step).collect()
            }
        }
    };

    let cancelled = cancel.is_cancelled();
    let done = processed.load(Ordering::SeqCst);
    if cancelled {
        info!(processed = done, total, "Sweep cancelled");
    } else {
        debug!(processed = done, analyzed = results.len(), "Sweep finished");
    }
    build_heatmap(results, cfg.directory_limit, cancelled)
}
