use anyhow::{Context, Result};
use std::thread;
use std::time::Duration;
use tracing::info;

use engine::{sweep_workspace, CancellationToken, NoProgress, SweepConfig, SweepProgress};

use crate::args::HeatmapArgs;
use crate::config::Config;
use crate::output::SummaryFormat;
use crate::ui::{self, ProgressBar};
use crate::{build_catalog, collect_inputs, exclusion_patterns};

/// Sweep settings from the flags, falling back to the config file.
pub fn sweep_config(args: &HeatmapArgs, config: &Config) -> SweepConfig {
    SweepConfig {
        threads: args.threads.unwrap_or(config.scan.threads),
        file_timeout: args
            .timeout_file_ms
            .or(config.scan.file_timeout_ms)
            .map(Duration::from_millis),
        hotspot_limit: config.report.hotspot_limit,
        directory_limit: config.report.directory_limit,
        policy: config.policy.heatmap.clone(),
    }
}

/// Cancels `token` once `deadline` has elapsed.
fn arm_deadline(token: &CancellationToken, deadline: Duration) {
    let token = token.clone();
    thread::spawn(move || {
        thread::sleep(deadline);
        if !token.is_cancelled() {
            info!(deadline_ms = deadline.as_millis(), "Deadline reached, cancelling sweep");
            token.cancel();
        }
    });
}

pub fn run_heatmap(args: HeatmapArgs, config: &Config, quiet: bool) -> Result<()> {
    if args.format == SummaryFormat::Text && !quiet {
        ui::print_header();
    }
    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("path not found: {}", args.path.display()))?;
    info!(target = %root.display(), "Sweep started");

    let patterns = exclusion_patterns(
        &root,
        &args.walk.exclude,
        &config.scan.exclude,
        args.walk.no_default_exclude,
    )?;
    let max_file_size = args.walk.max_file_size.unwrap_or(config.scan.max_file_size);
    let files = collect_inputs(&root, &patterns, max_file_size)?;
    let catalog = build_catalog(&config.patterns.extra, &args.catalog.patterns)?;
    let sweep = sweep_config(&args, config);
    let sweep_root = if root.is_file() {
        root.parent().unwrap_or(&root).to_path_buf()
    } else {
        root.clone()
    };

    let token = CancellationToken::new();
    if let Some(ms) = args.deadline_ms {
        arm_deadline(&token, Duration::from_millis(ms));
    }
    let bar = if quiet { None } else { ProgressBar::new(files.len()) };
    let progress: &dyn SweepProgress = match &bar {
        Some(b) => b,
        None => &NoProgress,
    };
    let heatmap = sweep_workspace(&sweep_root, &files, &catalog, &sweep, &token, progress);
    if let Some(b) = &bar {
        b.finish();
    }

    let top = args.top.unwrap_or(config.report.top);
    reporters::print_heatmap(&heatmap, args.format.into(), top)?;
    info!(
        files = heatmap.total_files,
        average_risk = heatmap.average_risk,
        cancelled = heatmap.cancelled,
        "Sweep completed"
    );
    Ok(())
}
