use anyhow::{Context, Result};
use tracing::info;

use engine::analyze_file_risk;

use crate::args::QuickArgs;
use crate::build_catalog;
use crate::config::Config;

/// Single-file check with the configured quick-check policy.
pub fn run_quick(args: QuickArgs, config: &Config) -> Result<()> {
    let text = loader::read_source(&args.file)
        .with_context(|| format!("cannot read {} as UTF-8 text", args.file.display()))?;
    let catalog = build_catalog(&config.patterns.extra, &args.catalog.patterns)?;
    let shown = args.file.display().to_string();
    let risk = analyze_file_risk(
        &shown,
        &text,
        &catalog,
        &config.policy.quick,
        config.report.hotspot_limit,
    );
    info!(file = %shown, score = risk.risk_score, level = %risk.risk_level, "Quick check done");
    reporters::print_file_risk(&risk, args.format.into())?;
    Ok(())
}

