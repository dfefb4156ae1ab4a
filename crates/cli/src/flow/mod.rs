use anyhow::{Context, Result};
use tracing::info;

use engine::{scan_file, trace_variable};
use ir::DataFlow;
use loader::{read_source, Catalog};

use crate::args::FlowArgs;
use crate::build_catalog;
use crate::config::Config;

/// Flow of `text`, restricted to `var` when given.
pub fn file_flow(file: &str, text: &str, catalog: &Catalog, var: Option<&str>) -> DataFlow {
    match var {
        Some(name) => trace_variable(file, text, catalog, name),
        None => scan_file(file, text, catalog).flow,
    }
}

pub fn run_flow(args: FlowArgs, config: &Config) -> Result<()> {
    let text = read_source(&args.file)
        .with_context(|| format!("cannot read {} as UTF-8 text", args.file.display()))?;
    let catalog = build_catalog(&config.patterns.extra, &args.catalog.patterns)?;
    let shown = args.file.display().to_string();
    let flow = file_flow(&shown, &text, &catalog, args.var.as_deref());
    info!(
        file = %shown,
        nodes = flow.nodes.len(),
        edges = flow.edges.len(),
        paths = flow.tainted_paths.len(),
        "Flow built"
    );
    reporters::print_flow(&flow, args.format.into())?;
    Ok(())
}
