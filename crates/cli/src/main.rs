//! Entry point for the command-line interface.
//! Delegates to dedicated modules for argument handling,
//! the analysis commands and output formatting.

use taintmap::args::{parse_cli, Commands, PatternsCmd};
use taintmap::config::load_config;
use taintmap::flow::run_flow;
use taintmap::heatmap::run_heatmap;
use taintmap::logging;
use taintmap::patterns::{list_patterns, verify_patterns};
use taintmap::quick::run_quick;
use taintmap::scan::run_scan;

fn main() -> anyhow::Result<()> {
    let cli = parse_cli();
    logging::init(cli.debug, cli.quiet);
    let config = load_config()?;
    match cli.command {
        Commands::Scan(args) => run_scan(args, &config, cli.quiet),
        Commands::Heatmap(args) => run_heatmap(args, &config, cli.quiet),
        Commands::Flow(args) => run_flow(args, &config),
        Commands::Quick(args) => run_quick(args, &config),
        Commands::Patterns(PatternsCmd::List { json, catalog }) => {
            list_patterns(&catalog, json, &config)
        }
        Commands::Patterns(PatternsCmd::Verify { path }) => verify_patterns(&path),
    }
}
