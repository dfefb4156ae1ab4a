use anyhow::{Context, Result};
use colored::*;
use std::env;
use std::path::Path;

use loader::{load_catalog, Catalog, PatternDef, PatternRole, RiskPattern};

use crate::args::CatalogArgs;
use crate::build_catalog;
use crate::config::Config;

/// Check if colored output should be used
fn use_colored_output() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    if let Ok(term) = env::var("TERM") {
        if term == "dumb" || term == "unknown" {
            return false;
        }
    }
    env::var("CI").is_err() && env::var("CONTINUOUS_INTEGRATION").is_err()
}

fn paint(text: &str, role: PatternRole) -> String {
    if !use_colored_output() {
        return text.to_string();
    }
    match role {
        PatternRole::Source => text.bright_cyan().to_string(),
        PatternRole::Sink => text.bright_red().to_string(),
        PatternRole::Transform => text.bright_green().to_string(),
        PatternRole::Generic => text.bright_yellow().to_string(),
    }
}

/// Serializable view of a compiled pattern.
fn definition(p: &RiskPattern) -> PatternDef {
    PatternDef {
        id: p.id.clone(),
        regex: p.matcher.as_str().to_string(),
        weight: p.weight,
        category: p.category.clone(),
        message: p.message.clone(),
        role: p.role,
        tier: p.tier,
        safe: p.safe,
    }
}

pub fn render_catalog(catalog: &Catalog) -> String {
    let mut out = String::new();
    for role in [
        PatternRole::Source,
        PatternRole::Sink,
        PatternRole::Transform,
        PatternRole::Generic,
    ] {
        let entries: Vec<&RiskPattern> = catalog.by_role(role).collect();
        if entries.is_empty() {
            continue;
        }
        out.push_str(&format!("{} ({})\n", paint(&format!("{role}s"), role), entries.len()));
        for p in entries {
            let safe = if p.safe { " safe" } else { "" };
            out.push_str(&format!(
                "  • {:<32} w={:<3} {:<20} {}{safe}\n",
                p.id, p.weight, p.category, p.message
            ));
        }
        out.push('\n');
    }
    out.push_str(&format!("Total: {} patterns\n", catalog.len()));
    out
}

pub fn list_patterns(catalog_args: &CatalogArgs, json: bool, config: &Config) -> Result<()> {
    let catalog = build_catalog(&config.patterns.extra, &catalog_args.patterns)?;
    if json {
        let defs: Vec<PatternDef> = catalog.patterns().iter().map(definition).collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&defs).context("failed to serialize catalog")?
        );
    } else {
        print!("{}", render_catalog(&catalog));
    }
    Ok(())
}

pub fn verify_patterns(path: &Path) -> Result<()> {
    println!("Verifying patterns in {}", path.display());
    let catalog = load_catalog(&[path.to_path_buf()])
        .with_context(|| format!("invalid pattern catalog at {}", path.display()))?;
    let added = catalog.len() - Catalog::builtin().len();
    let msg = format!("✔ {added} pattern(s) valid");
    if use_colored_output() {
        println!("{}", msg.bright_green().bold());
    } else {
        println!("{msg}");
    }
    Ok(())
}
