use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use engine::{HeatmapPolicy, QuickCheckPolicy, DEFAULT_DIRECTORY_LIMIT, DEFAULT_HOTSPOT_LIMIT};

use crate::DEFAULT_MAX_FILE_SIZE;

/// Overrides the location of `config.toml`.
pub const CONFIG_ENV: &str = "TAINTMAP_CONFIG";

#[cfg(windows)]
pub fn config_dir() -> PathBuf {
    std::env::var("APPDATA")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("taintmap")
}

#[cfg(not(windows))]
pub fn config_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".config")
        .join("taintmap")
}

pub fn config_file_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| config_dir().join("config.toml"))
}

fn default_max_file_size() -> u64 {
    DEFAULT_MAX_FILE_SIZE
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Glob patterns added to the command-line `--exclude` list.
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// 0 lets the sweep pick the thread count.
    #[serde(default)]
    pub threads: usize,
    #[serde(default)]
    pub file_timeout_ms: Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            max_file_size: default_max_file_size(),
            threads: 0,
            file_timeout_ms: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct PatternsConfig {
    /// Pattern files or directories loaded after the built-in catalog.
    #[serde(default)]
    pub extra: Vec<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct PolicyConfig {
    #[serde(default)]
    pub heatmap: HeatmapPolicy,
    #[serde(default)]
    pub quick: QuickCheckPolicy,
}

fn default_hotspot_limit() -> usize {
    DEFAULT_HOTSPOT_LIMIT
}

fn default_directory_limit() -> usize {
    DEFAULT_DIRECTORY_LIMIT
}

fn default_top() -> usize {
    20
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_hotspot_limit")]
    pub hotspot_limit: usize,
    #[serde(default = "default_directory_limit")]
    pub directory_limit: usize,
    /// Files listed by the text heatmap.
    #[serde(default = "default_top")]
    pub top: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            hotspot_limit: default_hotspot_limit(),
            directory_limit: default_directory_limit(),
            top: default_top(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub patterns: PatternsConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl Config {
    fn validate(&self) -> Result<()> {
        self.policy
            .heatmap
            .thresholds
            .validate()
            .map_err(anyhow::Error::msg)
            .context("invalid [policy.heatmap]")?;
        self.policy
            .quick
            .thresholds
            .validate()
            .map_err(anyhow::Error::msg)
            .context("invalid [policy.quick]")?;
        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("failed to parse config")?;
    config.validate()?;
    Ok(config)
}

pub fn load_config() -> Result<Config> {
    let path = config_file_path();
    if path.exists() {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        parse_config(&content).with_context(|| format!("in {}", path.display()))
    } else {
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let c = parse_config("").unwrap();
        assert_eq!(c.scan.max_file_size, DEFAULT_MAX_FILE_SIZE);
        assert_eq!(c.report.hotspot_limit, 10);
        assert_eq!(c.report.directory_limit, 10);
        assert_eq!(c.policy.heatmap, HeatmapPolicy::default());
        assert!(c.patterns.extra.is_empty());
    }

    #[test]
    fn sections_override_defaults() {
        let c = parse_config(
            r#"
[scan]
exclude = ["vendor/"]
threads = 2
file_timeout_ms = 500

[patterns]
extra = ["team-patterns.yaml"]

[policy.heatmap]
divisor = 5.0

[policy.quick.thresholds]
safe = 10.0
low = 20.0
medium = 40.0
high = 80.0

[report]
top = 3
"#,
        )
        .unwrap();
        assert_eq!(c.scan.exclude, vec!["vendor/".to_string()]);
        assert_eq!(c.scan.threads, 2);
        assert_eq!(c.scan.file_timeout_ms, Some(500));
        assert_eq!(c.patterns.extra, vec![PathBuf::from("team-patterns.yaml")]);
        assert_eq!(c.policy.heatmap.divisor, 5.0);
        assert_eq!(c.policy.heatmap.cap, 100.0);
        assert_eq!(c.policy.quick.thresholds.high, 80.0);
        assert_eq!(c.report.top, 3);
    }

    #[test]
    fn descending_thresholds_are_rejected() {
        let err = parse_config(
            "[policy.heatmap.thresholds]\nsafe = 50.0\nlow = 10.0\nmedium = 60.0\nhigh = 85.0\n",
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("policy.heatmap"));
    }
}
