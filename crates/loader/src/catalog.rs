use anyhow::{anyhow, bail, Context};
use patterns::{builtin_defs, PatternDef, PatternFile, PatternRole, RiskTier};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::walk::visit;

#[derive(Debug, Clone)]
/// A compiled catalog entry.
///
/// `matcher` is only ever used through `find_iter`, which starts a fresh
/// search on every call, so one compiled pattern can serve any number of
/// scans and threads.
pub struct RiskPattern {
    pub id: String,
    pub matcher: Regex,
    pub weight: u32,
    pub category: String,
    pub message: String,
    pub role: PatternRole,
    pub tier: Option<RiskTier>,
    pub safe: bool,
}

impl RiskPattern {
    fn compile(def: PatternDef) -> anyhow::Result<Self> {
        if def.id.trim().is_empty() {
            bail!("pattern with regex '{}' has an empty id", def.regex);
        }
        if def.weight == 0 {
            bail!("pattern '{}' must have a positive weight", def.id);
        }
        if def.safe && def.role != PatternRole::Transform {
            bail!("pattern '{}' is marked safe but is not a transform", def.id);
        }
        let matcher = Regex::new(&def.regex)
            .with_context(|| format!("pattern '{}' has an invalid regex", def.id))?;
        if matcher.is_match("") {
            bail!("pattern '{}' matches the empty string", def.id);
        }
        Ok(Self {
            id: def.id,
            matcher,
            weight: def.weight,
            category: def.category,
            message: def.message,
            role: def.role,
            tier: def.tier,
            safe: def.safe,
        })
    }
}

#[derive(Debug, Clone)]
/// Ordered, immutable set of risk patterns.
pub struct Catalog {
    patterns: Arc<[RiskPattern]>,
}

static BUILTIN: OnceLock<Catalog> = OnceLock::new();

impl Catalog {
    /// Compiles definitions in order, failing on the first invalid entry.
    pub fn compile<I>(defs: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = PatternDef>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for def in defs {
            if !seen.insert(def.id.clone()) {
                bail!("duplicate pattern id '{}'", def.id);
            }
            out.push(RiskPattern::compile(def)?);
        }
        Ok(Self {
            patterns: out.into(),
        })
    }

    /// The built-in catalog, compiled on first use.
    ///
    /// # Panics
    /// When a built-in definition is invalid, which is a bug in the table.
    pub fn builtin() -> &'static Catalog {
        BUILTIN.get_or_init(|| {
            Catalog::compile(builtin_defs()).expect("built-in pattern catalog must compile")
        })
    }

    pub fn patterns(&self) -> &[RiskPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&RiskPattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    pub fn by_role(&self, role: PatternRole) -> impl Iterator<Item = &RiskPattern> {
        self.patterns.iter().filter(move |p| p.role == role)
    }
}

fn is_pattern_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml" | "json")
    )
}

/// Parses pattern definitions from JSON or YAML text.
pub fn parse_patterns(data: &str, json: bool) -> anyhow::Result<Vec<PatternDef>> {
    let file: PatternFile = if json {
        serde_json::from_str(data)?
    } else {
        serde_yaml::from_str(data)?
    };
    Ok(file.patterns)
}

/// Parses one pattern file, YAML or JSON by extension.
pub fn read_pattern_file(path: &Path) -> anyhow::Result<Vec<PatternDef>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read pattern file: {}", path.display()))?;
    let json = path.extension().and_then(|e| e.to_str()) == Some("json");
    let patterns = parse_patterns(&data, json)
        .with_context(|| format!("Failed to parse pattern file: {}", path.display()))?;
    debug!(file = %path.display(), count = patterns.len(), "Pattern file parsed");
    Ok(patterns)
}

/// Builds the catalog used for a run: built-in entries followed by the
/// patterns of every file (or pattern file found under every directory)
/// in `extra`.
///
/// # Example
/// ```
/// let catalog = loader::load_catalog(&[]).unwrap();
/// assert_eq!(catalog.len(), loader::Catalog::builtin().len());
/// ```
pub fn load_catalog(extra: &[PathBuf]) -> anyhow::Result<Catalog> {
    let mut defs = builtin_defs();
    for root in extra {
        if !root.exists() {
            return Err(anyhow!("pattern path not found: {}", root.display()));
        }
        let mut files = Vec::new();
        visit(
            root,
            &|p: &Path| p.file_name().is_some_and(|n| n == ".git"),
            &mut |p: &Path| {
                if is_pattern_file(p) {
                    files.push(p.to_path_buf());
                } else {
                    debug!(file = %p.display(), "Skipping non-pattern file");
                }
                Ok(())
            },
        )?;
        files.sort();
        for file in files {
            defs.extend(read_pattern_file(&file)?);
        }
    }
    let catalog = Catalog::compile(defs)?;
    debug!(count = catalog.len(), "Pattern catalog compiled");
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn def(id: &str, regex: &str, role: PatternRole) -> PatternDef {
        PatternDef {
            id: id.into(),
            regex: regex.into(),
            weight: 3,
            category: "test".into(),
            message: "test".into(),
            role,
            tier: None,
            safe: false,
        }
    }

    #[test]
    fn builtin_catalog_compiles() {
        let catalog = Catalog::builtin();
        assert!(!catalog.is_empty());
        assert!(catalog.get("sink.eval").is_some());
        assert!(catalog.by_role(PatternRole::Source).count() > 0);
        assert!(catalog
            .by_role(PatternRole::Transform)
            .any(|p| p.safe));
    }

    #[test]
    fn invalid_regex_fails_with_pattern_id() {
        let err = Catalog::compile(vec![def("bad.one", "(unclosed", PatternRole::Sink)])
            .unwrap_err();
        assert!(err.to_string().contains("bad.one"));
    }

    #[test]
    fn rejects_zero_weight_and_misplaced_safe_flag() {
        let mut d = def("w", "x", PatternRole::Sink);
        d.weight = 0;
        assert!(Catalog::compile(vec![d]).is_err());

        let mut d = def("s", "x", PatternRole::Sink);
        d.safe = true;
        assert!(Catalog::compile(vec![d]).is_err());
    }

    #[test]
    fn rejects_duplicates_and_empty_matches() {
        let dup = vec![
            def("same", "a", PatternRole::Sink),
            def("same", "b", PatternRole::Sink),
        ];
        assert!(Catalog::compile(dup)
            .unwrap_err()
            .to_string()
            .contains("duplicate"));
        assert!(Catalog::compile(vec![def("empty", "a*", PatternRole::Generic)]).is_err());
    }

    #[test]
    fn loads_extra_files_in_path_order() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("b.yaml"),
            "patterns:\n  - id: extra.b\n    regex: 'bbb'\n    weight: 2\n    category: c\n    message: m\n    role: generic\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"{"patterns":[{"id":"extra.a","regex":"aaa","weight":2,"category":"c","message":"m","role":"sink"}]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let catalog = load_catalog(&[dir.path().to_path_buf()]).unwrap();
        let n = Catalog::builtin().len();
        assert_eq!(catalog.len(), n + 2);
        assert_eq!(catalog.patterns()[n].id, "extra.a");
        assert_eq!(catalog.patterns()[n + 1].id, "extra.b");
    }

    #[test]
    fn extra_file_cannot_shadow_builtin_id() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("dup.yaml");
        fs::write(
            &file,
            "patterns:\n  - id: sink.eval\n    regex: 'zzz'\n    weight: 2\n    category: c\n    message: m\n    role: sink\n",
        )
        .unwrap();
        assert!(load_catalog(&[file]).is_err());
    }

    #[test]
    fn parse_patterns_reads_both_formats() {
        let yaml = "patterns:\n  - id: a\n    regex: 'x'\n    weight: 1\n    category: c\n    message: m\n    role: generic\n";
        assert_eq!(parse_patterns(yaml, false).unwrap()[0].id, "a");
        assert!(parse_patterns(yaml, true).is_err());
        assert!(parse_patterns("{\"patterns\": []}", true).unwrap().is_empty());
    }

    #[test]
    fn missing_extra_path_is_an_error() {
        let err = load_catalog(&[PathBuf::from("/definitely/not/here")]).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
