use assert_cmd::prelude::*;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

#[test]
fn config_file_adds_excludes_and_patterns() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let project = tmp.path().join("project");
    fs::create_dir_all(project.join("fixtures"))?;
    fs::write(project.join("app.js"), "legacyAuth(user);\n")?;
    fs::write(project.join("fixtures/sample.js"), "legacyAuth(user);\n")?;

    let patterns = tmp.path().join("team.yaml");
    fs::write(
        &patterns,
        "patterns:\n  - id: team.legacy-auth\n    regex: 'legacyAuth\\('\n    weight: 6\n    category: auth\n    message: Legacy authentication helper\n    role: sink\n",
    )?;
    let config = tmp.path().join("config.toml");
    fs::write(
        &config,
        format!(
            "[scan]\nexclude = [\"**/fixtures/**\"]\n\n[patterns]\nextra = [{:?}]\n",
            patterns.display().to_string()
        ),
    )?;

    Command::cargo_bin("taintmap")?
        .env("TAINTMAP_CONFIG", &config)
        .args(["--quiet", "scan", "--format", "json"])
        .arg(&project)
        .assert()
        .success()
        .stdout(
            contains("team.legacy-auth")
                .and(contains("app.js"))
                .and(contains("fixtures").not()),
        );
    Ok(())
}

#[test]
fn config_policy_changes_quick_levels() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = tempdir()?;
    let file = tmp.path().join("run.js");
    fs::write(&file, "eval(a);\n")?;
    let config = tmp.path().join("config.toml");
    fs::write(
        &config,
        "[policy.quick.thresholds]\nsafe = 1.0\nlow = 2.0\nmedium = 3.0\nhigh = 4.0\n",
    )?;

    let out = Command::cargo_bin("taintmap")?
        .env("TAINTMAP_CONFIG", &config)
        .args(["--quiet", "quick", "--format", "json"])
        .arg(&file)
        .output()?;
    assert!(out.status.success());
    let value: serde_json::Value = serde_json::from_slice(&out.stdout)?;
    assert_eq!(value["riskLevel"], "critical");
    Ok(())
}

#[test]
fn descending_thresholds_are_rejected() {
    let tmp = tempdir().unwrap();
    let config = tmp.path().join("config.toml");
    fs::write(
        &config,
        "[policy.heatmap.thresholds]\nsafe = 50.0\nlow = 10.0\nmedium = 60.0\nhigh = 85.0\n",
    )
    .unwrap();

    Command::cargo_bin("taintmap")
        .unwrap()
        .env("TAINTMAP_CONFIG", &config)
        .args(["heatmap"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(contains("invalid [policy.heatmap]"));
}
