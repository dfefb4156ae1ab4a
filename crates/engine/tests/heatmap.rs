use engine::{
    aggregate_directories, analyze_file_risk, build_heatmap, quick_check, sweep_workspace,
    CancellationToken, HeatmapPolicy, NoProgress, SweepConfig, SweepProgress,
};
use ir::{FileMetrics, FileRisk, RiskLevel};
use loader::{Catalog, PatternDef, PatternRole};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::tempdir;

fn risk(file: &str, score: f64) -> FileRisk {
    FileRisk {
        file: file.into(),
        risk_score: score,
        risk_level: RiskLevel::Safe,
        policy: "heatmap".into(),
        issue_count: 0,
        issues: vec![],
        hotspots: vec![],
        metrics: FileMetrics::default(),
    }
}

fn write_files(dir: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let p = dir.join(format!("f{i:03}.js"));
            fs::write(&p, format!("const v{i} = req.body.v;\neval(v{i});\n")).unwrap();
            p
        })
        .collect()
}

#[test]
fn zero_match_file_is_safe_and_present() {
    let r = analyze_file_risk(
        "plain.js",
        "const a = 1;\nconst b = a + 2;\n",
        Catalog::builtin(),
        &HeatmapPolicy::default(),
        10,
    );
    assert_eq!(r.risk_score, 0.0);
    assert_eq!(r.risk_level, RiskLevel::Safe);
    assert!(r.hotspots.is_empty());
    assert_eq!(r.issue_count, 0);
    assert_eq!(r.metrics.lines_of_code, 2);
}

#[test]
fn normalized_score_is_monotonic_in_matches() {
    let policy = HeatmapPolicy::default();
    let mut text = String::new();
    let mut last = -1.0;
    for _ in 0..200 {
        text.push_str("eval(x);\n");
        let r = analyze_file_risk("m.js", &text, Catalog::builtin(), &policy, 10);
        assert!(r.risk_score >= last);
        assert!(r.risk_score <= 100.0);
        last = r.risk_score;
    }
    assert_eq!(last, 100.0);
}

#[test]
fn normalized_score_is_monotonic_in_weight() {
    let policy = HeatmapPolicy::default();
    let text = "token(a);\ntoken(b);\ntoken(c);\n";
    let mut last = -1.0;
    for weight in 1..=500 {
        let catalog = Catalog::compile([PatternDef {
            id: "generic.token".into(),
            regex: r"\btoken\(".into(),
            weight,
            category: "test".into(),
            message: "Token call".into(),
            role: PatternRole::Generic,
            tier: None,
            safe: false,
        }])
        .unwrap();
        let r = analyze_file_risk("w.js", text, &catalog, &policy, 10);
        assert!(r.risk_score >= last, "weight {weight} lowered the score");
        assert!(r.risk_score <= 100.0);
        last = r.risk_score;
    }
    assert_eq!(last, 100.0);
}

#[test]
fn hotspots_rank_lines_by_weight() {
    let text = "console.log(a);\neval(a); eval(b);\nMath.random();\neval(c);\n";
    let r = analyze_file_risk("h.js", text, Catalog::builtin(), &HeatmapPolicy::default(), 2);
    let lines: Vec<_> = r.hotspots.iter().map(|h| (h.line, h.score)).collect();
    assert_eq!(lines, vec![(2, 20), (4, 10)]);
    assert_eq!(r.hotspots[0].reasons, vec!["Dynamic code evaluation".to_string()]);
}

#[test]
fn quick_check_reports_its_policy() {
    let text = "eval(a);\n".repeat(5);
    let quick = quick_check("q.js", &text, Catalog::builtin());
    let heat = analyze_file_risk("q.js", &text, Catalog::builtin(), &HeatmapPolicy::default(), 10);
    assert_eq!(quick.policy, "quick-check");
    assert_eq!(heat.policy, "heatmap");
    assert_eq!(quick.risk_score, 50.0);
    assert_eq!(heat.risk_score, 5.0);
    assert_eq!(quick.risk_level, RiskLevel::Low);
    assert_eq!(heat.risk_level, RiskLevel::Safe);
}

#[test]
fn directory_average_of_three_files() {
    let files = vec![
        risk("src/a.js", 10.0),
        risk("src/b.js", 50.0),
        risk("src/c.js", 90.0),
    ];
    let dirs = aggregate_directories(&files, 10);
    assert_eq!(dirs.len(), 1);
    assert_eq!(dirs[0].path, "src");
    assert_eq!(dirs[0].average_score, 50.0);
    assert_eq!(dirs[0].file_count, 3);
}

#[test]
fn directory_ranking_ignores_input_order() {
    let files = vec![
        risk("a/1.js", 12.5),
        risk("b/1.js", 40.0),
        risk("a/2.js", 80.0),
        risk("c/1.js", 40.0),
        risk("root.js", 3.0),
        risk("b/2.js", 7.25),
    ];
    let expected = aggregate_directories(&files, 10);
    let mut rotated = files.clone();
    for _ in 0..files.len() {
        rotated.rotate_left(1);
        assert_eq!(aggregate_directories(&rotated, 10), expected);
        let mut reversed = rotated.clone();
        reversed.reverse();
        assert_eq!(aggregate_directories(&reversed, 10), expected);
    }
    assert_eq!(build_heatmap(files.clone(), 10, false).files, {
        let mut r = files.clone();
        r.reverse();
        build_heatmap(r, 10, false).files
    });
}

struct CancelAt {
    at: usize,
    token: CancellationToken,
    seen: Mutex<Vec<usize>>,
}

impl SweepProgress for CancelAt {
    fn file_done(&self, processed: usize, _total: usize, _path: &Path) {
        self.seen.lock().unwrap().push(processed);
        if processed == self.at {
            self.token.cancel();
        }
    }
}

#[test]
fn sequential_sweep_stops_on_cancellation() {
    let dir = tempdir().unwrap();
    let files = write_files(dir.path(), 100);
    let token = CancellationToken::new();
    let progress = CancelAt {
        at: 10,
        token: token.clone(),
        seen: Mutex::new(Vec::new()),
    };
    let cfg = SweepConfig {
        threads: 1,
        ..Default::default()
    };
    let heatmap = sweep_workspace(dir.path(), &files, Catalog::builtin(), &cfg, &token, &progress);
    assert!(heatmap.cancelled);
    assert_eq!(heatmap.files.len(), 10);
    assert_eq!(heatmap.total_files, 10);
    assert_eq!(*progress.seen.lock().unwrap(), (1..=10).collect::<Vec<_>>());
}

#[test]
fn pre_cancelled_sweep_is_empty() {
    let dir = tempdir().unwrap();
    let files = write_files(dir.path(), 5);
    let token = CancellationToken::new();
    token.cancel();
    let heatmap = sweep_workspace(
        dir.path(),
        &files,
        Catalog::builtin(),
        &SweepConfig::default(),
        &token,
        &NoProgress,
    );
    assert!(heatmap.cancelled);
    assert_eq!(heatmap.total_files, 0);
}

#[test]
fn parallel_sweep_matches_sequential() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    let mut files = write_files(dir.path(), 8);
    let nested = dir.path().join("sub").join("x.js");
    fs::write(&nested, "document.write(location.hash);\n").unwrap();
    files.push(nested);
    files.push(dir.path().join("missing.js"));

    let seq = SweepConfig {
        threads: 1,
        ..Default::default()
    };
    let par = SweepConfig {
        threads: 4,
        ..Default::default()
    };
    let token = CancellationToken::new();
    let a = sweep_workspace(dir.path(), &files, Catalog::builtin(), &seq, &token, &NoProgress);
    let b = sweep_workspace(dir.path(), &files, Catalog::builtin(), &par, &token, &NoProgress);
    assert!(!a.cancelled);
    assert_eq!(a.total_files, 9);
    assert_eq!(a.files, b.files);
    assert_eq!(a.hot_directories, b.hot_directories);
    assert!(a.files.iter().any(|f| f.file == "sub/x.js"));
    assert!(a.hot_directories.iter().any(|d| d.path == "."));
}

#[test]
fn generous_timeout_keeps_every_file() {
    let dir = tempdir().unwrap();
    let files = write_files(dir.path(), 3);
    let cfg = SweepConfig {
        threads: 1,
        file_timeout: Some(Duration::from_secs(30)),
        ..Default::default()
    };
    let h = sweep_workspace(
        dir.path(),
        &files,
        Catalog::builtin(),
        &cfg,
        &CancellationToken::new(),
        &NoProgress,
    );
    assert_eq!(h.total_files, 3);
}

#[test]
fn timeout_is_not_shared_with_queued_files() {
    let dir = tempdir().unwrap();
    let files = write_files(dir.path(), 64);
    let cfg = SweepConfig {
        threads: 32,
        file_timeout: Some(Duration::from_secs(20)),
        ..Default::default()
    };
    let h = sweep_workspace(
        dir.path(),
        &files,
        Catalog::builtin(),
        &cfg,
        &CancellationToken::new(),
        &NoProgress,
    );
    assert_eq!(h.total_files, 64);
    assert!(!h.cancelled);
}

#[test]
fn slow_file_is_skipped_and_the_sweep_goes_on() {
    let dir = tempdir().unwrap();
    let mut files = write_files(dir.path(), 4);
    let heavy = dir.path().join("heavy.js");
    fs::write(
        &heavy,
        "const q = req.body.q; eval(q); el.innerHTML = q; console.log(q);\n".repeat(100_000),
    )
    .unwrap();
    files.insert(2, heavy);

    let cfg = SweepConfig {
        threads: 1,
        file_timeout: Some(Duration::from_millis(100)),
        ..Default::default()
    };
    let seen = Mutex::new(Vec::new());
    struct Record<'a>(&'a Mutex<Vec<usize>>);
    impl SweepProgress for Record<'_> {
        fn file_done(&self, processed: usize, _total: usize, _path: &Path) {
            self.0.lock().unwrap().push(processed);
        }
    }
    let h = sweep_workspace(
        dir.path(),
        &files,
        Catalog::builtin(),
        &cfg,
        &CancellationToken::new(),
        &Record(&seen),
    );
    assert_eq!(h.total_files, 4);
    assert!(h.files.iter().all(|f| f.file != "heavy.js"));
    assert!(h.files.iter().any(|f| f.file == "f003.js"));
    assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);
    assert!(!h.cancelled);
}
