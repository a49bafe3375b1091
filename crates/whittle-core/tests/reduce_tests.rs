//! End-to-end reduction over projects loaded from disk

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use whittle_core::analysis::rules::{ARGUMENT_COUNT, UNDEFINED_FUNCTION};
use whittle_core::{
    AnalyzerConfig, Engine, LintEngine, ReduceOptions, WhittleConfig, parse, reduce,
};

fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn no_hoist() -> ReduceOptions {
    ReduceOptions {
        hoist: false,
        max_iterations: None,
    }
}

/// Rule IDs reported for `text` analyzed as a file of its own
fn rules_in(text: &str) -> Vec<String> {
    let mut engine = LintEngine::new(AnalyzerConfig::default());
    engine.add_file("check.wh", text);
    engine
        .analyze(Path::new("check.wh"))
        .unwrap()
        .into_iter()
        .map(|f| f.rule_id)
        .collect()
}

#[test]
fn merges_the_declaring_file_and_strips_both() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "lib.wh",
        "fn helper(a, b) {\n    return a + b;\n}\nfn unused() {\n    print(1);\n}\n",
    );
    write(temp.path(), "main.wh", "let z = 1;\nhelper(z);\nprint(z);\n");

    let mut engine =
        LintEngine::load(&[temp.path().to_path_buf()], &WhittleConfig::default()).unwrap();
    let (findings, errors) = engine.check_all();
    assert!(errors.is_empty());
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule_id, ARGUMENT_COUNT);

    let target = temp.path().join("reduced.wh");
    let reduction = reduce(&mut engine, &target, findings, no_hoist()).unwrap();
    assert_eq!(reduction.text, "fn helper(a, b) {}\nhelper(z);\n");
    assert!(reduction.stats.final_bytes < reduction.stats.initial_bytes);

    // The staged output never touches disk.
    assert!(!target.exists());
    assert!(engine.is_loaded(&temp.path().join("main.wh")));
}

#[test]
fn reduced_output_still_reports_every_tracked_rule() {
    let source = "\
fn area(w, h) {
    let unused = w * 2;
    return w * h;
}
class Shape {
    fn draw() {
        render(area(1));
    }
}
let s = fn(v) {
    return v;
    print(v);
};
print(s(3));
";
    for hoist in [false, true] {
        let mut engine = LintEngine::new(AnalyzerConfig::default());
        engine.add_file("shapes.wh", source);
        let findings = engine.analyze(Path::new("shapes.wh")).unwrap();
        assert!(findings.len() >= 3, "{findings:?}");

        for finding in findings {
            let rule = finding.rule_id.clone();
            let options = ReduceOptions {
                hoist,
                max_iterations: None,
            };
            let reduction = reduce(&mut engine, "out.wh", vec![finding], options).unwrap();

            parse(&reduction.text).unwrap();
            assert!(
                rules_in(&reduction.text).contains(&rule),
                "{rule} lost in:\n{}",
                reduction.text
            );
            assert!(reduction.text.len() <= source.len());
        }
    }
}

#[test]
fn findings_from_several_files_share_one_output() {
    let mut engine = LintEngine::new(AnalyzerConfig::default());
    engine.add_file("a.wh", "first();\nprint(1);\n");
    engine.add_file("b.wh", "print(2);\nsecond();\n");

    let mut findings = engine.analyze(Path::new("a.wh")).unwrap();
    findings.extend(engine.analyze(Path::new("b.wh")).unwrap());
    assert!(findings.iter().all(|f| f.rule_id == UNDEFINED_FUNCTION));

    let reduction = reduce(&mut engine, "out.wh", findings, no_hoist()).unwrap();
    assert_eq!(reduction.text, "first();\nsecond();\n");
}
