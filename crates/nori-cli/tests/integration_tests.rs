//! End-to-end tests for the nori binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn cli() -> Command {
    Command::cargo_bin("nori").unwrap()
}

fn project_with(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (name, content) in files {
        let path = temp.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    temp
}

#[test]
fn help_names_both_subcommands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fmt"))
        .stdout(predicate::str::contains("lint"));
}

#[test]
fn version_flag_prints_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn fmt_check_clean_file_exits_zero() {
    let temp = project_with(&[("clean.php", "<?php\n$a = 1 + 2;\n")]);
    cli()
        .arg("fmt")
        .arg("--check")
        .arg(temp.path())
        .current_dir(temp.path())
        .assert()
        .success();
}

#[test]
fn fmt_check_dirty_file_exits_one_and_shows_diff() {
    let temp = project_with(&[("dirty.php", "<?php $a=1+2;")]);
    cli()
        .arg("fmt")
        .arg("--check")
        .arg(temp.path())
        .current_dir(temp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("$a = 1 + 2;"));
}

#[test]
fn fmt_writes_files_in_place() {
    let temp = project_with(&[("app.php", "<?php $a=1;")]);
    cli()
        .arg("fmt")
        .arg(temp.path())
        .current_dir(temp.path())
        .assert()
        .success();
    let formatted = fs::read_to_string(temp.path().join("app.php")).unwrap();
    assert_eq!(formatted, "<?php\n$a = 1;\n");
}

#[test]
fn fmt_check_reports_parse_errors() {
    let temp = project_with(&[("broken.php", "<?php $a = ;")]);
    cli()
        .arg("fmt")
        .arg("--check")
        .arg(temp.path())
        .current_dir(temp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("syntax errors"));
    // the broken file is never modified
    let content = fs::read_to_string(temp.path().join("broken.php")).unwrap();
    assert_eq!(content, "<?php $a = ;");
}

#[test]
fn lint_reports_rule_findings() {
    let temp = project_with(&[("a.php", "<?php $ok = isset($a) && isset($b);\n")]);
    cli()
        .arg("lint")
        .arg("--no-color")
        .arg(temp.path())
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("combine-consecutive-issets"));
}

#[test]
fn lint_exit_code_follows_fail_on_threshold() {
    // default fail_on = error: warnings alone exit 0
    let temp = project_with(&[("a.php", "<?php $ok = isset($a) && isset($b);\n")]);
    cli()
        .arg("lint")
        .arg(temp.path())
        .current_dir(temp.path())
        .assert()
        .success();

    // syntax error crosses the threshold
    let temp = project_with(&[("bad.php", "<?php $a = ;\n")]);
    cli()
        .arg("lint")
        .arg(temp.path())
        .current_dir(temp.path())
        .assert()
        .code(1);

    // fail_on = warning makes the isset finding fail the run
    let temp = project_with(&[
        ("a.php", "<?php $ok = isset($a) && isset($b);\n"),
        ("nori.toml", "[linter]\nfail_on = \"warning\"\n"),
    ]);
    cli()
        .arg("lint")
        .arg(temp.path())
        .current_dir(temp.path())
        .assert()
        .code(1);
}

#[test]
fn lint_json_output_is_parseable() {
    let temp = project_with(&[("a.php", "<?php $ok = isset($a) && isset($b);\n")]);
    let output = cli()
        .arg("lint")
        .arg("--format")
        .arg("json")
        .arg(temp.path())
        .current_dir(temp.path())
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    let findings = parsed.as_array().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(
        findings[0]["code"],
        "redundancy/combine-consecutive-issets"
    );
}

#[test]
fn config_is_discovered_from_parent_directory() {
    let temp = project_with(&[
        ("nori.toml", "[formatter]\nindent_style = \"tab\"\n"),
        ("src/a.php", "<?php if ($x) { y(); }\n"),
    ]);
    cli()
        .arg("fmt")
        .arg("src")
        .current_dir(temp.path())
        .assert()
        .success();
    let formatted = fs::read_to_string(temp.path().join("src/a.php")).unwrap();
    assert!(formatted.contains("\ty();"), "{formatted}");
}

#[test]
fn invalid_config_aborts_before_any_work() {
    let temp = project_with(&[
        ("nori.toml", "[formatter]\nindent_size = 0\n"),
        ("a.php", "<?php $a=1;"),
    ]);
    cli()
        .arg("fmt")
        .arg(temp.path())
        .current_dir(temp.path())
        .assert()
        .code(2);
    // file untouched
    assert_eq!(
        fs::read_to_string(temp.path().join("a.php")).unwrap(),
        "<?php $a=1;"
    );
}

#[test]
fn disabled_formatter_leaves_files_alone() {
    let temp = project_with(&[
        ("nori.toml", "[formatter]\nenabled = false\n"),
        ("a.php", "<?php $a=1;"),
    ]);
    cli()
        .arg("fmt")
        .arg(temp.path())
        .current_dir(temp.path())
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(temp.path().join("a.php")).unwrap(),
        "<?php $a=1;"
    );
    // --check on the same dirty tree also passes
    cli()
        .arg("fmt")
        .arg("--check")
        .arg(temp.path())
        .current_dir(temp.path())
        .assert()
        .success();
}

#[test]
fn disabled_linter_reports_nothing() {
    let temp = project_with(&[
        ("nori.toml", "[linter]\nenabled = false\nfail_on = \"warning\"\n"),
        ("a.php", "<?php $ok = isset($a) && isset($b);\n"),
    ]);
    cli()
        .arg("lint")
        .arg(temp.path())
        .current_dir(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn vendor_directory_is_excluded_by_default() {
    let temp = project_with(&[
        ("src/a.php", "<?php $a=1;"),
        ("vendor/pkg/b.php", "<?php $b=2;"),
    ]);
    cli()
        .arg("fmt")
        .arg(temp.path())
        .current_dir(temp.path())
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(temp.path().join("vendor/pkg/b.php")).unwrap(),
        "<?php $b=2;"
    );
    assert_eq!(
        fs::read_to_string(temp.path().join("src/a.php")).unwrap(),
        "<?php\n$a = 1;\n"
    );
}
