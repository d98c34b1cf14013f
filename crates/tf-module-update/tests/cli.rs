//! Runs the binary against a temporary tree
use pretty_assertions::assert_eq;
use std::path::Path;
use std::process::{Command, Output};

const MAIN_TF: &str = r#"module "vpc" {
  source = "https://github.com/example-org/aws/vpc.git?ref=1.0.0" # pinned
}
"#;

const OTHER_TF: &str = r#"module "dns" {
  source = "https://github.com/example-org/aws/dns.git?ref=1.0.0"
}
"#;

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tf-module-update"))
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("binary must run")
}

fn tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("network/.terraform")).unwrap();
    std::fs::write(dir.path().join("network/main.tf"), MAIN_TF).unwrap();
    std::fs::write(dir.path().join("network/.terraform/cached.tf"), MAIN_TF).unwrap();
    std::fs::write(dir.path().join("dns.tf"), OTHER_TF).unwrap();
    dir
}

#[test]
fn reports_without_writing() {
    let dir = tree();
    let output = run(
        dir.path(),
        &[
            "--from-module",
            "/example-org/aws/vpc.git",
            "--to-revision",
            "2.0.0",
        ],
    );

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("main.tf:"));
    assert!(stdout.contains("  - https://github.com/example-org/aws/vpc.git?ref=1.0.0"));
    assert!(stdout.contains("  + https://github.com/example-org/aws/vpc.git?ref=2.0.0"));
    assert!(!stdout.contains("dns.tf"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("network/main.tf")).unwrap(),
        MAIN_TF
    );
}

#[test]
fn writes_only_changed_files() {
    let dir = tree();
    let output = run(
        dir.path(),
        &[
            "--from-url",
            "https://github.com/example-org/aws/vpc.git?ref=1.0.0",
            "--to-revision",
            "2.0.0",
            "--write",
        ],
    );

    assert!(output.status.success());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("network/main.tf")).unwrap(),
        MAIN_TF.replace("ref=1.0.0", "ref=2.0.0")
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("network/.terraform/cached.tf")).unwrap(),
        MAIN_TF
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("dns.tf")).unwrap(),
        OTHER_TF
    );
}

#[test]
fn debug_level_reports_filter_and_replacement() {
    let dir = tree();
    let args = [
        "--from-module",
        "/example-org/aws/vpc.git",
        "--to-revision",
        "2.0.0",
    ];

    let mut debug_args = args.to_vec();
    debug_args.extend(["-l", "debug"]);

    let output = run(dir.path(), &debug_args);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("searching for module sources: /example-org/aws/vpc.git"));
    assert!(stdout.contains("updating source with: ?ref=2.0.0"));

    let output = run(dir.path(), &args);
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("searching for module sources"));
}

#[test]
fn empty_filter_fails() {
    let dir = tree();
    let output = run(dir.path(), &["--to-revision", "2.0.0"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("no conditions provided"));
}

#[test]
fn invalid_sources_fail_after_processing_everything() {
    let dir = tree();
    std::fs::write(
        dir.path().join("broken.tf"),
        "module \"hg\" {\n  source = \"hg::https://example.com/mod?ref=1.0.0\"\n}\n",
    )
    .unwrap();

    let output = run(
        dir.path(),
        &[
            "--from-revision",
            "1.0.0",
            "--to-revision",
            "2.0.0",
            "--write",
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("only 'git::' special prefix is supported but got 'hg::'"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("dns.tf")).unwrap(),
        OTHER_TF.replace("ref=1.0.0", "ref=2.0.0")
    );
}

#[test]
fn json_output() {
    let dir = tree();
    let output = run(
        dir.path(),
        &[
            "--from-module",
            "/example-org/aws/vpc.git",
            "--to-revision",
            "2.0.0",
            "-F",
            "json",
        ],
    );

    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let files = summary["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);

    let changed: Vec<_> = files
        .iter()
        .filter(|file| file["changed"] == serde_json::Value::Bool(true))
        .collect();
    assert_eq!(changed.len(), 1);
    assert_eq!(changed[0]["written"], serde_json::Value::Bool(false));
    assert_eq!(
        changed[0]["changes"][0]["new"],
        "https://github.com/example-org/aws/vpc.git?ref=2.0.0"
    );
    assert_eq!(summary["errors"].as_array().unwrap().len(), 0);
}
