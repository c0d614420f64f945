//! Snapshot tests for emitted IR and milestone snapshots.
//!
//! Run `cargo insta review` to update snapshots when making intentional changes.

use strata_config::{Action, FrontendOptions};
use strata_core::SourceFile;
use strata_frontend::{DeclKind, Frontend, Milestone, SnapshotObserver};
use tempfile::TempDir;

const PROGRAM: &str = r#"
// Doubles its argument.
fn double(n: int) -> int = n * 2;

let answer = 40 + 2;

fn main() -> bool = double(answer) > 80 && true;
"#;

fn sources() -> Vec<SourceFile> {
    vec![SourceFile::new("main.st", PROGRAM)]
}

#[test]
fn test_emitted_ir() {
    let outcome = Frontend::new(FrontendOptions::default())
        .run(sources())
        .expect("run should succeed");

    let artifact = &outcome.artifacts[0];
    assert_eq!(artifact.file_name, "main.sir");
    insta::assert_snapshot!(artifact.content, @r"
    module main

    global @answer: i64 {
        0: const.i64 40
        1: const.i64 2
        2: add.i64
        3: ret
    }

    fn @double(i64) -> i64 {
        0: load.local 0
        1: const.i64 2
        2: mul.i64
        3: ret
    }

    fn @main() -> bool {
        0: load.global @answer
        1: call @double, 1
        2: const.i64 80
        3: gt.i64
        4: jump.false 7
        5: const.bool true
        6: jump 8
        7: const.bool false
        8: ret
    }
    ");
}

#[test]
fn test_emitted_json_is_written() {
    let temp = TempDir::new().unwrap();
    let options = FrontendOptions {
        module_name: "demo".to_string(),
        action: Action::EmitIrJson,
        output_dir: Some(temp.path().to_path_buf()),
        ..FrontendOptions::default()
    };

    let outcome = Frontend::new(options)
        .run(sources())
        .expect("run should succeed");

    let path = temp.path().join("demo.sir.json");
    assert_eq!(outcome.artifacts[0].path.as_deref(), Some(path.as_path()));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["name"], "demo");
    assert_eq!(json["functions"][0]["name"], "double");
    assert_eq!(json["functions"][0]["body"][2]["op"], "mul");
}

#[test]
fn test_snapshot_observer_writes_every_milestone() {
    let temp = TempDir::new().unwrap();
    let mut observer = SnapshotObserver::with_output_dir(temp.path());

    Frontend::new(FrontendOptions::default())
        .observer(&mut observer)
        .run(sources())
        .expect("run should succeed");

    let milestones: Vec<_> = observer.snapshots().iter().map(|s| s.milestone).collect();
    assert_eq!(milestones, Milestone::ALL.to_vec());

    for name in [
        "00-configured.json",
        "01-semantic-analysis.json",
        "02-code-lowering.json",
        "03-lowering-diagnostics.json",
        "04-compiled.json",
    ] {
        assert!(temp.path().join(name).exists(), "{} missing", name);
    }

    // Declarations are extracted before the context is released.
    let compiled = observer.last().unwrap();
    let main = compiled
        .declarations
        .iter()
        .find(|d| d.name == "main")
        .unwrap();
    assert_eq!(main.kind, DeclKind::Function);
    assert_eq!(main.ty, "fn() -> bool");
    assert_eq!(main.location, "main.st:7:4");
    assert!(compiled.module.is_some());
}
