use std::process::Command;

fn binary() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_endless-defence"));
    let _ = command.env("RUST_LOG", "warn");
    command
}

#[test]
fn run_prints_one_line_per_field() {
    let output = binary()
        .args(["run", "--seconds", "3", "--frame-rate", "30", "--build", "gunner@4,2"])
        .output()
        .expect("failed to launch endless-defence");

    assert!(output.status.success(), "run should succeed: {output:?}");
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("* 0 Field A"));
    assert!(lines[1].contains("Field B"));
    assert!(lines[2].contains("Field C"));
}

#[test]
fn run_autosaves_and_inspect_reads_it_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    let save = dir.path().join("roster.json");
    let save_arg = save.to_str().expect("utf-8 path");

    let status = binary()
        .args(["run", "--seconds", "1", "--field", "2", "--save", save_arg])
        .status()
        .expect("failed to launch endless-defence");
    assert!(status.success());
    assert!(save.exists());

    let output = binary()
        .args(["inspect", save_arg])
        .output()
        .expect("failed to launch endless-defence");
    assert!(output.status.success(), "inspect should succeed: {output:?}");
    let stdout = String::from_utf8(output.stdout).expect("utf-8 output");
    assert!(stdout.lines().nth(2).is_some_and(|line| line.starts_with("* 2 Field C")));
}

#[test]
fn malformed_build_orders_are_rejected() {
    let output = binary()
        .args(["run", "--seconds", "0", "--build", "cannon@1,1"])
        .output()
        .expect("failed to launch endless-defence");

    assert!(!output.status.success());
}

#[test]
fn inspect_refuses_unusable_snapshots() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"version\": 7, \"fields\": []}").expect("write fixture");

    let output = binary()
        .args(["inspect", path.to_str().expect("utf-8 path")])
        .output()
        .expect("failed to launch endless-defence");

    assert!(!output.status.success());
}
