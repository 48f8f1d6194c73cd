use assert_cmd::Command;
use predicates::prelude::*;

fn membench() -> Command {
    let mut cmd = Command::cargo_bin("membench").unwrap();
    cmd.env_remove("RUST_LOG");
    for key in [
        "MEMBENCH_ARRAY_SIZE",
        "MEMBENCH_INDEX_ARRAY_SIZE",
        "MEMBENCH_NTIMES",
        "MEMBENCH_THREADS",
        "MEMBENCH_SEED",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn help_works() {
    membench().arg("--help").assert().success();
}

#[test]
fn version_works() {
    membench()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_mentions_core_subcommands() {
    let out = membench().arg("--help").assert().success().get_output().stdout.clone();
    let s = String::from_utf8(out).unwrap();
    for needle in ["run", "config", "info", "--config", "--log-format"] {
        assert!(s.contains(needle), "help missing `{needle}`");
    }
}

#[test]
fn invalid_command_fails() {
    membench().arg("nonexistent-command").assert().failure();
}

#[test]
fn small_run_prints_report() {
    membench()
        .args(["run", "--array-size", "4096", "--ntimes", "3", "--threads", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Best Rate MB/s"))
        .stdout(predicate::str::contains("Triad:"))
        .stdout(predicate::str::contains("Solution Validates"));
}

#[test]
fn bench_alias_with_indexed_kernels_json() {
    let out = membench()
        .args([
            "bench",
            "--array-size",
            "5000",
            "--index-array-size",
            "3000",
            "--all-indexed",
            "--permute",
            "--seed",
            "99",
            "--ntimes",
            "2",
            "--format",
            "json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["kernels"].as_array().unwrap().len(), 7);
    assert_eq!(json["run"]["permutation_seed"], 99);
    assert_eq!(json["validation"]["passed"], true);
}

#[test]
fn ntimes_one_is_corrected_not_rejected() {
    membench()
        .args(["run", "--array-size", "1024", "--ntimes", "1", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("function,bytes,"));
}

#[test]
fn zero_array_size_fails() {
    membench()
        .args(["run", "--array-size", "0"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("array_size"));
}

#[test]
fn unknown_element_type_rejected() {
    membench().args(["run", "--element-type", "f16"]).assert().failure();
}

#[test]
fn config_default_is_toml() {
    membench()
        .args(["config", "default"])
        .assert()
        .success()
        .stdout(predicate::str::contains("array_size = 10000000"));
}

#[test]
fn config_show_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("membench.toml");
    std::fs::write(&path, "array_size = 4242\n").unwrap();
    membench()
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("array_size = 4242"));
}

#[test]
fn env_override_reaches_run() {
    membench()
        .env("MEMBENCH_ARRAY_SIZE", "3333")
        .args(["run", "--ntimes", "2", "--threads", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Array size = 3333"));
}

#[test]
fn info_works() {
    membench()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logical CPUs"));
}
