// Integration tests for `rmap run | validate | fallback`.
//
// Run with: cargo test -p reliefmap-cli --test map_cli_tests -- --nocapture

use std::path::Path;
use std::process::{Command, Output};

fn rmap() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rmap"));
    cmd.env("RUST_LOG", "off");
    cmd
}

fn run(args: &[&str]) -> Output {
    rmap().args(args).output().expect("rmap runs")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn json_stdout(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout must be one JSON value: {e}\n{stdout}"))
}

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

/// A config with every source present and enough records to skip
/// supplementation.
fn fixture(dir: &Path) -> String {
    let mut volunteers = String::from("Chapter Name,State,Y,X,Dis Resp\n");
    volunteers.push_str("Greater Houston,TX,29.76,-95.37,Yes\n");
    for i in 0..80 {
        let state = ["OH", "GA", "CO", "MN"][i % 4];
        volunteers.push_str(&format!("Chapter {i},{state},,,No\n"));
    }
    write(dir, "volunteers.csv", &volunteers);

    write(
        dir,
        "drives.csv",
        "Account Name,St,RBC Products Collected,RBC Product Projection\n\
         Central High,GA,95,100\n\
         Civic Center,PA,40,100\n",
    );
    write(
        dir,
        "donors.csv",
        "Name,State,City, Gift $ \n\
         A,NY,New York,\"$1,000,000\"\n\
         B,CA,,\"$5,000\"\n\
         C,IL,,$0\n",
    );

    let mut applicants = String::from("State,Intake Outcome,Current Status\n");
    for i in 0..20 {
        let outcome = if i % 2 == 0 { "Converted" } else { "" };
        applicants.push_str(&format!("AZ,{outcome},Pending\n"));
    }
    write(dir, "applicants.csv", &applicants);

    let config = r#"
name = "Test Map"

[files]
volunteers = "volunteers.csv"
blood_drives = "drives.csv"
donors = "donors.csv"
applicants = "applicants.csv"
"#;
    write(dir, "test.map.toml", config);
    dir.join("test.map.toml").to_string_lossy().into_owned()
}

// ===========================================================================
// rmap run
// ===========================================================================

#[test]
fn run_json_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path());

    let output = run(&["run", &config, "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let val = json_stdout(&output);
    assert_eq!(val["meta"]["config_name"], "Test Map");
    assert!(val["meta"]["generated_at"].is_string());
    assert!(val["meta"]["engine_version"].is_string());

    let summary = &val["result"]["summary"];
    // 81 volunteers + 2 drives + 2 donors + 20 applicants
    assert_eq!(summary["total"], 105);
    assert_eq!(summary["origin"], "records");
    assert_eq!(summary["counts_by_category"]["donor"], 2);
    assert_eq!(summary["dropped_by_category"]["donor"], 1);

    let first = &val["result"]["points"][0];
    assert_eq!(first["category"], "volunteer");
    assert_eq!(first["coordinate"]["is_exact"], true);
    assert_eq!(first["color"], "#ff5722");
    assert_eq!(first["attributes"]["label"], "Greater Houston");

    let drive = val["result"]["points"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["category"] == "blood_drive")
        .unwrap();
    assert_eq!(drive["color"], "#d32f2f");

    let az = val["result"]["clusters"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["region_code"] == "AZ")
        .unwrap();
    assert_eq!(az["applicants"]["total"], 20);
    assert_eq!(az["applicants"]["converted"], 10);
    assert_eq!(az["applicants"]["pending"], 10);

    assert!(stderr(&output).contains("Test Map: 105 points"));
}

#[test]
fn run_logs_sources_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path());

    let output = rmap()
        .env("RUST_LOG", "debug")
        .args(["run", &config, "--json"])
        .output()
        .expect("rmap runs");
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let err = stderr(&output);
    assert!(err.contains("building 'Test Map'"), "{err}");
    assert!(err.contains("read 20 rows from"), "{err}");
    // stdout stays a single JSON document
    json_stdout(&output);
}

#[test]
fn run_output_file_and_fingerprint() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path());
    let out = dir.path().join("map.json");

    let first = run(&["run", &config, "--fingerprint", "--output", out.to_str().unwrap()]);
    assert!(first.status.success(), "stderr: {}", stderr(&first));
    let fp1 = String::from_utf8_lossy(&first.stdout).trim().to_string();
    assert!(fp1.starts_with("sha256:"), "{fp1}");

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["meta"]["fingerprint"], fp1.as_str());

    let second = run(&["run", &config, "--fingerprint"]);
    let fp2 = String::from_utf8_lossy(&second.stdout).trim().to_string();
    assert_eq!(fp1, fp2);
}

#[test]
fn run_missing_source_degrades() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path());
    std::fs::remove_file(dir.path().join("donors.csv")).unwrap();

    let output = run(&["run", &config, "--json", "--strict"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let val = json_stdout(&output);
    assert_eq!(val["result"]["summary"]["failed_sources"], serde_json::json!(["donor"]));
    assert_eq!(val["result"]["summary"]["counts_by_category"]["donor"], 0);
    assert!(stderr(&output).contains("unavailable sources: donor"));
}

#[test]
fn run_all_sources_missing_is_synthetic() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "empty.map.toml",
        "name = \"Nothing\"\n[fallback.targets]\nvolunteer = 10\nblood_drive = 10\ndonor = 10\napplicant = 10\n",
    );
    let config = dir.path().join("empty.map.toml");
    let config = config.to_str().unwrap();

    let output = run(&["run", config, "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let val = json_stdout(&output);
    assert_eq!(val["result"]["summary"]["origin"], "synthetic");
    assert_eq!(val["result"]["summary"]["total"], 40);

    let strict = run(&["run", config, "--strict"]);
    assert_eq!(strict.status.code(), Some(5));
    assert!(stderr(&strict).contains("synthetic"));
}

#[test]
fn run_invalid_config_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "bad.map.toml",
        "[policy]\nefficiency_high = 50.0\nefficiency_medium = 80.0\n",
    );
    let output = run(&["run", dir.path().join("bad.map.toml").to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("efficiency"));

    write(dir.path(), "broken.map.toml", "name = [unclosed");
    let output = run(&["run", dir.path().join("broken.map.toml").to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn run_missing_config_is_usage_error() {
    let output = run(&["run", "/nonexistent/relief.map.toml"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("cannot read config"));
}

// ===========================================================================
// rmap validate
// ===========================================================================

#[test]
fn validate_lists_sources() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture(dir.path());
    std::fs::remove_file(dir.path().join("applicants.csv")).unwrap();

    let output = run(&["validate", &config]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let err = stderr(&output);
    assert!(err.contains("Test Map: config ok"));
    assert!(err.contains("volunteer:"));
    assert!(err.contains("missing, will be skipped"));
}

// ===========================================================================
// rmap fallback
// ===========================================================================

#[test]
fn fallback_is_seeded() {
    let a = run(&["fallback", "--seed", "11", "--fingerprint"]);
    let b = run(&["fallback", "--seed", "11", "--fingerprint"]);
    let c = run(&["fallback", "--seed", "12", "--fingerprint"]);
    assert!(a.status.success(), "stderr: {}", stderr(&a));
    assert_eq!(a.stdout, b.stdout);
    assert_ne!(a.stdout, c.stdout);
    assert!(stderr(&a).contains("50000 points"));
}
