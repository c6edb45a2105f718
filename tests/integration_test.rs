use greeter_demo::config::{DriverConfig, SampleConfig};
use greeter_demo::{greet, Config, Driver, Dummy, OutputFormat, RandomSample};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::process::Command;

fn greeter_bin(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_greeter-demo"));
    cmd.current_dir(dir).env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_library_scenarios() {
    assert_eq!(greet("User1"), "Hello, User1!");
    assert_eq!(*Dummy::new(7).value(), 7);

    let sample = RandomSample::generate();
    assert_eq!(sample.len(), 5);
    assert_eq!(sample.sum(), sample.values().iter().map(|&v| v as u64).sum::<u64>());
}

#[test]
fn test_driver_from_config_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("greeter.yaml");
    fs::write(&path, "driver:\n  iterations: 4\n  name_prefix: Guest\nsample:\n  len: 2\n")?;

    let config = Config::load_from(&path)?;
    let mut out = Vec::new();
    let report = Driver::new(config.driver, config.sample)
        .run_with_rng(&mut StdRng::seed_from_u64(5), &mut out)?;

    assert_eq!(
        String::from_utf8(out)?,
        "Hello, Guest0! 0\nHello, Guest1! 1\nHello, Guest2! 2\nHello, Guest3! 3\n"
    );
    assert_eq!(report.sample.len(), 2);
    Ok(())
}

#[test]
fn test_json_report_has_every_line() -> anyhow::Result<()> {
    let driver = Driver::new(DriverConfig::default(), SampleConfig::default())
        .with_format(OutputFormat::Json);
    let mut out = Vec::new();
    driver.run(&mut out)?;

    let parsed: serde_json::Value = serde_json::from_slice(&out)?;
    let greetings: Vec<&str> = parsed["lines"]
        .as_array()
        .unwrap()
        .iter()
        .map(|line| line["greeting"].as_str().unwrap())
        .collect();
    assert_eq!(greetings, ["Hello, User0!", "Hello, User1!", "Hello, User2!"]);
    Ok(())
}

#[test]
fn test_binary_default_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = greeter_bin(dir.path()).output().unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "Hello, User0! 0\nHello, User1! 1\nHello, User2! 2\n"
    );
    // No log file unless enabled
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_binary_greet_command() {
    let dir = tempfile::tempdir().unwrap();
    let output = greeter_bin(dir.path()).args(["greet", "Ada"]).output().unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Hello, Ada!\n");
}

#[test]
fn test_binary_rejects_bad_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("greeter.yaml"), "sample:\n  min: 50\n  max: 10\n").unwrap();

    let output = greeter_bin(dir.path()).output().unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("sample.min"));
}

#[test]
fn test_binary_sample_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = greeter_bin(dir.path()).args(["sample", "--json"]).output().unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let values: Vec<u64> = parsed["values"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_u64().unwrap())
        .collect();
    assert_eq!(values.len(), 5);
    assert!(values.iter().all(|v| (1..=100).contains(v)));
    assert_eq!(parsed["sum"].as_u64().unwrap(), values.iter().sum::<u64>());
}

#[test]
fn test_binary_flags_override_config_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("greeter.yaml"), "driver:\n  iterations: 5\n  name_prefix: Guest\n").unwrap();

    let output = greeter_bin(dir.path())
        .args(["run", "--iterations", "2", "--prefix", "G"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Hello, G0! 0\nHello, G1! 1\n");

    // Unset flags keep the file's values
    let output = greeter_bin(dir.path()).args(["run", "--iterations", "1"]).output().unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Hello, Guest0! 0\n");
}

#[test]
fn test_binary_config_path() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("custom.yaml"), "driver:\n  iterations: 2\n  name_prefix: Member\n").unwrap();

    let output = greeter_bin(dir.path())
        .args(["--config", "custom.yaml", "run"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Hello, Member0! 0\nHello, Member1! 1\n");

    let output = greeter_bin(dir.path()).args(["--config", "absent.yaml"]).output().unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read config"));
}

#[test]
fn test_binary_run_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = greeter_bin(dir.path()).args(["run", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let lines = parsed["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2]["greeting"], "Hello, User2!");
    assert_eq!(lines[2]["value"], 2);
    assert_eq!(parsed["sample"]["values"].as_array().unwrap().len(), 5);
}

#[test]
fn test_binary_rejects_huge_iteration_count() {
    let dir = tempfile::tempdir().unwrap();
    let output = greeter_bin(dir.path())
        .args(["run", "--iterations", "4000000000"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("driver.iterations (4000000000)"));
}
