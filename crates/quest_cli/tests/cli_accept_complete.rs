use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("questlog-{nanos}-{file_name}"))
}

fn questlog(store_path: &PathBuf, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_questlog"))
        .args(args)
        .env("QUESTLOG_STORE_PATH", store_path)
        .env("QUESTLOG_CONFIG_PATH", temp_path("no-config.json"))
        .output()
        .expect("failed to run questlog")
}

fn status_of(store_path: &PathBuf, name: &str) -> String {
    let content = std::fs::read_to_string(store_path).unwrap();
    let quests: serde_json::Value = serde_json::from_str(&content).unwrap();
    quests
        .as_array()
        .unwrap()
        .iter()
        .find(|quest| quest["name"] == name)
        .map(|quest| quest["status"].as_str().unwrap().to_string())
        .unwrap()
}

#[test]
fn quest_moves_through_its_lifecycle() {
    let store_path = temp_path("cli-lifecycle.json");
    for (name, difficulty, reward) in [
        ("Slay Dragon", "3", "100 Gold"),
        ("Find Cat", "1", "Thanks"),
    ] {
        let output = questlog(
            &store_path,
            &["add", name, "--difficulty", difficulty, "--reward", reward],
        );
        assert!(output.status.success());
    }

    // Sorted by name, "Slay Dragon" is the second quest on the accept list.
    let output = questlog(&store_path, &["accept", "2"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Accepted quest: Slay Dragon"));
    assert_eq!(status_of(&store_path, "Slay Dragon"), "Active");
    assert_eq!(status_of(&store_path, "Find Cat"), "NotStarted");

    let output = questlog(&store_path, &["complete", "1"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Completed quest: Slay Dragon"));
    assert_eq!(status_of(&store_path, "Slay Dragon"), "Completed");

    std::fs::remove_file(&store_path).ok();
}

#[test]
fn accept_rejects_unknown_number() {
    let store_path = temp_path("cli-accept-missing.json");
    let output = questlog(
        &store_path,
        &["add", "Find Cat", "--difficulty", "1", "--reward", "Thanks"],
    );
    assert!(output.status.success());

    let output = questlog(&store_path, &["accept", "4"]);
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_query"));
}

#[test]
fn complete_only_sees_active_quests() {
    let store_path = temp_path("cli-complete-inactive.json");
    let output = questlog(
        &store_path,
        &["add", "Find Cat", "--difficulty", "1", "--reward", "Thanks"],
    );
    assert!(output.status.success());

    let output = questlog(&store_path, &["complete", "1"]);
    let status = status_of(&store_path, "Find Cat");
    std::fs::remove_file(&store_path).ok();

    assert!(!output.status.success());
    assert_eq!(status, "NotStarted");
}
