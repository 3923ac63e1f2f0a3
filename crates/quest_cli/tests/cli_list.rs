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

fn seed(store_path: &PathBuf) {
    let quests = serde_json::json!([
        {"name": "Slay Dragon", "description": "Big one", "difficulty": 5, "reward": "100 Gold", "status": "NotStarted"},
        {"name": "Find Cat", "description": "", "difficulty": 1, "reward": "Thanks", "status": "Active"},
        {"name": "Escort Merchant", "description": "", "difficulty": 3, "reward": "20 Gold", "status": "NotStarted"},
        {"name": "Clear Cellar", "description": "Rats", "difficulty": 2, "reward": "Ale", "status": "Completed"}
    ]);
    std::fs::write(store_path, serde_json::to_string(&quests).unwrap()).unwrap();
}

fn list_json(store_path: &PathBuf, args: &[&str]) -> serde_json::Value {
    let mut full = vec!["list"];
    full.extend_from_slice(args);
    full.push("--json");
    let output = questlog(store_path, &full);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn list_defaults_to_all_quests_sorted_by_name() {
    let store_path = temp_path("cli-list-all.json");
    seed(&store_path);

    let json = list_json(&store_path, &[]);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(json["total"], 4);
    assert_eq!(json["items"][0]["name"], "Clear Cellar");
    assert_eq!(json["items"][3]["name"], "Slay Dragon");
}

#[test]
fn list_accept_filters_by_status_and_sorts() {
    let store_path = temp_path("cli-list-accept.json");
    seed(&store_path);

    let json = list_json(&store_path, &["accept", "--sort", "difficulty", "--desc"]);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(json["view"], "accept_quest");
    assert_eq!(json["total"], 2);
    assert_eq!(json["items"][0]["name"], "Slay Dragon");
    assert_eq!(json["items"][1]["name"], "Escort Merchant");
}

#[test]
fn list_search_matches_reward_text() {
    let store_path = temp_path("cli-list-search.json");
    seed(&store_path);

    let json = list_json(&store_path, &["--search", "GOLD"]);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(json["total"], 2);
    assert_eq!(json["items"][0]["name"], "Escort Merchant");
}

#[test]
fn list_pages_with_configured_size() {
    let store_path = temp_path("cli-list-page.json");
    seed(&store_path);

    let json = list_json(&store_path, &["--config-override", "page_size=3", "--page", "2"]);
    std::fs::remove_file(&store_path).ok();

    assert_eq!(json["page"], 2);
    assert_eq!(json["total_pages"], 2);
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
    assert_eq!(json["items"][0]["number"], 4);
}

#[test]
fn list_table_reports_empty_store() {
    let store_path = temp_path("cli-list-empty.json");
    let output = questlog(&store_path, &["list", "completed"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Completed Quests"));
    assert!(stdout.contains("No quests available"));
}

#[test]
fn list_page_past_the_end_shows_last_page() {
    let store_path = temp_path("cli-list-far-page.json");
    seed(&store_path);

    let output = questlog(
        &store_path,
        &["list", "--json", "--config-override", "page_size=3", "--page", "100000000"],
    );
    std::fs::remove_file(&store_path).ok();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["page"], 2);
    assert_eq!(json["items"][0]["name"], "Slay Dragon");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("page 100000000 is past the end, showing page 2 of 2"));
}

#[test]
fn list_rejects_oversized_page_size() {
    let store_path = temp_path("cli-list-page-size.json");
    let output = questlog(
        &store_path,
        &["list", "--config-override", "page_size=18446744073709551615"],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_config - page_size must be at most 1000"));
}
