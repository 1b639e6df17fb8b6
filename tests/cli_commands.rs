use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

mod common;

use dormguide::sessions::{SessionStore, DEFAULT_SLOT};
use dormguide::storage::SqliteStorage;

fn dormguide(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dormguide").unwrap();
    cmd.env_remove("DORMGUIDE_ENDPOINT")
        .env_remove("DORMGUIDE_SESSION_SLOT")
        .arg("--config")
        .arg(tmp.path().join("missing.yaml"))
        .arg("--storage-path")
        .arg(tmp.path().join("sessions.db"));
    cmd
}

fn seed_session(tmp: &TempDir) -> i64 {
    let storage = SqliteStorage::new_with_path(tmp.path().join("sessions.db")).unwrap();
    let mut store = SessionStore::open(Box::new(storage), DEFAULT_SLOT);
    let id = store.create().id;
    let mut conversation = store.current().unwrap().messages.snapshot();
    conversation.append_user_turn("Quiet dorm close to classes");
    conversation.append_bot_turn("Try Teague Hall.");
    store.sync(&conversation);
    id
}

#[test]
fn test_sessions_list_empty() {
    let tmp = TempDir::new().unwrap();
    dormguide(&tmp)
        .args(["sessions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved sessions found"));
}

#[test]
fn test_sessions_list_shows_saved_session() {
    let tmp = TempDir::new().unwrap();
    let id = seed_session(&tmp);

    dormguide(&tmp)
        .args(["sessions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(id.to_string()))
        .stdout(predicate::str::contains("Quiet dorm close to classes"));
}

#[test]
fn test_sessions_show_prints_transcript() {
    let tmp = TempDir::new().unwrap();
    let id = seed_session(&tmp);

    dormguide(&tmp)
        .args(["sessions", "show", &id.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Try Teague Hall."));
}

#[test]
fn test_sessions_delete_then_list_is_empty() {
    let tmp = TempDir::new().unwrap();
    let id = seed_session(&tmp);

    dormguide(&tmp)
        .args(["sessions", "delete", &id.to_string()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted session"));

    dormguide(&tmp)
        .args(["sessions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved sessions found"));
}

#[test]
fn test_sessions_show_unknown_id_fails() {
    let tmp = TempDir::new().unwrap();
    dormguide(&tmp)
        .args(["sessions", "show", "12345"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No session matches"));
}

#[test]
fn test_dorms_prints_reference_table() {
    let tmp = TempDir::new().unwrap();
    dormguide(&tmp)
        .arg("dorms")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cobb Residence Hall"))
        .stdout(predicate::str::contains("Franklin Street"));
}

#[test]
fn test_invalid_endpoint_in_config_is_rejected() {
    let (tmp, config_path) = common::temp_config_file("service:\n  endpoint: ftp://example.com\n");
    Command::cargo_bin("dormguide")
        .unwrap()
        .env_remove("DORMGUIDE_ENDPOINT")
        .arg("--config")
        .arg(config_path)
        .arg("--storage-path")
        .arg(tmp.path().join("sessions.db"))
        .arg("dorms")
        .assert()
        .failure()
        .stderr(predicate::str::contains("http or https"));
}

#[test]
fn test_ask_unreachable_service_prints_connectivity_message() {
    let tmp = TempDir::new().unwrap();
    dormguide(&tmp)
        .args(["ask", "Quiet dorm", "--endpoint", "http://127.0.0.1:1/query"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reach the server"));
}
