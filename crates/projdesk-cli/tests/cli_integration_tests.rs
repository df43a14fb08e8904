//! CLI integration tests for projdesk
//!
//! Runs the projdesk binary end-to-end against fixture files using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

const FIXTURES: &str = r#"{
    "projects": [
        {
            "id": 1,
            "title": "Corporate site",
            "description": "Marketing site with blog",
            "tech_stack": "Django, PostgreSQL",
            "status": "in_progress",
            "budget": 350000,
            "deadline": "2025-03-15T00:00:00Z",
            "customer_id": 5,
            "assignee_id": null
        },
        {
            "id": 2,
            "title": "Warehouse bot",
            "description": "Telegram bot for stock queries",
            "status": "review",
            "budget": "90000.00",
            "customer_id": 8
        }
    ]
}"#;

/// Temp workspace holding a config dir and a fixtures file
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("fixtures.json"), FIXTURES).unwrap();
        Self { dir }
    }

    fn fixtures(&self) -> PathBuf {
        self.dir.path().join("fixtures.json")
    }

    /// Command isolated from the user's config and environment
    #[allow(deprecated)]
    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("projdesk").unwrap();
        cmd.current_dir(self.dir.path());
        cmd.env("PROJDESK_CONFIG_DIR", self.dir.path().join("config"));
        cmd.env_remove("PROJDESK_API_URL");
        cmd.env_remove("PROJDESK_API_TOKEN");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    fn projects(&self, args: &[&str]) -> Command {
        let mut cmd = self.cmd();
        cmd.arg("--fixtures").arg(self.fixtures()).arg("projects").args(args);
        cmd
    }
}

#[test]
fn test_help_lists_commands() {
    Sandbox::new()
        .cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("projects"))
        .stdout(predicate::str::contains("statuses"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_statuses_shows_labels() {
    Sandbox::new()
        .cmd()
        .arg("statuses")
        .assert()
        .success()
        .stdout(predicate::str::contains("in_progress"))
        .stdout(predicate::str::contains("В работе"))
        .stdout(predicate::str::contains("Отменён"));
}

#[test]
fn test_statuses_json() {
    let output = Sandbox::new()
        .cmd()
        .args(["statuses", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0]["value"], "new");
    assert_eq!(entries[0]["label"], "Новый");
}

#[test]
fn test_projects_list_from_fixtures() {
    let sandbox = Sandbox::new();
    sandbox
        .projects(&["list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 total"))
        .stdout(predicate::str::contains("#1 - Corporate site"))
        .stdout(predicate::str::contains("350 000"))
        .stdout(predicate::str::contains("На проверке"));
}

#[test]
fn test_projects_show_formats_budget_and_deadline() {
    let sandbox = Sandbox::new();
    sandbox
        .projects(&["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project #1: Corporate site"))
        .stdout(predicate::str::contains("Budget: 350 000"))
        .stdout(predicate::str::contains("Deadline: 15.03.2025"))
        .stdout(predicate::str::contains("Tech stack: Django, PostgreSQL"));
}

#[test]
fn test_projects_show_missing_record_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .projects(&["show", "99"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("99"));
}

#[test]
fn test_projects_edit_submits_grouped_budget() {
    let sandbox = Sandbox::new();
    let output = sandbox
        .projects(&["edit", "1", "--budget", "1 234 000", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let saved: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(saved["budget"], 1234000);
    assert_eq!(saved["deadline"], "2025-03-15");
    assert_eq!(saved["title"], "Corporate site");
}

#[test]
fn test_projects_edit_text_output() {
    let sandbox = Sandbox::new();
    sandbox
        .projects(&[
            "edit",
            "2",
            "--status",
            "Завершён",
            "--deadline",
            "31.12.2025",
            "--assignee-id",
            "4",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Проект успешно сохранён"))
        .stdout(predicate::str::contains("Status: Завершён"))
        .stdout(predicate::str::contains("Deadline: 31.12.2025"))
        .stdout(predicate::str::contains("Assignee: 4"));
}

#[test]
fn test_projects_edit_empty_title_is_not_saved() {
    let sandbox = Sandbox::new();
    sandbox
        .projects(&["edit", "1", "--title", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Название"))
        .stderr(predicate::str::contains("Введите название"));
}

#[test]
fn test_projects_edit_rejects_bad_date() {
    let sandbox = Sandbox::new();
    sandbox
        .projects(&["edit", "1", "--deadline", "2025-12-31"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--deadline"));
}

#[test]
fn test_projects_edit_rejects_fractional_customer() {
    let sandbox = Sandbox::new();
    sandbox
        .projects(&["edit", "1", "--customer-id", "2.5"])
        .assert()
        .failure();
}

#[test]
fn test_config_set_and_get() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["config", "set", "ui.page_size", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set ui.page_size = 50"));

    sandbox
        .cmd()
        .args(["config", "get", "ui.page_size"])
        .assert()
        .success()
        .stdout(predicate::str::contains("50"));
}

#[test]
fn test_config_rejects_token() {
    Sandbox::new()
        .cmd()
        .args(["config", "set", "api.token", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PROJDESK_API_TOKEN"));
}

#[test]
fn test_config_list_and_reset() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["config", "set", "api.resource", "orders"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("api.resource = orders"))
        .stdout(predicate::str::contains("api.base_url = http://localhost:8000/api"));

    sandbox
        .cmd()
        .args(["config", "reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration reset to defaults."));

    sandbox
        .cmd()
        .args(["config", "get", "api.resource"])
        .assert()
        .success()
        .stdout(predicate::str::contains("projects"));
}

#[test]
fn test_config_path_uses_config_dir() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}
