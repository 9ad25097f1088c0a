//! CLI integration tests for logscope commands.
//!
//! These tests focus on exit codes and basic behavioral verification,
//! not specific output formatting which may change.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

/// Project config pointing at `logs/` and a local `idx/` index.
const PROJECT_CONFIG: &str = r#"root = true

[index]
path = "idx"
workers = 2
writer_memory_mb = 64

[logs]
folder = "logs"
encoding = "utf-8"
days = 7
"#;

/// Range flags covering the fixture files.
const JANUARY: [&str; 4] = ["--from", "2025-01-01", "--to", "2025-01-31"];

/// Helper to create a temp directory for tests.
fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

/// Helper to get a logscope command.
fn logscope() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("logscope").unwrap()
}

/// Helper to run `logscope` with HOME isolated to the provided directory.
fn logscope_with_home(home: &Path) -> Command {
    let mut cmd = logscope();
    cmd.env("HOME", home);
    cmd.env_remove("LOGSCOPE_LOG");
    cmd
}

/// Strips ANSI escape sequences from a string.
fn strip_ansi(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            output.push(ch);
        }
    }

    output
}

/// A project with a config file and two days of `app` logs plus one `db` log.
struct Project {
    /// Isolated home directory.
    home: tempfile::TempDir,
    /// Project directory holding `.logscope.toml`, `logs/` and `idx/`.
    dir: tempfile::TempDir,
}

impl Project {
    /// Creates the fixture.
    fn new() -> Self {
        let home = temp_dir();
        let dir = temp_dir();
        fs::write(dir.path().join(".logscope.toml"), PROJECT_CONFIG).unwrap();
        let logs = dir.path().join("logs");
        fs::create_dir(&logs).unwrap();
        fs::write(
            logs.join("app.log20250101"),
            "2025-01-01 08:00:00 service started\n2025-01-01 08:00:05 connection timeout to db\n",
        )
        .unwrap();
        fs::write(
            logs.join("app.log20250102"),
            "2025-01-02 09:00:00 request timeout after 30s\nplain line without stamp\n",
        )
        .unwrap();
        fs::write(logs.join("db.log20250102"), "db checkpoint complete\n").unwrap();
        Self { home, dir }
    }

    /// Returns a command running in the project directory.
    fn cmd(&self) -> Command {
        let mut cmd = logscope_with_home(self.home.path());
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Indexes every fixture file.
    fn index(&self) {
        self.cmd()
            .arg("index")
            .args(JANUARY)
            .arg("-q")
            .assert()
            .success();
    }

    /// Runs a JSON search and returns the parsed output.
    fn search_json(&self, args: &[&str]) -> Value {
        let output = self
            .cmd()
            .arg("search")
            .args(args)
            .arg("--json")
            .output()
            .unwrap();
        assert!(output.status.success());
        serde_json::from_slice(&output.stdout).unwrap()
    }
}

mod init {
    use super::*;

    #[test]
    fn creates_config_file() {
        let home = temp_dir();
        let dir = temp_dir();

        logscope_with_home(home.path())
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success();

        let contents = fs::read_to_string(dir.path().join(".logscope.toml")).unwrap();
        assert!(contents.contains("# [logs]"));
    }

    #[test]
    fn fails_if_config_exists() {
        let home = temp_dir();
        let dir = temp_dir();
        fs::write(dir.path().join(".logscope.toml"), "existing").unwrap();

        logscope_with_home(home.path())
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .failure()
            .stderr(predicate::str::contains("--force"));
    }

    #[test]
    fn force_overwrites_existing() {
        let home = temp_dir();
        let dir = temp_dir();
        fs::write(dir.path().join(".logscope.toml"), "old content").unwrap();

        logscope_with_home(home.path())
            .current_dir(dir.path())
            .args(["init", "--force"])
            .assert()
            .success();

        let contents = fs::read_to_string(dir.path().join(".logscope.toml")).unwrap();
        assert!(contents.contains("# [logs]"));
    }

    #[test]
    fn global_writes_to_home() {
        let home = temp_dir();
        let dir = temp_dir();

        logscope_with_home(home.path())
            .current_dir(dir.path())
            .args(["init", "--global"])
            .assert()
            .success();

        assert!(home.path().join(".logscope.toml").exists());
        assert!(!dir.path().join(".logscope.toml").exists());
    }

    #[test]
    fn updates_gitignore_when_present() {
        let home = temp_dir();
        let dir = temp_dir();
        fs::write(dir.path().join(".gitignore"), "*.tmp\n").unwrap();

        logscope_with_home(home.path())
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success();

        let gitignore = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert!(gitignore.contains(".logscope/"));
    }

    #[test]
    fn works_with_invalid_existing_config() {
        let home = temp_dir();
        let dir = temp_dir();
        fs::write(dir.path().join(".logscope.toml"), "[[[ not toml").unwrap();

        logscope_with_home(home.path())
            .current_dir(dir.path())
            .args(["init", "--force"])
            .assert()
            .success();
    }
}

mod index {
    use super::*;

    #[test]
    fn indexes_configured_folder() {
        let project = Project::new();

        project
            .cmd()
            .arg("index")
            .args(JANUARY)
            .assert()
            .success()
            .stdout(predicate::str::contains("Indexed 3 files (5 lines)"));

        assert!(project.dir.path().join("idx").join("meta.json").exists());
    }

    #[test]
    fn second_run_is_up_to_date() {
        let project = Project::new();
        project.index();

        project
            .cmd()
            .arg("index")
            .args(JANUARY)
            .assert()
            .success()
            .stdout(predicate::str::contains("up to date"));
    }

    #[test]
    fn filter_limits_files() {
        let project = Project::new();

        project
            .cmd()
            .args(["index", "-f", "db", "-q"])
            .args(JANUARY)
            .assert()
            .success()
            .stdout(predicate::str::contains("Indexed 1 files (1 lines)"));
    }

    #[test]
    fn missing_folder_fails() {
        let project = Project::new();

        project
            .cmd()
            .args(["index", "no-such-folder"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("directory not found"));
    }

    #[test]
    fn no_folder_configured_fails() {
        let home = temp_dir();
        let dir = temp_dir();

        logscope_with_home(home.path())
            .current_dir(dir.path())
            .arg("index")
            .assert()
            .failure()
            .stderr(predicate::str::contains("logs.folder"));
    }

    #[test]
    fn reversed_range_fails() {
        let project = Project::new();

        project
            .cmd()
            .args(["index", "--from", "2025-02-01", "--to", "2025-01-01"])
            .assert()
            .failure();
    }
}

mod search {
    use super::*;

    #[test]
    fn prints_matching_lines() {
        let project = Project::new();
        project.index();

        let output = project
            .cmd()
            .args(["search", "timeout"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let stdout = strip_ansi(&String::from_utf8_lossy(&output.stdout));

        assert!(stdout.contains("app.log20250101:2 [2025-01-01] 2025-01-01 08:00:05 connection timeout to db"));
        assert!(stdout.contains("app.log20250102:1 [2025-01-02]"));
        assert!(stdout.contains("showing 2 of 2"));
        let newer = stdout.find("app.log20250102").unwrap();
        let older = stdout.find("app.log20250101").unwrap();
        assert!(newer < older);
    }

    #[test]
    fn keywords_must_all_match() {
        let project = Project::new();
        project.index();

        let json = project.search_json(&["timeout", "request"]);

        assert_eq!(json["total_hits"], 1);
        assert_eq!(json["results"][0]["line_number"], 0);
        assert_eq!(json["results"][0]["file_name"], "app.log20250102");
    }

    #[test]
    fn limit_keeps_total() {
        let project = Project::new();
        project.index();

        let json = project.search_json(&["timeout", "-n", "1"]);

        assert_eq!(json["shown"], 1);
        assert_eq!(json["total_hits"], 2);
    }

    #[test]
    fn date_range_filters_files() {
        let project = Project::new();
        project.index();

        let json = project.search_json(&["timeout", "--from", "2025-01-02", "--to", "2025-01-02"]);

        assert_eq!(json["total_hits"], 1);
        assert_eq!(json["results"][0]["file_date"], "2025-01-02");
    }

    #[test]
    fn missing_index_finds_nothing() {
        let project = Project::new();

        project
            .cmd()
            .args(["search", "timeout"])
            .assert()
            .success()
            .stdout(predicate::str::contains("showing 0 of 0"))
            .stderr(predicate::str::contains("no index"));
    }

    #[test]
    fn requires_keyword() {
        let project = Project::new();

        project.cmd().arg("search").assert().failure();
    }
}

mod clear {
    use super::*;

    #[test]
    fn removes_all_documents() {
        let project = Project::new();
        project.index();

        project.cmd().arg("clear").assert().success();

        let json = project.search_json(&["timeout"]);
        assert_eq!(json["total_hits"], 0);
    }

    #[test]
    fn reindexes_after_clear() {
        let project = Project::new();
        project.index();
        project.cmd().arg("clear").assert().success();

        project
            .cmd()
            .arg("index")
            .args(JANUARY)
            .assert()
            .success()
            .stdout(predicate::str::contains("Indexed 3 files"));
    }

    #[test]
    fn succeeds_without_index() {
        let project = Project::new();

        project.cmd().arg("clear").assert().success();
    }
}

mod status {
    use super::*;

    #[test]
    fn reports_missing_index() {
        let project = Project::new();

        let output = project.cmd().arg("status").output().unwrap();
        assert!(output.status.success());
        let stdout = strip_ansi(&String::from_utf8_lossy(&output.stdout));

        assert!(stdout.contains(".logscope.toml"));
        assert!(stdout.contains("missing"));
    }

    #[test]
    fn reports_ready_index() {
        let project = Project::new();
        project.index();

        let output = project.cmd().arg("status").output().unwrap();
        assert!(output.status.success());
        let stdout = strip_ansi(&String::from_utf8_lossy(&output.stdout));

        assert!(stdout.contains("ready"));
        assert!(stdout.contains("utf-8"));
    }

    #[test]
    fn works_without_config() {
        let home = temp_dir();
        let dir = temp_dir();

        logscope_with_home(home.path())
            .current_dir(dir.path())
            .env("XDG_DATA_HOME", home.path().join("data"))
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("logscope init"));
    }
}

mod filters {
    use super::*;

    #[test]
    fn lists_base_names() {
        let project = Project::new();

        project
            .cmd()
            .arg("filters")
            .assert()
            .success()
            .stdout("app\ndb\n");
    }

    #[test]
    fn falls_back_to_configured_names() {
        let home = temp_dir();
        let dir = temp_dir();
        fs::write(
            dir.path().join(".logscope.toml"),
            "root = true\n[logs]\nfilters = [\"Error\", \"Trace\"]\n",
        )
        .unwrap();

        logscope_with_home(home.path())
            .current_dir(dir.path())
            .args(["filters", "empty"])
            .assert()
            .success()
            .stdout("Error\nTrace\n");
    }
}

mod sync {
    use super::*;

    #[test]
    fn copies_and_indexes_cache() {
        let project = Project::new();
        let cache = project.dir.path().join("cache");

        project
            .cmd()
            .args(["sync", "logs", "cache", "-f", "app", "--index", "-q"])
            .args(JANUARY)
            .assert()
            .success()
            .stdout(predicate::str::contains("2 copied"))
            .stdout(predicate::str::contains("Indexed 2 files"));

        assert!(cache.join("app.log20250101").exists());
        assert!(!cache.join("db.log20250102").exists());
        let json = project.search_json(&["timeout"]);
        let path = json["results"][0]["file_path"].as_str().unwrap().to_string();
        assert!(path.contains("cache"));
    }

    #[test]
    fn second_sync_skips_current_copies() {
        let project = Project::new();
        project
            .cmd()
            .args(["sync", "logs", "cache", "-q"])
            .args(JANUARY)
            .assert()
            .success();

        project
            .cmd()
            .args(["sync", "logs", "cache", "-q"])
            .args(JANUARY)
            .assert()
            .success()
            .stdout(predicate::str::contains("0 copied, 3 up to date"));
    }

    #[test]
    fn missing_remote_fails() {
        let project = Project::new();

        project
            .cmd()
            .args(["sync", "nowhere", "cache"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("directory not found"));
    }

    #[test]
    fn needs_remote() {
        let project = Project::new();

        project
            .cmd()
            .arg("sync")
            .assert()
            .failure()
            .stderr(predicate::str::contains("sync.remote"));
    }
}
