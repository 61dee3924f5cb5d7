//! Integration tests for the command-line workflow.
//!
//! Each test runs the real binary against a configuration written to a
//! temporary directory, so nothing outside that directory is touched.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Temporary configuration, cache and log directories.
struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(profile: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let ini = format!(
            "[profile]\ntype = {}\n\n[cache]\ntype = quadkey\npath = {}\n",
            profile,
            dir.path().join("cache").display()
        );
        fs::write(dir.path().join("config.ini"), ini).unwrap();
        Self { dir }
    }

    fn config(&self) -> PathBuf {
        self.dir.path().join("config.ini")
    }

    fn cache(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_quadterra"))
            .args(args)
            .arg("--config")
            .arg(self.config())
            .arg("--log-dir")
            .arg(self.dir.path().join("logs"))
            .arg("--quiet")
            .output()
            .expect("Failed to execute CLI command")
    }
}

/// Assert a command succeeded and return its stdout.
fn assert_success(output: &Output, context: &str) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("{} failed:\nstdout: {}\nstderr: {}", context, stdout, stderr);
    }
    stdout
}

fn count_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|entry| {
                    let path = entry.path();
                    if path.is_dir() {
                        count_files(&path)
                    } else {
                        1
                    }
                })
                .sum()
        })
        .unwrap_or(0)
}

#[test]
fn test_key_command_describes_key() {
    let ws = Workspace::new("geodetic");
    let stdout = assert_success(&ws.run(&["key", "g13"]), "key");

    assert!(stdout.contains("Key:          g13"));
    assert!(stdout.contains("Parent:       g1"));
    assert!(stdout.contains("Children:     g130 g131 g132 g133"));
}

#[test]
fn test_invalid_key_exits_with_usage_code() {
    let ws = Workspace::new("geodetic");
    let output = ws.run(&["key", "z1"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid tile key"));
}

#[test]
fn test_path_command_marks_configured_scheme() {
    let ws = Workspace::new("mercator");
    let stdout = assert_success(&ws.run(&["path", "m0", "--source", "osm"]), "path");

    let quadkey_line = stdout
        .lines()
        .find(|line| line.contains("quadkey"))
        .expect("quadkey line");
    assert!(quadkey_line.starts_with('*'));
    assert!(quadkey_line.ends_with("m0.png"));
}

#[test]
fn test_build_with_demo_imagery_populates_cache() {
    let ws = Workspace::new("mercator");
    let stdout = assert_success(&ws.run(&["build", "--max-level", "2"]), "build");

    assert!(stdout.contains("Level  Nodes  Leaves"));
    assert!(stdout.contains("+proj=eqc"));
    assert!(count_files(&ws.cache().join("demo")) > 0);
}

#[test]
fn test_seed_then_rebuild_hits_cache() {
    let ws = Workspace::new("geodetic");
    let seeded = assert_success(
        &ws.run(&["seed", "--min-level", "0", "--max-level", "2"]),
        "seed",
    );
    assert!(seeded.contains("Level  Attempted  Built  Pruned"));
    let files = count_files(&ws.cache());
    assert!(files > 0);

    // Quadrants without data are misses again, but nothing new is written.
    let built = assert_success(&ws.run(&["build", "--max-level", "2"]), "build");
    assert!(built.contains(", 0 write(s)"));
    assert_eq!(count_files(&ws.cache()), files);
}

#[test]
fn test_seed_rejects_inverted_levels() {
    let ws = Workspace::new("geodetic");
    let output = ws.run(&["seed", "--min-level", "3", "--max-level", "1"]);
    assert_eq!(output.status.code(), Some(2));
}
