//! Fluent wrapper around assert_cmd::Command.

// Allow dead code since not every test binary uses every helper
#![allow(dead_code)]

use assert_cmd::Command;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Fluent wrapper around `assert_cmd::Command` for the `quire` binary.
///
/// Provides a builder-style API for constructing and executing CLI commands.
pub struct QuireCommand {
    args: Vec<String>,
    envs: Vec<(String, String)>,
    config_home: Option<PathBuf>,
    stdin: Option<String>,
}

impl QuireCommand {
    /// Creates a new command for the `quire` binary.
    pub fn new() -> Self {
        Self {
            args: Vec::new(),
            envs: Vec::new(),
            config_home: None,
            stdin: None,
        }
    }

    /// Sets the `--dir` option to specify the notes directory.
    pub fn dir(mut self, path: &Path) -> Self {
        self.args.push("--dir".to_string());
        self.args.push(path.to_string_lossy().to_string());
        self
    }

    /// Points `XDG_CONFIG_HOME` at an isolated directory.
    pub fn config_home(mut self, path: &Path) -> Self {
        self.config_home = Some(path.to_path_buf());
        self
    }

    /// Sets an environment variable for the child process.
    pub fn env(mut self, key: &str, value: impl AsRef<str>) -> Self {
        self.envs.push((key.to_string(), value.as_ref().to_string()));
        self
    }

    /// Feeds text to the command's stdin.
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    /// Adds arguments to the command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().to_string()));
        self
    }

    /// Returns the current arguments (for testing).
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Runs the command and returns an Assert for making assertions.
    #[allow(deprecated)]
    pub fn assert(self) -> assert_cmd::assert::Assert {
        let mut cmd = Command::cargo_bin("quire").expect("Failed to find quire binary");
        cmd.env_remove("QUIRE_DIR").env_remove("RUST_LOG");
        if let Some(home) = &self.config_home {
            cmd.env("XDG_CONFIG_HOME", home);
        }
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        if let Some(input) = self.stdin {
            cmd.write_stdin(input);
        }
        cmd.args(&self.args);
        cmd.assert()
    }

    /// Runs the command, expects success, and returns stdout as a string.
    pub fn output_success(self) -> String {
        let output = self.assert().success().get_output().stdout.clone();
        String::from_utf8(output).expect("Output was not valid UTF-8")
    }

    /// Runs the command, expects success, and parses stdout as JSON.
    pub fn output_json<T: DeserializeOwned>(self) -> T {
        let output = self.output_success();
        serde_json::from_str(&output).expect("Failed to parse output as JSON")
    }

    // ===========================================
    // Command Shortcuts
    // ===========================================

    /// Configures for the `put` command, reading the note from stdin.
    pub fn put(self, title: &str, raw: &str) -> Self {
        self.args(["put", title]).stdin(raw)
    }

    /// Configures for the `show` command.
    pub fn show(self, title: &str) -> Self {
        self.args(["show", title])
    }

    /// Configures for the `rm` command.
    pub fn rm(self, title: &str) -> Self {
        self.args(["rm", title])
    }

    /// Configures for the `find` command with a query.
    pub fn find(self, query: &str) -> Self {
        self.args(["find", query])
    }

    /// Configures for the `ls` command.
    pub fn ls(self) -> Self {
        self.args(["ls"])
    }

    /// Configures for the `links` command.
    pub fn links(self, title: &str) -> Self {
        self.args(["links", title])
    }

    /// Configures for the `backlinks` command.
    pub fn backlinks(self, title: &str) -> Self {
        self.args(["backlinks", title])
    }

    // ===========================================
    // Format Options
    // ===========================================

    /// Adds `--format json` to the command.
    pub fn format_json(self) -> Self {
        self.args(["--format", "json"])
    }
}

impl Default for QuireCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ===========================================
    // QuireCommand Basics
    // ===========================================

    #[test]
    fn test_command_runs_binary() {
        QuireCommand::new().args(["--help"]).assert().success();
    }

    #[test]
    fn test_command_with_dir() {
        let temp = TempDir::new().unwrap();
        let cmd = QuireCommand::new().dir(temp.path());
        let args = cmd.get_args();
        assert_eq!(args[0], "--dir");
        assert_eq!(args[1], temp.path().to_string_lossy());
    }

    #[test]
    fn test_command_shortcuts() {
        let cmd = QuireCommand::new().ls().format_json();
        let args = cmd.get_args();
        assert!(args.contains(&"ls".to_string()));
        assert!(args.contains(&"--format".to_string()));
        assert!(args.contains(&"json".to_string()));
    }
}
