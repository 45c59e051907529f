//! Isolated test environment with temp directory.

use super::{QuireCommand, TestNote};
use quire::infra::PathResolver;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated test environment with a temporary notes directory.
///
/// Creates a temp directory that is automatically cleaned up on drop.
/// Holds a separate config directory so the user's own config is never read.
pub struct TestEnv {
    /// The temporary directory (kept for lifetime management)
    _temp_dir: TempDir,
    /// Path to the notes directory
    notes_dir: PathBuf,
    /// Path used as `XDG_CONFIG_HOME`
    config_home: PathBuf,
}

impl TestEnv {
    /// Creates a new isolated test environment with an empty notes directory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let notes_dir = temp_dir.path().join("notes");
        let config_home = temp_dir.path().join("config");
        std::fs::create_dir_all(&notes_dir).expect("Failed to create notes directory");
        std::fs::create_dir_all(&config_home).expect("Failed to create config directory");
        Self {
            _temp_dir: temp_dir,
            notes_dir,
            config_home,
        }
    }

    /// Returns the path to the notes directory.
    pub fn notes_dir(&self) -> &Path {
        &self.notes_dir
    }

    /// Returns the file a title is stored in.
    pub fn note_path(&self, title: &str) -> PathBuf {
        PathResolver::new(&self.notes_dir)
            .resolve(title)
            .expect("Title should resolve")
    }

    /// Writes a note file directly, bypassing the binary.
    pub fn add_note(&self, note: &TestNote) -> PathBuf {
        let path = self.note_path(note.title());
        std::fs::write(&path, note.to_raw()).expect("Failed to write test note");
        path
    }

    /// Reads a note file directly.
    pub fn read_note(&self, title: &str) -> String {
        std::fs::read_to_string(self.note_path(title)).expect("Failed to read note")
    }

    /// Writes an arbitrary file into the notes directory.
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.notes_dir.join(name);
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Creates a QuireCommand configured for this test environment.
    pub fn cmd(&self) -> QuireCommand {
        QuireCommand::new()
            .config_home(&self.config_home)
            .dir(&self.notes_dir)
    }

    /// Creates a QuireCommand without `--dir`, for testing directory resolution.
    pub fn cmd_without_dir(&self) -> QuireCommand {
        QuireCommand::new().config_home(&self.config_home)
    }

    /// Writes `~/.config/quire/config.toml` for this environment.
    pub fn write_config(&self, contents: &str) {
        let dir = self.config_home.join("quire");
        std::fs::create_dir_all(&dir).expect("Failed to create config dir");
        std::fs::write(dir.join("config.toml"), contents).expect("Failed to write config");
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===========================================
    // TestEnv Foundation
    // ===========================================

    #[test]
    fn test_env_creates_notes_directory() {
        let env = TestEnv::new();
        assert!(env.notes_dir().is_dir());
    }

    #[test]
    fn test_env_cleanup_on_drop() {
        let path = {
            let env = TestEnv::new();
            env.notes_dir().to_path_buf()
        };
        assert!(!path.exists(), "temp directory should be cleaned up on drop");
    }

    #[test]
    fn test_env_provides_command_with_dir() {
        let env = TestEnv::new();
        let cmd = env.cmd();
        let args = cmd.get_args();
        assert_eq!(args[0], "--dir");
        assert_eq!(args[1], env.notes_dir().to_string_lossy());
    }

    #[test]
    fn test_env_add_note_uses_sanitized_name() {
        let env = TestEnv::new();
        let path = env.add_note(&TestNote::new("What? A note!"));

        assert!(path.ends_with("What A note.md"));
        assert!(env.read_note("What? A note!").contains("What? A note!"));
    }
}
