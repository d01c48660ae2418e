/// Common test utilities and helpers for octosync CLI tests
use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use std::path::PathBuf;

/// Isolated working and configuration directories for one CLI run
pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        temp_dir
            .child("xdg")
            .create_dir_all()
            .expect("Failed to create config dir");
        temp_dir
            .child("work")
            .create_dir_all()
            .expect("Failed to create work dir");

        Self { temp_dir }
    }

    pub fn work_dir(&self) -> PathBuf {
        self.temp_dir.child("work").path().to_path_buf()
    }

    pub fn create_test_config(&self, content: &str) -> PathBuf {
        let config = self.temp_dir.child("config.yml");
        config.write_str(content).expect("Failed to write test config");
        config.path().to_path_buf()
    }

    /// `octosync` command with no token and no user configuration
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("octosync").expect("Binary not built");
        cmd.current_dir(self.work_dir())
            .env("XDG_CONFIG_HOME", self.temp_dir.child("xdg").path())
            .env("NO_COLOR", "1")
            .env_remove("GITHUB_TOKEN")
            .env_remove("RUST_LOG");
        cmd
    }
}
