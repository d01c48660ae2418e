//! Local working copy inspection
//!
//! Classifies what is on disk at a repository's clone location, without
//! touching it.

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::SyncError;

/// Local presence of a repository's working copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalSyncState {
    /// Nothing exists at the clone location
    NotPresent,
    /// `<name>/.git` is a directory
    ClonedAsGitRepo,
    /// Something is in the way of a clone or fetch
    ConflictingPath(Conflict),
}

/// Why a clone location cannot be used as is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// `<name>/.git` exists but is a file or other non-directory
    GitDirNotDirectory { path: String },
    /// `<name>` exists but has no `.git` entry
    NotAGitRepository { path: String },
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GitDirNotDirectory { path } => {
                write!(f, "git-dir path exists but is not a directory: {}", path)
            }
            Self::NotAGitRepository { path } => write!(
                f,
                "clone directory already exists but is not a git repository: {}",
                path
            ),
        }
    }
}

/// Inspects working copies below a base directory
#[derive(Debug, Clone)]
pub struct LocalInspector {
    base_directory: PathBuf,
}

impl LocalInspector {
    pub fn new(base_directory: impl Into<PathBuf>) -> Self {
        Self {
            base_directory: base_directory.into(),
        }
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Classify the local state of repository `name`.
    ///
    /// Only errors other than "not found" are returned as `Err`.
    pub async fn inspect(&self, name: &str) -> Result<LocalSyncState, SyncError> {
        let repo_dir = self.base_directory.join(name);
        let git_dir = repo_dir.join(".git");

        match stat(&git_dir).await? {
            Some(metadata) if metadata.is_dir() => {
                debug!("{} is a git working copy", repo_dir.display());
                return Ok(LocalSyncState::ClonedAsGitRepo);
            }
            Some(_) => {
                return Ok(LocalSyncState::ConflictingPath(
                    Conflict::GitDirNotDirectory {
                        path: format!("{}/.git", name),
                    },
                ));
            }
            None => {}
        }

        match stat(&repo_dir).await? {
            Some(_) => Ok(LocalSyncState::ConflictingPath(
                Conflict::NotAGitRepository {
                    path: name.to_string(),
                },
            )),
            None => Ok(LocalSyncState::NotPresent),
        }
    }
}

/// `stat` that maps "not found" to `None`
async fn stat(path: &Path) -> Result<Option<std::fs::Metadata>, SyncError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SyncError::Filesystem {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    fn setup() -> (TempDir, LocalInspector) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let inspector = LocalInspector::new(temp_dir.path());
        (temp_dir, inspector)
    }

    #[tokio::test]
    async fn test_git_directory_is_cloned() {
        let (temp_dir, inspector) = setup();
        std::fs::create_dir_all(temp_dir.path().join("myRepo/.git")).unwrap();

        let state = inspector.inspect("myRepo").await.unwrap();
        assert_eq!(state, LocalSyncState::ClonedAsGitRepo);
    }

    #[tokio::test]
    async fn test_git_file_is_conflicting() {
        let (temp_dir, inspector) = setup();
        std::fs::create_dir_all(temp_dir.path().join("myRepo")).unwrap();
        std::fs::write(temp_dir.path().join("myRepo/.git"), "gitdir: elsewhere").unwrap();

        let state = inspector.inspect("myRepo").await.unwrap();
        assert_matches!(
            &state,
            LocalSyncState::ConflictingPath(conflict @ Conflict::GitDirNotDirectory { .. })
                if conflict.to_string().contains("myRepo/.git")
        );
    }

    #[tokio::test]
    async fn test_directory_without_git_is_conflicting() {
        let (temp_dir, inspector) = setup();
        std::fs::create_dir_all(temp_dir.path().join("myRepo")).unwrap();

        let state = inspector.inspect("myRepo").await.unwrap();
        assert_matches!(
            state,
            LocalSyncState::ConflictingPath(Conflict::NotAGitRepository { ref path }) if path == "myRepo"
        );
    }

    #[tokio::test]
    async fn test_plain_file_is_filesystem_error() {
        let (temp_dir, inspector) = setup();
        // Stat of myRepo/.git fails with ENOTDIR, which is not "not found"
        std::fs::write(temp_dir.path().join("myRepo"), "not a directory").unwrap();

        let result = inspector.inspect("myRepo").await;
        assert_matches!(
            result,
            Err(SyncError::Filesystem { ref path, .. }) if path.ends_with("myRepo/.git")
        );
    }

    #[tokio::test]
    async fn test_missing_repo_is_not_present() {
        let (_temp_dir, inspector) = setup();

        let state = inspector.inspect("myRepo").await.unwrap();
        assert_eq!(state, LocalSyncState::NotPresent);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlinked_git_dir_counts_as_cloned() {
        let (temp_dir, inspector) = setup();
        std::fs::create_dir_all(temp_dir.path().join("store/myRepo.git")).unwrap();
        std::fs::create_dir_all(temp_dir.path().join("myRepo")).unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("store/myRepo.git"),
            temp_dir.path().join("myRepo/.git"),
        )
        .unwrap();

        let state = inspector.inspect("myRepo").await.unwrap();
        assert_eq!(state, LocalSyncState::ClonedAsGitRepo);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_not_found_errors_propagate() {
        let (temp_dir, inspector) = setup();
        // A file used as a directory component fails with ENOTDIR, not ENOENT
        std::fs::write(temp_dir.path().join("blocker"), "").unwrap();

        let result = inspector.inspect("blocker/myRepo").await;
        assert_matches!(result, Err(SyncError::Filesystem { .. }));
    }

    #[test]
    fn test_conflict_messages() {
        let conflict = Conflict::GitDirNotDirectory {
            path: "a/.git".to_string(),
        };
        assert_eq!(
            conflict.to_string(),
            "git-dir path exists but is not a directory: a/.git"
        );

        let conflict = Conflict::NotAGitRepository {
            path: "a".to_string(),
        };
        assert_eq!(
            conflict.to_string(),
            "clone directory already exists but is not a git repository: a"
        );
    }
}
