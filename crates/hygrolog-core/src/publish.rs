//! Publishing the data files to a git remote.
//!
//! After persistence the capture loop can optionally stage, commit, and push
//! the changed data files. The contract kept by the loop is deliberately
//! loose: "nothing changed" and a transient failure are both non-fatal
//! no-ops, never retried within the same tick.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use thiserror::Error;
use time::macros::format_description;
use tracing::{debug, info};

use crate::clock::now_civil;

/// Outcome of one publish attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A commit was created and pushed.
    Published,
    /// The working tree had no changes to the given paths.
    NoChanges,
}

/// Errors that can occur while publishing.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The git binary could not be spawned.
    #[error("Failed to run `git {command}`: {source}")]
    Spawn {
        command: &'static str,
        source: std::io::Error,
    },

    /// A git command exited unsuccessfully.
    #[error("`git {command}` failed: {stderr}")]
    Command {
        command: &'static str,
        stderr: String,
    },
}

/// The publish seam exposed to the capture loop.
pub trait Publisher: Send {
    /// Stage the given paths, commit with a timestamped message, and push.
    fn publish(&self, paths: &[PathBuf]) -> Result<PublishOutcome, PublishError>;
}

/// A [`Publisher`] that shells out to git.
pub struct GitPublisher {
    repo_dir: PathBuf,
    remote: String,
    branch: String,
}

impl GitPublisher {
    /// Create a publisher for the repository at `repo_dir`.
    #[must_use]
    pub fn new(
        repo_dir: impl Into<PathBuf>,
        remote: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            remote: remote.into(),
            branch: branch.into(),
        }
    }

    fn git(&self, command: &'static str, args: &[&str]) -> Result<Output, PublishError> {
        debug!("Running git {} {:?} in {}", command, args, self.repo_dir.display());
        Command::new("git")
            .arg(command)
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .map_err(|e| PublishError::Spawn { command, source: e })
    }
}

impl Publisher for GitPublisher {
    fn publish(&self, paths: &[PathBuf]) -> Result<PublishOutcome, PublishError> {
        let path_args: Vec<&str> = paths.iter().filter_map(|p| p.to_str()).collect();

        let add = self.git("add", &path_args)?;
        if !add.status.success() {
            return Err(PublishError::Command {
                command: "add",
                stderr: String::from_utf8_lossy(&add.stderr).into_owned(),
            });
        }

        let message = commit_message();
        let commit = self.git("commit", &["-m", &message])?;
        if !commit.status.success() {
            let combined = format!(
                "{}{}",
                String::from_utf8_lossy(&commit.stdout),
                String::from_utf8_lossy(&commit.stderr)
            );
            if is_nothing_to_commit(&combined) {
                debug!("Nothing to publish");
                return Ok(PublishOutcome::NoChanges);
            }
            return Err(PublishError::Command {
                command: "commit",
                stderr: combined,
            });
        }

        let push = self.git("push", &[self.remote.as_str(), self.branch.as_str()])?;
        if !push.status.success() {
            return Err(PublishError::Command {
                command: "push",
                stderr: String::from_utf8_lossy(&push.stderr).into_owned(),
            });
        }

        info!("Pushed data files to {}/{}", self.remote, self.branch);
        Ok(PublishOutcome::Published)
    }
}

fn commit_message() -> String {
    let ts = now_civil()
        .format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        ))
        .unwrap_or_default();
    format!("Update data {ts}")
}

/// Whether a failed `git commit` merely had an empty index.
fn is_nothing_to_commit(output: &str) -> bool {
    output.contains("nothing to commit")
        || output.contains("nothing added to commit")
        || output.contains("no changes added to commit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_to_commit_detection() {
        assert!(is_nothing_to_commit(
            "On branch main\nnothing to commit, working tree clean\n"
        ));
        assert!(is_nothing_to_commit(
            "nothing added to commit but untracked files present\n"
        ));
        assert!(!is_nothing_to_commit("fatal: not a git repository\n"));
    }

    #[test]
    fn test_commit_message_shape() {
        let message = commit_message();
        assert!(message.starts_with("Update data "));
        // "Update data " + "YYYY-MM-DD HH:MM:SS"
        assert_eq!(message.len(), "Update data ".len() + 19);
    }

    fn init_repo(dir: &Path) {
        let run = |args: &[&str]| {
            let status = Command::new("git")
                .args(args)
                .current_dir(dir)
                .output()
                .unwrap();
            assert!(status.status.success(), "git {:?} failed", args);
        };
        run(&["init", "-q"]);
        run(&["config", "user.email", "test@example.com"]);
        run(&["config", "user.name", "test"]);
    }

    #[test]
    #[ignore = "requires a git binary"]
    fn test_publish_reports_no_changes_on_clean_tree() {
        let tmp = tempfile::tempdir().unwrap();
        init_repo(tmp.path());

        let data = tmp.path().join("data.json");
        std::fs::write(&data, "[]").unwrap();

        let publisher = GitPublisher::new(tmp.path(), "origin", "main");

        // First publish fails at push (no remote configured) but commits.
        let first = publisher.publish(&[data.clone()]);
        assert!(matches!(
            first,
            Err(PublishError::Command { command: "push", .. })
        ));

        // Second publish with an unchanged tree is a no-op before push.
        let second = publisher.publish(&[data]).unwrap();
        assert_eq!(second, PublishOutcome::NoChanges);
    }
}
