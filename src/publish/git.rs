use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

use super::PublishError;

/// Runs git subcommands in a fixed working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<(), PublishError> {
        let command = format!("git {}", args.join(" "));
        debug!(command = %command, "running git");

        let status = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .status()
            .map_err(|source| PublishError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !status.success() {
            return Err(PublishError::Git { command, status });
        }
        Ok(())
    }

    /// Set the committer identity for this repository only.
    pub fn configure_user(&self, name: &str, email: &str) -> Result<(), PublishError> {
        self.run(&["config", "user.name", name])?;
        self.run(&["config", "user.email", email])
    }

    pub fn checkout_new_branch(&self, branch: &str) -> Result<(), PublishError> {
        self.run(&["checkout", "-b", branch])
    }

    /// Stage `file`, commit it, and push `branch` to origin.
    pub fn commit_and_push(&self, file: &Path, branch: &str, message: &str) -> Result<(), PublishError> {
        let file = file.to_string_lossy();
        self.run(&["add", &*file])?;
        self.run(&["commit", "-m", message])?;
        self.run(&["push", "origin", branch])
    }
}
