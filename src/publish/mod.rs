pub mod git;

pub use git::Git;

use chrono::{DateTime, Local};
use std::path::Path;
use std::process::ExitStatus;
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::{PublishConfig, PublishMode};
use crate::github::{CreatePullRequest, GitHubClient, GitHubError};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed with {status}")]
    Git { command: String, status: ExitStatus },

    #[error("Pull request mode needs a target repository (GITHUB_REPOSITORY)")]
    MissingRepository,

    #[error("Pull request mode needs a GitHub token (GITHUB_TOKEN)")]
    MissingToken,

    #[error("Failed to create pull request: {0}")]
    PullRequest(#[from] GitHubError),
}

/// Branch name for a pull-request run started at `now`.
pub fn pr_branch_name(now: DateTime<Local>) -> String {
    format!("update-repo-info-{}", now.format("%Y%m%d%H%M%S"))
}

pub fn pr_body(updated_links: usize) -> String {
    format!("Automated update of repo info in README.\n\nUpdated {updated_links} repository links.")
}

/// Publish the rewritten document according to `config.mode`.
///
/// Prerequisites for pull-request mode are checked before any git command
/// runs, so a misconfigured run leaves the working tree untouched.
#[instrument(skip_all, fields(mode = %config.mode, document = %document.display()))]
pub async fn publish(
    config: &PublishConfig,
    git: &Git,
    client: &GitHubClient,
    document: &Path,
    updated_links: usize,
) -> Result<(), PublishError> {
    match config.mode {
        PublishMode::Direct => {
            git.configure_user(&config.committer_name, &config.committer_email)?;
            git.commit_and_push(document, &config.base_branch, &config.commit_message)?;
            info!(branch = %config.base_branch, "pushed changes");
            Ok(())
        }
        PublishMode::Pr => {
            let repository = config
                .repository
                .as_deref()
                .ok_or(PublishError::MissingRepository)?;
            if !client.has_token() {
                return Err(PublishError::MissingToken);
            }

            let branch = pr_branch_name(Local::now());
            git.configure_user(&config.committer_name, &config.committer_email)?;
            git.checkout_new_branch(&branch)?;
            git.commit_and_push(document, &branch, &config.commit_message)?;
            info!(branch = %branch, "pushed changes");

            let request = CreatePullRequest {
                title: config.commit_message.clone(),
                head: branch,
                base: config.base_branch.clone(),
                body: pr_body(updated_links),
            };
            let url = client.create_pull_request(repository, &request).await?;
            info!(url = url.as_deref().unwrap_or("<unknown>"), "pull request created");
            Ok(())
        }
    }
}
