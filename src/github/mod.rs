pub mod fetcher;
pub mod types;

pub use fetcher::RepoFetcher;
pub use types::{CreatePullRequest, RepoMetadata};

use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::GitHubConfig;
use types::{PullRequestResponse, RepoResponse};

const USER_AGENT: &str = concat!("readme-repo-info/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github+json";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {url}: {body}")]
    Status {
        status: StatusCode,
        url: String,
        body: String,
    },

    #[error("GitHub token not configured")]
    MissingToken,
}

/// Source of repository metadata, keyed by owner and repo name.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Look up a single repository. Every call is one outbound request.
    async fn repo_metadata(&self, owner: &str, repo: &str) -> Result<RepoMetadata, GitHubError>;
}

/// Thin reqwest wrapper around the GitHub REST endpoints the tool uses.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHubError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url).header("Accept", ACCEPT);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Open a pull request against `repository` ("owner/name").
    /// Returns the PR's HTML URL when the API reports one.
    #[instrument(skip(self, request), fields(head = %request.head, base = %request.base))]
    pub async fn create_pull_request(
        &self,
        repository: &str,
        request: &CreatePullRequest,
    ) -> Result<Option<String>, GitHubError> {
        if self.token.is_none() {
            return Err(GitHubError::MissingToken);
        }
        let url = format!("{}/{}/pulls", self.api_base, repository);

        debug!("creating pull request");
        let response = self
            .request(reqwest::Method::POST, &url)
            .json(request)
            .send()
            .await?;

        // The API answers 201 on success; anything else is a failure even if 2xx.
        if response.status() != StatusCode::CREATED {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::Status { status, url, body });
        }

        let created = response.json::<PullRequestResponse>().await?;
        Ok(created.html_url)
    }
}

#[async_trait]
impl MetadataSource for GitHubClient {
    #[instrument(skip(self))]
    async fn repo_metadata(&self, owner: &str, repo: &str) -> Result<RepoMetadata, GitHubError> {
        let url = format!("{}/{}/{}", self.api_base, owner, repo);

        debug!("fetching repository metadata");
        let response = self.request(reqwest::Method::GET, &url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GitHubError::Status { status, url, body });
        }

        let metadata = RepoMetadata::from(response.json::<RepoResponse>().await?);
        debug!(stars = metadata.stars, updated = %metadata.updated, "received repository metadata");
        Ok(metadata)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory metadata source that records every lookup.
    /// Repositories without an entry fail with a 404.
    #[derive(Debug, Default)]
    pub struct StaticSource {
        entries: HashMap<String, RepoMetadata>,
        calls: Mutex<Vec<String>>,
    }

    impl StaticSource {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, key: &str, stars: u64, updated: &str) -> Self {
            self.entries.insert(
                key.to_string(),
                RepoMetadata {
                    stars,
                    updated: updated.to_string(),
                },
            );
            self
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MetadataSource for StaticSource {
        async fn repo_metadata(&self, owner: &str, repo: &str) -> Result<RepoMetadata, GitHubError> {
            let key = format!("{owner}/{repo}");
            self.calls.lock().unwrap().push(key.clone());
            self.entries.get(&key).cloned().ok_or(GitHubError::Status {
                status: StatusCode::NOT_FOUND,
                url: key,
                body: "Not Found".to_string(),
            })
        }
    }
}
