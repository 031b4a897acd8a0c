use serde::{Deserialize, Serialize};

/// Snapshot of a repository's public stats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoMetadata {
    /// Stargazer count
    pub stars: u64,
    /// Last-updated timestamp as returned by the API ("" when absent)
    pub updated: String,
}

/// Subset of the GitHub "get a repository" response that is annotated.
#[derive(Debug, Deserialize)]
pub(crate) struct RepoResponse {
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl From<RepoResponse> for RepoMetadata {
    fn from(response: RepoResponse) -> Self {
        Self {
            stars: response.stargazers_count,
            updated: response.updated_at.unwrap_or_default(),
        }
    }
}

/// Request body for opening a pull request.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePullRequest {
    pub title: String,
    /// Branch carrying the changes
    pub head: String,
    /// Branch to merge into
    pub base: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PullRequestResponse {
    pub html_url: Option<String>,
}
