use std::collections::HashMap;
use tracing::{debug, warn};

use super::{MetadataSource, RepoMetadata};

/// Memoizing front for a [`MetadataSource`].
///
/// Each `owner/repo` is requested at most once per fetcher. Failures are
/// cached as `None`, so a repository that failed once stays failed for the
/// rest of the run.
pub struct RepoFetcher<S> {
    source: S,
    cache: HashMap<String, Option<RepoMetadata>>,
}

impl<S: MetadataSource> RepoFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: HashMap::new(),
        }
    }

    pub async fn fetch(&mut self, owner: &str, repo: &str) -> Option<RepoMetadata> {
        let key = format!("{owner}/{repo}");
        if let Some(cached) = self.cache.get(&key) {
            debug!(repo = %key, "metadata cache hit");
            return cached.clone();
        }

        let result = match self.source.repo_metadata(owner, repo).await {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!(repo = %key, error = %e, "failed to fetch repository metadata");
                None
            }
        };
        self.cache.insert(key, result.clone());
        result
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::testing::StaticSource;

    #[tokio::test]
    async fn test_fetch_is_memoized() {
        let mut fetcher = RepoFetcher::new(StaticSource::new().with("acme/widget", 7, ""));

        let first = fetcher.fetch("acme", "widget").await;
        let second = fetcher.fetch("acme", "widget").await;

        assert_eq!(first, second);
        assert_eq!(first.map(|m| m.stars), Some(7));
        assert_eq!(fetcher.source().calls(), vec!["acme/widget"]);
    }

    #[tokio::test]
    async fn test_failure_is_sticky() {
        let mut fetcher = RepoFetcher::new(StaticSource::new());

        assert!(fetcher.fetch("acme", "missing").await.is_none());
        assert!(fetcher.fetch("acme", "missing").await.is_none());
        assert_eq!(fetcher.source().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_separate_fetchers_do_not_share_cache() {
        let mut first = RepoFetcher::new(StaticSource::new().with("acme/widget", 1, ""));
        let mut second = RepoFetcher::new(StaticSource::new().with("acme/widget", 2, ""));

        assert_eq!(first.fetch("acme", "widget").await.map(|m| m.stars), Some(1));
        assert_eq!(second.fetch("acme", "widget").await.map(|m| m.stars), Some(2));
    }
}
