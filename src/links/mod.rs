pub mod context;
pub mod types;

pub use types::{ContextKind, RepoReference, UrlOccurrence};

use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

/// Default host whose repository links are annotated.
pub const DEFAULT_HOST: &str = "github.com";

/// Characters that may continue a URL path. A repository match followed by
/// one of these is part of a longer URL (subpath, issue, longer repo name).
pub fn continues_url_path(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '/')
}

/// Extracts repository references of the form `https://<host>/<owner>/<repo>`.
#[derive(Debug, Clone)]
pub struct RepoLinkParser {
    pattern: Regex,
}

impl RepoLinkParser {
    pub fn new(host: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"https://{}/([\w.-]+)/([\w.-]+)",
            regex::escape(host)
        ))?;
        Ok(Self { pattern })
    }

    /// Return every distinct repository reference in `text`, in order of
    /// first appearance.
    ///
    /// Owner and repo are matched greedily, so the only way a match can be
    /// followed by a path character is a `/` starting a subpath; those
    /// matches are dropped (e.g. `.../widget/issues/5`).
    pub fn parse(&self, text: &str) -> Vec<RepoReference> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for caps in self.pattern.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            if text[whole.end()..]
                .chars()
                .next()
                .is_some_and(continues_url_path)
            {
                continue;
            }

            let full_url = whole.as_str().trim_end_matches('/').to_string();
            if !seen.insert(full_url.clone()) {
                continue;
            }

            let (owner, repo) = match (caps.get(1), caps.get(2)) {
                (Some(owner), Some(repo)) => (owner.as_str(), repo.as_str()),
                _ => continue,
            };
            links.push(RepoReference {
                full_url,
                owner: owner.to_string(),
                repo: repo.to_string(),
            });
        }

        debug!(links = links.len(), "parsed repository links");
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> RepoLinkParser {
        RepoLinkParser::new(DEFAULT_HOST).unwrap()
    }

    fn urls(links: &[RepoReference]) -> Vec<&str> {
        links.iter().map(|l| l.full_url.as_str()).collect()
    }

    #[test]
    fn test_parse_single_link() {
        let links = parser().parse("See https://github.com/acme/widget today.");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].full_url, "https://github.com/acme/widget");
        assert_eq!(links[0].owner, "acme");
        assert_eq!(links[0].repo, "widget");
    }

    #[test]
    fn test_parse_collapses_duplicates() {
        let text = "https://github.com/acme/widget and again https://github.com/acme/widget";
        let links = parser().parse(text);
        assert_eq!(urls(&links), vec!["https://github.com/acme/widget"]);
    }

    #[test]
    fn test_parse_excludes_subpaths() {
        let text = "Bug: https://github.com/acme/widget/issues/5\nTree: https://github.com/acme/widget/tree/main";
        assert!(parser().parse(text).is_empty());
    }

    #[test]
    fn test_parse_keeps_dots_and_hyphens() {
        let text = "[x](https://github.com/some-org/my.repo_v2) and https://github.com/a/b";
        let links = parser().parse(text);
        assert_eq!(
            urls(&links),
            vec!["https://github.com/some-org/my.repo_v2", "https://github.com/a/b"]
        );
        assert_eq!(links[0].owner, "some-org");
        assert_eq!(links[0].repo, "my.repo_v2");
    }

    #[test]
    fn test_parse_distinguishes_longer_names() {
        let text = "https://github.com/acme/widget https://github.com/acme/widget-pro";
        let links = parser().parse(text);
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_parse_ignores_other_hosts_and_schemes() {
        let text = "http://github.com/acme/widget https://gitlab.com/acme/widget https://github.com/acme";
        assert!(parser().parse(text).is_empty());
    }

    #[test]
    fn test_parse_custom_host() {
        let parser = RepoLinkParser::new("git.example.org").unwrap();
        let links = parser.parse("https://git.example.org/team/tool and https://github.com/acme/widget");
        assert_eq!(urls(&links), vec!["https://git.example.org/team/tool"]);
    }

    #[test]
    fn test_parse_link_closed_by_paren() {
        let links = parser().parse("[w](https://github.com/acme/widget)");
        assert_eq!(urls(&links), vec!["https://github.com/acme/widget"]);
    }
}
