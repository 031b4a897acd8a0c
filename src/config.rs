use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = ".readme-repo-info.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid update mode \"{0}\" (expected \"direct\" or \"pr\")")]
    InvalidMode(String),
}

/// Top-level configuration.
///
/// All fields are optional; the tool runs with zero config. Values are
/// layered: defaults, then the TOML file, then environment variables, then
/// CLI flags (applied by the caller).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub document: DocumentConfig,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub publish: PublishConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Document to annotate
    pub path: PathBuf,
    /// Host whose `https://<host>/<owner>/<repo>` links are annotated
    pub host: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("README.md"),
            host: crate::links::DEFAULT_HOST.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// GitHub API token. If None, falls back to GITHUB_TOKEN env var.
    pub token: Option<String>,
    /// Base URL of the repositories endpoint
    pub api_base: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: "https://api.github.com/repos".to_string(),
            timeout_secs: 10,
        }
    }
}

/// How changes are published once the document has been rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    /// Commit and push straight to the base branch
    #[default]
    Direct,
    /// Push a new branch and open a pull request
    Pr,
}

impl FromStr for PublishMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "direct" => Ok(PublishMode::Direct),
            "pr" => Ok(PublishMode::Pr),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for PublishMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishMode::Direct => f.write_str("direct"),
            PublishMode::Pr => f.write_str("pr"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    pub mode: PublishMode,
    /// Branch pushed to in direct mode, PR target in pr mode
    pub base_branch: String,
    /// Repository ("owner/name") pull requests are opened against
    pub repository: Option<String>,
    /// Used as both the commit message and the PR title
    pub commit_message: String,
    pub committer_name: String,
    pub committer_email: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            mode: PublishMode::Direct,
            base_branch: "master".to_string(),
            repository: None,
            commit_message: "chore: update repo info in README".to_string(),
            committer_name: "github-actions[bot]".to_string(),
            committer_email: "41898282+github-actions[bot]@users.noreply.github.com".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from .readme-repo-info.toml in the
    /// current directory when no path is given, then apply environment
    /// overrides. A missing default file yields the default config; a
    /// missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default_path = Path::new(CONFIG_FILE);
                if default_path.exists() {
                    Self::load_from(default_path)?
                } else {
                    Config::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply README_PATH, UPDATE_MODE, BASE_BRANCH and GITHUB_REPOSITORY over
    /// the current values. GITHUB_TOKEN only fills a token the file left
    /// unset. Empty variables are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = var("README_PATH") {
            self.document.path = PathBuf::from(path);
        }
        if self.github.token.is_none() {
            self.github.token = var("GITHUB_TOKEN");
        }
        if let Some(mode) = var("UPDATE_MODE") {
            self.publish.mode = mode.parse()?;
        }
        if let Some(branch) = var("BASE_BRANCH") {
            self.publish.base_branch = branch;
        }
        if let Some(repository) = var("GITHUB_REPOSITORY") {
            self.publish.repository = Some(repository);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.document.path, PathBuf::from("README.md"));
        assert_eq!(config.document.host, "github.com");
        assert!(config.github.token.is_none());
        assert_eq!(config.github.api_base, "https://api.github.com/repos");
        assert_eq!(config.github.timeout_secs, 10);
        assert_eq!(config.publish.mode, PublishMode::Direct);
        assert_eq!(config.publish.base_branch, "master");
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
[document]
path = "docs/LIST.md"

[github]
timeout_secs = 3

[publish]
mode = "pr"
repository = "acme/site"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.document.path, PathBuf::from("docs/LIST.md"));
        assert_eq!(config.document.host, "github.com");
        assert_eq!(config.github.timeout_secs, 3);
        assert_eq!(config.publish.mode, PublishMode::Pr);
        assert_eq!(config.publish.repository.as_deref(), Some("acme/site"));
        assert_eq!(config.publish.base_branch, "master");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("README_PATH", "LIST.md"),
                ("GITHUB_TOKEN", "tok"),
                ("UPDATE_MODE", "PR"),
                ("BASE_BRANCH", "main"),
                ("GITHUB_REPOSITORY", "acme/site"),
            ]))
            .unwrap();
        assert_eq!(config.document.path, PathBuf::from("LIST.md"));
        assert_eq!(config.github.token.as_deref(), Some("tok"));
        assert_eq!(config.publish.mode, PublishMode::Pr);
        assert_eq!(config.publish.base_branch, "main");
        assert_eq!(config.publish.repository.as_deref(), Some("acme/site"));
    }

    #[test]
    fn test_file_token_wins_over_env() {
        let mut config: Config = toml::from_str("[github]\ntoken = \"from-file\"").unwrap();
        config.apply_env(env(&[("GITHUB_TOKEN", "from-env")])).unwrap();
        assert_eq!(config.github.token.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_empty_env_is_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[("GITHUB_TOKEN", ""), ("BASE_BRANCH", " ")])).unwrap();
        assert!(config.github.token.is_none());
        assert_eq!(config.publish.base_branch, "master");
    }

    #[test]
    fn test_invalid_mode() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[("UPDATE_MODE", "merge")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMode(mode) if mode == "merge"));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead(_)));
    }
}
