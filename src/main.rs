mod annotate;
mod config;
mod document;
mod github;
mod links;
mod publish;
mod report;

use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, info_span};
use tracing_subscriber::EnvFilter;

use annotate::{AnnotationProcessor, InfoFormatter};
use config::{Config, PublishMode};
use document::DocumentUpdater;
use github::{GitHubClient, RepoFetcher};

/// readme-repo-info — annotate GitHub repository links in a README with
/// their current star count and last-updated date, then publish the change.
#[derive(Parser, Debug)]
#[command(name = "readme-repo-info", version, about)]
struct Cli {
    /// Document to annotate (default: README.md, or README_PATH)
    document: Option<PathBuf>,

    /// Config file (default: .readme-repo-info.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How to publish changes: push to the base branch or open a pull request
    #[arg(long, value_enum)]
    mode: Option<PublishMode>,

    /// Branch pushed to directly, or targeted by the pull request
    #[arg(long)]
    base_branch: Option<String>,

    /// Repository ("owner/name") to open the pull request against
    #[arg(long)]
    repository: Option<String>,

    /// Rewrite the document but skip git and pull request actions
    #[arg(long)]
    no_publish: bool,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(document) = &self.document {
            config.document.path = document.clone();
        }
        if let Some(mode) = self.mode {
            config.publish.mode = mode;
        }
        if let Some(branch) = &self.base_branch {
            config.publish.base_branch = branch.clone();
        }
        if let Some(repository) = &self.repository {
            config.publish.repository = Some(repository.clone());
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    let _main_span = info_span!("update", document = %config.document.path.display()).entered();

    let client = GitHubClient::new(&config.github)?;
    let processor = AnnotationProcessor::new(RepoFetcher::new(client.clone()), InfoFormatter::default())?;
    let mut updater = DocumentUpdater::new(&config.document.host, processor)?;

    let update = updater.update(&config.document.path).await?;
    report::print(&update);

    if update.updated_links.is_empty() {
        info!("no updates made, skipping publish");
        return Ok(());
    }
    if cli.no_publish {
        info!(updated = update.updated_links.len(), "publishing disabled");
        return Ok(());
    }

    info!(mode = %config.publish.mode, "publishing changes");
    let git = publish::Git::new(".");
    if let Err(e) = publish::publish(
        &config.publish,
        &git,
        &client,
        &config.document.path,
        update.updated_links.len(),
    )
    .await
    {
        // The document is already rewritten; a failed publish does not undo it.
        error!(error = %e, "publishing failed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "readme-repo-info",
            "docs/LIST.md",
            "--mode",
            "pr",
            "--base-branch",
            "main",
            "--repository",
            "acme/site",
        ]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.document.path, PathBuf::from("docs/LIST.md"));
        assert_eq!(config.publish.mode, PublishMode::Pr);
        assert_eq!(config.publish.base_branch, "main");
        assert_eq!(config.publish.repository.as_deref(), Some("acme/site"));
    }

    #[test]
    fn test_cli_defaults_leave_config_alone() {
        let cli = Cli::parse_from(["readme-repo-info"]);
        let mut config = Config::default();
        cli.apply(&mut config);

        assert_eq!(config.document.path, PathBuf::from("README.md"));
        assert_eq!(config.publish.mode, PublishMode::Direct);
        assert!(!cli.no_publish);
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["readme-repo-info", "--mode", "merge"]).is_err());
    }
}
