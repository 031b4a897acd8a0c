use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::annotate::AnnotationProcessor;
use crate::github::MetadataSource;
use crate::links::RepoLinkParser;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid repository host: {0}")]
    Host(#[from] regex::Error),
}

/// What happened to the document during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    /// The file does not exist; nothing was done
    Missing,
    /// No repository links were found
    NoLinks,
    /// Links were found but the text did not change
    Unchanged,
    /// The file was rewritten
    Rewritten,
}

#[derive(Debug, Clone)]
pub struct DocumentUpdate {
    pub path: PathBuf,
    pub status: DocumentStatus,
    /// Links whose annotation was added or refreshed. Publishing is gated
    /// on this being non-empty.
    pub updated_links: Vec<String>,
}

impl DocumentUpdate {
    fn new(path: &Path, status: DocumentStatus) -> Self {
        Self {
            path: path.to_path_buf(),
            status,
            updated_links: Vec::new(),
        }
    }
}

/// Reads a document, annotates its repository links, and writes it back
/// when the text changed.
pub struct DocumentUpdater<S> {
    parser: RepoLinkParser,
    processor: AnnotationProcessor<S>,
}

impl<S: MetadataSource> DocumentUpdater<S> {
    pub fn new(host: &str, processor: AnnotationProcessor<S>) -> Result<Self, DocumentError> {
        Ok(Self {
            parser: RepoLinkParser::new(host)?,
            processor,
        })
    }

    #[cfg(test)]
    pub fn processor(&self) -> &AnnotationProcessor<S> {
        &self.processor
    }

    /// Run one update pass over `path`.
    ///
    /// A missing file is reported and yields [`DocumentStatus::Missing`];
    /// any other read or write failure is returned as an error.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub async fn update(&mut self, path: &Path) -> Result<DocumentUpdate, DocumentError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                error!("file not found");
                return Ok(DocumentUpdate::new(path, DocumentStatus::Missing));
            }
            Err(source) => {
                return Err(DocumentError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let links = self.parser.parse(&content);
        if links.is_empty() {
            info!("no repository links found");
            return Ok(DocumentUpdate::new(path, DocumentStatus::NoLinks));
        }
        info!(links = links.len(), "annotating repository links");

        let outcome = self.processor.process(&content, &links).await;
        if outcome.content == content {
            info!("no changes made");
            return Ok(DocumentUpdate::new(path, DocumentStatus::Unchanged));
        }

        fs::write(path, &outcome.content).map_err(|source| DocumentError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(updated = outcome.updated.len(), "document rewritten");
        for link in &outcome.updated {
            info!(url = %link, "updated link");
        }

        Ok(DocumentUpdate {
            path: path.to_path_buf(),
            status: DocumentStatus::Rewritten,
            updated_links: outcome.updated,
        })
    }
}
