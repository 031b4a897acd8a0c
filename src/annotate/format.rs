use chrono::NaiveDateTime;

use crate::github::RepoMetadata;

/// Invisible sentinel appended to every annotation this tool writes
/// (zero-width space, non-joiner, joiner).
pub const ANNOTATION_MARK: &str = "\u{200B}\u{200C}\u{200D}";

const API_TIMESTAMP: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Renders repository metadata into the annotation wire format.
#[derive(Debug, Clone)]
pub struct InfoFormatter {
    mark: String,
}

impl InfoFormatter {
    pub fn new(mark: impl Into<String>) -> Self {
        Self { mark: mark.into() }
    }

    pub fn mark(&self) -> &str {
        &self.mark
    }

    /// `(⭐ 42, ⏰ 2024-01-02)<mark>`, or "" when there is no metadata.
    pub fn format(&self, metadata: Option<&RepoMetadata>) -> String {
        match metadata {
            Some(metadata) => format!("({}){}", body(metadata), self.mark),
            None => String::new(),
        }
    }

    /// Annotation without the surrounding parentheses, for link text:
    /// `⭐ 42, ⏰ 2024-01-02<mark>`.
    pub fn format_link_text(&self, metadata: Option<&RepoMetadata>) -> String {
        match metadata {
            Some(metadata) => format!("{}{}", body(metadata), self.mark),
            None => String::new(),
        }
    }
}

impl Default for InfoFormatter {
    fn default() -> Self {
        Self::new(ANNOTATION_MARK)
    }
}

fn body(metadata: &RepoMetadata) -> String {
    format!("⭐ {}, ⏰ {}", metadata.stars, display_date(&metadata.updated))
}

/// Reduce an API timestamp to its calendar date. Anything that does not
/// parse is passed through unchanged.
pub fn display_date(updated: &str) -> String {
    match NaiveDateTime::parse_from_str(updated, API_TIMESTAMP) {
        Ok(timestamp) => timestamp.format("%Y-%m-%d").to_string(),
        Err(_) => updated.to_string(),
    }
}
