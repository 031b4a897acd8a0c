pub mod format;

pub use format::{InfoFormatter, ANNOTATION_MARK};

use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;
use tracing::debug;

use crate::github::{MetadataSource, RepoFetcher};
use crate::links::{context, continues_url_path, ContextKind, RepoReference, UrlOccurrence};

/// Result of annotating one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationOutcome {
    pub content: String,
    /// URLs whose annotation was added or changed, in the order the edits
    /// were applied (last occurrence in the document first).
    pub updated: Vec<String>,
}

/// A single text replacement. `refreshed` is false for edits that only
/// strip a stale annotation.
#[derive(Debug)]
struct Edit {
    range: Range<usize>,
    replacement: String,
    refreshed: bool,
}

/// Rewrites repository links in a document with fresh annotations.
pub struct AnnotationProcessor<S> {
    fetcher: RepoFetcher<S>,
    formatter: InfoFormatter,
    existing: Regex,
}

impl<S: MetadataSource> AnnotationProcessor<S> {
    pub fn new(fetcher: RepoFetcher<S>, formatter: InfoFormatter) -> Result<Self, regex::Error> {
        // Whitespace, a "(⭐ ...)" block on the same line, then our marker or
        // the visible `<!-- repo-info -->` one older releases wrote. Blocks with no marker at all also match so
        // hand-written or pre-marker annotations get replaced, not doubled.
        let existing = Regex::new(&format!(
            r"\A\s*\(⭐[^)\n]*\)(?:{}|<!--\s*repo-info\s*-->)?",
            regex::escape(formatter.mark())
        ))?;
        Ok(Self {
            fetcher,
            formatter,
            existing,
        })
    }

    #[cfg(test)]
    pub fn fetcher(&self) -> &RepoFetcher<S> {
        &self.fetcher
    }

    /// Locate every occurrence of every reference and classify it.
    ///
    /// The result is sorted by descending start offset. A literal match only
    /// counts when it is not the prefix of a longer URL.
    pub fn find_occurrences<'r>(
        &self,
        content: &str,
        links: &'r [RepoReference],
    ) -> Vec<UrlOccurrence<'r>> {
        let mut seen = HashSet::new();
        let mut occurrences = Vec::new();

        for reference in links {
            if !seen.insert(reference.full_url.as_str()) {
                continue;
            }
            for (start, url) in content.match_indices(reference.full_url.as_str()) {
                let end = start + url.len();
                if content[end..].chars().next().is_some_and(continues_url_path) {
                    continue;
                }
                occurrences.push(UrlOccurrence {
                    start,
                    end,
                    reference,
                    context: context::detect(content, start, end),
                });
            }
        }

        occurrences.sort_by(|a, b| b.start.cmp(&a.start));
        occurrences
    }

    /// Annotate every eligible occurrence of `links` in `content`.
    ///
    /// Edits are applied from the end of the document backwards, so the
    /// offsets of occurrences not yet visited stay valid throughout. A link
    /// text edit inserts before its own URL; any occurrence ending past that
    /// insertion point has stale offsets and is left untouched.
    pub async fn process(&mut self, content: &str, links: &[RepoReference]) -> AnnotationOutcome {
        let occurrences = self.find_occurrences(content, links);
        let mut text = content.to_string();
        let mut updated = Vec::new();
        // Lowest offset rewritten so far; text before it still matches `content`.
        let mut edited_from = content.len();

        for occurrence in &occurrences {
            if !occurrence.context.is_annotatable() {
                debug!(url = %occurrence.reference.full_url, context = %occurrence.context, "skipping URL");
                continue;
            }
            if occurrence.end > edited_from {
                debug!(url = %occurrence.reference.full_url, "skipping URL inside rewritten link");
                continue;
            }

            let edit = match occurrence.context {
                ContextKind::MarkdownLink => self.markdown_link_edit(&text, occurrence).await,
                _ => self.plain_text_edit(&text, occurrence).await,
            };
            let Some(edit) = edit else { continue };

            if text[edit.range.clone()] == edit.replacement {
                continue;
            }
            debug!(
                url = %occurrence.reference.full_url,
                context = %occurrence.context,
                refreshed = edit.refreshed,
                "rewriting annotation"
            );
            edited_from = edit.range.start;
            text.replace_range(edit.range, &edit.replacement);
            if edit.refreshed {
                updated.push(occurrence.reference.full_url.clone());
            }
        }

        AnnotationOutcome {
            content: text,
            updated,
        }
    }

    /// `[text](url)`: append the annotation to the link text unless it
    /// already carries one.
    async fn markdown_link_edit(&mut self, text: &str, occurrence: &UrlOccurrence<'_>) -> Option<Edit> {
        let reference = occurrence.reference;
        let metadata = self.fetcher.fetch(&reference.owner, &reference.repo).await;
        let suffix = self.formatter.format_link_text(metadata.as_ref());
        if suffix.is_empty() {
            return None;
        }

        let before = &text[..occurrence.start];
        let bracket = before.rfind("](")?;
        let text_start = before[..bracket].rfind('[')? + 1;
        text[occurrence.end..].find(')')?;

        if text[text_start..bracket].contains('⭐') {
            return None;
        }
        Some(Edit {
            range: bracket..bracket,
            replacement: format!(" {suffix}"),
            refreshed: true,
        })
    }

    /// Bare URL: replace whatever annotation follows it with a fresh one, or
    /// strip it when the metadata could not be fetched.
    async fn plain_text_edit(&mut self, text: &str, occurrence: &UrlOccurrence<'_>) -> Option<Edit> {
        let reference = occurrence.reference;
        let metadata = self.fetcher.fetch(&reference.owner, &reference.repo).await;
        let annotation = self.formatter.format(metadata.as_ref());

        let existing_len = self.existing_annotation_len(text, occurrence.end);
        let range = occurrence.end..occurrence.end + existing_len;

        if annotation.is_empty() {
            if existing_len == 0 {
                return None;
            }
            return Some(Edit {
                range,
                replacement: String::new(),
                refreshed: false,
            });
        }
        Some(Edit {
            range,
            replacement: format!(" {annotation}"),
            refreshed: true,
        })
    }

    /// Length in bytes of an annotation-shaped span starting at `offset`.
    fn existing_annotation_len(&self, text: &str, offset: usize) -> usize {
        self.existing.find(&text[offset..]).map_or(0, |m| m.end())
    }
}
