//! Classification of the text surrounding a URL occurrence.
//!
//! Every check is a pure function of `(content, start, end)` where `start`
//! and `end` are byte offsets of the URL. The checks are cheap line/character
//! scans rather than a Markdown parse, so they inherit a few quirks that are
//! kept deliberately:
//!
//! - Fenced blocks are tracked by parity: every line starting with ```
//!   toggles the "inside a block" flag, so a stray unmatched fence flips the
//!   classification of everything after it.
//! - Fence backticks also count towards the inline-code parity, which means
//!   a URL inside an open fence usually reports `InlineCode` first. Both
//!   kinds are skipped, so the outcome is the same.

use once_cell::sync::Lazy;
use regex::Regex;

use super::types::ContextKind;

static URL_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(?:href|src|action)\s*=\s*["']"#).expect("attribute pattern is valid")
});

/// Classify the occurrence spanning `start..end`.
///
/// Checks run in priority order and the first hit wins: inline code, fenced
/// code block, markdown link target, HTML URL attribute, plain text.
pub fn detect(content: &str, start: usize, end: usize) -> ContextKind {
    if in_inline_code(content, start) {
        ContextKind::InlineCode
    } else if in_code_block(content, start) {
        ContextKind::CodeBlock
    } else if in_markdown_link(content, start, end) {
        ContextKind::MarkdownLink
    } else if in_html_attribute(content, start) {
        ContextKind::HtmlAttribute
    } else {
        ContextKind::PlainText
    }
}

/// An odd number of backticks before `start` means an inline span is open.
pub fn in_inline_code(content: &str, start: usize) -> bool {
    content[..start].matches('`').count() % 2 == 1
}

pub fn in_code_block(content: &str, start: usize) -> bool {
    content[..start]
        .split('\n')
        .filter(|line| line.trim().starts_with("```"))
        .count()
        % 2
        == 1
}

/// True when a `](` precedes the URL, a `)` follows it, and no newline sits
/// between the two.
pub fn in_markdown_link(content: &str, start: usize, end: usize) -> bool {
    let Some(bracket) = content[..start].rfind("](") else {
        return false;
    };
    let Some(paren) = content[end..].find(')') else {
        return false;
    };
    !content[bracket..end + paren + 1].contains('\n')
}

/// True when the nearest `href=`/`src=`/`action=` opening quote before the
/// URL has not been closed yet.
pub fn in_html_attribute(content: &str, start: usize) -> bool {
    let before = &content[..start];
    match URL_ATTRIBUTE.find_iter(before).last() {
        Some(attr) => !before[attr.end()..].contains(|c: char| c == '"' || c == '\''),
        None => false,
    }
}
