/// A GitHub repository mentioned somewhere in the document.
/// Two references are the same repository when their `full_url` matches exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoReference {
    /// URL as written in the document (e.g., "https://github.com/acme/widget")
    pub full_url: String,
    /// Repository owner (user or organisation)
    pub owner: String,
    /// Repository name
    pub repo: String,
}

/// Syntactic surroundings of a URL occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    PlainText,
    MarkdownLink,
    HtmlAttribute,
    CodeBlock,
    InlineCode,
}

impl ContextKind {
    /// Whether occurrences in this context may be rewritten at all.
    /// Code samples and attribute values are never touched.
    pub fn is_annotatable(self) -> bool {
        matches!(self, ContextKind::PlainText | ContextKind::MarkdownLink)
    }
}

impl std::fmt::Display for ContextKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ContextKind::PlainText => "plain_text",
            ContextKind::MarkdownLink => "markdown_link",
            ContextKind::HtmlAttribute => "html_attribute",
            ContextKind::CodeBlock => "code_block",
            ContextKind::InlineCode => "inline_code",
        };
        f.write_str(name)
    }
}

/// One located appearance of a reference in the document.
/// Offsets are byte offsets into the content the occurrence was found in.
#[derive(Debug, Clone)]
pub struct UrlOccurrence<'r> {
    pub start: usize,
    pub end: usize,
    pub reference: &'r RepoReference,
    pub context: ContextKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_text_and_links_are_annotatable() {
        assert!(ContextKind::PlainText.is_annotatable());
        assert!(ContextKind::MarkdownLink.is_annotatable());
        assert!(!ContextKind::HtmlAttribute.is_annotatable());
        assert!(!ContextKind::CodeBlock.is_annotatable());
        assert!(!ContextKind::InlineCode.is_annotatable());
    }

    #[test]
    fn test_context_display() {
        assert_eq!(ContextKind::InlineCode.to_string(), "inline_code");
        assert_eq!(ContextKind::MarkdownLink.to_string(), "markdown_link");
    }
}
