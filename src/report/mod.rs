use colored::Colorize;
use tracing::debug;

use crate::document::{DocumentStatus, DocumentUpdate};

/// Render the end-of-run summary for the terminal.
///
/// README.md: UPDATED (2 links)
///   • https://github.com/acme/widget
///   • https://github.com/acme/other
pub fn render(update: &DocumentUpdate) -> String {
    let mut out = String::new();
    let path = update.path.display().to_string();

    match update.status {
        DocumentStatus::Rewritten if !update.updated_links.is_empty() => {
            out.push_str(&format!(
                "{}: {} ({} links)\n",
                path.bold(),
                colorize_status(update.status),
                update.updated_links.len()
            ));
            for link in &update.updated_links {
                out.push_str(&format!("  • {link}\n"));
            }
        }
        status => {
            out.push_str(&format!("{}: {}\n", path.bold(), colorize_status(status)));
        }
    }
    out
}

pub fn print(update: &DocumentUpdate) {
    debug!(status = ?update.status, links = update.updated_links.len(), "writing summary to terminal");
    println!();
    print!("{}", render(update));
    println!();
}

fn colorize_status(status: DocumentStatus) -> colored::ColoredString {
    match status {
        DocumentStatus::Missing => "FILE NOT FOUND".red().bold(),
        DocumentStatus::NoLinks => "NO REPOSITORY LINKS".yellow().bold(),
        DocumentStatus::Unchanged => "UP TO DATE".green().bold(),
        DocumentStatus::Rewritten => "UPDATED".green().bold(),
    }
}
