//! Markdown rendering of search outcomes and history for the terminal.

use crate::arxiv::PaperRecord;
use crate::search::{History, SearchOutcome, strategy_label};

const LISTED_AUTHORS: usize = 2;
const LISTED_CATEGORIES: usize = 2;

pub fn format_outcome(outcome: &SearchOutcome, topic: &str) -> String {
    let mut output = format!("# Papers: {}\n\n", sanitize_line(topic));

    output.push_str(&format!(
        "Found {} papers | strategy: {}",
        outcome.count(),
        strategy_label(outcome.strategy())
    ));
    if outcome.used_restructure {
        output.push_str(" | restructured");
        if let (Some(index), Some(restructured)) =
            (outcome.restructure_strategy, &outcome.restructured_query)
        {
            output.push_str(&format!(
                " (rephrasing {index}: \"{}\")",
                sanitize_line(restructured)
            ));
        }
    }
    output.push_str("\n\n");

    if !outcome.query().is_empty() {
        output.push_str(&format!("Query: `{}`\n\n", outcome.query().replace('`', "'")));
    }

    if outcome.count() == 0 {
        output.push_str("(No papers found. Try a broader or differently worded topic.)\n");
        return output;
    }

    for (i, paper) in outcome.results().iter().enumerate() {
        output.push_str(&format_paper(i + 1, paper));
    }

    output
}

fn format_paper(position: usize, paper: &PaperRecord) -> String {
    let mut out = format!(
        "## {position:02}. [{}]({})\n\n",
        escape_md_link(&paper.title),
        escape_md_link(&paper.url)
    );
    if !paper.authors.is_empty() {
        out.push_str(&format!("- Authors: {}\n", format_authors(&paper.authors)));
    }
    if let Some(date) = paper.published {
        out.push_str(&format!("- Published: {}\n", date.format("%Y-%m-%d")));
    }
    if !paper.categories.is_empty() {
        let shown: Vec<&str> = paper
            .categories
            .iter()
            .take(LISTED_CATEGORIES)
            .map(String::as_str)
            .collect();
        out.push_str(&format!("- Categories: {}\n", shown.join(", ")));
    }
    out.push_str(&format!("- PDF: {}\n\n", paper.pdf_url));
    out
}

fn format_authors(authors: &[String]) -> String {
    let shown = authors
        .iter()
        .take(LISTED_AUTHORS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if authors.len() > LISTED_AUTHORS {
        format!("{shown} et al. ({} authors)", authors.len())
    } else {
        shown
    }
}

pub fn format_history(history: &History) -> String {
    let mut output = String::from(
        "# Search history\n\n| Time | Topic | Strategy | Results | Restructured |\n|---|---|---|---|---|\n",
    );
    for entry in history.newest_first() {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            sanitize_line(&entry.topic).replace('|', "\\|"),
            strategy_label(entry.strategy),
            entry.count,
            if entry.used_restructure { "yes" } else { "no" }
        ));
    }
    output
}

/// Escape characters that break Markdown link syntax: `[`, `]`, `(`, `)`.
fn escape_md_link(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '[' | ']' | '(' | ')') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Newlines in user topics would break headings and table rows.
fn sanitize_line(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}
