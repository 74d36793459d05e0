//! Renders merged pull requests into changelog text.
use serde::Serialize;

use crate::changelog::section;

/// Phrase a pull request description must contain, checked, to be included.
pub const INCLUDE_PR_TEXT: &str = "Include this PR in the changelog";
/// Checked checkbox gating [`INCLUDE_PR_TEXT`].
pub const INCLUDE_PR_CHECKED: &str = "[x]";

pub const CHANGES_HEADING: &str = "# Changes";
pub const CLOSES_HEADING: &str = "# Closes";

pub const NO_CLOSED_PRS: &str = "No Closed PRS";
pub const NO_CHANGES: &str = "No Changes included in the log";
pub const NOTHING_CLOSED: &str = "Nothing Closed";

/// A merged pull request attributed to a deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestRecord {
    pub number: u64,
    pub title: String,
    pub description: String,
}

/// Rendered output for one publication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogEntry {
    /// One line per included pull request
    pub summary: String,
    /// Long-form per pull request sections
    pub body: String,
}

/// Whether the description carries the checked inclusion marker.
pub fn is_included(description: &str) -> bool {
    let checked = format!("{INCLUDE_PR_CHECKED} {INCLUDE_PR_TEXT}");
    description.contains(&checked)
}

/// Trimmed section text, treating blank sections as missing.
fn section_or(description: &str, heading: &str, fallback: &str) -> String {
    section::extract(description, heading)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn included(prs: &[PullRequestRecord]) -> Vec<&PullRequestRecord> {
    prs.iter().filter(|pr| is_included(&pr.description)).collect()
}

fn render_pr(pr: &PullRequestRecord) -> String {
    let changes = section_or(&pr.description, CHANGES_HEADING, NO_CHANGES);
    let closes = section_or(&pr.description, CLOSES_HEADING, NOTHING_CLOSED);

    format!(
        "###### #{} - {}\n#### Changes\n{changes}\n#### Closes\n{closes}",
        pr.number, pr.title
    )
}

/// Closes section squished onto a single line.
fn summary_line(pr: &PullRequestRecord) -> String {
    let closes = section_or(&pr.description, CLOSES_HEADING, "")
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ");
    format!("Closed PR: #{} - {} Closes: {closes}", pr.number, pr.title)
}

fn render_body(prs: &[&PullRequestRecord]) -> String {
    prs.iter()
        .map(|pr| render_pr(pr))
        .collect::<Vec<String>>()
        .join("\n\n")
}

/// Renders the summary and body for the given pull requests, in the given
/// order. Pull requests without the checked inclusion marker are skipped.
pub fn render(prs: &[PullRequestRecord]) -> ChangelogEntry {
    let prs = included(prs);

    if prs.is_empty() {
        return ChangelogEntry {
            summary: NO_CLOSED_PRS.into(),
            body: format!(
                "#### Changes\n{NO_CHANGES}\n#### Closes\n{NOTHING_CLOSED}"
            ),
        };
    }

    let summary = prs
        .iter()
        .map(|pr| summary_line(pr))
        .collect::<Vec<String>>()
        .join("\n");

    ChangelogEntry {
        summary,
        body: render_body(&prs),
    }
}

/// Body only variant of [`render`].
pub fn render_single(prs: &[PullRequestRecord]) -> String {
    let prs = included(prs);

    if prs.is_empty() {
        return NO_CLOSED_PRS.into();
    }

    render_body(&prs)
}
