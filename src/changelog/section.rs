//! Heading-delimited section extraction for pull request descriptions.
//!
//! A section starts right after a heading literal such as `"# Changes"` and
//! ends at the next heading boundary. A boundary is a `#` followed by a
//! non-word character and then a non-whitespace character, so `### Closes`
//! and `# Notes` end a section while `#3` or `` `#some_method` `` do not.
//! A boundary is reported at the first `#` of the run it belongs to, so the
//! section never keeps a stray `#` from a `## Heading`.

/// Inline bullets are split onto their own lines before scanning.
const BULLET: &str = "- ";
const BULLET_ON_NEW_LINE: &str = "\n- ";

/// Scans text for heading boundaries.
pub struct HeadingScanner<'a> {
    text: &'a str,
    start: usize,
    pos: usize,
}

impl<'a> HeadingScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self::starting_at(text, 0)
    }

    /// Starts scanning at a byte offset into the text. Boundaries are never
    /// reported before this offset.
    pub fn starting_at(text: &'a str, pos: usize) -> Self {
        Self {
            text,
            start: pos,
            pos,
        }
    }

    fn is_word(c: char) -> bool {
        c.is_alphanumeric() || c == '_'
    }

    /// Whether a heading boundary begins at byte offset `idx`.
    pub fn is_boundary_at(text: &str, idx: usize) -> bool {
        let mut chars = text[idx..].chars();

        matches!(
            (chars.next(), chars.next(), chars.next()),
            (Some('#'), Some(marker), Some(next))
                if !Self::is_word(marker) && !next.is_whitespace()
        )
    }
}

impl Iterator for HeadingScanner<'_> {
    /// Byte offset of the `#` starting each boundary.
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.pos < self.text.len() {
            let rest = &self.text[self.pos..];
            let offset = rest.find('#')?;
            let idx = self.pos + offset;
            // '#' is one byte wide so idx + 1 is always a char boundary
            self.pos = idx + 1;

            if Self::is_boundary_at(self.text, idx) {
                let bytes = self.text.as_bytes();
                let mut run_start = idx;
                while run_start > self.start && bytes[run_start - 1] == b'#' {
                    run_start -= 1;
                }
                return Some(run_start);
            }
        }

        None
    }
}

/// Splits inlined bullet lists onto their own lines.
pub fn normalize(text: &str) -> String {
    text.replace(BULLET, BULLET_ON_NEW_LINE)
}

/// Returns the raw text of the section that follows the first occurrence of
/// `heading`, or `None` when the heading does not appear at all.
pub fn extract(text: &str, heading: &str) -> Option<String> {
    let normalized = normalize(text);

    let start = normalized.find(heading)? + heading.len();

    let end = HeadingScanner::starting_at(&normalized, start)
        .next()
        .unwrap_or(normalized.len());

    Some(normalized[start..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_section_until_next_heading() {
        let text = "### Changes - testing_pull_request ### Closes #1";
        assert_eq!(
            extract(text, "# Changes").as_deref(),
            Some(" \n- testing_pull_request ")
        );
        assert_eq!(extract(text, "# Closes").as_deref(), Some(" #1"));
    }

    #[test]
    fn matches_any_heading_level() {
        for prefix in ["#", "##", "###"] {
            let text = format!(
                "{prefix} Changes - testing_pull_request ### Closes #1"
            );
            assert_eq!(
                extract(&text, "# Changes").as_deref(),
                Some(" \n- testing_pull_request "),
                "failed for heading level {prefix}"
            );
        }
    }

    #[test]
    fn runs_to_end_without_following_heading() {
        let text = "## Closes #7, #8";
        assert_eq!(extract(text, "# Closes").as_deref(), Some(" #7, #8"));
    }

    #[test]
    fn missing_heading_is_none() {
        assert!(extract("### Changes\n- one", "# Closes").is_none());
        assert!(extract("", "# Changes").is_none());
    }

    #[test]
    fn inline_hash_method_does_not_end_section() {
        let text = "### Changes\n- refactor `#some_method` for speed\n### Closes #4";
        let changes = extract(text, "# Changes").unwrap();
        assert!(changes.contains("`#some_method` for speed"));
        assert!(!changes.contains("Closes"));
    }

    #[test]
    fn issue_references_do_not_end_section() {
        let text = "# Closes #12 and #13\n# Notes none";
        assert_eq!(
            extract(text, "# Closes").as_deref(),
            Some(" #12 and #13\n")
        );
    }

    #[test]
    fn normalizes_inline_bullets() {
        assert_eq!(normalize("a - b - c"), "a \n- b \n- c");
    }

    #[test]
    fn extract_is_idempotent_over_repeated_calls() {
        let text = "### Changes - one - two ### Closes #3";
        let first = extract(text, "# Changes");
        let second = extract(text, "# Changes");
        assert_eq!(first, second);
    }

    #[test]
    fn scanner_reports_boundaries_only() {
        let text = "# A #1 `#x` ## B #\n";
        let found = HeadingScanner::new(text).collect::<Vec<usize>>();
        // "# A", "## B" and the trailing "#\n" is not followed by text
        assert_eq!(found, vec![0, 12]);
    }

    #[test]
    fn section_stops_before_whole_heading_run() {
        let text = "### Changes\n- one\n## Closes #2";
        assert_eq!(
            extract(text, "# Changes").as_deref(),
            Some("\n\n- one\n")
        );
    }

    #[test]
    fn boundary_requires_non_space_after_marker() {
        assert!(HeadingScanner::is_boundary_at("# Closes", 0));
        assert!(HeadingScanner::is_boundary_at("##Closes", 0));
        assert!(!HeadingScanner::is_boundary_at("#  Closes", 0));
        assert!(!HeadingScanner::is_boundary_at("#3", 0));
        assert!(!HeadingScanner::is_boundary_at("#_private", 0));
        assert!(!HeadingScanner::is_boundary_at("#", 0));
    }
}
