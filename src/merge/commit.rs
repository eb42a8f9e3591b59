//! Merge commit message composition
//!
//! The PR description is copied into the merge commit, minus anything after
//! the first Markdown horizontal rule. PR templates commonly put checklists
//! and reviewer notes below a `---`, which do not belong in history.

use crate::types::{CommitMessage, PullRequestSnapshot};
use regex::Regex;
use std::sync::OnceLock;

/// Column the commit message is wrapped at
pub const WRAP_WIDTH: usize = 72;

/// Compose the merge commit for a pull request
pub fn compose_commit_message(pr: &PullRequestSnapshot) -> CommitMessage {
    compose(
        pr.number,
        &pr.base_repo_full_name,
        &pr.title,
        pr.body.as_deref().unwrap_or_default(),
    )
}

/// Compose a merge commit title and wrapped body
///
/// The body is `title`, a blank line, and the description up to the first
/// horizontal rule. An empty description leaves just the title.
pub fn compose(number: u64, base_repo: &str, title: &str, description: &str) -> CommitMessage {
    let description = strip_after_rule(description);
    let text = if description.is_empty() {
        title.trim().to_string()
    } else {
        format!("{}\n\n{description}", title.trim())
    };

    CommitMessage {
        title: format!("Merge pull request #{number} from {base_repo}"),
        body: wrap(&text, WRAP_WIDTH),
    }
}

/// Cut `text` at the first horizontal rule surrounded by blank lines
///
/// The start and end of the text count as blank lines. The result is trimmed.
pub fn strip_after_rule(text: &str) -> &str {
    static HORIZONTAL_RULE: OnceLock<Regex> = OnceLock::new();
    let rule = HORIZONTAL_RULE.get_or_init(|| Regex::new(r"^-{3,}\s*$").unwrap());

    let lines: Vec<&str> = text.lines().collect();
    let is_blank = |idx: Option<usize>| {
        idx.and_then(|i| lines.get(i))
            .is_none_or(|l| l.trim().is_empty())
    };

    let mut offset = 0;
    for (i, line) in lines.iter().enumerate() {
        let prev_blank = is_blank(i.checked_sub(1));
        let next_blank = is_blank(Some(i + 1));
        if prev_blank && next_blank && rule.is_match(line.trim_end_matches('\r')) {
            return text[..offset].trim();
        }
        // Advance past the line and the newline that `lines()` consumed
        offset += line.len();
        if text[offset..].starts_with("\r\n") {
            offset += 2;
        } else if text[offset..].starts_with('\n') {
            offset += 1;
        }
    }

    text.trim()
}

/// Greedy word wrap, keeping existing line breaks
///
/// Words are never split; a word longer than `width` gets a line of its own.
/// Continuation lines keep the indentation of the line they came from.
pub fn wrap(text: &str, width: usize) -> String {
    let mut out: Vec<String> = Vec::new();

    for line in text.lines() {
        let line = line.trim_end();
        if line.chars().count() <= width {
            out.push(line.to_string());
            continue;
        }

        let indent_len = line.len() - line.trim_start().len();
        let indent = &line[..indent_len];
        let mut current = String::from(indent);
        let mut current_width = indent.chars().count();
        let mut has_word = false;

        for word in line.split_whitespace() {
            let word_width = word.chars().count();
            if has_word && current_width + 1 + word_width > width {
                out.push(std::mem::replace(&mut current, String::from(indent)));
                current_width = indent.chars().count();
                has_word = false;
            }
            if has_word {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
            has_word = true;
        }
        out.push(current);
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_truncated_at_horizontal_rule() {
        let msg = compose(1, "octo/widgets", "Fix the thing", "Fixes #1\n\n---\n\nInternal notes");
        assert_eq!(msg.body, "Fix the thing\n\nFixes #1");
    }

    #[test]
    fn test_title_names_pr_and_base_repo() {
        let msg = compose(42, "octo/widgets", "Fix", "");
        assert_eq!(msg.title, "Merge pull request #42 from octo/widgets");
    }

    #[test]
    fn test_empty_body_is_title_only() {
        let msg = compose(1, "o/r", "Only a title", "   \n\n");
        assert_eq!(msg.body, "Only a title");
    }

    #[test]
    fn test_longer_rule_and_trailing_spaces() {
        assert_eq!(strip_after_rule("keep\n\n-------   \n\ndrop"), "keep");
    }

    #[test]
    fn test_rule_at_end_of_text() {
        assert_eq!(strip_after_rule("keep\n\n---"), "keep");
        assert_eq!(strip_after_rule("keep\n\n---\n"), "keep");
    }

    #[test]
    fn test_rule_at_start_drops_everything() {
        assert_eq!(strip_after_rule("---\n\nnotes"), "");
    }

    #[test]
    fn test_setext_heading_underline_is_not_a_rule() {
        // No blank line above: this is a heading underline, not a rule
        let text = "Heading\n---\n\nbody";
        assert_eq!(strip_after_rule(text), text);
    }

    #[test]
    fn test_two_dashes_is_not_a_rule() {
        let text = "a\n\n--\n\nb";
        assert_eq!(strip_after_rule(text), text);
    }

    #[test]
    fn test_crlf_body() {
        assert_eq!(strip_after_rule("keep\r\n\r\n---\r\n\r\ndrop"), "keep");
    }

    #[test]
    fn test_only_first_rule_counts() {
        assert_eq!(strip_after_rule("a\n\n---\n\nb\n\n---\n\nc"), "a");
    }

    #[test]
    fn test_wrap_at_72_columns() {
        let long = "word ".repeat(40);
        let wrapped = wrap(long.trim(), WRAP_WIDTH);
        assert!(wrapped.lines().count() > 1);
        for line in wrapped.lines() {
            assert!(line.chars().count() <= WRAP_WIDTH, "{line:?} too long");
        }
        assert_eq!(wrapped.split_whitespace().count(), 40);
    }

    #[test]
    fn test_wrap_keeps_existing_breaks_and_blank_lines() {
        assert_eq!(wrap("a\n\nb\nc", WRAP_WIDTH), "a\n\nb\nc");
    }

    #[test]
    fn test_wrap_does_not_split_long_words() {
        let url = format!("https://example.com/{}", "x".repeat(80));
        let wrapped = wrap(&format!("see {url} now"), WRAP_WIDTH);
        assert_eq!(wrapped, format!("see\n{url}\nnow"));
    }

    #[test]
    fn test_wrap_keeps_indentation() {
        let line = format!("  {}", "abc ".repeat(30).trim_end());
        let wrapped = wrap(&line, 20);
        assert!(wrapped.lines().all(|l| l.starts_with("  abc")));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let body = "A description without any rule that is long enough to need wrapping at seventy-two columns.";
        let first = compose(3, "o/r", "Title", body);
        let second = compose(3, "o/r", "Title", body);
        assert_eq!(first, second);
    }
}
