//! Markdown to plain text.
//!
//! Removes inline and block syntax in a fixed order while keeping the text,
//! line structure and indentation. Fenced code blocks are taken out first
//! and restored untouched at the end.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::trace;

use crate::converter::placeholder::{self, ProtectedRegions};
use crate::converter::whitespace;

static FENCE_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([ \t]*)(```|~~~)\w*$").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)#{1,6}[ \t]+(.*?)(?:[ \t]+#+)?[ \t]*$").unwrap()
});
static BOLD_ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*{3}([^*_]+)\*{3}|_{3}([^*_]+)_{3}").unwrap());
static BOLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*{2}([^*_]+)\*{2}|_{2}([^*_]+)_{2}").unwrap());
static ITALIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([*_])([^*_\s](?:[^*_]*[^*_\s])?)([*_])").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(!?)\[([^\]]+)\]\([^)]+\)").unwrap());
static REF_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"!?\[([^\]]+)\]\[[^\]]*\]").unwrap());
static REF_DEFINITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*\[[^\]]+\]:[ \t]+.*$").unwrap());
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]+\)").unwrap());
static BLOCKQUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^([ \t]*)>[ \t]?").unwrap());
static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-*_]{3,}[ \t]*$").unwrap());
static STRIKETHROUGH: Lazy<Regex> = Lazy::new(|| Regex::new(r"~~([^~]+)~~").unwrap());

pub fn run(text: &str) -> String {
    let mut regions = ProtectedRegions::new();
    let mut result = placeholder::sanitize(text);

    result = extract_fences(&result, &mut regions);
    trace!(protected = regions.len(), "protected fenced code blocks");
    result = INLINE_CODE.replace_all(&result, "$1").into_owned();

    result = HEADER.replace_all(&result, "$1$2").into_owned();

    result = BOLD_ITALIC.replace_all(&result, either_group).into_owned();
    result = BOLD.replace_all(&result, either_group).into_owned();
    result = strip_italic(&result, intraword_start, intraword_end);
    result = strip_italic(&result, spaced_start, spaced_end);

    result = LINK
        .replace_all(&result, |caps: &Captures| {
            // images are handled by their own pass
            if caps[1].is_empty() {
                caps[2].to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned();
    result = REF_LINK.replace_all(&result, "$1").into_owned();
    result = REF_DEFINITION.replace_all(&result, "").into_owned();
    result = IMAGE.replace_all(&result, "$1").into_owned();
    result = BLOCKQUOTE.replace_all(&result, "$1").into_owned();
    result = RULE.replace_all(&result, "").into_owned();
    result = STRIKETHROUGH.replace_all(&result, "$1").into_owned();

    result = regions.restore(&result);
    result = whitespace::trim_line_ends(&result);
    result = whitespace::collapse_blank_lines(&result);

    result.trim().to_string()
}

/// Swap each fenced block for a token on its own line. A block closes on
/// the first later line holding the same indentation and fence.
fn extract_fences(text: &str, regions: &mut ProtectedRegions) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let Some(caps) = FENCE_OPEN.captures(lines[i]) else {
            out.push(lines[i].to_string());
            i += 1;
            continue;
        };
        let indent = caps.get(1).map_or("", |m| m.as_str());
        let fence = caps.get(2).map_or("", |m| m.as_str());
        let closer = lines[i + 1..].iter().position(|line| {
            line.strip_prefix(indent)
                .and_then(|rest| rest.strip_prefix(fence))
                .is_some_and(|rest| rest.trim_matches([' ', '\t']).is_empty())
        });

        match closer {
            Some(offset) => {
                let end = i + 1 + offset;
                let code = lines[i + 1..end]
                    .iter()
                    .map(|line| {
                        if line.is_empty() || line.starts_with(indent) {
                            (*line).to_string()
                        } else {
                            format!("{}{}", indent, line)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                out.push(regions.protect(code));
                i = end + 1;
            }
            None => {
                out.push(lines[i].to_string());
                i += 1;
            }
        }
    }

    out.join("\n")
}

fn either_group(caps: &Captures) -> String {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map_or_else(String::new, |m| m.as_str().to_string())
}

fn is_delimiter(c: char) -> bool {
    c == '*' || c == '_'
}

// Emphasis glued to preceding text, e.g. `word*em*` or at the very start.
fn intraword_start(prev: Option<char>) -> bool {
    prev.is_none_or(|c| !is_delimiter(c) && !c.is_whitespace())
}

fn intraword_end(next: Option<char>) -> bool {
    next.is_none_or(|c| !is_delimiter(c))
}

// Emphasis standing on its own between whitespace.
fn spaced_start(prev: Option<char>) -> bool {
    prev.is_some_and(char::is_whitespace)
}

fn spaced_end(next: Option<char>) -> bool {
    next.is_none_or(char::is_whitespace)
}

/// Remove single `*`/`_` emphasis whose surroundings satisfy `before` and
/// `after`. Boundaries are read from the unmodified input. Underscores with
/// alphanumerics on both sides are identifiers like `snake_case`, not
/// emphasis.
fn strip_italic(
    text: &str,
    before: fn(Option<char>) -> bool,
    after: fn(Option<char>) -> bool,
) -> String {
    let mut result = String::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;

    while let Some(caps) = ITALIC.captures_at(text, pos) {
        let Some(whole) = caps.get(0) else { break };
        let prev = text[..whole.start()].chars().next_back();
        let next = text[whole.end()..].chars().next();
        let open = &caps[1];
        let identifier = open == "_"
            && prev.is_some_and(char::is_alphanumeric)
            && next.is_some_and(char::is_alphanumeric);

        if open == &caps[3] && !identifier && before(prev) && after(next) {
            result.push_str(&text[copied..whole.start()]);
            result.push_str(&caps[2]);
            copied = whole.end();
            pos = whole.end();
        } else {
            // delimiters are ASCII, so the next byte is a char boundary
            pos = whole.start() + 1;
        }
    }

    result.push_str(&text[copied..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("**bold** and *italic*", "bold and italic")]
    #[case("***both*** and __strong__ and _em_", "both and strong and em")]
    #[case("start *here* and end", "start here and end")]
    #[case("*lead* word", "lead word")]
    #[case("mid*word*emphasis", "midwordemphasis")]
    #[case("~~old~~ new", "old new")]
    fn strips_emphasis(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(run(input), expected);
    }

    #[rstest]
    #[case("call my_var_name now")]
    #[case("2 * 3 * 4")]
    #[case("* item one\n* item two")]
    #[case("- a\n- b")]
    #[case("**unclosed bold")]
    fn leaves_non_emphasis_alone(#[case] input: &str) {
        assert_eq!(run(input), input);
    }

    #[test]
    fn strips_headers_and_closing_hashes() {
        let md = "# Title\n\n## Sub ##\n  ### Indented\n####### seven";
        assert_eq!(run(md), "Title\n\nSub\n  Indented\n####### seven");
    }

    #[test]
    fn hash_without_space_is_text() {
        assert_eq!(run("#hashtag and # C#"), "#hashtag and # C#");
    }

    #[test]
    fn links_keep_their_text() {
        assert_eq!(run("[click here](https://example.com)"), "click here");
    }

    #[test]
    fn images_and_reference_links() {
        let md = "See [docs][1] and ![logo](a.png) or ![](b.png).\n\n[1]: https://example.com";
        assert_eq!(run(md), "See docs and logo or .");
    }

    #[test]
    fn fenced_code_is_preserved_verbatim() {
        let md = "Text\n\n```md\n**not bold**\n# not a header\n```\n\nMore *words*";
        assert_eq!(run(md), "Text\n\n**not bold**\n# not a header\n\nMore words");
    }

    #[test]
    fn tilde_fence_needs_tilde_closer() {
        let md = "~~~\n_keep_\n```\n~~~";
        assert_eq!(run(md), "_keep_\n```");
    }

    #[test]
    fn indented_fence_keeps_indentation_once() {
        let md = "- item\n  ```\n  let x = 1;\n  ```\n- next";
        assert_eq!(run(md), "- item\n  let x = 1;\n- next");
    }

    #[test]
    fn fence_content_gets_fence_indentation() {
        assert_eq!(run("intro\n  ```\ncode\n  ```"), "intro\n  code");
    }

    #[test]
    fn unclosed_fence_is_left_as_text() {
        assert_eq!(run("```\nnever closed *x*"), "```\nnever closed x");
    }

    #[test]
    fn inline_code_is_unwrapped() {
        assert_eq!(run("Use `a_b_c` and `**x**` here"), "Use a_b_c and x here");
    }

    #[test]
    fn inline_code_around_a_fence_restores_the_fence() {
        assert_eq!(run("`a\n```\nx\n```\nb`"), "a\nx\nb");
    }

    #[test]
    fn strips_one_blockquote_marker_per_line() {
        let md = "> quoted\n> > nested\n>\n  > indented";
        assert_eq!(run(md), "quoted\n> nested\n\n  indented");
    }

    #[test]
    fn removes_horizontal_rules() {
        assert_eq!(run("above\n\n---\n\nbelow"), "above\n\nbelow");
        assert_eq!(run("a\n***\nb\n  ___  \nc"), "a\n\nb\n\nc");
    }

    #[test]
    fn collapses_blank_lines_and_trims_line_ends() {
        assert_eq!(run("# a  \n\n\n\n  \nb\t"), "a\n\nb");
    }

    #[test]
    fn handles_crlf_input() {
        assert_eq!(run("# Title\r\n\r\n*em*\r\n"), "Title\n\nem");
    }

    #[test]
    fn nested_list_indentation_survives() {
        let md = "- **one**\n  - _two_\n    - three";
        assert_eq!(run(md), "- one\n  - two\n    - three");
    }
}
