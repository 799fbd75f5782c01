//! HTML to plain text.
//!
//! Strips markup with an ordered list of pattern passes, mapping block
//! elements, line breaks, lists and tables onto newlines, indentation and
//! tabs. `<pre>` content is swapped out early and put back verbatim before
//! whitespace normalization so no tag or entity pass can touch it.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::trace;

use crate::converter::entities::{self, EntityDecoding};
use crate::converter::placeholder::{self, ProtectedRegions};
use crate::converter::whitespace;

static SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").unwrap());
static STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").unwrap());
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static PRE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<pre\b[^>]*>(.*?)</pre\s*>").unwrap());
static CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<code\b[^>]*>(.*?)</code\s*>").unwrap());
static BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)</?(?:div|p|section|article|header|footer|nav|main|aside|blockquote|h[1-6])\b[^>]*>",
    )
    .unwrap()
});
static BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<(?:br|hr)\b[^>]*>").unwrap());
static LIST_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(/?)(ul|ol|li)\b[^>]*>").unwrap());
static ROW_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</tr\s*>").unwrap());
static CELL_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</t[dh]\s*>").unwrap());
static CELL_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<t[dh]\b[^>]*>").unwrap());
static TABLE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?(?:table|thead|tbody|tfoot|tr|colgroup|col|caption)\b[^>]*>").unwrap()
});
static ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<a\b[^>]*>([^<]*)</a\s*>").unwrap());
static INLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)</?(?:strong|b|em|i|u|s|strike|del|ins|mark|small|sub|sup)\b[^>]*>")
        .unwrap()
});
// Never spans a placeholder token.
static ANY_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[!/?]?[A-Za-z][^>\x00]*>").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Ordered,
    Unordered,
}

pub fn run(text: &str) -> String {
    run_with_mode(text, EntityDecoding::default())
}

pub fn run_with_mode(text: &str, mode: EntityDecoding) -> String {
    let mut regions = ProtectedRegions::new();
    let mut result = placeholder::sanitize(text);

    result = SCRIPT.replace_all(&result, "").into_owned();
    result = STYLE.replace_all(&result, "").into_owned();
    result = COMMENT.replace_all(&result, "").into_owned();

    result = PRE
        .replace_all(&result, |caps: &Captures| {
            let content = BREAK.replace_all(&caps[1], "\n");
            let content = ANY_TAG.replace_all(&content, "");
            regions.protect(entities::decode(&content, mode))
        })
        .into_owned();
    trace!(protected = regions.len(), "protected pre blocks");
    result = CODE
        .replace_all(&result, |caps: &Captures| entities::decode(&caps[1], mode))
        .into_owned();

    result = BLOCK.replace_all(&result, "\n").into_owned();
    result = BREAK.replace_all(&result, "\n").into_owned();
    result = convert_lists(&result);
    result = convert_tables(&result);
    result = ANCHOR.replace_all(&result, "$1").into_owned();
    result = INLINE.replace_all(&result, "").into_owned();
    result = ANY_TAG.replace_all(&result, "").into_owned();
    result = entities::decode(&result, mode);

    result = regions.restore(&result);
    result = whitespace::squeeze_lines(&result);
    result = whitespace::collapse_blank_lines(&result);

    result.trim().to_string()
}

/// Flatten `ul`/`ol`/`li` into indented `- ` and `N. ` lines. Ordered
/// lists are always renumbered from 1.
fn convert_lists(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut kinds: Vec<ListKind> = Vec::new();
    let mut counters: Vec<usize> = Vec::new();
    let mut last = 0;
    let mut after_list_tag = false;

    for caps in LIST_TAG.captures_iter(html) {
        let Some(tag) = caps.get(0) else { continue };
        let gap = &html[last..tag.start()];
        // whitespace between two list tags is source formatting
        if !(after_list_tag && gap.trim().is_empty()) {
            result.push_str(gap);
        }
        last = tag.end();
        after_list_tag = true;

        let closing = !caps[1].is_empty();
        match (closing, caps[2].to_ascii_lowercase().as_str()) {
            (false, "ul") => {
                kinds.push(ListKind::Unordered);
                counters.push(0);
            }
            (false, "ol") => {
                kinds.push(ListKind::Ordered);
                counters.push(0);
            }
            (true, "ul" | "ol") => {
                kinds.pop();
                counters.pop();
            }
            (false, "li") => {
                let indent = "  ".repeat(kinds.len().saturating_sub(1));
                result.push('\n');
                result.push_str(&indent);
                match (kinds.last(), counters.last_mut()) {
                    (Some(ListKind::Ordered), Some(counter)) => {
                        *counter += 1;
                        result.push_str(&format!("{}. ", counter));
                    }
                    _ => result.push_str("- "),
                }
            }
            _ => {}
        }
    }

    result.push_str(&html[last..]);
    result
}

/// One line per row, cells separated by tabs.
fn convert_tables(html: &str) -> String {
    let result = ROW_END.replace_all(html, "\n");
    let result = CELL_END.replace_all(&result, "\t");
    let result = CELL_START.replace_all(&result, "");
    TABLE_TAG.replace_all(&result, "\n").into_owned()
}
