//! Content type detection.
//!
//! Classifies a selection as HTML, Markdown or plain text with ordered
//! pattern heuristics. HTML indicators are checked first because angle
//! bracket syntax is far less ambiguous than Markdown punctuation.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::converter::entities;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Html,
    Markdown,
    Plain,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Html => "html",
            ContentType::Markdown => "markdown",
            ContentType::Plain => "plain",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" | "htm" => Ok(ContentType::Html),
            "markdown" | "md" => Ok(ContentType::Markdown),
            "plain" | "text" | "txt" => Ok(ContentType::Plain),
            other => Err(format!("Unknown content type: {}", other)),
        }
    }
}

static HTML_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)</?(?:div|span|p|br|a|ul|ol|li|h[1-6]|table|tr|td|th|thead|tbody|tfoot|img|strong|em|b|i|code|pre|blockquote|section|article|header|footer|nav|main|aside|form|input|button|label|select|option|textarea)\b[^>]*>",
    )
    .unwrap()
});
static HTML_VOID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(?:br|hr|img|input|meta|link)\s*/?>").unwrap());
static HTML_ENTITY: Lazy<Regex> = Lazy::new(|| {
    let names = entities::named_entity_names()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)&(?:{}|#[0-9]+|#x[0-9a-f]+);", names)).unwrap()
});
static HTML_DOCTYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<!DOCTYPE|<html").unwrap());

static MD_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+\S").unwrap());
static MD_EMPHASIS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\*{1,2}|_{1,2})[^*_\s](?:[^*_]*[^*_\s])?(?:\*{1,2}|_{1,2})").unwrap()
});
static MD_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]+\]\([^)]+\)|\[[^\]]+\]\[[^\]]*\]").unwrap());
static MD_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]+\)").unwrap());
static MD_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^(?:```|~~~)").unwrap());
static MD_INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`]+`").unwrap());
static MD_BLOCKQUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^>[ \t]+\S").unwrap());
static MD_RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[-*_]{3,}[ \t\r]*$").unwrap());

/// Classify `text`. Total: anything without an indicator is `Plain`.
pub fn classify(text: &str) -> ContentType {
    if is_html(text) {
        ContentType::Html
    } else if is_markdown(text) {
        ContentType::Markdown
    } else {
        ContentType::Plain
    }
}

fn is_html(text: &str) -> bool {
    [&HTML_TAG, &HTML_VOID, &HTML_ENTITY, &HTML_DOCTYPE]
        .iter()
        .any(|re| re.is_match(text))
}

fn is_markdown(text: &str) -> bool {
    [
        &MD_HEADER,
        &MD_EMPHASIS,
        &MD_LINK,
        &MD_IMAGE,
        &MD_FENCE,
        &MD_INLINE_CODE,
        &MD_BLOCKQUOTE,
        &MD_RULE,
    ]
    .iter()
    .any(|re| re.is_match(text))
}
