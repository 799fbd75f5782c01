//! Protected regions for multi-pass conversion.
//!
//! A region is swapped out for a NUL-delimited token, the remaining passes
//! run over the token, and the region is put back by index. Converters
//! replace NUL in their input before protecting anything, so a token can
//! only ever have been produced here.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const MARKER: char = '\0';

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x00([0-9]+)\x00").unwrap());

/// Normalize CRLF line endings and replace NUL so the marker stays reserved.
pub fn sanitize(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    if text.contains(MARKER) {
        text.replace(MARKER, "\u{fffd}")
    } else {
        text
    }
}

#[derive(Debug, Default)]
pub struct ProtectedRegions {
    regions: Vec<Option<String>>,
}

impl ProtectedRegions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `content` and return the token that stands in for it. Tokens
    /// already inside `content` are expanded first, so regions never nest.
    pub fn protect(&mut self, content: String) -> String {
        let content = if content.contains(MARKER) {
            self.restore(&content)
        } else {
            content
        };
        let index = self.regions.len();
        self.regions.push(Some(content));
        format!("{MARKER}{index}{MARKER}")
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Put every region back at its token. Each region is restored at most
    /// once; tokens with no stored region are dropped.
    pub fn restore(&mut self, text: &str) -> String {
        if self.regions.is_empty() {
            return text.to_string();
        }
        TOKEN
            .replace_all(text, |caps: &Captures| {
                caps[1]
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| self.regions.get_mut(index))
                    .and_then(Option::take)
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restores_by_index() {
        let mut regions = ProtectedRegions::new();
        let first = regions.protect("  a  b".to_string());
        let second = regions.protect("**c**".to_string());
        let text = format!("x {second} y {first}");
        assert_eq!(regions.len(), 2);
        assert_eq!(regions.restore(&text), "x **c** y   a  b");
    }

    #[test]
    fn region_is_restored_only_once() {
        let mut regions = ProtectedRegions::new();
        let token = regions.protect("code".to_string());
        let text = format!("{token}|{token}");
        assert_eq!(regions.restore(&text), "code|");
    }

    #[test]
    fn enclosing_region_absorbs_inner_token() {
        let mut regions = ProtectedRegions::new();
        let inner = regions.protect("x  y".to_string());
        let outer = regions.protect(format!("see {inner}"));
        assert_eq!(regions.restore(&format!("[{outer}]")), "[see x  y]");
        assert!(!regions.restore(&inner).contains(MARKER));
    }

    #[test]
    fn sanitize_reserves_the_marker() {
        assert_eq!(sanitize("a\0b\r\nc"), "a\u{fffd}b\nc");
        assert_eq!(sanitize("plain"), "plain");
    }

    #[test]
    fn restore_without_regions_is_identity() {
        let mut regions = ProtectedRegions::new();
        assert!(regions.is_empty());
        assert_eq!(regions.restore("no tokens"), "no tokens");
    }
}
