use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Deserialize;

/// Named entities understood by the decoder, in substitution order.
///
/// `lt`/`gt` come before `amp` so that sequential decoding of `&amp;lt;`
/// stops at `&lt;`.
const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("nbsp", " "),
    ("lt", "<"),
    ("gt", ">"),
    ("amp", "&"),
    ("quot", "\""),
    ("apos", "'"),
    ("#39", "'"),
    ("ldquo", "\""),
    ("rdquo", "\""),
    ("lsquo", "'"),
    ("rsquo", "'"),
    ("mdash", "\u{2014}"),
    ("ndash", "\u{2013}"),
    ("hellip", "\u{2026}"),
    ("copy", "\u{a9}"),
    ("reg", "\u{ae}"),
    ("trade", "\u{2122}"),
    ("bull", "\u{2022}"),
    ("middot", "\u{b7}"),
    ("deg", "\u{b0}"),
    ("plusmn", "\u{b1}"),
    ("times", "\u{d7}"),
    ("divide", "\u{f7}"),
    ("frac12", "\u{bd}"),
    ("frac14", "\u{bc}"),
    ("frac34", "\u{be}"),
];

/// How character entities are decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityDecoding {
    /// Every entity token is looked up exactly once.
    #[default]
    Token,
    /// Literal replacement of the named table in order, then decimal and
    /// hexadecimal numeric entities. Output of one step is input to the
    /// next, so `&amp;#60;` becomes `<`.
    Sequential,
}

impl std::str::FromStr for EntityDecoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "token" => Ok(EntityDecoding::Token),
            "sequential" => Ok(EntityDecoding::Sequential),
            other => Err(format!("Unknown entity decoding mode: {}", other)),
        }
    }
}

static ENTITY_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(?:#([0-9]+)|#[xX]([0-9a-fA-F]+)|([A-Za-z][A-Za-z0-9]*));").unwrap()
});
static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"&#([0-9]+);").unwrap());
static HEXADECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)&#x([0-9a-f]+);").unwrap());

/// Names of the alphabetic entities in the table, without `&` and `;`.
pub fn named_entity_names() -> impl Iterator<Item = &'static str> {
    NAMED_ENTITIES
        .iter()
        .map(|(name, _)| *name)
        .filter(|name| !name.starts_with('#'))
}

pub fn decode(text: &str, mode: EntityDecoding) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    match mode {
        EntityDecoding::Token => decode_tokens(text),
        EntityDecoding::Sequential => decode_sequential(text),
    }
}

fn decode_tokens(text: &str) -> String {
    ENTITY_TOKEN
        .replace_all(text, |caps: &Captures| {
            if let Some(dec) = caps.get(1) {
                code_point(dec.as_str(), 10).to_string()
            } else if let Some(hex) = caps.get(2) {
                code_point(hex.as_str(), 16).to_string()
            } else {
                let name = &caps[3];
                NAMED_ENTITIES
                    .iter()
                    .find(|(n, _)| *n == name)
                    .map(|(_, value)| (*value).to_string())
                    .unwrap_or_else(|| caps[0].to_string())
            }
        })
        .into_owned()
}

fn decode_sequential(text: &str) -> String {
    let mut result = text.to_string();
    for (name, value) in NAMED_ENTITIES {
        let entity = format!("&{};", name);
        if result.contains(&entity) {
            result = result.replace(&entity, value);
        }
    }
    result = DECIMAL
        .replace_all(&result, |caps: &Captures| code_point(&caps[1], 10).to_string())
        .into_owned();
    HEXADECIMAL
        .replace_all(&result, |caps: &Captures| code_point(&caps[1], 16).to_string())
        .into_owned()
}

/// NUL, surrogates and anything past U+10FFFF become U+FFFD.
fn code_point(digits: &str, radix: u32) -> char {
    u32::from_str_radix(digits, radix)
        .ok()
        .filter(|&n| n != 0)
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}
