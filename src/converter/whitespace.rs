use once_cell::sync::Lazy;
use regex::Regex;

static BLANK_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());
static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r" {2,}").unwrap());

/// Cap runs of blank lines at one.
pub fn collapse_blank_lines(text: &str) -> String {
    BLANK_RUN.replace_all(text, "\n\n").into_owned()
}

/// Trim trailing whitespace from every line, leaving indentation alone.
pub fn trim_line_ends(text: &str) -> String {
    text.split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keep each line's indentation, squeeze interior space runs to a single
/// space and drop trailing whitespace. Whitespace-only lines become empty.
pub fn squeeze_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let rest = line.trim_start();
            if rest.is_empty() {
                return String::new();
            }
            let indent = &line[..line.len() - rest.len()];
            format!("{}{}", indent, SPACE_RUN.replace_all(rest, " ").trim_end())
        })
        .collect::<Vec<_>>()
        .join("\n")
}
