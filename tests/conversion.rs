use plainup::{ContentType, classify, convert, html_to_plain_text, markdown_to_plain_text};
use proptest::prelude::*;
use rstest::rstest;

#[test]
fn html_precedes_markdown() {
    let text = "<span>**bold**</span> and _under_";
    assert_eq!(classify(text), ContentType::Html);
    assert_eq!(convert(text), "**bold** and _under_");
}

#[rstest]
#[case("<ol><li>A</li><li>B</li></ol>", "1. A\n2. B")]
#[case(r#"<ol start="4"><li value="9">A</li><li>B</li></ol>"#, "1. A\n2. B")]
#[case("<table><tr><td>A</td><td>B</td></tr></table>", "A\tB")]
#[case("<p>&lt;</p>", "<")]
#[case("<p>&amp;lt;</p>", "&lt;")]
fn html_properties(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(html_to_plain_text(input), expected);
}

#[test]
fn escaped_entity_needs_a_second_pass() {
    let once = html_to_plain_text("&amp;lt;");
    assert_eq!(once, "&lt;");
    assert_eq!(html_to_plain_text(&once), "<");
}

#[rstest]
#[case("**bold** and *italic*", "bold and italic")]
#[case("[click here](https://example.com)", "click here")]
#[case("```\n**not bold**\n```", "**not bold**")]
fn markdown_properties(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(markdown_to_plain_text(input), expected);
}

#[test]
fn converts_a_pasted_web_page() {
    let html = r#"<!DOCTYPE html>
<html>
<head><title>Notes</title><style>body { margin: 0; }</style></head>
<body>
  <h2>Shopping &amp; errands</h2>
  <ul>
    <li>Milk</li>
    <li>Bread <em>(fresh)</em></li>
  </ul>
  <p>Call <a href="tel:123">Sam</a>&nbsp;&mdash; 5&nbsp;min.</p>
</body>
</html>"#;
    let text = convert(html);
    assert!(text.contains("Shopping & errands"));
    assert!(text.contains("- Milk\n- Bread (fresh)"));
    assert!(text.contains("Call Sam \u{2014} 5 min."));
    assert!(!text.contains('<'));
    assert!(!text.contains("margin"));
}

#[test]
fn converts_a_readme_section() {
    let md = "## Install\n\n\
              Run `cargo install plainup` then:\n\n\
              ```sh\n\
              plainup --paste --clipboard\n\
              ```\n\n\
              > **Note:** see the [docs](https://docs.rs).\n\n\
              ---\n\n\
              1. first\n   - nested *item*";
    assert_eq!(
        convert(md),
        "Install\n\n\
         Run cargo install plainup then:\n\n\
         plainup --paste --clipboard\n\n\
         Note: see the docs.\n\n\
         1. first\n   - nested item"
    );
}

#[test]
fn indentation_is_preserved_and_line_ends_trimmed() {
    let md = "> quote   \n  > indented quote\n  - item  ";
    assert_eq!(convert(md), "quote\n  indented quote\n  - item");
}

proptest! {
    #[test]
    fn plain_text_passes_through(text in "[a-zA-Z0-9 ,.;:?!'\n]{0,200}") {
        prop_assert_eq!(classify(&text), ContentType::Plain);
        prop_assert_eq!(convert(&text), text);
    }

    #[test]
    fn converters_are_total(text in any::<String>()) {
        let _ = classify(&text);
        let _ = html_to_plain_text(&text);
        let _ = markdown_to_plain_text(&text);
    }

    #[test]
    fn output_has_no_long_blank_runs_or_trailing_space(
        text in r"[a-z<>/#*_`~\[\]()!&;\- \t\n]{0,300}"
    ) {
        for output in [html_to_plain_text(&text), markdown_to_plain_text(&text)] {
            prop_assert!(!output.contains("\n\n\n"));
            for line in output.lines() {
                prop_assert_eq!(line, line.trim_end());
            }
        }
    }

    #[test]
    fn tag_free_html_output_is_a_fixed_point(
        words in prop::collection::vec("[a-z]{1,8}", 1..12)
    ) {
        let html = format!("<p>{}</p><ul><li>{}</li></ul>", words.join(" "), words.join("</li><li>"));
        let once = html_to_plain_text(&html);
        prop_assert_eq!(html_to_plain_text(&once), once);
    }
}
