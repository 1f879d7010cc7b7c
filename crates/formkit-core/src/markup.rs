//! Description markup
//!
//! Field descriptions accept a tiny markup: `[text](url)` links, `**bold**`,
//! `^^small^^` and line breaks.

use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Pre-compiled markup patterns
struct DescriptionMarkup {
    link: Regex,
    bold: Regex,
    small: Regex,
}

impl DescriptionMarkup {
    fn get() -> &'static Self {
        static MARKUP: OnceLock<DescriptionMarkup> = OnceLock::new();
        MARKUP.get_or_init(|| Self {
            link: Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("link pattern compiles"),
            bold: Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern compiles"),
            small: Regex::new(r"\^\^(.+?)\^\^").expect("small pattern compiles"),
        })
    }
}

/// Escape the five HTML-significant characters
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Human-readable preview: links become `text (url)`, nothing else changes
pub fn description_preview(text: &str) -> String {
    DescriptionMarkup::get()
        .link
        .replace_all(text, "$1 ($2)")
        .into_owned()
}

/// Render a description as limited HTML.
///
/// Input is escaped first, so only the markup above produces tags.
pub fn render_description_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let markup = DescriptionMarkup::get();
    let escaped = escape_html(text);

    let linked = markup.link.replace_all(&escaped, |caps: &Captures<'_>| {
        let url = &caps[2];
        let href = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("https://{}", url)
        };
        format!(
            "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
            href, &caps[1]
        )
    });
    let bold = markup.bold.replace_all(&linked, "<strong>$1</strong>");
    let small = markup.small.replace_all(&bold, "<small>$1</small>");
    small.replace('\n', "<br />")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_flattens_links() {
        assert_eq!(
            description_preview("See [docs](https://example.com) now"),
            "See docs (https://example.com) now"
        );
        assert_eq!(description_preview("**bold** stays"), "**bold** stays");
    }

    #[test]
    fn test_html_links_get_scheme() {
        let html = render_description_html("[site](example.com)");
        assert_eq!(
            html,
            "<a href=\"https://example.com\" target=\"_blank\" rel=\"noopener noreferrer\">site</a>"
        );
        assert!(render_description_html("[a](http://x.io)").contains("href=\"http://x.io\""));
    }

    #[test]
    fn test_html_escapes_before_markup() {
        let html = render_description_html("<script>**hi**</script>\n^^note^^");
        assert_eq!(
            html,
            "&lt;script&gt;<strong>hi</strong>&lt;/script&gt;<br /><small>note</small>"
        );
    }

    #[test]
    fn test_empty_description() {
        assert_eq!(render_description_html(""), "");
    }
}
