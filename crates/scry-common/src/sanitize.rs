//! DOM sanitizer for page snapshots sent to the oracle.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SCRIPT_BLOCK: Regex = Regex::new(r"(?is)<script\b.*?</script\s*>").unwrap();
    static ref STYLE_BLOCK: Regex = Regex::new(r"(?is)<style\b.*?</style\s*>").unwrap();
    static ref COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    // Whatever is left open runs to the end of the input.
    static ref UNTERMINATED: Regex = Regex::new(r"(?is)(?:<script\b|<style\b|<!--).*$").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Strip scripts, styles and comments from `html` and normalize whitespace.
///
/// Works on malformed markup: an unclosed `<script>`, `<style>` or comment
/// swallows the rest of the document rather than leaking its payload.
pub fn sanitize(html: &str) -> String {
    let html = SCRIPT_BLOCK.replace_all(html, "");
    let html = STYLE_BLOCK.replace_all(&html, "");
    let html = COMMENT.replace_all(&html, "");
    let html = UNTERMINATED.replace(&html, "");
    WHITESPACE.replace_all(&html, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_script_payload() {
        let out = sanitize("<body><script>alert(1)</script><p>Hi</p></body>");
        assert!(!out.contains("alert(1)"));
        assert_eq!(out, "<body><p>Hi</p></body>");
    }

    #[test]
    fn test_strips_styles_and_comments() {
        let html = r#"<div>
            <STYLE type="text/css">.x { color: red }</STYLE>
            <!-- secret
                 note -->
            <span>ok</span>
        </div>"#;
        assert_eq!(sanitize(html), "<div> <span>ok</span> </div>");
    }

    #[test]
    fn test_script_with_attributes_and_markup_inside() {
        let html = r#"<script type="module">if (a < b) { document.write("<b>x</b>") }</script ><input id="user">"#;
        assert_eq!(sanitize(html), r#"<input id="user">"#);
    }

    #[test]
    fn test_unterminated_script_is_dropped() {
        let out = sanitize("<p>keep</p><script>steal(document.cookie)");
        assert_eq!(out, "<p>keep</p>");
    }

    #[test]
    fn test_does_not_touch_lookalike_tags() {
        assert_eq!(
            sanitize("<scripts>text</scripts>"),
            "<scripts>text</scripts>"
        );
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(sanitize("  <a>\n\t one   two </a>  "), "<a> one two </a>");
        assert_eq!(sanitize(""), "");
    }
}
