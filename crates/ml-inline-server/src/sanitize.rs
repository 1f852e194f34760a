//! Field value sanitisation
//!
//! - [`plain_text`] for alt text and title
//! - [`post_html`] for the description, which keeps a post-body HTML subset
//!
//! Both are idempotent: sanitising an already sanitised value returns it
//! unchanged.

use ammonia::Builder;
use ml_inline_model::FieldName;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

static SCRIPT_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("static regex")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<>]*>").expect("static regex"));
static OCTET: Lazy<Regex> = Lazy::new(|| Regex::new(r"%[a-fA-F0-9]{2}").expect("static regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\r\n\t ]+").expect("static regex"));

static POST_HTML: Lazy<Builder<'static>> = Lazy::new(|| {
    let tags: HashSet<&'static str> = [
        "a", "abbr", "b", "blockquote", "br", "cite", "code", "del", "em", "h1", "h2", "h3",
        "h4", "h5", "h6", "hr", "i", "img", "li", "ol", "p", "pre", "q", "s", "span", "strong",
        "sub", "sup", "u", "ul",
    ]
    .into_iter()
    .collect();

    let tag_attributes: HashMap<&'static str, HashSet<&'static str>> = [
        ("a", &["href", "title"][..]),
        ("abbr", &["title"][..]),
        ("blockquote", &["cite"][..]),
        ("del", &["datetime"][..]),
        ("img", &["src", "alt", "title", "width", "height"][..]),
        ("q", &["cite"][..]),
    ]
    .into_iter()
    .map(|(tag, attrs)| (tag, attrs.iter().copied().collect()))
    .collect();

    let mut builder = Builder::default();
    builder
        .tags(tags)
        .tag_attributes(tag_attributes)
        .generic_attributes(HashSet::new())
        .url_schemes(["http", "https", "mailto"].into_iter().collect());
    builder
});

/// Sanitise `raw` for `field` and trim it
#[must_use]
pub fn sanitize_field(field: FieldName, raw: &str) -> String {
    match field {
        FieldName::Description => post_html(raw),
        FieldName::AltText | FieldName::Title => plain_text(raw),
    }
}

/// Strip markup and collapse whitespace to single spaces
#[must_use]
pub fn plain_text(raw: &str) -> String {
    let mut text = raw.to_string();

    if text.contains('<') {
        text = SCRIPT_STYLE.replace_all(&text, "").into_owned();
        text = TAG.replace_all(&text, "").into_owned();
        text = text.replace('<', "&lt;");
    }

    while OCTET.is_match(&text) {
        text = OCTET.replace_all(&text, "").into_owned();
    }

    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Keep the allowed post-body subset, drop everything else
#[must_use]
pub fn post_html(raw: &str) -> String {
    POST_HTML.clean(raw).to_string().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn plain_text_strips_tags_and_scripts() {
        assert_eq!(plain_text("<b>Red</b> barn"), "Red barn");
        assert_eq!(
            plain_text("Barn<script>alert('x')</script> at dusk"),
            "Barn at dusk"
        );
        assert_eq!(plain_text("<style>p{}</style>Barn"), "Barn");
    }

    #[test]
    fn plain_text_collapses_whitespace() {
        assert_eq!(plain_text("  Red\n\tbarn   at sunset  "), "Red barn at sunset");
    }

    #[test]
    fn plain_text_removes_octets() {
        assert_eq!(plain_text("barn%20house"), "barnhouse");
        assert_eq!(plain_text("%%4141"), "");
    }

    #[test]
    fn plain_text_escapes_stray_less_than() {
        assert_eq!(plain_text("a < b"), "a &lt; b");
    }

    #[test]
    fn post_html_keeps_allowed_markup() {
        assert_eq!(
            post_html("<p>Shot at <strong>dusk</strong></p>"),
            "<p>Shot at <strong>dusk</strong></p>"
        );
    }

    #[test]
    fn post_html_drops_scripts_and_handlers() {
        let clean = post_html(r#"<p onclick="x()">Hi</p><script>alert(1)</script>"#);
        assert_eq!(clean, "<p>Hi</p>");
    }

    #[test]
    fn post_html_drops_javascript_urls() {
        let clean = post_html(r#"<a href="javascript:alert(1)">x</a>"#);
        assert!(!clean.contains("javascript"));
    }

    #[test]
    fn post_html_trims() {
        assert_eq!(post_html("  <em>x</em>\n"), "<em>x</em>");
    }

    #[test]
    fn field_dispatch() {
        assert_eq!(sanitize_field(FieldName::AltText, " <i>a</i> "), "a");
        assert_eq!(sanitize_field(FieldName::Title, "<i>a</i>"), "a");
        assert_eq!(sanitize_field(FieldName::Description, "<i>a</i>"), "<i>a</i>");
    }

    #[test]
    fn sanitised_description_does_not_drift() {
        let once = post_html("Tom & Jerry <b>\"quoted\"</b> 1 < 2");
        assert_eq!(post_html(&once), once);
    }

    proptest! {
        #[test]
        fn plain_text_is_idempotent(raw in "[ -~\n\t]{0,64}") {
            let once = plain_text(&raw);
            prop_assert_eq!(plain_text(&once), once);
        }

        #[test]
        fn post_html_is_idempotent(
            raw in r#"([a-z &"']| < |<p>|</p>|<b>|</b>|<em>|</em>|<a href="http://x">|</a>|<script>x</script>){0,24}"#
        ) {
            let once = post_html(&raw);
            prop_assert_eq!(post_html(&once), once);
        }
    }
}
