//! Head/body splitting and permissive tag parsing for document injection.
//!
//! The preview never hands user markup to a full HTML parser. Instead the
//! document is cut at the first `</head>`, the opening `<head>`/`<body>` tags
//! are matched with regular expressions, and external `<script src>` tags are
//! pulled out so the DOM layer can recreate them (scripts assigned through
//! `innerHTML` never execute).
//!
//! Malformed input is never an error: unbalanced tags, stray quotes or
//! angle brackets inside attribute values simply produce a partial result.

use std::sync::LazyLock;

use regex_lite::Regex;

static HEAD_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</head\s*>").unwrap());
static HEAD_OPEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<head\b").unwrap());
static BODY_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)</body\s*>").unwrap());
static OPENING_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*<(head|body)\b([^>]*)>").unwrap()
});
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#).unwrap()
});
static EXTERNAL_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b([^>]*\bsrc\s*=[^>]*)>.*?</script\s*>").unwrap()
});

/// A single attribute from an opening tag.
///
/// `value` is `None` for empty attributes such as `async` or `amp4ads`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: Option<String>,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            name: name.into(),
            value: value.map(str::to_owned),
        }
    }

    /// Value to hand to `setAttribute`; empty attributes get `""`.
    pub fn value_or_empty(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }
}

/// An external script extracted from fragment markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptTag {
    pub attributes: Vec<Attribute>,
}

impl ScriptTag {
    pub fn src(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case("src"))
            .and_then(|a| a.value.as_deref())
    }
}

/// The parsed content of either the head or the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    /// Attributes of the opening `<head>`/`<body>` tag, in source order.
    pub attributes: Vec<Attribute>,
    /// Inner markup with external scripts removed.
    pub markup: String,
    /// External scripts, in source order, to recreate after `markup` is set.
    pub scripts: Vec<ScriptTag>,
}

/// A document cut into its head and body fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentParts {
    pub head: Fragment,
    pub body: Fragment,
}

/// Split `html` into parsed head and body fragments.
///
/// The cut happens at the first `</head>` (case-insensitive). Everything before
/// `<head` is dropped from the head side, everything from `</body>` on is
/// dropped from the body side. Without a `</head>` the head is empty and the
/// whole input is treated as body.
pub fn split_document(html: &str) -> DocumentParts {
    let (head_src, body_src) = match HEAD_CLOSE.find(html) {
        Some(m) => (&html[..m.start()], &html[m.end()..]),
        None => ("", html),
    };

    let head_src = match HEAD_OPEN.find(head_src) {
        Some(m) => &head_src[m.start()..],
        None => head_src,
    };
    let body_src = match BODY_CLOSE.find(body_src) {
        Some(m) => &body_src[..m.start()],
        None => body_src,
    };

    tracing::trace!(
        head_len = head_src.len(),
        body_len = body_src.len(),
        "split document"
    );

    DocumentParts {
        head: parse_fragment(head_src),
        body: parse_fragment(body_src),
    }
}

/// Parse one side of a split document.
///
/// A leading `<head ...>` or `<body ...>` tag contributes its attributes and is
/// removed from the markup. Any other leading content is kept as markup.
pub fn parse_fragment(src: &str) -> Fragment {
    let (attributes, inner) = match OPENING_TAG.captures(src) {
        Some(caps) => {
            let attrs = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let end = caps.get(0).map(|m| m.end()).unwrap_or(0);
            (parse_attributes(attrs), &src[end..])
        }
        None => (Vec::new(), src),
    };

    let (markup, scripts) = extract_scripts(inner);
    Fragment {
        attributes,
        markup,
        scripts,
    }
}

/// Parse the attribute section of an opening tag.
///
/// Accepts double-quoted, single-quoted, unquoted and empty attributes. A
/// trailing `/` from self-closing syntax is ignored.
pub fn parse_attributes(src: &str) -> Vec<Attribute> {
    ATTRIBUTE
        .captures_iter(src)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str();
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str());
            Some(Attribute::new(name, value))
        })
        .collect()
}

/// Remove external `<script src=...>` tags from `markup`.
///
/// Returns the remaining markup and the removed scripts in source order.
/// Inline scripts stay in the markup untouched, including ones that only
/// mention `src` inside another attribute (`data-src`, `alt="src=x"`).
pub fn extract_scripts(markup: &str) -> (String, Vec<ScriptTag>) {
    let mut scripts = Vec::new();
    let remaining = EXTERNAL_SCRIPT.replace_all(markup, |caps: &regex_lite::Captures<'_>| {
        let whole = caps.get(0).map(|m| m.as_str()).unwrap_or("");
        let attrs = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let script = ScriptTag {
            attributes: parse_attributes(attrs),
        };
        if script.src().is_none() {
            return whole.to_owned();
        }
        scripts.push(script);
        String::new()
    });
    (remaining.into_owned(), scripts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_full_document() {
        let html = r#"<!doctype html><html amp4ads><head><meta charset="utf-8"></head><body class="ad"><p>hi</p></body></html>"#;
        let parts = split_document(html);

        assert!(parts.head.attributes.is_empty());
        assert_eq!(parts.head.markup, r#"<meta charset="utf-8">"#);
        assert_eq!(
            parts.body.attributes,
            vec![Attribute::new("class", Some("ad"))]
        );
        assert_eq!(parts.body.markup, "<p>hi</p>");
    }

    #[test]
    fn test_split_is_case_insensitive() {
        let parts = split_document("<HEAD lang=en><title>t</title></HEAD><BODY><i>x</i></BODY>");
        assert_eq!(parts.head.attributes, vec![Attribute::new("lang", Some("en"))]);
        assert_eq!(parts.head.markup, "<title>t</title>");
        assert_eq!(parts.body.markup, "<i>x</i>");
    }

    #[test]
    fn test_split_without_head_is_all_body() {
        let parts = split_document("<b>x</b>");
        assert_eq!(parts.head, Fragment::default());
        assert!(parts.body.attributes.is_empty());
        assert_eq!(parts.body.markup, "<b>x</b>");
    }

    #[test]
    fn test_split_uses_first_head_close() {
        let parts = split_document("<head>a</head><body>b</head>c</body>");
        assert_eq!(parts.head.markup, "a");
        assert_eq!(parts.body.markup, "b</head>c");
    }

    #[test]
    fn test_split_drops_trailing_after_body() {
        let parts = split_document("<head></head><body>b</body><!-- tail --></html>");
        assert_eq!(parts.body.markup, "b");
    }

    #[test]
    fn test_header_element_is_not_head() {
        let parts = split_document("junk<header>h</header><head>x</head><body></body>");
        assert_eq!(parts.head.markup, "x");
    }

    #[test]
    fn test_parse_attributes_mixed() {
        let attrs = parse_attributes(r#" async src="x.js" data-a='y' b=z custom-element"#);
        assert_eq!(
            attrs,
            vec![
                Attribute::new("async", None),
                Attribute::new("src", Some("x.js")),
                Attribute::new("data-a", Some("y")),
                Attribute::new("b", Some("z")),
                Attribute::new("custom-element", None),
            ]
        );
    }

    #[test]
    fn test_parse_attributes_ignores_self_closing_slash() {
        let attrs = parse_attributes(r#"src="a" /"#);
        assert_eq!(attrs, vec![Attribute::new("src", Some("a"))]);
    }

    #[test]
    fn test_empty_value_is_kept() {
        let attrs = parse_attributes(r#"alt="""#);
        assert_eq!(attrs, vec![Attribute::new("alt", Some(""))]);
        assert_eq!(attrs[0].value_or_empty(), "");
    }

    #[test]
    fn test_extract_external_scripts() {
        let markup = r#"<p>a</p><script async src="x.js"></script><script>inline()</script><SCRIPT src='y.js' custom-element="amp-ad"></SCRIPT>"#;
        let (rest, scripts) = extract_scripts(markup);

        assert_eq!(rest, "<p>a</p><script>inline()</script>");
        assert_eq!(scripts.len(), 2);
        assert_eq!(scripts[0].src(), Some("x.js"));
        assert_eq!(scripts[0].attributes[0], Attribute::new("async", None));
        assert_eq!(scripts[1].src(), Some("y.js"));
        assert_eq!(
            scripts[1].attributes[1],
            Attribute::new("custom-element", Some("amp-ad"))
        );
    }

    #[test]
    fn test_inline_script_mentioning_src_is_kept() {
        let markup = r#"<script type="application/json" data-src="cfg">{"a":1}</script><p>x</p>"#;
        let (rest, scripts) = extract_scripts(markup);
        assert_eq!(rest, markup);
        assert!(scripts.is_empty());

        let markup = r#"<script title="src=x">run()</script>"#;
        let (rest, scripts) = extract_scripts(markup);
        assert_eq!(rest, markup);
        assert!(scripts.is_empty());
    }

    #[test]
    fn test_data_src_next_to_real_src() {
        let (rest, scripts) =
            extract_scripts(r#"<script data-src="a" src="b.js"></script><i>y</i>"#);
        assert_eq!(rest, "<i>y</i>");
        assert_eq!(scripts.len(), 1);
        assert_eq!(scripts[0].src(), Some("b.js"));
    }

    #[test]
    fn test_head_scripts_are_extracted() {
        let html = r#"<head><script async src="https://cdn.ampproject.org/amp4ads-v0.js"></script><style amp4ads-boilerplate>body{}</style></head><body></body>"#;
        let parts = split_document(html);
        assert_eq!(parts.head.markup, "<style amp4ads-boilerplate>body{}</style>");
        assert_eq!(
            parts.head.scripts[0].src(),
            Some("https://cdn.ampproject.org/amp4ads-v0.js")
        );
        assert!(parts.body.scripts.is_empty());
    }

    #[test]
    fn test_amp_ad_body_snapshot() {
        let html = r#"<html amp4ads><head></head><body class=ad data-vars-id='7' hidden><amp-img src="/logo.png"></amp-img><script async custom-element="amp-carousel" src="carousel.js"></script></body></html>"#;
        let parts = split_document(html);

        insta::assert_snapshot!(
            format!("{:?}", parts.body.attributes),
            @r#"[Attribute { name: "class", value: Some("ad") }, Attribute { name: "data-vars-id", value: Some("7") }, Attribute { name: "hidden", value: None }]"#
        );
        insta::assert_snapshot!(parts.body.markup, @r#"<amp-img src="/logo.png"></amp-img>"#);
        insta::assert_snapshot!(
            format!("{:?}", parts.body.scripts[0].src()),
            @r#"Some("carousel.js")"#
        );
    }

    #[test]
    fn test_malformed_input_degrades() {
        // Unterminated body tag: no opening tag match, everything stays markup.
        let parts = split_document("<head></head><body class=\"x");
        assert!(parts.body.attributes.is_empty());
        assert_eq!(parts.body.markup, "<body class=\"x");

        // Quote containing `>` cuts the tag short; the remainder leaks into markup.
        let parts = split_document(r#"<head></head><body title="a>b"><i>x</i></body>"#);
        assert_eq!(parts.body.markup, r#"b"><i>x</i>"#);
    }
}
