//! Attribute helpers for walking provider markup with quick-xml.
//!
//! Provider markup is HTML, so attributes are read with
//! `html_attributes()` (valueless and unquoted attributes are accepted) and
//! values are taken raw. Nothing here unescapes entities.

use quick_xml::events::BytesStart;

/// Extract a string attribute value by key.
///
/// Returns `None` if the attribute is missing or not valid UTF-8.
pub fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.html_attributes().flatten() {
        if attr.key.as_ref() == key {
            return std::str::from_utf8(&attr.value).ok().map(|s| s.to_string());
        }
    }
    None
}

/// Extract a `u32` attribute value by key.
pub fn attr_u32(e: &BytesStart, key: &[u8]) -> Option<u32> {
    attr_string(e, key).and_then(|s| s.trim().parse().ok())
}

/// Whitespace-separated entries of the `class` attribute.
pub fn class_list(e: &BytesStart) -> Vec<String> {
    attr_string(e, b"class")
        .map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Value of one declaration inside an inline `style` attribute.
///
/// `style_property("color: red; --pd-df-iloc: 4", "--pd-df-iloc")` is
/// `Some("4")`.
pub fn style_property<'a>(style: &'a str, name: &str) -> Option<&'a str> {
    style.split(';').find_map(|declaration| {
        let (key, value) = declaration.split_once(':')?;
        (key.trim() == name).then(|| value.trim())
    })
}

/// Rules of a stylesheet as `(selector list, declaration block)` pairs.
///
/// Comments and nested at-rules are not understood; an `@media` block comes
/// out as a pair whose declarations match nothing.
pub fn css_rules(css: &str) -> impl Iterator<Item = (&str, &str)> {
    css.split('}').filter_map(|chunk| {
        let (selectors, declarations) = chunk.split_once('{')?;
        Some((selectors.trim(), declarations))
    })
}

/// Tag and classes of the rightmost compound of one selector.
///
/// `#T_x th.pd-col-0` is `(Some("th"), ["pd-col-0"])`. Selectors with
/// pseudo-classes or attribute tests yield `None`.
pub fn subject_compound(selector: &str) -> Option<(Option<String>, Vec<String>)> {
    let compound = selector
        .split(|c: char| c.is_whitespace() || matches!(c, '>' | '+' | '~'))
        .filter(|part| !part.is_empty())
        .last()?;
    if compound.contains([':', '[']) {
        return None;
    }
    let mut parts = compound.split('.');
    let tag = parts
        .next()
        .and_then(|head| head.split('#').next())
        .filter(|tag| !tag.is_empty() && *tag != "*")
        .map(str::to_ascii_lowercase);
    let classes = parts
        .filter_map(|class| class.split('#').next())
        .filter(|class| !class.is_empty())
        .map(str::to_string)
        .collect();
    Some((tag, classes))
}

/// Get the element name as an owned, lowercased string.
///
/// Returns empty string if not valid UTF-8.
#[inline]
pub fn local_name_string(e: &BytesStart) -> String {
    let bytes = e.local_name();
    std::str::from_utf8(bytes.as_ref())
        .unwrap_or("")
        .to_ascii_lowercase()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;

    fn make_start(html: &str) -> BytesStart<'_> {
        let content = html
            .trim_start_matches('<')
            .trim_end_matches('>')
            .trim_end_matches('/');
        BytesStart::from_content(content, content.find(' ').unwrap_or(content.len()))
    }

    #[test]
    fn test_attr_string() {
        let e = make_start(r#"<th class="pd-col-head" rowspan="2">"#);
        assert_eq!(attr_string(&e, b"class"), Some("pd-col-head".to_string()));
        assert_eq!(attr_string(&e, b"missing"), None);
    }

    #[test]
    fn test_valueless_attribute_does_not_hide_others() {
        let e = make_start(r#"<span draggable class="pd-col-text">"#);
        assert_eq!(class_list(&e), vec!["pd-col-text".to_string()]);
    }

    #[test]
    fn test_attr_u32() {
        let e = make_start(r#"<th rowspan="3">"#);
        assert_eq!(attr_u32(&e, b"rowspan"), Some(3));
        assert_eq!(attr_u32(&e, b"colspan"), None);
    }

    #[test]
    fn test_class_list() {
        let e = make_start(r#"<th class=" pd-row-head  level0 row3 ">"#);
        assert_eq!(class_list(&e), vec!["pd-row-head", "level0", "row3"]);
    }

    #[test]
    fn test_style_property() {
        let style = "width: 10px; --pd-df-iloc: 17 ;";
        assert_eq!(style_property(style, "--pd-df-iloc"), Some("17"));
        assert_eq!(style_property(style, "width"), Some("10px"));
        assert_eq!(style_property(style, "height"), None);
    }

    #[test]
    fn test_css_rules() {
        let css = "#T_x th.pd-col-0 {\n  --pd-df-iloc: 0;\n}\n#T_x th.pd-row-3, td { color: red }";
        let rules: Vec<_> = css_rules(css).collect();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].0, "#T_x th.pd-col-0");
        assert_eq!(style_property(rules[0].1, "--pd-df-iloc"), Some("0"));
        assert_eq!(rules[1].0, "#T_x th.pd-row-3, td");
    }

    #[test]
    fn test_subject_compound() {
        assert_eq!(
            subject_compound("#T_x th.pd-col-0"),
            Some((Some("th".to_string()), vec!["pd-col-0".to_string()]))
        );
        assert_eq!(
            subject_compound("#T_x > .pd-col-head.pd-col-2"),
            Some((None, vec!["pd-col-head".to_string(), "pd-col-2".to_string()]))
        );
        assert_eq!(subject_compound("th.pd-col-0:hover"), None);
        assert_eq!(subject_compound("   "), None);
    }

    #[test]
    fn test_local_name_is_lowercased() {
        let e = make_start("<TH>");
        assert_eq!(local_name_string(&e), "th");
    }
}
