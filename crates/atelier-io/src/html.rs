//! Minimal HTML scanning for clipboard markup.
//!
//! Built on `winnow` 0.7. Only start tags and their attributes are
//! recognized; text, closing tags, doctypes and comments are skipped.
//! Clipboard HTML is routinely rewrapped by browsers (`<meta>`, `<html>`,
//! `<body>`) and attribute values may arrive entity-escaped, so the
//! scanner never fails: it yields whatever tags it can read.

use std::borrow::Cow;
use winnow::ascii::{digit1, hex_digit1, multispace0};
use winnow::combinator::{alt, delimited, opt, preceded};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{one_of, take_till, take_while};

/// A start tag with entity-decoded attribute values. Valueless attributes
/// decode to an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    pub name: &'a str,
    pub attributes: Vec<(&'a str, String)>,
}

impl Tag<'_> {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// ─── Tags ────────────────────────────────────────────────────────────────

fn parse_tag_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-' || c == ':').parse_next(input)
}

fn parse_attribute_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| {
        !c.is_whitespace() && !matches!(c, '=' | '>' | '/' | '"' | '\'' | '<')
    })
    .parse_next(input)
}

fn parse_attribute_value<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    alt((
        delimited('"', take_till(0.., '"'), '"'),
        delimited('\'', take_till(0.., '\''), '\''),
        take_while(1.., |c: char| !c.is_whitespace() && c != '>'),
    ))
    .parse_next(input)
}

fn parse_attribute<'a>(input: &mut &'a str) -> ModalResult<(&'a str, Option<&'a str>)> {
    let name = parse_attribute_name.parse_next(input)?;
    let value = opt(preceded(
        (multispace0, '=', multispace0),
        parse_attribute_value,
    ))
    .parse_next(input)?;
    Ok((name, value))
}

fn parse_start_tag<'a>(input: &mut &'a str) -> ModalResult<Tag<'a>> {
    let name = preceded('<', parse_tag_name).parse_next(input)?;
    let mut attributes = Vec::new();
    loop {
        multispace0.parse_next(input)?;
        if opt(alt(("/>", ">"))).parse_next(input)?.is_some() {
            break;
        }
        let (key, value) = parse_attribute.parse_next(input)?;
        let value = value.map(|v| unescape(v).into_owned()).unwrap_or_default();
        attributes.push((key, value));
    }
    Ok(Tag { name, attributes })
}

/// Every start tag in `html`, in document order.
pub fn start_tags(html: &str) -> Vec<Tag<'_>> {
    let mut rest = html;
    let mut tags = Vec::new();

    loop {
        let _ = take_till::<_, _, ContextError>(0.., '<').parse_next(&mut rest);
        if rest.is_empty() {
            break;
        }
        if let Some(comment) = rest.strip_prefix("<!--") {
            rest = comment.find("-->").map_or("", |end| &comment[end + 3..]);
            continue;
        }
        let mut attempt = rest;
        match parse_start_tag.parse_next(&mut attempt) {
            Ok(tag) => {
                tags.push(tag);
                rest = attempt;
            }
            // not a start tag: step over the '<'
            Err(_) => rest = &rest[1..],
        }
    }
    tags
}

/// Value of `attribute` on the first `tag` element that carries it.
pub fn find_attribute(html: &str, tag: &str, attribute: &str) -> Option<String> {
    start_tags(html)
        .into_iter()
        .filter(|t| t.name.eq_ignore_ascii_case(tag))
        .find_map(|t| t.attribute(attribute).map(str::to_string))
}

// ─── Entities ────────────────────────────────────────────────────────────

fn parse_named_entity(input: &mut &str) -> ModalResult<char> {
    alt((
        "amp".value('&'),
        "lt".value('<'),
        "gt".value('>'),
        "quot".value('"'),
        "apos".value('\''),
        "nbsp".value('\u{a0}'),
    ))
    .parse_next(input)
}

fn parse_numeric_entity(input: &mut &str) -> ModalResult<char> {
    preceded(
        '#',
        alt((
            preceded(one_of(['x', 'X']), hex_digit1)
                .try_map(|hex: &str| u32::from_str_radix(hex, 16)),
            digit1.try_map(|dec: &str| dec.parse::<u32>()),
        )),
    )
    .verify_map(char::from_u32)
    .parse_next(input)
}

fn parse_entity(input: &mut &str) -> ModalResult<char> {
    delimited('&', alt((parse_numeric_entity, parse_named_entity)), ';').parse_next(input)
}

/// Decode character references. Unknown or malformed ones are kept as-is.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        let mut attempt = rest;
        match parse_entity.parse_next(&mut attempt) {
            Ok(c) => {
                out.push(c);
                rest = attempt;
            }
            Err(_) => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_wrapped_span() {
        let html = r#"<meta charset="utf-8"><html><head></head><body><span data-x="1" hidden></span></body></html>"#;
        let tags = start_tags(html);
        let names: Vec<&str> = tags.iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["meta", "html", "head", "body", "span"]);
        assert_eq!(tags[4].attribute("data-x"), Some("1"));
        assert_eq!(tags[4].attribute("hidden"), Some(""));
    }

    #[test]
    fn quoted_and_unquoted_values() {
        let tag = &start_tags(r#"<a href='x y' id=z title = "t">"#)[0];
        assert_eq!(tag.attribute("href"), Some("x y"));
        assert_eq!(tag.attribute("id"), Some("z"));
        assert_eq!(tag.attribute("title"), Some("t"));
    }

    #[test]
    fn comment_markers_inside_attribute_values() {
        let html = r#"<span data-metadata="<!--(figmeta)abc(/figmeta)-->"></span>"#;
        assert_eq!(
            find_attribute(html, "span", "data-metadata").as_deref(),
            Some("<!--(figmeta)abc(/figmeta)-->")
        );
    }

    #[test]
    fn comments_and_garbage_are_skipped() {
        let html = "<!-- <span a=1> --> < <<span b=2></span> <";
        let tags = start_tags(html);
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].attribute("b"), Some("2"));
    }

    #[test]
    fn unescape_entities() {
        assert_eq!(unescape("a &amp; b"), "a & b");
        assert_eq!(unescape("&lt;span&gt;"), "<span>");
        assert_eq!(unescape("&#61;&#x3D;&quot;"), "==\"");
        assert_eq!(unescape("AT&T &bogus; &"), "AT&T &bogus; &");
        assert!(matches!(unescape("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn escaped_attribute_value_is_decoded() {
        let html = r#"<span data-v="b64:YQ&#x3D;&#x3D;"></span>"#;
        assert_eq!(
            find_attribute(html, "span", "data-v").as_deref(),
            Some("b64:YQ==")
        );
    }
}
