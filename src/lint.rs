//! Structural checks on generated HTML and on comment bodies.
//!
//! Markup is read with a lenient `quick_xml` reader: end names are not
//! checked and unmatched end tags are tolerated, so ordinary HTML with
//! unclosed elements can be walked as a stream of events.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use thiserror::Error;

const HEADINGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Elements that never have children, so never appear on the open stack.
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

#[derive(Error, Debug)]
pub enum LintError {
    #[error("Could not parse markup: {0}")]
    Parse(String),
    #[error("{0} does not have a heading class")]
    MissingHeadingClass(String),
    #[error("{element} has multiple heading classes: {classes:?}")]
    MultipleHeadingClasses {
        element: String,
        classes: Vec<String>,
    },
    #[error("{id:?} is descendant of {article:?}, but its id does not start with that")]
    IdPrefix { id: String, article: String },
    #[error("Not allowed: {0}")]
    NotAllowed(String),
}

fn reader(markup: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(markup);
    let config = reader.config_mut();
    config.trim_text(false);
    config.enable_all_checks(false);
    config.allow_unmatched_ends = true;
    reader
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.name().as_ref()).to_ascii_lowercase()
}

/// Attribute names (lowercased) and raw values of an element.
fn attributes(element: &BytesStart<'_>) -> Result<Vec<(String, String)>, LintError> {
    element
        .html_attributes()
        .map(|attribute| {
            let attribute = attribute.map_err(|e| LintError::Parse(e.to_string()))?;
            let name = String::from_utf8_lossy(attribute.key.as_ref()).to_ascii_lowercase();
            let value = String::from_utf8_lossy(&attribute.value).into_owned();
            Ok((name, value))
        })
        .collect()
}

fn attribute<'a>(attributes: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attributes
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn classes(attributes: &[(String, String)]) -> Vec<&str> {
    attribute(attributes, "class")
        .map(|value| value.split_ascii_whitespace().collect())
        .unwrap_or_default()
}

struct Open {
    name: String,
    /// Id of an `article` whose descendants' ids must carry it as a prefix.
    article_id: Option<String>,
}

fn check_heading(name: &str, attributes: &[(String, String)]) -> Result<(), LintError> {
    if !HEADINGS.contains(&name) {
        return Ok(());
    }
    let heading_classes: Vec<String> = classes(attributes)
        .into_iter()
        .filter(|class| HEADINGS.contains(class))
        .map(str::to_string)
        .collect();
    match heading_classes.len() {
        0 => Err(LintError::MissingHeadingClass(name.to_string())),
        1 => Ok(()),
        _ => Err(LintError::MultipleHeadingClasses {
            element: name.to_string(),
            classes: heading_classes,
        }),
    }
}

fn check_id(open: &[Open], attributes: &[(String, String)]) -> Result<(), LintError> {
    let Some(id) = attribute(attributes, "id") else {
        return Ok(());
    };
    for article in open.iter().filter_map(|o| o.article_id.as_deref()) {
        if !id.starts_with(&format!("{article}-")) {
            return Err(LintError::IdPrefix {
                id: id.to_string(),
                article: article.to_string(),
            });
        }
    }
    Ok(())
}

fn close(open: &mut Vec<Open>, name: &str) {
    if let Some(position) = open.iter().rposition(|o| o.name == name) {
        open.truncate(position);
    }
}

/// Checks a document or fragment of generated HTML.
///
/// Every `h1`..`h6` element needs exactly one heading class. Posts can be
/// embedded in lists with other posts, so every id inside an `article[id]`
/// must start with that article's id and a hyphen. Comment articles
/// (`class="comment"`) don't impose their own prefix.
pub fn html(markup: &str) -> Result<(), LintError> {
    let mut reader = reader(markup);
    let mut open: Vec<Open> = Vec::new();
    loop {
        let event = reader
            .read_event()
            .map_err(|e| LintError::Parse(e.to_string()))?;
        let (element, self_closing) = match event {
            Event::Start(element) => (element, false),
            Event::Empty(element) => (element, true),
            Event::End(element) => {
                let name = String::from_utf8_lossy(element.name().as_ref()).to_ascii_lowercase();
                close(&mut open, &name);
                continue;
            }
            Event::Eof => return Ok(()),
            _ => continue,
        };
        let name = element_name(&element);
        let attributes = attributes(&element)?;
        check_heading(&name, &attributes)?;
        check_id(&open, &attributes)?;
        if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
            continue;
        }
        let article_id = if name == "article" && !classes(&attributes).contains(&"comment") {
            attribute(&attributes, "id").map(str::to_string)
        } else {
            None
        };
        open.push(Open { name, article_id });
    }
}

/// Checks that a comment body only uses bare `<p>` and `<a href>`.
///
/// Anything else, including markup comments and processing instructions, is
/// rejected.
pub fn comment(markup: &str) -> Result<(), LintError> {
    let mut reader = reader(markup);
    loop {
        let event = reader
            .read_event()
            .map_err(|e| LintError::Parse(e.to_string()))?;
        match event {
            Event::Start(element) | Event::Empty(element) => {
                let name = element_name(&element);
                let attributes = attributes(&element)?;
                let names: Vec<&str> = attributes.iter().map(|(key, _)| key.as_str()).collect();
                let allowed = match name.as_str() {
                    "p" => names.is_empty(),
                    "a" => names == ["href"],
                    _ => false,
                };
                if !allowed {
                    return Err(LintError::NotAllowed(format!("<{name}> with {names:?}")));
                }
            }
            Event::Text(_) | Event::GeneralRef(_) | Event::End(_) => {}
            Event::Eof => return Ok(()),
            other => return Err(LintError::NotAllowed(format!("{other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_rejects_disallowed_markup() {
        for markup in [
            "<script></script>",
            "<p><script></script></p>",
            "<p></p><script></script>",
            "<!-- comment -->",
            r#"<?xml version="1.0"?>"#,
            "<p id=foo></p>",
            r#"<a href="foo" onclick="bar">foo</a>"#,
            "<a>foo</a>",
        ] {
            let err = comment(markup).unwrap_err();
            assert!(
                matches!(err, LintError::NotAllowed(_)),
                "{markup}: {err}"
            );
            assert!(err.to_string().starts_with("Not allowed"));
        }
    }

    #[test]
    fn comment_accepts_links_and_paragraphs() {
        for markup in [
            r#"<p><a href="foo">foo</a></p>"#,
            "<p>foo</p><p>bar</p>",
            "<p>&amp;</p>",
            "plain text",
        ] {
            comment(markup).unwrap();
        }
    }

    #[test]
    fn headings_need_a_class() {
        for level in HEADINGS {
            let err = html(&format!("<{level}>foo</{level}>")).unwrap_err();
            assert!(err.to_string().contains("does not have a heading class"));
            let err = html(&format!(
                "<!DOCTYPE html><body><{level}>foo</{level}></body>"
            ))
            .unwrap_err();
            assert!(err.to_string().contains("does not have a heading class"));
        }
    }

    #[test]
    fn heading_with_multiple_classes() {
        let err = html(r#"<h1 class="h1 h2">foo</h1>"#).unwrap_err();
        assert!(err.to_string().contains("has multiple heading classes"));
    }

    #[test]
    fn heading_class_may_differ_from_element() {
        html(r#"<h2 class="h1 title">foo</h2>"#).unwrap();
    }

    #[test]
    fn ids_inside_articles_need_prefix() {
        let err = html(r#"<div><article id="foo"><div><p id="bar"></div></article></div>"#)
            .unwrap_err();
        assert!(err.to_string().contains("its id does not start with"));

        let err = html(concat!(
            r#"<article id="foo">"#,
            r#"<article id="foo-bar" class="comment">"#,
            r#"<p id="quux">"#,
            "</article>",
            "</article>",
        ))
        .unwrap_err();
        assert!(err.to_string().contains("its id does not start with"));
    }

    #[test]
    fn ids_with_prefix() {
        for markup in [
            r#"<div><article id="foo"><div><p id="foo-bar"></div></article></div>"#,
            r#"<div><article><div><p id="bar"></div></article></div>"#,
            concat!(
                r#"<article id="foo">"#,
                r#"<article id="foo-bar">"#,
                r#"<p id="foo-bar-quux">"#,
                "</article>",
                "</article>",
            ),
            concat!(
                r#"<article id="foo">"#,
                r#"<article id="foo-bar" class="comment">"#,
                r#"<p id="foo-quux">"#,
                "</article>",
                "</article>",
            ),
        ] {
            html(markup).unwrap();
        }
    }

    #[test]
    fn ids_after_article_closes_are_free() {
        html(r#"<article id="foo"><br><img src="x"></article><p id="bar"></p>"#).unwrap();
    }
}
