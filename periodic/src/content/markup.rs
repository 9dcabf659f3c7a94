// This file is part of the product NoPressure.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

//! Minimal tag scanner for locating id-addressed elements in an HTML document.
//!
//! The scanner only understands start tags, end tags and attributes. Comments and
//! the bodies of `<script>`/`<style>` are opaque text. Everything it does not
//! rewrite is kept byte-for-byte, which is what lets the element pages carry
//! arbitrary surrounding markup.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::ops::Range;

static TAG_REGEX: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(
        r#"<(/?)([A-Za-z][A-Za-z0-9:-]*)((?:\s+[^\s"'<>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'<>=`]+))?)*)\s*(/?)>"#,
    )
});

static ATTRIBUTE_REGEX: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'<>=`]+)))?"#)
});

const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    Regex(String),
    Unterminated { tag: String, id: String },
}

impl fmt::Display for MarkupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkupError::Regex(message) => write!(f, "markup pattern failed: {}", message),
            MarkupError::Unterminated { tag, id } => {
                write!(f, "<{}> with id '{}' is never closed", tag, id)
            }
        }
    }
}

impl std::error::Error for MarkupError {}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    /// Byte range of the whole `name="value"` text in the document.
    pub span: Range<usize>,
}

#[derive(Debug, Clone)]
pub struct Tag {
    pub name: String,
    pub span: Range<usize>,
    pub closing: bool,
    pub self_closing: bool,
    pub attributes: Vec<Attribute>,
}

impl Tag {
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
    }

    fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.name.as_str())
    }

    /// Whether a matching end tag is expected after this tag.
    fn opens_scope(&self) -> bool {
        !self.closing && !self.self_closing && !self.is_void()
    }
}

/// An element located by id. `content` is `None` for void or self-closing elements.
#[derive(Debug, Clone)]
pub struct ElementSpan {
    pub start_tag: Tag,
    pub content: Option<Range<usize>>,
}

fn compiled(
    regex: &'static Lazy<Result<Regex, regex::Error>>,
) -> Result<&'static Regex, MarkupError> {
    Lazy::force(regex)
        .as_ref()
        .map_err(|err| MarkupError::Regex(err.to_string()))
}

/// Scans start and end tags inside `range` of `doc`. Offsets are absolute.
pub fn scan_tags(doc: &str, range: Range<usize>) -> Result<Vec<Tag>, MarkupError> {
    let tag_regex = compiled(&TAG_REGEX)?;
    let attribute_regex = compiled(&ATTRIBUTE_REGEX)?;
    let base = range.start;
    let text = &doc[range];
    let comments = comment_spans(text);

    let mut tags = Vec::new();
    let mut raw_text_end = 0usize;
    for captures in tag_regex.captures_iter(text) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        if whole.start() < raw_text_end
            || comments
                .iter()
                .any(|comment| comment.contains(&whole.start()))
        {
            continue;
        }
        let closing = captures.get(1).is_some_and(|m| !m.as_str().is_empty());
        let name = captures
            .get(2)
            .map(|m| m.as_str().to_ascii_lowercase())
            .unwrap_or_default();
        let self_closing = captures.get(4).is_some_and(|m| !m.as_str().is_empty());

        let mut attributes = Vec::new();
        if let Some(raw) = captures.get(3) {
            let offset = base + raw.start();
            for attribute in attribute_regex.captures_iter(raw.as_str()) {
                let (Some(all), Some(attr_name)) = (attribute.get(0), attribute.get(1)) else {
                    continue;
                };
                let value = attribute
                    .get(2)
                    .or_else(|| attribute.get(3))
                    .or_else(|| attribute.get(4))
                    .map(|m| decode_entities(m.as_str()))
                    .unwrap_or_default();
                attributes.push(Attribute {
                    name: attr_name.as_str().to_ascii_lowercase(),
                    value,
                    span: offset + all.start()..offset + all.end(),
                });
            }
        }

        if !closing && !self_closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
            raw_text_end = raw_text_close(text, whole.end(), &name);
        }

        tags.push(Tag {
            name,
            span: base + whole.start()..base + whole.end(),
            closing,
            self_closing,
            attributes,
        });
    }
    Ok(tags)
}

/// `<!-- ... -->` ranges of `text`. An unclosed comment runs to the end.
fn comment_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut from = 0;
    while let Some(found) = text[from..].find("<!--") {
        let start = from + found;
        let end = text[start + 4..]
            .find("-->")
            .map_or(text.len(), |close| start + 4 + close + 3);
        spans.push(start..end);
        from = end;
    }
    spans
}

/// Offset of the `</name` that ends a raw text body starting at `from`.
fn raw_text_close(text: &str, from: usize, name: &str) -> usize {
    let needle = format!("</{}", name);
    text[from..]
        .to_ascii_lowercase()
        .find(&needle)
        .map_or(text.len(), |found| from + found)
}

/// Finds every element whose `id` attribute equals `id`, in document order.
pub fn find_by_id(doc: &str, id: &str) -> Result<Vec<ElementSpan>, MarkupError> {
    let tags = scan_tags(doc, 0..doc.len())?;
    let mut found = Vec::new();

    for (position, tag) in tags.iter().enumerate() {
        if tag.closing || tag.attribute("id").is_none_or(|attr| attr.value != id) {
            continue;
        }

        let content = if tag.opens_scope() {
            let close = matching_close(&tags[position + 1..], &tag.name).ok_or_else(|| {
                MarkupError::Unterminated {
                    tag: tag.name.clone(),
                    id: id.to_string(),
                }
            })?;
            Some(tag.span.end..close.span.start)
        } else {
            None
        };

        found.push(ElementSpan {
            start_tag: tag.clone(),
            content,
        });
    }
    Ok(found)
}

fn matching_close<'a>(following: &'a [Tag], name: &str) -> Option<&'a Tag> {
    let mut depth = 1usize;
    for tag in following.iter().filter(|tag| tag.name == name) {
        if tag.closing {
            depth -= 1;
            if depth == 0 {
                return Some(tag);
            }
        } else if tag.opens_scope() {
            depth += 1;
        }
    }
    None
}

/// Replaces the content of every element with `id` by the escaped `text`.
pub fn set_text(doc: &str, id: &str, text: &str) -> Result<String, MarkupError> {
    let mut output = doc.to_string();
    let escaped = html_escape(text);
    // Back to front so earlier offsets stay valid.
    for span in find_by_id(doc, id)?.into_iter().rev() {
        if let Some(content) = span.content {
            output.replace_range(content, &escaped);
        }
    }
    Ok(output)
}

/// Sets attribute `name` on every element with `id`, adding it when absent.
pub fn set_attribute(doc: &str, id: &str, name: &str, value: &str) -> Result<String, MarkupError> {
    let mut output = doc.to_string();
    let rendered = format!("{}=\"{}\"", name, html_escape(value));
    for span in find_by_id(doc, id)?.into_iter().rev() {
        let tag = &span.start_tag;
        match tag.attribute(name) {
            Some(existing) => output.replace_range(existing.span.clone(), &rendered),
            None => {
                let insert_at = tag.span.start + 1 + tag.name.len();
                output.insert_str(insert_at, &format!(" {}", rendered));
            }
        }
    }
    Ok(output)
}

/// Counts the element children directly inside `content`.
pub fn element_children(doc: &str, content: Range<usize>) -> Result<usize, MarkupError> {
    let mut depth = 0usize;
    let mut count = 0usize;
    for tag in scan_tags(doc, content)? {
        if tag.closing {
            depth = depth.saturating_sub(1);
            continue;
        }
        if depth == 0 {
            count += 1;
        }
        if tag.opens_scope() {
            depth += 1;
        }
    }
    Ok(count)
}

pub fn html_escape(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    input
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
