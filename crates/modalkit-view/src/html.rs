#![forbid(unsafe_code)]

//! HTML serialization with contextual escaping.
//!
//! Text nodes escape `&`, `<`, `>`; attribute values additionally escape `"`.
//! Attribute values are always double-quoted. Boolean attributes (empty
//! value) are written bare.

use std::fmt::{self, Write};

use crate::node::{Element, ViewNode};

/// Serialize a view tree to an HTML string.
pub fn to_html(node: &ViewNode) -> String {
    let mut out = String::with_capacity(256);
    // Writing into a String cannot fail.
    let _ = write_node(&mut out, node);
    out
}

impl fmt::Display for ViewNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(f, self)
    }
}

fn write_node<W: Write>(out: &mut W, node: &ViewNode) -> fmt::Result {
    match node {
        ViewNode::Text(text) => write_escaped(out, text, false),
        ViewNode::Trusted(markup) => out.write_str(markup.as_str()),
        ViewNode::Element(el) => write_element(out, el),
    }
}

fn write_element<W: Write>(out: &mut W, el: &Element) -> fmt::Result {
    let name = el.tag().name();
    out.write_char('<')?;
    out.write_str(name)?;
    for (attr, value) in el.attrs() {
        out.write_char(' ')?;
        out.write_str(attr)?;
        if !value.is_empty() {
            out.write_str("=\"")?;
            write_escaped(out, value, true)?;
            out.write_char('"')?;
        }
    }
    out.write_char('>')?;
    if el.tag().is_void() {
        return Ok(());
    }
    for child in el.child_nodes() {
        write_node(out, child)?;
    }
    out.write_str("</")?;
    out.write_str(name)?;
    out.write_char('>')
}

/// Escape `input` for text or attribute context.
pub fn write_escaped<W: Write>(out: &mut W, input: &str, attribute: bool) -> fmt::Result {
    let bytes = input.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        let rest = &bytes[start..];
        let hit = if attribute {
            // memchr3 covers three needles; `>` is caught by a second scan.
            let a = memchr::memchr3(b'&', b'<', b'"', rest);
            let b = memchr::memchr(b'>', rest);
            match (a, b) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            }
        } else {
            memchr::memchr3(b'&', b'<', b'>', rest)
        };
        let Some(offset) = hit else {
            out.write_str(&input[start..])?;
            break;
        };
        let at = start + offset;
        out.write_str(&input[start..at])?;
        out.write_str(match bytes[at] {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            _ => "&quot;",
        })?;
        start = at + 1;
    }
    Ok(())
}

/// Escape `input` into a new string (text context).
pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let _ = write_escaped(&mut out, input, false);
    out
}
