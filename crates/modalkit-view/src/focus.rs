#![forbid(unsafe_code)]

//! Document-order discovery of focusable elements.
//!
//! An element is focusable when it is interactive by nature (button, input,
//! select, textarea, `a[href]`, iframe, `video[controls]`) or carries a
//! non-negative `tabindex`, and it is not excluded from the tab order.
//!
//! Exclusions:
//! - `tabindex` with a negative value,
//! - `disabled`,
//! - `input[type=hidden]`,
//! - any element inside a `hidden` or `inert` subtree.
//!
//! Positive `tabindex` values are treated like `0`; dialogs keep document
//! order.

use crate::node::{Element, Tag, ViewNode};

/// What kind of control a focusable element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FocusRole {
    /// Text-entry style controls: input, textarea, select.
    Input,
    Button,
    Link,
    /// Embeds and custom `tabindex` elements.
    Other,
}

/// Classify a single element, ignoring its ancestors.
pub fn focus_role(el: &Element) -> Option<FocusRole> {
    if el.has_attr("disabled") {
        return None;
    }
    let tabindex = el.get_attr("tabindex").and_then(|v| v.trim().parse::<i32>().ok());
    if tabindex.is_some_and(|t| t < 0) {
        return None;
    }
    let native = match el.tag() {
        Tag::Input if el.get_attr("type") == Some("hidden") => return None,
        Tag::Input | Tag::Textarea | Tag::Select => Some(FocusRole::Input),
        Tag::Button => Some(FocusRole::Button),
        Tag::A if el.has_attr("href") => Some(FocusRole::Link),
        Tag::Iframe => Some(FocusRole::Other),
        Tag::Video if el.has_attr("controls") => Some(FocusRole::Other),
        _ => None,
    };
    native.or(tabindex.map(|_| FocusRole::Other))
}

/// Focusable elements of `root` in document order.
pub fn focusable_elements(root: &ViewNode) -> Vec<(&Element, FocusRole)> {
    let mut out = Vec::new();
    collect(root, &mut out);
    out
}

fn collect<'a>(node: &'a ViewNode, out: &mut Vec<(&'a Element, FocusRole)>) {
    let ViewNode::Element(el) = node else {
        return;
    };
    if el.has_attr("hidden") || el.has_attr("inert") {
        return;
    }
    if let Some(role) = focus_role(el) {
        out.push((el, role));
    }
    for child in el.child_nodes() {
        collect(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(view: &ViewNode) -> Vec<FocusRole> {
        focusable_elements(view).into_iter().map(|(_, r)| r).collect()
    }

    #[test]
    fn native_controls_in_document_order() {
        let view: ViewNode = Element::new(Tag::Form)
            .child(Element::new(Tag::Input).attr("type", "text"))
            .child(Element::new(Tag::A).attr("href", "/terms"))
            .child(Element::new(Tag::Button).text("Send"))
            .into();
        assert_eq!(
            roles(&view),
            vec![FocusRole::Input, FocusRole::Link, FocusRole::Button]
        );
    }

    #[test]
    fn exclusions_are_skipped() {
        let view: ViewNode = Element::new(Tag::Div)
            .child(Element::new(Tag::Input).attr("type", "hidden"))
            .child(Element::new(Tag::Button).flag("disabled"))
            .child(Element::new(Tag::Button).attr("tabindex", "-1"))
            .child(Element::new(Tag::A))
            .child(
                Element::new(Tag::Div)
                    .flag("hidden")
                    .child(Element::new(Tag::Button)),
            )
            .into();
        assert!(roles(&view).is_empty());
    }

    #[test]
    fn tabindex_makes_plain_elements_focusable() {
        let view: ViewNode = Element::new(Tag::Div)
            .child(Element::new(Tag::Div).attr("tabindex", "0"))
            .child(Element::new(Tag::Span).attr("tabindex", "3"))
            .into();
        assert_eq!(roles(&view), vec![FocusRole::Other, FocusRole::Other]);
    }

    #[test]
    fn video_needs_controls() {
        let bare: ViewNode = Element::new(Tag::Video).into();
        let controls: ViewNode = Element::new(Tag::Video).flag("controls").into();
        assert!(roles(&bare).is_empty());
        assert_eq!(roles(&controls), vec![FocusRole::Other]);
    }
}
