#![forbid(unsafe_code)]

//! View tree and builder functions.
//!
//! # Invariants
//!
//! - Tag names come from the closed [`Tag`] enum and attribute names are
//!   `&'static str`, so neither can carry user input.
//! - Text and attribute values are stored raw and escaped only at
//!   serialization time.
//! - [`TrustedMarkup`] is the single way to embed pre-rendered HTML. It is
//!   reserved for markup returned by a same-site content endpoint.

use smallvec::SmallVec;

/// Attribute marking a replaceable region inside a dialog.
pub const REGION_ATTR: &str = "data-modal-region";

/// Attribute carrying a dialog control's action token.
pub const ACTION_ATTR: &str = "data-modal-action";

/// HTML element names a dialog view may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    A,
    Button,
    Div,
    Figcaption,
    Figure,
    Footer,
    Form,
    H2,
    Header,
    Iframe,
    Img,
    Input,
    Label,
    Li,
    Option,
    P,
    Section,
    Select,
    Span,
    Strong,
    Textarea,
    Ul,
    Video,
}

impl Tag {
    /// Lower-case element name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::Button => "button",
            Self::Div => "div",
            Self::Figcaption => "figcaption",
            Self::Figure => "figure",
            Self::Footer => "footer",
            Self::Form => "form",
            Self::H2 => "h2",
            Self::Header => "header",
            Self::Iframe => "iframe",
            Self::Img => "img",
            Self::Input => "input",
            Self::Label => "label",
            Self::Li => "li",
            Self::Option => "option",
            Self::P => "p",
            Self::Section => "section",
            Self::Select => "select",
            Self::Span => "span",
            Self::Strong => "strong",
            Self::Textarea => "textarea",
            Self::Ul => "ul",
            Self::Video => "video",
        }
    }

    /// Void elements have no closing tag and no children.
    pub const fn is_void(self) -> bool {
        matches!(self, Self::Img | Self::Input)
    }
}

/// Pre-rendered markup accepted verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedMarkup(String);

impl TrustedMarkup {
    /// Wrap markup returned by a same-site content endpoint.
    pub fn from_endpoint(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An element with attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: Tag,
    attrs: SmallVec<[(&'static str, String); 4]>,
    children: Vec<ViewNode>,
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attrs: SmallVec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, replacing any previous value.
    #[must_use]
    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Set a boolean attribute (`required`, `disabled`, ...).
    #[must_use]
    pub fn flag(self, name: &'static str) -> Self {
        self.attr(name, "")
    }

    /// Set a boolean attribute only when `on` holds.
    #[must_use]
    pub fn flag_if(self, name: &'static str, on: bool) -> Self {
        if on { self.flag(name) } else { self }
    }

    /// Append one class to the `class` attribute.
    #[must_use]
    pub fn class(mut self, class: &str) -> Self {
        match self.attrs.iter_mut().find(|(n, _)| *n == "class") {
            Some((_, value)) => {
                if !value.split_ascii_whitespace().any(|c| c == class) {
                    value.push(' ');
                    value.push_str(class);
                }
            }
            None => self.attrs.push(("class", class.to_owned())),
        }
        self
    }

    /// Append a child node.
    #[must_use]
    pub fn child(mut self, child: impl Into<ViewNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several child nodes.
    #[must_use]
    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ViewNode>,
    {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// Append a text child.
    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(ViewNode::Text(text.into()))
    }

    /// Mark this element as the named replaceable region.
    #[must_use]
    pub fn region(self, name: &str) -> Self {
        self.attr(REGION_ATTR, name)
    }

    /// Mark this element as a control with the given action token.
    #[must_use]
    pub fn action(self, token: impl Into<String>) -> Self {
        self.attr(ACTION_ATTR, token)
    }

    pub fn set_attr(&mut self, name: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.attrs.push((name, value)),
        }
    }

    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.iter().any(|(n, _)| *n == name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .is_some_and(|v| v.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.attrs.iter().map(|(n, v)| (*n, v.as_str()))
    }

    pub fn child_nodes(&self) -> &[ViewNode] {
        &self.children
    }

    /// Replace all children.
    pub fn set_children(&mut self, children: Vec<ViewNode>) {
        self.children = children;
    }
}

/// A node in a dialog view tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewNode {
    Element(Element),
    Text(String),
    Trusted(TrustedMarkup),
}

impl From<Element> for ViewNode {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

impl From<TrustedMarkup> for ViewNode {
    fn from(markup: TrustedMarkup) -> Self {
        Self::Trusted(markup)
    }
}

impl From<&str> for ViewNode {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for ViewNode {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl ViewNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Depth-first, document-order walk over every element.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        if let Self::Element(el) = self {
            visit(el);
            for child in &el.children {
                child.walk(visit);
            }
        }
    }

    /// First element (document order) matching `pred`.
    pub fn find(&self, pred: impl Fn(&Element) -> bool) -> Option<&Element> {
        fn go<'a>(node: &'a ViewNode, pred: &dyn Fn(&Element) -> bool) -> Option<&'a Element> {
            let ViewNode::Element(el) = node else {
                return None;
            };
            if pred(el) {
                return Some(el);
            }
            el.children.iter().find_map(|c| go(c, pred))
        }
        go(self, &pred)
    }

    /// Find the element marked as region `name`.
    pub fn region(&self, name: &str) -> Option<&Element> {
        self.find(|el| el.get_attr(REGION_ATTR) == Some(name))
    }

    /// Replace the children of region `name` with `content`.
    ///
    /// Returns `false` when no such region exists.
    pub fn replace_region(&mut self, name: &str, content: ViewNode) -> bool {
        let Self::Element(el) = self else {
            return false;
        };
        if el.get_attr(REGION_ATTR) == Some(name) {
            el.children = vec![content];
            return true;
        }
        match el.children.iter_mut().find(|c| c.region(name).is_some()) {
            Some(child) => child.replace_region(name, content),
            None => false,
        }
    }

    /// Concatenated text of this subtree, trusted markup excluded.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(t) => out.push_str(t),
            Self::Element(el) => el.children.iter().for_each(|c| c.collect_text(out)),
            Self::Trusted(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_accumulate_without_duplicates() {
        let el = Element::new(Tag::Div)
            .class("modal")
            .class("is-open")
            .class("modal");
        assert_eq!(el.get_attr("class"), Some("modal is-open"));
        assert!(el.has_class("is-open"));
        assert!(!el.has_class("open"));
    }

    #[test]
    fn attr_replaces_previous_value() {
        let el = Element::new(Tag::Input)
            .attr("type", "text")
            .attr("type", "email");
        assert_eq!(el.get_attr("type"), Some("email"));
        assert_eq!(el.attrs().count(), 1);
    }

    #[test]
    fn flag_if_respects_condition() {
        let on = Element::new(Tag::Input).flag_if("required", true);
        let off = Element::new(Tag::Input).flag_if("required", false);
        assert!(on.has_attr("required"));
        assert!(!off.has_attr("required"));
    }

    #[test]
    fn find_walks_in_document_order() {
        let view: ViewNode = Element::new(Tag::Div)
            .child(Element::new(Tag::P).attr("id", "first"))
            .child(Element::new(Tag::Div).child(Element::new(Tag::P).attr("id", "second")))
            .into();
        let p = view.find(|el| el.tag() == Tag::P).map(|el| el.get_attr("id"));
        assert_eq!(p, Some(Some("first")));
    }

    #[test]
    fn replace_region_swaps_children() {
        let mut view: ViewNode = Element::new(Tag::Div)
            .child(
                Element::new(Tag::Ul)
                    .region("files")
                    .child(Element::new(Tag::Li).text("old")),
            )
            .into();
        assert!(view.replace_region("files", ViewNode::text("new")));
        let region = view.region("files").map(|r| r.child_nodes().to_vec());
        assert_eq!(region, Some(vec![ViewNode::text("new")]));
    }

    #[test]
    fn replace_missing_region_is_false() {
        let mut view: ViewNode = Element::new(Tag::Div).into();
        assert!(!view.replace_region("nope", ViewNode::text("x")));
    }

    #[test]
    fn text_content_skips_trusted_markup() {
        let view: ViewNode = Element::new(Tag::Div)
            .text("Hello ")
            .child(Element::new(Tag::Strong).text("world"))
            .child(TrustedMarkup::from_endpoint("<b>raw</b>"))
            .into();
        assert_eq!(view.text_content(), "Hello world");
    }
}
