#![forbid(unsafe_code)]

//! Typed view construction for modalkit dialogs.
//!
//! Dialog bodies are built as [`ViewNode`] trees with builder functions
//! instead of string templates. The host receives the tree and mounts it
//! however it likes; [`to_html`] is provided for hosts that want markup.
//!
//! # Example
//!
//! ```
//! use modalkit_view::{Element, Tag, ViewNode, to_html};
//!
//! let view: ViewNode = Element::new(Tag::P)
//!     .class("modal__message")
//!     .text("Salary < expectations?")
//!     .into();
//! assert_eq!(
//!     to_html(&view),
//!     r#"<p class="modal__message">Salary &lt; expectations?</p>"#
//! );
//! ```

pub mod focus;
pub mod html;
pub mod node;

pub use focus::{FocusRole, focus_role, focusable_elements};
pub use html::{escape_text, to_html};
pub use node::{ACTION_ATTR, Element, REGION_ATTR, Tag, TrustedMarkup, ViewNode};
