#![forbid(unsafe_code)]

//! Input events as reported by the host page.
//!
//! The host translates platform events (DOM `keydown`, `pointerdown`,
//! `change`/`drop` on file inputs, `submit`) into these values before handing
//! them to the router. Hit-testing happens on the host side: a pointer event
//! already knows whether it landed on the backdrop, inside dialog content, on
//! a dialog control, or on some other page element.

use bitflags::bitflags;

use crate::element::ElementId;

bitflags! {
    /// Keyboard modifier state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// Key identity, reduced to the keys dialogs care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Escape,
    Tab,
    Enter,
    Char(char),
    /// Any other key; dialogs let it through untouched.
    Other,
}

impl KeyCode {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Self::Escape,
            "Tab" => Self::Tab,
            "Enter" => Self::Enter,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Other,
                }
            }
        }
    }
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key press without modifiers.
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// Builder-style modifier setter.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Whether Shift is held.
    #[inline]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// Where a pointer-down landed, as resolved by the host's hit test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    /// The shared dimmed overlay behind the top dialog.
    Backdrop,
    /// Inside the top dialog's content but not on a control. `element` is
    /// set when the hit node has a handle (a trigger for a nested dialog).
    Content { element: Option<ElementId> },
    /// A dialog control carrying a `data-modal-action` token.
    Control { action: String },
    /// A page element outside any dialog (possibly a bound trigger).
    Page(ElementId),
}

/// A primary-button pointer-down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerEvent {
    pub target: PointerTarget,
}

impl PointerEvent {
    pub fn new(target: PointerTarget) -> Self {
        Self { target }
    }
}

/// How files reached the dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileSource {
    /// `<input type="file">` change.
    Picker,
    /// Drag-and-drop onto the dialog's drop zone.
    Drop,
}

/// A file the user picked or dropped, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub name: String,
    pub size_bytes: u64,
    /// Browser-reported MIME type; empty strings are normalised to `None`.
    pub mime: Option<String>,
}

impl FileCandidate {
    pub fn new(name: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            mime: None,
        }
    }

    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        let mime = mime.into();
        self.mime = if mime.trim().is_empty() {
            None
        } else {
            Some(mime)
        };
        self
    }

    /// Lower-cased extension after the last dot, if any.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// Field values of a submitted dialog form, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormSubmission {
    pub fields: Vec<(String, String)>,
}

impl FormSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// First value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Any input event the router understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Key(KeyEvent),
    Pointer(PointerEvent),
    Files {
        files: Vec<FileCandidate>,
        source: FileSource,
    },
    Submit(FormSubmission),
}

impl Event {
    /// Convenience constructor for a bare key press.
    pub fn key(code: KeyCode) -> Self {
        Self::Key(KeyEvent::new(code))
    }

    /// Convenience constructor for a pointer-down.
    pub fn pointer(target: PointerTarget) -> Self {
        Self::Pointer(PointerEvent::new(target))
    }
}
