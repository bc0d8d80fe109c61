#![forbid(unsafe_code)]

//! The page boundary.
//!
//! The dialog subsystem is sans-IO: it decides *what* should happen and
//! asks the host page to do it through [`PageHost`]. A browser embedding
//! implements the trait over real DOM nodes; tests use the fake page in
//! `modalkit-harness`.
//!
//! The host never calls back into the manager from inside a `PageHost`
//! method. Time only moves when the host says so: [`PageHost::now`] is read
//! by the manager, and the host calls
//! [`DialogManager::tick`](crate::modal::DialogManager::tick) when a timer
//! it scheduled fires.

use modalkit_core::{ElementId, Instant, ScrollOffset};
use modalkit_view::{FocusRole, ViewNode};

use crate::modal::request::DialogId;

/// Opaque handle to a dialog's root UI node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RootHandle(u64);

impl RootHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A focusable descendant reported by the host, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Focusable {
    pub element: ElementId,
    pub role: FocusRole,
}

impl Focusable {
    pub const fn new(element: ElementId, role: FocusRole) -> Self {
        Self { element, role }
    }
}

/// Side effects the dialog subsystem needs from the embedding page.
pub trait PageHost {
    /// Current time on the host clock.
    fn now(&self) -> Instant;

    /// Element that currently has keyboard focus.
    fn active_element(&self) -> Option<ElementId>;

    fn focus(&mut self, element: ElementId);

    fn scroll_offset(&self) -> ScrollOffset;

    fn set_scroll_offset(&mut self, offset: ScrollOffset);

    fn add_body_class(&mut self, class: &str);

    fn remove_body_class(&mut self, class: &str);

    /// Show or hide the single page-level backdrop.
    fn set_backdrop_visible(&mut self, visible: bool);

    /// A dialog node already present in the page markup, if any.
    fn existing_root(&mut self, dialog: &DialogId) -> Option<RootHandle>;

    /// Create a detached dialog node; it is destroyed on close.
    fn create_root(&mut self, dialog: &DialogId) -> RootHandle;

    /// Replace the dialog's whole content.
    fn render(&mut self, root: RootHandle, view: &ViewNode);

    /// Replace the children of one `data-modal-region` inside the dialog.
    fn patch_region(&mut self, root: RootHandle, region: &str, view: &ViewNode);

    /// Start a fade-in (`true`) or fade-out (`false`).
    fn set_visible(&mut self, root: RootHandle, visible: bool);

    /// Pause and detach any audio or video playing inside the dialog.
    fn stop_media(&mut self, root: RootHandle);

    /// Remove a node created by [`create_root`](Self::create_root).
    fn destroy(&mut self, root: RootHandle);

    /// Focusable descendants of `root` in document order.
    fn focusables(&self, root: RootHandle) -> Vec<Focusable>;
}
