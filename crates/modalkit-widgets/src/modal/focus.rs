#![forbid(unsafe_code)]

//! Focus manager: keyboard containment for stacked dialogs.
//!
//! One trap per open dialog, kept in stack order. Only the top trap
//! intercepts Tab; traps below it are dormant but keep the element that
//! was focused inside them when they were covered.
//!
//! # Restoration policy
//!
//! - The page element focused before the *first* dialog opened is recorded
//!   once ([`record_origin`](FocusManager::record_origin)) and restored
//!   when the last trap is released.
//! - Releasing the top trap while others remain resumes the new top trap:
//!   focus returns to the element that was focused inside it when it was
//!   covered, or its first focusable if that element is gone.
//!
//! # Invariants
//!
//! 1. At most one trap is active: the last one pushed.
//! 2. Pushing a trap deactivates the previous one atomically; the origin
//!    recorded for the page is untouched.
//! 3. A Tab handled by an active trap always leaves focus on one of that
//!    trap's focusables (or unchanged, when it has none).
//!
//! # Failure Modes
//!
//! - A dialog without focusable descendants is still trapped: Tab is
//!   swallowed and focus does not move.
//! - Releasing an unknown dialog is a no-op.

use modalkit_core::ElementId;
use modalkit_view::FocusRole;
use tracing::trace;

use crate::modal::host::{Focusable, PageHost, RootHandle};
use crate::modal::request::DialogId;

/// Where initial focus goes when a trap is (re)armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitialFocus {
    /// First focusable descendant.
    #[default]
    First,
    /// First text-entry control, falling back to the first focusable.
    FirstInput,
}

/// Who receives focus when a trap is released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restore {
    /// The page element recorded before the first dialog opened.
    Origin,
    /// Resume the trap that becomes topmost.
    ResumeTop,
    /// Leave focus alone; another release follows.
    Nothing,
}

/// Result of a Tab press routed to the focus manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabOutcome {
    /// No dialog is trapping focus; the page handles the key.
    NotTrapped,
    /// Focus moved to `to`; `wrapped` is set when it crossed an edge.
    Moved { to: ElementId, wrapped: bool },
    /// The active dialog has nothing focusable; the key was swallowed.
    Swallowed,
}

#[derive(Debug, Clone)]
struct Trap {
    dialog: DialogId,
    root: RootHandle,
    focusables: Vec<Focusable>,
    last_inside: Option<ElementId>,
}

impl Trap {
    fn position(&self, element: Option<ElementId>) -> Option<usize> {
        let element = element?;
        self.focusables.iter().position(|f| f.element == element)
    }

    fn initial(&self, initial: InitialFocus) -> Option<ElementId> {
        let first_input = match initial {
            InitialFocus::FirstInput => self
                .focusables
                .iter()
                .find(|f| f.role == FocusRole::Input),
            InitialFocus::First => None,
        };
        first_input.or(self.focusables.first()).map(|f| f.element)
    }

    fn bounds(&self) -> Option<(ElementId, ElementId)> {
        Some((self.focusables.first()?.element, self.focusables.last()?.element))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FocusManager {
    origin: Option<ElementId>,
    traps: Vec<Trap>,
}

impl FocusManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the page's focused element, once per stack lifetime.
    pub fn record_origin(&mut self, host: &dyn PageHost) {
        if self.traps.is_empty() && self.origin.is_none() {
            self.origin = host.active_element();
            trace!(origin = ?self.origin, "focus origin recorded");
        }
    }

    pub fn origin(&self) -> Option<ElementId> {
        self.origin
    }

    /// Activate a trap for `dialog` and move focus into it.
    ///
    /// Returns the new `(first, last)` bounds, or `None` when the dialog
    /// has nothing focusable.
    pub fn trap(
        &mut self,
        host: &mut dyn PageHost,
        dialog: &DialogId,
        root: RootHandle,
        initial: InitialFocus,
    ) -> Option<(ElementId, ElementId)> {
        let active = host.active_element();
        if let Some(top) = self.traps.last_mut()
            && top.position(active).is_some()
        {
            top.last_inside = active;
        }
        let trap = Trap {
            dialog: dialog.clone(),
            root,
            focusables: host.focusables(root),
            last_inside: None,
        };
        if let Some(target) = trap.initial(initial) {
            host.focus(target);
        }
        let bounds = trap.bounds();
        trace!(dialog = %dialog, depth = self.traps.len() + 1, "focus trap armed");
        self.traps.push(trap);
        bounds
    }

    /// Recompute `dialog`'s focusables after its content changed.
    ///
    /// When the dialog is the active one and `initial` is given, focus is
    /// moved to the initial target.
    pub fn refresh(
        &mut self,
        host: &mut dyn PageHost,
        dialog: &DialogId,
        initial: Option<InitialFocus>,
    ) -> Option<(ElementId, ElementId)> {
        let is_top = self.active_dialog() == Some(dialog);
        let trap = self.traps.iter_mut().find(|t| &t.dialog == dialog)?;
        trap.focusables = host.focusables(trap.root);
        if trap.position(trap.last_inside).is_none() {
            trap.last_inside = None;
        }
        if is_top
            && let Some(initial) = initial
            && let Some(target) = trap.initial(initial)
        {
            host.focus(target);
        }
        trap.bounds()
    }

    pub fn bounds(&self, dialog: &DialogId) -> Option<(ElementId, ElementId)> {
        self.traps
            .iter()
            .find(|t| &t.dialog == dialog)
            .and_then(Trap::bounds)
    }

    pub fn active_dialog(&self) -> Option<&DialogId> {
        self.traps.last().map(|t| &t.dialog)
    }

    pub fn is_trapped(&self) -> bool {
        !self.traps.is_empty()
    }

    /// Move focus one step within the active trap, wrapping at the edges.
    ///
    /// Focus that is outside the dialog re-enters at the first element
    /// (or the last, for Shift+Tab).
    pub fn handle_tab(&mut self, host: &mut dyn PageHost, backwards: bool) -> TabOutcome {
        let Some(trap) = self.traps.last() else {
            return TabOutcome::NotTrapped;
        };
        let len = trap.focusables.len();
        if len == 0 {
            return TabOutcome::Swallowed;
        }
        let (next, wrapped) = match (trap.position(host.active_element()), backwards) {
            (None, false) => (0, false),
            (None, true) => (len - 1, false),
            (Some(i), false) if i + 1 == len => (0, true),
            (Some(i), false) => (i + 1, false),
            (Some(0), true) => (len - 1, true),
            (Some(i), true) => (i - 1, false),
        };
        let to = trap.focusables[next].element;
        host.focus(to);
        trace!(dialog = %trap.dialog, index = next, wrapped, "tab");
        TabOutcome::Moved { to, wrapped }
    }

    /// Drop `dialog`'s trap and hand focus to `restore`.
    pub fn release(&mut self, host: &mut dyn PageHost, dialog: &DialogId, restore: Restore) {
        let Some(index) = self.traps.iter().position(|t| &t.dialog == dialog) else {
            return;
        };
        self.traps.remove(index);
        match restore {
            Restore::Nothing => {}
            Restore::Origin => {
                if let Some(origin) = self.origin.take() {
                    host.focus(origin);
                }
            }
            Restore::ResumeTop => {
                let Some(top) = self.traps.last_mut() else {
                    if let Some(origin) = self.origin.take() {
                        host.focus(origin);
                    }
                    return;
                };
                top.focusables = host.focusables(top.root);
                let target = top
                    .position(top.last_inside)
                    .map(|i| top.focusables[i].element)
                    .or_else(|| top.focusables.first().map(|f| f.element));
                if let Some(target) = target {
                    host.focus(target);
                }
                trace!(dialog = %top.dialog, "focus trap resumed");
            }
        }
        if self.traps.is_empty() {
            self.origin = None;
        }
    }
}
