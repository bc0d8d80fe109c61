#![forbid(unsafe_code)]

//! Fire-and-forget lifecycle notifications for outside collaborators
//! (analytics, CRM widgets).
//!
//! # Architecture
//!
//! Listeners are stored as `Weak` callbacks; the caller keeps the strong
//! side inside a [`Subscription`] guard, so dropping the guard unsubscribes.
//! Dead entries are pruned lazily during delivery.
//!
//! # Invariants
//!
//! 1. Notifications raised during one manager operation are queued and
//!    delivered only after that operation has finished mutating state.
//! 2. Delivery is in raise order; each notification reaches listeners in
//!    registration order.
//! 3. A listener subscribed during delivery receives notifications from the
//!    next flush onwards.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::modal::request::{DialogId, DialogKind};

/// What a form submission carried.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmissionPayload {
    /// Submitted field values in document order.
    pub fields: Vec<(String, String)>,
    /// Names of the files staged on the dialog.
    pub files: Vec<String>,
}

impl SubmissionPayload {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogNotification {
    Opened { id: DialogId, kind: DialogKind },
    Closed { id: DialogId },
    FormSubmitted { id: DialogId, payload: SubmissionPayload },
    LoadFailed { id: DialogId, reason: String },
}

impl DialogNotification {
    pub fn id(&self) -> &DialogId {
        match self {
            Self::Opened { id, .. }
            | Self::Closed { id }
            | Self::FormSubmitted { id, .. }
            | Self::LoadFailed { id, .. } => id,
        }
    }
}

type Listener = dyn Fn(&DialogNotification);

/// RAII guard; the listener is removed when this is dropped.
#[must_use = "dropping the subscription unsubscribes immediately"]
pub struct Subscription {
    _listener: Rc<Listener>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Subscription(..)")
    }
}

#[derive(Default)]
pub struct Notifier {
    listeners: RefCell<Vec<Weak<Listener>>>,
    queue: RefCell<Vec<DialogNotification>>,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &self.listener_count())
            .field("queued", &self.queue.borrow().len())
            .finish()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn(&DialogNotification) + 'static) -> Subscription {
        let listener: Rc<Listener> = Rc::new(listener);
        self.listeners.borrow_mut().push(Rc::downgrade(&listener));
        Subscription {
            _listener: listener,
        }
    }

    /// Live listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|w| w.strong_count() > 0)
            .count()
    }

    pub(crate) fn raise(&self, notification: DialogNotification) {
        self.queue.borrow_mut().push(notification);
    }

    /// Deliver everything queued so far.
    pub(crate) fn flush(&self) {
        loop {
            let batch = std::mem::take(&mut *self.queue.borrow_mut());
            if batch.is_empty() {
                return;
            }
            let live: Vec<Rc<Listener>> = {
                let mut listeners = self.listeners.borrow_mut();
                listeners.retain(|w| w.strong_count() > 0);
                listeners.iter().filter_map(Weak::upgrade).collect()
            };
            for notification in &batch {
                for listener in &live {
                    listener(notification);
                }
            }
        }
    }
}
