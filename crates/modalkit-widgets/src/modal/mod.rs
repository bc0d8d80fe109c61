#![forbid(unsafe_code)]

//! Stacked dialogs: open/close protocol, content loading, focus trapping,
//! input routing and upload staging.
//!
//! # Pieces
//!
//! - [`DialogManager`] owns the stack and is the only thing that touches the
//!   shared backdrop and the page scroll lock.
//! - [`ContentLoader`] turns a [`DialogRequest`] into content, synchronously
//!   for local kinds and through an [`HttpTransport`] / [`ImageDecoder`] for
//!   remote ones.
//! - [`FocusManager`] keeps one active Tab trap and the restoration chain.
//! - [`InputRouter`] maps host [`Event`](modalkit_core::Event)s to manager
//!   calls and holds trigger bindings.
//! - [`ResourceUploader`] validates and stages attachments per dialog.
//!
//! All page side effects go through [`PageHost`], so the whole subsystem runs
//! headless in tests.
//!
//! # Example
//!
//! ```ignore
//! use modalkit_widgets::modal::{DialogManager, InputRouter, ManagerConfig};
//!
//! let mut manager = DialogManager::new(ManagerConfig::default());
//! let mut router = InputRouter::new();
//! router.bind(trigger, &[("data-modal", "job-7"), ("data-modal-url", "/jobs/7")])?;
//!
//! // From the host's event listener:
//! let routed = router.route(&mut manager, &mut page, &event);
//! if routed.prevent_default() {
//!     event.prevent_default();
//! }
//! ```

mod config;
mod error;
mod focus;
mod host;
mod loader;
mod notify;
pub mod render;
mod request;
mod router;
mod stack;
#[cfg(test)]
mod testkit;
mod upload;

pub use config::{
    ConfigError, DEFAULT_AJAX_TIMEOUT, DEFAULT_MAX_FILE_SIZE, DEFAULT_TRANSITION, ManagerConfig,
    Messages, UploadPolicy,
};
pub use error::{DialogError, LoadError, StateConflict, TriggerError, ValidationError};
pub use focus::{FocusManager, InitialFocus, Restore, TabOutcome};
pub use host::{Focusable, PageHost, RootHandle};
pub use loader::{
    AjaxRequest, ContentLoader, HttpResponse, HttpTransport, ImageDecoder, LoadFuture,
    unwrap_wp_envelope,
};
pub use notify::{DialogNotification, Notifier, SubmissionPayload, Subscription};
pub use render::{ContentResult, ImageInfo};
pub use request::{
    AjaxSpec, AlertSpec, Callback, ConfirmSpec, DialogContent, DialogId, DialogKind,
    DialogRequest, Envelope, FieldKind, FormField, FormSpec, HttpMethod, IframeSpec, ImageSpec,
    VideoSource, VideoSpec,
};
pub use router::{DialogAction, Disposition, Feedback, InputRouter, RouteResult, attrs};
pub use stack::{
    ActionOutcome, ApplyOutcome, ContentState, DialogInstance, DialogManager, LoadCompletion,
    LoadTicket, OpenOutcome, PendingLoad, Submitted,
};
pub use upload::{FileChip, REMOVE_FILE_ACTION, ResourceUploader, UploadedFile, human_size};
