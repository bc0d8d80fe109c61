#![forbid(unsafe_code)]

//! Stacked modal dialogs for web pages.
//!
//! modalkit keeps the dialog stack, keyboard focus, content loading and file
//! staging of a page in one [`DialogManager`]. The page itself stays behind
//! the [`PageHost`] trait, so the same manager drives a browser binding or a
//! headless test double.
//!
//! The member crates are re-exported as [`core`], [`view`] and [`widgets`];
//! [`prelude`] has what a page integration usually needs.
//!
//! # Example
//!
//! ```
//! use modalkit::prelude::*;
//!
//! let mut router = InputRouter::new();
//! let request = router
//!     .bind(
//!         ElementId::new(7),
//!         &[
//!             (attrs::ID, "terms"),
//!             (attrs::TYPE, "iframe"),
//!             (attrs::SRC, "/terms.html"),
//!             (attrs::TITLE, "Terms"),
//!         ],
//!     )
//!     .unwrap();
//! assert_eq!(request.kind(), DialogKind::Iframe);
//! assert_eq!(router.trigger_count(), 1);
//! ```

pub use modalkit_core as core;
pub use modalkit_view as view;
pub use modalkit_widgets as widgets;

pub use modalkit_core::{ElementId, Event, Instant, ScrollOffset};
pub use modalkit_view::{ViewNode, to_html};
pub use modalkit_widgets::modal::{
    DialogError, DialogId, DialogKind, DialogManager, DialogNotification, DialogRequest,
    InputRouter, ManagerConfig, OpenOutcome, PageHost, RouteResult,
};

#[cfg(feature = "tracing-json")]
pub use modalkit_core::logging::init_json;

/// Common imports for page integrations.
pub mod prelude {
    pub use modalkit_core::{
        ElementId, Event, FileCandidate, FileSource, FormSubmission, KeyCode, KeyEvent,
        Modifiers, PointerEvent, PointerTarget, ScrollOffset,
    };
    pub use modalkit_view::{ViewNode, to_html};
    pub use modalkit_widgets::modal::{
        AjaxSpec, AlertSpec, ApplyOutcome, ConfirmSpec, DialogError, DialogId, DialogKind,
        DialogManager, DialogNotification, DialogRequest, Disposition, Feedback, FieldKind,
        FormField, FormSpec, HttpTransport, IframeSpec, ImageDecoder, ImageSpec, InputRouter,
        ManagerConfig, OpenOutcome, PageHost, RootHandle, RouteResult, UploadPolicy, VideoSource,
        VideoSpec, attrs,
    };
}
