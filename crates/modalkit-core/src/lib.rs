#![forbid(unsafe_code)]

//! Core input and host primitives for modalkit.
//!
//! This crate holds the pieces every other layer agrees on:
//!
//! - [`event`]: keyboard, pointer, file and form-submit events as the host
//!   page reports them.
//! - [`element`]: opaque handles for host UI nodes and the page scroll offset.
//! - [`logging`]: JSON log initialisation (feature `tracing-json`).

pub mod element;
pub mod event;
#[cfg(feature = "tracing-json")]
pub mod logging;

pub use element::{ElementId, ScrollOffset};
pub use event::{
    Event, FileCandidate, FileSource, FormSubmission, KeyCode, KeyEvent, Modifiers, PointerEvent,
    PointerTarget,
};

/// Monotonic instant used for transition and timeout bookkeeping.
///
/// Re-exported from `web-time` so the same type works natively and on
/// `wasm32-unknown-unknown`.
pub use web_time::Instant;
