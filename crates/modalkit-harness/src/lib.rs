#![forbid(unsafe_code)]

//! Test harness for modalkit.
//!
//! - [`FakePage`]: headless [`PageHost`](modalkit_widgets::modal::PageHost)
//!   with a journal of every host call.
//! - [`StubTransport`] / [`StubDecoder`]: scripted network and image
//!   doubles, plus [`drive`] to finish a pending load.
//! - [`NotificationLog`] and [`capture_logs`] for asserting on what the
//!   manager announced and logged.
//! - [`assert_snapshot!`] for rendered dialog markup.
//! - [`strategies`] for property tests.

pub mod log;
pub mod page;
pub mod snapshot;
pub mod strategies;
pub mod transport;

pub use log::{CapturedEvent, LogCapture, NotificationLog, capture_logs};
pub use modalkit_view::to_html;
pub use page::{FakePage, HostCall};
pub use transport::{Held, StubDecoder, StubTransport, drive};
