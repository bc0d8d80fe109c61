#![forbid(unsafe_code)]

//! Dialog widgets for modalkit.
//!
//! Everything lives under [`modal`]; the most used types are re-exported at
//! the crate root.

pub mod modal;

pub use modal::{
    DialogError, DialogId, DialogKind, DialogManager, DialogNotification, DialogRequest,
    InputRouter, ManagerConfig, OpenOutcome, PageHost, RouteResult,
};
