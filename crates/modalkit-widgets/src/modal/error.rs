#![forbid(unsafe_code)]

//! Error taxonomy for the dialog subsystem.
//!
//! | Error | Cause | Recovery |
//! |-------|-------|----------|
//! | [`LoadError`] | network, timeout, decode, envelope | Fallback alert with Retry / Dismiss |
//! | [`ValidationError`] | file size/type, form field | Inline message; dialog stays open |
//! | [`StateConflict`] | double open, close while animating, unknown id | Absorbed as a no-op |
//! | [`TriggerError`] | malformed `data-modal-*` markup | Reported at bind time |
//!
//! None of these is fatal to the page: after any error the stack is
//! consistent and the page stays interactive.

use core::fmt;
use std::time::Duration;

use crate::modal::request::{DialogId, DialogKind};
use crate::modal::upload::human_size;

/// Content could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// Endpoint answered with a non-2xx status.
    Status { status: u16 },
    /// No answer within the configured window.
    Timeout { after: Duration },
    /// The transport failed before a response arrived.
    Transport(String),
    /// An image failed to decode.
    Decode { src: String, reason: String },
    /// The JSON envelope was malformed or reported failure.
    Envelope(String),
    /// A host capability the kind needs was not provided.
    Unavailable(&'static str),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status { status } => write!(f, "endpoint returned HTTP {status}"),
            Self::Timeout { after } => {
                write!(f, "no response within {} ms", after.as_millis())
            }
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::Decode { src, reason } => write!(f, "failed to decode image {src}: {reason}"),
            Self::Envelope(msg) => write!(f, "invalid response envelope: {msg}"),
            Self::Unavailable(what) => write!(f, "{what} is not available"),
        }
    }
}

impl std::error::Error for LoadError {}

/// User input failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    TooLarge {
        name: String,
        size_bytes: u64,
        limit: u64,
    },
    UnsupportedType {
        name: String,
        extension: Option<String>,
    },
    MissingField {
        field: String,
        label: String,
    },
    InvalidEmail {
        field: String,
        label: String,
    },
}

impl ValidationError {
    /// Form field the message belongs next to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingField { field, .. } | Self::InvalidEmail { field, .. } => Some(field),
            Self::TooLarge { .. } | Self::UnsupportedType { .. } => None,
        }
    }

    /// Human-readable message shown inline.
    pub fn message(&self) -> String {
        match self {
            Self::TooLarge { name, limit, .. } => {
                format!("{name} is too large. The maximum size is {}.", human_size(*limit))
            }
            Self::UnsupportedType { name, .. } => {
                format!("{name} is not a supported file type.")
            }
            Self::MissingField { label, .. } => format!("{label} is required."),
            Self::InvalidEmail { label, .. } => {
                format!("{label} must be a valid email address.")
            }
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLarge {
                name,
                size_bytes,
                limit,
            } => write!(f, "file '{name}' is {size_bytes} bytes, limit is {limit}"),
            Self::UnsupportedType { name, extension } => match extension {
                Some(ext) => write!(f, "file '{name}' has unsupported type '{ext}'"),
                None => write!(f, "file '{name}' has no recognizable type"),
            },
            Self::MissingField { field, .. } => write!(f, "required field '{field}' is empty"),
            Self::InvalidEmail { field, .. } => {
                write!(f, "field '{field}' is not a valid email address")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// A lifecycle call that does not apply to the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateConflict {
    /// An open/close transition is still running.
    Animating,
    /// A dialog with this id is already open.
    DuplicateId(DialogId),
    /// No open dialog has this id.
    UnknownId(DialogId),
    /// No dialog is open.
    EmptyStack,
    /// The dialog is not in a state that accepts this call.
    NotApplicable(DialogId),
}

impl fmt::Display for StateConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Animating => write!(f, "a dialog transition is in progress"),
            Self::DuplicateId(id) => write!(f, "dialog '{id}' is already open"),
            Self::UnknownId(id) => write!(f, "no open dialog '{id}'"),
            Self::EmptyStack => write!(f, "no dialog is open"),
            Self::NotApplicable(id) => write!(f, "operation does not apply to dialog '{id}'"),
        }
    }
}

impl std::error::Error for StateConflict {}

/// A trigger's `data-modal-*` attributes could not be turned into a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerError {
    MissingAttribute(&'static str),
    InvalidValue { attr: &'static str, value: String },
    UnknownKind(String),
    /// Form trigger whose form was never registered.
    UnknownForm(DialogId),
    /// Kind that cannot be declared in markup.
    Unsupported(DialogKind),
}

impl fmt::Display for TriggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAttribute(attr) => write!(f, "trigger is missing '{attr}'"),
            Self::InvalidValue { attr, value } => {
                write!(f, "trigger attribute '{attr}' has invalid value '{value}'")
            }
            Self::UnknownKind(kind) => write!(f, "unknown dialog type '{kind}'"),
            Self::UnknownForm(id) => write!(f, "no form registered for dialog '{id}'"),
            Self::Unsupported(kind) => {
                write!(f, "{kind} dialogs cannot be declared in markup")
            }
        }
    }
}

impl std::error::Error for TriggerError {}

/// Umbrella error for operations that can fail in more than one way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    Load(LoadError),
    Validation(ValidationError),
    Conflict(StateConflict),
}

impl fmt::Display for DialogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load(e) => write!(f, "load failed: {e}"),
            Self::Validation(e) => write!(f, "validation failed: {e}"),
            Self::Conflict(e) => write!(f, "state conflict: {e}"),
        }
    }
}

impl std::error::Error for DialogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Load(e) => Some(e),
            Self::Validation(e) => Some(e),
            Self::Conflict(e) => Some(e),
        }
    }
}

impl From<LoadError> for DialogError {
    fn from(e: LoadError) -> Self {
        Self::Load(e)
    }
}

impl From<ValidationError> for DialogError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<StateConflict> for DialogError {
    fn from(e: StateConflict) -> Self {
        Self::Conflict(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_large_message_uses_human_size() {
        let err = ValidationError::TooLarge {
            name: "cv.pdf".into(),
            size_bytes: 10_485_761,
            limit: 10_485_760,
        };
        assert_eq!(
            err.message(),
            "cv.pdf is too large. The maximum size is 10 MB."
        );
        assert_eq!(err.field(), None);
    }

    #[test]
    fn missing_field_points_at_field() {
        let err = ValidationError::MissingField {
            field: "email".into(),
            label: "Email".into(),
        };
        assert_eq!(err.field(), Some("email"));
        assert_eq!(err.message(), "Email is required.");
    }

    #[test]
    fn umbrella_exposes_source() {
        use std::error::Error as _;
        let err = DialogError::from(StateConflict::EmptyStack);
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "state conflict: no dialog is open");
    }

    #[test]
    fn timeout_display_in_millis() {
        let err = LoadError::Timeout {
            after: Duration::from_secs(10),
        };
        assert_eq!(err.to_string(), "no response within 10000 ms");
    }
}
