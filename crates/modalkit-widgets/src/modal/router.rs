#![forbid(unsafe_code)]

//! Input/gesture router: host events in, stack operations out.
//!
//! [`InputRouter`] holds the page's trigger bindings and turns every host
//! [`Event`] into at most one [`DialogManager`] call, reporting back what
//! the host should do with the original platform event.
//!
//! | Event | With a dialog open | Otherwise |
//! |-------|--------------------|-----------|
//! | Escape | close top if `closable`; consumed | ignored |
//! | Tab / Shift+Tab | focus trap step; consumed, default prevented | ignored |
//! | Backdrop pointer-down | close top if `closable`; consumed | ignored |
//! | Pointer-down in content | consumed; opens a nested dialog if on a trigger | n/a |
//! | Control (`data-modal-action`) | [`DialogManager::activate`] | n/a |
//! | Pointer-down on a bound page trigger | opens its dialog | opens its dialog |
//! | Files (picker or drop) | staged on the top dialog | ignored |
//! | Form submit | validated and published | ignored |
//!
//! State conflicts (double clicks, Escape during a fade) are absorbed here
//! with a debug log and never reach the host.

use ahash::AHashMap;
use modalkit_core::{
    ElementId, Event, FileCandidate, FileSource, FormSubmission, KeyCode, PointerTarget,
};
use std::fmt;
use tracing::{debug, trace};

use crate::modal::error::{DialogError, StateConflict, TriggerError, ValidationError};
use crate::modal::focus::TabOutcome;
use crate::modal::host::PageHost;
use crate::modal::request::{
    AjaxSpec, AlertSpec, DialogId, DialogKind, DialogRequest, FormSpec, IframeSpec,
    ImageSpec, VideoSource, VideoSpec,
};
use crate::modal::stack::{ActionOutcome, DialogManager, PendingLoad};
use crate::modal::upload::{FileChip, REMOVE_FILE_ACTION};

/// Trigger attribute names.
pub mod attrs {
    pub const ID: &str = "data-modal";
    pub const TYPE: &str = "data-modal-type";
    pub const URL: &str = "data-modal-url";
    pub const SRC: &str = "data-modal-src";
    pub const TITLE: &str = "data-modal-title";
    pub const MESSAGE: &str = "data-modal-message";
    pub const CLOSABLE: &str = "data-modal-closable";
    pub const METHOD: &str = "data-modal-method";
}

/// A dialog control's action, parsed from its `data-modal-action` token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogAction {
    Close,
    Dismiss,
    Confirm,
    Cancel,
    Retry,
    Submit,
    RemoveFile(usize),
}

impl DialogAction {
    pub fn parse(token: &str) -> Option<Self> {
        let action = match token {
            "close" => Self::Close,
            "dismiss" => Self::Dismiss,
            "confirm" => Self::Confirm,
            "cancel" => Self::Cancel,
            "retry" => Self::Retry,
            "submit" => Self::Submit,
            other => {
                let (name, index) = other.split_once(':')?;
                if name != REMOVE_FILE_ACTION {
                    return None;
                }
                Self::RemoveFile(index.parse().ok()?)
            }
        };
        Some(action)
    }
}

impl fmt::Display for DialogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Close => f.write_str("close"),
            Self::Dismiss => f.write_str("dismiss"),
            Self::Confirm => f.write_str("confirm"),
            Self::Cancel => f.write_str("cancel"),
            Self::Retry => f.write_str("retry"),
            Self::Submit => f.write_str("submit"),
            Self::RemoveFile(index) => write!(f, "{REMOVE_FILE_ACTION}:{index}"),
        }
    }
}

/// What the host should do with the platform event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Let it continue to page handlers.
    Ignored,
    /// Stop propagation; also suppress the default action when asked.
    Consumed { prevent_default: bool },
}

/// User feedback produced while routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    FileStaged(FileChip),
    FileRejected(ValidationError),
    Invalid(ValidationError),
}

#[derive(Debug)]
pub struct RouteResult {
    pub disposition: Disposition,
    /// A load the host must drive to completion.
    pub pending: Option<PendingLoad>,
    pub feedback: Vec<Feedback>,
}

impl RouteResult {
    pub fn ignored() -> Self {
        Self {
            disposition: Disposition::Ignored,
            pending: None,
            feedback: Vec::new(),
        }
    }

    pub fn consumed(prevent_default: bool) -> Self {
        Self {
            disposition: Disposition::Consumed { prevent_default },
            ..Self::ignored()
        }
    }

    #[must_use]
    fn with_pending(mut self, pending: Option<PendingLoad>) -> Self {
        self.pending = pending;
        self
    }

    #[must_use]
    fn with_feedback(mut self, feedback: Vec<Feedback>) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn is_consumed(&self) -> bool {
        matches!(self.disposition, Disposition::Consumed { .. })
    }

    pub fn prevent_default(&self) -> bool {
        matches!(
            self.disposition,
            Disposition::Consumed {
                prevent_default: true
            }
        )
    }
}

/// Trigger bindings plus event dispatch.
#[derive(Debug, Default)]
pub struct InputRouter {
    triggers: AHashMap<ElementId, DialogRequest>,
    forms: AHashMap<DialogId, FormSpec>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `form` available to triggers declaring `data-modal="<id>"`.
    pub fn register_form(&mut self, id: impl Into<DialogId>, form: FormSpec) {
        self.forms.insert(id.into(), form);
    }

    /// Bind a trigger element from its `data-modal-*` attributes.
    ///
    /// Attributes are parsed here, once; a later pointer-down only looks up
    /// the prepared request.
    ///
    /// # Errors
    ///
    /// Returns [`TriggerError`] when the attributes do not describe a
    /// dialog. The element stays unbound.
    pub fn bind(
        &mut self,
        element: ElementId,
        attributes: &[(&str, &str)],
    ) -> Result<&DialogRequest, TriggerError> {
        let request = self.parse_trigger(attributes)?;
        trace!(element = %element, dialog = %request.id, kind = %request.kind(), "trigger bound");
        Ok(self.bind_request(element, request))
    }

    /// Bind a trigger to a ready-made request (e.g. a confirm with a callback).
    pub fn bind_request(&mut self, element: ElementId, request: DialogRequest) -> &DialogRequest {
        let slot = self.triggers.entry(element).insert_entry(request);
        slot.into_mut()
    }

    pub fn unbind(&mut self, element: ElementId) -> Option<DialogRequest> {
        self.triggers.remove(&element)
    }

    pub fn trigger(&self, element: ElementId) -> Option<&DialogRequest> {
        self.triggers.get(&element)
    }

    pub fn trigger_count(&self) -> usize {
        self.triggers.len()
    }

    fn parse_trigger(&self, attributes: &[(&str, &str)]) -> Result<DialogRequest, TriggerError> {
        let get = |name: &str| {
            attributes
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.trim())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &'static str| get(name).ok_or(TriggerError::MissingAttribute(name));

        let id = DialogId::new(require(attrs::ID)?);
        let kind = match get(attrs::TYPE) {
            Some(value) => {
                DialogKind::parse(value).ok_or_else(|| TriggerError::UnknownKind(value.to_owned()))?
            }
            None if get(attrs::URL).is_some() => DialogKind::Ajax,
            None if self.forms.contains_key(&id) => DialogKind::Form,
            None => return Err(TriggerError::MissingAttribute(attrs::TYPE)),
        };
        let title = get(attrs::TITLE);

        let request = match kind {
            DialogKind::Form => {
                let form = self
                    .forms
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| TriggerError::UnknownForm(id.clone()))?;
                DialogRequest::form(id, form)
            }
            DialogKind::Ajax => {
                let url = require(attrs::URL)?;
                let spec = match get(attrs::METHOD).map(str::to_ascii_uppercase).as_deref() {
                    None | Some("GET") => AjaxSpec::get(url),
                    Some("POST") => AjaxSpec::post(url),
                    Some(other) => {
                        return Err(TriggerError::InvalidValue {
                            attr: attrs::METHOD,
                            value: other.to_owned(),
                        });
                    }
                };
                DialogRequest::ajax(id, spec)
            }
            DialogKind::Image => {
                let src = require(attrs::SRC)?;
                DialogRequest::image(id, ImageSpec::new(src, title.unwrap_or_default()))
            }
            DialogKind::Video => {
                let src = require(attrs::SRC)?;
                DialogRequest::video(id, VideoSpec::new(VideoSource::detect(src)))
            }
            DialogKind::Iframe => {
                let src = require(attrs::SRC)?;
                DialogRequest::iframe(id, IframeSpec::new(src, title.unwrap_or_default()))
            }
            DialogKind::Alert => {
                let message = require(attrs::MESSAGE)?;
                DialogRequest::alert(id, AlertSpec::new(message))
            }
            DialogKind::Confirm => return Err(TriggerError::Unsupported(DialogKind::Confirm)),
        };

        let request = match title {
            Some(title) => request.title(title),
            None => request,
        };
        match get(attrs::CLOSABLE) {
            None | Some("true") => Ok(request),
            Some("false") => Ok(request.closable(false)),
            Some(other) => Err(TriggerError::InvalidValue {
                attr: attrs::CLOSABLE,
                value: other.to_owned(),
            }),
        }
    }

    /// Dispatch one host event.
    pub fn route(
        &self,
        manager: &mut DialogManager,
        host: &mut dyn PageHost,
        event: &Event,
    ) -> RouteResult {
        match event {
            Event::Key(key) => match key.code {
                KeyCode::Escape => self.dismiss_top(manager, host, "escape"),
                KeyCode::Tab => match manager.handle_tab(host, key.shift()) {
                    TabOutcome::NotTrapped => RouteResult::ignored(),
                    TabOutcome::Moved { .. } | TabOutcome::Swallowed => RouteResult::consumed(true),
                },
                KeyCode::Enter | KeyCode::Char(_) | KeyCode::Other => RouteResult::ignored(),
            },
            Event::Pointer(pointer) => match &pointer.target {
                PointerTarget::Backdrop => {
                    self.dismiss_top(manager, host, "backdrop")
                }
                PointerTarget::Content { element } => {
                    let nested = element.and_then(|el| self.triggers.get(&el));
                    match nested {
                        Some(request) => self.open(manager, host, request),
                        None => RouteResult::consumed(false),
                    }
                }
                PointerTarget::Control { action } => {
                    self.activate(manager, host, action)
                }
                PointerTarget::Page(element) => match self.triggers.get(element) {
                    Some(request) => self.open(manager, host, request),
                    None => RouteResult::ignored(),
                },
            },
            Event::Files { files, source } => self.stage(manager, host, files, *source),
            Event::Submit(submission) => self.submit(manager, host, submission),
        }
    }

    fn dismiss_top(
        &self,
        manager: &mut DialogManager,
        host: &mut dyn PageHost,
        via: &'static str,
    ) -> RouteResult {
        let Some(top) = manager.top() else {
            return RouteResult::ignored();
        };
        if top.closable() {
            absorb(manager.close(host, None));
        } else {
            trace!(dialog = %top.id(), via, "dismiss ignored: dialog not closable");
        }
        RouteResult::consumed(false)
    }

    fn open(
        &self,
        manager: &mut DialogManager,
        host: &mut dyn PageHost,
        request: &DialogRequest,
    ) -> RouteResult {
        trace!(dialog = %request.id, "trigger activated");
        let pending = absorb(manager.open(host, request.clone())).and_then(|o| o.into_pending());
        RouteResult::consumed(true).with_pending(pending)
    }

    fn activate(
        &self,
        manager: &mut DialogManager,
        host: &mut dyn PageHost,
        token: &str,
    ) -> RouteResult {
        let Some(action) = DialogAction::parse(token) else {
            debug!(token, "unknown dialog action");
            return RouteResult::consumed(false);
        };
        match absorb(manager.activate(host, action)) {
            Some(ActionOutcome::Retried(outcome)) => {
                RouteResult::consumed(true).with_pending(outcome.into_pending())
            }
            // The host's native submit follows and arrives as Event::Submit.
            Some(ActionOutcome::Deferred) => RouteResult::consumed(false),
            Some(_) | None => RouteResult::consumed(true),
        }
    }

    fn stage(
        &self,
        manager: &mut DialogManager,
        host: &mut dyn PageHost,
        files: &[FileCandidate],
        source: FileSource,
    ) -> RouteResult {
        if manager.is_empty() {
            return RouteResult::ignored();
        }
        let Some(results) = absorb(manager.stage_files(host, files.to_vec())) else {
            return RouteResult::consumed(source == FileSource::Drop);
        };
        trace!(count = results.len(), source = ?source, "files routed");
        let feedback = results
            .into_iter()
            .map(|r| match r {
                Ok(chip) => Feedback::FileStaged(chip),
                Err(err) => Feedback::FileRejected(err),
            })
            .collect();
        RouteResult::consumed(source == FileSource::Drop).with_feedback(feedback)
    }

    fn submit(
        &self,
        manager: &mut DialogManager,
        host: &mut dyn PageHost,
        submission: &FormSubmission,
    ) -> RouteResult {
        if manager.is_empty() {
            return RouteResult::ignored();
        }
        match manager.submit(host, submission) {
            Ok(_) => RouteResult::consumed(true),
            Err(DialogError::Validation(err)) => {
                RouteResult::consumed(true).with_feedback(vec![Feedback::Invalid(err)])
            }
            // A form inside loaded markup that the manager does not own.
            Err(DialogError::Conflict(StateConflict::NotApplicable(id))) => {
                trace!(dialog = %id, "submit left to the page");
                RouteResult::ignored()
            }
            Err(err) => {
                debug!(reason = %err, "submit absorbed");
                RouteResult::consumed(true)
            }
        }
    }
}

fn absorb<T>(result: Result<T, StateConflict>) -> Option<T> {
    result
        .map_err(|conflict| debug!(reason = %conflict, "state conflict absorbed"))
        .ok()
}
