#![forbid(unsafe_code)]

//! Stack controller: the dialog stack and its open/close protocol.
//!
//! [`DialogManager`] owns every open [`DialogInstance`] in z-order (last is
//! topmost and the only one receiving input), and composes the content
//! loader, focus manager, uploader and notifier. It is constructed once per
//! page and handed to collaborators by reference.
//!
//! # Lifecycle
//!
//! ```text
//! open ──► Loading ──load ok──► Ready ──close──► (fading) ──tick──► destroyed
//!             │                   ▲
//!             └──load err/timeout─┴─► Failed ──retry──► Loading
//! ```
//!
//! # Invariants
//!
//! 1. At most one instance per [`DialogId`].
//! 2. The backdrop and the scroll-lock class are on exactly while the stack
//!    is non-empty. The scroll offset captured when the stack left empty is
//!    restored when it becomes empty again.
//! 3. `open` and `close` are rejected while a fade transition runs
//!    (`transition`, default 300 ms). `close_all` is not gated.
//! 4. A load result is applied only if its instance is still open, still
//!    loading, and carries the same load generation. Anything else is
//!    discarded.
//! 5. Notifications raised by an operation are delivered after that
//!    operation's state changes are complete.
//!
//! # Failure Modes
//!
//! | Call | Condition | Result |
//! |------|-----------|--------|
//! | `open` | transition running | `StateConflict::Animating` |
//! | `open` | id already open | `StateConflict::DuplicateId` |
//! | `close` | empty stack | `StateConflict::EmptyStack` |
//! | `close` | unknown id | `StateConflict::UnknownId` |
//! | `retry` | dialog not `Failed` | `StateConflict::NotApplicable` |
//! | `complete` | stale ticket | `ApplyOutcome::Discarded` |
//!
//! None of these leaves the stack inconsistent.
//!
//! # Example
//!
//! ```ignore
//! let mut manager = DialogManager::new(ManagerConfig::default());
//! let _sub = manager.notifications().subscribe(|n| log(n));
//!
//! match manager.open(&mut page, DialogRequest::form("cv", form))? {
//!     OpenOutcome::Pending(load) => spawn_local(async move {
//!         let done = load.resolve().await;
//!         with_manager(|m| m.complete(&mut page, done));
//!     }),
//!     _ => {}
//! }
//! ```

use std::rc::Rc;

use futures::FutureExt;
use modalkit_core::{ElementId, FileCandidate, FormSubmission, Instant, ScrollOffset};
use modalkit_view::ViewNode;
use tracing::{debug, trace, warn};

use crate::modal::config::ManagerConfig;
use crate::modal::error::{DialogError, LoadError, StateConflict, ValidationError};
use crate::modal::focus::{FocusManager, InitialFocus, Restore, TabOutcome};
use crate::modal::host::{PageHost, RootHandle};
use crate::modal::loader::{ContentLoader, HttpTransport, ImageDecoder, LoadFuture};
use crate::modal::notify::{DialogNotification, Notifier, SubmissionPayload};
use crate::modal::render::{self, Chrome, ContentResult};
use crate::modal::request::{DialogContent, DialogId, DialogKind, DialogRequest, FieldKind};
use crate::modal::router::DialogAction;
use crate::modal::upload::{FileChip, ResourceUploader, UploadedFile};

/// Where a dialog's content is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentState {
    Loading,
    Ready,
    Failed,
}

/// One open dialog.
#[derive(Debug, Clone)]
pub struct DialogInstance {
    request: Rc<DialogRequest>,
    state: ContentState,
    root: RootHandle,
    dynamic: bool,
    generation: u64,
    load_deadline: Option<Instant>,
    focus_bounds: Option<(ElementId, ElementId)>,
}

impl DialogInstance {
    #[inline]
    pub fn id(&self) -> &DialogId {
        &self.request.id
    }

    pub fn request(&self) -> &DialogRequest {
        &self.request
    }

    pub fn kind(&self) -> DialogKind {
        self.request.kind()
    }

    pub fn state(&self) -> ContentState {
        self.state
    }

    pub fn root(&self) -> RootHandle {
        self.root
    }

    /// Whether the root was created for this instance (and is destroyed on
    /// close) rather than found in the page.
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether Escape and backdrop clicks may dismiss the dialog.
    ///
    /// A dialog showing the load-failure alert is always dismissable,
    /// whatever the request asked for.
    pub fn closable(&self) -> bool {
        self.request.closable || self.state == ContentState::Failed
    }

    /// `(first, last)` focusable, recomputed whenever content changes.
    pub fn focus_bounds(&self) -> Option<(ElementId, ElementId)> {
        self.focus_bounds
    }

    fn initial_focus(&self) -> InitialFocus {
        match self.request.content {
            DialogContent::Form(_) => InitialFocus::FirstInput,
            _ => InitialFocus::First,
        }
    }

    fn chrome(&self, busy: bool) -> Chrome<'_> {
        Chrome {
            id: &self.request.id,
            role: self.kind().aria_role(),
            title: self.request.title.as_deref(),
            closable: self.closable(),
            busy,
        }
    }
}

/// Identifies one load attempt of one dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub dialog: DialogId,
    pub generation: u64,
}

/// A load that did not finish synchronously.
#[must_use = "the load must be awaited and handed to DialogManager::complete"]
pub struct PendingLoad {
    ticket: LoadTicket,
    future: LoadFuture,
}

impl std::fmt::Debug for PendingLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingLoad")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

impl PendingLoad {
    pub fn dialog_id(&self) -> &DialogId {
        &self.ticket.dialog
    }

    pub fn ticket(&self) -> &LoadTicket {
        &self.ticket
    }

    /// Wait for the content.
    pub async fn resolve(self) -> LoadCompletion {
        let result = self.future.await;
        LoadCompletion {
            ticket: self.ticket,
            result,
        }
    }
}

/// A finished load, to be passed to [`DialogManager::complete`].
#[derive(Debug)]
pub struct LoadCompletion {
    pub ticket: LoadTicket,
    pub result: Result<ContentResult, LoadError>,
}

/// What `open` and `retry` produced.
#[derive(Debug)]
pub enum OpenOutcome {
    /// Content was available immediately and is shown.
    Ready,
    /// Loading failed immediately; the failure alert is shown.
    Failed,
    /// Content is still loading.
    Pending(PendingLoad),
}

impl OpenOutcome {
    pub fn into_pending(self) -> Option<PendingLoad> {
        match self {
            Self::Pending(load) => Some(load),
            Self::Ready | Self::Failed => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied(ContentState),
    Discarded,
}

/// Result of a dialog control activation.
#[derive(Debug)]
pub enum ActionOutcome {
    Closed(DialogId),
    Retried(OpenOutcome),
    FileRemoved(UploadedFile),
    /// The control defers to a later event (a submit button waits for the
    /// form's submit event).
    Deferred,
    /// Nothing to do (e.g. removing a file index that no longer exists).
    Ignored,
}

/// Result of a valid form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submitted {
    pub dialog: DialogId,
    pub closed: bool,
}

#[derive(Debug, Clone, Copy)]
struct Fading {
    root: RootHandle,
    until: Instant,
}

/// Owns the dialog stack. See the [module docs](self).
#[derive(Debug)]
pub struct DialogManager {
    config: Rc<ManagerConfig>,
    loader: ContentLoader,
    focus: FocusManager,
    uploader: ResourceUploader,
    notifier: Notifier,
    stack: Vec<DialogInstance>,
    animating_until: Option<Instant>,
    fading: Vec<Fading>,
    saved_scroll: Option<ScrollOffset>,
    next_generation: u64,
}

impl Default for DialogManager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

impl DialogManager {
    pub fn new(config: ManagerConfig) -> Self {
        let config = Rc::new(config);
        Self {
            loader: ContentLoader::new(Rc::clone(&config)),
            uploader: ResourceUploader::new(config.upload.clone()),
            config,
            focus: FocusManager::new(),
            notifier: Notifier::new(),
            stack: Vec::new(),
            animating_until: None,
            fading: Vec::new(),
            saved_scroll: None,
            next_generation: 0,
        }
    }

    #[must_use]
    pub fn with_transport(mut self, transport: Rc<dyn HttpTransport>) -> Self {
        self.loader = self.loader.with_transport(transport);
        self
    }

    #[must_use]
    pub fn with_decoder(mut self, decoder: Rc<dyn ImageDecoder>) -> Self {
        self.loader = self.loader.with_decoder(decoder);
        self
    }

    // --- Queries ---

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn notifications(&self) -> &Notifier {
        &self.notifier
    }

    pub fn focus(&self) -> &FocusManager {
        &self.focus
    }

    pub fn uploader(&self) -> &ResourceUploader {
        &self.uploader
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn top(&self) -> Option<&DialogInstance> {
        self.stack.last()
    }

    pub fn top_id(&self) -> Option<&DialogId> {
        self.stack.last().map(DialogInstance::id)
    }

    pub fn contains(&self, id: &DialogId) -> bool {
        self.position(id).is_some()
    }

    pub fn instance(&self, id: &DialogId) -> Option<&DialogInstance> {
        self.stack.iter().find(|i| i.id() == id)
    }

    /// Open dialogs, bottom to top.
    pub fn instances(&self) -> impl Iterator<Item = &DialogInstance> {
        self.stack.iter()
    }

    pub fn is_animating(&self, now: Instant) -> bool {
        self.animating_until.is_some_and(|until| now < until)
    }

    /// Earliest instant at which [`tick`](Self::tick) has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        let loads = self.stack.iter().filter_map(|i| match i.state {
            ContentState::Loading => i.load_deadline,
            _ => None,
        });
        let fades = self.fading.iter().map(|f| f.until);
        self.animating_until.into_iter().chain(fades).chain(loads).min()
    }

    fn position(&self, id: &DialogId) -> Option<usize> {
        self.stack.iter().position(|i| i.id() == id)
    }

    // --- Lifecycle ---

    /// Open `request` on top of the stack.
    ///
    /// # Errors
    ///
    /// [`StateConflict::Animating`] while a transition runs and
    /// [`StateConflict::DuplicateId`] when the id is already open. Both
    /// leave everything untouched.
    pub fn open(
        &mut self,
        host: &mut dyn PageHost,
        request: DialogRequest,
    ) -> Result<OpenOutcome, StateConflict> {
        let now = host.now();
        if self.is_animating(now) {
            debug!(dialog = %request.id, "open ignored: transition running");
            return Err(StateConflict::Animating);
        }
        if self.contains(&request.id) {
            debug!(dialog = %request.id, "open ignored: already open");
            return Err(StateConflict::DuplicateId(request.id));
        }

        self.focus.record_origin(host);
        let (root, dynamic) = match host.existing_root(&request.id) {
            Some(root) => (root, false),
            None => (host.create_root(&request.id), true),
        };
        if self.stack.is_empty() {
            self.saved_scroll = Some(host.scroll_offset());
            host.add_body_class(&self.config.scroll_lock_class);
            host.set_backdrop_visible(true);
        }

        let request = Rc::new(request);
        let id = request.id.clone();
        let kind = request.kind();
        self.stack.push(DialogInstance {
            request,
            state: ContentState::Loading,
            root,
            dynamic,
            generation: 0,
            load_deadline: None,
            focus_bounds: None,
        });
        let index = self.stack.len() - 1;
        self.render_loading(host, index);
        host.set_visible(root, true);
        self.animating_until = Some(now + self.config.transition);
        self.stack[index].focus_bounds = self.focus.trap(host, &id, root, InitialFocus::First);

        debug!(dialog = %id, kind = %kind, depth = self.stack.len(), dynamic, "dialog opened");
        self.notifier.raise(DialogNotification::Opened { id, kind });
        let outcome = self.start_load(host, index);
        self.notifier.flush();
        Ok(outcome)
    }

    /// Apply a finished load.
    pub fn complete(&mut self, host: &mut dyn PageHost, completion: LoadCompletion) -> ApplyOutcome {
        let LoadCompletion { ticket, result } = completion;
        let index = self.stack.iter().position(|i| {
            i.id() == &ticket.dialog
                && i.generation == ticket.generation
                && i.state == ContentState::Loading
        });
        let Some(index) = index else {
            debug!(dialog = %ticket.dialog, generation = ticket.generation, "stale load discarded");
            return ApplyOutcome::Discarded;
        };
        let state = self.apply(host, index, result);
        self.notifier.flush();
        ApplyOutcome::Applied(state)
    }

    /// Close `id`, or the top dialog when `id` is `None`.
    ///
    /// # Errors
    ///
    /// [`StateConflict::EmptyStack`], [`StateConflict::Animating`] or
    /// [`StateConflict::UnknownId`]; the stack is unchanged.
    pub fn close(
        &mut self,
        host: &mut dyn PageHost,
        id: Option<&DialogId>,
    ) -> Result<DialogId, StateConflict> {
        if self.stack.is_empty() {
            trace!("close ignored: no dialog open");
            return Err(StateConflict::EmptyStack);
        }
        let now = host.now();
        if self.is_animating(now) {
            debug!("close ignored: transition running");
            return Err(StateConflict::Animating);
        }
        let index = match id {
            None => self.stack.len() - 1,
            Some(id) => self
                .position(id)
                .ok_or_else(|| StateConflict::UnknownId(id.clone()))?,
        };
        let restore = if self.stack.len() == 1 {
            Restore::Origin
        } else if index == self.stack.len() - 1 {
            Restore::ResumeTop
        } else {
            Restore::Nothing
        };
        let closed = self.remove(host, index, restore, now);
        self.animating_until = Some(now + self.config.transition);
        self.notifier.flush();
        Ok(closed)
    }

    /// Close every dialog, top first. Safe on an empty stack.
    ///
    /// Not gated by a running transition. Returns how many were closed.
    pub fn close_all(&mut self, host: &mut dyn PageHost) -> usize {
        let now = host.now();
        let mut closed = 0;
        while let Some(index) = self.stack.len().checked_sub(1) {
            let restore = if index == 0 {
                Restore::Origin
            } else {
                Restore::Nothing
            };
            self.remove(host, index, restore, now);
            closed += 1;
        }
        if closed > 0 {
            self.animating_until = Some(now + self.config.transition);
            debug!(closed, "all dialogs closed");
        }
        self.notifier.flush();
        closed
    }

    /// Re-run the loader for a dialog showing the failure alert.
    ///
    /// # Errors
    ///
    /// [`StateConflict::UnknownId`] or, when the dialog is not `Failed`,
    /// [`StateConflict::NotApplicable`].
    pub fn retry(
        &mut self,
        host: &mut dyn PageHost,
        id: &DialogId,
    ) -> Result<OpenOutcome, StateConflict> {
        let index = self
            .position(id)
            .ok_or_else(|| StateConflict::UnknownId(id.clone()))?;
        if self.stack[index].state != ContentState::Failed {
            return Err(StateConflict::NotApplicable(id.clone()));
        }
        debug!(dialog = %id, "retrying load");
        self.stack[index].state = ContentState::Loading;
        self.render_loading(host, index);
        self.stack[index].focus_bounds = self.focus.refresh(host, id, Some(InitialFocus::First));
        let outcome = self.start_load(host, index);
        self.notifier.flush();
        Ok(outcome)
    }

    /// Advance timers: end elapsed transitions, destroy faded-out roots and
    /// fail loads that ran past their deadline.
    pub fn tick(&mut self, host: &mut dyn PageHost) {
        let now = host.now();
        if self.animating_until.is_some_and(|until| now >= until) {
            self.animating_until = None;
        }
        self.fading.retain(|fade| {
            if now >= fade.until {
                host.destroy(fade.root);
                false
            } else {
                true
            }
        });
        let expired: Vec<usize> = self
            .stack
            .iter()
            .enumerate()
            .filter(|(_, i)| {
                i.state == ContentState::Loading && i.load_deadline.is_some_and(|d| now >= d)
            })
            .map(|(index, _)| index)
            .collect();
        for index in expired {
            let after = self.config.ajax_timeout;
            self.apply(host, index, Err(LoadError::Timeout { after }));
        }
        self.notifier.flush();
    }

    // --- Interaction ---

    /// Route Tab / Shift+Tab to the active focus trap.
    pub fn handle_tab(&mut self, host: &mut dyn PageHost, backwards: bool) -> TabOutcome {
        self.focus.handle_tab(host, backwards)
    }

    /// Run a dialog control's action against the top dialog.
    ///
    /// # Errors
    ///
    /// [`StateConflict::EmptyStack`] with no dialog open, and whatever the
    /// underlying `close` or `retry` reports.
    pub fn activate(
        &mut self,
        host: &mut dyn PageHost,
        action: DialogAction,
    ) -> Result<ActionOutcome, StateConflict> {
        let top = self.stack.last().ok_or(StateConflict::EmptyStack)?;
        let id = top.id().clone();
        trace!(dialog = %id, action = ?action, "control activated");
        match action {
            DialogAction::Close | DialogAction::Dismiss => {
                self.close(host, Some(&id)).map(ActionOutcome::Closed)
            }
            DialogAction::Cancel => {
                let on_cancel = match &top.request.content {
                    DialogContent::Confirm(spec) => spec.on_cancel.clone(),
                    _ => None,
                };
                let closed = self.close(host, Some(&id))?;
                if let Some(callback) = on_cancel {
                    callback.call();
                }
                Ok(ActionOutcome::Closed(closed))
            }
            DialogAction::Confirm => {
                let DialogContent::Confirm(spec) = &top.request.content else {
                    return Err(StateConflict::NotApplicable(id));
                };
                if top.state != ContentState::Ready {
                    return Err(StateConflict::NotApplicable(id));
                }
                if self.is_animating(host.now()) {
                    debug!(dialog = %id, "confirm ignored: transition running");
                    return Err(StateConflict::Animating);
                }
                let on_confirm = spec.on_confirm.clone();
                on_confirm.call();
                self.close(host, Some(&id)).map(ActionOutcome::Closed)
            }
            DialogAction::Retry => self.retry(host, &id).map(ActionOutcome::Retried),
            DialogAction::Submit => Ok(ActionOutcome::Deferred),
            DialogAction::RemoveFile(index) => match self.uploader.remove(&id, index) {
                Some(removed) => {
                    self.patch_files(host, &id, None);
                    debug!(dialog = %id, index, "staged file removed");
                    Ok(ActionOutcome::FileRemoved(removed))
                }
                None => Ok(ActionOutcome::Ignored),
            },
        }
    }

    /// Validate and stage files picked or dropped on the top dialog.
    ///
    /// Returns one result per candidate. The chip list and the feedback
    /// region are updated on the host.
    ///
    /// # Errors
    ///
    /// [`StateConflict::NotApplicable`] when the top dialog is not a loaded
    /// form with a file field.
    pub fn stage_files(
        &mut self,
        host: &mut dyn PageHost,
        files: Vec<FileCandidate>,
    ) -> Result<Vec<Result<FileChip, ValidationError>>, StateConflict> {
        let top = self.stack.last().ok_or(StateConflict::EmptyStack)?;
        let id = top.id().clone();
        let multiple = match &top.request.content {
            DialogContent::Form(form) if top.state == ContentState::Ready => form
                .fields
                .iter()
                .find_map(|f| match f.kind {
                    FieldKind::File { multiple } => Some(multiple),
                    _ => None,
                }),
            _ => None,
        };
        let Some(multiple) = multiple else {
            return Err(StateConflict::NotApplicable(id));
        };

        let mut results = Vec::with_capacity(files.len());
        for file in files {
            if !multiple && self.uploader.validate(&file).is_ok() {
                self.uploader.discard(&id);
            }
            results.push(self.uploader.stage(&id, file));
        }
        let rejection = results.iter().find_map(|r| r.as_ref().err());
        self.patch_files(host, &id, rejection);
        Ok(results)
    }

    /// Validate a form submission from the top dialog and publish it.
    ///
    /// # Errors
    ///
    /// - [`DialogError::Validation`] for the first invalid field; the
    ///   message is shown next to it and the dialog stays open.
    /// - [`DialogError::Conflict`] when the top dialog is not a loaded form,
    ///   or when closing after submit is blocked by a running transition.
    pub fn submit(
        &mut self,
        host: &mut dyn PageHost,
        submission: &FormSubmission,
    ) -> Result<Submitted, DialogError> {
        let top = self.stack.last().ok_or(StateConflict::EmptyStack)?;
        let id = top.id().clone();
        let root = top.root;
        let request = Rc::clone(&top.request);
        let DialogContent::Form(form) = &request.content else {
            return Err(StateConflict::NotApplicable(id).into());
        };
        if top.state != ContentState::Ready {
            return Err(StateConflict::NotApplicable(id).into());
        }

        for field in &form.fields {
            host.patch_region(
                root,
                &render::field_error_region(&field.name),
                &ViewNode::text(""),
            );
        }
        let staged = self.uploader.staged(&id);
        if let Err(err) = validate_submission(form, submission, staged) {
            warn!(dialog = %id, reason = %err, "form submission rejected");
            if let Some(field) = err.field() {
                host.patch_region(
                    root,
                    &render::field_error_region(field),
                    &render::feedback_view(&err.message()),
                );
            }
            return Err(err.into());
        }
        if form.close_on_submit && self.is_animating(host.now()) {
            return Err(StateConflict::Animating.into());
        }

        let payload = SubmissionPayload {
            fields: submission.fields.clone(),
            files: staged.iter().map(|f| f.name.clone()).collect(),
        };
        debug!(dialog = %id, fields = payload.fields.len(), files = payload.files.len(), "form submitted");
        self.notifier.raise(DialogNotification::FormSubmitted {
            id: id.clone(),
            payload,
        });
        let closed = form.close_on_submit;
        if closed {
            self.close(host, Some(&id))?;
        }
        self.notifier.flush();
        Ok(Submitted { dialog: id, closed })
    }

    // --- Internals ---

    fn render_loading(&mut self, host: &mut dyn PageHost, index: usize) {
        let inst = &self.stack[index];
        let view = render::dialog_shell(
            inst.chrome(true),
            render::loading_content(&self.config.messages),
            &self.config.messages,
        );
        host.render(inst.root, &view);
    }

    fn start_load(&mut self, host: &mut dyn PageHost, index: usize) -> OpenOutcome {
        self.next_generation += 1;
        let generation = self.next_generation;
        let inst = &mut self.stack[index];
        inst.generation = generation;
        inst.state = ContentState::Loading;
        inst.load_deadline = Some(host.now() + self.config.ajax_timeout);
        let ticket = LoadTicket {
            dialog: inst.id().clone(),
            generation,
        };

        let mut future = self.loader.load(&inst.request);
        match (&mut future).now_or_never() {
            Some(result) => match self.apply(host, index, result) {
                ContentState::Failed => OpenOutcome::Failed,
                _ => OpenOutcome::Ready,
            },
            None => {
                trace!(dialog = %ticket.dialog, generation, "load pending");
                OpenOutcome::Pending(PendingLoad { ticket, future })
            }
        }
    }

    fn apply(
        &mut self,
        host: &mut dyn PageHost,
        index: usize,
        result: Result<ContentResult, LoadError>,
    ) -> ContentState {
        let messages = &self.config.messages;
        let inst = &mut self.stack[index];
        inst.load_deadline = None;
        let id = inst.id().clone();
        let (state, view, initial) = match result {
            Ok(content) => {
                trace!(dialog = %id, "content ready");
                let view = render::dialog_shell(inst.chrome(false), content, messages);
                (ContentState::Ready, view, inst.initial_focus())
            }
            Err(err) => {
                warn!(dialog = %id, kind = %inst.kind(), reason = %err, "dialog load failed");
                let chrome = Chrome {
                    role: DialogKind::Alert.aria_role(),
                    title: Some(messages.load_failed_title.as_str()),
                    closable: true,
                    ..inst.chrome(false)
                };
                let view = render::dialog_shell(chrome, render::failure_content(messages), messages);
                self.notifier.raise(DialogNotification::LoadFailed {
                    id: id.clone(),
                    reason: err.to_string(),
                });
                (ContentState::Failed, view, InitialFocus::First)
            }
        };
        inst.state = state;
        host.render(inst.root, &view);
        inst.focus_bounds = self.focus.refresh(host, &id, Some(initial));
        state
    }

    fn remove(
        &mut self,
        host: &mut dyn PageHost,
        index: usize,
        restore: Restore,
        now: Instant,
    ) -> DialogId {
        let inst = self.stack.remove(index);
        let id = inst.id().clone();
        host.stop_media(inst.root);
        host.set_visible(inst.root, false);
        if inst.dynamic {
            self.fading.push(Fading {
                root: inst.root,
                until: now + self.config.transition,
            });
        }
        self.uploader.discard(&id);
        self.focus.release(host, &id, restore);
        if self.stack.is_empty() {
            host.set_backdrop_visible(false);
            host.remove_body_class(&self.config.scroll_lock_class);
            if let Some(offset) = self.saved_scroll.take() {
                host.set_scroll_offset(offset);
            }
        }
        debug!(dialog = %id, depth = self.stack.len(), "dialog closed");
        self.notifier.raise(DialogNotification::Closed { id: id.clone() });
        id
    }

    fn patch_files(
        &mut self,
        host: &mut dyn PageHost,
        id: &DialogId,
        rejection: Option<&ValidationError>,
    ) {
        let Some(index) = self.position(id) else {
            return;
        };
        let root = self.stack[index].root;
        let messages = &self.config.messages;
        let chips = self.uploader.chips(id);
        host.patch_region(root, render::FILES_REGION, &render::file_list(&chips, messages));
        let feedback = match rejection {
            Some(err) => render::feedback_view(&err.message()),
            None => ViewNode::text(""),
        };
        host.patch_region(root, render::FEEDBACK_REGION, &feedback);
        self.stack[index].focus_bounds = self.focus.refresh(host, id, None);
    }
}

fn validate_submission(
    form: &crate::modal::request::FormSpec,
    submission: &FormSubmission,
    staged: &[UploadedFile],
) -> Result<(), ValidationError> {
    for field in &form.fields {
        let value = submission.get(&field.name).map(str::trim).unwrap_or_default();
        let missing = match field.kind {
            FieldKind::File { .. } => staged.is_empty(),
            _ => value.is_empty(),
        };
        if field.required && missing {
            return Err(ValidationError::MissingField {
                field: field.name.clone(),
                label: field.label.clone(),
            });
        }
        if field.kind == FieldKind::Email && !value.is_empty() && !looks_like_email(value) {
            return Err(ValidationError::InvalidEmail {
                field: field.name.clone(),
                label: field.label.clone(),
            });
        }
    }
    Ok(())
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        && !value.chars().any(char::is_whitespace)
}
