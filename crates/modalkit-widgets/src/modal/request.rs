#![forbid(unsafe_code)]

//! Dialog requests: what to open, and with which content.
//!
//! A [`DialogRequest`] is built by the caller (or parsed from a trigger
//! declaration), handed to [`DialogManager::open`](crate::modal::DialogManager::open)
//! once, and never mutated afterwards. The request's kind and its
//! parameters are one value: [`DialogContent`] is a closed enum with a
//! payload struct per kind, so every handler is checked exhaustively.

use core::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for generated dialog ids.
static DIALOG_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifier of a dialog instance, unique among open dialogs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DialogId(String);

impl DialogId {
    /// Wrap a caller-supplied id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh `modal-<n>` id.
    pub fn generate() -> Self {
        Self(format!(
            "modal-{}",
            DIALOG_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
        ))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DialogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DialogId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Fieldless dialog kind, used in notifications and trigger parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    Form,
    Ajax,
    Image,
    Video,
    Iframe,
    Confirm,
    Alert,
}

impl DialogKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Form => "form",
            Self::Ajax => "ajax",
            Self::Image => "image",
            Self::Video => "video",
            Self::Iframe => "iframe",
            Self::Confirm => "confirm",
            Self::Alert => "alert",
        }
    }

    /// Parse a trigger's `data-modal-type` value (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        let kind = match value.trim().to_ascii_lowercase().as_str() {
            "form" => Self::Form,
            "ajax" => Self::Ajax,
            "image" => Self::Image,
            "video" => Self::Video,
            "iframe" => Self::Iframe,
            "confirm" => Self::Confirm,
            "alert" => Self::Alert,
            _ => return None,
        };
        Some(kind)
    }

    /// Confirm and alert dialogs are announced as `alertdialog`.
    pub const fn aria_role(self) -> &'static str {
        match self {
            Self::Confirm | Self::Alert => "alertdialog",
            _ => "dialog",
        }
    }
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A caller-supplied action, run on the UI thread.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn()>);

impl Callback {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self) {
        (self.0)()
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

// --- Form ---

/// Control type of a form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    TextArea,
    /// `(value, label)` pairs.
    Select(Vec<(String, String)>),
    Checkbox,
    /// File picker with drop zone; staged files go through the uploader.
    File {
        multiple: bool,
    },
}

/// One field of a declarative form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub placeholder: Option<String>,
}

impl FormField {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            placeholder: None,
        }
    }

    pub fn text(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    pub fn email(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Email)
    }

    pub fn tel(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::Tel)
    }

    pub fn textarea(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::TextArea)
    }

    pub fn file(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(name, label, FieldKind::File { multiple: false })
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }
}

/// Declarative form rendered without any network round-trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSpec {
    pub intro: Option<String>,
    pub fields: Vec<FormField>,
    pub submit_label: String,
    /// Close the dialog after a valid submission (default `true`).
    pub close_on_submit: bool,
}

impl FormSpec {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self {
            intro: None,
            fields,
            submit_label: "Submit".to_owned(),
            close_on_submit: true,
        }
    }

    #[must_use]
    pub fn intro(mut self, text: impl Into<String>) -> Self {
        self.intro = Some(text.into());
        self
    }

    #[must_use]
    pub fn submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = label.into();
        self
    }

    #[must_use]
    pub fn close_on_submit(mut self, close: bool) -> Self {
        self.close_on_submit = close;
        self
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

// --- Ajax ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
}

impl HttpMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// How the endpoint wraps its markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Envelope {
    /// Response body is the markup.
    #[default]
    Raw,
    /// WordPress `wp_send_json_*` envelope: `{"success": .., "data": ..}`.
    WpJson,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AjaxSpec {
    pub url: String,
    pub method: HttpMethod,
    pub fields: Vec<(String, String)>,
    pub envelope: Envelope,
}

impl AjaxSpec {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            fields: Vec::new(),
            envelope: Envelope::Raw,
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            ..Self::get(url)
        }
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }
}

// --- Media ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSpec {
    pub src: String,
    pub alt: String,
    pub caption: Option<String>,
}

impl ImageSpec {
    pub fn new(src: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            alt: alt.into(),
            caption: None,
        }
    }

    #[must_use]
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

/// Where a video plays from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// Direct media file played by `<video>`.
    File(String),
    /// Provider player URL loaded in an `<iframe>`.
    Embed(String),
}

impl VideoSource {
    /// Pick `File` for common media extensions, `Embed` otherwise.
    pub fn detect(src: impl Into<String>) -> Self {
        let src = src.into();
        let path = src.split(['?', '#']).next().unwrap_or_default();
        let is_file = path
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .is_some_and(|ext| matches!(ext.as_str(), "mp4" | "webm" | "ogg" | "ogv" | "mov"));
        if is_file {
            Self::File(src)
        } else {
            Self::Embed(src)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSpec {
    pub source: VideoSource,
    pub poster: Option<String>,
    pub autoplay: bool,
}

impl VideoSpec {
    pub fn new(source: VideoSource) -> Self {
        Self {
            source,
            poster: None,
            autoplay: false,
        }
    }

    #[must_use]
    pub fn autoplay(mut self, on: bool) -> Self {
        self.autoplay = on;
        self
    }

    #[must_use]
    pub fn poster(mut self, poster: impl Into<String>) -> Self {
        self.poster = Some(poster.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IframeSpec {
    pub src: String,
    pub title: String,
    pub height: Option<u32>,
}

impl IframeSpec {
    pub fn new(src: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            title: title.into(),
            height: None,
        }
    }
}

// --- Confirm / Alert ---

#[derive(Debug, Clone)]
pub struct ConfirmSpec {
    pub message: String,
    pub confirm_label: Option<String>,
    pub cancel_label: Option<String>,
    pub on_confirm: Callback,
    pub on_cancel: Option<Callback>,
}

impl ConfirmSpec {
    pub fn new(message: impl Into<String>, on_confirm: Callback) -> Self {
        Self {
            message: message.into(),
            confirm_label: None,
            cancel_label: None,
            on_confirm,
            on_cancel: None,
        }
    }

    #[must_use]
    pub fn on_cancel(mut self, callback: Callback) -> Self {
        self.on_cancel = Some(callback);
        self
    }

    #[must_use]
    pub fn labels(mut self, confirm: impl Into<String>, cancel: impl Into<String>) -> Self {
        self.confirm_label = Some(confirm.into());
        self.cancel_label = Some(cancel.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSpec {
    pub message: String,
    pub button_label: Option<String>,
}

impl AlertSpec {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            button_label: None,
        }
    }
}

/// Kind plus kind-specific parameters.
#[derive(Debug, Clone)]
pub enum DialogContent {
    Form(FormSpec),
    Ajax(AjaxSpec),
    Image(ImageSpec),
    Video(VideoSpec),
    Iframe(IframeSpec),
    Confirm(ConfirmSpec),
    Alert(AlertSpec),
}

impl DialogContent {
    pub const fn kind(&self) -> DialogKind {
        match self {
            Self::Form(_) => DialogKind::Form,
            Self::Ajax(_) => DialogKind::Ajax,
            Self::Image(_) => DialogKind::Image,
            Self::Video(_) => DialogKind::Video,
            Self::Iframe(_) => DialogKind::Iframe,
            Self::Confirm(_) => DialogKind::Confirm,
            Self::Alert(_) => DialogKind::Alert,
        }
    }
}

/// Input to [`DialogManager::open`](crate::modal::DialogManager::open).
#[derive(Debug, Clone)]
pub struct DialogRequest {
    pub id: DialogId,
    pub title: Option<String>,
    pub content: DialogContent,
    /// Whether Escape and backdrop clicks may dismiss the dialog.
    pub closable: bool,
}

impl DialogRequest {
    pub fn new(id: impl Into<DialogId>, content: DialogContent) -> Self {
        Self {
            id: id.into(),
            title: None,
            content,
            closable: true,
        }
    }

    pub fn form(id: impl Into<DialogId>, spec: FormSpec) -> Self {
        Self::new(id, DialogContent::Form(spec))
    }

    pub fn ajax(id: impl Into<DialogId>, spec: AjaxSpec) -> Self {
        Self::new(id, DialogContent::Ajax(spec))
    }

    pub fn image(id: impl Into<DialogId>, spec: ImageSpec) -> Self {
        Self::new(id, DialogContent::Image(spec))
    }

    pub fn video(id: impl Into<DialogId>, spec: VideoSpec) -> Self {
        Self::new(id, DialogContent::Video(spec))
    }

    pub fn iframe(id: impl Into<DialogId>, spec: IframeSpec) -> Self {
        Self::new(id, DialogContent::Iframe(spec))
    }

    pub fn confirm(id: impl Into<DialogId>, spec: ConfirmSpec) -> Self {
        Self::new(id, DialogContent::Confirm(spec))
    }

    pub fn alert(id: impl Into<DialogId>, spec: AlertSpec) -> Self {
        Self::new(id, DialogContent::Alert(spec))
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn closable(mut self, closable: bool) -> Self {
        self.closable = closable;
        self
    }

    pub const fn kind(&self) -> DialogKind {
        self.content.kind()
    }
}

impl From<String> for DialogId {
    fn from(id: String) -> Self {
        Self(id)
    }
}
