#![forbid(unsafe_code)]

//! View builders for dialog chrome and per-kind bodies.
//!
//! Everything here is pure: a function of the request, the configured
//! copy and (for images) decoded dimensions. Nothing touches the host.
//!
//! Dialog layout:
//!
//! ```text
//! div.modal[role][aria-modal][aria-labelledby]
//! └─ div.modal__dialog
//!    ├─ header.modal__header   h2 title, close button
//!    ├─ div.modal__body        region "body"
//!    ├─ footer.modal__footer   region "footer" (optional)
//!    └─ div.modal__feedback    region "feedback", aria-live
//! ```

use modalkit_view::{Element, Tag, TrustedMarkup, ViewNode};

use crate::modal::config::{Messages, UploadPolicy};
use crate::modal::request::{
    AlertSpec, ConfirmSpec, DialogId, FieldKind, FormField, FormSpec, IframeSpec, ImageSpec,
    VideoSource, VideoSpec,
};
use crate::modal::upload::FileChip;

pub const BODY_REGION: &str = "body";
pub const FOOTER_REGION: &str = "footer";
pub const FEEDBACK_REGION: &str = "feedback";
pub const FILES_REGION: &str = "files";

/// Region holding the inline error of form field `field`.
pub fn field_error_region(field: &str) -> String {
    format!("error-{field}")
}

/// Body and optional footer produced by the content loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentResult {
    pub body: ViewNode,
    pub footer: Option<ViewNode>,
}

impl ContentResult {
    pub fn new(body: impl Into<ViewNode>) -> Self {
        Self {
            body: body.into(),
            footer: None,
        }
    }

    #[must_use]
    pub fn footer(mut self, footer: impl Into<ViewNode>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

/// Image dimensions reported by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

/// Outer frame parameters shared by every dialog state.
#[derive(Debug, Clone, Copy)]
pub struct Chrome<'a> {
    pub id: &'a DialogId,
    pub role: &'a str,
    pub title: Option<&'a str>,
    pub closable: bool,
    pub busy: bool,
}

/// Wrap `content` in the dialog frame.
pub fn dialog_shell(chrome: Chrome<'_>, content: ContentResult, messages: &Messages) -> ViewNode {
    let title_id = format!("{}-title", chrome.id);
    let mut root = Element::new(Tag::Div)
        .class("modal")
        .attr("id", chrome.id.as_str())
        .attr("role", chrome.role)
        .attr("aria-modal", "true");
    if chrome.title.is_some() {
        root = root.attr("aria-labelledby", title_id.clone());
    }
    if chrome.busy {
        root = root.attr("aria-busy", "true").class("is-loading");
    }

    let mut dialog = Element::new(Tag::Div).class("modal__dialog");
    if chrome.title.is_some() || chrome.closable {
        let mut header = Element::new(Tag::Header).class("modal__header");
        if let Some(title) = chrome.title {
            header = header.child(
                Element::new(Tag::H2)
                    .class("modal__title")
                    .attr("id", title_id)
                    .text(title),
            );
        }
        if chrome.closable {
            header = header.child(
                Element::new(Tag::Button)
                    .class("modal__close")
                    .attr("type", "button")
                    .attr("aria-label", messages.close_label.as_str())
                    .action("close")
                    .text("×"),
            );
        }
        dialog = dialog.child(header);
    }
    dialog = dialog.child(
        Element::new(Tag::Div)
            .class("modal__body")
            .region(BODY_REGION)
            .child(content.body),
    );
    if let Some(footer) = content.footer {
        dialog = dialog.child(
            Element::new(Tag::Footer)
                .class("modal__footer")
                .region(FOOTER_REGION)
                .child(footer),
        );
    }
    dialog = dialog.child(
        Element::new(Tag::Div)
            .class("modal__feedback")
            .region(FEEDBACK_REGION)
            .attr("aria-live", "polite"),
    );
    root.child(dialog).into()
}

/// Placeholder body while content loads.
pub fn loading_content(messages: &Messages) -> ContentResult {
    ContentResult::new(
        Element::new(Tag::P)
            .class("modal__loading")
            .attr("role", "status")
            .text(messages.loading.as_str()),
    )
}

/// Generic failure alert with Retry and Dismiss.
pub fn failure_content(messages: &Messages) -> ContentResult {
    ContentResult::new(message_paragraph(&messages.load_failed_body)).footer(
        Element::new(Tag::Div)
            .class("modal__actions")
            .child(button(&messages.dismiss_label, "dismiss", false))
            .child(button(&messages.retry_label, "retry", true)),
    )
}

pub fn form_content(
    id: &DialogId,
    spec: &FormSpec,
    policy: &UploadPolicy,
    messages: &Messages,
) -> ContentResult {
    let mut form = Element::new(Tag::Form)
        .class("modal-form")
        .attr("data-modal-form", id.as_str())
        .flag("novalidate");
    if let Some(intro) = &spec.intro {
        form = form.child(Element::new(Tag::P).class("modal-form__intro").text(intro.as_str()));
    }
    form = form.children(spec.fields.iter().map(|f| form_row(id, f, policy, messages)));
    form = form.child(
        Element::new(Tag::Button)
            .class("button")
            .class("button--primary")
            .attr("type", "submit")
            .action("submit")
            .text(spec.submit_label.as_str()),
    );
    ContentResult::new(form)
}

fn form_row(id: &DialogId, field: &FormField, policy: &UploadPolicy, messages: &Messages) -> Element {
    let control_id = format!("{id}-{}", field.name);
    let error_id = format!("{control_id}-error");

    let mut label = Element::new(Tag::Label)
        .attr("for", control_id.clone())
        .text(field.label.as_str());
    if field.required {
        label = label.child(
            Element::new(Tag::Span)
                .class("modal-form__required")
                .attr("aria-hidden", "true")
                .text("*"),
        );
    }

    let control = field_control(field, &control_id, &error_id, policy, messages);
    let error = Element::new(Tag::P)
        .class("modal-form__error")
        .attr("id", error_id)
        .region(&field_error_region(&field.name));

    Element::new(Tag::Div)
        .class("modal-form__row")
        .class(match field.kind {
            FieldKind::File { .. } => "modal-form__row--file",
            FieldKind::Checkbox => "modal-form__row--checkbox",
            _ => "modal-form__row--input",
        })
        .child(label)
        .child(control)
        .child(error)
}

fn field_control(
    field: &FormField,
    control_id: &str,
    error_id: &str,
    policy: &UploadPolicy,
    messages: &Messages,
) -> Element {
    let input_type = match &field.kind {
        FieldKind::Text => Some("text"),
        FieldKind::Email => Some("email"),
        FieldKind::Tel => Some("tel"),
        _ => None,
    };
    let base = |tag: Tag| {
        let mut el = Element::new(tag)
            .attr("id", control_id.to_owned())
            .attr("name", field.name.as_str())
            .attr("aria-describedby", error_id.to_owned())
            .flag_if("required", field.required);
        if let Some(placeholder) = &field.placeholder {
            el = el.attr("placeholder", placeholder.as_str());
        }
        el
    };
    match &field.kind {
        FieldKind::Text | FieldKind::Email | FieldKind::Tel => {
            base(Tag::Input).attr("type", input_type.unwrap_or("text"))
        }
        FieldKind::TextArea => base(Tag::Textarea).attr("rows", "4"),
        FieldKind::Select(options) => base(Tag::Select).children(options.iter().map(|(value, label)| {
            Element::new(Tag::Option)
                .attr("value", value.as_str())
                .text(label.as_str())
        })),
        FieldKind::Checkbox => base(Tag::Input).attr("type", "checkbox").attr("value", "1"),
        FieldKind::File { multiple } => Element::new(Tag::Div)
            .class("modal-dropzone")
            .attr("data-modal-dropzone", field.name.as_str())
            .child(
                base(Tag::Input)
                    .attr("type", "file")
                    .attr("accept", policy.accept_attr())
                    .flag_if("multiple", *multiple),
            )
            .child(
                Element::new(Tag::P)
                    .class("modal-dropzone__hint")
                    .text(messages.drop_files_hint.as_str()),
            )
            .child(
                Element::new(Tag::Div)
                    .class("modal-files")
                    .region(FILES_REGION)
                    .child(file_list(&[], messages)),
            ),
    }
}

/// Chip list placed in the `files` region.
pub fn file_list(chips: &[FileChip], messages: &Messages) -> ViewNode {
    Element::new(Tag::Ul)
        .class("modal-files__list")
        .children(chips.iter().map(|chip| {
            Element::new(Tag::Li)
                .class("modal-file")
                .child(Element::new(Tag::Span).class("modal-file__name").text(chip.name.as_str()))
                .child(
                    Element::new(Tag::Span)
                        .class("modal-file__size")
                        .text(chip.size_label.as_str()),
                )
                .child(
                    Element::new(Tag::Button)
                        .class("modal-file__remove")
                        .attr("type", "button")
                        .attr(
                            "aria-label",
                            format!("{} {}", messages.remove_file_label, chip.name),
                        )
                        .action(chip.remove_action.as_str())
                        .text(messages.remove_file_label.as_str()),
                )
        }))
        .into()
}

/// Inline message placed in the `feedback` region or a field error region.
pub fn feedback_view(message: &str) -> ViewNode {
    Element::new(Tag::Span)
        .class("modal__feedback-message")
        .attr("role", "alert")
        .text(message)
        .into()
}

pub fn confirm_content(spec: &ConfirmSpec, messages: &Messages) -> ContentResult {
    let confirm = spec.confirm_label.as_deref().unwrap_or(&messages.confirm_label);
    let cancel = spec.cancel_label.as_deref().unwrap_or(&messages.cancel_label);
    ContentResult::new(message_paragraph(&spec.message)).footer(
        Element::new(Tag::Div)
            .class("modal__actions")
            .child(button(cancel, "cancel", false))
            .child(button(confirm, "confirm", true)),
    )
}

pub fn alert_content(spec: &AlertSpec, messages: &Messages) -> ContentResult {
    let label = spec.button_label.as_deref().unwrap_or(&messages.ok_label);
    ContentResult::new(message_paragraph(&spec.message)).footer(
        Element::new(Tag::Div)
            .class("modal__actions")
            .child(button(label, "close", true)),
    )
}

pub fn image_content(spec: &ImageSpec, info: Option<ImageInfo>) -> ContentResult {
    let mut img = Element::new(Tag::Img)
        .attr("src", spec.src.as_str())
        .attr("alt", spec.alt.as_str())
        .attr("decoding", "async");
    if let Some(info) = info {
        img = img
            .attr("width", info.width.to_string())
            .attr("height", info.height.to_string());
    }
    let mut figure = Element::new(Tag::Figure).class("modal-image").child(img);
    if let Some(caption) = &spec.caption {
        figure = figure.child(Element::new(Tag::Figcaption).text(caption.as_str()));
    }
    ContentResult::new(figure)
}

pub fn video_content(spec: &VideoSpec, title: Option<&str>) -> ContentResult {
    let player = match &spec.source {
        VideoSource::File(src) => {
            let mut video = Element::new(Tag::Video)
                .attr("src", src.as_str())
                .flag("controls")
                .flag("playsinline")
                .attr("preload", "metadata");
            if let Some(poster) = &spec.poster {
                video = video.attr("poster", poster.as_str());
            }
            video.flag_if("autoplay", spec.autoplay)
        }
        VideoSource::Embed(src) => Element::new(Tag::Iframe)
            .attr("src", src.as_str())
            .attr("title", title.unwrap_or("Video"))
            .attr("allow", "autoplay; fullscreen; picture-in-picture")
            .flag("allowfullscreen"),
    };
    ContentResult::new(
        Element::new(Tag::Div)
            .class("modal-video")
            .child(player),
    )
}

pub fn iframe_content(spec: &IframeSpec) -> ContentResult {
    let mut frame = Element::new(Tag::Iframe)
        .attr("src", spec.src.as_str())
        .attr("title", spec.title.as_str())
        .attr("loading", "lazy");
    if let Some(height) = spec.height {
        frame = frame.attr("height", height.to_string());
    }
    ContentResult::new(Element::new(Tag::Div).class("modal-iframe").child(frame))
}

/// Endpoint markup, carried verbatim.
pub fn ajax_content(markup: TrustedMarkup) -> ContentResult {
    ContentResult::new(Element::new(Tag::Div).class("modal-ajax").child(markup))
}

fn message_paragraph(message: &str) -> Element {
    Element::new(Tag::P).class("modal__message").text(message)
}

fn button(label: &str, action: &str, primary: bool) -> Element {
    let el = Element::new(Tag::Button)
        .class("button")
        .attr("type", "button")
        .action(action)
        .text(label);
    if primary { el.class("button--primary") } else { el }
}
