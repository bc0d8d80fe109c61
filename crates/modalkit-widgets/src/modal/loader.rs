#![forbid(unsafe_code)]

//! Content loader: turns a request into dialog body and footer views.
//!
//! Every kind returns the same [`LoadFuture`], including the kinds whose
//! work is synchronous (form, confirm, alert, video, iframe). Those futures
//! are already complete, and the manager detects that with
//! `now_or_never` instead of special-casing kinds.
//!
//! The loader never touches the dialog stack or the host page. Network and
//! image decoding go through host-provided [`HttpTransport`] and
//! [`ImageDecoder`] implementations.
//!
//! # Failure Modes
//!
//! | Kind | Condition | Error |
//! |------|-----------|-------|
//! | Ajax | no transport configured | `LoadError::Unavailable` |
//! | Ajax | transport error | `LoadError::Transport` |
//! | Ajax | status outside 200..=299 | `LoadError::Status` |
//! | Ajax | WP envelope malformed or `success: false` | `LoadError::Envelope` |
//! | Image | decoder reports failure | `LoadError::Decode` |
//!
//! Timeouts are enforced by the manager's clock, not here; the configured
//! bound is passed to the transport in [`AjaxRequest::timeout`] so it can
//! abort the request early.

use std::rc::Rc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};
use modalkit_view::TrustedMarkup;
use serde_json::Value;

use crate::modal::config::ManagerConfig;
use crate::modal::error::LoadError;
use crate::modal::render::{self, ContentResult, ImageInfo};
use crate::modal::request::{AjaxSpec, DialogContent, DialogRequest, Envelope, HttpMethod};

/// Future resolving to a dialog's content.
pub type LoadFuture = LocalBoxFuture<'static, Result<ContentResult, LoadError>>;

/// One request to a content endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AjaxRequest {
    pub url: String,
    pub method: HttpMethod,
    /// Sent as the query string for GET and as the form body for POST.
    pub fields: Vec<(String, String)>,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client supplied by the host (`fetch`, a test stub, ...).
pub trait HttpTransport {
    /// Send `request`. `Err` carries a transport-level reason; HTTP error
    /// statuses are an `Ok` response.
    fn send(&self, request: AjaxRequest) -> LocalBoxFuture<'static, Result<HttpResponse, String>>;
}

/// Image preloader supplied by the host.
pub trait ImageDecoder {
    /// Fetch and decode `src`, reporting its natural size.
    fn decode(&self, src: &str) -> LocalBoxFuture<'static, Result<ImageInfo, String>>;
}

/// Produces [`ContentResult`]s per dialog kind.
#[derive(Clone)]
pub struct ContentLoader {
    config: Rc<ManagerConfig>,
    transport: Option<Rc<dyn HttpTransport>>,
    decoder: Option<Rc<dyn ImageDecoder>>,
}

impl std::fmt::Debug for ContentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentLoader")
            .field("transport", &self.transport.is_some())
            .field("decoder", &self.decoder.is_some())
            .finish()
    }
}

impl ContentLoader {
    pub fn new(config: Rc<ManagerConfig>) -> Self {
        Self {
            config,
            transport: None,
            decoder: None,
        }
    }

    #[must_use]
    pub fn with_transport(mut self, transport: Rc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Without a decoder, images are shown without preloading.
    #[must_use]
    pub fn with_decoder(mut self, decoder: Rc<dyn ImageDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Start loading `request`'s content. Never fails synchronously.
    pub fn load(&self, request: &DialogRequest) -> LoadFuture {
        let messages = &self.config.messages;
        let ready =
            |content: ContentResult| -> LoadFuture { future::ready(Ok(content)).boxed_local() };
        match &request.content {
            DialogContent::Form(spec) => ready(render::form_content(
                &request.id,
                spec,
                &self.config.upload,
                messages,
            )),
            DialogContent::Confirm(spec) => ready(render::confirm_content(spec, messages)),
            DialogContent::Alert(spec) => ready(render::alert_content(spec, messages)),
            DialogContent::Video(spec) => {
                ready(render::video_content(spec, request.title.as_deref()))
            }
            DialogContent::Iframe(spec) => ready(render::iframe_content(spec)),
            DialogContent::Image(spec) => match &self.decoder {
                None => ready(render::image_content(spec, None)),
                Some(decoder) => {
                    let decode = decoder.decode(&spec.src);
                    let spec = spec.clone();
                    async move {
                        let info = decode.await.map_err(|reason| LoadError::Decode {
                            src: spec.src.clone(),
                            reason,
                        })?;
                        Ok(render::image_content(&spec, Some(info)))
                    }
                    .boxed_local()
                }
            },
            DialogContent::Ajax(spec) => self.load_ajax(spec),
        }
    }

    fn load_ajax(&self, spec: &AjaxSpec) -> LoadFuture {
        let Some(transport) = &self.transport else {
            return future::ready(Err(LoadError::Unavailable("HTTP transport"))).boxed_local();
        };
        let send = transport.send(AjaxRequest {
            url: spec.url.clone(),
            method: spec.method,
            fields: spec.fields.clone(),
            timeout: self.config.ajax_timeout,
        });
        let envelope = spec.envelope;
        async move {
            let response = send.await.map_err(LoadError::Transport)?;
            if !response.is_success() {
                return Err(LoadError::Status {
                    status: response.status,
                });
            }
            let markup = match envelope {
                Envelope::Raw => response.body,
                Envelope::WpJson => unwrap_wp_envelope(&response.body)?,
            };
            Ok(render::ajax_content(TrustedMarkup::from_endpoint(markup)))
        }
        .boxed_local()
    }
}

/// Extract markup from `{"success": true, "data": {"html": ".."}}` or
/// `{"success": true, "data": ".."}`.
pub fn unwrap_wp_envelope(body: &str) -> Result<String, LoadError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| LoadError::Envelope(e.to_string()))?;
    if value.get("success").and_then(Value::as_bool) != Some(true) {
        return Err(LoadError::Envelope("success is not true".into()));
    }
    match value.get("data") {
        Some(Value::String(html)) => Ok(html.clone()),
        Some(data) => data
            .get("html")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| LoadError::Envelope("data.html is missing".into())),
        None => Err(LoadError::Envelope("data is missing".into())),
    }
}
