#![forbid(unsafe_code)]

//! Scripted network and image doubles.
//!
//! [`StubTransport`] answers by URL: a fixed response, a transport error, or
//! a [`Held`] response the test releases later. Unscripted URLs get a 404.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::AHashMap;
use futures::FutureExt;
use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture};
use modalkit_widgets::modal::{
    AjaxRequest, DialogManager, HttpResponse, HttpTransport, ImageDecoder, ImageInfo,
    LoadCompletion, PageHost, PendingLoad,
};

type Reply = Result<HttpResponse, String>;

enum Script {
    Respond(HttpResponse),
    Fail(String),
    Hold(Rc<RefCell<Vec<oneshot::Sender<Reply>>>>),
}

/// Handle for responses that arrive when the test says so.
#[derive(Clone, Default)]
pub struct Held {
    waiting: Rc<RefCell<Vec<oneshot::Sender<Reply>>>>,
}

impl Held {
    /// Number of requests waiting on this handle.
    pub fn waiting(&self) -> usize {
        self.waiting.borrow().len()
    }

    /// Answer every waiting request. Returns how many were answered.
    pub fn release(&self, status: u16, body: &str) -> usize {
        self.answer(|| Ok(HttpResponse::new(status, body)))
    }

    /// Fail every waiting request at the transport level.
    pub fn fail(&self, reason: &str) -> usize {
        self.answer(|| Err(reason.to_owned()))
    }

    fn answer(&self, reply: impl Fn() -> Reply) -> usize {
        let senders: Vec<_> = self.waiting.borrow_mut().drain(..).collect();
        // A dropped receiver means the load was abandoned; that is fine.
        senders
            .into_iter()
            .filter(|tx| !tx.is_canceled())
            .map(|tx| tx.send(reply()).is_ok())
            .filter(|sent| *sent)
            .count()
    }
}

#[derive(Default)]
pub struct StubTransport {
    routes: RefCell<AHashMap<String, Script>>,
    requests: RefCell<Vec<AjaxRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, status: u16, body: &str) -> &Self {
        self.routes
            .borrow_mut()
            .insert(url.to_owned(), Script::Respond(HttpResponse::new(status, body)));
        self
    }

    pub fn fail(&self, url: &str, reason: &str) -> &Self {
        self.routes
            .borrow_mut()
            .insert(url.to_owned(), Script::Fail(reason.to_owned()));
        self
    }

    pub fn hold(&self, url: &str) -> Held {
        let held = Held::default();
        self.routes
            .borrow_mut()
            .insert(url.to_owned(), Script::Hold(Rc::clone(&held.waiting)));
        held
    }

    /// Requests seen so far, in order.
    pub fn requests(&self) -> Vec<AjaxRequest> {
        self.requests.borrow().clone()
    }
}

impl HttpTransport for StubTransport {
    fn send(&self, request: AjaxRequest) -> LocalBoxFuture<'static, Reply> {
        let url = request.url.clone();
        self.requests.borrow_mut().push(request);
        match self.routes.borrow().get(&url) {
            Some(Script::Respond(response)) => future::ready(Ok(response.clone())).boxed_local(),
            Some(Script::Fail(reason)) => future::ready(Err(reason.clone())).boxed_local(),
            Some(Script::Hold(waiting)) => {
                let (tx, rx) = oneshot::channel();
                waiting.borrow_mut().push(tx);
                rx.map(|reply| reply.unwrap_or_else(|_| Err("request abandoned".to_owned())))
                    .boxed_local()
            }
            None => future::ready(Ok(HttpResponse::new(404, "not found"))).boxed_local(),
        }
    }
}

/// Image decoder answering from a table; unknown sources fail.
#[derive(Default)]
pub struct StubDecoder {
    images: RefCell<AHashMap<String, ImageInfo>>,
}

impl StubDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&self, src: &str, width: u32, height: u32) -> &Self {
        self.images
            .borrow_mut()
            .insert(src.to_owned(), ImageInfo { width, height });
        self
    }
}

impl ImageDecoder for StubDecoder {
    fn decode(&self, src: &str) -> LocalBoxFuture<'static, Result<ImageInfo, String>> {
        let result = self
            .images
            .borrow()
            .get(src)
            .copied()
            .ok_or_else(|| format!("cannot decode {src}"));
        future::ready(result).boxed_local()
    }
}

/// Block on `pending` and hand the result to the manager.
pub fn drive(
    manager: &mut DialogManager,
    host: &mut dyn PageHost,
    pending: PendingLoad,
) -> modalkit_widgets::modal::ApplyOutcome {
    let completion: LoadCompletion = futures::executor::block_on(pending.resolve());
    manager.complete(host, completion)
}
