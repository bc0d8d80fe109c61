#![forbid(unsafe_code)]

//! End-to-end dialog scenarios against the headless page.
//!
//! Run `BLESS=1 cargo test --package modalkit-harness` to create/update snapshots.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use modalkit_core::{ElementId, Event, KeyCode, KeyEvent, PointerEvent, PointerTarget, ScrollOffset};
use modalkit_harness::{
    FakePage, HostCall, NotificationLog, StubDecoder, StubTransport, assert_snapshot, capture_logs,
    drive,
};
use modalkit_widgets::modal::{
    AjaxSpec, AlertSpec, ApplyOutcome, Callback, ConfirmSpec, ContentState, DialogManager,
    DialogNotification, DialogRequest, Envelope, FormField, FormSpec, HttpMethod, ImageSpec,
    InputRouter, OpenOutcome, StateConflict, attrs,
};
use tracing::Level;

const FADE: Duration = Duration::from_millis(300);

fn settle(page: &mut FakePage, manager: &mut DialogManager) {
    page.advance(FADE);
    manager.tick(page);
}

fn click(target: PointerTarget) -> Event {
    Event::Pointer(PointerEvent::new(target))
}

fn escape() -> Event {
    Event::Key(KeyEvent::new(KeyCode::Escape))
}

fn control(action: &str) -> Event {
    click(PointerTarget::Control {
        action: action.to_owned(),
    })
}

fn cv_form() -> FormSpec {
    FormSpec::new(vec![
        FormField::text("name", "Full name").required(),
        FormField::email("email", "Email"),
        FormField::file("cv", "CV"),
    ])
}

// ============================================================================
// Open / close
// ============================================================================

#[test]
fn cv_form_opens_once_with_first_input_focused() {
    let mut page = FakePage::new();
    let mut manager = DialogManager::default();
    let log = NotificationLog::attach(manager.notifications());

    let first = manager
        .open(&mut page, DialogRequest::form("cv", cv_form()).title("Send your CV"))
        .unwrap();
    assert!(matches!(first, OpenOutcome::Ready));
    let again = manager.open(&mut page, DialogRequest::form("cv", cv_form()));
    assert_eq!(again.unwrap_err(), StateConflict::Animating);
    assert_eq!(manager.depth(), 1);

    let root = page.root_of("cv").unwrap();
    assert!(page.is_visible(root));
    let html = page.html(root).unwrap();
    assert!(html.contains(r#"name="name""#));
    assert!(html.contains(r#"name="email""#));
    assert!(html.contains(r#"type="file""#));
    assert_eq!(page.focused_element().unwrap().get_attr("name"), Some("name"));
    assert_eq!(log.summary(), ["opened:cv"]);
}

#[test]
fn alert_markup_matches_snapshot() {
    let mut page = FakePage::new();
    let mut manager = DialogManager::default();
    manager
        .open(
            &mut page,
            DialogRequest::alert("saved", AlertSpec::new("Your application was sent.")).title("Saved"),
        )
        .unwrap();
    let root = page.root_of("saved").unwrap();
    assert_snapshot!("alert_dialog", page.view(root).unwrap());
}

#[test]
fn last_close_restores_scroll_focus_and_unlocks_page() {
    let mut page = FakePage::new();
    let mut manager = DialogManager::default();
    let mut router = InputRouter::new();
    let trigger = page.page_element();
    router
        .bind(trigger, &[(attrs::ID, "a"), (attrs::TYPE, "alert"), (attrs::MESSAGE, "A")])
        .unwrap();
    let nested = ElementId::new(77_001);
    router
        .bind(nested, &[(attrs::ID, "b"), (attrs::TYPE, "alert"), (attrs::MESSAGE, "B")])
        .unwrap();

    page.user_focus(trigger);
    page.scroll_to(ScrollOffset::new(0.0, 480.0));
    router.route(&mut manager, &mut page, &click(PointerTarget::Page(trigger)));
    assert!(page.has_class("modal-open"));
    assert!(page.backdrop_visible());
    page.scroll_to(ScrollOffset::new(0.0, 0.0));
    settle(&mut page, &mut manager);

    router.route(
        &mut manager,
        &mut page,
        &click(PointerTarget::Content {
            element: Some(nested),
        }),
    );
    assert_eq!(manager.depth(), 2);
    settle(&mut page, &mut manager);

    router.route(&mut manager, &mut page, &escape());
    assert_eq!(manager.depth(), 1);
    assert!(page.has_class("modal-open"));
    settle(&mut page, &mut manager);

    router.route(&mut manager, &mut page, &click(PointerTarget::Backdrop));
    assert!(manager.is_empty());
    assert_eq!(page.scroll(), ScrollOffset::new(0.0, 480.0));
    assert_eq!(page.focused(), Some(trigger));
    assert!(!page.has_class("modal-open"));
    assert!(!page.backdrop_visible());

    let locks = page
        .calls()
        .iter()
        .filter(|c| matches!(c, HostCall::AddClass(_) | HostCall::RemoveClass(_)))
        .count();
    assert_eq!(locks, 2);

    settle(&mut page, &mut manager);
    assert_eq!(page.live_roots(), 0);
}

#[test]
fn existing_markup_is_reused_and_kept() {
    let mut page = FakePage::new();
    let root = page.add_existing_root("newsletter");
    let mut manager = DialogManager::default();
    manager
        .open(&mut page, DialogRequest::alert("newsletter", AlertSpec::new("Subscribed")))
        .unwrap();
    assert_eq!(page.root_of("newsletter"), Some(root));
    settle(&mut page, &mut manager);
    manager.close(&mut page, None).unwrap();
    settle(&mut page, &mut manager);
    assert!(!page.is_visible(root));
    assert_eq!(page.live_roots(), 1);
    assert!(!page.calls().contains(&HostCall::Destroy(root)));
}

#[test]
fn confirm_trigger_runs_callback_before_close() {
    let mut page = FakePage::new();
    let mut manager = DialogManager::default();
    let mut router = InputRouter::new();
    let withdrawn = Rc::new(Cell::new(0));
    let trigger = page.page_element();
    let on_confirm = {
        let withdrawn = Rc::clone(&withdrawn);
        Callback::new(move || withdrawn.set(withdrawn.get() + 1))
    };
    router.bind_request(
        trigger,
        DialogRequest::confirm("withdraw", ConfirmSpec::new("Withdraw your application?", on_confirm)),
    );

    router.route(&mut manager, &mut page, &click(PointerTarget::Page(trigger)));
    // Still fading in: the confirm is absorbed.
    router.route(&mut manager, &mut page, &control("confirm"));
    assert_eq!(withdrawn.get(), 0);
    settle(&mut page, &mut manager);
    router.route(&mut manager, &mut page, &control("confirm"));
    assert_eq!(withdrawn.get(), 1);
    assert!(manager.is_empty());
}

#[test]
fn cancel_control_closes_without_confirming() {
    let mut page = FakePage::new();
    let mut manager = DialogManager::default();
    let router = InputRouter::new();
    let confirmed = Rc::new(Cell::new(0));
    let cancelled = Rc::new(Cell::new(0));
    let spec = {
        let confirmed = Rc::clone(&confirmed);
        let cancelled = Rc::clone(&cancelled);
        ConfirmSpec::new(
            "Withdraw your application?",
            Callback::new(move || confirmed.set(confirmed.get() + 1)),
        )
        .on_cancel(Callback::new(move || cancelled.set(cancelled.get() + 1)))
    };
    manager
        .open(&mut page, DialogRequest::confirm("withdraw", spec))
        .unwrap();
    settle(&mut page, &mut manager);

    let routed = router.route(&mut manager, &mut page, &control("cancel"));
    assert!(routed.is_consumed());
    assert!(manager.is_empty());
    assert_eq!(cancelled.get(), 1);
    assert_eq!(confirmed.get(), 0);
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn ajax_500_shows_generic_failure_alert() {
    let transport = Rc::new(StubTransport::new());
    transport.respond("/bad", 500, "<pre>Fatal error in wp-content/plugins</pre>");
    let mut page = FakePage::new();
    let mut manager = DialogManager::default().with_transport(transport.clone());
    let log = NotificationLog::attach(manager.notifications());

    let (outcome, events) = capture_logs(|| {
        manager.open(&mut page, DialogRequest::ajax("err", AjaxSpec::get("/bad")))
    });
    assert!(matches!(outcome, Ok(OpenOutcome::Failed)));
    assert_eq!(manager.top().unwrap().state(), ContentState::Failed);

    let root = page.root_of("err").unwrap();
    let html = page.html(root).unwrap();
    assert!(!html.contains("Fatal error"));
    assert_snapshot!("ajax_failure", page.view(root).unwrap());

    assert_eq!(log.summary(), ["opened:err", "load-failed:err"]);
    let reason = log.entries().into_iter().find_map(|n| match n {
        DialogNotification::LoadFailed { reason, .. } => Some(reason),
        _ => None,
    });
    assert_eq!(reason.as_deref(), Some("endpoint returned HTTP 500"));

    let warning = events
        .iter()
        .find(|e| e.level == Level::WARN && e.message == "dialog load failed")
        .unwrap();
    assert_eq!(warning.field("dialog"), Some("err"));
    assert_eq!(warning.field("kind"), Some("ajax"));

    assert_eq!(transport.requests()[0].timeout, Duration::from_secs(10));
}

#[test]
fn wp_envelope_post_loads_markup() {
    let transport = Rc::new(StubTransport::new());
    transport.respond(
        "/wp-admin/admin-ajax.php",
        200,
        r#"{"success":true,"data":{"html":"<p>Job 7</p>"}}"#,
    );
    let mut page = FakePage::new();
    let mut manager = DialogManager::default().with_transport(transport.clone());
    let spec = AjaxSpec::post("/wp-admin/admin-ajax.php")
        .field("action", "job_details")
        .field("job", "7")
        .envelope(Envelope::WpJson);
    let outcome = manager.open(&mut page, DialogRequest::ajax("job-7", spec)).unwrap();
    assert!(matches!(outcome, OpenOutcome::Ready));

    let html = page.html(page.root_of("job-7").unwrap()).unwrap();
    assert!(html.contains("<p>Job 7</p>"));
    let sent = &transport.requests()[0];
    assert_eq!(sent.method, HttpMethod::Post);
    assert_eq!(sent.fields[0], ("action".to_owned(), "job_details".to_owned()));
}

#[test]
fn held_load_shows_busy_shell_then_content() {
    let transport = Rc::new(StubTransport::new());
    let held = transport.hold("/jobs/7");
    let mut page = FakePage::new();
    let mut manager = DialogManager::default().with_transport(transport);

    let pending = manager
        .open(&mut page, DialogRequest::ajax("job", AjaxSpec::get("/jobs/7")))
        .unwrap()
        .into_pending()
        .unwrap();
    let root = page.root_of("job").unwrap();
    assert!(page.html(root).unwrap().contains(r#"aria-busy="true""#));
    assert_eq!(held.waiting(), 1);

    assert_eq!(held.release(200, "<p>Role</p>"), 1);
    assert_eq!(
        drive(&mut manager, &mut page, pending),
        ApplyOutcome::Applied(ContentState::Ready)
    );
    let html = page.html(root).unwrap();
    assert!(html.contains("<p>Role</p>"));
    assert!(!html.contains("aria-busy"));
}

#[test]
fn timeout_fails_dialog_and_late_reply_is_discarded() {
    let transport = Rc::new(StubTransport::new());
    let held = transport.hold("/slow");
    let mut page = FakePage::new();
    let mut manager = DialogManager::default().with_transport(transport);
    let log = NotificationLog::attach(manager.notifications());

    let pending = manager
        .open(&mut page, DialogRequest::ajax("slow", AjaxSpec::get("/slow")))
        .unwrap()
        .into_pending()
        .unwrap();
    page.advance(Duration::from_millis(9_999));
    manager.tick(&mut page);
    assert_eq!(manager.top().unwrap().state(), ContentState::Loading);
    page.advance(Duration::from_millis(1));
    manager.tick(&mut page);
    assert_eq!(manager.top().unwrap().state(), ContentState::Failed);
    assert_eq!(log.summary(), ["opened:slow", "load-failed:slow"]);

    held.release(200, "<p>too late</p>");
    assert_eq!(drive(&mut manager, &mut page, pending), ApplyOutcome::Discarded);
    let html = page.html(page.root_of("slow").unwrap()).unwrap();
    assert!(!html.contains("too late"));
    assert!(html.contains("Try again"));
}

#[test]
fn failure_alert_of_pinned_dialog_can_be_dismissed() {
    let transport = Rc::new(StubTransport::new());
    transport.respond("/bad", 500, "oops");
    let mut page = FakePage::new();
    let mut manager = DialogManager::default().with_transport(transport);
    let router = InputRouter::new();
    let pinned = || DialogRequest::ajax("err", AjaxSpec::get("/bad")).closable(false);

    manager.open(&mut page, pinned()).unwrap();
    let root = page.root_of("err").unwrap();
    let close_button =
        page.find_focusable(root, |el| el.get_attr("data-modal-action") == Some("close"));
    assert!(close_button.is_some());
    settle(&mut page, &mut manager);
    router.route(&mut manager, &mut page, &escape());
    assert!(manager.is_empty());

    settle(&mut page, &mut manager);
    manager.open(&mut page, pinned()).unwrap();
    settle(&mut page, &mut manager);
    router.route(&mut manager, &mut page, &click(PointerTarget::Backdrop));
    assert!(manager.is_empty());
}

#[test]
fn load_finishing_under_nested_dialog_keeps_focus_on_top() {
    let transport = Rc::new(StubTransport::new());
    let held = transport.hold("/jobs/3");
    let mut page = FakePage::new();
    let mut manager = DialogManager::default().with_transport(transport);

    let pending = manager
        .open(&mut page, DialogRequest::ajax("job", AjaxSpec::get("/jobs/3")))
        .unwrap()
        .into_pending()
        .unwrap();
    settle(&mut page, &mut manager);
    manager
        .open(&mut page, DialogRequest::alert("note", AlertSpec::new("Heads up")))
        .unwrap();
    let note = page.root_of("note").unwrap();
    let focused = page.focused();
    assert!(page.focus_within(note));

    held.release(200, r#"<p>Role</p><a href="/apply">Apply</a>"#);
    assert_eq!(
        drive(&mut manager, &mut page, pending),
        ApplyOutcome::Applied(ContentState::Ready)
    );
    assert_eq!(page.focused(), focused);
    assert!(page.focus_within(note));
    assert!(page.html(page.root_of("job").unwrap()).unwrap().contains("<p>Role</p>"));
}

#[test]
fn retry_after_transport_failure_loads_content() {
    let transport = Rc::new(StubTransport::new());
    transport.fail("/flaky", "offline");
    let mut page = FakePage::new();
    let mut manager = DialogManager::default().with_transport(transport.clone());
    let router = InputRouter::new();

    manager
        .open(&mut page, DialogRequest::ajax("flaky", AjaxSpec::get("/flaky")))
        .unwrap();
    assert_eq!(manager.top().unwrap().state(), ContentState::Failed);

    transport.respond("/flaky", 200, "<p>back online</p>");
    let routed = router.route(&mut manager, &mut page, &control("retry"));
    assert!(routed.pending.is_none());
    assert_eq!(manager.top().unwrap().state(), ContentState::Ready);
    assert!(page.html(page.root_of("flaky").unwrap()).unwrap().contains("back online"));
    assert_eq!(transport.requests().len(), 2);
}

#[test]
fn close_during_load_never_renders_into_destroyed_root() {
    let transport = Rc::new(StubTransport::new());
    let held = transport.hold("/jobs/9");
    let mut page = FakePage::new();
    let mut manager = DialogManager::default().with_transport(transport);

    let pending = manager
        .open(&mut page, DialogRequest::ajax("job", AjaxSpec::get("/jobs/9")))
        .unwrap()
        .into_pending()
        .unwrap();
    let root = page.root_of("job").unwrap();
    settle(&mut page, &mut manager);
    manager.close(&mut page, None).unwrap();
    settle(&mut page, &mut manager);
    assert!(page.calls().contains(&HostCall::Destroy(root)));

    held.release(200, "<p>orphan</p>");
    page.clear_calls();
    assert_eq!(drive(&mut manager, &mut page, pending), ApplyOutcome::Discarded);
    assert!(page.calls().is_empty());
}

#[test]
fn image_decoder_sizes_image_and_failure_falls_back() {
    let decoder = Rc::new(StubDecoder::new());
    decoder.image("/uploads/site.jpg", 1200, 800);
    let mut page = FakePage::new();
    let mut manager = DialogManager::default().with_decoder(decoder);

    manager
        .open(
            &mut page,
            DialogRequest::image("photo", ImageSpec::new("/uploads/site.jpg", "Site")),
        )
        .unwrap();
    let html = page.html(page.root_of("photo").unwrap()).unwrap();
    assert!(html.contains(r#"width="1200" height="800""#));

    settle(&mut page, &mut manager);
    let outcome = manager
        .open(
            &mut page,
            DialogRequest::image("broken", ImageSpec::new("/uploads/missing.jpg", "")),
        )
        .unwrap();
    assert!(matches!(outcome, OpenOutcome::Failed));
}

// ============================================================================
// Logging
// ============================================================================

#[test]
fn lifecycle_is_logged_with_fields() {
    let mut page = FakePage::new();
    let mut manager = DialogManager::default();
    let (_, events) = capture_logs(|| {
        manager
            .open(&mut page, DialogRequest::alert("a", AlertSpec::new("x")))
            .unwrap();
        manager.close_all(&mut page);
    });
    let opened = events.iter().find(|e| e.message == "dialog opened").unwrap();
    assert_eq!(opened.level, Level::DEBUG);
    assert_eq!(opened.field("dialog"), Some("a"));
    assert_eq!(opened.field("depth"), Some("1"));
    let closed = events.iter().find(|e| e.message == "dialog closed").unwrap();
    assert_eq!(closed.field("depth"), Some("0"));
}
