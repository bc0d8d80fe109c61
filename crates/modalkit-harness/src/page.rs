#![forbid(unsafe_code)]

//! Headless [`PageHost`] that records every side effect.
//!
//! Focusable elements inside a dialog root get ids `root * 1000 + index`
//! (document order), so ids stay stable across re-renders of the same
//! structure. Elements outside dialogs come from [`FakePage::page_element`]
//! and are numbered from 1.

use std::time::Duration;

use ahash::AHashMap;
use modalkit_core::{ElementId, Instant, ScrollOffset};
use modalkit_view::{Element, ViewNode, focusable_elements, to_html};
use modalkit_widgets::modal::{DialogId, Focusable, PageHost, RootHandle};

/// One host call, in the order the manager made it.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Focus(ElementId),
    SetScroll(ScrollOffset),
    AddClass(String),
    RemoveClass(String),
    Backdrop(bool),
    CreateRoot(DialogId, RootHandle),
    Render(RootHandle),
    Patch(RootHandle, String),
    SetVisible(RootHandle, bool),
    StopMedia(RootHandle),
    Destroy(RootHandle),
}

#[derive(Debug, Default)]
struct Root {
    dialog: Option<DialogId>,
    view: Option<ViewNode>,
    visible: bool,
}

#[derive(Debug)]
pub struct FakePage {
    now: Instant,
    focused: Option<ElementId>,
    scroll: ScrollOffset,
    classes: Vec<String>,
    backdrop: bool,
    roots: AHashMap<RootHandle, Root>,
    existing: AHashMap<DialogId, RootHandle>,
    calls: Vec<HostCall>,
    next_root: u64,
    next_page_element: u64,
}

impl Default for FakePage {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePage {
    pub fn new() -> Self {
        Self {
            now: Instant::now(),
            focused: None,
            scroll: ScrollOffset::default(),
            classes: Vec::new(),
            backdrop: false,
            roots: AHashMap::new(),
            existing: AHashMap::new(),
            calls: Vec::new(),
            next_root: 1,
            next_page_element: 1,
        }
    }

    // --- Driving ---

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// A fresh element outside any dialog.
    pub fn page_element(&mut self) -> ElementId {
        let id = ElementId::new(self.next_page_element);
        self.next_page_element += 1;
        id
    }

    /// Simulate the user scrolling the page.
    pub fn scroll_to(&mut self, offset: ScrollOffset) {
        self.scroll = offset;
    }

    /// Move focus without recording a host call (user action).
    pub fn user_focus(&mut self, element: ElementId) {
        self.focused = Some(element);
    }

    /// Declare markup the page already contains for `dialog`.
    pub fn add_existing_root(&mut self, dialog: impl Into<DialogId>) -> RootHandle {
        let dialog = dialog.into();
        let root = self.alloc_root(Some(dialog.clone()));
        self.existing.insert(dialog, root);
        root
    }

    // --- Inspection ---

    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    pub fn scroll(&self) -> ScrollOffset {
        self.scroll
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn backdrop_visible(&self) -> bool {
        self.backdrop
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Live (not destroyed) root bound to `dialog`.
    pub fn root_of(&self, dialog: &str) -> Option<RootHandle> {
        self.roots
            .iter()
            .find(|(_, r)| r.dialog.as_ref().is_some_and(|d| d.as_str() == dialog))
            .map(|(handle, _)| *handle)
    }

    pub fn live_roots(&self) -> usize {
        self.roots.len()
    }

    pub fn view(&self, root: RootHandle) -> Option<&ViewNode> {
        self.roots.get(&root)?.view.as_ref()
    }

    pub fn html(&self, root: RootHandle) -> Option<String> {
        self.view(root).map(to_html)
    }

    pub fn is_visible(&self, root: RootHandle) -> bool {
        self.roots.get(&root).is_some_and(|r| r.visible)
    }

    /// The focused element's view node, when focus is inside a dialog.
    pub fn focused_element(&self) -> Option<&Element> {
        let focused = self.focused?;
        self.roots.iter().find_map(|(root, state)| {
            focusable_elements(state.view.as_ref()?)
                .into_iter()
                .enumerate()
                .find(|(i, _)| element_id(*root, *i) == focused)
                .map(|(_, (el, _))| el)
        })
    }

    /// Id of the first focusable in `root` matching `pred`.
    pub fn find_focusable(
        &self,
        root: RootHandle,
        pred: impl Fn(&Element) -> bool,
    ) -> Option<ElementId> {
        focusable_elements(self.view(root)?)
            .into_iter()
            .position(|(el, _)| pred(el))
            .map(|i| element_id(root, i))
    }

    pub fn focusables_len(&self, root: RootHandle) -> usize {
        self.focusables(root).len()
    }

    /// Whether focus sits inside `root`.
    pub fn focus_within(&self, root: RootHandle) -> bool {
        self.focused
            .is_some_and(|f| self.focusables(root).iter().any(|x| x.element == f))
    }

    fn alloc_root(&mut self, dialog: Option<DialogId>) -> RootHandle {
        let root = RootHandle::new(self.next_root);
        self.next_root += 1;
        self.roots.insert(
            root,
            Root {
                dialog,
                ..Root::default()
            },
        );
        root
    }
}

fn element_id(root: RootHandle, index: usize) -> ElementId {
    ElementId::new(root.raw() * 1000 + index as u64)
}

impl PageHost for FakePage {
    fn now(&self) -> Instant {
        self.now
    }

    fn active_element(&self) -> Option<ElementId> {
        self.focused
    }

    fn focus(&mut self, element: ElementId) {
        self.calls.push(HostCall::Focus(element));
        self.focused = Some(element);
    }

    fn scroll_offset(&self) -> ScrollOffset {
        self.scroll
    }

    fn set_scroll_offset(&mut self, offset: ScrollOffset) {
        self.calls.push(HostCall::SetScroll(offset));
        self.scroll = offset;
    }

    fn add_body_class(&mut self, class: &str) {
        self.calls.push(HostCall::AddClass(class.to_owned()));
        if !self.has_class(class) {
            self.classes.push(class.to_owned());
        }
    }

    fn remove_body_class(&mut self, class: &str) {
        self.calls.push(HostCall::RemoveClass(class.to_owned()));
        self.classes.retain(|c| c != class);
    }

    fn set_backdrop_visible(&mut self, visible: bool) {
        self.calls.push(HostCall::Backdrop(visible));
        self.backdrop = visible;
    }

    fn existing_root(&mut self, dialog: &DialogId) -> Option<RootHandle> {
        self.existing.get(dialog).copied()
    }

    fn create_root(&mut self, dialog: &DialogId) -> RootHandle {
        let root = self.alloc_root(Some(dialog.clone()));
        self.calls.push(HostCall::CreateRoot(dialog.clone(), root));
        root
    }

    fn render(&mut self, root: RootHandle, view: &ViewNode) {
        self.calls.push(HostCall::Render(root));
        if let Some(state) = self.roots.get_mut(&root) {
            state.view = Some(view.clone());
        }
    }

    fn patch_region(&mut self, root: RootHandle, region: &str, view: &ViewNode) {
        self.calls.push(HostCall::Patch(root, region.to_owned()));
        if let Some(current) = self.roots.get_mut(&root).and_then(|s| s.view.as_mut()) {
            current.replace_region(region, view.clone());
        }
    }

    fn set_visible(&mut self, root: RootHandle, visible: bool) {
        self.calls.push(HostCall::SetVisible(root, visible));
        if let Some(state) = self.roots.get_mut(&root) {
            state.visible = visible;
        }
    }

    fn stop_media(&mut self, root: RootHandle) {
        self.calls.push(HostCall::StopMedia(root));
    }

    fn destroy(&mut self, root: RootHandle) {
        self.calls.push(HostCall::Destroy(root));
        self.roots.remove(&root);
    }

    fn focusables(&self, root: RootHandle) -> Vec<Focusable> {
        let Some(view) = self.view(root) else {
            return Vec::new();
        };
        focusable_elements(view)
            .into_iter()
            .enumerate()
            .map(|(i, (_, role))| Focusable::new(element_id(root, i), role))
            .collect()
    }
}
