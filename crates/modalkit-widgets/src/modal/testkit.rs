//! In-crate page double for unit tests.
//!
//! Element ids of focusables are `root * 1000 + document index`, so they
//! are stable across re-renders of the same structure. Page elements are
//! numbered from 1.

use std::time::Duration;

use ahash::AHashMap;
use modalkit_core::{ElementId, Instant, ScrollOffset};
use modalkit_view::{Element, ViewNode, focusable_elements};

use crate::modal::host::{Focusable, PageHost, RootHandle};
use crate::modal::request::DialogId;

#[derive(Debug, Default)]
pub(crate) struct RootState {
    pub view: Option<ViewNode>,
    pub visible: bool,
}

#[derive(Debug)]
pub(crate) struct TestPage {
    pub now: Instant,
    pub focused: Option<ElementId>,
    pub scroll: ScrollOffset,
    pub classes: Vec<String>,
    pub backdrop: bool,
    pub roots: AHashMap<RootHandle, RootState>,
    pub existing: AHashMap<DialogId, RootHandle>,
    pub destroyed: Vec<RootHandle>,
    pub media_stopped: Vec<RootHandle>,
    next_root: u64,
    next_page_element: u64,
}

impl TestPage {
    pub fn new() -> Self {
        Self {
            now: Instant::now(),
            focused: None,
            scroll: ScrollOffset::default(),
            classes: Vec::new(),
            backdrop: false,
            roots: AHashMap::new(),
            existing: AHashMap::new(),
            destroyed: Vec::new(),
            media_stopped: Vec::new(),
            next_root: 1,
            next_page_element: 1,
        }
    }

    pub fn advance(&mut self, by: Duration) {
        self.now += by;
    }

    /// A fresh element outside any dialog.
    pub fn page_element(&mut self) -> ElementId {
        let id = ElementId::new(self.next_page_element);
        self.next_page_element += 1;
        id
    }

    /// Register markup the page already contains for `dialog`.
    pub fn add_existing_root(&mut self, dialog: &DialogId) -> RootHandle {
        let root = self.alloc_root();
        self.existing.insert(dialog.clone(), root);
        root
    }

    pub fn view(&self, root: RootHandle) -> Option<&ViewNode> {
        self.roots.get(&root)?.view.as_ref()
    }

    pub fn is_visible(&self, root: RootHandle) -> bool {
        self.roots.get(&root).is_some_and(|r| r.visible)
    }

    /// The element that currently has focus, if it belongs to a dialog.
    pub fn focused_element(&self) -> Option<&Element> {
        let focused = self.focused?;
        self.roots.iter().find_map(|(root, state)| {
            let view = state.view.as_ref()?;
            focusable_elements(view)
                .into_iter()
                .enumerate()
                .find(|(i, _)| element_id(*root, *i) == focused)
                .map(|(_, (el, _))| el)
        })
    }

    fn alloc_root(&mut self) -> RootHandle {
        let root = RootHandle::new(self.next_root);
        self.next_root += 1;
        self.roots.insert(root, RootState::default());
        root
    }
}

fn element_id(root: RootHandle, index: usize) -> ElementId {
    ElementId::new(root.raw() * 1000 + index as u64)
}

impl PageHost for TestPage {
    fn now(&self) -> Instant {
        self.now
    }

    fn active_element(&self) -> Option<ElementId> {
        self.focused
    }

    fn focus(&mut self, element: ElementId) {
        self.focused = Some(element);
    }

    fn scroll_offset(&self) -> ScrollOffset {
        self.scroll
    }

    fn set_scroll_offset(&mut self, offset: ScrollOffset) {
        self.scroll = offset;
    }

    fn add_body_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_owned());
        }
    }

    fn remove_body_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    fn set_backdrop_visible(&mut self, visible: bool) {
        self.backdrop = visible;
    }

    fn existing_root(&mut self, dialog: &DialogId) -> Option<RootHandle> {
        self.existing.get(dialog).copied()
    }

    fn create_root(&mut self, _dialog: &DialogId) -> RootHandle {
        self.alloc_root()
    }

    fn render(&mut self, root: RootHandle, view: &ViewNode) {
        if let Some(state) = self.roots.get_mut(&root) {
            state.view = Some(view.clone());
        }
    }

    fn patch_region(&mut self, root: RootHandle, region: &str, view: &ViewNode) {
        if let Some(current) = self.roots.get_mut(&root).and_then(|s| s.view.as_mut()) {
            current.replace_region(region, view.clone());
        }
    }

    fn set_visible(&mut self, root: RootHandle, visible: bool) {
        if let Some(state) = self.roots.get_mut(&root) {
            state.visible = visible;
        }
    }

    fn stop_media(&mut self, root: RootHandle) {
        self.media_stopped.push(root);
    }

    fn destroy(&mut self, root: RootHandle) {
        self.roots.remove(&root);
        self.destroyed.push(root);
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
