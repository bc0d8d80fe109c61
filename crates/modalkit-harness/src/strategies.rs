#![forbid(unsafe_code)]

//! proptest strategies for attachments and user sessions.

use std::time::Duration;

use modalkit_core::FileCandidate;
use proptest::prelude::*;

const EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "jpg", "jpeg", "png", "gif", "exe", "zip", ""];

/// Files around the default 10 MB limit with a mix of allowed and
/// rejected extensions.
pub fn file_candidate() -> impl Strategy<Value = FileCandidate> {
    let size = prop_oneof![
        0u64..=4096,
        10_485_700u64..=10_485_800,
        any::<u32>().prop_map(u64::from),
    ];
    ("[a-z]{1,8}", proptest::sample::select(EXTENSIONS), size).prop_map(|(stem, ext, size)| {
        let name = if ext.is_empty() {
            stem
        } else {
            format!("{stem}.{ext}")
        };
        FileCandidate::new(name, size)
    })
}

/// One step of a simulated user session.
#[derive(Debug, Clone)]
pub enum UserStep {
    /// Click the page trigger with this index.
    ClickTrigger(usize),
    Escape,
    Tab { backwards: bool },
    Backdrop,
    /// Let time pass and run the manager's timers.
    Wait(Duration),
    Drop(Vec<FileCandidate>),
}

pub fn user_step(triggers: usize) -> impl Strategy<Value = UserStep> {
    prop_oneof![
        (0..triggers.max(1)).prop_map(UserStep::ClickTrigger),
        Just(UserStep::Escape),
        any::<bool>().prop_map(|backwards| UserStep::Tab { backwards }),
        Just(UserStep::Backdrop),
        (0u64..=400).prop_map(|ms| UserStep::Wait(Duration::from_millis(ms))),
        proptest::collection::vec(file_candidate(), 1..3).prop_map(UserStep::Drop),
    ]
}

pub fn session(triggers: usize, len: usize) -> impl Strategy<Value = Vec<UserStep>> {
    proptest::collection::vec(user_step(triggers), 0..len)
}
