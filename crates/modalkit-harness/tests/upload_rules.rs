#![forbid(unsafe_code)]

//! Attachment validation through the router, picker and drop alike.

use modalkit_core::{Event, FileCandidate, FileSource, PointerEvent, PointerTarget};
use modalkit_harness::FakePage;
use modalkit_harness::strategies::file_candidate;
use modalkit_widgets::modal::{
    DEFAULT_MAX_FILE_SIZE, DialogId, DialogManager, DialogRequest, Feedback, FieldKind, FormField,
    FormSpec, InputRouter, ResourceUploader, UploadPolicy, ValidationError,
};
use proptest::prelude::*;

fn upload_form() -> DialogRequest {
    DialogRequest::form(
        "docs",
        FormSpec::new(vec![FormField::new(
            "files",
            "Documents",
            FieldKind::File { multiple: true },
        )]),
    )
}

fn files(list: Vec<FileCandidate>, source: FileSource) -> Event {
    Event::Files {
        files: list,
        source,
    }
}

fn open_docs() -> (FakePage, DialogManager, InputRouter) {
    let mut page = FakePage::new();
    let mut manager = DialogManager::default();
    manager.open(&mut page, upload_form()).unwrap();
    (page, manager, InputRouter::new())
}

#[test]
fn size_limit_is_inclusive() {
    let (mut page, mut manager, router) = open_docs();
    let routed = router.route(
        &mut manager,
        &mut page,
        &files(
            vec![
                FileCandidate::new("exact.pdf", 10_485_760),
                FileCandidate::new("over.pdf", 10_485_761),
            ],
            FileSource::Picker,
        ),
    );
    assert!(matches!(routed.feedback[0], Feedback::FileStaged(ref chip) if chip.size_label == "10 MB"));
    assert!(matches!(
        routed.feedback[1],
        Feedback::FileRejected(ValidationError::TooLarge { size_bytes: 10_485_761, .. })
    ));
    assert_eq!(manager.uploader().staged(&DialogId::new("docs")).len(), 1);
}

#[test]
fn executable_rejected_pdf_accepted() {
    let (mut page, mut manager, router) = open_docs();
    let routed = router.route(
        &mut manager,
        &mut page,
        &files(
            vec![
                FileCandidate::new("resume.exe", 1_024),
                FileCandidate::new("resume.pdf", 1_024),
            ],
            FileSource::Drop,
        ),
    );
    assert!(matches!(
        routed.feedback[0],
        Feedback::FileRejected(ValidationError::UnsupportedType { .. })
    ));
    assert!(matches!(routed.feedback[1], Feedback::FileStaged(_)));

    let root = page.root_of("docs").unwrap();
    let html = page.html(root).unwrap();
    assert!(html.contains("resume.pdf"));
    assert!(html.contains("resume.exe is not a supported file type."));
}

#[test]
fn picker_and_drop_validate_identically() {
    let batch = vec![
        FileCandidate::new("photo.PNG", 2_000),
        FileCandidate::new("notes.txt", 20),
        FileCandidate::new("big.docx", DEFAULT_MAX_FILE_SIZE + 1),
    ];
    let outcomes = |source| {
        let (mut page, mut manager, router) = open_docs();
        let routed = router.route(&mut manager, &mut page, &files(batch.clone(), source));
        (routed.prevent_default(), routed.feedback)
    };
    let (picker_prevented, picker) = outcomes(FileSource::Picker);
    let (drop_prevented, dropped) = outcomes(FileSource::Drop);
    assert_eq!(picker, dropped);
    assert!(!picker_prevented);
    assert!(drop_prevented);
}

#[test]
fn chip_remove_control_unstages_file() {
    let (mut page, mut manager, router) = open_docs();
    router.route(
        &mut manager,
        &mut page,
        &files(
            vec![FileCandidate::new("a.pdf", 1), FileCandidate::new("b.pdf", 2)],
            FileSource::Picker,
        ),
    );
    let root = page.root_of("docs").unwrap();
    assert!(
        page.find_focusable(root, |el| el.get_attr("data-modal-action") == Some("remove-file:0"))
            .is_some()
    );

    router.route(
        &mut manager,
        &mut page,
        &Event::Pointer(PointerEvent::new(PointerTarget::Control {
            action: "remove-file:0".into(),
        })),
    );
    let staged = manager.uploader().staged(&DialogId::new("docs"));
    assert_eq!(staged.len(), 1);
    assert_eq!(staged[0].name, "b.pdf");
    assert!(!page.html(root).unwrap().contains("a.pdf"));

    // Out of range is a no-op.
    router.route(
        &mut manager,
        &mut page,
        &Event::Pointer(PointerEvent::new(PointerTarget::Control {
            action: "remove-file:5".into(),
        })),
    );
    assert_eq!(manager.uploader().staged(&DialogId::new("docs")).len(), 1);
}

#[test]
fn files_are_discarded_on_close() {
    let (mut page, mut manager, router) = open_docs();
    router.route(
        &mut manager,
        &mut page,
        &files(vec![FileCandidate::new("a.pdf", 1)], FileSource::Picker),
    );
    manager.close_all(&mut page);
    assert!(manager.uploader().staged(&DialogId::new("docs")).is_empty());
}

proptest! {
    #[test]
    fn staging_matches_policy(batch in proptest::collection::vec(file_candidate(), 0..12)) {
        let policy = UploadPolicy::default();
        let mut uploader = ResourceUploader::new(policy.clone());
        let dialog = DialogId::new("p");
        let mut accepted = 0;
        for file in batch {
            let allowed = file
                .extension()
                .is_some_and(|ext| policy.allowed_extensions.contains(&ext))
                && file.size_bytes <= policy.max_file_size;
            let result = uploader.stage(&dialog, file);
            prop_assert_eq!(result.is_ok(), allowed);
            if allowed {
                accepted += 1;
            }
        }
        prop_assert_eq!(uploader.staged(&dialog).len(), accepted);
    }
}
