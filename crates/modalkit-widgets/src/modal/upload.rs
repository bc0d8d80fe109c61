#![forbid(unsafe_code)]

//! Resource uploader: client-side validation and staging of attachments.
//!
//! Files picked with `<input type="file">` and files dropped on a dialog's
//! drop zone both arrive as [`FileCandidate`] values and go through
//! [`ResourceUploader::stage`]; there is no second path.
//!
//! # Invariants
//!
//! - A staged file always satisfies the [`UploadPolicy`] that was active
//!   when it was staged: `size_bytes <= max_file_size` and the extension is
//!   on the allow-list.
//! - A rejected candidate leaves every staged list untouched.
//! - Staged lists are keyed by dialog; discarding a dialog drops its list.
//!
//! # Failure Modes
//!
//! | Condition | Result |
//! |-----------|--------|
//! | Extension missing or not allowed | `ValidationError::UnsupportedType` |
//! | Reported MIME type not allowed | `ValidationError::UnsupportedType` |
//! | `size_bytes > max_file_size` | `ValidationError::TooLarge` |
//! | `remove` with index out of range | `None`, list unchanged |

use ahash::AHashMap;
use modalkit_core::FileCandidate;
use tracing::{debug, warn};

use crate::modal::config::UploadPolicy;
use crate::modal::error::ValidationError;
use crate::modal::request::DialogId;

/// Action token prefix of a file chip's remove button.
pub const REMOVE_FILE_ACTION: &str = "remove-file";

/// A validated attachment staged on a dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub size_bytes: u64,
    /// Browser MIME type when reported, the extension otherwise.
    pub media_type: String,
    pub dialog: DialogId,
}

/// Render descriptor for one staged file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChip {
    pub name: String,
    pub size_label: String,
    pub index: usize,
    /// `remove-file:<index>`, the token carried by the chip's remove button.
    pub remove_action: String,
}

/// Validates candidates against an [`UploadPolicy`] and keeps per-dialog
/// staged lists.
#[derive(Debug, Clone, Default)]
pub struct ResourceUploader {
    policy: UploadPolicy,
    staged: AHashMap<DialogId, Vec<UploadedFile>>,
}

impl ResourceUploader {
    pub fn new(policy: UploadPolicy) -> Self {
        Self {
            policy,
            staged: AHashMap::new(),
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Check a candidate without staging it.
    ///
    /// The type check runs first, so an oversized `.exe` reports
    /// `UnsupportedType`.
    pub fn validate(&self, file: &FileCandidate) -> Result<(), ValidationError> {
        let extension = file.extension();
        let type_ok = extension
            .as_deref()
            .is_some_and(|ext| self.policy.allows_extension(ext))
            && file
                .mime
                .as_deref()
                .is_none_or(|mime| self.policy.allows_mime(mime));
        if !type_ok {
            return Err(ValidationError::UnsupportedType {
                name: file.name.clone(),
                extension,
            });
        }
        if file.size_bytes > self.policy.max_file_size {
            return Err(ValidationError::TooLarge {
                name: file.name.clone(),
                size_bytes: file.size_bytes,
                limit: self.policy.max_file_size,
            });
        }
        Ok(())
    }

    /// Validate `file` and append it to `dialog`'s staged list.
    ///
    /// # Errors
    ///
    /// The [`ValidationError`] from [`validate`](Self::validate); nothing is
    /// staged in that case.
    pub fn stage(
        &mut self,
        dialog: &DialogId,
        file: FileCandidate,
    ) -> Result<FileChip, ValidationError> {
        if let Err(err) = self.validate(&file) {
            warn!(dialog = %dialog, file = %file.name, reason = %err, "file rejected");
            return Err(err);
        }
        let extension = file.extension();
        let media_type = match (file.mime, extension) {
            (Some(mime), _) => mime,
            (None, Some(ext)) => ext,
            (None, None) => String::new(),
        };
        let list = self.staged.entry(dialog.clone()).or_default();
        list.push(UploadedFile {
            name: file.name,
            size_bytes: file.size_bytes,
            media_type,
            dialog: dialog.clone(),
        });
        let index = list.len() - 1;
        debug!(dialog = %dialog, index, staged = list.len(), "file staged");
        Ok(chip(&list[index], index))
    }

    /// Remove the staged file at `index`; out-of-range indices are ignored.
    pub fn remove(&mut self, dialog: &DialogId, index: usize) -> Option<UploadedFile> {
        let list = self.staged.get_mut(dialog)?;
        if index >= list.len() {
            return None;
        }
        let removed = list.remove(index);
        if list.is_empty() {
            self.staged.remove(dialog);
        }
        Some(removed)
    }

    pub fn staged(&self, dialog: &DialogId) -> &[UploadedFile] {
        self.staged.get(dialog).map_or(&[], Vec::as_slice)
    }

    /// Chips for the current staged list, indices renumbered from zero.
    pub fn chips(&self, dialog: &DialogId) -> Vec<FileChip> {
        self.staged(dialog)
            .iter()
            .enumerate()
            .map(|(i, file)| chip(file, i))
            .collect()
    }

    /// Drop everything staged on `dialog`.
    pub fn discard(&mut self, dialog: &DialogId) -> Vec<UploadedFile> {
        self.staged.remove(dialog).unwrap_or_default()
    }
}

fn chip(file: &UploadedFile, index: usize) -> FileChip {
    FileChip {
        name: file.name.clone(),
        size_label: human_size(file.size_bytes),
        index,
        remove_action: format!("{REMOVE_FILE_ACTION}:{index}"),
    }
}

/// Binary-unit size label with at most one decimal: `512 B`, `1.5 KB`, `10 MB`.
pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let mut rounded = (value * 10.0).round() / 10.0;
    if rounded >= 1024.0 && unit < UNITS.len() - 1 {
        rounded = ((rounded / 1024.0) * 10.0).round() / 10.0;
        unit += 1;
    }
    if rounded.fract() == 0.0 {
        format!("{rounded:.0} {}", UNITS[unit])
    } else {
        format!("{rounded:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LIMIT: u64 = 10_485_760;

    fn uploader() -> ResourceUploader {
        ResourceUploader::new(UploadPolicy::default())
    }

    #[test]
    fn exactly_at_limit_is_accepted() {
        let mut up = uploader();
        let id = DialogId::new("cv");
        let chip = up.stage(&id, FileCandidate::new("resume.pdf", LIMIT)).unwrap();
        assert_eq!(chip.size_label, "10 MB");
        assert_eq!(chip.remove_action, "remove-file:0");
        assert_eq!(up.staged(&id).len(), 1);
    }

    #[test]
    fn one_byte_over_limit_is_too_large() {
        let mut up = uploader();
        let id = DialogId::new("cv");
        let err = up
            .stage(&id, FileCandidate::new("resume.pdf", LIMIT + 1))
            .unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { size_bytes, .. } if size_bytes == LIMIT + 1));
        assert!(up.staged(&id).is_empty());
    }

    #[test]
    fn executable_is_unsupported() {
        let mut up = uploader();
        let id = DialogId::new("cv");
        let err = up.stage(&id, FileCandidate::new("resume.exe", 100)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedType {
                name: "resume.exe".into(),
                extension: Some("exe".into()),
            }
        );
    }

    #[test]
    fn type_is_checked_before_size() {
        let up = uploader();
        let err = up
            .validate(&FileCandidate::new("setup.exe", LIMIT * 2))
            .unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType { .. }));
    }

    #[test]
    fn disallowed_mime_rejects_even_with_good_extension() {
        let up = uploader();
        let file = FileCandidate::new("resume.pdf", 10).with_mime("application/x-msdownload");
        assert!(matches!(
            up.validate(&file),
            Err(ValidationError::UnsupportedType { .. })
        ));
        let file = FileCandidate::new("resume.pdf", 10).with_mime("application/pdf");
        assert!(up.validate(&file).is_ok());
    }

    #[test]
    fn missing_extension_is_unsupported() {
        let up = uploader();
        let err = up.validate(&FileCandidate::new("README", 10)).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnsupportedType {
                extension: None,
                ..
            }
        ));
    }

    #[test]
    fn remove_out_of_range_is_noop() {
        let mut up = uploader();
        let id = DialogId::new("cv");
        up.stage(&id, FileCandidate::new("a.pdf", 1)).unwrap();
        assert!(up.remove(&id, 5).is_none());
        assert_eq!(up.staged(&id).len(), 1);
        assert!(up.remove(&DialogId::new("other"), 0).is_none());
    }

    #[test]
    fn chips_renumber_after_remove() {
        let mut up = uploader();
        let id = DialogId::new("cv");
        for name in ["a.pdf", "b.png", "c.docx"] {
            up.stage(&id, FileCandidate::new(name, 2048)).unwrap();
        }
        let removed = up.remove(&id, 0).unwrap();
        assert_eq!(removed.name, "a.pdf");
        let chips = up.chips(&id);
        assert_eq!(chips.len(), 2);
        assert_eq!(chips[0].name, "b.png");
        assert_eq!(chips[0].remove_action, "remove-file:0");
        assert_eq!(chips[1].size_label, "2 KB");
    }

    #[test]
    fn lists_are_per_dialog() {
        let mut up = uploader();
        let a = DialogId::new("a");
        let b = DialogId::new("b");
        up.stage(&a, FileCandidate::new("x.pdf", 1)).unwrap();
        assert!(up.staged(&b).is_empty());
        assert_eq!(up.discard(&a).len(), 1);
        assert!(up.staged(&a).is_empty());
    }

    #[test]
    fn media_type_prefers_mime() {
        let mut up = uploader();
        let id = DialogId::new("cv");
        up.stage(&id, FileCandidate::new("a.png", 1).with_mime("image/png"))
            .unwrap();
        up.stage(&id, FileCandidate::new("b.PDF", 1)).unwrap();
        let types: Vec<_> = up.staged(&id).iter().map(|f| f.media_type.as_str()).collect();
        assert_eq!(types, ["image/png", "pdf"]);
    }

    #[test]
    fn human_size_labels() {
        assert_eq!(human_size(0), "0 B");
        assert_eq!(human_size(1023), "1023 B");
        assert_eq!(human_size(1536), "1.5 KB");
        assert_eq!(human_size(10_485_760), "10 MB");
    }

    #[test]
    fn human_size_carries_into_next_unit() {
        assert_eq!(human_size(1_048_575), "1 MB");
        assert_eq!(human_size(1_073_741_823), "1 GB");
        assert_eq!(human_size(1_048_064), "1023.5 KB");
    }

    proptest! {
        #[test]
        fn staged_files_never_exceed_limit(sizes in proptest::collection::vec(0u64..=LIMIT * 2, 0..32)) {
            let mut up = uploader();
            let id = DialogId::new("p");
            for (i, size) in sizes.iter().enumerate() {
                let _ = up.stage(&id, FileCandidate::new(format!("f{i}.pdf"), *size));
            }
            let accepted = sizes.iter().filter(|s| **s <= LIMIT).count();
            prop_assert_eq!(up.staged(&id).len(), accepted);
            prop_assert!(up.staged(&id).iter().all(|f| f.size_bytes <= LIMIT));
        }
    }
}
