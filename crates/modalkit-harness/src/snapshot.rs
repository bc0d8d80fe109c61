#![forbid(unsafe_code)]

//! Snapshot files for rendered dialogs.
//!
//! Snapshots live in `tests/snapshots/<name>.html` under the calling crate.
//! Run with `BLESS=1` to create or update them.

use std::fs;
use std::path::{Path, PathBuf};

fn snapshot_path(manifest_dir: &str, name: &str) -> PathBuf {
    Path::new(manifest_dir)
        .join("tests")
        .join("snapshots")
        .join(format!("{name}.html"))
}

fn blessing() -> bool {
    std::env::var("BLESS").is_ok_and(|v| v == "1")
}

/// Compare `actual` with the stored snapshot, panicking on mismatch.
///
/// Trailing whitespace is ignored on both sides.
pub fn check(manifest_dir: &str, name: &str, actual: &str) {
    let path = snapshot_path(manifest_dir, name);
    if blessing() {
        if let Some(parent) = path.parent()
            && let Err(err) = fs::create_dir_all(parent)
        {
            panic!("cannot create {}: {err}", parent.display());
        }
        if let Err(err) = fs::write(&path, format!("{}\n", actual.trim_end())) {
            panic!("cannot write {}: {err}", path.display());
        }
        return;
    }
    let expected = match fs::read_to_string(&path) {
        Ok(expected) => expected,
        Err(err) => panic!(
            "snapshot '{name}' missing at {} ({err}); run with BLESS=1 to create it",
            path.display()
        ),
    };
    assert!(
        expected.trim_end() == actual.trim_end(),
        "snapshot '{name}' differs\n--- expected\n{}\n--- actual\n{}\n(run with BLESS=1 to update)",
        expected.trim_end(),
        actual.trim_end()
    );
}

/// Assert that a rendered view matches `tests/snapshots/<name>.html`.
///
/// ```ignore
/// assert_snapshot!("alert_dialog", page.view(root).unwrap());
/// ```
#[macro_export]
macro_rules! assert_snapshot {
    ($name:expr, $view:expr) => {
        $crate::snapshot::check(
            env!("CARGO_MANIFEST_DIR"),
            $name,
            &$crate::to_html($view),
        )
    };
}
