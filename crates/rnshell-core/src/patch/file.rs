//! Applying patches to files on disk

use super::{Patch, PatchError, TextFile};
use crate::error::{StepError, StepResult};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// What happened to one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePatchReport {
    pub path: PathBuf,
    /// Markers of the patches that were inserted
    pub applied: Vec<String>,
    /// Markers of the patches that were already present
    pub skipped: Vec<String>,
}

impl FilePatchReport {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Read a file, transform its text, and write it back if it changed.
///
/// If the edit fails the file is left untouched. Returns whether the file was
/// rewritten.
pub fn edit_file<F>(path: &Path, edit: F) -> StepResult<bool>
where
    F: for<'a> FnOnce(&'a str) -> Result<Cow<'a, str>, PatchError>,
{
    let mut file = TextFile::read(path)?;

    let updated = match edit(&file.content).map_err(|e| StepError::patch(path, e))? {
        Cow::Borrowed(_) => None,
        Cow::Owned(text) => Some(text),
    };

    match updated {
        Some(text) if text != file.content => {
            file.content = text;
            file.write()?;
            tracing::debug!(path = %path.display(), "file rewritten");
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Apply a list of patches to one file, in order.
///
/// Every patch is resolved before anything is written: if one anchor is
/// missing, the file keeps its original content.
pub fn patch_file(path: &Path, patches: &[Patch]) -> StepResult<FilePatchReport> {
    let mut file = TextFile::read(path)?;
    let mut text = file.content.clone();
    let mut report = FilePatchReport {
        path: path.to_path_buf(),
        applied: Vec::new(),
        skipped: Vec::new(),
    };

    for patch in patches {
        let inserted = patch
            .apply_in_place(&mut text)
            .map_err(|e| StepError::patch(path, e))?;
        let marker = patch.marker().to_string();
        if inserted {
            report.applied.push(marker);
        } else {
            report.skipped.push(marker);
        }
    }

    if report.changed() {
        file.content = text;
        file.write()?;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::Anchor;
    use tempfile::TempDir;

    const MANIFEST: &str = "<manifest>\n    <application>\n    </application>\n</manifest>\n";

    fn permission(name: &str) -> Patch {
        Patch::new(
            format!("android:name=\"{}\"", name),
            format!("    <uses-permission android:name=\"{}\" />\n", name),
            Anchor::AfterOpeningTag("manifest".into()),
        )
    }

    #[test]
    fn test_patch_file_writes_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("AndroidManifest.xml");
        std::fs::write(&path, MANIFEST).unwrap();

        let patches = [permission("android.permission.INTERNET")];
        let first = patch_file(&path, &patches).unwrap();
        assert!(first.changed());

        let second = patch_file(&path, &patches).unwrap();
        assert!(!second.changed());
        assert_eq!(second.skipped, vec!["android:name=\"android.permission.INTERNET\""]);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("android.permission.INTERNET").count(), 1);
    }

    #[test]
    fn test_failed_patch_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("AndroidManifest.xml");
        let original = "<manifest>\n</manifest>\n";
        std::fs::write(&path, original).unwrap();

        let patches = [
            permission("android.permission.INTERNET"),
            Patch::new(
                ".Extra",
                "        <activity android:name=\".Extra\" />\n",
                Anchor::BeforeClosingTag("application".into()),
            ),
        ];
        let err = patch_file(&path, &patches).unwrap_err();
        assert!(matches!(
            err,
            StepError::Patch {
                source: PatchError::AnchorNotFound(_),
                ..
            }
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = patch_file(&dir.path().join("missing.xml"), &[]).unwrap_err();
        assert!(matches!(err, StepError::FileNotFound(_)));
    }

    #[test]
    fn test_edit_file_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build.gradle");
        std::fs::write(&path, "android {\n}\n").unwrap();

        let changed = edit_file(&path, |text| Ok(Cow::Borrowed(text))).unwrap();
        assert!(!changed);
    }
}
