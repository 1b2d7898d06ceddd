//! Repair of the `java/com/com.company.app/` layout some RN CLI versions emit

use crate::error::{StepError, StepResult};
use crate::ident::package_path;
use std::path::{Path, PathBuf};

/// Result of [`fix_package_layout`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutFix {
    /// No `java/<top>/` directory, nothing to inspect
    Missing,
    /// Layout already matches the package
    Healthy,
    /// Sources moved from the dotted directory into the nested one
    Fixed {
        moved: usize,
        from: PathBuf,
        to: PathBuf,
    },
}

/// Move sources out of a dotted package directory.
///
/// Only acts when `java/<top>/` holds exactly one directory, its name contains
/// dots, and it names the package (or a suffix of it).
pub fn fix_package_layout(java_root: &Path, package: &str) -> StepResult<LayoutFix> {
    let top = package.split('.').next().unwrap_or_default();
    let top_dir = java_root.join(top);
    if !top_dir.is_dir() {
        tracing::debug!(path = %top_dir.display(), "no package root to inspect");
        return Ok(LayoutFix::Missing);
    }

    let subdirs = subdirectories(&top_dir)?;
    let [wrong] = subdirs.as_slice() else {
        return Ok(LayoutFix::Healthy);
    };

    let name = wrong
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let names_package = name == package || package.ends_with(&format!(".{}", name));
    if !name.contains('.') || !names_package {
        return Ok(LayoutFix::Healthy);
    }

    let target = java_root.join(package_path(package));
    std::fs::create_dir_all(&target).map_err(|e| StepError::io(&target, e))?;

    let mut moved = 0;
    for entry in std::fs::read_dir(wrong).map_err(|e| StepError::io(wrong, e))? {
        let entry = entry.map_err(|e| StepError::io(wrong, e))?;
        let dest = target.join(entry.file_name());
        std::fs::rename(entry.path(), &dest).map_err(|e| StepError::io(&dest, e))?;
        moved += 1;
    }
    std::fs::remove_dir_all(wrong).map_err(|e| StepError::io(wrong, e))?;

    tracing::info!(from = %wrong.display(), to = %target.display(), moved, "package layout repaired");
    Ok(LayoutFix::Fixed {
        moved,
        from: wrong.clone(),
        to: target,
    })
}

fn subdirectories(dir: &Path) -> StepResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| StepError::io(dir, e))? {
        let path = entry.map_err(|e| StepError::io(dir, e))?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    Ok(dirs)
}
