//! Binary assets bundled into the APK

use super::AndroidProject;
use crate::error::{StepError, StepResult};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Copy `source` verbatim into `android/app/src/main/assets`.
///
/// `name` overrides the destination file name. Returns the destination path.
pub fn copy_asset(project: &AndroidProject, source: &Path, name: Option<&str>) -> StepResult<PathBuf> {
    if !source.is_file() {
        return Err(StepError::FileNotFound(source.to_path_buf()));
    }

    let file_name: OsString = match name {
        Some(name) => name.into(),
        None => source
            .file_name()
            .map(|n| n.to_os_string())
            .ok_or_else(|| StepError::InvalidInput(format!("{} has no file name", source.display())))?,
    };

    let assets = project.assets_dir();
    std::fs::create_dir_all(&assets).map_err(|e| StepError::io(&assets, e))?;

    let dest = assets.join(file_name);
    let bytes = std::fs::copy(source, &dest).map_err(|e| StepError::io(&dest, e))?;
    tracing::info!(from = %source.display(), to = %dest.display(), bytes, "asset copied");
    Ok(dest)
}
