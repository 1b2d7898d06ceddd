//! `package.json` dependency merge

use crate::error::{StepError, StepResult};
use crate::patch::TextFile;
use anyhow::Context;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Merge `deps` into the `dependencies` object of a `package.json` text.
///
/// Existing entries keep their position and take the new version. Returns
/// `None` when nothing changes.
pub fn merge_dependencies_text(
    text: &str,
    deps: &BTreeMap<String, String>,
) -> anyhow::Result<Option<String>> {
    let mut package: Value = serde_json::from_str(text).context("package.json is not valid JSON")?;
    let root = package
        .as_object_mut()
        .context("package.json root is not an object")?;

    let dependencies = root
        .entry("dependencies")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .context("`dependencies` is not an object")?;

    let mut changed = false;
    for (name, version) in deps {
        let version = Value::String(version.clone());
        if dependencies.get(name) != Some(&version) {
            dependencies.insert(name.clone(), version);
            changed = true;
        }
    }

    if !changed {
        return Ok(None);
    }

    let mut out = serde_json::to_string_pretty(&package)?;
    out.push('\n');
    Ok(Some(out))
}

/// Merge dependencies into `<root>/package.json`. Returns whether it changed.
pub fn merge_dependencies(root: &Path, deps: &BTreeMap<String, String>) -> StepResult<bool> {
    let path = root.join("package.json");
    let mut file = TextFile::read(&path)?;

    let merged = merge_dependencies_text(&file.content, deps)
        .with_context(|| format!("failed to merge dependencies into {}", path.display()))
        .map_err(StepError::Unexpected)?;

    match merged {
        Some(content) => {
            file.content = content;
            file.write()?;
            tracing::info!(path = %path.display(), count = deps.len(), "dependencies merged");
            Ok(true)
        }
        None => Ok(false),
    }
}
