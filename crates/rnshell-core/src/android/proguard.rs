//! ProGuard / R8 keep rules

use super::AndroidProject;
use crate::error::{StepError, StepResult};
use crate::patch::{patch_file, Anchor, FilePatchReport, Patch, Syntax};

/// Patch appending `rules` at the end of the file.
///
/// The first non-empty line of `rules` is the marker, so the block is only
/// appended once.
pub fn rules_patch(rules: &str) -> StepResult<Patch> {
    let marker = rules
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .ok_or_else(|| StepError::InvalidInput("ProGuard rules are empty".into()))?;

    let mut template = rules.trim_end_matches('\n').to_string();
    template.push('\n');

    Ok(Patch::new(marker, template, Anchor::EndOfFile).with_syntax(Syntax::Plain))
}

/// Append rules to `proguard-rules.pro`, creating it if the template omitted it
pub fn add_rules(project: &AndroidProject, rules: &str) -> StepResult<FilePatchReport> {
    let path = project.proguard_rules();
    let patch = rules_patch(rules)?;

    if !path.exists() {
        tracing::info!(path = %path.display(), "creating ProGuard rules file");
        std::fs::write(&path, "").map_err(|e| StepError::io(&path, e))?;
    }

    patch_file(&path, &[patch])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const RULES: &str = "# WebView\n-keep class com.reactnativecommunity.webview.** { *; }\n-keepattributes JavascriptInterface\n";

    fn project() -> (TempDir, AndroidProject) {
        let dir = TempDir::new().unwrap();
        let project = AndroidProject::new(dir.path());
        std::fs::create_dir_all(project.app_dir()).unwrap();
        (dir, project)
    }

    #[test]
    fn test_marker_skips_comments() {
        let patch = rules_patch(RULES).unwrap();
        assert_eq!(patch.marker(), "-keep class com.reactnativecommunity.webview.** { *; }");
    }

    #[test]
    fn test_empty_rules_rejected() {
        assert!(matches!(
            rules_patch("\n# nothing\n"),
            Err(StepError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_creates_missing_file() {
        let (_dir, project) = project();
        let report = add_rules(&project, RULES).unwrap();
        assert!(report.changed());
        assert_eq!(std::fs::read_to_string(project.proguard_rules()).unwrap(), RULES);
    }

    #[test]
    fn test_appends_once() {
        let (_dir, project) = project();
        let existing = "# Add project specific ProGuard rules here.\n-dontwarn okio.**";
        std::fs::write(project.proguard_rules(), existing).unwrap();

        add_rules(&project, RULES).unwrap();
        let report = add_rules(&project, RULES).unwrap();
        assert!(!report.changed());

        let content = std::fs::read_to_string(project.proguard_rules()).unwrap();
        assert_eq!(content, format!("{}\n{}", existing, RULES));
    }
}
