//! AndroidManifest.xml patches

use super::AndroidProject;
use crate::error::StepResult;
use crate::patch::{patch_file, Anchor, FilePatchReport, Patch, Syntax};

/// Patch adding one `<uses-permission>` right below the `<manifest>` tag
pub fn permission_patch(name: &str) -> Patch {
    Patch::new(
        format!("android:name=\"{}\"", name),
        format!("    <uses-permission android:name=\"{}\" />\n", name),
        Anchor::AfterOpeningTag("manifest".into()),
    )
    .with_syntax(Syntax::Plain)
}

/// Add permissions to the manifest, skipping the ones already declared
pub fn add_permissions(project: &AndroidProject, names: &[String]) -> StepResult<FilePatchReport> {
    // Each insert lands directly below the opening tag, so go in reverse to
    // keep the listed order in the file.
    let patches: Vec<Patch> = names.iter().rev().map(|n| permission_patch(n)).collect();
    let mut report = patch_file(&project.manifest(), &patches)?;
    report.applied.reverse();
    report.skipped.reverse();
    Ok(report)
}

/// An `<activity>` entry for the `<application>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDecl {
    /// Fully qualified or relative (`.Foo`) class name
    pub name: String,
    pub exported: bool,
    pub config_changes: Option<String>,
    pub launch_mode: Option<String>,
}

impl ActivityDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exported: false,
            config_changes: None,
            launch_mode: None,
        }
    }

    pub fn to_xml(&self) -> String {
        let mut attrs = vec![
            format!("android:name=\"{}\"", self.name),
            format!("android:exported=\"{}\"", self.exported),
        ];
        if let Some(changes) = &self.config_changes {
            attrs.push(format!("android:configChanges=\"{}\"", changes));
        }
        if let Some(mode) = &self.launch_mode {
            attrs.push(format!("android:launchMode=\"{}\"", mode));
        }

        let attrs: String = attrs
            .iter()
            .map(|a| format!("\n            {}", a))
            .collect();
        format!("        <activity{} />\n", attrs)
    }

    pub fn patch(&self) -> Patch {
        Patch::new(
            format!("android:name=\"{}\"", self.name),
            self.to_xml(),
            Anchor::BeforeClosingTag("application".into()),
        )
        .with_syntax(Syntax::Plain)
    }
}

/// Register an activity before `</application>`
pub fn register_activity(project: &AndroidProject, decl: &ActivityDecl) -> StepResult<FilePatchReport> {
    patch_file(&project.manifest(), &[decl.patch()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StepError;
    use crate::patch::PatchError;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android">

    <uses-permission android:name="android.permission.INTERNET" />

    <application
      android:name=".MainApplication"
      android:label="@string/app_name">
      <activity
        android:name=".MainActivity"
        android:exported="true">
      </activity>
    </application>
</manifest>
"#;

    fn project_with_manifest(content: &str) -> (TempDir, AndroidProject) {
        let dir = TempDir::new().unwrap();
        let project = AndroidProject::new(dir.path());
        std::fs::create_dir_all(project.main_dir()).unwrap();
        std::fs::write(project.manifest(), content).unwrap();
        (dir, project)
    }

    #[test]
    fn test_add_permissions_keeps_order_and_skips_existing() {
        let (_dir, project) = project_with_manifest(MANIFEST);
        let names = vec![
            "android.permission.ACCESS_NETWORK_STATE".to_string(),
            "android.permission.INTERNET".to_string(),
            "com.google.android.gms.permission.AD_ID".to_string(),
        ];

        let report = add_permissions(&project, &names).unwrap();
        assert_eq!(report.applied.len(), 2);
        assert_eq!(report.skipped.len(), 1);

        let content = std::fs::read_to_string(project.manifest()).unwrap();
        assert_eq!(content.matches("android.permission.INTERNET").count(), 1);
        let network = content.find("ACCESS_NETWORK_STATE").unwrap();
        let ad_id = content.find("AD_ID").unwrap();
        assert!(network < ad_id);
        assert!(content.starts_with(
            "<manifest xmlns:android=\"http://schemas.android.com/apk/res/android\">\n    <uses-permission android:name=\"android.permission.ACCESS_NETWORK_STATE\" />\n"
        ));
    }

    #[test]
    fn test_register_activity_once() {
        let (_dir, project) = project_with_manifest(MANIFEST);
        let mut decl = ActivityDecl::new("com.example.SettingsActivity");
        decl.launch_mode = Some("singleTask".into());

        assert!(register_activity(&project, &decl).unwrap().changed());
        assert!(!register_activity(&project, &decl).unwrap().changed());

        let content = std::fs::read_to_string(project.manifest()).unwrap();
        assert_eq!(content.matches("com.example.SettingsActivity").count(), 1);
        assert!(content.contains("android:launchMode=\"singleTask\" />\n    </application>"));
    }

    #[test]
    fn test_register_activity_without_application_fails() {
        let original = "<manifest>\n</manifest>\n";
        let (_dir, project) = project_with_manifest(original);

        let err = register_activity(&project, &ActivityDecl::new(".Extra")).unwrap_err();
        assert!(matches!(
            err,
            StepError::Patch {
                source: PatchError::AnchorNotFound(_),
                ..
            }
        ));
        assert_eq!(std::fs::read_to_string(project.manifest()).unwrap(), original);
    }
}
