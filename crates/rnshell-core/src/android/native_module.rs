//! Java native module generation and registration in `MainApplication.kt`

use super::AndroidProject;
use crate::error::{StepError, StepResult};
use crate::ident::{package_path, validate_class_name, validate_package_name};
use crate::patch::{edit_file, Anchor, Patch, PatchError, Syntax};
use crate::template::{render, NATIVE_MODULE_JAVA, NATIVE_PACKAGE_JAVA};
use std::borrow::Cow;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Comment left by the RN template where manual packages go
pub const PACKAGES_ANCHOR: &str = "// add(MyReactNativePackage())";

const ENTRY_POINT: &str = "MainApplication.kt";

/// A native module class and its `ReactPackage`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeModule {
    pub package: String,
    pub class_name: String,
}

/// Files written and whether the entry point changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeModuleReport {
    pub sources: Vec<PathBuf>,
    pub entry_point: PathBuf,
    pub registered: bool,
}

impl NativeModule {
    pub fn new(package: impl Into<String>, class_name: impl Into<String>) -> StepResult<Self> {
        let module = Self {
            package: package.into(),
            class_name: class_name.into(),
        };
        validate_package_name(&module.package).map_err(StepError::InvalidInput)?;
        validate_class_name(&module.class_name).map_err(StepError::InvalidInput)?;
        Ok(module)
    }

    pub fn package_class(&self) -> String {
        format!("{}Package", self.class_name)
    }

    /// `(file name, contents)` for the module and its package
    pub fn sources(&self) -> [(String, String); 2] {
        let vars = [
            ("PACKAGE", self.package.as_str()),
            ("CLASS", self.class_name.as_str()),
        ];
        [
            (
                format!("{}.java", self.class_name),
                render(NATIVE_MODULE_JAVA, &vars),
            ),
            (
                format!("{}.java", self.package_class()),
                render(NATIVE_PACKAGE_JAVA, &vars),
            ),
        ]
    }

    /// Import and `add(...)` registration for `MainApplication.kt`
    pub fn register<'a>(&self, text: &'a str) -> Result<Cow<'a, str>, PatchError> {
        let import = format!("import {}.{}", self.package, self.package_class());
        let import_patch = Patch::new(
            import.clone(),
            format!("{}\n", import),
            Anchor::AfterLine("package ".into()),
        );

        let call = format!("add({}())", self.package_class());
        let indent = line_indent(text, PACKAGES_ANCHOR)
            .ok_or_else(|| PatchError::AnchorNotFound(PACKAGES_ANCHOR.to_string()))?;
        // The anchor comment itself reads `add(MyReactNativePackage())`
        let registered = text
            .lines()
            .any(|line| line.contains(&call) && !line.contains(PACKAGES_ANCHOR));

        let mut out = text.to_string();
        let imported = import_patch.apply_in_place(&mut out)?;
        if !registered {
            let at = Anchor::AfterLine(PACKAGES_ANCHOR.into()).resolve(&out, Syntax::CLike)?;
            out.insert_str(at, &format!("{}{}\n", indent, call));
        }

        Ok(if imported || !registered {
            Cow::Owned(out)
        } else {
            Cow::Borrowed(text)
        })
    }
}

/// Leading whitespace of the line holding `needle`
fn line_indent<'a>(text: &'a str, needle: &str) -> Option<&'a str> {
    let pos = text.find(needle)?;
    let line_start = text[..pos].rfind('\n').map_or(0, |nl| nl + 1);
    let line = &text[line_start..pos];
    Some(&line[..line.len() - line.trim_start().len()])
}

/// Locate `MainApplication.kt`, preferring the package directory
pub fn find_entry_point(project: &AndroidProject, app_package: Option<&str>) -> StepResult<PathBuf> {
    let java_root = project.java_root();
    if let Some(package) = app_package {
        let direct = java_root.join(package_path(package)).join(ENTRY_POINT);
        if direct.is_file() {
            return Ok(direct);
        }
    }

    WalkDir::new(&java_root)
        .into_iter()
        .filter_map(Result::ok)
        .find(|e| e.file_type().is_file() && e.file_name() == ENTRY_POINT)
        .map(|e| e.into_path())
        .ok_or_else(|| StepError::FileNotFound(java_root.join(ENTRY_POINT)))
}

/// Write the Java sources and register the package with the application
pub fn add_native_module(
    project: &AndroidProject,
    module: &NativeModule,
    app_package: Option<&str>,
) -> StepResult<NativeModuleReport> {
    let entry_point = find_entry_point(project, app_package)?;
    let dir = project.java_root().join(package_path(&module.package));
    std::fs::create_dir_all(&dir).map_err(|e| StepError::io(&dir, e))?;

    let mut sources = Vec::new();
    for (name, content) in module.sources() {
        let path = dir.join(name);
        if path.exists() {
            tracing::debug!(path = %path.display(), "native source already present");
        } else {
            std::fs::write(&path, content).map_err(|e| StepError::io(&path, e))?;
        }
        sources.push(path);
    }

    let registered = edit_file(&entry_point, |text| module.register(text))?;
    Ok(NativeModuleReport {
        sources,
        entry_point,
        registered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MAIN_APPLICATION: &str = r#"package com.example.app

import android.app.Application
import com.facebook.react.PackageList

class MainApplication : Application(), ReactApplication {

  override val reactNativeHost: ReactNativeHost =
      object : DefaultReactNativeHost(this) {
        override fun getPackages(): List<ReactPackage> =
            PackageList(this).packages.apply {
              // Packages that cannot be autolinked yet can be added manually here, for example:
              // add(MyReactNativePackage())
            }
      }
}
"#;

    fn module() -> NativeModule {
        NativeModule::new("com.example.bridge", "DeviceBridge").unwrap()
    }

    #[test]
    fn test_new_validates_names() {
        assert!(NativeModule::new("bridge", "DeviceBridge").is_err());
        assert!(NativeModule::new("com.example.bridge", "deviceBridge").is_err());
    }

    #[test]
    fn test_sources_render_names() {
        let [(module_name, module_src), (package_name, package_src)] = module().sources();
        assert_eq!(module_name, "DeviceBridge.java");
        assert_eq!(package_name, "DeviceBridgePackage.java");
        assert!(module_src.starts_with("package com.example.bridge;"));
        assert!(module_src.contains("return \"DeviceBridge\";"));
        assert!(package_src.contains("modules.add(new DeviceBridge(reactContext));"));
        assert!(!package_src.contains("{{"));
    }

    #[test]
    fn test_register_inserts_import_and_call() {
        let out = module().register(MAIN_APPLICATION).unwrap();
        assert!(out.starts_with(
            "package com.example.app\nimport com.example.bridge.DeviceBridgePackage\n"
        ));
        assert!(out.contains(
            "              // add(MyReactNativePackage())\n              add(DeviceBridgePackage())\n            }"
        ));
    }

    #[test]
    fn test_register_twice_is_noop() {
        let once = module().register(MAIN_APPLICATION).unwrap().into_owned();
        let twice = module().register(&once).unwrap();
        assert!(matches!(twice, Cow::Borrowed(_)));
    }

    #[test]
    fn test_register_class_named_like_anchor_example() {
        let module = NativeModule::new("com.example.bridge", "MyReactNative").unwrap();
        let once = module.register(MAIN_APPLICATION).unwrap().into_owned();
        assert!(once.contains("import com.example.bridge.MyReactNativePackage\n"));
        assert!(once.contains(
            "              // add(MyReactNativePackage())\n              add(MyReactNativePackage())\n"
        ));

        let twice = module.register(&once).unwrap();
        assert!(matches!(twice, Cow::Borrowed(_)));
    }

    #[test]
    fn test_register_without_anchor_fails() {
        let text = "package com.example.app\n\nclass MainApplication\n";
        let err = module().register(text).unwrap_err();
        assert_eq!(err, PatchError::AnchorNotFound(PACKAGES_ANCHOR.into()));
    }

    #[test]
    fn test_add_native_module_end_to_end() {
        let dir = TempDir::new().unwrap();
        let project = AndroidProject::new(dir.path());
        let app_dir = project.java_root().join("com").join("example").join("app");
        std::fs::create_dir_all(&app_dir).unwrap();
        std::fs::write(app_dir.join(ENTRY_POINT), MAIN_APPLICATION).unwrap();

        // Located by walking when no app package is given
        let report = add_native_module(&project, &module(), None).unwrap();
        assert!(report.registered);
        assert_eq!(report.entry_point, app_dir.join(ENTRY_POINT));
        for source in &report.sources {
            assert!(source.is_file());
        }

        let again = add_native_module(&project, &module(), Some("com.example.app")).unwrap();
        assert!(!again.registered);

        let content = std::fs::read_to_string(app_dir.join(ENTRY_POINT)).unwrap();
        assert_eq!(content.matches("add(DeviceBridgePackage())").count(), 1);
    }

    #[test]
    fn test_missing_entry_point() {
        let dir = TempDir::new().unwrap();
        let project = AndroidProject::new(dir.path());
        std::fs::create_dir_all(project.java_root()).unwrap();
        let err = add_native_module(&project, &module(), None).unwrap_err();
        assert!(matches!(err, StepError::FileNotFound(_)));
    }
}
