//! Android side of a React Native project
//!
//! This module provides:
//! - Path helpers for the files every step touches
//! - Manifest patches (permissions, activities)
//! - Gradle patches (dependencies, signing, RAM bundle)
//! - ProGuard rules, package layout repair, native modules, assets

pub mod assets;
pub mod gradle;
pub mod layout;
pub mod manifest;
pub mod native_module;
pub mod proguard;

use crate::error::{StepError, StepResult};
use std::path::{Path, PathBuf};

pub use gradle::{GradleDependency, SigningConfig};
pub use manifest::ActivityDecl;
pub use native_module::NativeModule;

/// The Android project inside a React Native project root
#[derive(Debug, Clone)]
pub struct AndroidProject {
    root: PathBuf,
}

impl AndroidProject {
    /// `root` is the React Native project root (the directory holding `android/`)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn android_dir(&self) -> PathBuf {
        self.root.join("android")
    }

    pub fn app_dir(&self) -> PathBuf {
        self.android_dir().join("app")
    }

    pub fn main_dir(&self) -> PathBuf {
        self.app_dir().join("src").join("main")
    }

    pub fn manifest(&self) -> PathBuf {
        self.main_dir().join("AndroidManifest.xml")
    }

    pub fn app_gradle(&self) -> PathBuf {
        self.app_dir().join("build.gradle")
    }

    pub fn proguard_rules(&self) -> PathBuf {
        self.app_dir().join("proguard-rules.pro")
    }

    pub fn java_root(&self) -> PathBuf {
        self.main_dir().join("java")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.main_dir().join("assets")
    }

    /// Check that the project has the files the patch steps rely on
    pub fn validate(&self) -> StepResult<()> {
        let android = self.android_dir();
        if !android.is_dir() {
            return Err(StepError::FileNotFound(android));
        }

        for required in [self.manifest(), self.app_gradle()] {
            if !required.is_file() {
                return Err(StepError::FileNotFound(required));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths() {
        let project = AndroidProject::new("/work/MyApp");
        assert_eq!(
            project.manifest(),
            PathBuf::from("/work/MyApp/android/app/src/main/AndroidManifest.xml")
        );
        assert_eq!(
            project.app_gradle(),
            PathBuf::from("/work/MyApp/android/app/build.gradle")
        );
        assert_eq!(
            project.assets_dir(),
            PathBuf::from("/work/MyApp/android/app/src/main/assets")
        );
    }

    #[test]
    fn test_validate_reports_first_missing_file() {
        let dir = TempDir::new().unwrap();
        let project = AndroidProject::new(dir.path());

        let err = project.validate().unwrap_err();
        assert!(matches!(err, StepError::FileNotFound(p) if p == project.android_dir()));

        std::fs::create_dir_all(project.main_dir()).unwrap();
        std::fs::write(project.manifest(), "<manifest/>").unwrap();
        let err = project.validate().unwrap_err();
        assert!(matches!(err, StepError::FileNotFound(p) if p == project.app_gradle()));

        std::fs::write(project.app_gradle(), "android {}").unwrap();
        assert!(project.validate().is_ok());
    }
}
