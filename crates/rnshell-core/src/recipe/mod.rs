//! Recipes: the fixed content a shell project is patched with
//!
//! A recipe is a YAML document listing npm dependencies, Android permissions,
//! Gradle coordinates, ProGuard rules and optional custom patches. The
//! built-in recipe is compiled into the binary; others come from a local file
//! or a URL (see [`RecipeSource`]).

pub mod source;
pub mod version;

use crate::android::GradleDependency;
use crate::error::{StepError, StepResult};
use crate::patch::{Anchor, Patch, Syntax};
use crate::template::DEFAULT_RECIPE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, PathBuf};

pub use source::{RecipeSource, RECIPE_URL_ENV};
pub use version::{check_compatibility, parse_version};

fn default_init_package() -> String {
    "@react-native-community/cli".to_string()
}

/// A recipe document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Oldest CLI version the recipe was written for
    #[serde(default)]
    pub min_cli_version: Option<String>,

    /// Executables that must be on PATH before `create`
    #[serde(default)]
    pub required_tools: Vec<String>,

    /// npm package providing `init`
    #[serde(default = "default_init_package")]
    pub init_package: String,

    /// Merged into `package.json` `dependencies`
    #[serde(default)]
    pub npm_dependencies: BTreeMap<String, String>,

    #[serde(default)]
    pub permissions: Vec<String>,

    /// Activity classes declared inside `<application>`
    #[serde(default)]
    pub activities: Vec<String>,

    /// `group:artifact[:version]` coordinates
    #[serde(default)]
    pub gradle_dependencies: Vec<String>,

    #[serde(default)]
    pub proguard_rules: Option<String>,

    /// Prepend `project.ext.react` RAM bundle settings
    #[serde(default)]
    pub ram_bundle: bool,

    #[serde(default)]
    pub patches: Vec<CustomPatch>,
}

impl Recipe {
    pub fn parse(yaml: &str) -> Result<Self> {
        let recipe: Recipe = serde_yaml::from_str(yaml).context("Invalid recipe YAML")?;
        recipe.validate()?;
        Ok(recipe)
    }

    /// The recipe compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::parse(DEFAULT_RECIPE)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("Recipe name must not be empty");
        }
        self.gradle_dependencies()?;
        for patch in &self.patches {
            patch.validate()?;
        }
        Ok(())
    }

    pub fn gradle_dependencies(&self) -> StepResult<Vec<GradleDependency>> {
        self.gradle_dependencies.iter().map(|d| d.parse()).collect()
    }

    /// Warning when this CLI is older than `min_cli_version`
    pub fn compatibility_warning(&self, cli_version: &str) -> Option<String> {
        let min = self.min_cli_version.as_deref()?;
        check_compatibility(cli_version, min, "cargo install rnshell --force")
    }
}

/// An extra marker-guarded patch applied to a project file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPatch {
    /// Path relative to the project root
    pub file: PathBuf,
    pub marker: String,
    pub template: String,
    /// `end_of_file`, or a single-key map such as `block_end: defaultConfig`
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub anchor: Anchor,
    #[serde(default)]
    pub syntax: Syntax,
}

impl CustomPatch {
    fn validate(&self) -> Result<()> {
        if self.marker.is_empty() || !self.template.contains(&self.marker) {
            anyhow::bail!(
                "Patch for {} must have a marker contained in its template",
                self.file.display()
            );
        }
        let inside_project = self
            .file
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !inside_project || self.file.as_os_str().is_empty() {
            anyhow::bail!(
                "Patch file {} must be a relative path inside the project",
                self.file.display()
            );
        }
        Ok(())
    }

    pub fn to_patch(&self) -> Patch {
        Patch::new(self.marker.clone(), self.template.clone(), self.anchor.clone())
            .with_syntax(self.syntax)
    }
}

impl TryFrom<&CustomPatch> for Patch {
    type Error = StepError;

    fn try_from(custom: &CustomPatch) -> Result<Self, Self::Error> {
        custom
            .validate()
            .map_err(|e| StepError::InvalidInput(e.to_string()))?;
        Ok(custom.to_patch())
    }
}
