//! `android/app/build.gradle` patches

use super::AndroidProject;
use crate::error::{StepError, StepResult};
use crate::patch::{
    edit_file, patch_file, remove_blocks, replace_in_block, Anchor, FilePatchReport, Patch,
    PatchError, Syntax,
};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Legacy RN config that switches release builds to an indexed RAM bundle
pub const RAM_BUNDLE_CONFIG: &str = r#"project.ext.react = [
    entryFile      : "index.js",
    bundleAssetName: "index.android.bundle",
    bundleCommand  : "ram-bundle",
    extraPackagerArgs: ["--indexed-ram-bundle"],
    enableHermes   : false
]

"#;

/// A Maven coordinate added to the `dependencies { }` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradleDependency {
    pub configuration: String,
    pub group: String,
    pub artifact: String,
    pub version: Option<String>,
}

impl GradleDependency {
    /// Marker used to detect the dependency regardless of quoting style.
    ///
    /// With a version this ends in `:` so `activity` does not match
    /// `activity-ktx`.
    pub fn marker(&self) -> String {
        match &self.version {
            Some(_) => format!("{}:{}:", self.group, self.artifact),
            None => format!("{}:{}", self.group, self.artifact),
        }
    }

    pub fn patch(&self) -> Patch {
        Patch::new(
            self.marker(),
            format!("    {}(\"{}\")\n", self.configuration, self),
            Anchor::BlockEnd("dependencies".into()),
        )
    }
}

impl fmt::Display for GradleDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group, self.artifact)?;
        if let Some(version) = &self.version {
            write!(f, ":{}", version)?;
        }
        Ok(())
    }
}

impl FromStr for GradleDependency {
    type Err = StepError;

    /// Parses `group:artifact[:version]`, optionally prefixed with a
    /// configuration: `testImplementation group:artifact:version`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (configuration, coordinate) = match s.split_once(char::is_whitespace) {
            Some((conf, coord)) => (conf.to_string(), coord.trim()),
            None => ("implementation".to_string(), s),
        };

        let parts: Vec<&str> = coordinate.split(':').collect();
        let valid = (2..=3).contains(&parts.len()) && parts.iter().all(|p| !p.is_empty());
        if !valid {
            return Err(StepError::InvalidInput(format!(
                "'{}' is not a group:artifact[:version] coordinate",
                s
            )));
        }

        Ok(Self {
            configuration,
            group: parts[0].to_string(),
            artifact: parts[1].to_string(),
            version: parts.get(2).map(|v| v.to_string()),
        })
    }
}

/// Add dependencies at the end of the `dependencies { }` block
pub fn add_dependencies(
    project: &AndroidProject,
    deps: &[GradleDependency],
) -> StepResult<FilePatchReport> {
    let patches: Vec<Patch> = deps.iter().map(GradleDependency::patch).collect();
    patch_file(&project.app_gradle(), &patches)
}

/// Keystore data referenced from `signingConfigs`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningConfig {
    /// Keystore path relative to `android/app`
    pub store_file: String,
    pub store_password: String,
    pub key_alias: String,
    pub key_password: String,
}

impl SigningConfig {
    fn entry(&self, name: &str) -> String {
        format!(
            "        {} {{\n            storeFile file({})\n            storePassword {}\n            keyAlias {}\n            keyPassword {}\n        }}\n",
            name,
            groovy_quote(&self.store_file),
            groovy_quote(&self.store_password),
            groovy_quote(&self.key_alias),
            groovy_quote(&self.key_password),
        )
    }

    /// `signingConfigs { debug {...} release {...} }` with this keystore
    pub fn block(&self) -> String {
        format!(
            "    signingConfigs {{\n{}{}    }}\n",
            self.entry("debug"),
            self.entry("release")
        )
    }

    fn marker(&self) -> String {
        format!("storeFile file({})", groovy_quote(&self.store_file))
    }
}

/// Replace any existing `signingConfigs` with one pointing at `config`, and
/// make the release build type use it.
pub fn apply_signing<'a>(
    text: &'a str,
    config: &SigningConfig,
) -> Result<Cow<'a, str>, PatchError> {
    let block = config.block();
    let text = if text.contains(&block) {
        Cow::Borrowed(text)
    } else {
        let without = remove_blocks(text, "signingConfigs", Syntax::CLike)?;
        let patch = Patch::new(config.marker(), block, Anchor::BlockStart("android".into()));
        Cow::Owned(patch.apply(&without)?.into_owned())
    };

    let release = match replace_in_block(
        &text,
        &["buildTypes", "release"],
        "signingConfigs.debug",
        "signingConfigs.release",
        Syntax::CLike,
    ) {
        Ok(Cow::Owned(updated)) => Some(updated),
        Ok(Cow::Borrowed(_)) => None,
        Err(PatchError::AnchorNotFound(_)) => {
            tracing::warn!("no buildTypes.release block, release signing left as is");
            None
        }
        Err(e) => return Err(e),
    };

    Ok(match release {
        Some(updated) => Cow::Owned(updated),
        None => text,
    })
}

/// Write the signing configuration into the app build script
pub fn configure_signing(project: &AndroidProject, config: &SigningConfig) -> StepResult<bool> {
    edit_file(&project.app_gradle(), |text| apply_signing(text, config))
}

/// Prepend the RAM bundle configuration
pub fn enable_ram_bundle(project: &AndroidProject) -> StepResult<FilePatchReport> {
    let patch = Patch::new("project.ext.react", RAM_BUNDLE_CONFIG, Anchor::StartOfFile);
    patch_file(&project.app_gradle(), &[patch])
}

/// Single-quoted Groovy string literal
fn groovy_quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}
