//! Steps: one unit of work against a project, run in order by a [`Pipeline`]

mod context;
pub mod pipeline;
pub mod plan;

use crate::android::{
    assets, gradle, layout, manifest, native_module, proguard, ActivityDecl, GradleDependency,
    NativeModule, SigningConfig,
};
use crate::error::{StepError, StepResult};
use crate::js::{self, AppShell};
use crate::patch::{patch_file, FilePatchReport, Patch};
use crate::recipe::CustomPatch;
use crate::runtime::{check_tools, KeystoreRequest, ToolCommand};
use layout::LayoutFix;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub use context::ProjectContext;
pub use pipeline::{Pipeline, PipelineError, PipelineReport, Reporter, TracingReporter};
pub use plan::{asset_plan, create_plan, module_plan, patch_plan, sign_plan, CreateOptions};

/// What a finished step did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub summary: String,
    pub details: Vec<String>,
}

impl StepOutcome {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }

    fn from_report(report: &FilePatchReport, what: &str) -> Self {
        let summary = if report.changed() {
            format!("{}: {} added", what, report.applied.len())
        } else {
            format!("{}: already up to date", what)
        };
        Self::new(summary).with_details(report.applied.clone())
    }
}

#[derive(Debug, Clone)]
pub enum Step {
    CheckTools(Vec<String>),
    /// Run `npx <cli_package> init` in the parent of the project root
    InitProject {
        name: String,
        package: String,
        cli_package: String,
    },
    MergeNpmDependencies(BTreeMap<String, String>),
    NpmInstall,
    WriteAppShell(AppShell),
    FixPackageLayout { package: String },
    AddPermissions(Vec<String>),
    AddGradleDependencies(Vec<GradleDependency>),
    AddProguardRules(String),
    EnableRamBundle,
    ApplyCustomPatch(CustomPatch),
    GenerateKeystore(KeystoreRequest),
    ConfigureSigning(SigningConfig),
    CopyAsset { source: PathBuf, name: Option<String> },
    RegisterActivity(ActivityDecl),
    AddNativeModule {
        module: NativeModule,
        app_package: Option<String>,
    },
    ValidateProject,
}

impl Step {
    pub fn title(&self) -> String {
        match self {
            Step::CheckTools(_) => "Checking required tools".into(),
            Step::InitProject { name, .. } => format!("Creating React Native project {}", name),
            Step::MergeNpmDependencies(_) => "Adding npm dependencies".into(),
            Step::NpmInstall => "Installing npm dependencies".into(),
            Step::WriteAppShell(_) => "Writing App.tsx".into(),
            Step::FixPackageLayout { .. } => "Checking Android package layout".into(),
            Step::AddPermissions(_) => "Adding Android permissions".into(),
            Step::AddGradleDependencies(_) => "Adding Gradle dependencies".into(),
            Step::AddProguardRules(_) => "Adding ProGuard rules".into(),
            Step::EnableRamBundle => "Enabling RAM bundle".into(),
            Step::ApplyCustomPatch(p) => format!("Patching {}", p.file.display()),
            Step::GenerateKeystore(_) => "Generating keystore".into(),
            Step::ConfigureSigning(_) => "Configuring release signing".into(),
            Step::CopyAsset { source, .. } => format!("Copying asset {}", source.display()),
            Step::RegisterActivity(decl) => format!("Registering activity {}", decl.name),
            Step::AddNativeModule { module, .. } => {
                format!("Adding native module {}", module.class_name)
            }
            Step::ValidateProject => "Validating project structure".into(),
        }
    }

    /// Whether the step runs an external tool that writes to the terminal
    pub fn runs_tool(&self) -> bool {
        matches!(
            self,
            Step::InitProject { .. } | Step::NpmInstall | Step::GenerateKeystore(_)
        )
    }

    pub async fn run(&self, ctx: &ProjectContext) -> StepResult<StepOutcome> {
        let android = ctx.android();

        match self {
            Step::CheckTools(names) => {
                let tools = check_tools(names)?;
                let details = tools
                    .iter()
                    .map(|t| format!("{} ({})", t.name, t.version.as_deref().unwrap_or("unknown")))
                    .collect();
                Ok(StepOutcome::new(format!("{} tools available", tools.len())).with_details(details))
            }

            Step::InitProject {
                name,
                package,
                cli_package,
            } => {
                let root = ctx.root();
                if root.exists() {
                    return Err(StepError::InvalidInput(format!(
                        "directory {} already exists",
                        root.display()
                    )));
                }
                let parent = root
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .map(|p| p.to_path_buf())
                    .unwrap_or_else(|| PathBuf::from("."));

                ToolCommand::npm("npx")
                    .args(["--yes", cli_package.as_str(), "init", name.as_str()])
                    .args(["--package-name", package.as_str(), "--skip-install"])
                    .current_dir(parent)
                    .run(ctx.tool_timeout())
                    .await?;
                Ok(StepOutcome::new(format!("Created {}", root.display())))
            }

            Step::MergeNpmDependencies(deps) => {
                let changed = js::merge_dependencies(ctx.root(), deps)?;
                let summary = if changed {
                    format!("{} dependencies in package.json", deps.len())
                } else {
                    "package.json already up to date".to_string()
                };
                Ok(StepOutcome::new(summary).with_details(deps.keys().cloned().collect()))
            }

            Step::NpmInstall => {
                ToolCommand::npm("npm")
                    .arg("install")
                    .current_dir(ctx.root())
                    .run(ctx.tool_timeout())
                    .await?;
                Ok(StepOutcome::new("npm install finished"))
            }

            Step::WriteAppShell(shell) => Ok(match js::write_app_shell(ctx.root(), shell)? {
                Some(_) => StepOutcome::new(format!("App.tsx loads {}", shell.url)),
                None => StepOutcome::new("App.tsx already hosts a WebView"),
            }),

            Step::FixPackageLayout { package } => {
                Ok(match layout::fix_package_layout(&android.java_root(), package)? {
                    LayoutFix::Missing => StepOutcome::new("No Java sources to check"),
                    LayoutFix::Healthy => StepOutcome::new("Package layout is correct"),
                    LayoutFix::Fixed { moved, from, to } => StepOutcome::new(format!(
                        "Moved {} files from {} to {}",
                        moved,
                        from.display(),
                        to.display()
                    )),
                })
            }

            Step::AddPermissions(names) => {
                let report = manifest::add_permissions(&android, names)?;
                Ok(StepOutcome::from_report(&report, "Permissions"))
            }

            Step::AddGradleDependencies(deps) => {
                let report = gradle::add_dependencies(&android, deps)?;
                Ok(StepOutcome::from_report(&report, "Gradle dependencies"))
            }

            Step::AddProguardRules(rules) => {
                let report = proguard::add_rules(&android, rules)?;
                Ok(StepOutcome::from_report(&report, "ProGuard rules"))
            }

            Step::EnableRamBundle => {
                let report = gradle::enable_ram_bundle(&android)?;
                Ok(StepOutcome::from_report(&report, "RAM bundle config"))
            }

            Step::ApplyCustomPatch(custom) => {
                let patch = Patch::try_from(custom)?;
                let report = patch_file(&ctx.root().join(&custom.file), &[patch])?;
                Ok(StepOutcome::from_report(&report, &custom.file.display().to_string()))
            }

            Step::GenerateKeystore(request) => {
                request.generate(ctx.tool_timeout()).await?;
                Ok(StepOutcome::new(format!("Keystore written to {}", request.path.display()))
                    .with_details(vec![format!("alias: {}", request.alias)]))
            }

            Step::ConfigureSigning(config) => {
                let changed = gradle::configure_signing(&android, config)?;
                let summary = if changed {
                    format!("Release builds signed with {}", config.store_file)
                } else {
                    "Signing already configured".to_string()
                };
                Ok(StepOutcome::new(summary))
            }

            Step::CopyAsset { source, name } => {
                let dest = assets::copy_asset(&android, source, name.as_deref())?;
                Ok(StepOutcome::new(format!("Copied to {}", dest.display())))
            }

            Step::RegisterActivity(decl) => {
                let report = manifest::register_activity(&android, decl)?;
                Ok(StepOutcome::from_report(&report, "Activities"))
            }

            Step::AddNativeModule {
                module,
                app_package,
            } => {
                let report =
                    native_module::add_native_module(&android, module, app_package.as_deref())?;
                let summary = if report.registered {
                    format!("{} registered in {}", module.package_class(), report.entry_point.display())
                } else {
                    format!("{} already registered", module.package_class())
                };
                let details = report.sources.iter().map(|p| p.display().to_string()).collect();
                Ok(StepOutcome::new(summary).with_details(details))
            }

            Step::ValidateProject => {
                android.validate()?;
                Ok(StepOutcome::new(format!("Android project found in {}", ctx.root().display())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_validate_step_reports_missing_android_dir() {
        let dir = TempDir::new().unwrap();
        let ctx = ProjectContext::new(dir.path());
        let err = Step::ValidateProject.run(&ctx).await.unwrap_err();
        assert!(matches!(err, StepError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_init_refuses_existing_directory() {
        let dir = TempDir::new().unwrap();
        let ctx = ProjectContext::new(dir.path());
        let step = Step::InitProject {
            name: "MyApp".into(),
            package: "com.example.app".into(),
            cli_package: "@react-native-community/cli".into(),
        };
        assert!(matches!(step.run(&ctx).await, Err(StepError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_custom_patch_step() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("android")).unwrap();
        std::fs::write(dir.path().join("android/gradle.properties"), "org.gradle.jvmargs=-Xmx2048m\n").unwrap();
        let custom = CustomPatch {
            file: "android/gradle.properties".into(),
            marker: "android.enableJetifier".into(),
            template: "android.enableJetifier=true\n".into(),
            anchor: crate::patch::Anchor::EndOfFile,
            syntax: crate::patch::Syntax::Plain,
        };
        let ctx = ProjectContext::new(dir.path());

        let first = Step::ApplyCustomPatch(custom.clone()).run(&ctx).await.unwrap();
        assert_eq!(first.details, vec!["android.enableJetifier"]);
        let second = Step::ApplyCustomPatch(custom).run(&ctx).await.unwrap();
        assert!(second.details.is_empty());
    }

    #[test]
    fn test_tool_steps() {
        assert!(Step::NpmInstall.runs_tool());
        assert!(!Step::EnableRamBundle.runs_tool());
        assert_eq!(Step::EnableRamBundle.title(), "Enabling RAM bundle");
    }
}
