//! Step lists for each command

use super::Step;
use crate::android::{ActivityDecl, NativeModule};
use crate::error::StepResult;
use crate::js::AppShell;
use crate::recipe::Recipe;
use crate::runtime::KeystoreRequest;
use std::path::{Path, PathBuf};

/// Inputs of `create`
#[derive(Debug, Clone)]
pub struct CreateOptions {
    pub name: String,
    pub package: String,
    pub shell: AppShell,
    /// Keystore to generate and wire into the release build
    pub keystore: Option<KeystoreRequest>,
    pub check_tools: bool,
    pub install: bool,
}

/// Patches a recipe applies to an existing project
pub fn patch_plan(recipe: &Recipe) -> StepResult<Vec<Step>> {
    let mut steps = vec![Step::ValidateProject];

    if !recipe.permissions.is_empty() {
        steps.push(Step::AddPermissions(recipe.permissions.clone()));
    }
    steps.extend(
        recipe
            .activities
            .iter()
            .map(|name| Step::RegisterActivity(ActivityDecl::new(name.clone()))),
    );
    let deps = recipe.gradle_dependencies()?;
    if !deps.is_empty() {
        steps.push(Step::AddGradleDependencies(deps));
    }
    if let Some(rules) = recipe.proguard_rules.as_deref().filter(|r| !r.trim().is_empty()) {
        steps.push(Step::AddProguardRules(rules.to_string()));
    }
    if recipe.ram_bundle {
        steps.push(Step::EnableRamBundle);
    }
    steps.extend(recipe.patches.iter().cloned().map(Step::ApplyCustomPatch));

    Ok(steps)
}

/// Full project creation: init, JS shell, Android patches, optional signing
pub fn create_plan(recipe: &Recipe, options: &CreateOptions, app_dir: &Path) -> StepResult<Vec<Step>> {
    let mut steps = Vec::new();

    if options.check_tools && !recipe.required_tools.is_empty() {
        steps.push(Step::CheckTools(recipe.required_tools.clone()));
    }
    steps.push(Step::InitProject {
        name: options.name.clone(),
        package: options.package.clone(),
        cli_package: recipe.init_package.clone(),
    });
    if !recipe.npm_dependencies.is_empty() {
        steps.push(Step::MergeNpmDependencies(recipe.npm_dependencies.clone()));
    }
    if options.install {
        steps.push(Step::NpmInstall);
    }
    steps.push(Step::WriteAppShell(options.shell.clone()));
    steps.push(Step::FixPackageLayout {
        package: options.package.clone(),
    });
    steps.extend(patch_plan(recipe)?);

    if let Some(keystore) = &options.keystore {
        steps.extend(sign_plan(keystore, app_dir).into_iter().skip(1));
    }

    Ok(steps)
}

/// Generate a keystore and point the release build at it
pub fn sign_plan(keystore: &KeystoreRequest, app_dir: &Path) -> Vec<Step> {
    vec![
        Step::ValidateProject,
        Step::GenerateKeystore(keystore.clone()),
        Step::ConfigureSigning(keystore.signing_config(app_dir)),
    ]
}

pub fn module_plan(module: NativeModule, app_package: Option<String>) -> Vec<Step> {
    vec![
        Step::ValidateProject,
        Step::AddNativeModule {
            module,
            app_package,
        },
    ]
}

pub fn asset_plan(source: PathBuf, name: Option<String>) -> Vec<Step> {
    vec![Step::ValidateProject, Step::CopyAsset { source, name }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::js::Orientation;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn titles(steps: &[Step]) -> Vec<String> {
        steps.iter().map(Step::title).collect()
    }

    #[test]
    fn test_patch_plan_from_builtin() {
        let recipe = Recipe::builtin().unwrap();
        let steps = patch_plan(&recipe).unwrap();
        assert_eq!(
            titles(&steps),
            vec![
                "Validating project structure",
                "Adding Android permissions",
                "Adding Gradle dependencies",
                "Adding ProGuard rules",
            ]
        );
    }

    #[test]
    fn test_patch_plan_skips_empty_sections() {
        let recipe = Recipe::parse("name: bare\nram_bundle: true\n").unwrap();
        let steps = patch_plan(&recipe).unwrap();
        assert_eq!(
            titles(&steps),
            vec!["Validating project structure", "Enabling RAM bundle"]
        );
    }

    #[test]
    fn test_patch_plan_registers_activities() {
        let recipe = Recipe::parse("name: extra\nactivities:\n  - .SplashActivity\n").unwrap();
        let steps = patch_plan(&recipe).unwrap();
        assert_eq!(steps.len(), 2);
        assert!(matches!(
            &steps[1],
            Step::RegisterActivity(decl) if decl.name == ".SplashActivity"
        ));
    }

    #[test]
    fn test_create_plan_order() {
        let recipe = Recipe::builtin().unwrap();
        let app_dir = Path::new("/work/MyApp/android/app");
        let mut rng = StdRng::seed_from_u64(3);
        let options = CreateOptions {
            name: "MyApp".into(),
            package: "com.example.app".into(),
            shell: AppShell::new("https://example.com", Orientation::Landscape).unwrap(),
            keystore: Some(KeystoreRequest::random(app_dir, "CN=MyApp", &mut rng)),
            check_tools: true,
            install: true,
        };

        let steps = create_plan(&recipe, &options, app_dir).unwrap();
        let titles = titles(&steps);
        assert_eq!(titles.first().unwrap(), "Checking required tools");
        assert_eq!(titles[1], "Creating React Native project MyApp");
        assert_eq!(titles.last().unwrap(), "Configuring release signing");
        // Validation appears once, ahead of the Android patches
        assert_eq!(
            titles.iter().filter(|t| *t == "Validating project structure").count(),
            1
        );
        let install = titles.iter().position(|t| t == "Installing npm dependencies").unwrap();
        let shell = titles.iter().position(|t| t == "Writing App.tsx").unwrap();
        assert!(install < shell);
    }

    #[test]
    fn test_create_plan_without_extras() {
        let recipe = Recipe::builtin().unwrap();
        let options = CreateOptions {
            name: "MyApp".into(),
            package: "com.example.app".into(),
            shell: AppShell::new("https://example.com", Orientation::Unlocked).unwrap(),
            keystore: None,
            check_tools: false,
            install: false,
        };
        let titles = titles(&create_plan(&recipe, &options, Path::new("android/app")).unwrap());
        assert_eq!(titles[0], "Creating React Native project MyApp");
        assert!(!titles.iter().any(|t| t.contains("npm dependencies") && t.starts_with("Installing")));
        assert!(!titles.iter().any(|t| t.contains("signing")));
    }
}
