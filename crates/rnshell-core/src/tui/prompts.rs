//! Charm-style workflows for each command

use super::reporter::CliclackReporter;
use crate::android::NativeModule;
use crate::error::StepError;
use crate::ident::{
    random_package_name, validate_app_name, validate_class_name, validate_identifier,
    validate_package_name,
};
use crate::js::{AppShell, Orientation};
use crate::recipe::{Recipe, RecipeSource};
use crate::runtime::{open_docs, KeystoreRequest, DEFAULT_TOOL_TIMEOUT};
use crate::steps::{
    asset_plan, create_plan, module_plan, patch_plan, sign_plan, CreateOptions, Pipeline,
    ProjectContext, Step,
};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

const USER_AGENT: &str = concat!("rnshell/", env!("CARGO_PKG_VERSION"));

const SETUP_DOCS_URL: &str = "https://reactnative.dev/docs/set-up-your-environment";

/// Arguments for `create`
#[derive(Debug, Clone, Default)]
pub struct CreateArgs {
    /// Project (and directory) name
    pub name: Option<String>,
    pub package: Option<String>,
    /// URL the WebView loads
    pub url: Option<String>,
    pub orientation: Option<Orientation>,
    /// Parent directory the project is created in
    pub directory: Option<PathBuf>,
    /// Local recipe instead of the built-in or remote one
    pub recipe: Option<PathBuf>,
    /// Skip keystore generation and signing
    pub no_sign: bool,
    /// Distinguished name for the generated key
    pub dname: Option<String>,
    pub skip_install: bool,
    pub skip_tool_check: bool,
    /// Limit for each external tool, in seconds
    pub timeout: Option<u64>,
    /// Auto-confirm all prompts (non-interactive mode)
    pub yes: bool,
}

/// Arguments for `patch`
#[derive(Debug, Clone, Default)]
pub struct PatchArgs {
    pub project: Option<PathBuf>,
    pub recipe: Option<PathBuf>,
    pub yes: bool,
}

/// Arguments for `sign`
#[derive(Debug, Clone, Default)]
pub struct SignArgs {
    pub project: Option<PathBuf>,
    pub alias: Option<String>,
    pub dname: Option<String>,
    pub timeout: Option<u64>,
    pub yes: bool,
}

/// Arguments for `module`
#[derive(Debug, Clone, Default)]
pub struct ModuleArgs {
    pub project: Option<PathBuf>,
    pub package: Option<String>,
    pub class_name: Option<String>,
    /// Application package, used to find `MainApplication.kt` directly
    pub app_package: Option<String>,
    pub yes: bool,
}

/// Arguments for `asset`
#[derive(Debug, Clone, Default)]
pub struct AssetArgs {
    pub project: Option<PathBuf>,
    pub source: Option<PathBuf>,
    pub name: Option<String>,
    pub yes: bool,
}

/// Create a WebView shell project
pub async fn run(args: CreateArgs, cli_version: &str) -> Result<()> {
    cliclack::intro("rnshell")?;

    let recipe = load_recipe(args.recipe.clone(), cli_version).await?;

    let name = text_value(
        "App name",
        args.name.clone(),
        None,
        args.yes,
        validate_app_name,
    )?;
    let package = select_package(&args)?;
    let url = text_value("URL to load", args.url.clone(), None, args.yes, |s| {
        AppShell::new(s, Orientation::default())
            .map(|_| ())
            .map_err(|e| e.to_string())
    })?;
    let orientation = select_orientation(args.orientation, args.yes)?;
    let shell = AppShell::new(&url, orientation)?;

    let parent = absolute(args.directory.as_deref().unwrap_or(Path::new(".")));
    let root = parent.join(&name);
    if root.exists() {
        anyhow::bail!("Directory {} already exists, remove it or pick another name", root.display());
    }

    let ctx = ProjectContext::new(&root).with_tool_timeout(timeout(args.timeout));
    let app_dir = ctx.android().app_dir();

    let sign = !args.no_sign
        && (args.yes
            || cliclack::confirm("Generate a release keystore and sign release builds?")
                .initial_value(true)
                .interact()?);
    let keystore = sign.then(|| {
        let dname = args.dname.clone().unwrap_or_else(|| default_dname(&name));
        KeystoreRequest::random(&app_dir, dname, &mut rand::rng())
    });

    let options = CreateOptions {
        name: name.clone(),
        package: package.clone(),
        shell,
        keystore: keystore.clone(),
        check_tools: !args.skip_tool_check,
        install: !args.skip_install,
    };
    if args.skip_tool_check {
        cliclack::log::info("Skipping tool check")?;
    }

    let steps = create_plan(&recipe, &options, &app_dir)?;
    let mut reporter = CliclackReporter::new();
    if let Err(e) = Pipeline::new(steps).run(&ctx, &mut reporter).await {
        if matches!(e.source, StepError::ToolMissing { .. }) && !args.yes {
            offer_setup_docs()?;
        }
        return Err(anyhow::Error::new(e).context("Setup stopped"));
    }

    if let Some(keystore) = &keystore {
        print_keystore(keystore)?;
    }
    print_next_steps(&root)?;
    Ok(())
}

/// Apply the recipe's patches to an existing project
pub async fn run_patch(args: PatchArgs, cli_version: &str) -> Result<()> {
    cliclack::intro("rnshell patch")?;

    let root = select_project(args.project.as_deref(), args.yes)?;
    let recipe = load_recipe(args.recipe, cli_version).await?;
    let steps = patch_plan(&recipe)?;

    run_steps(steps, &ProjectContext::new(root)).await?;
    cliclack::outro("Project patched")?;
    Ok(())
}

/// Generate a keystore and configure release signing
pub async fn run_sign(args: SignArgs) -> Result<()> {
    cliclack::intro("rnshell sign")?;

    let root = select_project(args.project.as_deref(), args.yes)?;
    let ctx = ProjectContext::new(&root).with_tool_timeout(timeout(args.timeout));
    let app_dir = ctx.android().app_dir();

    let app_name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "App".to_string());
    let dname = args.dname.clone().unwrap_or_else(|| default_dname(&app_name));
    let mut keystore = KeystoreRequest::random(&app_dir, dname, &mut rand::rng());

    if let Some(alias) = &args.alias {
        validate_identifier(alias, 3, 16).map_err(anyhow::Error::msg)?;
        keystore.alias = alias.clone();
    }

    run_steps(sign_plan(&keystore, &app_dir), &ctx).await?;
    print_keystore(&keystore)?;
    cliclack::outro("Release builds are signed")?;
    Ok(())
}

/// Generate a native module and register it with the application
pub async fn run_module(args: ModuleArgs) -> Result<()> {
    cliclack::intro("rnshell module")?;

    let root = select_project(args.project.as_deref(), args.yes)?;
    let package = text_value(
        "Module package",
        args.package.clone(),
        args.app_package.clone(),
        args.yes,
        validate_package_name,
    )?;
    let class_name = text_value(
        "Module class name",
        args.class_name.clone(),
        Some("NativeBridge".to_string()),
        args.yes,
        validate_class_name,
    )?;
    if let Some(app_package) = &args.app_package {
        validate_package_name(app_package).map_err(anyhow::Error::msg)?;
    }

    let module = NativeModule::new(package, class_name)?;
    run_steps(module_plan(module, args.app_package), &ProjectContext::new(root)).await?;
    cliclack::outro("Native module added")?;
    Ok(())
}

/// Copy a file into the Android assets directory
pub async fn run_asset(args: AssetArgs) -> Result<()> {
    cliclack::intro("rnshell asset")?;

    let root = select_project(args.project.as_deref(), args.yes)?;
    let source = text_value(
        "File to copy",
        args.source.as_ref().map(|p| p.display().to_string()),
        None,
        args.yes,
        |s| {
            if Path::new(s).is_file() {
                Ok(())
            } else {
                Err(format!("{} is not a file", s))
            }
        },
    )?;

    run_steps(
        asset_plan(absolute(Path::new(&source)), args.name),
        &ProjectContext::new(root),
    )
    .await?;
    cliclack::outro("Asset copied")?;
    Ok(())
}

async fn load_recipe(local: Option<PathBuf>, cli_version: &str) -> Result<Recipe> {
    let source = RecipeSource::from_env(local)?;

    let spinner = cliclack::spinner();
    spinner.start("Loading recipe...");

    let recipe = match source.load(USER_AGENT).await {
        Ok(recipe) => recipe,
        Err(e) => {
            spinner.error("Failed to load recipe");
            return Err(e);
        }
    };

    let origin = match &source {
        RecipeSource::Builtin => "built-in".to_string(),
        RecipeSource::Local(path) => path.display().to_string(),
        RecipeSource::Remote(url) => url.to_string(),
    };
    spinner.stop(format!("Recipe: {} ({})", recipe.name, origin));

    if let Some(warning) = recipe.compatibility_warning(cli_version) {
        cliclack::log::warning(warning)?;
    }

    Ok(recipe)
}

/// Use a flag value (validated), a default under `--yes`, or ask
fn text_value<V>(
    prompt: &str,
    provided: Option<String>,
    default: Option<String>,
    yes: bool,
    validate: V,
) -> Result<String>
where
    V: Fn(&str) -> Result<(), String> + 'static,
{
    if let Some(value) = provided {
        let value = value.trim().to_string();
        validate(&value).map_err(|e| anyhow::anyhow!("{}: {}", prompt, e))?;
        cliclack::log::info(format!("{}: {}", prompt, value))?;
        return Ok(value);
    }

    if yes {
        if let Some(value) = default {
            cliclack::log::info(format!("{}: {}", prompt, value))?;
            return Ok(value);
        }
    }

    let mut input = cliclack::input(prompt).validate(move |s: &String| validate(s.trim()));
    if let Some(value) = &default {
        input = input.default_input(value).placeholder(value);
    }
    let value: String = input.interact()?;
    Ok(value.trim().to_string())
}

fn select_package(args: &CreateArgs) -> Result<String> {
    let generated = random_package_name(&mut rand::rng());
    text_value(
        "Package name",
        args.package.clone(),
        Some(generated),
        args.yes,
        validate_package_name,
    )
}

fn select_orientation(provided: Option<Orientation>, yes: bool) -> Result<Orientation> {
    if let Some(orientation) = provided {
        return Ok(orientation);
    }
    if yes {
        return Ok(Orientation::default());
    }

    let orientation = cliclack::select("Screen orientation")
        .item(Orientation::Landscape, "Landscape", "lock to landscape")
        .item(Orientation::Portrait, "Portrait", "lock to portrait")
        .item(Orientation::Unlocked, "Unlocked", "follow the device")
        .initial_value(Orientation::default())
        .interact()?;
    Ok(orientation)
}

fn select_project(provided: Option<&Path>, yes: bool) -> Result<PathBuf> {
    let path = match provided {
        Some(path) => absolute(path),
        None if yes => absolute(Path::new(".")),
        None => {
            let input: String = cliclack::input("Project directory")
                .placeholder(".")
                .default_input(".")
                .interact()?;
            absolute(Path::new(input.trim()))
        }
    };

    if !path.is_dir() {
        anyhow::bail!("Project directory does not exist: {}", path.display());
    }
    cliclack::log::info(format!("Project: {}", path.display()))?;
    Ok(path)
}

fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let current = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    if path.as_os_str().is_empty() || path == Path::new(".") {
        current
    } else {
        current.join(path)
    }
}

/// Ask whether to open the environment setup guide
fn offer_setup_docs() -> Result<()> {
    let open = cliclack::confirm("Open the React Native environment setup guide?")
        .initial_value(true)
        .interact()?;
    if open {
        open_docs(SETUP_DOCS_URL)?;
    }
    Ok(())
}

fn timeout(secs: Option<u64>) -> Duration {
    secs.map(Duration::from_secs).unwrap_or(DEFAULT_TOOL_TIMEOUT)
}

fn default_dname(app_name: &str) -> String {
    format!("CN={}, OU=Mobile, O={}, C=US", app_name, app_name)
}

async fn run_steps(steps: Vec<Step>, ctx: &ProjectContext) -> Result<()> {
    let mut reporter = CliclackReporter::new();
    Pipeline::new(steps)
        .run(ctx, &mut reporter)
        .await
        .context("Setup stopped")?;
    Ok(())
}

fn print_keystore(keystore: &KeystoreRequest) -> Result<()> {
    cliclack::note(
        "Keystore (keep these safe)",
        format!(
            "file:     {}\nalias:    {}\npassword: {}",
            keystore.path.display(),
            keystore.alias,
            keystore.store_password
        ),
    )?;
    Ok(())
}

fn print_next_steps(root: &Path) -> Result<()> {
    let steps = [
        format!("cd {}", root.display()),
        "npx react-native run-android".to_string(),
        "npx react-native build-android --mode=release".to_string(),
    ];

    println!();
    println!("  {}", console::style("Next steps").bold());
    println!();
    for (i, step) in steps.iter().enumerate() {
        println!("  {}.  {}", i + 1, console::style(step).cyan());
    }
    println!();

    cliclack::outro("Happy shipping!")?;
    Ok(())
}
