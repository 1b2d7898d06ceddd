//! rnshell CLI - WebView shell projects for React Native Android

use anyhow::Result;
use clap::{Parser, Subcommand};
use rnshell_core::js::Orientation;
use rnshell_core::tui::{AssetArgs, CreateArgs, ModuleArgs, PatchArgs, SignArgs};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the log filter
const LOG_ENV: &str = "RNSHELL_LOG";

#[derive(Parser, Debug)]
#[command(name = "rnshell")]
#[command(about = "CLI for scaffolding and patching React Native WebView shells")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new WebView shell project
    Create(CliCreateArgs),
    /// Apply a recipe's patches to an existing project
    Patch(CliPatchArgs),
    /// Generate a keystore and sign release builds
    Sign(CliSignArgs),
    /// Add a Java native module and register it
    Module(CliModuleArgs),
    /// Copy a file into the Android assets directory
    Asset(CliAssetArgs),
}

#[derive(Parser, Debug)]
pub struct CliCreateArgs {
    /// App name, also the project directory name
    pub name: Option<String>,

    /// Android package name (random when omitted with --yes)
    #[arg(short, long)]
    pub package: Option<String>,

    /// URL the WebView loads
    #[arg(short, long)]
    pub url: Option<String>,

    /// Screen orientation
    #[arg(short, long, value_enum)]
    pub orientation: Option<Orientation>,

    /// Parent directory to create the project in
    #[arg(short, long)]
    pub directory: Option<PathBuf>,

    /// Local recipe file instead of the built-in or remote one
    #[arg(long)]
    pub recipe: Option<PathBuf>,

    /// Skip keystore generation and release signing
    #[arg(long = "no-sign")]
    pub no_sign: bool,

    /// Distinguished name for the release key
    #[arg(long)]
    pub dname: Option<String>,

    /// Skip npm install
    #[arg(long = "skip-install")]
    pub skip_install: bool,

    /// Skip the node/npm/npx check
    #[arg(long = "skip-tool-check")]
    pub skip_tool_check: bool,

    /// Limit for each external tool, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Auto-confirm all prompts (non-interactive mode)
    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliCreateArgs> for CreateArgs {
    fn from(args: CliCreateArgs) -> Self {
        CreateArgs {
            name: args.name,
            package: args.package,
            url: args.url,
            orientation: args.orientation,
            directory: args.directory,
            recipe: args.recipe,
            no_sign: args.no_sign,
            dname: args.dname,
            skip_install: args.skip_install,
            skip_tool_check: args.skip_tool_check,
            timeout: args.timeout,
            yes: args.yes,
        }
    }
}

#[derive(Parser, Debug)]
pub struct CliPatchArgs {
    /// Project directory (defaults to the current one)
    pub project: Option<PathBuf>,

    /// Local recipe file
    #[arg(long)]
    pub recipe: Option<PathBuf>,

    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliPatchArgs> for PatchArgs {
    fn from(args: CliPatchArgs) -> Self {
        PatchArgs {
            project: args.project,
            recipe: args.recipe,
            yes: args.yes,
        }
    }
}

#[derive(Parser, Debug)]
pub struct CliSignArgs {
    /// Project directory (defaults to the current one)
    pub project: Option<PathBuf>,

    /// Key alias (random when omitted)
    #[arg(long)]
    pub alias: Option<String>,

    /// Distinguished name for the release key
    #[arg(long)]
    pub dname: Option<String>,

    /// Limit for keytool, in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliSignArgs> for SignArgs {
    fn from(args: CliSignArgs) -> Self {
        SignArgs {
            project: args.project,
            alias: args.alias,
            dname: args.dname,
            timeout: args.timeout,
            yes: args.yes,
        }
    }
}

#[derive(Parser, Debug)]
pub struct CliModuleArgs {
    /// Project directory (defaults to the current one)
    pub project: Option<PathBuf>,

    /// Java package of the module
    #[arg(short, long)]
    pub package: Option<String>,

    /// Module class name
    #[arg(short, long = "class")]
    pub class_name: Option<String>,

    /// Application package, to locate MainApplication.kt
    #[arg(long = "app-package")]
    pub app_package: Option<String>,

    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliModuleArgs> for ModuleArgs {
    fn from(args: CliModuleArgs) -> Self {
        ModuleArgs {
            project: args.project,
            package: args.package,
            class_name: args.class_name,
            app_package: args.app_package,
            yes: args.yes,
        }
    }
}

#[derive(Parser, Debug)]
pub struct CliAssetArgs {
    /// File to copy
    pub source: Option<PathBuf>,

    /// Project directory (defaults to the current one)
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Destination file name
    #[arg(short, long)]
    pub name: Option<String>,

    #[arg(short, long)]
    pub yes: bool,
}

impl From<CliAssetArgs> for AssetArgs {
    fn from(args: CliAssetArgs) -> Self {
        AssetArgs {
            project: args.project,
            source: args.source,
            name: args.name,
            yes: args.yes,
        }
    }
}

/// Diagnostics go to stderr, off unless RNSHELL_LOG asks for them
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var(LOG_ENV).unwrap_or_else(|_| "off".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    init_tracing();
    let args = Args::parse();

    let result = match args.command {
        Some(Command::Create(create_args)) => {
            rnshell_core::run(create_args.into(), CLI_VERSION).await
        }
        Some(Command::Patch(patch_args)) => {
            rnshell_core::run_patch(patch_args.into(), CLI_VERSION).await
        }
        Some(Command::Sign(sign_args)) => rnshell_core::run_sign(sign_args.into()).await,
        Some(Command::Module(module_args)) => rnshell_core::run_module(module_args.into()).await,
        Some(Command::Asset(asset_args)) => rnshell_core::run_asset(asset_args.into()).await,
        // No subcommand provided, default to create behavior (interactive mode)
        None => rnshell_core::run(CreateArgs::default(), CLI_VERSION).await,
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();

    result
}
