//! rnshell core - scaffolding and patching for React Native Android projects
//!
//! Creates a React Native project that renders a single full-screen WebView,
//! then edits the generated Android sources in place: manifest permissions,
//! Gradle dependencies, signing, ProGuard rules, native modules and assets.
//! Every edit is a marker-guarded [`Patch`], so running the same recipe twice
//! leaves the project unchanged.
//!
//! # Architecture
//!
//! - **Layer 1: Core Operations** - text patching ([`patch`]), Android and JS
//!   file edits ([`android`], [`js`]), recipes ([`recipe`]) and external tools
//!   ([`runtime`])
//! - **Layer 2: Workflow Orchestration** - [`Step`]s run in order by a
//!   [`Pipeline`] that reports progress to a [`Reporter`]
//! - **Layer 3: CLI/TUI Interface** - cliclack prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use rnshell_core::{patch_plan, Pipeline, ProjectContext, Recipe, TracingReporter};
//!
//! let recipe = Recipe::builtin()?;
//! let ctx = ProjectContext::new("MyApp");
//! let report = Pipeline::new(patch_plan(&recipe)?)
//!     .run(&ctx, &mut TracingReporter)
//!     .await?;
//! ```

pub mod android;
pub mod error;
pub mod ident;
pub mod js;
pub mod patch;
pub mod recipe;
pub mod runtime;
pub mod steps;
pub mod template;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use android::AndroidProject;
pub use error::{StepError, StepResult};
pub use patch::{Anchor, Patch, PatchError, Syntax};
pub use recipe::{Recipe, RecipeSource};
pub use steps::{
    asset_plan, create_plan, module_plan, patch_plan, sign_plan, Pipeline, PipelineError,
    ProjectContext, Reporter, Step, StepOutcome, TracingReporter,
};

#[cfg(feature = "tui")]
pub use tui::{run, run_asset, run_module, run_patch, run_sign};
