//! Interactive workflows using cliclack (Charm-style inline prompts)
//!
//! This module is optional and only available when the `tui` feature is enabled.

mod prompts;
mod reporter;

pub use prompts::{
    run, run_asset, run_module, run_patch, run_sign, AssetArgs, CreateArgs, ModuleArgs, PatchArgs,
    SignArgs,
};
pub use reporter::CliclackReporter;
