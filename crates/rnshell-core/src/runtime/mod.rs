//! External tools
//!
//! This module provides:
//! - PATH checks for the tools a recipe requires
//! - Subprocess execution with streamed output and a timeout
//! - keytool discovery and keystore generation

pub mod check;
pub mod keytool;
pub mod tool;

pub use check::{check_tool, check_tools, install_hint, ToolInfo};
pub use keytool::{find_keytool, keytool_candidates, KeystoreRequest};
pub use tool::{open_docs, ToolCommand, DEFAULT_TOOL_TIMEOUT};
