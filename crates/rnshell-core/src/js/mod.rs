//! JavaScript side of a React Native project

pub mod app_shell;
pub mod package_json;

pub use app_shell::{write_app_shell, AppShell, Orientation};
pub use package_json::{merge_dependencies, merge_dependencies_text};
