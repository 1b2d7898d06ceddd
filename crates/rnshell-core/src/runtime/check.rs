//! PATH checks for required executables

use crate::error::{StepError, StepResult};
use std::process::Command;

/// Result of probing one executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInfo {
    pub name: String,
    pub version: Option<String>,
    pub available: bool,
}

/// Where to get a missing tool
pub fn install_hint(name: &str) -> &'static str {
    match name {
        "node" | "npm" | "npx" => "install Node.js from https://nodejs.org",
        "keytool" | "java" => "install a JDK or set JAVA_HOME",
        "git" => "install git from https://git-scm.com",
        _ => "install it and make sure it is on PATH",
    }
}

/// Program name to spawn; npm's launchers are `.cmd` scripts on Windows
fn program(name: &str) -> String {
    if cfg!(windows) && matches!(name, "npm" | "npx") {
        format!("{}.cmd", name)
    } else {
        name.to_string()
    }
}

/// Run `<name> --version` and report what came back
pub fn check_tool(name: &str) -> ToolInfo {
    let output = Command::new(program(name)).arg("--version").output();

    match output {
        Ok(out) if out.status.success() => {
            let version = String::from_utf8_lossy(&out.stdout)
                .lines()
                .next()
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty());
            ToolInfo {
                name: name.to_string(),
                version,
                available: true,
            }
        }
        _ => ToolInfo {
            name: name.to_string(),
            version: None,
            available: false,
        },
    }
}

/// Check every tool; fail listing all the missing ones
pub fn check_tools(names: &[String]) -> StepResult<Vec<ToolInfo>> {
    let results: Vec<ToolInfo> = names.iter().map(|n| check_tool(n)).collect();
    let missing: Vec<&ToolInfo> = results.iter().filter(|t| !t.available).collect();

    if missing.is_empty() {
        for tool in &results {
            tracing::debug!(tool = %tool.name, version = ?tool.version, "tool available");
        }
        return Ok(results);
    }

    let tool = missing
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let mut hints: Vec<&str> = missing.iter().map(|t| install_hint(&t.name)).collect();
    hints.dedup();

    Err(StepError::ToolMissing {
        tool,
        hint: hints.join("; "),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool() {
        let info = check_tool("rnshell-no-such-tool");
        assert!(!info.available);
        assert!(info.version.is_none());
    }

    #[test]
    fn test_check_tools_reports_all_missing() {
        let names = vec!["rnshell-missing-a".to_string(), "rnshell-missing-b".to_string()];
        match check_tools(&names).unwrap_err() {
            StepError::ToolMissing { tool, hint } => {
                assert_eq!(tool, "rnshell-missing-a, rnshell-missing-b");
                assert_eq!(hint, "install it and make sure it is on PATH");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_list_passes() {
        assert!(check_tools(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_install_hints() {
        assert!(install_hint("npx").contains("nodejs.org"));
        assert!(install_hint("keytool").contains("JAVA_HOME"));
    }
}
