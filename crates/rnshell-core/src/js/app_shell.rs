//! `App.tsx` WebView shell

use crate::error::{StepError, StepResult};
use crate::patch::TextFile;
use crate::template::{render, APP_TSX};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// Marker telling an existing `App.tsx` is already a WebView shell
pub const SHELL_MARKER: &str = "react-native-webview";

const ORIENTATION_IMPORT: &str = "import Orientation from 'react-native-orientation-locker';\n";

/// Screen orientation the shell locks to on start
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
    Unlocked,
}

impl Orientation {
    fn lock_call(self) -> Option<&'static str> {
        match self {
            Orientation::Landscape => Some("lockToLandscape"),
            Orientation::Portrait => Some("lockToPortrait"),
            Orientation::Unlocked => None,
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
            Orientation::Unlocked => "unlocked",
        };
        f.write_str(name)
    }
}

/// A full-screen WebView pointing at `url`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppShell {
    pub url: Url,
    pub orientation: Orientation,
}

impl AppShell {
    /// Parse and check the URL; only http(s) is accepted
    pub fn new(url: &str, orientation: Orientation) -> StepResult<Self> {
        let url = Url::parse(url.trim())
            .map_err(|e| StepError::InvalidInput(format!("invalid URL '{}': {}", url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(StepError::InvalidInput(format!(
                "URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        Ok(Self { url, orientation })
    }

    pub fn render(&self) -> String {
        let (import, lock) = match self.orientation.lock_call() {
            Some(call) => (ORIENTATION_IMPORT.to_string(), format!("    Orientation.{}();\n", call)),
            None => (String::new(), String::new()),
        };
        // The URL sits in a single-quoted TS literal
        let url = self.url.as_str().replace('\'', "%27");

        render(
            APP_TSX,
            &[
                ("ORIENTATION_IMPORT", import.as_str()),
                ("ORIENTATION_LOCK", lock.as_str()),
                ("URL", url.as_str()),
            ],
        )
    }
}

/// Write `<root>/App.tsx` unless it already hosts a WebView.
///
/// Returns the path when the file was written.
pub fn write_app_shell(root: &Path, shell: &AppShell) -> StepResult<Option<PathBuf>> {
    let path = root.join("App.tsx");

    if path.is_file() {
        let existing = TextFile::read(&path)?;
        if existing.content.contains(SHELL_MARKER) {
            tracing::debug!(path = %path.display(), "App.tsx already hosts a WebView");
            return Ok(None);
        }
    }

    std::fs::write(&path, shell.render()).map_err(|e| StepError::io(&path, e))?;
    tracing::info!(path = %path.display(), url = %shell.url, orientation = %shell.orientation, "App.tsx written");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_landscape_render() {
        let shell = AppShell::new("https://example.com/play", Orientation::Landscape).unwrap();
        let out = shell.render();
        assert!(out.contains(ORIENTATION_IMPORT));
        assert!(out.contains("useEffect(() => {\n    Orientation.lockToLandscape();\n  }, []);"));
        assert!(out.contains("uri: 'https://example.com/play',"));
        assert!(!out.contains("{{ORIENTATION"));
    }

    #[test]
    fn test_unlocked_has_no_orientation_code() {
        let shell = AppShell::new("https://example.com", Orientation::Unlocked).unwrap();
        let out = shell.render();
        assert!(!out.contains("Orientation"));
        assert!(out.contains("useEffect(() => {\n  }, []);"));
        assert!(out.contains("\nimport { SafeAreaView }"));
    }

    #[test]
    fn test_rejects_non_http_urls() {
        assert!(AppShell::new("ftp://example.com", Orientation::Portrait).is_err());
        assert!(AppShell::new("example.com", Orientation::Portrait).is_err());
    }

    #[test]
    fn test_quote_in_url_is_escaped() {
        let shell = AppShell::new("https://example.com/?q=it's", Orientation::Portrait).unwrap();
        assert!(!shell.render().contains("it's"));
    }

    #[test]
    fn test_write_replaces_default_app_once() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("App.tsx"), "import NewAppScreen from '@react-native/new-app-screen';\n").unwrap();
        let shell = AppShell::new("https://example.com", Orientation::Portrait).unwrap();

        assert!(write_app_shell(dir.path(), &shell).unwrap().is_some());
        let other = AppShell::new("https://other.example.com", Orientation::Portrait).unwrap();
        assert!(write_app_shell(dir.path(), &other).unwrap().is_none());

        let content = std::fs::read_to_string(dir.path().join("App.tsx")).unwrap();
        assert!(content.contains("lockToPortrait"));
        assert!(content.contains("https://example.com/"));
    }
}
