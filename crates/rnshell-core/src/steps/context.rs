use crate::android::AndroidProject;
use crate::runtime::DEFAULT_TOOL_TIMEOUT;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The project every step works on. Steps never change the process working
/// directory; all paths derive from `root`.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    root: PathBuf,
    tool_timeout: Duration,
}

impl ProjectContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = timeout;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tool_timeout(&self) -> Duration {
        self.tool_timeout
    }

    pub fn android(&self) -> AndroidProject {
        AndroidProject::new(&self.root)
    }
}
