//! Where a recipe comes from: compiled in, a local file, or a URL

use super::Recipe;
use crate::template::DEFAULT_RECIPE;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Environment variable overriding the recipe with a remote URL
pub const RECIPE_URL_ENV: &str = "RNSHELL_RECIPE_URL";

/// Limit for fetching a remote recipe, connect to last byte
pub const RECIPE_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeSource {
    Builtin,
    Local(PathBuf),
    Remote(Url),
}

impl RecipeSource {
    /// An explicit path wins, then `RNSHELL_RECIPE_URL`, then the built-in recipe
    pub fn from_env(local: Option<PathBuf>) -> Result<Self> {
        Self::resolve(local, std::env::var(RECIPE_URL_ENV).ok())
    }

    fn resolve(local: Option<PathBuf>, url: Option<String>) -> Result<Self> {
        if let Some(path) = local {
            return Ok(Self::Local(path));
        }

        match url.filter(|u| !u.trim().is_empty()) {
            Some(url) => {
                let parsed =
                    Url::parse(url.trim()).with_context(|| format!("Invalid recipe URL: {}", url))?;
                Ok(Self::Remote(parsed))
            }
            None => Ok(Self::Builtin),
        }
    }

    /// Load and parse the recipe
    pub async fn load(&self, user_agent: &str) -> Result<Recipe> {
        let (content, origin) = match self {
            RecipeSource::Builtin => (DEFAULT_RECIPE.to_string(), "built-in recipe".to_string()),
            RecipeSource::Local(path) => {
                let content = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                (content, path.display().to_string())
            }
            RecipeSource::Remote(url) => (
                fetch(url, user_agent, RECIPE_FETCH_TIMEOUT).await?,
                url.to_string(),
            ),
        };

        tracing::debug!(%origin, "loading recipe");
        Recipe::parse(&content).with_context(|| format!("Failed to parse {}", origin))
    }
}

async fn fetch(url: &Url, user_agent: &str, limit: Duration) -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .connect_timeout(limit)
        .timeout(limit)
        .build()
        .context("Failed to build HTTP client")?;

    let response = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("Failed to fetch recipe from {}", url))?;

    if !response.status().is_success() {
        anyhow::bail!(
            "Failed to fetch recipe from {}: HTTP {}",
            url,
            response.status()
        );
    }

    Ok(response.text().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolution_order() {
        let local = Some(PathBuf::from("recipe.yaml"));
        let url = Some("https://example.com/recipe.yaml".to_string());

        assert_eq!(
            RecipeSource::resolve(local.clone(), url.clone()).unwrap(),
            RecipeSource::Local(PathBuf::from("recipe.yaml"))
        );
        assert!(matches!(
            RecipeSource::resolve(None, url).unwrap(),
            RecipeSource::Remote(u) if u.host_str() == Some("example.com")
        ));
        assert_eq!(
            RecipeSource::resolve(None, Some("  ".into())).unwrap(),
            RecipeSource::Builtin
        );
        assert_eq!(RecipeSource::resolve(None, None).unwrap(), RecipeSource::Builtin);
    }

    #[test]
    fn test_invalid_url() {
        assert!(RecipeSource::resolve(None, Some("not a url".into())).is_err());
    }

    #[tokio::test]
    async fn test_stalled_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept and hold the connection without ever answering
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });

        let url = Url::parse(&format!("http://{}/recipe.yaml", addr)).unwrap();
        let started = std::time::Instant::now();
        let result = fetch(&url, "rnshell-test", Duration::from_millis(300)).await;

        assert!(result.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }

    #[tokio::test]
    async fn test_load_builtin_and_local() {
        let builtin = RecipeSource::Builtin.load("rnshell-test").await.unwrap();
        assert_eq!(builtin.name, "webview-shell");

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("recipe.yaml");
        std::fs::write(&path, "name: minimal\npermissions:\n  - android.permission.CAMERA\n").unwrap();
        let local = RecipeSource::Local(path).load("rnshell-test").await.unwrap();
        assert_eq!(local.permissions, vec!["android.permission.CAMERA"]);

        let missing = RecipeSource::Local(dir.path().join("nope.yaml")).load("rnshell-test").await;
        assert!(missing.is_err());
    }
}
