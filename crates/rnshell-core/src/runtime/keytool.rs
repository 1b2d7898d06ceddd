//! keytool discovery and keystore generation

use super::tool::ToolCommand;
use crate::android::SigningConfig;
use crate::error::{StepError, StepResult};
use crate::ident::IdentSpec;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

const STOREPASS_ENV: &str = "RNSHELL_STOREPASS";
const KEYPASS_ENV: &str = "RNSHELL_KEYPASS";

fn keytool_exe() -> &'static str {
    if cfg!(windows) {
        "keytool.exe"
    } else {
        "keytool"
    }
}

/// Places keytool usually lives when it is not on PATH, most specific first
pub fn keytool_candidates(java_home: Option<&Path>, home: Option<&Path>) -> Vec<PathBuf> {
    let exe = keytool_exe();
    let mut candidates = Vec::new();

    if let Some(java_home) = java_home {
        candidates.push(java_home.join("bin").join(exe));
    }

    if cfg!(target_os = "macos") {
        candidates.push(PathBuf::from(
            "/Applications/Android Studio.app/Contents/jbr/Contents/Home/bin/keytool",
        ));
    } else if cfg!(windows) {
        candidates.push(PathBuf::from(
            r"C:\Program Files\Android\Android Studio\jbr\bin\keytool.exe",
        ));
    } else {
        candidates.push(PathBuf::from("/opt/android-studio/jbr/bin/keytool"));
    }

    if let Some(home) = home {
        candidates.push(home.join("android-studio").join("jbr").join("bin").join(exe));
    }

    if !cfg!(windows) {
        candidates.push(PathBuf::from("/usr/bin/keytool"));
        candidates.push(PathBuf::from("/usr/local/bin/keytool"));
    }

    candidates
}

/// JDKs installed under the usual Windows location
fn program_files_jdks() -> Vec<PathBuf> {
    if !cfg!(windows) {
        return Vec::new();
    }

    [r"C:\Program Files\Java", r"C:\Program Files (x86)\Java"]
        .iter()
        .filter_map(|root| std::fs::read_dir(root).ok())
        .flat_map(|entries| entries.filter_map(Result::ok))
        .filter(|e| e.file_name().to_string_lossy().starts_with("jdk"))
        .map(|e| e.path().join("bin").join("keytool.exe"))
        .collect()
}

/// keytool on PATH, or the first existing candidate
pub fn find_keytool() -> Option<PathBuf> {
    if Command::new("keytool").arg("-help").output().is_ok() {
        return Some(PathBuf::from("keytool"));
    }

    let java_home = std::env::var_os("JAVA_HOME").map(PathBuf::from);
    let home = dirs::home_dir();
    let found = keytool_candidates(java_home.as_deref(), home.as_deref())
        .into_iter()
        .chain(program_files_jdks())
        .find(|p| p.is_file());

    match &found {
        Some(path) => tracing::debug!(path = %path.display(), "found keytool"),
        None => tracing::debug!("keytool not found"),
    }
    found
}

/// Parameters for `keytool -genkeypair`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeystoreRequest {
    pub path: PathBuf,
    pub alias: String,
    pub store_password: String,
    pub key_password: String,
    pub distinguished_name: String,
    pub validity_days: u32,
    pub key_size: u32,
}

impl KeystoreRequest {
    /// Random keystore file name, alias and password inside `dir`
    pub fn random<R: Rng>(dir: &Path, distinguished_name: impl Into<String>, rng: &mut R) -> Self {
        let names = IdentSpec::lowercase(3, 8);
        let password = IdentSpec::alphanumeric(12, 16).generate(rng);
        Self {
            path: dir.join(format!("{}.jks", names.generate(rng))),
            alias: names.generate(rng),
            key_password: password.clone(),
            store_password: password,
            distinguished_name: distinguished_name.into(),
            validity_days: 10_000,
            key_size: 2048,
        }
    }

    /// Arguments after the program name. Passwords are read by keytool from
    /// the environment, not the command line.
    pub fn args(&self) -> Vec<String> {
        vec![
            "-genkeypair".into(),
            "-v".into(),
            "-keystore".into(),
            self.path.display().to_string(),
            "-alias".into(),
            self.alias.clone(),
            "-keyalg".into(),
            "RSA".into(),
            "-keysize".into(),
            self.key_size.to_string(),
            "-validity".into(),
            self.validity_days.to_string(),
            "-storepass:env".into(),
            STOREPASS_ENV.into(),
            "-keypass:env".into(),
            KEYPASS_ENV.into(),
            "-dname".into(),
            self.distinguished_name.clone(),
        ]
    }

    pub fn command(&self, keytool: &Path) -> ToolCommand {
        ToolCommand::new(keytool.display().to_string())
            .args(self.args())
            .env(STOREPASS_ENV, self.store_password.clone())
            .env(KEYPASS_ENV, self.key_password.clone())
    }

    /// Signing config referencing this keystore from `app_dir`
    pub fn signing_config(&self, app_dir: &Path) -> SigningConfig {
        let store_file = self
            .path
            .strip_prefix(app_dir)
            .unwrap_or(&self.path)
            .to_string_lossy()
            .replace('\\', "/");
        SigningConfig {
            store_file,
            store_password: self.store_password.clone(),
            key_alias: self.alias.clone(),
            key_password: self.key_password.clone(),
        }
    }

    /// Run keytool. An existing keystore at `path` is never overwritten.
    pub async fn generate(&self, limit: Duration) -> StepResult<()> {
        if self.path.exists() {
            return Err(StepError::InvalidInput(format!(
                "keystore {} already exists",
                self.path.display()
            )));
        }

        let keytool = find_keytool().ok_or_else(|| StepError::ToolMissing {
            tool: "keytool".into(),
            hint: super::install_hint("keytool").into(),
        })?;
        self.command(&keytool).run(limit).await
    }
}
