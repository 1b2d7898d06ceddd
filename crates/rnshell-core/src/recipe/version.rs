//! CLI version check against a recipe's `min_cli_version`

use anyhow::Result;
use semver::Version;

/// Warning text when the running CLI is older than the recipe requires.
///
/// Unparseable versions never warn.
pub fn check_compatibility(
    cli_version: &str,
    min_version: &str,
    upgrade_command: &str,
) -> Option<String> {
    let cli = parse_version(cli_version).ok()?;
    let min = parse_version(min_version).ok()?;

    (cli < min).then(|| {
        format!(
            "This recipe expects rnshell {} or newer, you are running {}.\n\
             Consider updating: {}",
            min, cli, upgrade_command
        )
    })
}

/// Parse a version, accepting a leading `v`
pub fn parse_version(version: &str) -> Result<Version> {
    let cleaned = version.trim();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);
    Version::parse(cleaned).map_err(|e| anyhow::anyhow!("Invalid version '{}': {}", version, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPGRADE: &str = "cargo install rnshell --force";

    #[test]
    fn test_older_cli_warns() {
        let warning = check_compatibility("0.1.0", "0.3.0", UPGRADE).unwrap();
        assert!(warning.contains("0.3.0"));
        assert!(warning.contains(UPGRADE));
    }

    #[test]
    fn test_same_or_newer_cli() {
        assert!(check_compatibility("0.3.0", "0.3.0", UPGRADE).is_none());
        assert!(check_compatibility("1.0.0", "v0.3.0", UPGRADE).is_none());
    }

    #[test]
    fn test_invalid_versions_are_ignored() {
        assert!(check_compatibility("dev", "0.1.0", UPGRADE).is_none());
        assert!(check_compatibility("0.1.0", "latest", UPGRADE).is_none());
    }

    #[test]
    fn test_parse_version_prefix() {
        assert_eq!(parse_version("v1.2.3").unwrap(), Version::new(1, 2, 3));
        assert!(parse_version("1.2").is_err());
    }
}
