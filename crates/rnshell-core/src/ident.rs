//! Identifier validation and random identifier generation

use rand::Rng;
use regex::Regex;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

static APP_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_-]*$").expect("valid app name pattern"));

static PACKAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z][a-z0-9_]*(\.[a-z][a-z0-9_]*)+$").expect("valid package name pattern")
});

static CLASS_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").expect("valid class name pattern"));

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const LOWER_DIGITS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ALPHA: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Shape of a generated identifier: first character alphabetic, length within
/// `length`, remaining characters drawn from `rest`.
#[derive(Debug, Clone)]
pub struct IdentSpec {
    pub length: RangeInclusive<usize>,
    pub first: &'static [u8],
    pub rest: &'static [u8],
}

impl IdentSpec {
    /// Lowercase segment for package names (`abc`, `x9k2`)
    pub const fn package_segment() -> Self {
        Self {
            length: 3..=6,
            first: LOWER,
            rest: LOWER_DIGITS,
        }
    }

    /// Lowercase name for keystore files and key aliases
    pub const fn lowercase(min: usize, max: usize) -> Self {
        Self {
            length: min..=max,
            first: LOWER,
            rest: LOWER,
        }
    }

    /// Mixed-case alphanumeric identifier
    pub const fn alphanumeric(min: usize, max: usize) -> Self {
        Self {
            length: min..=max,
            first: ALPHA,
            rest: ALPHANUMERIC,
        }
    }

    pub fn generate<R: Rng>(&self, rng: &mut R) -> String {
        let len = rng.random_range(self.length.clone()).max(1);
        let mut out = String::with_capacity(len);
        out.push(pick(rng, self.first));
        for _ in 1..len {
            out.push(pick(rng, self.rest));
        }
        out
    }

    /// Whether `value` satisfies these rules
    pub fn accepts(&self, value: &str) -> bool {
        let mut bytes = value.bytes();
        self.length.contains(&value.len())
            && bytes.next().is_some_and(|b| self.first.contains(&b))
            && bytes.all(|b| self.rest.contains(&b))
    }
}

fn pick<R: Rng>(rng: &mut R, alphabet: &[u8]) -> char {
    char::from(alphabet[rng.random_range(0..alphabet.len())])
}

/// Random three-level package name: `com.<segment>.<segment>`
pub fn random_package_name<R: Rng>(rng: &mut R) -> String {
    let spec = IdentSpec::package_segment();
    format!("com.{}.{}", spec.generate(rng), spec.generate(rng))
}

/// Letters, digits, `_` and `-`, starting with a letter
pub fn validate_app_name(name: &str) -> Result<(), String> {
    if APP_NAME.is_match(name) {
        Ok(())
    } else {
        Err("App name may only contain letters, digits, '_' and '-', and must start with a letter".to_string())
    }
}

/// Lowercase dotted name with at least two segments, e.g. `com.company.app`
pub fn validate_package_name(name: &str) -> Result<(), String> {
    if PACKAGE_NAME.is_match(name) {
        Ok(())
    } else {
        Err("Package name must look like com.company.app (lowercase segments starting with a letter)".to_string())
    }
}

/// Java class name in UpperCamelCase
pub fn validate_class_name(name: &str) -> Result<(), String> {
    if CLASS_NAME.is_match(name) {
        Ok(())
    } else {
        Err("Class name must start with an uppercase letter and contain only letters and digits".to_string())
    }
}

/// Alphanumeric identifier with a length in `[min, max]`
pub fn validate_identifier(value: &str, min: usize, max: usize) -> Result<(), String> {
    let alphanumeric = value.chars().all(|c| c.is_ascii_alphanumeric());
    if alphanumeric && (min..=max).contains(&value.len()) {
        Ok(())
    } else {
        Err(format!(
            "Identifier must be {}-{} alphanumeric characters",
            min, max
        ))
    }
}

/// Directory path for a package: `com.company.app` -> `com/company/app`
pub fn package_path(package: &str) -> std::path::PathBuf {
    package.split('.').collect()
}
