// ABOUTME: Configuration file loading, validation, and hierarchical merging for img64
// ABOUTME: Reads TOML config files from the home, XDG and project config locations

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub parent_path: Option<PathBuf>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub allow_remote: Option<bool>,
    #[serde(default, rename = "unsafe")]
    pub unsafe_html: Option<bool>,
    #[serde(default)]
    pub xhtml: Option<bool>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default, deserialize_with = "validate_size")]
    pub max_image_size: Option<String>,
}

impl Config {
    /// Load the standard config files, then `explicit` if given.
    ///
    /// Standard files that are missing or broken are skipped; an explicit
    /// file must load.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::load_from_paths(&Self::get_config_paths());

        if let Some(path) = explicit {
            config = config.merge(Self::load_from_file(path)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file paths in order; later paths override earlier ones
    pub fn load_from_paths(paths: &[PathBuf]) -> Self {
        let mut config = Config::default();

        for path in paths {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(path) {
                Ok(file_config) => config = config.merge(file_config),
                Err(e) => log::warn!("Ignoring config file {}: {:#}", path.display(), e),
            }
        }

        config
    }

    /// Load configuration from a single file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "Failed to parse TOML config file: {}",
                path.as_ref().display()
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Standard config file paths, lowest precedence first
    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. User config directory fallback
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".config").join("img64").join("config.toml"));
        }

        // 2. XDG config home
        if let Some(config_home) = std::env::var_os("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(config_home).join("img64").join("config.toml"));
        }

        // 3. Project-specific config (highest precedence)
        if let Ok(current_dir) = std::env::current_dir() {
            paths.push(current_dir.join("img64.toml"));
        }

        paths
    }

    /// Merge this config with another, giving precedence to the other config
    pub fn merge(self, other: Config) -> Config {
        // a location set by `other` replaces both location settings of `self`
        let (parent_path, base_url) = if other.parent_path.is_some() || other.base_url.is_some() {
            (other.parent_path, other.base_url)
        } else {
            (self.parent_path, self.base_url)
        };

        Config {
            parent_path,
            base_url,
            allow_remote: other.allow_remote.or(self.allow_remote),
            unsafe_html: other.unsafe_html.or(self.unsafe_html),
            xhtml: other.xhtml.or(self.xhtml),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
            max_image_size: other.max_image_size.or(self.max_image_size),
        }
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        if self.parent_path.is_some() && self.base_url.is_some() {
            return Err(anyhow!(
                "parent_path and base_url cannot both be set; choose one way to resolve images"
            ));
        }

        if let Some(ref base_url) = self.base_url {
            url::Url::parse(base_url)
                .with_context(|| format!("Invalid base_url '{}'", base_url))?;
        }

        if self.timeout_secs == Some(0) {
            return Err(anyhow!("timeout_secs must be greater than zero"));
        }

        Ok(())
    }

    /// Maximum image size in bytes, if configured
    pub fn max_image_size_bytes(&self) -> Option<u64> {
        self.max_image_size.as_deref().and_then(parse_size)
    }
}

/// Parses sizes like `500KB`, `10MB`, `1GB` or a plain byte count
pub fn parse_size(value: &str) -> Option<u64> {
    let value = value.trim().to_uppercase();

    let (number_part, unit) = if value.ends_with("MB") {
        (value.trim_end_matches("MB"), 1024 * 1024)
    } else if value.ends_with("KB") {
        (value.trim_end_matches("KB"), 1024)
    } else if value.ends_with("GB") {
        (value.trim_end_matches("GB"), 1024 * 1024 * 1024)
    } else {
        (value.as_str(), 1)
    };

    number_part
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(unit))
}

// Custom deserializer for size validation
fn validate_size<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value: Option<String> = Option::deserialize(deserializer)?;

    match value {
        Some(ref size) if parse_size(size).is_none() => Err(D::Error::custom(format!(
            "Invalid size '{}'. Expected bytes or a KB/MB/GB suffix, like '500KB'",
            size
        ))),
        _ => Ok(value),
    }
}
