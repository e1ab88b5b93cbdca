// ABOUTME: Path resolution strategies that turn a raw image reference into a readable location
// ABOUTME: Pure string transforms; no resolver ever touches the filesystem or network

use crate::constants::prefixes;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Maps a raw image source to the location handed to a [`crate::ByteReader`].
///
/// Resolution cannot fail. A strategy that wants to refuse an input should
/// return something the reader will treat as missing.
pub trait PathResolver: Send + Sync {
    fn resolve(&self, raw: &str) -> String;
}

impl<F> PathResolver for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn resolve(&self, raw: &str) -> String {
        self(raw)
    }
}

/// Default resolver: returns the input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl PathResolver for IdentityResolver {
    fn resolve(&self, raw: &str) -> String {
        raw.to_string()
    }
}

/// Joins local references onto a parent directory (`/var` + `image.png` = `/var/image.png`).
///
/// Remote URLs are returned unchanged. Absolute local paths are re-rooted
/// under the parent (`/var` + `/img/a.png` = `/var/img/a.png`).
#[derive(Debug, Clone)]
pub struct ParentPathResolver {
    parent: PathBuf,
}

impl ParentPathResolver {
    pub fn new(parent: impl Into<PathBuf>) -> Self {
        Self {
            parent: parent.into(),
        }
    }

    pub fn parent(&self) -> &PathBuf {
        &self.parent
    }
}

impl PathResolver for ParentPathResolver {
    fn resolve(&self, raw: &str) -> String {
        if prefixes::is_remote(raw) {
            return raw.to_string();
        }
        let path = Path::new(raw);
        if !path.has_root() {
            return self.parent.join(path).to_string_lossy().into_owned();
        }

        let relative: PathBuf = path
            .components()
            .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
            .collect();
        self.parent.join(relative).to_string_lossy().into_owned()
    }
}

/// Resolves references against a base URL, for documents that were themselves fetched remotely
#[derive(Debug, Clone)]
pub struct UrlRootResolver {
    base: Url,
}

impl UrlRootResolver {
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    pub fn parse(base: &str) -> Result<Self, crate::EmbedError> {
        let base = Url::parse(base).map_err(|e| {
            crate::EmbedError::Configuration(format!("Invalid base URL '{}': {}", base, e))
        })?;
        Ok(Self::new(base))
    }
}

impl PathResolver for UrlRootResolver {
    fn resolve(&self, raw: &str) -> String {
        match self.base.join(raw) {
            Ok(joined) => joined.to_string(),
            Err(e) => {
                log::debug!("Could not join {} onto {}: {}", raw, self.base, e);
                raw.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_resolver() {
        let resolver = IdentityResolver;
        assert_eq!(resolver.resolve("./image.png"), "./image.png");
        assert_eq!(
            resolver.resolve("https://example.com/x.png"),
            "https://example.com/x.png"
        );
    }

    #[test]
    fn test_parent_path_resolver_joins_relative_paths() {
        let resolver = ParentPathResolver::new("/var/docs");
        let expected = Path::new("/var/docs").join("image.png");
        assert_eq!(resolver.resolve("image.png"), expected.to_string_lossy());
    }

    #[test]
    fn test_parent_path_resolver_skips_remote_urls() {
        let resolver = ParentPathResolver::new("/var/docs");
        assert_eq!(
            resolver.resolve("https://example.com/x.png"),
            "https://example.com/x.png"
        );
        assert_eq!(
            resolver.resolve("http://example.com/x.png"),
            "http://example.com/x.png"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_parent_path_resolver_reroots_absolute_paths() {
        let resolver = ParentPathResolver::new("/var/docs");
        assert_eq!(resolver.resolve("/img/a.png"), "/var/docs/img/a.png");
        assert_eq!(resolver.resolve("//img//b.png"), "/var/docs/img/b.png");
    }

    #[test]
    fn test_url_root_resolver() {
        let resolver = UrlRootResolver::parse("https://example.com/docs/readme.md").unwrap();

        assert_eq!(
            resolver.resolve("images/a.png"),
            "https://example.com/docs/images/a.png"
        );
        assert_eq!(
            resolver.resolve("../assets/b.png"),
            "https://example.com/assets/b.png"
        );
        assert_eq!(
            resolver.resolve("https://cdn.example.org/c.png"),
            "https://cdn.example.org/c.png"
        );
    }

    #[test]
    fn test_url_root_resolver_rejects_bad_base() {
        assert!(UrlRootResolver::parse("not a url").is_err());
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |raw: &str| format!("/assets/{}", raw.trim_start_matches("./"));
        assert_eq!(resolver.resolve("./logo.png"), "/assets/logo.png");
    }
}
