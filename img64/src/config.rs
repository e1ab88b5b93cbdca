// ABOUTME: Renderer configuration holding the resolution and reading strategies plus output flags
// ABOUTME: Built once per renderer with named options; read-only during a conversion

use crate::reader::{ByteReader, LocalFileReader};
use crate::resolver::{IdentityResolver, ParentPathResolver, PathResolver};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct RendererConfig {
    pub path_resolver: Arc<dyn PathResolver>,
    pub file_reader: Arc<dyn ByteReader>,
    /// Emit URLs even when they look dangerous
    pub unsafe_html: bool,
    /// Close `<img>` with ` />`
    pub xhtml: bool,
}

impl RendererConfig {
    pub fn builder() -> RendererConfigBuilder {
        RendererConfigBuilder::new()
    }
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            path_resolver: Arc::new(IdentityResolver),
            file_reader: Arc::new(LocalFileReader),
            unsafe_html: false,
            xhtml: false,
        }
    }
}

impl fmt::Debug for RendererConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererConfig")
            .field("unsafe_html", &self.unsafe_html)
            .field("xhtml", &self.xhtml)
            .finish_non_exhaustive()
    }
}

/// Options are applied in call order; a later option replaces an earlier one
/// for the same slot (`parent_path` and `path_resolver` share a slot).
#[derive(Default)]
pub struct RendererConfigBuilder {
    config: RendererConfig,
}

impl RendererConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path_resolver(mut self, resolver: impl PathResolver + 'static) -> Self {
        self.config.path_resolver = Arc::new(resolver);
        self
    }

    pub fn file_reader(mut self, reader: impl ByteReader + 'static) -> Self {
        self.config.file_reader = Arc::new(reader);
        self
    }

    /// Shorthand for `path_resolver(ParentPathResolver::new(dir))`
    pub fn parent_path(self, dir: impl Into<PathBuf>) -> Self {
        self.path_resolver(ParentPathResolver::new(dir))
    }

    pub fn allow_unsafe(mut self, unsafe_html: bool) -> Self {
        self.config.unsafe_html = unsafe_html;
        self
    }

    pub fn xhtml(mut self, xhtml: bool) -> Self {
        self.config.xhtml = xhtml;
        self
    }

    pub fn build(self) -> RendererConfig {
        self.config
    }
}
