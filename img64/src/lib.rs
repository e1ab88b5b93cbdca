// ABOUTME: img64 library: embeds images referenced from markdown as base64 data URLs
// ABOUTME: Pluggable path resolution and byte reading feed a renderer for pulldown-cmark

//! Rendering-time image embedding for markdown.
//!
//! Each image reference is resolved with a [`PathResolver`], read with a
//! [`ByteReader`], sniffed against an allow-list of web image types and
//! written as a `data:` URL. Anything that goes wrong for one image falls back
//! to the original reference; a document conversion never fails because of
//! an image.
//!
//! ```no_run
//! use img64::{Markdown, RendererConfig};
//!
//! let config = RendererConfig::builder().parent_path("docs").build();
//! let html = Markdown::from(config).convert("![logo](logo.png \"Logo\")");
//! println!("{}", html);
//! ```

pub mod config;
pub mod constants;
pub mod encoder;
pub mod error;
pub mod extension;
pub mod html;
pub mod mime;
pub mod node;
pub mod reader;
pub mod renderer;
pub mod resolver;

pub use config::{RendererConfig, RendererConfigBuilder};
pub use error::EmbedError;
pub use extension::{embed_images, EmbedImages, Markdown};
pub use node::{ImageNode, Inline};
pub use reader::{ByteReader, LocalFileReader, RemoteFileReader, RemoteReaderConfig};
pub use renderer::Img64Renderer;
pub use resolver::{IdentityResolver, ParentPathResolver, PathResolver, UrlRootResolver};
