// ABOUTME: Image renderer that decides between an inline data URL and the original reference
// ABOUTME: Runs resolve, read, classify and encode per node and writes the final <img> markup

use crate::config::RendererConfig;
use crate::encoder;
use crate::error::EmbedError;
use crate::html::{is_dangerous_url, push_escaped_html, push_escaped_url, render_attributes};
use crate::mime;
use crate::node::ImageNode;

#[derive(Debug, Clone, Default)]
pub struct Img64Renderer {
    config: RendererConfig,
}

impl Img64Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Attempts to turn an image source into a data URL.
    ///
    /// - `Ok(Some(_))`: the value to write as `src`; a source that already is
    ///   a data URL comes back unchanged.
    /// - `Ok(None)`: the reader declined, keep the original reference.
    /// - `Err(_)`: reading or classification failed.
    pub fn encode_image(&self, source: &str) -> Result<Option<String>, EmbedError> {
        if encoder::is_data_url(source) {
            return Ok(Some(source.to_string()));
        }

        let location = self.config.path_resolver.resolve(source);

        let Some(bytes) = self.config.file_reader.read(&location)? else {
            log::debug!("Leaving image reference as-is: {}", source);
            return Ok(None);
        };

        let media_type = mime::classify(&bytes)?;
        log::debug!(
            "Embedding {} as {} ({} bytes)",
            location,
            media_type,
            bytes.len()
        );

        Ok(Some(encoder::encode(&bytes, media_type)))
    }

    /// Writes the `<img>` element for `node`. Never fails: any problem with
    /// the image degrades `src` to the escaped original reference.
    pub fn render_image(&self, out: &mut String, node: &ImageNode) {
        out.push_str("<img src=\"");
        if self.config.unsafe_html || !is_dangerous_url(&node.destination) {
            self.push_src(out, &node.destination);
        } else {
            log::warn!("Skipping dangerous image URL: {}", node.destination);
        }

        out.push_str("\" alt=\"");
        out.push_str(&node.alt_text());
        out.push('"');

        if let Some(title) = &node.title {
            out.push_str(" title=\"");
            push_escaped_html(out, title);
            out.push('"');
        }

        if !node.attributes.is_empty() {
            render_attributes(out, &node.attributes);
        }

        if self.config.xhtml {
            out.push_str(" />");
        } else {
            out.push('>');
        }
    }

    /// Convenience wrapper around [`Self::render_image`]
    pub fn render_to_string(&self, node: &ImageNode) -> String {
        let mut out = String::new();
        self.render_image(&mut out, node);
        out
    }

    fn push_src(&self, out: &mut String, destination: &str) {
        match self.encode_image(destination) {
            // a data URL from the document is untrusted text
            Ok(Some(data_url)) if encoder::is_data_url(destination) => {
                push_escaped_url(out, &data_url)
            }
            Ok(Some(data_url)) => out.push_str(&data_url),
            Ok(None) => push_escaped_url(out, destination),
            Err(e) => {
                log::warn!("Image embedding failed for {}: {}", destination, e);
                push_escaped_url(out, destination);
            }
        }
    }
}
