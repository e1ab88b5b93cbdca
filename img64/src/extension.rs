// ABOUTME: Hooks the image renderer into the pulldown-cmark event pipeline
// ABOUTME: Replaces each image's events with one inline HTML fragment and offers a markdown converter

use crate::config::RendererConfig;
use crate::node::ImageNode;
use crate::renderer::Img64Renderer;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::io;

/// Wraps an event stream so that images are rendered by `renderer`.
/// All other events pass through untouched and in order.
pub fn embed_images<'a, I>(events: I, renderer: &Img64Renderer) -> EmbedImages<'_, I>
where
    I: Iterator<Item = Event<'a>>,
{
    EmbedImages { events, renderer }
}

pub struct EmbedImages<'r, I> {
    events: I,
    renderer: &'r Img64Renderer,
}

impl<'a, I> EmbedImages<'_, I>
where
    I: Iterator<Item = Event<'a>>,
{
    /// Consumes events up to the `End` that closes the current image.
    /// Images nested in alt text are kept in the returned events.
    fn take_image_content(&mut self) -> Vec<Event<'a>> {
        let mut depth = 0usize;
        let mut content = Vec::new();

        for event in self.events.by_ref() {
            match &event {
                Event::Start(Tag::Image { .. }) => depth += 1,
                Event::End(TagEnd::Image) => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            content.push(event);
        }

        content
    }
}

impl<'a, I> Iterator for EmbedImages<'_, I>
where
    I: Iterator<Item = Event<'a>>,
{
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.events.next()? {
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => {
                let content = self.take_image_content();
                let node = ImageNode::from_events(&dest_url, &title, content);

                let mut fragment = String::new();
                self.renderer.render_image(&mut fragment, &node);
                Some(Event::InlineHtml(CowStr::from(fragment)))
            }
            event => Some(event),
        }
    }
}

/// Parser options used unless overridden with [`Markdown::with_options`]
pub fn default_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_TASKLISTS
}

/// Markdown to HTML converter with image embedding
#[derive(Debug, Clone)]
pub struct Markdown {
    renderer: Img64Renderer,
    options: Options,
}

impl Markdown {
    pub fn new(renderer: Img64Renderer) -> Self {
        Self {
            renderer,
            options: default_options(),
        }
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn renderer(&self) -> &Img64Renderer {
        &self.renderer
    }

    pub fn convert(&self, source: &str) -> String {
        let parser = Parser::new_ext(source, self.options);
        let mut out = String::with_capacity(source.len() + source.len() / 2);
        html::push_html(&mut out, embed_images(parser, &self.renderer));
        out
    }

    pub fn convert_to_writer<W: io::Write>(&self, source: &str, writer: W) -> io::Result<()> {
        let parser = Parser::new_ext(source, self.options);
        html::write_html_io(writer, embed_images(parser, &self.renderer))
    }
}

impl Default for Markdown {
    fn default() -> Self {
        Self::new(Img64Renderer::default())
    }
}

impl From<RendererConfig> for Markdown {
    fn from(config: RendererConfig) -> Self {
        Self::new(Img64Renderer::new(config))
    }
}
