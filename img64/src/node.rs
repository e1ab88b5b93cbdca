// ABOUTME: Image node model read by the renderer: destination, title, inline alt content, attributes
// ABOUTME: Builds nodes from pulldown-cmark events and flattens alt text

use crate::html::push_escaped_html;
use pulldown_cmark::Event;

/// Inline content inside an image's brackets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    /// A code span; contributes its literal text
    Code(String),
    /// Emphasis, links, nested images and other containers
    Span(Vec<Inline>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageNode {
    pub destination: String,
    pub title: Option<String>,
    pub children: Vec<Inline>,
    pub attributes: Vec<(String, String)>,
}

impl ImageNode {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.children.push(Inline::Text(alt.into()));
        self
    }

    pub fn with_child(mut self, child: Inline) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Builds a node from the fields of `Tag::Image` and the events between
    /// its start and matching end. An empty title counts as no title.
    pub fn from_events<'a, I>(destination: &str, title: &str, events: I) -> Self
    where
        I: IntoIterator<Item = Event<'a>>,
    {
        let mut stack: Vec<Vec<Inline>> = vec![Vec::new()];

        for event in events {
            match event {
                Event::Start(_) => stack.push(Vec::new()),
                Event::End(_) => close_span(&mut stack),
                Event::Code(code) => push_inline(&mut stack, Inline::Code(code.into_string())),
                Event::Text(text)
                | Event::InlineHtml(text)
                | Event::Html(text)
                | Event::InlineMath(text)
                | Event::DisplayMath(text)
                | Event::FootnoteReference(text) => {
                    push_inline(&mut stack, Inline::Text(text.into_string()))
                }
                Event::SoftBreak | Event::HardBreak => {
                    push_inline(&mut stack, Inline::Text(" ".to_string()))
                }
                _ => {}
            }
        }

        // unbalanced input: fold whatever is still open
        while stack.len() > 1 {
            close_span(&mut stack);
        }

        Self {
            destination: destination.to_string(),
            title: (!title.is_empty()).then(|| title.to_string()),
            children: stack.pop().unwrap_or_default(),
            attributes: Vec::new(),
        }
    }

    pub fn alt_text(&self) -> String {
        alt_text(&self.children)
    }
}

fn push_inline(stack: &mut [Vec<Inline>], inline: Inline) {
    if let Some(top) = stack.last_mut() {
        top.push(inline);
    }
}

fn close_span(stack: &mut Vec<Vec<Inline>>) {
    if stack.len() > 1 {
        if let Some(children) = stack.pop() {
            push_inline(stack, Inline::Span(children));
        }
    }
}

/// Flattens inline content to HTML-escaped plain text, depth first
pub fn alt_text(children: &[Inline]) -> String {
    let mut out = String::new();
    push_alt_text(&mut out, children);
    out
}

fn push_alt_text(out: &mut String, children: &[Inline]) {
    for child in children {
        match child {
            Inline::Text(text) => push_escaped_html(out, text),
            // escaped like text, not written raw: code may contain `"` or `<`
            Inline::Code(code) => push_escaped_html(out, code),
            Inline::Span(children) => push_alt_text(out, children),
        }
    }
}
